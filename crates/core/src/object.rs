//! The trait concrete value-object types implement.
//!
//! A concrete type is a thin newtype over [`Instance`]: it supplies its
//! schema and the two conversions, and gets hydration, serialization and
//! equality for free.
//!
//! ```ignore
//! struct Car(Instance);
//!
//! impl ValueObject for Car {
//!     fn schema() -> Arc<Schema> {
//!         CAR_SCHEMA.clone()
//!     }
//!     fn from_instance(instance: Instance) -> Self {
//!         Car(instance)
//!     }
//!     fn instance(&self) -> &Instance {
//!         &self.0
//!     }
//! }
//! ```

use std::sync::Arc;

use serde_json::Value as Json;

use crate::error::ModelResult;
use crate::instance::Instance;
use crate::property::Context;
use crate::schema::{Schema, ValueBag};

pub trait ValueObject: Sized {
    fn schema() -> Arc<Schema>;

    fn from_instance(instance: Instance) -> Self;

    fn instance(&self) -> &Instance;

    fn from_js(js: &Json) -> ModelResult<Self> {
        Ok(Self::from_instance(Self::schema().hydrate(js, None)?))
    }

    fn from_js_with_context(js: &Json, context: &Context) -> ModelResult<Self> {
        Ok(Self::from_instance(Self::schema().hydrate(js, Some(context))?))
    }

    fn from_value_of(bag: ValueBag) -> ModelResult<Self> {
        Ok(Self::from_instance(Self::schema().construct(bag)?))
    }

    fn to_js(&self) -> Json {
        self.instance().to_js()
    }

    fn value_of(&self) -> ValueBag {
        self.instance().value_of()
    }

    fn equals(&self, other: Option<&Self>) -> bool {
        self.instance().equals(other.map(ValueObject::instance))
    }

    fn equivalent(&self, other: Option<&Self>) -> bool {
        self.instance().equivalent(other.map(ValueObject::instance))
    }
}
