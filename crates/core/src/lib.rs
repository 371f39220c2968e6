//! Declarative immutable value objects.
//!
//! A type declares its properties once, as a [`Schema`] of [`Property`]
//! descriptors, and gets the whole object lifecycle from that single
//! declaration: JSON hydration with validation and legacy-shape migration,
//! read accessors with defaulting, copy-on-change accessors that return new
//! instances (and the *same* instance when nothing changed), deep access
//! through nested objects, serialization and structural equality.
//!
//! The runtime representation is an [`Instance`]; concrete types wrap one via
//! [`ValueObject`].

pub mod equality;
pub mod error;
pub mod instance;
pub mod object;
pub mod property;
pub mod schema;
pub mod value;

pub use equality::{general_arrays_equal, general_equal, general_lookups_equal};
pub use error::{ModelError, ModelResult};
pub use instance::{DIFF_DIFFERENT_TYPES, DIFF_NO_OTHER, Instance};
pub use object::ValueObject;
pub use property::{BackCompat, Context, Property, PropertyKind, SchemaRef, ensure};
pub use schema::{ChangerFn, GetterFn, Schema, SchemaBuilder, ValueBag};
pub use value::PropValue;
