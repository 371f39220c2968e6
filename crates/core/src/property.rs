//! Property descriptors: the static metadata a schema is built from.

use std::fmt;
use std::sync::Arc;

use serde_json::Value as Json;

use immodel_collections::Named;

use crate::schema::Schema;
use crate::value::PropValue;

/// A validator either returns normally or fails with a bare message; the
/// schema re-raises failures prefixed with the type and property name.
pub type Validator = Arc<dyn Fn(&PropValue) -> Result<(), String> + Send + Sync>;

/// Custom per-property equality.
pub type EqualFn = Arc<dyn Fn(&PropValue, &PropValue) -> bool + Send + Sync>;

/// Custom serialization transform; takes precedence over nested-type
/// serialization and is applied element-wise for nested arrays.
pub type SerializeFn = Arc<dyn Fn(&PropValue) -> Json + Send + Sync>;

/// Opaque, caller-supplied hydration context.
pub type Context = Json;

/// Derives a nested type's hydration context from the parent's.
pub type ContextTransform = Arc<dyn Fn(&Context) -> Context + Send + Sync>;

/// Late-bound reference to a collaborating schema. A function pointer (rather
/// than an `Arc` held directly) lets a type nest itself without an
/// initialization cycle.
pub type SchemaRef = fn() -> Arc<Schema>;

/// Coercion/defaulting tag for a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Date,
    Array,
}

/// Declarative metadata for one named attribute of a value-object type.
///
/// Built builder-style:
///
/// ```ignore
/// Property::new("fuel")
///     .default_value("electric")
///     .possible_values(["gas", "diesel", "electric"])
/// ```
///
/// The *presence* of a default value (even an explicit null) is what makes a
/// property optional; a property with no default must be supplied at
/// construction.
#[derive(Clone)]
pub struct Property {
    pub(crate) name: &'static str,
    pub(crate) default_value: Option<Json>,
    pub(crate) possible_values: Option<Vec<Json>>,
    pub(crate) validators: Vec<Validator>,
    pub(crate) kind: Option<PropertyKind>,
    pub(crate) nested: Option<SchemaRef>,
    pub(crate) nested_array: Option<SchemaRef>,
    pub(crate) equal: Option<EqualFn>,
    pub(crate) serialize: Option<SerializeFn>,
    pub(crate) context_transform: Option<ContextTransform>,
    pub(crate) preserve_undefined: bool,
    pub(crate) empty_array_is_ok: bool,
}

impl Property {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            default_value: None,
            possible_values: None,
            validators: Vec::new(),
            kind: None,
            nested: None,
            nested_array: None,
            equal: None,
            serialize: None,
            context_transform: None,
            preserve_undefined: false,
            empty_array_is_ok: false,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the property must be supplied at construction.
    pub fn is_required(&self) -> bool {
        self.default_value.is_none()
    }

    pub fn default_value(mut self, value: impl Into<Json>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn possible_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Json>,
    {
        self.possible_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Appends a validator; validators run in registration order.
    pub fn validate(
        mut self,
        f: impl Fn(&PropValue) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validators.push(Arc::new(f));
        self
    }

    /// Marks the property date-typed: values coerce to instants.
    pub fn date(mut self) -> Self {
        self.kind = Some(PropertyKind::Date);
        self
    }

    /// Marks the property array-typed: absent values default to an empty
    /// sequence at construction.
    pub fn array(mut self) -> Self {
        self.kind = Some(PropertyKind::Array);
        self
    }

    /// A single nested value object, hydrated through the referenced schema.
    pub fn nested(mut self, schema: SchemaRef) -> Self {
        self.nested = Some(schema);
        self
    }

    /// An array of nested value objects.
    pub fn nested_array(mut self, schema: SchemaRef) -> Self {
        self.nested_array = Some(schema);
        self
    }

    pub fn equal(
        mut self,
        f: impl Fn(&PropValue, &PropValue) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.equal = Some(Arc::new(f));
        self
    }

    pub fn serialize(mut self, f: impl Fn(&PropValue) -> Json + Send + Sync + 'static) -> Self {
        self.serialize = Some(Arc::new(f));
        self
    }

    pub fn context_transform(
        mut self,
        f: impl Fn(&Context) -> Context + Send + Sync + 'static,
    ) -> Self {
        self.context_transform = Some(Arc::new(f));
        self
    }

    pub fn preserve_undefined(mut self) -> Self {
        self.preserve_undefined = true;
        self
    }

    pub fn empty_array_is_ok(mut self) -> Self {
        self.empty_array_is_ok = true;
        self
    }
}

impl Named for Property {
    fn name(&self) -> &str {
        self.name
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("required", &self.is_required())
            .finish_non_exhaustive()
    }
}

/// A legacy-shape normalization: when `condition` matches the raw input,
/// `action` rewrites it before hydration proper. The input is copied at most
/// once, and only when some condition matches.
#[derive(Clone)]
pub struct BackCompat {
    pub(crate) condition: Arc<dyn Fn(&Json) -> bool + Send + Sync>,
    pub(crate) action: Arc<dyn Fn(&mut Json) + Send + Sync>,
}

impl BackCompat {
    pub fn new(
        condition: impl Fn(&Json) -> bool + Send + Sync + 'static,
        action: impl Fn(&mut Json) + Send + Sync + 'static,
    ) -> Self {
        Self { condition: Arc::new(condition), action: Arc::new(action) }
    }
}

impl fmt::Debug for BackCompat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BackCompat")
    }
}

/// Stock validators.
pub mod ensure {
    use super::PropValue;

    pub fn number(v: &PropValue) -> Result<(), String> {
        if v.as_f64().is_some() {
            Ok(())
        } else {
            Err("must be a number".to_string())
        }
    }

    pub fn positive(v: &PropValue) -> Result<(), String> {
        match v.as_f64() {
            Some(n) if n < 0.0 => Err("must be positive".to_string()),
            _ => Ok(()),
        }
    }

    pub fn non_negative(v: &PropValue) -> Result<(), String> {
        match v.as_f64() {
            Some(n) if n < 0.0 => Err("must be non negative".to_string()),
            _ => Ok(()),
        }
    }
}
