//! Schemas: the per-type accessor/validation table built once from a
//! declarative property list.
//!
//! A [`Schema`] is the static side of a value-object type: its name, its
//! property descriptors, its legacy-shape transforms and any custom accessor
//! overrides. Concrete types hold one schema in a `LazyLock` static and hand
//! out clones of the `Arc` through a [`SchemaRef`](crate::property::SchemaRef)
//! function.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde_json::Value as Json;
use tracing::{debug, trace};

use immodel_collections::named_array;

use crate::error::{ModelError, ModelResult};
use crate::instance::Instance;
use crate::property::{BackCompat, Context, Property, PropertyKind};
use crate::value::{self, PropValue};

/// Custom getter override: the Rust rendering of a subclass shadowing a
/// synthesized getter.
pub type GetterFn = Arc<dyn Fn(&Instance) -> ModelResult<PropValue> + Send + Sync>;

/// Custom changer override. Overrides that want the synthesized behavior for
/// the final write should go through [`Instance::change_stored`].
pub type ChangerFn = Arc<dyn Fn(&Instance, PropValue) -> ModelResult<Instance> + Send + Sync>;

/// The raw value bag: one entry per present property, no defaulting.
pub type ValueBag = BTreeMap<&'static str, PropValue>;

/// Static metadata for one value-object type.
pub struct Schema {
    pub(crate) type_name: &'static str,
    pub(crate) properties: Vec<Property>,
    pub(crate) back_compats: Vec<BackCompat>,
    pub(crate) getters: HashMap<&'static str, GetterFn>,
    pub(crate) changers: HashMap<&'static str, ChangerFn>,
}

impl Schema {
    pub fn builder(type_name: &'static str) -> SchemaBuilder {
        SchemaBuilder {
            type_name,
            properties: Vec::new(),
            back_compats: Vec::new(),
            getters: HashMap::new(),
            changers: HashMap::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Hydrates an instance from a JSON shape.
    ///
    /// Back-compat transforms run first (copying the input at most once, and
    /// only when a condition matches). Then, per descriptor, the same-named
    /// field is read and coerced: date kinds parse to instants, nested
    /// descriptors recurse through the referenced schema with the transformed
    /// context. The assembled value bag goes through [`construct`](Self::construct).
    pub fn hydrate(
        self: Arc<Self>,
        js: &Json,
        context: Option<&Context>,
    ) -> ModelResult<Instance> {
        if js.is_null() {
            return Err(ModelError::undefined_input(self.type_name));
        }
        trace!(type_name = self.type_name, "hydrate");

        let mut owned: Option<Json> = None;
        for back_compat in &self.back_compats {
            let current = owned.as_ref().unwrap_or(js);
            if (back_compat.condition)(current) {
                let target = owned.get_or_insert_with(|| js.clone());
                (back_compat.action)(target);
            }
        }
        let js = owned.as_ref().unwrap_or(js);

        let mut bag = ValueBag::new();
        for property in &self.properties {
            let Some(raw) = js.get(property.name).filter(|v| !v.is_null()) else {
                continue;
            };
            let pv = if property.kind == Some(PropertyKind::Date) {
                PropValue::Date(
                    value::coerce_date(raw)
                        .ok_or_else(|| ModelError::invalid_date(self.type_name, property.name))?,
                )
            } else if let Some(nested) = property.nested {
                let child = child_context(property, context);
                PropValue::Nested(nested().hydrate(raw, child.as_ref())?)
            } else if let Some(nested) = property.nested_array {
                let Some(items) = raw.as_array() else {
                    return Err(ModelError::expected_array(property.name));
                };
                let child = child_context(property, context);
                PropValue::NestedArray(
                    items
                        .iter()
                        .map(|item| nested().hydrate(item, child.as_ref()))
                        .collect::<ModelResult<_>>()?,
                )
            } else {
                PropValue::Plain(raw.clone())
            };
            bag.insert(property.name, pv);
        }
        self.construct(bag)
    }

    /// Validates a value bag and freezes it into an instance.
    ///
    /// Per descriptor: an absent value either defaults (array kinds become an
    /// empty sequence, stored), fails (no default configured), or stays
    /// absent so the getter applies the default at read time. A present value
    /// runs the possible-values check, kind coercion and the validators in
    /// order. Plain JSON supplied for nested descriptors is hydrated through
    /// the referenced schema, so value bags assembled from raw JSON work too.
    pub fn construct(self: Arc<Self>, bag: ValueBag) -> ModelResult<Instance> {
        let type_name = self.type_name;
        let result = self.construct_inner(bag);
        if let Err(err) = &result {
            debug!(type_name, %err, "construct rejected the value bag");
        }
        result
    }

    fn construct_inner(self: Arc<Self>, bag: ValueBag) -> ModelResult<Instance> {
        let mut fields = ValueBag::new();
        for property in &self.properties {
            let pv = bag.get(property.name).filter(|v| !v.is_null()).cloned();
            let Some(mut pv) = pv else {
                if property.kind == Some(PropertyKind::Array) {
                    fields.insert(property.name, PropValue::Plain(Json::Array(Vec::new())));
                } else if property.is_required() {
                    return Err(ModelError::required(self.type_name, property.name));
                }
                continue;
            };

            if let Some(allowed) = &property.possible_values {
                let member = matches!(&pv, PropValue::Plain(j) if allowed.contains(j));
                if !member {
                    return Err(ModelError::UnsupportedValue {
                        type_name: self.type_name.to_string(),
                        property: property.name.to_string(),
                        value: match &pv {
                            PropValue::Plain(j) => value::display_json(j),
                            other => other.kind_description(),
                        },
                        allowed: allowed
                            .iter()
                            .map(value::display_json)
                            .collect::<Vec<_>>()
                            .join(", "),
                    });
                }
            }

            if property.kind == Some(PropertyKind::Date) {
                pv = match pv {
                    PropValue::Date(d) => PropValue::Date(d),
                    PropValue::Plain(j) => PropValue::Date(
                        value::coerce_date(&j)
                            .ok_or_else(|| ModelError::invalid_date(self.type_name, property.name))?,
                    ),
                    _ => return Err(ModelError::invalid_date(self.type_name, property.name)),
                };
            }

            if property.kind == Some(PropertyKind::Array)
                && !matches!(&pv, PropValue::Plain(Json::Array(_)) | PropValue::NestedArray(_))
            {
                return Err(ModelError::not_an_array(self.type_name, property.name));
            }

            if let Some(nested) = property.nested {
                pv = match pv {
                    PropValue::Plain(j) => PropValue::Nested(nested().hydrate(&j, None)?),
                    other => other,
                };
            }

            if let Some(nested) = property.nested_array {
                pv = match pv {
                    PropValue::NestedArray(items) => PropValue::NestedArray(items),
                    PropValue::Plain(Json::Array(items)) => PropValue::NestedArray(
                        items
                            .iter()
                            .map(|item| nested().hydrate(item, None))
                            .collect::<ModelResult<_>>()?,
                    ),
                    _ => return Err(ModelError::expected_array(property.name)),
                };
            }

            for validator in &property.validators {
                validator(&pv).map_err(|message| {
                    ModelError::validation(self.type_name, property.name, message)
                })?;
            }

            fields.insert(property.name, pv);
        }
        Ok(Instance::assemble(self, fields))
    }
}

fn child_context(property: &Property, context: Option<&Context>) -> Option<Context> {
    context.map(|ctx| match &property.context_transform {
        Some(transform) => transform(ctx),
        None => ctx.clone(),
    })
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("type_name", &self.type_name)
            .field("properties", &self.properties.iter().map(Property::name).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Assembles a [`Schema`]. Property names must be unique; `build` panics
/// with a descriptive message otherwise, in every profile. A duplicate name
/// is a broken type declaration, not a runtime input.
pub struct SchemaBuilder {
    type_name: &'static str,
    properties: Vec<Property>,
    back_compats: Vec<BackCompat>,
    getters: HashMap<&'static str, GetterFn>,
    changers: HashMap<&'static str, ChangerFn>,
}

impl SchemaBuilder {
    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn back_compat(
        mut self,
        condition: impl Fn(&Json) -> bool + Send + Sync + 'static,
        action: impl Fn(&mut Json) + Send + Sync + 'static,
    ) -> Self {
        self.back_compats.push(BackCompat::new(condition, action));
        self
    }

    /// Registers a custom getter for `name`, replacing the synthesized one.
    pub fn getter(
        mut self,
        name: &'static str,
        f: impl Fn(&Instance) -> ModelResult<PropValue> + Send + Sync + 'static,
    ) -> Self {
        self.getters.insert(name, Arc::new(f));
        self
    }

    /// Registers a custom changer for `name`, replacing the synthesized one.
    pub fn changer(
        mut self,
        name: &'static str,
        f: impl Fn(&Instance, PropValue) -> ModelResult<Instance> + Send + Sync + 'static,
    ) -> Self {
        self.changers.insert(name, Arc::new(f));
        self
    }

    pub fn build(self) -> Arc<Schema> {
        if let Err(err) =
            named_array::check_valid(&self.properties, Some("property"), Some(self.type_name))
        {
            panic!("{err}");
        }
        Arc::new(Schema {
            type_name: self.type_name,
            properties: self.properties,
            back_compats: self.back_compats,
            getters: self.getters,
            changers: self.changers,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use super::*;

    fn point_schema() -> Arc<Schema> {
        static SCHEMA: LazyLock<Arc<Schema>> = LazyLock::new(|| {
            Schema::builder("Point")
                .property(Property::new("x").validate(crate::property::ensure::number))
                .property(Property::new("y").default_value(0))
                .property(Property::new("label").default_value(Json::Null))
                .build()
        });
        SCHEMA.clone()
    }

    #[test]
    fn hydrate_reads_declared_fields_only() {
        let point = point_schema()
            .hydrate(&serde_json::json!({ "x": 1, "y": 2, "junk": true }), None)
            .unwrap();
        assert_eq!(point.get("x").unwrap(), PropValue::from(1i64));
        assert_eq!(point.get("y").unwrap(), PropValue::from(2i64));
        assert!(point.get("junk").is_err());
    }

    #[test]
    fn hydrate_rejects_null_input() {
        let err = point_schema().hydrate(&Json::Null, None).unwrap_err();
        assert_eq!(err, ModelError::undefined_input("Point"));
    }

    #[test]
    fn missing_required_property_fails() {
        let err = point_schema().hydrate(&serde_json::json!({ "y": 2 }), None).unwrap_err();
        assert_eq!(err.to_string(), "Point.x must be defined");
    }

    #[test]
    fn null_counts_as_absent() {
        let err =
            point_schema().hydrate(&serde_json::json!({ "x": null }), None).unwrap_err();
        assert_eq!(err.to_string(), "Point.x must be defined");
    }

    #[test]
    fn validator_failures_carry_context() {
        let err =
            point_schema().hydrate(&serde_json::json!({ "x": "lol" }), None).unwrap_err();
        assert_eq!(err.to_string(), "Point.x must be a number");
    }

    #[test]
    #[should_panic(expected = "duplicate property 'x' in Dup")]
    fn duplicate_property_names_are_rejected() {
        let _ = Schema::builder("Dup")
            .property(Property::new("x"))
            .property(Property::new("x").default_value(0))
            .build();
    }

    #[test]
    fn defaults_are_not_stored_at_construction() {
        let point = point_schema().hydrate(&serde_json::json!({ "x": 1 }), None).unwrap();
        assert_eq!(point.value_of().len(), 1);
        assert_eq!(point.get("y").unwrap(), PropValue::from(0i64));
    }
}
