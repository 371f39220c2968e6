//! Immutable value-object instances.
//!
//! An [`Instance`] is a frozen field map plus a handle to its type's
//! [`Schema`]. Fields are set exactly once at construction and never mutated;
//! "changing" a property always yields a new instance. The field map is
//! shared behind an `Arc`, so clones are cheap and an unchanged `change`
//! hands back the same shared storage ([`Instance::same`] observes this).

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::Value as Json;

use immodel_collections::{Equatable, named_array};

use crate::equality::general_equal;
use crate::error::{ModelError, ModelResult};
use crate::property::Property;
use crate::schema::{Schema, ValueBag};
use crate::value::PropValue;

/// Sentinel difference reported when no other instance was provided.
pub const DIFF_NO_OTHER: &str = "__no_other__";
/// Sentinel difference reported when the concrete types differ.
pub const DIFF_DIFFERENT_TYPES: &str = "__different_types__";

#[derive(Debug, Clone)]
pub struct Instance {
    schema: Arc<Schema>,
    fields: Arc<ValueBag>,
}

impl Instance {
    pub(crate) fn assemble(schema: Arc<Schema>, fields: ValueBag) -> Self {
        Self { schema, fields: Arc::new(fields) }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn type_name(&self) -> &'static str {
        self.schema.type_name()
    }

    /// Whether two handles share the same frozen field storage. This is the
    /// observable form of the change identity short-circuit.
    pub fn same(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.fields, &other.fields)
    }

    /// The stored value, with no read-time defaulting.
    pub fn stored(&self, name: &str) -> Option<&PropValue> {
        self.fields.get(name)
    }

    pub fn find_property(&self, name: &str) -> Option<&Property> {
        named_array::find_by_name(&self.schema.properties, name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.find_property(name).is_some()
    }

    /// Generic read accessor: custom getter override first, else the stored
    /// value, else the descriptor's default.
    pub fn get(&self, name: &str) -> ModelResult<PropValue> {
        if let Some(getter) = self.schema.getters.get(name) {
            return getter(self);
        }
        let Some(property) = self.find_property(name) else {
            return Err(ModelError::no_getter(self.type_name(), name));
        };
        match self.stored(property.name()) {
            Some(v) => Ok(v.clone()),
            None => self.default_for(property),
        }
    }

    fn default_for(&self, property: &Property) -> ModelResult<PropValue> {
        let Some(default) = &property.default_value else {
            return Ok(PropValue::Plain(Json::Null));
        };
        if default.is_null() {
            return Ok(PropValue::Plain(Json::Null));
        }
        // nested defaults are JSON shapes; hydrate them on read
        if let Some(nested) = property.nested {
            return Ok(PropValue::Nested(nested().hydrate(default, None)?));
        }
        if let Some(date) = crate::value::coerce_date(default)
            && property.kind == Some(crate::property::PropertyKind::Date)
        {
            return Ok(PropValue::Date(date));
        }
        Ok(PropValue::Plain(default.clone()))
    }

    /// Generic change accessor: custom changer override first, else the
    /// synthesized path ([`change_stored`](Self::change_stored)).
    pub fn change(&self, name: &str, value: impl Into<PropValue>) -> ModelResult<Instance> {
        let value = value.into();
        if let Some(changer) = self.schema.changers.get(name) {
            return changer(self, value);
        }
        let Some(property) = self.find_property(name) else {
            return Err(ModelError::no_changer(self.type_name(), name));
        };
        self.change_stored(property.name(), value)
    }

    /// The synthesized change path: when the new value equals the stored one
    /// the same instance is handed back (construction is skipped entirely);
    /// otherwise the full value bag is rewritten and re-validated. Custom
    /// changers call this to reuse the default behavior without recursing
    /// through themselves.
    pub fn change_stored(&self, name: &'static str, value: PropValue) -> ModelResult<Instance> {
        if self.stored(name) == Some(&value) {
            return Ok(self.clone());
        }
        let mut bag = self.value_of();
        bag.insert(name, value);
        self.schema.clone().construct(bag)
    }

    /// Applies `change` sequentially for every pair, failing on the first
    /// unknown property or invalid value. No partially-changed instance
    /// escapes: the intermediate results are discarded on failure.
    pub fn change_many<'a>(
        &self,
        changes: impl IntoIterator<Item = (&'a str, PropValue)>,
    ) -> ModelResult<Instance> {
        let mut out = self.clone();
        for (name, value) in changes {
            if !self.has_property(name) {
                return Err(ModelError::unknown_property(self.type_name(), name));
            }
            out = out.change(name, value)?;
        }
        Ok(out)
    }

    /// Walks a dotted path through accessors. Intermediate plain objects are
    /// indexed structurally; walking past a scalar yields null.
    pub fn deep_get(&self, path: &str) -> ModelResult<PropValue> {
        let mut value = PropValue::Nested(self.clone());
        for segment in path.split('.') {
            value = match value {
                PropValue::Nested(instance) => instance.get(segment)?,
                PropValue::Plain(Json::Object(map)) => {
                    PropValue::Plain(map.get(segment).cloned().unwrap_or(Json::Null))
                }
                _ => PropValue::Plain(Json::Null),
            };
        }
        Ok(value)
    }

    /// Changes the value at a dotted path: resolves the getter chain to the
    /// parent of the final segment, changes there, then folds the replacement
    /// back up through each ancestor's `change`.
    pub fn deep_change(&self, path: &str, value: impl Into<PropValue>) -> ModelResult<Instance> {
        let segments: Vec<&str> = path.split('.').collect();
        let last = segments.len() - 1;

        let mut chain: Vec<Instance> = Vec::with_capacity(segments.len());
        chain.push(self.clone());
        for segment in &segments[..last] {
            let current = &chain[chain.len() - 1];
            match current.get(segment)? {
                PropValue::Nested(instance) => chain.push(instance),
                other => {
                    return Err(ModelError::NotChangeable {
                        kind: other.kind_description(),
                        segment: segment.to_string(),
                    });
                }
            }
        }

        let mut replacement = chain[last].change(segments[last], value.into())?;
        for (i, segment) in segments[..last].iter().enumerate().rev() {
            replacement = chain[i].change(segment, PropValue::Nested(replacement))?;
        }
        Ok(replacement)
    }

    /// The raw value bag: stored values only, no defaulting, absent fields
    /// omitted.
    pub fn value_of(&self) -> ValueBag {
        (*self.fields).clone()
    }

    /// JSON shape of this instance.
    ///
    /// A property is included when its stored value is defined (non-null;
    /// arrays must be non-empty unless `empty_array_is_ok`) or when
    /// `preserve_undefined` is set. A custom `serialize` transform takes
    /// precedence over nested-type serialization and maps element-wise over
    /// nested arrays.
    pub fn to_js(&self) -> Json {
        let mut out = serde_json::Map::new();
        for property in &self.schema.properties {
            let pv = self.stored(property.name());
            let defined = pv.is_some_and(|v| v.is_defined(property.empty_array_is_ok));
            if !defined && !property.preserve_undefined {
                continue;
            }
            let js = match (pv, &property.serialize) {
                (Some(PropValue::NestedArray(items)), Some(serialize))
                    if property.nested_array.is_some() =>
                {
                    Json::Array(
                        items
                            .iter()
                            .map(|item| serialize(&PropValue::Nested(item.clone())))
                            .collect(),
                    )
                }
                (Some(v), Some(serialize)) => serialize(v),
                (Some(v), None) => v.to_js(),
                (None, _) => Json::Null,
            };
            out.insert(property.name().to_string(), js);
        }
        Json::Object(out)
    }

    /// Property names whose stored values differ, via the per-property custom
    /// equality or general equality. Sentinels report a missing other
    /// ([`DIFF_NO_OTHER`]) or a different concrete type
    /// ([`DIFF_DIFFERENT_TYPES`]).
    pub fn get_difference(&self, other: Option<&Instance>, stop_at_first: bool) -> Vec<String> {
        let Some(other) = other else {
            return vec![DIFF_NO_OTHER.to_string()];
        };
        if self.same(other) {
            return Vec::new();
        }
        if !Arc::ptr_eq(&self.schema, &other.schema) {
            return vec![DIFF_DIFFERENT_TYPES.to_string()];
        }

        let mut differences = Vec::new();
        for property in &self.schema.properties {
            let a = self.stored(property.name());
            let b = other.stored(property.name());
            let equal = match &property.equal {
                Some(eq) => match (a, b) {
                    (Some(a), Some(b)) => eq(a, b),
                    (None, None) => true,
                    _ => false,
                },
                None => general_equal(a, b),
            };
            if !equal {
                differences.push(property.name().to_string());
                if stop_at_first {
                    break;
                }
            }
        }
        differences
    }

    /// Stored-value equality: same concrete type, and every property equal
    /// with no read-time defaulting.
    pub fn equals(&self, other: Option<&Instance>) -> bool {
        self.get_difference(other, true).is_empty()
    }

    /// Read-accessor equality: defaults participate, so an instance with an
    /// explicit value equal to the other side's default is `equivalent` to it
    /// without being `equals`. Accessor failures count as inequality.
    pub fn equivalent(&self, other: Option<&Instance>) -> bool {
        let Some(other) = other else { return false };
        if self.same(other) {
            return true;
        }
        if !Arc::ptr_eq(&self.schema, &other.schema) {
            return false;
        }

        for property in &self.schema.properties {
            let (Ok(a), Ok(b)) = (self.get(property.name()), other.get(property.name())) else {
                return false;
            };
            let equal = match &property.equal {
                Some(eq) => eq(&a, &b),
                None => general_equal(Some(&a), Some(&b)),
            };
            if !equal {
                return false;
            }
        }
        true
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.equals(Some(other))
    }
}

impl Equatable for Instance {
    fn equals(&self, other: Option<&Self>) -> bool {
        Instance::equals(self, other)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stored("name") {
            Some(PropValue::Plain(Json::String(name))) => {
                write!(f, "[{}: {}]", self.type_name(), name)
            }
            _ => write!(f, "[{}]", self.type_name()),
        }
    }
}

/// Serializes as the `to_js` shape, so generic JSON stringification of an
/// instance just works.
impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_js().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use serde_json::json;

    use super::*;
    use crate::property::{Property, ensure};

    fn gadget_schema() -> Arc<Schema> {
        static SCHEMA: LazyLock<Arc<Schema>> = LazyLock::new(|| {
            Schema::builder("Gadget")
                .property(Property::new("name"))
                .property(
                    Property::new("power")
                        .default_value(10)
                        .validate(ensure::number)
                        .validate(ensure::non_negative),
                )
                .property(Property::new("tags").array())
                .property(Property::new("notes").default_value(json!([])).empty_array_is_ok())
                .build()
        });
        SCHEMA.clone()
    }

    fn gadget(js: Json) -> Instance {
        gadget_schema().hydrate(&js, None).unwrap()
    }

    #[test]
    fn getters_apply_defaults_at_read_time() {
        let g = gadget(json!({ "name": "torch" }));
        assert_eq!(g.get("power").unwrap(), PropValue::from(10i64));
        assert!(g.stored("power").is_none());
    }

    #[test]
    fn unknown_accessors_are_descriptive() {
        let g = gadget(json!({ "name": "torch" }));
        assert_eq!(
            g.get("wattage").unwrap_err().to_string(),
            "no getter was found for 'wattage' on Gadget"
        );
        assert_eq!(
            g.change("wattage", 3i64).unwrap_err().to_string(),
            "no changer was found for 'wattage' on Gadget"
        );
    }

    #[test]
    fn change_returns_same_instance_for_identical_value() {
        let g = gadget(json!({ "name": "torch", "power": 5 }));
        let unchanged = g.change("power", 5i64).unwrap();
        assert!(g.same(&unchanged));

        let changed = g.change("power", 6i64).unwrap();
        assert!(!g.same(&changed));
        assert_eq!(changed.get("power").unwrap(), PropValue::from(6i64));
        // the original is untouched
        assert_eq!(g.get("power").unwrap(), PropValue::from(5i64));
    }

    #[test]
    fn change_to_null_clears_an_optional_property() {
        let g = gadget(json!({ "name": "torch", "power": 5 }));
        let cleared = g.change("power", Json::Null).unwrap();
        assert!(cleared.stored("power").is_none());
        assert_eq!(cleared.get("power").unwrap(), PropValue::from(10i64));
    }

    #[test]
    fn change_revalidates() {
        let g = gadget(json!({ "name": "torch" }));
        assert_eq!(
            g.change("power", -1i64).unwrap_err().to_string(),
            "Gadget.power must be non negative"
        );
    }

    #[test]
    fn change_many_applies_sequentially_and_rejects_unknowns() {
        let g = gadget(json!({ "name": "torch" }));
        let changed = g
            .change_many([("name", PropValue::from("lamp")), ("power", PropValue::from(3i64))])
            .unwrap();
        assert_eq!(changed.get("name").unwrap(), PropValue::from("lamp"));
        assert_eq!(changed.get("power").unwrap(), PropValue::from(3i64));

        assert_eq!(
            g.change_many([("wattage", PropValue::from(1i64))]).unwrap_err().to_string(),
            "unknown property: wattage"
        );
    }

    #[test]
    fn array_kind_defaults_to_empty_at_construction() {
        let g = gadget(json!({ "name": "torch" }));
        assert_eq!(g.stored("tags"), Some(&PropValue::Plain(json!([]))));
        // but serialization omits the empty array
        assert_eq!(g.to_js(), json!({ "name": "torch" }));
    }

    #[test]
    fn empty_array_is_ok_survives_serialization() {
        let g = gadget(json!({ "name": "torch", "notes": [] }));
        assert_eq!(g.to_js(), json!({ "name": "torch", "notes": [] }));
    }

    #[test]
    fn value_of_has_no_defaults() {
        let g = gadget(json!({ "name": "torch" }));
        let bag = g.value_of();
        assert!(bag.contains_key("name"));
        assert!(!bag.contains_key("power"));
    }

    #[test]
    fn difference_reports_sentinels_and_names() {
        let a = gadget(json!({ "name": "torch" }));
        let b = gadget(json!({ "name": "lamp", "power": 3 }));

        assert_eq!(a.get_difference(None, false), vec![DIFF_NO_OTHER]);
        assert_eq!(a.get_difference(Some(&a), false), Vec::<String>::new());
        assert_eq!(a.get_difference(Some(&b), false), vec!["name", "power"]);
        assert_eq!(a.get_difference(Some(&b), true), vec!["name"]);
    }

    #[test]
    fn equals_is_reflexive_and_rejects_absent() {
        let a = gadget(json!({ "name": "torch" }));
        assert!(a.equals(Some(&a)));
        assert!(!a.equals(None));
    }

    #[test]
    fn explicit_default_is_equivalent_but_not_equal() {
        let implicit = gadget(json!({ "name": "torch" }));
        let explicit = gadget(json!({ "name": "torch", "power": 10 }));
        assert!(!implicit.equals(Some(&explicit)));
        assert!(implicit.equivalent(Some(&explicit)));
    }

    #[test]
    fn display_includes_plain_string_name() {
        let g = gadget(json!({ "name": "torch" }));
        assert_eq!(g.to_string(), "[Gadget: torch]");
    }

    #[test]
    fn serde_serialization_matches_to_js() {
        let g = gadget(json!({ "name": "torch", "power": 3 }));
        assert_eq!(serde_json::to_value(&g).unwrap(), g.to_js());
    }
}
