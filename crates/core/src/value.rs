//! Dynamic property values.
//!
//! A [`PropValue`] is what an instance stores under each property name:
//! plain JSON, a coerced instant, or nested value objects. Absence is modeled
//! as the field missing from the instance's field map; a `Plain(Null)` handed
//! to construction is treated as absent.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value as Json;

use crate::equality;
use crate::instance::Instance;

/// One property's stored value.
#[derive(Debug, Clone)]
pub enum PropValue {
    /// Uncoerced JSON: scalars, plain arrays and plain objects.
    Plain(Json),
    /// A date-typed property's coerced instant.
    Date(DateTime<Utc>),
    /// A single nested value object.
    Nested(Instance),
    /// An array of nested value objects.
    NestedArray(Vec<Instance>),
}

impl PropValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropValue::Plain(Json::Null))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Plain(Json::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropValue::Plain(Json::Number(n)) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Plain(Json::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            PropValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            PropValue::Nested(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_instances(&self) -> Option<&[Instance]> {
        match self {
            PropValue::NestedArray(instances) => Some(instances),
            _ => None,
        }
    }

    /// JSON shape of this value; nested instances serialize via their own
    /// `to_js`, dates as RFC 3339 with millisecond precision.
    pub fn to_js(&self) -> Json {
        match self {
            PropValue::Plain(j) => j.clone(),
            PropValue::Date(d) => {
                Json::String(d.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
            }
            PropValue::Nested(instance) => instance.to_js(),
            PropValue::NestedArray(instances) => {
                Json::Array(instances.iter().map(Instance::to_js).collect())
            }
        }
    }

    /// Serialization-inclusion test: null is undefined, arrays must be
    /// non-empty unless `empty_array_is_ok`.
    pub(crate) fn is_defined(&self, empty_array_is_ok: bool) -> bool {
        match self {
            PropValue::Plain(Json::Null) => false,
            PropValue::Plain(Json::Array(items)) => !items.is_empty() || empty_array_is_ok,
            PropValue::NestedArray(items) => !items.is_empty() || empty_array_is_ok,
            _ => true,
        }
    }

    pub(crate) fn kind_description(&self) -> String {
        match self {
            PropValue::Plain(_) => "a plain value".to_string(),
            PropValue::Date(_) => "a date".to_string(),
            PropValue::Nested(instance) => instance.type_name().to_string(),
            PropValue::NestedArray(_) => "an array".to_string(),
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        equality::values_equal(self, other)
    }
}

impl From<Json> for PropValue {
    fn from(j: Json) -> Self {
        PropValue::Plain(j)
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Plain(Json::String(s.to_string()))
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Plain(Json::String(s))
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Plain(Json::Bool(b))
    }
}

impl From<i64> for PropValue {
    fn from(n: i64) -> Self {
        PropValue::Plain(Json::from(n))
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Plain(Json::from(n))
    }
}

impl From<DateTime<Utc>> for PropValue {
    fn from(d: DateTime<Utc>) -> Self {
        PropValue::Date(d)
    }
}

impl From<Instance> for PropValue {
    fn from(instance: Instance) -> Self {
        PropValue::Nested(instance)
    }
}

impl From<Vec<Instance>> for PropValue {
    fn from(instances: Vec<Instance>) -> Self {
        PropValue::NestedArray(instances)
    }
}

/// Coerces JSON into an instant: RFC 3339 strings, bare `YYYY-MM-DD` dates
/// (midnight UTC), or epoch milliseconds.
pub(crate) fn coerce_date(j: &Json) -> Option<DateTime<Utc>> {
    match j {
        Json::String(s) => {
            if let Ok(parsed) = s.parse::<DateTime<Utc>>() {
                return Some(parsed);
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|ndt| Utc.from_utc_datetime(&ndt))
        }
        Json::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

/// Human formatting for error messages: strings render bare, everything else
/// as compact JSON.
pub(crate) fn display_json(j: &Json) -> String {
    match j {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_date_accepts_rfc3339_and_millis() {
        let parsed = coerce_date(&Json::from("2016-01-01T01:02:03.456Z")).unwrap();
        assert_eq!(parsed.timestamp_millis(), 1_451_610_123_456);

        let from_millis = coerce_date(&Json::from(1_451_610_123_456i64)).unwrap();
        assert_eq!(parsed, from_millis);

        let midnight = coerce_date(&Json::from("2016-01-01")).unwrap();
        assert_eq!(midnight.timestamp_millis(), 1_451_606_400_000);
    }

    #[test]
    fn coerce_date_rejects_garbage() {
        assert_eq!(coerce_date(&Json::from("time for laughs")), None);
        assert_eq!(coerce_date(&Json::Bool(true)), None);
    }

    #[test]
    fn date_round_trips_through_js() {
        let pv = PropValue::Date(coerce_date(&Json::from("2016-01-01T01:02:03.456Z")).unwrap());
        assert_eq!(pv.to_js(), Json::from("2016-01-01T01:02:03.456Z"));
    }

    #[test]
    fn defined_treats_empty_arrays_specially() {
        assert!(!PropValue::Plain(Json::Null).is_defined(false));
        assert!(!PropValue::Plain(Json::Array(vec![])).is_defined(false));
        assert!(PropValue::Plain(Json::Array(vec![])).is_defined(true));
        assert!(PropValue::Plain(Json::from(0)).is_defined(false));
        assert!(PropValue::Plain(Json::Bool(false)).is_defined(false));
    }

    #[test]
    fn display_json_renders_strings_bare() {
        assert_eq!(display_json(&Json::from("farts")), "farts");
        assert_eq!(display_json(&Json::from(3)), "3");
    }
}
