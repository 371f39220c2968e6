//! General equality over dynamic property values.
//!
//! This is the default equality the difference machinery uses when a property
//! declares no custom comparator: structural for plain JSON, instant-based
//! for dates, and recursive stored-value equality for nested instances.

use std::collections::HashMap;

use serde_json::Value as Json;

use crate::value::PropValue;

pub(crate) fn values_equal(a: &PropValue, b: &PropValue) -> bool {
    match (a, b) {
        (PropValue::Plain(a), PropValue::Plain(b)) => a == b,
        (PropValue::Date(a), PropValue::Date(b)) => a == b,
        (PropValue::Nested(a), PropValue::Nested(b)) => a.equals(Some(b)),
        (PropValue::NestedArray(a), PropValue::NestedArray(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals(Some(y)))
        }
        // a plain empty array and an empty nested array hold the same nothing
        (PropValue::Plain(Json::Array(a)), PropValue::NestedArray(b))
        | (PropValue::NestedArray(b), PropValue::Plain(Json::Array(a))) => {
            a.is_empty() && b.is_empty()
        }
        _ => false,
    }
}

/// Equality over possibly-absent values; two absent values are equal.
pub fn general_equal(a: Option<&PropValue>, b: Option<&PropValue>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => values_equal(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Element-wise equality over possibly-absent sequences.
pub fn general_arrays_equal(a: Option<&[PropValue]>, b: Option<&[PropValue]>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (None, None) => true,
        _ => false,
    }
}

/// Key-wise equality over possibly-absent lookups.
pub fn general_lookups_equal(
    a: Option<&HashMap<String, PropValue>>,
    b: Option<&HashMap<String, PropValue>>,
) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => {
            a.len() == b.len()
                && a.iter().all(|(k, v)| b.get(k).is_some_and(|w| values_equal(v, w)))
        }
        (None, None) => true,
        _ => false,
    }
}
