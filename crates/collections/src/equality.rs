//! Value-equality over types exposing an explicit equality capability.
//!
//! In every predicate here, both-absent counts as equal and one-absent does
//! not.

use std::collections::HashMap;

/// The equality capability: compare against another instance that may be
/// absent.
///
/// This is the nominal seam collaborating types implement to participate in
/// reconciliation and in the object model's nested equality.
pub trait Equatable {
    fn equals(&self, other: Option<&Self>) -> bool;
}

/// Equality between two possibly-absent equatables.
pub fn equatable_equal<T: Equatable>(a: Option<&T>, b: Option<&T>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.equals(Some(b)),
        _ => false,
    }
}

/// Element-wise equality between two possibly-absent sequences of equatables.
pub fn equatable_arrays_equal<T: Equatable>(a: Option<&[T]>, b: Option<&[T]>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals(Some(y)))
        }
        _ => false,
    }
}

/// Per-key equality between two possibly-absent lookups of equatables: same
/// key set, and equal value under every key.
pub fn equatable_lookups_equal<T: Equatable>(
    a: Option<&HashMap<String, T>>,
    b: Option<&HashMap<String, T>>,
) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            a.len() == b.len()
                && a.iter().all(|(k, x)| b.get(k).is_some_and(|y| x.equals(Some(y))))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Tag(String);

    impl Equatable for Tag {
        fn equals(&self, other: Option<&Self>) -> bool {
            other.is_some_and(|o| o.0 == self.0)
        }
    }

    fn tag(s: &str) -> Tag {
        Tag(s.to_string())
    }

    #[test]
    fn absent_operands() {
        assert!(equatable_equal::<Tag>(None, None));
        assert!(!equatable_equal(Some(&tag("a")), None));
        assert!(!equatable_equal(None, Some(&tag("a"))));
    }

    #[test]
    fn present_operands_delegate() {
        assert!(equatable_equal(Some(&tag("a")), Some(&tag("a"))));
        assert!(!equatable_equal(Some(&tag("a")), Some(&tag("b"))));
    }

    #[test]
    fn arrays_compare_element_wise() {
        let a = vec![tag("a"), tag("b")];
        let b = vec![tag("a"), tag("b")];
        let c = vec![tag("a")];
        assert!(equatable_arrays_equal(Some(&a[..]), Some(&b[..])));
        assert!(!equatable_arrays_equal(Some(&a[..]), Some(&c[..])));
        assert!(equatable_arrays_equal::<Tag>(None, None));
        assert!(!equatable_arrays_equal(Some(&a[..]), None));
    }

    #[test]
    fn lookups_compare_per_key() {
        let mut a = HashMap::new();
        a.insert("x".to_string(), tag("a"));
        let mut b = HashMap::new();
        b.insert("x".to_string(), tag("a"));
        assert!(equatable_lookups_equal(Some(&a), Some(&b)));

        b.insert("y".to_string(), tag("b"));
        assert!(!equatable_lookups_equal(Some(&a), Some(&b)));

        let mut c = HashMap::new();
        c.insert("x".to_string(), tag("z"));
        assert!(!equatable_lookups_equal(Some(&a), Some(&c)));
    }
}
