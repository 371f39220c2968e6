//! Pure helpers over ordered sequences.
//!
//! All functions take a slice and return a fresh `Vec` (or a `Cow` for
//! [`map_immutable`]), leaving the input untouched.

use std::borrow::Cow;

use crate::error::{CollectionError, CollectionResult};

/// Returns the first element satisfying the predicate.
pub fn find<T>(seq: &[T], mut pred: impl FnMut(&T) -> bool) -> Option<&T> {
    seq.iter().find(|x| pred(x))
}

/// Returns the index of the first element satisfying the predicate.
pub fn find_index<T>(seq: &[T], mut pred: impl FnMut(&T) -> bool) -> Option<usize> {
    seq.iter().position(|x| pred(x))
}

/// Whether the sequence contains an element equal to `value`.
pub fn contains<T: PartialEq>(seq: &[T], value: &T) -> bool {
    seq.contains(value)
}

/// Whether any element satisfies the predicate.
pub fn contains_by<T>(seq: &[T], pred: impl FnMut(&T) -> bool) -> bool {
    find_index(seq, pred).is_some()
}

/// New sequence with every element equal to `value` removed.
pub fn delete<T: Clone + PartialEq>(seq: &[T], value: &T) -> Vec<T> {
    seq.iter().filter(|x| *x != value).cloned().collect()
}

/// New sequence with every element matching the predicate removed.
pub fn delete_by<T: Clone>(seq: &[T], mut pred: impl FnMut(&T) -> bool) -> Vec<T> {
    seq.iter().filter(|x| !pred(x)).cloned().collect()
}

/// New sequence with `value` appended.
pub fn append<T: Clone>(seq: &[T], value: T) -> Vec<T> {
    let mut out = seq.to_vec();
    out.push(value);
    out
}

/// New sequence with `value` inserted at `index`.
///
/// Panics if `index > seq.len()`, like `Vec::insert`.
pub fn insert_index<T: Clone>(seq: &[T], index: usize, value: T) -> Vec<T> {
    let mut out = seq.to_vec();
    out.insert(index, value);
    out
}

/// New sequence with the element at `index` removed.
pub fn delete_index<T: Clone>(seq: &[T], index: usize) -> Vec<T> {
    seq.iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, x)| x.clone())
        .collect()
}

/// New sequence with the element at `index` replaced by `value`.
///
/// Panics if `index >= seq.len()`, like slice indexing.
pub fn change<T: Clone>(seq: &[T], index: usize, value: T) -> Vec<T> {
    let mut out = seq.to_vec();
    out[index] = value;
    out
}

/// New sequence with the element at `item_index` relocated so that it occupies
/// `insert_index` counted in the *original* indexing (the target position is
/// measured before the removal).
pub fn move_index<T: Clone>(
    seq: &[T],
    item_index: usize,
    insert_index: usize,
) -> CollectionResult<Vec<T>> {
    let n = seq.len();
    if item_index >= n {
        return Err(CollectionError::ItemIndexOutOfRange { index: item_index, len: n });
    }
    if insert_index > n {
        return Err(CollectionError::InsertIndexOutOfRange { index: insert_index, len: n });
    }

    let mut out = Vec::with_capacity(n);
    for (i, value) in seq.iter().enumerate() {
        if i == insert_index {
            out.push(seq[item_index].clone());
        }
        if i != item_index {
            out.push(value.clone());
        }
    }
    if insert_index == n {
        out.push(seq[item_index].clone());
    }
    Ok(out)
}

/// Applies `f` to every element, returning the borrowed input when no element
/// changed. Callers can rely on `Cow::Borrowed` as a cheap no-op signal.
pub fn map_immutable<T, F>(seq: &[T], mut f: F) -> Cow<'_, [T]>
where
    T: Clone + PartialEq,
    F: FnMut(&T) -> T,
{
    let mut changed = false;
    let mapped: Vec<T> = seq
        .iter()
        .map(|x| {
            let mapped = f(x);
            if mapped != *x {
                changed = true;
            }
            mapped
        })
        .collect();
    if changed { Cow::Owned(mapped) } else { Cow::Borrowed(seq) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn countries() -> Vec<String> {
        vec!["UK".to_string(), "USA".to_string(), "Italy".to_string()]
    }

    #[test]
    fn find_first_match() {
        let seq = countries();
        assert_eq!(find(&seq, |x| x.len() == 3), Some(&"USA".to_string()));
        assert_eq!(find(&seq, |x| x.len() == 7), None);
    }

    #[test]
    fn find_index_first_match() {
        let seq = countries();
        assert_eq!(find_index(&seq, |x| x.len() == 3), Some(1));
        assert_eq!(find_index(&seq, |x| x.len() == 7), None);
    }

    #[test]
    fn contains_value_and_predicate() {
        let seq = countries();
        assert!(contains(&seq, &"USA".to_string()));
        assert!(!contains(&seq, &"Russia".to_string()));
        assert!(contains_by(&seq, |x| x.starts_with("It")));
    }

    #[test]
    fn delete_removes_all_matches() {
        let seq = countries();
        assert_eq!(delete(&seq, &"USA".to_string()), vec!["UK", "Italy"]);
        assert_eq!(delete(&seq, &"Russia".to_string()), countries());
        assert_eq!(delete_by(&seq, |x| x.len() > 2), vec!["UK"]);
    }

    #[test]
    fn insert_index_prepends() {
        let seq: Vec<char> = "ABCD".chars().collect();
        let out: String = insert_index(&seq, 0, 'P').into_iter().collect();
        assert_eq!(out, "PABCD");
    }

    #[test]
    fn delete_index_removes_position() {
        let seq: Vec<char> = "ABCD".chars().collect();
        let out: String = delete_index(&seq, 1).into_iter().collect();
        assert_eq!(out, "ACD");
    }

    #[test]
    fn change_replaces_position() {
        let seq: Vec<char> = "ABCD".chars().collect();
        let out: String = change(&seq, 2, 'X').into_iter().collect();
        assert_eq!(out, "ABXD");
    }

    #[test]
    fn move_index_rejects_out_of_range() {
        let seq: Vec<char> = "ABCD".chars().collect();
        assert_eq!(
            move_index(&seq, 6, 0),
            Err(CollectionError::ItemIndexOutOfRange { index: 6, len: 4 })
        );
        assert_eq!(
            move_index(&seq, 0, 5),
            Err(CollectionError::InsertIndexOutOfRange { index: 5, len: 4 })
        );
    }

    #[test]
    fn move_index_targets_original_positions() {
        let seq: Vec<char> = "ABCD".chars().collect();
        let moved = |from: usize, to: usize| -> String {
            move_index(&seq, from, to).unwrap().into_iter().collect()
        };
        assert_eq!(moved(0, 0), "ABCD");
        assert_eq!(moved(0, 1), "ABCD");
        assert_eq!(moved(0, 2), "BACD");
        assert_eq!(moved(0, 3), "BCAD");
        assert_eq!(moved(0, 4), "BCDA");
        assert_eq!(moved(3, 0), "DABC");
        assert_eq!(moved(2, 1), "ACBD");
    }

    mod proptest_tests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            /// Property: a successful move preserves the multiset of elements
            /// and parks the moved element at the requested original-index
            /// position.
            #[test]
            fn move_index_preserves_elements(
                seq in proptest::collection::vec(0u8..50, 1..20),
                item_index in 0usize..20,
                insert_index in 0usize..21,
            ) {
                prop_assume!(item_index < seq.len());
                prop_assume!(insert_index <= seq.len());

                let moved = move_index(&seq, item_index, insert_index).unwrap();
                prop_assert_eq!(moved.len(), seq.len());

                let mut a = moved.clone();
                let mut b = seq.clone();
                a.sort_unstable();
                b.sort_unstable();
                prop_assert_eq!(a, b);
            }

            /// Property: an identity mapping always reuses the input slice.
            #[test]
            fn map_immutable_identity_borrows(
                seq in proptest::collection::vec(0u8..50, 0..20),
            ) {
                prop_assert!(matches!(map_immutable(&seq, |x| *x), Cow::Borrowed(_)));
            }
        }
    }

    #[test]
    fn map_immutable_reuses_input_when_unchanged() {
        let seq = countries();
        let same = map_immutable(&seq, |x| x.clone());
        assert!(matches!(same, Cow::Borrowed(_)));

        let upper = map_immutable(&seq, |x| x.to_uppercase());
        assert!(matches!(upper, Cow::Owned(_)));
        assert_eq!(upper.as_ref(), ["UK", "USA", "ITALY"]);
        assert_eq!(seq, countries());
    }
}
