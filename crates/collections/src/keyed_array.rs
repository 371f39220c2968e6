//! Unique-key collections modeled as ordered sequences.
//!
//! A [`KeyedArray`] bundles a key-extraction function and exposes upsert,
//! dedupe and lookup operations over plain slices. Validity means "no
//! duplicate keys" (first occurrence wins when deciding what a duplicate is).

use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;

use crate::error::{CollectionError, CollectionResult};

/// Keyed view over ordered sequences of `T`, parameterized by a key extractor.
pub struct KeyedArray<T, F>
where
    F: Fn(&T) -> &str,
{
    get_key: F,
    _marker: PhantomData<fn(&T)>,
}

impl<T, F> KeyedArray<T, F>
where
    F: Fn(&T) -> &str,
{
    pub fn new(get_key: F) -> Self {
        Self { get_key, _marker: PhantomData }
    }

    /// First element whose key matches, if any.
    pub fn get<'a>(&self, seq: &'a [T], key: &str) -> Option<&'a T> {
        seq.iter().find(|x| (self.get_key)(x) == key)
    }

    /// True iff all keys are unique.
    pub fn is_valid(&self, seq: &[T]) -> bool {
        let mut seen = HashSet::new();
        seq.iter().all(|x| seen.insert((self.get_key)(x).to_string()))
    }

    /// Like [`is_valid`](Self::is_valid) but fails with a descriptive error
    /// naming the duplicate key and the optional context labels.
    pub fn check_valid(
        &self,
        seq: &[T],
        what: Option<&str>,
        place: Option<&str>,
    ) -> CollectionResult<()> {
        let mut seen = HashSet::new();
        for x in seq {
            let key = (self.get_key)(x);
            if !seen.insert(key.to_string()) {
                return Err(CollectionError::duplicate_key(what, key, place));
            }
        }
        Ok(())
    }

    /// Upsert: replace the first element with a matching key in place
    /// (preserving its position), or append when the key is absent.
    pub fn override_by_key(&self, seq: &[T], replacement: T) -> Vec<T>
    where
        T: Clone,
    {
        let key = (self.get_key)(&replacement).to_string();
        let mut out = Vec::with_capacity(seq.len() + 1);
        let mut replaced = false;
        for x in seq {
            if !replaced && (self.get_key)(x) == key {
                out.push(replacement.clone());
                replaced = true;
            } else {
                out.push(x.clone());
            }
        }
        if !replaced {
            out.push(replacement);
        }
        out
    }

    /// Batch upsert with the same semantics as
    /// [`override_by_key`](Self::override_by_key), driven by a key→index map
    /// so large batches avoid repeated linear scans. Untouched elements keep
    /// their relative order, new entries are appended in replacement order,
    /// and later replacements for the same key win.
    pub fn overrides_by_key(
        &self,
        seq: &[T],
        replacements: impl IntoIterator<Item = T>,
    ) -> Vec<T>
    where
        T: Clone,
    {
        let mut key_to_index: HashMap<String, usize> = HashMap::with_capacity(seq.len());
        for (i, x) in seq.iter().enumerate() {
            key_to_index.entry((self.get_key)(x).to_string()).or_insert(i);
        }

        let mut out = seq.to_vec();
        for replacement in replacements {
            let key = (self.get_key)(&replacement).to_string();
            match key_to_index.get(&key) {
                Some(&i) => out[i] = replacement,
                None => {
                    key_to_index.insert(key, out.len());
                    out.push(replacement);
                }
            }
        }
        out
    }

    /// New sequence keeping only the first occurrence of each key.
    pub fn dedupe(&self, seq: &[T]) -> Vec<T>
    where
        T: Clone,
    {
        let mut seen = HashSet::new();
        seq.iter()
            .filter(|x| seen.insert((self.get_key)(x).to_string()))
            .cloned()
            .collect()
    }

    /// New sequence with all entries having the key removed.
    pub fn delete_by_key(&self, seq: &[T], key: &str) -> Vec<T>
    where
        T: Clone,
    {
        seq.iter().filter(|x| (self.get_key)(x) != key).cloned().collect()
    }

    /// Mapping from key to the first element with that key.
    pub fn to_map(&self, seq: &[T]) -> HashMap<String, T>
    where
        T: Clone,
    {
        let mut map = HashMap::with_capacity(seq.len());
        for x in seq {
            map.entry((self.get_key)(x).to_string()).or_insert_with(|| x.clone());
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Account {
        account_id: &'static str,
        score: i64,
    }

    fn account(account_id: &'static str, score: i64) -> Account {
        Account { account_id, score }
    }

    fn accounts() -> Vec<Account> {
        vec![account("UK", 1), account("USA", 2), account("Italy", 3)]
    }

    fn keyed() -> KeyedArray<Account, fn(&Account) -> &str> {
        KeyedArray::new(|x: &Account| x.account_id)
    }

    #[test]
    fn get_returns_first_match() {
        let seq = accounts();
        assert_eq!(keyed().get(&seq, "USA"), Some(&account("USA", 2)));
        assert_eq!(keyed().get(&seq, "Russia"), None);
    }

    #[test]
    fn validity_is_first_seen_wins() {
        let seq = accounts();
        assert!(keyed().is_valid(&seq));
        assert!(keyed().check_valid(&seq, Some("account"), None).is_ok());

        let mut dup = accounts();
        dup.push(account("UK", 9));
        assert!(!keyed().is_valid(&dup));
        assert_eq!(
            keyed()
                .check_valid(&dup, Some("account"), Some("ledger"))
                .unwrap_err()
                .to_string(),
            "duplicate account 'UK' in ledger"
        );
    }

    #[test]
    fn override_by_key_replaces_in_place() {
        let seq = accounts();
        assert_eq!(
            keyed().override_by_key(&seq, account("USA", 5)),
            vec![account("UK", 1), account("USA", 5), account("Italy", 3)]
        );
    }

    #[test]
    fn override_by_key_appends_when_absent() {
        let seq = accounts();
        assert_eq!(
            keyed().override_by_key(&seq, account("Russia", 5)),
            vec![
                account("UK", 1),
                account("USA", 2),
                account("Italy", 3),
                account("Russia", 5)
            ]
        );
    }

    #[test]
    fn overrides_by_key_preserves_order_and_appends_in_batch_order() {
        let seq = accounts();
        let out = keyed().overrides_by_key(
            &seq,
            vec![account("Italy", 30), account("Russia", 4), account("UK", 10)],
        );
        assert_eq!(
            out,
            vec![
                account("UK", 10),
                account("USA", 2),
                account("Italy", 30),
                account("Russia", 4)
            ]
        );
    }

    #[test]
    fn overrides_by_key_later_replacement_wins() {
        let seq = accounts();
        let out =
            keyed().overrides_by_key(&seq, vec![account("Russia", 4), account("Russia", 7)]);
        assert_eq!(out.last(), Some(&account("Russia", 7)));
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let mut seq = accounts();
        seq.extend(accounts());
        assert_eq!(keyed().dedupe(&seq), accounts());
    }

    #[test]
    fn delete_by_key_removes_all_entries() {
        let seq = accounts();
        assert_eq!(
            keyed().delete_by_key(&seq, "USA"),
            vec![account("UK", 1), account("Italy", 3)]
        );
        assert_eq!(keyed().delete_by_key(&seq, "Russia"), accounts());
    }

    #[test]
    fn to_map_keeps_first_element_per_key() {
        let mut seq = accounts();
        seq.push(account("UK", 99));
        let map = keyed().to_map(&seq);
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("UK"), Some(&account("UK", 1)));
    }
}
