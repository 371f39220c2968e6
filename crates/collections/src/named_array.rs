//! Name-keyed collections, the [`Diff`] entity and the reconciliation
//! algorithm.
//!
//! This specializes [`KeyedArray`] with `name` as the key, which is the
//! convention the object model uses for its property lists.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::trace;

use crate::equality::Equatable;
use crate::error::{CollectionError, CollectionResult};
use crate::keyed_array::KeyedArray;
use crate::simple_array;

/// Exposes the unique `name` of an element.
pub trait Named {
    fn name(&self) -> &str;
}

impl<T: Named> Named for &T {
    fn name(&self) -> &str {
        (*self).name()
    }
}

fn by_name<T: Named>() -> KeyedArray<T, fn(&T) -> &str> {
    KeyedArray::new(|x: &T| x.name())
}

/// True iff all names are unique.
pub fn is_valid<T: Named>(seq: &[T]) -> bool {
    by_name().is_valid(seq)
}

/// Fails with a descriptive error when a name repeats; the optional labels
/// describe what the elements are and where they live.
pub fn check_valid<T: Named>(
    seq: &[T],
    what: Option<&str>,
    place: Option<&str>,
) -> CollectionResult<()> {
    by_name().check_valid(seq, what, place)
}

/// First element with the given name.
pub fn find_by_name<'a, T: Named>(seq: &'a [T], name: &str) -> Option<&'a T> {
    by_name().get(seq, name)
}

/// First element whose name matches case-insensitively.
pub fn find_by_name_ci<'a, T: Named>(seq: &'a [T], name: &str) -> Option<&'a T> {
    let lower = name.to_lowercase();
    simple_array::find(seq, |x| x.name().to_lowercase() == lower)
}

/// Index of the first element with the given name.
pub fn find_index_by_name<T: Named>(seq: &[T], name: &str) -> Option<usize> {
    simple_array::find_index(seq, |x| x.name() == name)
}

pub fn contains_by_name<T: Named>(seq: &[T], name: &str) -> bool {
    simple_array::contains_by(seq, |x| x.name() == name)
}

/// Upsert by name: replace in place or append. See
/// [`KeyedArray::override_by_key`].
pub fn override_by_name<T: Named + Clone>(seq: &[T], replacement: T) -> Vec<T> {
    by_name().override_by_key(seq, replacement)
}

/// Batch upsert by name. See [`KeyedArray::overrides_by_key`].
pub fn overrides_by_name<T: Named + Clone>(
    seq: &[T],
    replacements: impl IntoIterator<Item = T>,
) -> Vec<T> {
    by_name().overrides_by_key(seq, replacements)
}

/// New sequence keeping only the first occurrence of each name.
pub fn dedupe<T: Named + Clone>(seq: &[T]) -> Vec<T> {
    by_name().dedupe(seq)
}

/// New sequence with all entries bearing the name removed.
pub fn delete_by_name<T: Named + Clone>(seq: &[T], name: &str) -> Vec<T> {
    by_name().delete_by_key(seq, name)
}

/// Mapping from name to the first element with that name.
pub fn to_map<T: Named + Clone>(seq: &[T]) -> HashMap<String, T> {
    by_name().to_map(seq)
}

/// The action a [`Diff`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffAction {
    Create,
    Update,
    Delete,
}

/// A before/after pair for one named entity.
///
/// Exactly one of before/after may be absent (create/delete); both present is
/// an update; both absent is rejected at construction, as is a name mismatch
/// between the two sides.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diff<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    before: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    after: Option<T>,
}

impl<T: Named> Diff<T> {
    pub fn new(before: Option<T>, after: Option<T>) -> CollectionResult<Self> {
        match (&before, &after) {
            (None, None) => Err(CollectionError::EmptyDiff),
            (Some(b), Some(a)) if b.name() != a.name() => Err(CollectionError::DiffNameMismatch {
                before: b.name().to_string(),
                after: a.name().to_string(),
            }),
            _ => Ok(Self { before, after }),
        }
    }

    pub fn create(after: T) -> Self {
        Self { before: None, after: Some(after) }
    }

    pub fn delete(before: T) -> Self {
        Self { before: Some(before), after: None }
    }

    pub fn update(before: T, after: T) -> CollectionResult<Self> {
        Self::new(Some(before), Some(after))
    }

    pub fn before(&self) -> Option<&T> {
        self.before.as_ref()
    }

    pub fn after(&self) -> Option<&T> {
        self.after.as_ref()
    }

    pub fn action(&self) -> DiffAction {
        if self.before.is_some() {
            if self.after.is_some() { DiffAction::Update } else { DiffAction::Delete }
        } else {
            DiffAction::Create
        }
    }

    /// The name of the entity this diff is about.
    pub fn name(&self) -> &str {
        if let Some(before) = &self.before {
            return before.name();
        }
        if let Some(after) = &self.after {
            return after.name();
        }
        // constructors reject the both-absent case
        ""
    }
}

impl<'de, T> Deserialize<'de> for Diff<T>
where
    T: Named + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(bound(deserialize = "T: Deserialize<'de>"))]
        struct Raw<T> {
            before: Option<T>,
            after: Option<T>,
        }
        let raw = Raw::<T>::deserialize(deserializer)?;
        Diff::new(raw.before, raw.after).map_err(D::Error::custom)
    }
}

/// Configuration for [`synchronize`]: the key accessor, the equality used to
/// suppress no-op updates, and the three callbacks.
///
/// `new()` defaults to `name` as the key and the [`Equatable`] capability as
/// the equality; every part can be overridden builder-style. Types that are
/// neither [`Named`] nor [`Equatable`] can start from [`SyncOptions::custom`].
pub struct SyncOptions<'a, T> {
    key: Box<dyn Fn(&T) -> String + 'a>,
    equals: Box<dyn Fn(&T, &T) -> bool + 'a>,
    on_enter: Box<dyn FnMut(&T) + 'a>,
    on_update: Box<dyn FnMut(&T, &T) + 'a>,
    on_exit: Box<dyn FnMut(&T) + 'a>,
}

impl<'a, T: Named + Equatable> SyncOptions<'a, T> {
    pub fn new() -> Self {
        Self::custom(|t: &T| t.name().to_string(), |a: &T, b: &T| a.equals(Some(b)))
    }
}

impl<'a, T: Named + Equatable> Default for SyncOptions<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> SyncOptions<'a, T> {
    pub fn custom(
        key: impl Fn(&T) -> String + 'a,
        equals: impl Fn(&T, &T) -> bool + 'a,
    ) -> Self {
        Self {
            key: Box::new(key),
            equals: Box::new(equals),
            on_enter: Box::new(|_| {}),
            on_update: Box::new(|_, _| {}),
            on_exit: Box::new(|_| {}),
        }
    }

    pub fn key(mut self, key: impl Fn(&T) -> String + 'a) -> Self {
        self.key = Box::new(key);
        self
    }

    pub fn equals(mut self, equals: impl Fn(&T, &T) -> bool + 'a) -> Self {
        self.equals = Box::new(equals);
        self
    }

    pub fn on_enter(mut self, f: impl FnMut(&T) + 'a) -> Self {
        self.on_enter = Box::new(f);
        self
    }

    pub fn on_update(mut self, f: impl FnMut(&T, &T) + 'a) -> Self {
        self.on_update = Box::new(f);
        self
    }

    pub fn on_exit(mut self, f: impl FnMut(&T) + 'a) -> Self {
        self.on_exit = Box::new(f);
        self
    }
}

/// Reconciles two keyed ordered sequences into enter/update/exit events.
///
/// `old` is pre-indexed by key and must not contain duplicates; `new` may
/// repeat keys (repeats past the first match are reported as entries). For
/// each element of `new`, in order, a matched key fires `on_update(new, old)`
/// only when the configured equality says they differ; an unmatched key fires
/// `on_enter(new)`. Afterwards `on_exit(old)` fires for every old element
/// that was never matched, in `old` order.
pub fn synchronize<T>(
    old: &[T],
    new: &[T],
    mut opts: SyncOptions<'_, T>,
) -> CollectionResult<()> {
    let mut old_by_key: HashMap<String, usize> = HashMap::with_capacity(old.len());
    for (i, old_thing) in old.iter().enumerate() {
        let key = (opts.key)(old_thing);
        if old_by_key.insert(key.clone(), i).is_some() {
            return Err(CollectionError::duplicate_key(Some("key"), &key, None));
        }
    }

    let mut matched = vec![false; old.len()];
    for new_thing in new {
        let key = (opts.key)(new_thing);
        match old_by_key.get(&key) {
            Some(&i) if !matched[i] => {
                if !(opts.equals)(new_thing, &old[i]) {
                    trace!(key = %key, "synchronize: update");
                    (opts.on_update)(new_thing, &old[i]);
                }
                matched[i] = true;
            }
            _ => {
                trace!(key = %key, "synchronize: enter");
                (opts.on_enter)(new_thing);
            }
        }
    }

    for (i, old_thing) in old.iter().enumerate() {
        if !matched[i] {
            trace!(key = %(opts.key)(old_thing), "synchronize: exit");
            (opts.on_exit)(old_thing);
        }
    }
    Ok(())
}

/// Runs [`synchronize`] with default options, accumulating one [`Diff`] per
/// callback in the order the callbacks fired.
pub fn compute_diffs<T>(old: &[T], new: &[T]) -> CollectionResult<Vec<Diff<T>>>
where
    T: Named + Equatable + Clone,
{
    let diffs: RefCell<Vec<Diff<T>>> = RefCell::new(Vec::new());
    synchronize(
        old,
        new,
        SyncOptions::new()
            .on_enter(|new_thing: &T| {
                diffs.borrow_mut().push(Diff { before: None, after: Some(new_thing.clone()) });
            })
            .on_update(|new_thing: &T, old_thing: &T| {
                diffs.borrow_mut().push(Diff {
                    before: Some(old_thing.clone()),
                    after: Some(new_thing.clone()),
                });
            })
            .on_exit(|old_thing: &T| {
                diffs.borrow_mut().push(Diff { before: Some(old_thing.clone()), after: None });
            }),
    )?;
    Ok(diffs.into_inner())
}
