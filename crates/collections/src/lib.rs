//! `immodel-collections` — ordered-sequence and keyed-collection utilities.
//!
//! Everything in this crate is pure: operations take slices by reference and
//! return fresh `Vec`s (or a `Cow` where no-op detection matters). Callers own
//! their sequences; nothing here mutates input in place.

pub mod equality;
pub mod error;
pub mod keyed_array;
pub mod named_array;
pub mod simple_array;

pub use equality::{Equatable, equatable_arrays_equal, equatable_equal, equatable_lookups_equal};
pub use error::{CollectionError, CollectionResult};
pub use keyed_array::KeyedArray;
pub use named_array::{Diff, DiffAction, Named, SyncOptions, compute_diffs, synchronize};
