#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// The construction-error taxonomy.
///
/// Load-factor bounds and bulk-load inputs are validated up front; nothing
/// else in the crate is fallible.
pub mod error;

/// A hash map implemented over the chained `HashTable`.
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a standard key-value map interface with configurable hashers.
pub mod hash_map;

pub mod hash_table;

/// A hash set implemented over the chained `HashTable`.
///
/// This module provides a `HashSet` that wraps the `HashTable` and provides
/// a standard set interface with configurable hashers.
pub mod hash_set;

#[cfg(test)]
mod proptests;

pub use error::ConfigError;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_set::HashSet;
pub use hash_table::HashTable;

/// The default hasher builder for [`HashMap`] and [`HashSet`].
#[cfg(feature = "foldhash")]
pub type DefaultHashBuilder = foldhash::fast::RandomState;

/// Placeholder for the default hasher builder.
///
/// With the `foldhash` feature disabled there is no default hasher; supply
/// one explicitly through the `with_hasher` constructors.
#[cfg(not(feature = "foldhash"))]
#[derive(Clone, Copy, Debug)]
pub enum DefaultHashBuilder {}
