use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::error::ConfigError;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;

/// A hash set implemented using the chained [`HashTable`] as the underlying
/// storage.
///
/// `HashSet<T, S>` stores values of type `T` where `T` implements
/// `Hash + Eq` and uses a configurable hasher builder `S` to hash values.
/// The underlying table keeps its load factor inside the same configurable
/// bounds as [`HashMap`](crate::HashMap).
///
/// Unlike the map, two sets compare equal by length and membership alone;
/// capacity and bounds do not participate.
#[derive(Clone)]
pub struct HashSet<T, S = DefaultHashBuilder> {
    table: HashTable<T>,
    hash_builder: S,
}

impl<T, S> PartialEq for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, S> Eq for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
}

impl<T, S> Debug for HashSet<T, S>
where
    T: Debug + Hash + Eq,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, S> HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty set with the default load-factor bounds and the
    /// given hasher builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::new(),
            hash_builder,
        }
    }

    /// Creates an empty set with the given load-factor bounds and hasher
    /// builder.
    ///
    /// Fails like [`HashTable::with_load_factors`] when the bounds are out
    /// of order or outside `[0, 1]`.
    pub fn with_load_factors_and_hasher(
        lower: f64,
        upper: f64,
        hash_builder: S,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            table: HashTable::with_load_factors(lower, upper)?,
            hash_builder,
        })
    }

    /// Returns the number of values in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no values.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of buckets; always a power of two.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns `len / capacity`.
    pub fn load_factor(&self) -> f64 {
        self.table.load_factor()
    }

    /// Removes all values from the set, keeping the current capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Adds a value to the set.
    ///
    /// Returns `false` when the value was already present; the set is
    /// unchanged in that case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashSet;
    /// #
    /// let mut lengths: HashSet<usize> = HashSet::new();
    /// assert!(lengths.insert(4));
    /// assert!(!lengths.insert(4));
    /// assert_eq!(lengths.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        let hash = self.hash_builder.hash_one(&value);
        match self.table.entry(hash, |v| v == &value) {
            TableEntry::Occupied(_) => false,
            TableEntry::Vacant(entry) => {
                entry.insert(value);
                true
            }
        }
    }

    /// Returns `true` if the set contains the value.
    pub fn contains(&self, value: &T) -> bool {
        let hash = self.hash_builder.hash_one(value);
        self.table.find(hash, |v| v == value).is_some()
    }

    /// Removes a value from the set.
    ///
    /// Returns `true` when the value was present. A successful removal can
    /// shrink the table.
    pub fn remove(&mut self, value: &T) -> bool {
        let hash = self.hash_builder.hash_one(value);
        self.table.remove(hash, |v| v == value).is_some()
    }

    /// Returns an iterator over the values of the set.
    ///
    /// Values are yielded in bucket order, then within-bucket insertion
    /// order; any mutation may reorder them.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator that removes and yields all values.
    pub fn drain(&mut self) -> Drain<'_, T> {
        Drain {
            inner: self.table.drain(),
        }
    }
}

impl<T, S> HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates an empty set with the default load-factor bounds
    /// (0.25 / 0.75) and the default hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashSet;
    /// #
    /// let set: HashSet<u32> = HashSet::new();
    /// assert!(set.is_empty());
    /// assert_eq!(set.capacity(), 16);
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates an empty set with the given load-factor bounds.
    pub fn with_load_factors(lower: f64, upper: f64) -> Result<Self, ConfigError> {
        Self::with_load_factors_and_hasher(lower, upper, S::default())
    }
}

impl<T, S> Default for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// An iterator over the values of a [`HashSet`].
pub struct Iter<'a, T> {
    inner: crate::hash_table::Iter<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// A draining iterator over the values of a [`HashSet`].
pub struct Drain<'a, T> {
    inner: crate::hash_table::Drain<'a, T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use core::hash::BuildHasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap_or(0),
                k2: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    type TestSet<T> = HashSet<T, SipHashBuilder>;

    #[test]
    fn insert_contains_remove() {
        let mut set = TestSet::new();

        assert!(set.insert("a".to_string()));
        assert!(set.insert("b".to_string()));
        assert!(!set.insert("a".to_string()));
        assert_eq!(set.len(), 2);

        assert!(set.contains(&"a".to_string()));
        assert!(!set.contains(&"c".to_string()));

        assert!(set.remove(&"a".to_string()));
        assert!(!set.remove(&"a".to_string()));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn resizes_like_the_table() {
        let mut set = TestSet::new();
        for i in 0..12u32 {
            set.insert(i);
        }
        assert_eq!(set.capacity(), 16);

        set.insert(12);
        assert_eq!(set.capacity(), 32);
    }

    #[test]
    fn iter_visits_each_value_once() {
        let mut set = TestSet::new();
        for i in 0..10u32 {
            set.insert(i);
        }

        let mut seen = [false; 10];
        for &value in set.iter() {
            assert!(!seen[value as usize]);
            seen[value as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn equality_is_membership_based() {
        let mut a = TestSet::new();
        let mut b = TestSet::new();
        for i in 0..5u32 {
            a.insert(i);
        }
        for i in (0..5u32).rev() {
            b.insert(i);
        }
        assert_eq!(a, b);

        b.remove(&0);
        assert_ne!(a, b);
    }

    #[test]
    fn drain_and_clear() {
        let mut set = TestSet::new();
        for i in 0..6u32 {
            set.insert(i);
        }

        let drained: std::collections::HashSet<u32> = set.drain().collect();
        assert_eq!(drained.len(), 6);
        assert!(set.is_empty());

        for i in 0..6u32 {
            set.insert(i);
        }
        set.clear();
        assert!(set.is_empty());
    }
}
