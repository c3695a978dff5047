use alloc::vec::Vec;
use core::fmt::Debug;

use crate::error::ConfigError;

/// Number of buckets a freshly constructed table starts with.
pub const INITIAL_CAPACITY: usize = 16;

/// Load factor below which an erase shrinks the table.
pub const DEFAULT_LOWER_LOAD_FACTOR: f64 = 0.25;

/// Load factor above which an insert grows the table.
pub const DEFAULT_UPPER_LOAD_FACTOR: f64 = 0.75;

/// Capacity multiplier applied on growth and divisor applied on shrink.
const GROWTH_FACTOR: usize = 2;

/// A resizable hash table using separate chaining.
///
/// `HashTable<V>` stores values of type `V` in a power-of-two array of
/// buckets, each bucket an insertion-ordered chain of entries. Unlike
/// standard hash maps, this implementation requires you to provide both the
/// hash value and an equality predicate for each operation; every entry
/// remembers its full 64-bit hash, so resizing never recomputes a hash.
///
/// The table keeps `len / capacity` inside configurable bounds: an insert
/// that would push the load factor above the upper bound doubles the
/// capacity until the bound holds, and an erase that drops it below the
/// lower bound halves the capacity once (never below one bucket).
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use chain_hash::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # fn hash_str(s: &str) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     s.hash(&mut hasher);
/// #     hasher.finish()
/// # }
/// #
/// let mut table: HashTable<String> = HashTable::new();
///
/// match table.entry(hash_str("alice"), |name: &String| name == "alice") {
///     chain_hash::hash_table::Entry::Vacant(entry) => {
///         entry.insert("alice".to_string());
///     }
///     chain_hash::hash_table::Entry::Occupied(_) => {
///         println!("already present");
///     }
/// }
///
/// assert_eq!(table.len(), 1);
/// assert!(table.find(hash_str("alice"), |name| name == "alice").is_some());
/// ```
pub struct HashTable<V> {
    buckets: Vec<Vec<(u64, V)>>,
    len: usize,
    lower: f64,
    upper: f64,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashTable")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("load_factor", &self.load_factor())
            .field("bounds", &(self.lower, self.upper))
            .field(
                "bucket_lengths",
                &self.buckets.iter().map(Vec::len).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<V> Clone for HashTable<V>
where
    V: Clone,
{
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            len: self.len,
            lower: self.lower,
            upper: self.upper,
        }
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> HashTable<V> {
    /// Creates an empty table with the default load-factor bounds.
    ///
    /// The table starts with [`INITIAL_CAPACITY`] buckets and bounds of
    /// [`DEFAULT_LOWER_LOAD_FACTOR`] / [`DEFAULT_UPPER_LOAD_FACTOR`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<u32> = HashTable::new();
    /// assert_eq!(table.capacity(), 16);
    /// assert!(table.is_empty());
    /// ```
    pub fn new() -> Self {
        match Self::with_load_factors(DEFAULT_LOWER_LOAD_FACTOR, DEFAULT_UPPER_LOAD_FACTOR) {
            Ok(table) => table,
            Err(_) => unreachable!("default load factors are valid"),
        }
    }

    /// Creates an empty table with the given load-factor bounds.
    ///
    /// Returns [`ConfigError::LoadFactorOrder`] when `upper < lower` and
    /// [`ConfigError::LoadFactorRange`] when either bound falls outside
    /// `[0, 1]`. Equal bounds are accepted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<u32> = HashTable::with_load_factors(0.1, 0.9).unwrap();
    /// assert_eq!(table.capacity(), 16);
    ///
    /// assert!(HashTable::<u32>::with_load_factors(0.9, 0.1).is_err());
    /// assert!(HashTable::<u32>::with_load_factors(0.5, 1.5).is_err());
    /// ```
    pub fn with_load_factors(lower: f64, upper: f64) -> Result<Self, ConfigError> {
        if upper < lower {
            return Err(ConfigError::LoadFactorOrder { lower, upper });
        }
        if lower < 0.0 || upper > 1.0 {
            return Err(ConfigError::LoadFactorRange { lower, upper });
        }

        Ok(Self {
            buckets: Self::empty_buckets(INITIAL_CAPACITY),
            len: 0,
            lower,
            upper,
        })
    }

    /// Returns the number of values in the table.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table contains no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of buckets.
    ///
    /// Always a power of two and at least 1; changed only by resizing.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `len / capacity`.
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    /// Returns the lower load-factor bound.
    pub fn lower_load_factor(&self) -> f64 {
        self.lower
    }

    /// Returns the upper load-factor bound.
    pub fn upper_load_factor(&self) -> f64 {
        self.upper
    }

    /// Returns the number of entries in the bucket the hash maps to.
    ///
    /// The bucket exists whether or not any entry with this exact hash is
    /// stored in it.
    pub fn bucket_len(&self, hash: u64) -> usize {
        self.buckets[self.bucket_of(hash)].len()
    }

    /// Returns a reference to the value matching the hash and predicate.
    ///
    /// The predicate is only consulted for entries whose stored hash equals
    /// `hash`; the scan is linear in the bucket length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use chain_hash::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table: HashTable<String> = HashTable::new();
    /// table
    ///     .entry(hash_str("a"), |s: &String| s == "a")
    ///     .or_insert("a".to_string());
    ///
    /// assert!(table.find(hash_str("a"), |s| s == "a").is_some());
    /// assert!(table.find(hash_str("b"), |s| s == "b").is_none());
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        self.buckets[self.bucket_of(hash)]
            .iter()
            .find(|(h, v)| *h == hash && eq(v))
            .map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value matching the hash and
    /// predicate.
    ///
    /// The reference is tied to the mutable borrow of the table; it cannot
    /// be held across any operation that might resize.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let bucket = self.bucket_of(hash);
        self.buckets[bucket]
            .iter_mut()
            .find(|(h, v)| *h == hash && eq(v))
            .map(|(_, v)| v)
    }

    /// Returns the entry for the hash and predicate, vacant or occupied.
    ///
    /// When the entry is vacant, the table has already grown (if holding one
    /// more value would breach the upper bound), so [`VacantEntry::insert`]
    /// appends without relocating anything and the reference it returns
    /// stays valid. The capacity reached for a given final size is the same
    /// as if the growth check ran after the insertion.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use chain_hash::hash_table::Entry;
    /// # use chain_hash::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table: HashTable<String> = HashTable::new();
    ///
    /// table
    ///     .entry(hash_str("a"), |s: &String| s == "a")
    ///     .or_insert("a".to_string());
    ///
    /// match table.entry(hash_str("a"), |s: &String| s == "a") {
    ///     Entry::Occupied(entry) => assert_eq!(entry.get(), "a"),
    ///     Entry::Vacant(_) => panic!("should be occupied"),
    /// }
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        let bucket = self.bucket_of(hash);
        let found = self.buckets[bucket]
            .iter()
            .position(|(h, v)| *h == hash && eq(v));

        match found {
            Some(position) => Entry::Occupied(OccupiedEntry {
                table: self,
                bucket,
                position,
            }),
            None => {
                self.grow_to_hold(self.len + 1);
                Entry::Vacant(VacantEntry { table: self, hash })
            }
        }
    }

    /// Removes and returns the value matching the hash and predicate.
    ///
    /// Returns `None` without touching the table when no entry matches. On a
    /// hit, the remaining entries of the bucket keep their relative order,
    /// and if the load factor drops below the lower bound the capacity is
    /// halved once (never below 1) and every entry rehashed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use chain_hash::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table: HashTable<String> = HashTable::new();
    /// table
    ///     .entry(hash_str("a"), |s: &String| s == "a")
    ///     .or_insert("a".to_string());
    ///
    /// assert_eq!(table.remove(hash_str("a"), |s| s == "a"), Some("a".to_string()));
    /// assert_eq!(table.remove(hash_str("a"), |s| s == "a"), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let bucket = self.bucket_of(hash);
        let position = self.buckets[bucket]
            .iter()
            .position(|(h, v)| *h == hash && eq(v))?;

        Some(self.remove_at(bucket, position))
    }

    /// Removes all values, keeping the current capacity.
    ///
    /// `clear` never shrinks; only erases do.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Returns an iterator over the values of the table.
    ///
    /// Values are visited in bucket order and, within a bucket, in insertion
    /// order. The order is stable as long as the table is not mutated; the
    /// borrow checker prevents structural mutation while the iterator is
    /// live.
    ///
    /// Two iterators over the same table compare equal when they rest on the
    /// same position or are both exhausted.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(self)
    }

    /// Returns an iterator that removes and yields all values.
    ///
    /// The table is left empty with its capacity unchanged, even if the
    /// iterator is dropped before being fully consumed.
    pub fn drain(&mut self) -> Drain<'_, V> {
        Drain {
            table: self,
            bucket: 0,
        }
    }

    /// Appends an entry without any duplicate or load-factor check.
    ///
    /// Bulk loading inserts every pair first and runs a single `rebalance`
    /// afterwards; callers are responsible for deduplication.
    pub(crate) fn insert_deferred(&mut self, hash: u64, value: V) {
        let bucket = self.bucket_of(hash);
        self.buckets[bucket].push((hash, value));
        self.len += 1;
    }

    /// Applies the deferred upper-bound check after a bulk load.
    pub(crate) fn rebalance(&mut self) {
        self.grow_to_hold(self.len);
    }

    fn empty_buckets(capacity: usize) -> Vec<Vec<(u64, V)>> {
        let mut buckets = Vec::with_capacity(capacity);
        buckets.resize_with(capacity, Vec::new);
        buckets
    }

    fn bucket_of(&self, hash: u64) -> usize {
        // Capacity is a power of two, so the mask is exact.
        hash as usize & (self.capacity() - 1)
    }

    /// Doubles the capacity until `target` values fit under the upper bound.
    fn grow_to_hold(&mut self, target: usize) {
        let mut new_capacity = self.capacity();
        while target as f64 / new_capacity as f64 > self.upper {
            new_capacity *= GROWTH_FACTOR;
        }
        if new_capacity != self.capacity() {
            self.rehash(new_capacity);
        }
    }

    fn remove_at(&mut self, bucket: usize, position: usize) -> V {
        let (_, value) = self.buckets[bucket].remove(position);
        self.len -= 1;

        if self.load_factor() < self.lower && self.capacity() > 1 {
            let halved = self.capacity() / GROWTH_FACTOR;
            self.rehash(halved);
        }

        value
    }

    /// Rebuilds the bucket array at `new_capacity`.
    ///
    /// The new array is fully allocated before any entry moves, so an
    /// allocation failure aborts with the old table intact.
    fn rehash(&mut self, new_capacity: usize) {
        debug_assert!(new_capacity.is_power_of_two());

        let mut buckets = Self::empty_buckets(new_capacity);
        let mask = new_capacity - 1;
        for bucket in &mut self.buckets {
            for (hash, value) in bucket.drain(..) {
                buckets[hash as usize & mask].push((hash, value));
            }
        }
        self.buckets = buckets;
    }
}

/// A view into a single entry in the table, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts a default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry.
    ///
    /// Returns `None` when the entry is vacant; nothing is inserted.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Option<&'a mut V> {
        match self {
            Entry::Occupied(entry) => {
                let value = entry.into_mut();
                f(value);
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }
}

impl<'a, V> Entry<'a, V>
where
    V: Default,
{
    /// Inserts the default value if the entry is vacant and returns a
    /// mutable reference.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the table.
///
/// The table has already been grown to hold one more value, so inserting
/// here cannot trigger a resize.
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    hash: u64,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Inserts the value into the table and returns a mutable reference to
    /// it.
    pub fn insert(self, value: V) -> &'a mut V {
        let table = self.table;
        let bucket = table.bucket_of(self.hash);
        table.buckets[bucket].push((self.hash, value));
        table.len += 1;

        let position = table.buckets[bucket].len() - 1;
        &mut table.buckets[bucket][position].1
    }
}

/// A view into an occupied entry in the table.
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    bucket: usize,
    position: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.table.buckets[self.bucket][self.position].1
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.table.buckets[self.bucket][self.position].1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        let table = self.table;
        &mut table.buckets[self.bucket][self.position].1
    }

    /// Removes the entry from the table and returns the value.
    ///
    /// Applies the same lower-bound shrink check as [`HashTable::remove`].
    pub fn remove(self) -> V {
        let table = self.table;
        table.remove_at(self.bucket, self.position)
    }
}

/// An iterator over the values of a [`HashTable`].
///
/// This struct is created by the [`iter`] method on [`HashTable`].
///
/// The iterator always rests on the next occupied slot (or the end), so two
/// iterators over the same table at the same logical position compare
/// equal.
///
/// [`iter`]: HashTable::iter
pub struct Iter<'a, V> {
    table: &'a HashTable<V>,
    bucket: usize,
    position: usize,
}

impl<'a, V> Iter<'a, V> {
    fn new(table: &'a HashTable<V>) -> Self {
        let mut iter = Iter {
            table,
            bucket: 0,
            position: 0,
        };
        iter.settle();
        iter
    }

    /// Advances past empty buckets until an occupied slot or the end.
    fn settle(&mut self) {
        while self.bucket < self.table.buckets.len()
            && self.position >= self.table.buckets[self.bucket].len()
        {
            self.bucket += 1;
            self.position = 0;
        }
    }

    fn at_end(&self) -> bool {
        self.bucket >= self.table.buckets.len()
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.at_end() {
            return None;
        }

        let (_, value) = &self.table.buckets[self.bucket][self.position];
        self.position += 1;
        self.settle();
        Some(value)
    }
}

impl<V> PartialEq for Iter<'_, V> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.table, other.table)
            && ((self.at_end() && other.at_end())
                || (self.bucket == other.bucket && self.position == other.position))
    }
}

/// A draining iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`drain`] method on [`HashTable`]. It
/// yields owned `V` values and empties the table as it iterates; dropping
/// it finishes the job.
///
/// [`drain`]: HashTable::drain
pub struct Drain<'a, V> {
    table: &'a mut HashTable<V>,
    bucket: usize,
}

impl<V> Drop for Drain<'_, V> {
    fn drop(&mut self) {
        for _ in &mut *self {}
    }
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        while self.bucket < self.table.buckets.len() {
            if let Some((_, value)) = self.table.buckets[self.bucket].pop() {
                self.table.len -= 1;
                return Some(value);
            }
            self.bucket += 1;
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::hash::Hasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;

    struct HashState {
        k0: u64,
        k1: u64,
    }

    impl HashState {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k0: rng.try_next_u64().unwrap(),
                k1: rng.try_next_u64().unwrap(),
            }
        }

        fn build_hasher(&self) -> SipHasher {
            SipHasher::new_with_keys(self.k0, self.k1)
        }
    }

    fn hash_key(state: &HashState, key: u64) -> u64 {
        let mut h = state.build_hasher();
        h.write_u64(key);
        h.finish()
    }

    #[derive(Debug, PartialEq, Eq, Clone)]
    struct Item {
        key: u64,
        value: i32,
    }

    fn insert_item(state: &HashState, table: &mut HashTable<Item>, key: u64, value: i32) {
        let hash = hash_key(state, key);
        match table.entry(hash, |v: &Item| v.key == key) {
            Entry::Vacant(entry) => {
                entry.insert(Item { key, value });
            }
            Entry::Occupied(_) => panic!("unexpected occupied entry for {key}"),
        }
    }

    #[test]
    fn new_has_default_geometry() {
        let table: HashTable<Item> = HashTable::new();
        assert_eq!(table.capacity(), INITIAL_CAPACITY);
        assert_eq!(table.len(), 0);
        assert!(table.is_empty());
        assert_eq!(table.load_factor(), 0.0);
        assert_eq!(table.lower_load_factor(), DEFAULT_LOWER_LOAD_FACTOR);
        assert_eq!(table.upper_load_factor(), DEFAULT_UPPER_LOAD_FACTOR);
    }

    #[test]
    fn load_factor_bounds_are_validated() {
        assert_eq!(
            HashTable::<Item>::with_load_factors(0.75, 0.25).unwrap_err(),
            ConfigError::LoadFactorOrder {
                lower: 0.75,
                upper: 0.25
            }
        );
        assert_eq!(
            HashTable::<Item>::with_load_factors(-0.1, 0.75).unwrap_err(),
            ConfigError::LoadFactorRange {
                lower: -0.1,
                upper: 0.75
            }
        );
        assert_eq!(
            HashTable::<Item>::with_load_factors(0.25, 1.1).unwrap_err(),
            ConfigError::LoadFactorRange {
                lower: 0.25,
                upper: 1.1
            }
        );

        // Equal bounds are degenerate but accepted.
        assert!(HashTable::<Item>::with_load_factors(0.5, 0.5).is_ok());
    }

    #[test]
    fn insert_and_find() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..32u64 {
            insert_item(&state, &mut table, k, (k as i32) * 2);
        }
        assert_eq!(table.len(), 32);

        for k in 0..32u64 {
            let hash = hash_key(&state, k);
            assert_eq!(
                table.find(hash, |v| v.key == k),
                Some(&Item {
                    key: k,
                    value: (k as i32) * 2
                }),
                "{:#?}",
                table
            );
        }

        let miss_hash = hash_key(&state, 999);
        assert!(table.find(miss_hash, |v| v.key == 999).is_none());
    }

    #[test]
    fn duplicate_entry_is_occupied() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        insert_item(&state, &mut table, 42, 7);

        let hash = hash_key(&state, 42);
        match table.entry(hash, |v| v.key == 42) {
            Entry::Occupied(mut occ) => {
                assert_eq!(occ.get().value, 7);
                occ.get_mut().value = 11;
            }
            Entry::Vacant(_) => panic!("should be occupied: {:#?}", table),
        }
        assert_eq!(table.len(), 1);
        assert_eq!(table.find(hash, |v| v.key == 42).unwrap().value, 11);
    }

    #[test]
    fn find_mut_and_modify() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..5u64 {
            insert_item(&state, &mut table, k, 1);
        }

        for k in 0..5u64 {
            let hash = hash_key(&state, k);
            if let Some(v) = table.find_mut(hash, |v| v.key == k) {
                v.value += 9;
            }
        }
        for k in 0..5u64 {
            let hash = hash_key(&state, k);
            assert_eq!(table.find(hash, |v| v.key == k).unwrap().value, 10);
        }
    }

    #[test]
    fn remove_hits_and_misses() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..8u64 {
            insert_item(&state, &mut table, k, k as i32);
        }

        for k in [0u64, 3, 7] {
            let hash = hash_key(&state, k);
            let removed = table.remove(hash, |v| v.key == k).expect("should remove");
            assert_eq!(removed.key, k);
        }
        assert_eq!(table.len(), 5);

        // Removing an absent key is a no-op.
        let miss = hash_key(&state, 3);
        assert_eq!(table.remove(miss, |v| v.key == 3), None);
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn growth_doubles_at_the_upper_bound() {
        // Capacity depends only on the entry count, never on hash values:
        // 12/16 sits exactly at 0.75, the 13th insert doubles, and the 25th
        // doubles again.
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();

        for k in 0..12u64 {
            insert_item(&state, &mut table, k, 0);
        }
        assert_eq!(table.capacity(), 16);

        insert_item(&state, &mut table, 12, 0);
        assert_eq!(table.capacity(), 32);

        for k in 13..24u64 {
            insert_item(&state, &mut table, k, 0);
        }
        assert_eq!(table.capacity(), 32);

        insert_item(&state, &mut table, 24, 0);
        assert_eq!(table.capacity(), 64);

        // Everything is still reachable after two rehashes.
        for k in 0..25u64 {
            let hash = hash_key(&state, k);
            assert!(table.find(hash, |v| v.key == k).is_some());
        }
    }

    #[test]
    fn erase_halves_below_the_lower_bound() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..13u64 {
            insert_item(&state, &mut table, k, 0);
        }
        assert_eq!(table.capacity(), 32);

        // Erasing down to 8 entries stays at or above 0.25 of 32; the drop
        // to 7 halves.
        for k in (8..13u64).rev() {
            let hash = hash_key(&state, k);
            table.remove(hash, |v| v.key == k).unwrap();
            assert_eq!(table.capacity(), 32);
        }
        let hash = hash_key(&state, 7);
        table.remove(hash, |v| v.key == 7).unwrap();
        assert_eq!(table.len(), 7);
        assert_eq!(table.capacity(), 16);
    }

    #[test]
    fn capacity_never_shrinks_below_one() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..4u64 {
            insert_item(&state, &mut table, k, 0);
        }
        for k in 0..4u64 {
            let hash = hash_key(&state, k);
            table.remove(hash, |v| v.key == k).unwrap();
            assert!(table.capacity().is_power_of_two());
            assert!(table.capacity() >= 1);
        }
        assert!(table.is_empty());
    }

    #[test]
    fn clear_keeps_capacity() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..13u64 {
            insert_item(&state, &mut table, k, 0);
        }
        let capacity = table.capacity();

        table.clear();
        assert_eq!(table.len(), 0);
        assert_eq!(table.capacity(), capacity);
        assert!(table.iter().next().is_none());
    }

    #[test]
    fn synthetic_hashes_share_a_bucket() {
        // Hashes 0, 16, 32 all map to bucket 0 of a 16-bucket table.
        let mut table: HashTable<u64> = HashTable::new();
        for hash in [0u64, 16, 32] {
            table.entry(hash, |&v| v == hash).or_insert(hash);
        }

        assert_eq!(table.bucket_len(0), 3);
        assert_eq!(table.bucket_len(16), 3);
        assert_eq!(table.bucket_len(1), 0);

        // Within-bucket insertion order survives a middle removal.
        assert_eq!(table.remove(16, |&v| v == 16), Some(16));
        let visited: Vec<u64> = table.iter().copied().collect();
        assert_eq!(visited, vec![0, 32]);
    }

    #[test]
    fn iterator_visits_every_value_once() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..3u64 {
            insert_item(&state, &mut table, k, (k as i32) + 1);
        }

        let mut seen = vec![false; 3];
        let mut count = 0;
        for item in table.iter() {
            assert!(!seen[item.key as usize], "visited twice: {:?}", item);
            seen[item.key as usize] = true;
            count += 1;
        }
        assert_eq!(count, 3);
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn iterator_equality_tracks_position() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..3u64 {
            insert_item(&state, &mut table, k, 0);
        }

        let mut a = table.iter();
        let b = table.iter();
        assert!(a == b);

        a.next();
        assert!(a != b);

        let mut a = table.iter();
        let mut b = table.iter();
        while a.next().is_some() {
            b.next();
        }
        assert!(a == b, "exhausted iterators compare equal");

        let other: HashTable<Item> = HashTable::new();
        assert!(other.iter() != table.iter());
    }

    #[test]
    fn drain_empties_but_keeps_capacity() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..13u64 {
            insert_item(&state, &mut table, k, 0);
        }
        let capacity = table.capacity();

        let drained: Vec<Item> = table.drain().collect();
        assert_eq!(drained.len(), 13);
        assert!(table.is_empty());
        assert_eq!(table.capacity(), capacity);

        // A partially consumed drain still empties the table on drop.
        for k in 0..4u64 {
            insert_item(&state, &mut table, k, 0);
        }
        {
            let mut drain = table.drain();
            drain.next();
        }
        assert!(table.is_empty());
    }

    #[test]
    fn clone_is_independent() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..13u64 {
            insert_item(&state, &mut table, k, k as i32);
        }

        let snapshot = table.clone();
        assert_eq!(snapshot.len(), table.len());
        assert_eq!(snapshot.capacity(), table.capacity());
        assert_eq!(snapshot.lower_load_factor(), table.lower_load_factor());
        assert_eq!(snapshot.upper_load_factor(), table.upper_load_factor());

        let hash = hash_key(&state, 0);
        table.remove(hash, |v| v.key == 0).unwrap();
        assert_eq!(snapshot.len(), 13);
        assert!(snapshot.find(hash, |v| v.key == 0).is_some());
    }

    #[test]
    fn entry_or_helpers() {
        let mut table: HashTable<String> = HashTable::new();

        let value = table
            .entry(1, |s: &String| s == "one")
            .or_insert("one".to_string());
        assert_eq!(value, "one");

        let value = table
            .entry(2, |s: &String| s == "two")
            .or_insert_with(|| "two".to_string());
        value.push('!');
        assert_eq!(table.find(2, |s| s == "two!"), Some(&"two!".to_string()));

        assert!(
            table
                .entry(3, |s: &String| s == "three")
                .and_modify(|_| panic!("vacant entries are not modified"))
                .is_none()
        );
        assert_eq!(table.len(), 2);

        let default = table.entry(4, |s: &String| s.is_empty()).or_default();
        assert!(default.is_empty());
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn occupied_entry_remove_applies_shrink() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::new();
        for k in 0..13u64 {
            insert_item(&state, &mut table, k, 0);
        }
        assert_eq!(table.capacity(), 32);

        for k in (7..13u64).rev() {
            let hash = hash_key(&state, k);
            match table.entry(hash, |v| v.key == k) {
                Entry::Occupied(entry) => {
                    entry.remove();
                }
                Entry::Vacant(_) => panic!("entry should exist"),
            }
        }
        assert_eq!(table.len(), 7);
        assert_eq!(table.capacity(), 16);
    }
}
