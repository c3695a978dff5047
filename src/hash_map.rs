use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::error::ConfigError;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;

/// A hash map implemented using the chained [`HashTable`] as the underlying
/// storage.
///
/// `HashMap<K, V, S>` stores key-value pairs where keys implement
/// `Hash + Eq` and uses a configurable hasher builder `S` to hash keys. The
/// underlying table keeps its load factor inside configurable bounds,
/// growing on insertion and shrinking on removal.
///
/// Two maps compare equal only when their entry sets, load-factor bounds,
/// *and* capacities all match; see the `PartialEq` implementation below.
#[derive(Clone)]
pub struct HashMap<K, V, S = DefaultHashBuilder> {
    table: HashTable<(K, V)>,
    hash_builder: S,
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: Debug + Hash + Eq,
    V: Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(k, v);
        }
        map.finish()
    }
}

/// Structural equality: entry sets are compared by lookup (bucket layout is
/// irrelevant), but the load-factor bounds and the capacity must match too.
///
/// Requiring equal capacity is stricter than pure set equality; capacity is
/// an observable property of the map, so it participates.
impl<K, V, S> PartialEq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len()
            || self.capacity() != other.capacity()
            || self.lower_load_factor() != other.lower_load_factor()
            || self.upper_load_factor() != other.upper_load_factor()
        {
            return false;
        }

        self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty map with the default load-factor bounds and the
    /// given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::DefaultHashBuilder;
    /// # use chain_hash::HashMap;
    /// #
    /// let map: HashMap<i32, String> = HashMap::with_hasher(DefaultHashBuilder::default());
    /// assert!(map.is_empty());
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::new(),
            hash_builder,
        }
    }

    /// Creates an empty map with the given load-factor bounds and hasher
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

    /// Builds a map from parallel key and value sequences.
    ///
    /// Pairs are inserted in order and a key repeated later **overwrites**
    /// the value stored for it earlier. The upper-bound resize check runs
    /// once, after all pairs are in, so the resulting capacity can differ
    /// from the capacity reached by inserting the same pairs one at a time.
    ///
    /// Returns [`ConfigError::LengthMismatch`] when the sequences differ in
    /// length.
    pub fn from_pairs_with_hasher(
        keys: Vec<K>,
        values: Vec<V>,
        hash_builder: S,
    ) -> Result<Self, ConfigError> {
        if keys.len() != values.len() {
            return Err(ConfigError::LengthMismatch {
                keys: keys.len(),
                values: values.len(),
            });
        }

        let mut map = Self::with_hasher(hash_builder);
        for (key, value) in keys.into_iter().zip(values) {
            let hash = map.hash_builder.hash_one(&key);
            match map.table.find_mut(hash, |(k, _)| k == &key) {
                Some(pair) => pair.1 = value,
                None => map.table.insert_deferred(hash, (key, value)),
            }
        }
        map.table.rebalance();

        Ok(map)
    }

    /// Returns the number of key-value pairs in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no pairs.
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

    /// Returns the lower load-factor bound.
    pub fn lower_load_factor(&self) -> f64 {
        self.table.lower_load_factor()
    }

    /// Returns the upper load-factor bound.
    pub fn upper_load_factor(&self) -> f64 {
        self.table.upper_load_factor()
    }

    /// Removes all pairs from the map, keeping the current capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Inserts a key-value pair into the map.
    ///
    /// Returns `false` **without modifying anything** when the key is
    /// already present; the stored value is not replaced. Use the
    /// [`entry`](Self::entry) API or [`get_mut`](Self::get_mut) to update in
    /// place.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map: HashMap<i32, &str> = HashMap::new();
    /// assert!(map.insert(37, "a"));
    /// assert!(!map.insert(37, "b"));
    /// assert_eq!(map.get(&37), Some(&"a"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(_) => false,
            TableEntry::Vacant(entry) => {
                entry.insert((key, value));
                true
            }
        }
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// Absence is an ordinary outcome, not an error; callers branch on the
    /// `Option`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map: HashMap<i32, &str> = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        let hash = self.hash_builder.hash_one(key);
        self.table.find(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map: HashMap<i32, &str> = HashMap::new();
    /// map.insert(1, "a");
    /// if let Some(x) = map.get_mut(&1) {
    ///     *x = "b";
    /// }
    /// assert_eq!(map.get(&1), Some(&"b"));
    /// ```
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = self.hash_builder.hash_one(key);
        self.table.find_mut(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes a key from the map, returning the value at the key if the
    /// key was previously in the map.
    ///
    /// Removing an absent key returns `None` and changes nothing, so the
    /// operation is idempotent. A successful removal can shrink the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map: HashMap<i32, &str> = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value if
    /// the key was previously in the map.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let hash = self.hash_builder.hash_one(key);
        self.table.remove(hash, |(k, _)| k == key)
    }

    /// Returns the number of entries sharing the key's bucket.
    ///
    /// Returns `None` when the key itself is absent, even though the bucket
    /// it would hash to exists and may hold other entries. (Returning the
    /// bucket length regardless of membership would arguably be more
    /// useful, but absent keys have always been reported as missing here
    /// and callers rely on it.)
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map: HashMap<&str, i32> = HashMap::new();
    /// map.insert("a", 1);
    /// assert!(map.bucket_size(&"a").is_some_and(|n| n >= 1));
    /// assert_eq!(map.bucket_size(&"missing"), None);
    /// ```
    pub fn bucket_size(&self, key: &K) -> Option<usize> {
        let hash = self.hash_builder.hash_one(key);
        self.table.find(hash, |(k, _)| k == key)?;
        Some(self.table.bucket_len(hash))
    }

    /// Gets the given key's corresponding entry in the map for in-place
    /// manipulation.
    ///
    /// `entry(key).or_default()` is the subscript operation: it returns the
    /// existing value or inserts `V::default()` for the key. References
    /// obtained through the entry are tied to the mutable borrow of the map
    /// and cannot be held across a later mutation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map: HashMap<&str, u64> = HashMap::new();
    ///
    /// *map.entry("wins").or_default() += 1;
    /// *map.entry("wins").or_default() += 1;
    ///
    /// assert_eq!(map.get(&"wins"), Some(&2));
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
        }
    }

    /// Returns an iterator over the key-value pairs of the map.
    ///
    /// Pairs are yielded in bucket order, then within-bucket insertion
    /// order; any mutation may reorder them.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// #
    /// let mut map: HashMap<i32, &str> = HashMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// for (key, value) in map.iter() {
    ///     println!("{key}: {value}");
    /// }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the keys of the map.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the map.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator that removes and yields all key-value pairs.
    ///
    /// After the drain (consumed or dropped), the map is empty with its
    /// capacity unchanged.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            inner: self.table.drain(),
        }
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates an empty map with the default load-factor bounds
    /// (0.25 / 0.75) and the default hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// #
    /// let map: HashMap<i32, String> = HashMap::new();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 16);
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates an empty map with the given load-factor bounds.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// #
    /// let map: HashMap<i32, i32> = HashMap::with_load_factors(0.2, 0.8).unwrap();
    /// assert_eq!(map.lower_load_factor(), 0.2);
    /// assert_eq!(map.upper_load_factor(), 0.8);
    ///
    /// assert!(HashMap::<i32, i32>::with_load_factors(0.8, 0.2).is_err());
    /// ```
    pub fn with_load_factors(lower: f64, upper: f64) -> Result<Self, ConfigError> {
        Self::with_load_factors_and_hasher(lower, upper, S::default())
    }

    /// Builds a map from parallel key and value sequences with the default
    /// hasher builder.
    ///
    /// See [`from_pairs_with_hasher`](Self::from_pairs_with_hasher) for the
    /// overwrite and resize semantics.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// #
    /// let map: HashMap<&str, i32> = HashMap::from_pairs(vec!["a", "b", "a"], vec![1, 2, 3]).unwrap();
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map.get(&"a"), Some(&3));
    ///
    /// assert!(HashMap::<&str, i32>::from_pairs(vec!["a"], vec![1, 2]).is_err());
    /// ```
    pub fn from_pairs(keys: Vec<K>, values: Vec<V>) -> Result<Self, ConfigError> {
        Self::from_pairs_with_hasher(keys, values, S::default())
    }
}

impl<K, V, S> Default for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashMap`].
///
/// [`entry`]: HashMap::entry
pub enum Entry<'a, K, V> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V>),
}

impl<'a, K, V> Entry<'a, K, V> {
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
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V> Entry<'a, K, V>
where
    V: Default,
{
    /// Inserts the default value if the entry is vacant and returns a
    /// mutable reference.
    ///
    /// This is the subscript operation of the map.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V> {
    entry: crate::hash_table::VacantEntry<'a, (K, V)>,
    key: K,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// Gets a reference to the key that would be used when inserting a
    /// value.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value into the map and returns a mutable reference to
    /// it.
    pub fn insert(self, value: V) -> &'a mut V {
        &mut self.entry.insert((self.key, value)).1
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V> {
    entry: crate::hash_table::OccupiedEntry<'a, (K, V)>,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        &self.entry.get().0
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.entry.get().1
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.entry.get_mut().1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.entry.into_mut().1
    }

    /// Replaces the value in the entry and returns the old value.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(&mut self.entry.get_mut().1, value)
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.entry.remove().1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.entry.remove()
    }
}

/// An iterator over the key-value pairs of a [`HashMap`].
///
/// Two iterators over the same map compare equal when they rest on the same
/// position or are both exhausted.
pub struct Iter<'a, K, V> {
    inner: crate::hash_table::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }
}

impl<K, V> PartialEq for Iter<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

/// An iterator over the keys of a [`HashMap`].
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}

/// An iterator over the values of a [`HashMap`].
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

/// A draining iterator over the key-value pairs of a [`HashMap`].
pub struct Drain<'a, K, V> {
    inner: crate::hash_table::Drain<'a, (K, V)>,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}
