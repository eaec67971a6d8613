//! A separate chaining hash table of strings.
//!
//! Each bucket is a `Vec` chain. A string hashes to `Σ bytes[i] * multiplier^i` (wrapping) modulo
//! the bucket count. The table never resizes on its own, [`HashTable::resize`] rehashes on demand.
//!
//! # Examples
//!
//! ```
//! use avltree::hash_table::{HashTable, HashTableConfig};
//!
//! # fn main() -> Result<(), avltree::hash_table::HashTableError> {
//! let mut table = HashTable::with_config(HashTableConfig {
//!     buckets: 5,
//!     ..Default::default()
//! })?;
//! table.insert("apple");
//! table.insert("pear");
//!
//! let bucket = table.search("apple").unwrap();
//! assert!(table.bucket(bucket).unwrap().iter().any(|s| s == "apple"));
//!
//! table.resize(17)?;
//! assert_eq!(table.bucket_count(), 17);
//! assert!(table.search("pear").is_some());
//! # Ok(())
//! # }
//! ```

use std::fmt;

use log::debug;

/// How a [`HashTable`] is laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashTableConfig {
    /// The number of chains. Must not be zero.
    pub buckets: usize,
    /// The base of the polynomial string hash.
    pub multiplier: u64,
}

impl Default for HashTableConfig {
    fn default() -> Self {
        Self {
            buckets: 11,
            multiplier: 31,
        }
    }
}

/// Errors returned when configuring or resizing a [`HashTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HashTableError {
    /// A table needs at least one bucket to hash into.
    #[error("a hash table needs at least one bucket")]
    ZeroBuckets,
}

/// A hash table of strings using separate chaining. Duplicate strings are kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashTable {
    buckets: Vec<Vec<String>>,
    multiplier: u64,
    len: usize,
}

impl Default for HashTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HashTable {
    /// A table with the default [`HashTableConfig`].
    pub fn new() -> Self {
        let config = HashTableConfig::default();
        Self {
            buckets: vec![Vec::new(); config.buckets],
            multiplier: config.multiplier,
            len: 0,
        }
    }

    /// A table laid out according to `config`.
    pub fn with_config(config: HashTableConfig) -> Result<Self, HashTableError> {
        if config.buckets == 0 {
            return Err(HashTableError::ZeroBuckets);
        }
        Ok(Self {
            buckets: vec![Vec::new(); config.buckets],
            multiplier: config.multiplier,
            len: 0,
        })
    }

    /// The number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// The number of stored strings, counting duplicates.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no strings are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The base of the string hash.
    pub fn multiplier(&self) -> u64 {
        self.multiplier
    }

    /// Stored strings per bucket.
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    /// The chain at `index`, or `None` past the last bucket.
    pub fn bucket(&self, index: usize) -> Option<&[String]> {
        self.buckets.get(index).map(Vec::as_slice)
    }

    /// The bucket `s` hashes to.
    pub fn hash(&self, s: &str) -> usize {
        let mut hash: u64 = 0;
        let mut power: u64 = 1;
        for byte in s.bytes() {
            hash = hash.wrapping_add(u64::from(byte).wrapping_mul(power));
            power = power.wrapping_mul(self.multiplier);
        }
        (hash % self.buckets.len() as u64) as usize
    }

    /// The index of the bucket holding `s`, or `None` if it isn't stored.
    pub fn search(&self, s: &str) -> Option<usize> {
        let index = self.hash(s);
        self.buckets[index].iter().any(|x| x == s).then_some(index)
    }

    /// Appends `s` to its bucket's chain. Strings already present are stored again.
    pub fn insert(&mut self, s: impl Into<String>) {
        let s = s.into();
        let index = self.hash(&s);
        self.buckets[index].push(s);
        self.len += 1;
    }

    /// Removes the first occurrence of `s`. Returns `false` if it wasn't stored.
    pub fn remove(&mut self, s: &str) -> bool {
        let index = self.hash(s);
        let chain = &mut self.buckets[index];
        let Some(position) = chain.iter().position(|x| x == s) else {
            return false;
        };
        chain.remove(position);
        self.len -= 1;
        true
    }

    /// Rehashes every string into `buckets` new chains. Strings are reinserted bucket by bucket
    /// so chains keep their relative order.
    pub fn resize(&mut self, buckets: usize) -> Result<(), HashTableError> {
        if buckets == 0 {
            return Err(HashTableError::ZeroBuckets);
        }
        debug!(
            "resizing hash table from {} to {buckets} buckets with {} strings",
            self.buckets.len(),
            self.len
        );
        let old = std::mem::replace(&mut self.buckets, vec![Vec::new(); buckets]);
        self.len = 0;
        for s in old.into_iter().flatten() {
            self.insert(s);
        }
        Ok(())
    }

    /// Every stored string, bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().flatten().map(String::as_str)
    }
}

/// Prints a header followed by one `index: a, b, c` line per non-empty bucket.
impl fmt::Display for HashTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "HASH TABLE CONTENTS")?;
        for (index, chain) in self.buckets.iter().enumerate() {
            if !chain.is_empty() {
                writeln!(f, "{index}: {}", chain.join(", "))?;
            }
        }
        Ok(())
    }
}
