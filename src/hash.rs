//! Deterministic hashing for snapshot checksums and entropy mixing.
//!
//! `std::collections::hash_map::DefaultHasher` is randomly seeded per process, so two runs of the
//! same seeded game would report different checksums for identical states. The hasher here is
//! FNV-1a with fixed constants: a replay on another machine produces the same
//! [`GameSnapshot::checksum`](crate::GameSnapshot::checksum) turn by turn.
//!
//! ```
//! use ladder_session::hash::{DeterministicHasher, fnv1a_hash};
//! use std::hash::{Hash, Hasher};
//!
//! let mut hasher = DeterministicHasher::new();
//! "Ada".hash(&mut hasher);
//! assert_eq!(hasher.finish(), fnv1a_hash(&"Ada"));
//! ```
//!
//! FNV-1a is NOT cryptographically secure.

use std::hash::{Hash, Hasher};

/// FNV-1a 64-bit offset basis constant.
const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

/// FNV-1a 64-bit prime constant.
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// A deterministic hasher using the FNV-1a algorithm.
#[derive(Debug, Clone)]
pub struct DeterministicHasher {
    state: u64,
}

impl DeterministicHasher {
    /// Creates a new `DeterministicHasher` with the standard FNV-1a offset basis.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }
}

impl Default for DeterministicHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for DeterministicHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.state
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= u64::from(byte);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }
}

/// Computes a deterministic FNV-1a hash of the given value.
///
/// ```
/// use ladder_session::hash::fnv1a_hash;
/// use ladder_session::Cell;
///
/// assert_eq!(fnv1a_hash(&Cell::new(42)), fnv1a_hash(&Cell::new(42)));
/// assert_ne!(fnv1a_hash(&Cell::new(42)), fnv1a_hash(&Cell::new(43)));
/// ```
#[inline]
pub fn fnv1a_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DeterministicHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, PlayerId};

    #[test]
    fn same_value_same_hash() {
        assert_eq!(fnv1a_hash(&Cell::new(7)), fnv1a_hash(&Cell::new(7)));
        assert_eq!(fnv1a_hash("hello"), fnv1a_hash("hello"));
    }

    #[test]
    fn different_values_differ() {
        assert_ne!(fnv1a_hash(&PlayerId::new(0)), fnv1a_hash(&PlayerId::new(1)));
        assert_ne!(fnv1a_hash("hello"), fnv1a_hash("world"));
    }

    #[test]
    fn empty_hasher_yields_offset_basis() {
        assert_eq!(DeterministicHasher::new().finish(), FNV_OFFSET_BASIS);
    }

    #[test]
    fn known_fnv1a_values() {
        let mut hasher = DeterministicHasher::new();
        hasher.write(b"a");
        assert_eq!(hasher.finish(), 0xaf63_dc4c_8601_ec8c);

        let mut hasher = DeterministicHasher::new();
        hasher.write(b"foobar");
        assert_eq!(hasher.finish(), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn tuple_order_matters() {
        let a = (Cell::new(4), Cell::new(14));
        let b = (Cell::new(14), Cell::new(4));
        assert_ne!(fnv1a_hash(&a), fnv1a_hash(&b));
    }
}
