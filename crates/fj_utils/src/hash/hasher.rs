//! Provide `FixedHasher` and `TypeIdHasher`.
//!
//! `FixedHasher` is a `foldhash` hasher with a fixed seed, so hash results
//! only depend on the input.
//!
//! `TypeIdHasher` keeps the last written `u64`. A `TypeId` is already a
//! high quality hash, hashing it again is wasted work.

use core::hash::{BuildHasher, Hasher};

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// FixedHasher

const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x6A09_E667_F3BC_C908);

/// Alias of [`foldhash::fast::FoldHasher`] created by [`FixedHashState`].
pub type FixedHasher = FoldHasher<'static>;

/// Builds [`FixedHasher`]s sharing one fixed seed.
///
/// # Examples
///
/// ```
/// use core::hash::{BuildHasher, Hash, Hasher};
/// use fj_utils::hash::FixedHashState;
///
/// let hash = |v: &str| {
///     let mut hasher = FixedHashState.build_hasher();
///     v.hash(&mut hasher);
///     hasher.finish()
/// };
///
/// assert_eq!(hash("Name"), hash("Name"));
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// TypeIdHasher

/// A pass-through hasher for `TypeId` keys.
#[derive(Copy, Clone, Default, Debug)]
pub struct TypeIdHasher {
    hash: u64,
}

impl Hasher for TypeIdHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.hash = self.hash.rotate_left(8) ^ u64::from(byte);
        }
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.hash = i;
    }

    #[inline]
    fn write_u128(&mut self, i: u128) {
        self.hash = (i as u64) ^ ((i >> 64) as u64);
    }
}

/// Builds [`TypeIdHasher`]s.
#[derive(Copy, Clone, Default, Debug)]
pub struct TypeIdHashState;

impl BuildHasher for TypeIdHashState {
    type Hasher = TypeIdHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        TypeIdHasher { hash: 0 }
    }
}
