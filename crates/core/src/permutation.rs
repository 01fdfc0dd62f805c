//! The 256-entry permutation table that hashes lattice coordinates into
//! gradient selectors.

use crate::error::WalkError;
use crate::prng::{RandomSource, Xorshift64};

/// Number of distinct entries in the table before duplication.
pub const PERMUTATION_SIZE: usize = 256;

/// A permutation of `0..=255`, stored twice end-to-end.
///
/// The duplication means `perm[i + 1]` and `perm[perm[i] + j + 1]` are always
/// in bounds for `i, j` in `0..=255`, so the noise kernel never wraps inline.
#[derive(Clone, PartialEq, Eq)]
pub struct PermutationTable {
    perm: [u8; PERMUTATION_SIZE * 2],
}

impl PermutationTable {
    /// The identity permutation (`perm[i] == i`). Used for golden-value tests.
    pub fn identity() -> Self {
        let mut values = [0u8; PERMUTATION_SIZE];
        for (i, v) in values.iter_mut().enumerate() {
            *v = i as u8;
        }
        Self::duplicated(values)
    }

    /// Shuffles `0..=255` with the given random source.
    pub fn shuffled<R: RandomSource>(rng: &mut R) -> Self {
        let mut values = Self::identity().values();
        rng.shuffle(&mut values);
        Self::duplicated(values)
    }

    /// Shuffles `0..=255` with a [`Xorshift64`] seeded from `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self::shuffled(&mut Xorshift64::new(seed))
    }

    /// Builds a table from 256 caller-supplied values.
    ///
    /// Returns `WalkError::InvalidPermutation` unless `values` contains every
    /// byte exactly once.
    pub fn from_values(values: &[u8]) -> Result<Self, WalkError> {
        if values.len() != PERMUTATION_SIZE {
            return Err(WalkError::InvalidPermutation(format!(
                "expected {PERMUTATION_SIZE} entries, got {}",
                values.len()
            )));
        }
        let mut seen = [false; PERMUTATION_SIZE];
        for &v in values {
            if std::mem::replace(&mut seen[v as usize], true) {
                return Err(WalkError::InvalidPermutation(format!(
                    "value {v} appears more than once"
                )));
            }
        }
        let mut table = [0u8; PERMUTATION_SIZE];
        table.copy_from_slice(values);
        Ok(Self::duplicated(table))
    }

    fn duplicated(values: [u8; PERMUTATION_SIZE]) -> Self {
        let mut perm = [0u8; PERMUTATION_SIZE * 2];
        perm[..PERMUTATION_SIZE].copy_from_slice(&values);
        perm[PERMUTATION_SIZE..].copy_from_slice(&values);
        Self { perm }
    }

    /// Lookup into the duplicated table. `index` must be below 512.
    #[inline]
    pub fn get(&self, index: usize) -> usize {
        self.perm[index] as usize
    }

    /// Hash of lattice corner `(cx, cy)`: `perm[perm[cx] + cy]`.
    ///
    /// `cx` and `cy` are reduced cell indices in `0..=256` (the `+1` corner of
    /// cell 255 lands on 256, which the duplicated half covers).
    #[inline]
    pub fn hash(&self, cx: usize, cy: usize) -> usize {
        self.get(self.get(cx) + cy)
    }

    /// The first (non-duplicated) 256 entries.
    pub fn values(&self) -> [u8; PERMUTATION_SIZE] {
        let mut out = [0u8; PERMUTATION_SIZE];
        out.copy_from_slice(&self.perm[..PERMUTATION_SIZE]);
        out
    }

    /// The full 512-entry table.
    pub fn as_slice(&self) -> &[u8] {
        &self.perm
    }
}

impl std::fmt::Debug for PermutationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermutationTable")
            .field("head", &&self.perm[..8])
            .finish_non_exhaustive()
    }
}
