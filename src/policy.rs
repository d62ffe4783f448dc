//! Counting-invariant policies
//!
//! Legacy genotype-group rows store aggregate counters (hom-ref count, pass count)
//! next to the per-bucket sample lists. When the counters derived from the buckets
//! disagree with the stored ones, the decoder consults an [`IntegrityPolicy`].

use log::warn;

use crate::error::{IntegrityError, Result};

/// Policy for handling counting-invariant mismatches in legacy rows
///
/// The default policy is `Lenient`, which logs the mismatch and keeps the values
/// derived from the per-bucket sample lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IntegrityPolicy {
    /// Log a warning and continue decoding (default policy)
    #[default]
    Lenient,

    /// Fail the row with an error
    Strict,
}
impl IntegrityPolicy {
    /// Apply the policy to a mismatch
    ///
    /// # Returns
    ///
    /// * `Ok(Some(error))` - `Lenient`: the mismatch was logged and should be recorded as a warning
    /// * `Err(Error)` - `Strict`: the row must be aborted
    pub fn handle(&self, mismatch: IntegrityError) -> Result<Option<IntegrityError>> {
        match self {
            Self::Lenient => {
                warn!("{mismatch}");
                Ok(Some(mismatch))
            }
            Self::Strict => Err(mismatch.into()),
        }
    }

    #[must_use]
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Strict)
    }
}
