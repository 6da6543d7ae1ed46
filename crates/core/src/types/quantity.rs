//! Cart line quantity type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// The requested quantity was zero.
    #[error("quantity must be at least 1")]
    Zero,
}

/// A cart line quantity, always ≥ 1.
///
/// A line with zero units does not exist - removal is a distinct operation.
/// Decrements that would go below 1 must be rejected by the caller; this
/// type makes the invalid state unrepresentable.
///
/// ## Examples
///
/// ```
/// use redseam_core::Quantity;
///
/// let two = Quantity::new(2).unwrap();
/// assert_eq!(two.get(), 2);
/// assert!(Quantity::new(0).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// The minimum quantity (one unit).
    pub const ONE: Self = Self(1);

    /// Create a new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Zero`] if `n` is 0.
    pub const fn new(n: u32) -> Result<Self, QuantityError> {
        if n == 0 {
            return Err(QuantityError::Zero);
        }
        Ok(Self(n))
    }

    /// Get the underlying count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Add `n` units, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, n: u32) -> Self {
        Self(self.0.saturating_add(n))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.0
    }
}
