//! Error types for model components.

use thiserror::Error;

/// Errors that can occur while evaluating or composing model components.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// A vector or matrix argument had the wrong dimension.
    #[error("{what} has wrong dimension: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Which argument was mis-sized.
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// A cost term with this name is already registered.
    #[error("duplicate cost term: {name}")]
    DuplicateCostTerm {
        /// Name of the colliding term.
        name: String,
    },

    /// No cost term with this name is registered.
    #[error("unknown cost term: {name}")]
    UnknownCostTerm {
        /// Name that was looked up.
        name: String,
    },

    /// A sub-model was built over a different state space than its owner.
    #[error("{what} does not share the owning model's state space")]
    SharedStateMismatch {
        /// Which sub-model disagrees.
        what: &'static str,
    },

    /// The joint-space mass matrix could not be factored.
    #[error("mass matrix is not positive definite")]
    MassMatrixNotPositiveDefinite,
}

impl ModelError {
    /// Create a dimension mismatch error.
    #[must_use]
    pub fn dimension(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            what,
            expected,
            actual,
        }
    }

    /// Check that an argument length matches the expected dimension.
    ///
    /// # Errors
    /// Returns [`ModelError::DimensionMismatch`] when the lengths differ.
    pub fn check_dim(what: &'static str, expected: usize, actual: usize) -> Result<(), Self> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::dimension(what, expected, actual))
        }
    }

    /// Check if this is a dimension mismatch.
    #[must_use]
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self, Self::DimensionMismatch { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelError::dimension("u", 7, 3);
        assert!(err.to_string().contains("expected 7"));
        assert!(err.to_string().contains("got 3"));

        let err = ModelError::DuplicateCostTerm {
            name: "state".to_string(),
        };
        assert!(err.to_string().contains("state"));
    }

    #[test]
    fn test_check_dim() {
        assert!(ModelError::check_dim("x", 4, 4).is_ok());
        let err = ModelError::check_dim("x", 4, 5).unwrap_err();
        assert!(err.is_dimension_mismatch());
    }
}
