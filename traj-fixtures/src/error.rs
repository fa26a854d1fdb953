//! Error types for fixture construction.

use std::panic::Location;

use thiserror::Error;
use traj_models::ModelError;

/// Errors that can occur while resolving selectors or building fixtures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FixtureError {
    /// A raw selector value outside the closed enumeration.
    ///
    /// Carries the call site so a failing parameterized test names the
    /// line that asked for the bad fixture.
    #[error("unrecognized {kind} selector at {location}: {value}")]
    UnrecognizedSelector {
        /// Which enumeration was addressed.
        kind: &'static str,
        /// The offending raw value.
        value: String,
        /// Where the bad value was passed in.
        location: &'static Location<'static>,
    },

    /// A model component failed to compose; passed through unchanged.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl FixtureError {
    /// Create an unrecognized-selector error at the caller's location.
    #[track_caller]
    pub(crate) fn unrecognized(kind: &'static str, value: impl ToString) -> Self {
        Self::UnrecognizedSelector {
            kind,
            value: value.to_string(),
            location: Location::caller(),
        }
    }

    /// Check if this is an unrecognized-selector error.
    #[must_use]
    pub fn is_unrecognized_selector(&self) -> bool {
        matches!(self, Self::UnrecognizedSelector { .. })
    }
}
