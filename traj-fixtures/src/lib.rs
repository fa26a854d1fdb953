//! Deterministic model fixtures for trajectory-optimization tests.
//!
//! Solver and derivative-checker tests need fully-configured
//! [`DifferentialDynamics`](traj_models::DifferentialDynamics) instances
//! without repeating the wiring in every test. This crate provides:
//!
//! - closed selector enumerations with `ALL` companion lists for
//!   exhaustive parameterized iteration ([`ModelSelector`] and friends)
//! - provider factories for the individual components
//!   ([`StateFactory`], [`ActuationFactory`], [`CostFactory`])
//! - the model factory itself ([`ModelFactory`]), one fixed recipe per
//!   selector
//!
//! # Example
//!
//! ```
//! use traj_fixtures::{DifferentialDynamics, ModelFactory, ModelSelector};
//!
//! for selector in ModelSelector::ALL {
//!     let model = ModelFactory::create(selector).unwrap();
//!     assert!(model.nx() > 0);
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn  // Factory entry points allocate
)]

mod actuation;
mod cost;
mod error;
mod model;
mod selectors;
mod state;

pub use actuation::ActuationFactory;
pub use cost::{frame_target, CostFactory};
pub use error::FixtureError;
pub use model::{ModelFactory, ARM_COST_WEIGHT, LQR_CONTROL_DIM, LQR_STATE_DIM};
pub use selectors::{
    ActivationSelector, ActuationSelector, CostSelector, ModelSelector, StateSelector,
};
pub use state::{
    StateFactory, ARM_LINKS, ARM_LINK_LENGTH, ARM_LINK_MASS, VECTOR_STATE_DIM,
};

// Re-export the model contract for convenience, so test drivers can
// consume fixtures without naming the models crate.
pub use traj_models::{DifferentialDynamics, StateSpace};

/// Result type for fixture construction.
pub type Result<T> = std::result::Result<T, FixtureError>;
