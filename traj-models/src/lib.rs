//! Continuous-time dynamics models for trajectory optimization.
//!
//! This crate provides the model components a differential trajectory
//! optimizer consumes:
//!
//! - [`StateSpace`] - state manifolds ([`VectorSpace`], [`MultibodySpace`])
//! - [`ArmModel`] - planar rigid serial-arm kinematics and dynamics
//! - [`Actuation`] - control-to-force mappings ([`FullActuation`])
//! - [`CostTerm`] / [`CostSum`] - named, weighted cost functionals
//! - [`DifferentialDynamics`] - the uniform model contract, implemented
//!   by [`LqrDynamics`] and [`ForwardDynamics`]
//! - [`NumDiffDynamics`] - finite-difference derivative checking
//!
//! # Shared state
//!
//! A dynamics model and its actuation and cost sub-models agree on the
//! manifold by sharing one reference-counted [`StateSpace`] instance;
//! composition rejects sub-models built over a different instance.
//! Instances are immutable after construction, so independent models can
//! be evaluated concurrently.

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
// Allow certain clippy lints that are overly pedantic for numeric model code
#![allow(
    clippy::missing_const_for_fn,  // Many methods can't be const due to nalgebra
    clippy::cast_precision_loss,   // usize to f64 is fine for counts
    clippy::suboptimal_flops       // mul_add style changes aren't always clearer
)]

mod actuation;
mod arm;
mod cost;
mod dynamics;
mod error;
pub mod numdiff;
mod state;

pub use actuation::{Actuation, FullActuation};
pub use arm::{ArmModel, STANDARD_GRAVITY};
pub use cost::{
    Activation, ControlRegCost, CostDerivatives, CostSum, CostTerm, FramePlacementCost,
    QuadraticActivation, StateTrackingCost, WeightedCost,
};
pub use dynamics::{DifferentialDynamics, DynamicsDerivatives, DynamicsValue, ForwardDynamics, LqrDynamics};
pub use error::ModelError;
pub use numdiff::NumDiffDynamics;
pub use state::{same_state_instance, MultibodySpace, StateSpace, VectorSpace};

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
