//! Cost-term provider.

use std::sync::Arc;

use nalgebra::Vector3;
use traj_models::{
    Activation, ControlRegCost, CostTerm, FramePlacementCost, MultibodySpace,
    QuadraticActivation, StateSpace, StateTrackingCost,
};

use crate::selectors::{ActivationSelector, CostSelector};

/// End-effector target of the placement term: `(x, z, heading)`.
///
/// Inside the example arm's reach, away from its rest posture, so the
/// placement residual is nonzero at the zero state.
#[must_use]
pub fn frame_target() -> Vector3<f64> {
    Vector3::new(0.6, -0.3, 0.0)
}

/// Builds pre-configured cost terms over a shared state.
///
/// As with the actuation provider, the state handle is injected so every
/// term references the identical instance.
#[derive(Debug, Default, Clone, Copy)]
pub struct CostFactory;

impl CostFactory {
    /// Create the cost term for `selector` over `state`.
    ///
    /// The term's control dimension matches full actuation of the arm
    /// (one input per velocity degree of freedom).
    #[must_use]
    pub fn create(
        selector: CostSelector,
        state: &Arc<MultibodySpace>,
        activation: ActivationSelector,
    ) -> Arc<dyn CostTerm> {
        let activation = Self::activation(activation);
        let nu = state.nv();
        match selector {
            CostSelector::StateTracking => {
                let shared: Arc<dyn StateSpace> = state.clone();
                let x_ref = shared.zero();
                Arc::new(StateTrackingCost::new(shared, x_ref, activation, nu))
            }
            CostSelector::ControlReg => {
                let shared: Arc<dyn StateSpace> = state.clone();
                Arc::new(ControlRegCost::new(shared, activation, nu))
            }
            CostSelector::FramePlacement => Arc::new(FramePlacementCost::new(
                Arc::clone(state),
                frame_target(),
                activation,
                nu,
            )),
        }
    }

    /// Create the activation for `selector`.
    #[must_use]
    pub fn activation(selector: ActivationSelector) -> Arc<dyn Activation> {
        match selector {
            ActivationSelector::Quadratic => Arc::new(QuadraticActivation),
        }
    }
}
