//! Differential dynamics model factory.
//!
//! The single entry point other components use: given a
//! [`ModelSelector`], build the fully-wired model fixture for it. Every
//! recipe is fixed - dimensions, sub-models, cost terms, and weights are
//! constants of this module, never call parameters - so fixtures are
//! deterministic and comparable across runs. Each call allocates an
//! independent object graph and touches no shared mutable state, so
//! calls may run concurrently.

use std::sync::Arc;

use traj_models::{CostSum, DifferentialDynamics, ForwardDynamics, LqrDynamics, StateSpace};

use crate::actuation::ActuationFactory;
use crate::cost::CostFactory;
use crate::selectors::{ActivationSelector, ActuationSelector, CostSelector, ModelSelector};
use crate::state::StateFactory;
use crate::Result;

/// State dimension of the linear-quadratic fixtures.
pub const LQR_STATE_DIM: usize = 40;

/// Control dimension of the linear-quadratic fixtures.
pub const LQR_CONTROL_DIM: usize = 40;

/// Weight applied to every cost term of the arm fixture.
pub const ARM_COST_WEIGHT: f64 = 1.0;

/// Builds fully-configured differential dynamics models.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModelFactory;

impl ModelFactory {
    /// Build the model fixture for `selector`.
    ///
    /// The returned model owns its object graph outright; nothing is
    /// cached or reused across calls.
    ///
    /// # Errors
    /// Composition failures from the model components propagate
    /// unchanged. Raw out-of-range selector values are rejected before
    /// this point, by [`ModelSelector::from_index`] and
    /// [`ModelSelector::from_name`].
    pub fn create(selector: ModelSelector) -> Result<Arc<dyn DifferentialDynamics>> {
        tracing::debug!(selector = selector.name(), "building dynamics model fixture");
        let model: Arc<dyn DifferentialDynamics> = match selector {
            ModelSelector::Lqr => {
                Arc::new(LqrDynamics::new(LQR_STATE_DIM, LQR_CONTROL_DIM, true))
            }
            ModelSelector::LqrDriftFree => {
                Arc::new(LqrDynamics::new(LQR_STATE_DIM, LQR_CONTROL_DIM, false))
            }
            ModelSelector::ArmForwardDynamics => {
                let state = StateFactory::create_arm();
                let actuation = ActuationFactory::create(ActuationSelector::Full, &state);

                let shared: Arc<dyn StateSpace> = state.clone();
                let mut costs = CostSum::new(shared, actuation.nu());
                costs.add(
                    "state",
                    CostFactory::create(
                        CostSelector::StateTracking,
                        &state,
                        ActivationSelector::Quadratic,
                    ),
                    ARM_COST_WEIGHT,
                )?;
                costs.add(
                    "control",
                    CostFactory::create(
                        CostSelector::ControlReg,
                        &state,
                        ActivationSelector::Quadratic,
                    ),
                    ARM_COST_WEIGHT,
                )?;
                costs.add(
                    "frame",
                    CostFactory::create(
                        CostSelector::FramePlacement,
                        &state,
                        ActivationSelector::Quadratic,
                    ),
                    ARM_COST_WEIGHT,
                )?;

                Arc::new(ForwardDynamics::new(state, actuation, costs)?)
            }
        };
        Ok(model)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_every_selector_has_a_recipe() {
        for selector in ModelSelector::ALL {
            let model = ModelFactory::create(selector).unwrap();
            assert!(model.nx() > 0, "{selector} state dimension");
            assert!(model.ndx() > 0, "{selector} tangent dimension");
            assert!(model.nu() > 0, "{selector} control dimension");
        }
    }

    #[test]
    fn test_lqr_recipes_differ_only_in_drift() {
        let with_drift = ModelFactory::create(ModelSelector::Lqr).unwrap();
        let drift_free = ModelFactory::create(ModelSelector::LqrDriftFree).unwrap();

        for model in [&with_drift, &drift_free] {
            assert_eq!(model.nx(), LQR_STATE_DIM);
            assert_eq!(model.nu(), LQR_CONTROL_DIM);
        }

        let lqr = with_drift
            .as_any()
            .downcast_ref::<LqrDynamics>()
            .unwrap();
        assert!(lqr.has_drift());
        let lqr = drift_free
            .as_any()
            .downcast_ref::<LqrDynamics>()
            .unwrap();
        assert!(!lqr.has_drift());
    }

    #[test]
    fn test_arm_recipe_wires_three_costs() {
        let model = ModelFactory::create(ModelSelector::ArmForwardDynamics).unwrap();
        let dynamics = model.as_any().downcast_ref::<ForwardDynamics>().unwrap();

        assert_eq!(dynamics.costs().len(), 3);
        for name in ["state", "control", "frame"] {
            assert!(dynamics.costs().contains(name), "missing term {name}");
        }
    }
}
