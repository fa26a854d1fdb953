//! State-representation provider.

use std::sync::Arc;

use traj_models::{ArmModel, MultibodySpace, StateSpace, VectorSpace};

use crate::selectors::StateSelector;

/// Dimension of the Euclidean fixture state.
pub const VECTOR_STATE_DIM: usize = 40;

/// Number of links in the example arm.
pub const ARM_LINKS: usize = 7;

/// Link length of the example arm (meters).
pub const ARM_LINK_LENGTH: f64 = 0.3;

/// Link mass of the example arm (kilograms).
pub const ARM_LINK_MASS: f64 = 1.0;

/// Builds pre-configured state representations.
///
/// Every call allocates a fresh instance; callers that need sub-models
/// to agree on one manifold pass the returned handle around instead of
/// calling the factory again.
#[derive(Debug, Default, Clone, Copy)]
pub struct StateFactory;

impl StateFactory {
    /// Create the state representation for `selector`.
    #[must_use]
    pub fn create(selector: StateSelector) -> Arc<dyn StateSpace> {
        match selector {
            StateSelector::Vector => Arc::new(VectorSpace::new(VECTOR_STATE_DIM)),
            StateSelector::ArmMultibody => Self::create_arm(),
        }
    }

    /// Create the example-arm state with its concrete type exposed.
    ///
    /// Recipes that reach into the arm (forward dynamics, placement
    /// costs) use this entry point; [`Self::create`] routes through it
    /// so both share one configuration.
    #[must_use]
    pub fn create_arm() -> Arc<MultibodySpace> {
        let arm = Arc::new(ArmModel::serial_arm(
            ARM_LINKS,
            ARM_LINK_LENGTH,
            ARM_LINK_MASS,
        ));
        Arc::new(MultibodySpace::new(arm))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_covers_every_selector() {
        for selector in StateSelector::ALL {
            let state = StateFactory::create(selector);
            assert!(state.nx() > 0);
            assert!(state.ndx() > 0);
        }
    }

    #[test]
    fn test_arm_state_dimensions() {
        let state = StateFactory::create_arm();
        assert_eq!(state.nq(), ARM_LINKS);
        assert_eq!(state.nv(), ARM_LINKS);
        assert_eq!(state.nx(), 2 * ARM_LINKS);
    }

    #[test]
    fn test_calls_are_independent() {
        let a = StateFactory::create_arm();
        let b = StateFactory::create_arm();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.nx(), b.nx());
    }
}
