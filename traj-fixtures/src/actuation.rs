//! Actuation-model provider.

use std::sync::Arc;

use traj_models::{Actuation, FullActuation, MultibodySpace};

use crate::selectors::ActuationSelector;

/// Builds pre-configured actuation models over a shared state.
///
/// The state handle is injected rather than re-created from a selector
/// so the actuation model references the identical instance the rest of
/// the dynamics model is composed over.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActuationFactory;

impl ActuationFactory {
    /// Create the actuation model for `selector` over `state`.
    #[must_use]
    pub fn create(selector: ActuationSelector, state: &Arc<MultibodySpace>) -> Arc<dyn Actuation> {
        match selector {
            ActuationSelector::Full => Arc::new(FullActuation::new(Arc::clone(state))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::state::StateFactory;
    use traj_models::{same_state_instance, StateSpace};

    #[test]
    fn test_full_actuation_spans_the_velocity_dofs() {
        let state = StateFactory::create_arm();
        let actuation = ActuationFactory::create(ActuationSelector::Full, &state);
        assert_eq!(actuation.nu(), state.nv());

        let shared: Arc<dyn StateSpace> = state;
        assert!(same_state_instance(&shared, &actuation.state()));
    }
}
