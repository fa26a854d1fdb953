//! Actuation mappings from control inputs to generalized forces.

use std::sync::Arc;

use nalgebra::{DMatrix, DVector};

use crate::error::ModelError;
use crate::state::{MultibodySpace, StateSpace};
use crate::Result;

/// Common interface for actuation models.
///
/// An actuation model maps a control input `u` to the generalized forces
/// `tau` applied to the dynamics, together with the Jacobians of that
/// mapping.
pub trait Actuation: Send + Sync {
    /// Control dimension.
    fn nu(&self) -> usize;

    /// The state space this actuation is defined over (shared handle).
    fn state(&self) -> Arc<dyn StateSpace>;

    /// Map the control input to generalized forces.
    ///
    /// # Errors
    /// Returns a dimension error when `x` or `u` is mis-sized.
    fn calc(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<DVector<f64>>;

    /// Jacobians of the force mapping: `(dtau_dx, dtau_du)`.
    ///
    /// # Errors
    /// Returns a dimension error when `x` or `u` is mis-sized.
    fn calc_diff(&self, x: &DVector<f64>, u: &DVector<f64>)
        -> Result<(DMatrix<f64>, DMatrix<f64>)>;
}

/// Full actuation: one torque input per velocity degree of freedom.
///
/// The mapping is the identity, `tau = u`, so `dtau_dx` is zero and
/// `dtau_du` is the identity.
#[derive(Debug, Clone)]
pub struct FullActuation {
    state: Arc<MultibodySpace>,
    nu: usize,
}

impl FullActuation {
    /// Create a full actuation model over `state`.
    #[must_use]
    pub fn new(state: Arc<MultibodySpace>) -> Self {
        let nu = state.nv();
        Self { state, nu }
    }

    /// Number of generalized-velocity coordinates driven by this model.
    #[must_use]
    pub fn nv(&self) -> usize {
        self.state.nv()
    }
}

impl Actuation for FullActuation {
    fn nu(&self) -> usize {
        self.nu
    }

    fn state(&self) -> Arc<dyn StateSpace> {
        self.state.clone()
    }

    fn calc(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<DVector<f64>> {
        ModelError::check_dim("x", self.state.nx(), x.len())?;
        ModelError::check_dim("u", self.nu, u.len())?;
        Ok(u.clone())
    }

    fn calc_diff(
        &self,
        x: &DVector<f64>,
        u: &DVector<f64>,
    ) -> Result<(DMatrix<f64>, DMatrix<f64>)> {
        ModelError::check_dim("x", self.state.nx(), x.len())?;
        ModelError::check_dim("u", self.nu, u.len())?;
        let nv = self.nv();
        Ok((
            DMatrix::zeros(nv, self.state.ndx()),
            DMatrix::identity(nv, self.nu),
        ))
    }
}
