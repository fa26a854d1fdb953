//! Differential (continuous-time) dynamics models.
//!
//! A [`DifferentialDynamics`] model maps a state/control pair to the
//! state's time derivative and a running cost, and exposes the
//! first-order derivatives of both. Two models are provided:
//!
//! - [`LqrDynamics`] - self-contained analytic linear-quadratic model
//! - [`ForwardDynamics`] - rigid serial-arm forward dynamics composed
//!   from a shared state space, an actuation model, and a cost sum

use std::any::Any;
use std::sync::Arc;

use nalgebra::{DMatrix, DVector};

use crate::actuation::Actuation;
use crate::cost::{CostDerivatives, CostSum};
use crate::error::ModelError;
use crate::numdiff;
use crate::state::{same_state_instance, MultibodySpace, StateSpace, VectorSpace};
use crate::Result;

/// Value of a differential dynamics model at one state/control pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicsValue {
    /// Time derivative of the state, expressed in the tangent space.
    pub xdot: DVector<f64>,
    /// Running cost at this point.
    pub cost: f64,
}

/// First-order dynamics derivatives plus cost partials.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicsDerivatives {
    /// Derivative of `xdot` with respect to the state tangent
    /// (`ndx` x `ndx`).
    pub fx: DMatrix<f64>,
    /// Derivative of `xdot` with respect to the control (`ndx` x `nu`).
    pub fu: DMatrix<f64>,
    /// Cost partials.
    pub cost: CostDerivatives,
}

/// Uniform contract for continuous-time dynamics models.
///
/// Every model owns its sub-models, reports dimensions consistent with
/// them, and evaluates without touching shared mutable state, so
/// independent instances may be used concurrently.
pub trait DifferentialDynamics: Send + Sync {
    /// The state space the dynamics evolve over (shared handle).
    fn state(&self) -> Arc<dyn StateSpace>;

    /// Control dimension.
    fn nu(&self) -> usize;

    /// State dimension.
    fn nx(&self) -> usize {
        self.state().nx()
    }

    /// Tangent dimension.
    fn ndx(&self) -> usize {
        self.state().ndx()
    }

    /// Evaluate the dynamics and running cost at `(x, u)`.
    ///
    /// # Errors
    /// Returns a dimension error when `x` or `u` is mis-sized;
    /// model-specific failures propagate unchanged.
    fn calc(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<DynamicsValue>;

    /// Evaluate the first-order derivatives and cost partials at `(x, u)`.
    ///
    /// # Errors
    /// Returns a dimension error when `x` or `u` is mis-sized;
    /// model-specific failures propagate unchanged.
    fn calc_diff(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<DynamicsDerivatives>;

    /// Concrete-type access for checkers and test harnesses.
    fn as_any(&self) -> &dyn Any;
}

/// Analytic linear-quadratic model.
///
/// Dynamics are `xdot = A x + B u` plus an optional constant drift
/// vector; the cost is `1/2 (x^T Q x + u^T R u)`. All matrices are
/// fixed at construction, so every instance with the same dimensions
/// and drift setting is behaviorally identical.
pub struct LqrDynamics {
    state: Arc<VectorSpace>,
    a: DMatrix<f64>,
    b: DMatrix<f64>,
    q: DMatrix<f64>,
    r: DMatrix<f64>,
    drift: Option<DVector<f64>>,
}

impl LqrDynamics {
    /// Create a linear-quadratic model with `nx` states and `nu` controls.
    ///
    /// The system matrix is `-I` (stable), the input matrix is the
    /// rectangular identity, both cost weights are identity, and the
    /// drift term (when enabled) is the unit vector.
    ///
    /// # Panics
    /// Panics if `nx` or `nu` is 0.
    #[must_use]
    pub fn new(nx: usize, nu: usize, with_drift: bool) -> Self {
        assert!(nx > 0 && nu > 0, "LqrDynamics requires positive dimensions");
        Self {
            state: Arc::new(VectorSpace::new(nx)),
            a: DMatrix::from_diagonal_element(nx, nx, -1.0),
            b: DMatrix::identity(nx, nu),
            q: DMatrix::identity(nx, nx),
            r: DMatrix::identity(nu, nu),
            drift: with_drift.then(|| DVector::from_element(nx, 1.0)),
        }
    }

    /// Whether the model carries a constant drift term.
    #[must_use]
    pub fn has_drift(&self) -> bool {
        self.drift.is_some()
    }
}

impl DifferentialDynamics for LqrDynamics {
    fn state(&self) -> Arc<dyn StateSpace> {
        self.state.clone()
    }

    fn nu(&self) -> usize {
        self.r.nrows()
    }

    fn calc(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<DynamicsValue> {
        ModelError::check_dim("x", self.state.nx(), x.len())?;
        ModelError::check_dim("u", self.nu(), u.len())?;

        let mut xdot = &self.a * x + &self.b * u;
        if let Some(drift) = &self.drift {
            xdot += drift;
        }
        let cost = 0.5 * (x.dot(&(&self.q * x)) + u.dot(&(&self.r * u)));
        Ok(DynamicsValue { xdot, cost })
    }

    fn calc_diff(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<DynamicsDerivatives> {
        ModelError::check_dim("x", self.state.nx(), x.len())?;
        ModelError::check_dim("u", self.nu(), u.len())?;

        let mut cost = CostDerivatives::zeros(self.state.ndx(), self.nu());
        cost.lx = &self.q * x;
        cost.lu = &self.r * u;
        cost.lxx = self.q.clone();
        cost.luu = self.r.clone();
        Ok(DynamicsDerivatives {
            fx: self.a.clone(),
            fu: self.b.clone(),
            cost,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Rigid serial-arm forward dynamics under a cost functional.
///
/// The state is `x = (q, v)`; the model solves
/// `M(q) qdd = tau(x, u) - b(q, v)` with a Cholesky factorization of the
/// mass matrix and reports `xdot = (v, qdd)`. The state space is shared
/// with the actuation model and every cost term.
pub struct ForwardDynamics {
    state: Arc<MultibodySpace>,
    actuation: Arc<dyn Actuation>,
    costs: CostSum,
}

impl std::fmt::Debug for ForwardDynamics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardDynamics")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ForwardDynamics {
    /// Compose a forward-dynamics model from its sub-models.
    ///
    /// # Errors
    /// Returns [`ModelError::SharedStateMismatch`] when the actuation
    /// model or the cost sum was built over a different state-space
    /// instance, and a dimension error when the cost sum's control
    /// dimension disagrees with the actuation model's.
    pub fn new(
        state: Arc<MultibodySpace>,
        actuation: Arc<dyn Actuation>,
        costs: CostSum,
    ) -> Result<Self> {
        let shared: Arc<dyn StateSpace> = state.clone();
        if !same_state_instance(&shared, &actuation.state()) {
            return Err(ModelError::SharedStateMismatch { what: "actuation" });
        }
        if !same_state_instance(&shared, &costs.state()) {
            return Err(ModelError::SharedStateMismatch { what: "cost sum" });
        }
        ModelError::check_dim("costs nu", actuation.nu(), costs.nu())?;
        Ok(Self {
            state,
            actuation,
            costs,
        })
    }

    /// The actuation sub-model.
    #[must_use]
    pub fn actuation(&self) -> &Arc<dyn Actuation> {
        &self.actuation
    }

    /// The cost functional.
    #[must_use]
    pub fn costs(&self) -> &CostSum {
        &self.costs
    }

    /// The concrete multibody state space.
    #[must_use]
    pub fn multibody_state(&self) -> &Arc<MultibodySpace> {
        &self.state
    }

    /// Dynamics-only evaluation: `xdot` without the cost.
    fn xdot(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<DVector<f64>> {
        let nq = self.state.nq();
        let nv = self.state.nv();
        let q = x.rows(0, nq).into_owned();
        let v = x.rows(nq, nv).into_owned();

        let tau = self.actuation.calc(x, u)?;
        let bias = self.state.arm().bias_forces(&q, &v)?;
        let mass = self.state.arm().mass_matrix(&q)?;
        let qdd = mass
            .cholesky()
            .ok_or(ModelError::MassMatrixNotPositiveDefinite)?
            .solve(&(tau - bias));

        let mut xdot = DVector::zeros(self.state.ndx());
        xdot.rows_mut(0, nv).copy_from(&v);
        xdot.rows_mut(nv, nv).copy_from(&qdd);
        Ok(xdot)
    }
}

impl DifferentialDynamics for ForwardDynamics {
    fn state(&self) -> Arc<dyn StateSpace> {
        self.state.clone()
    }

    fn nu(&self) -> usize {
        self.actuation.nu()
    }

    fn calc(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<DynamicsValue> {
        ModelError::check_dim("x", self.state.nx(), x.len())?;
        Ok(DynamicsValue {
            xdot: self.xdot(x, u)?,
            cost: self.costs.calc(x, u)?,
        })
    }

    fn calc_diff(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<DynamicsDerivatives> {
        ModelError::check_dim("x", self.state.nx(), x.len())?;

        let nq = self.state.nq();
        let nv = self.state.nv();
        let q = x.rows(0, nq).into_owned();

        // fu is analytic: the control enters through the actuation
        // Jacobian and the factored mass matrix only.
        let (_, dtau_du) = self.actuation.calc_diff(x, u)?;
        let mass = self.state.arm().mass_matrix(&q)?;
        let minv_dtau_du = mass
            .cholesky()
            .ok_or(ModelError::MassMatrixNotPositiveDefinite)?
            .solve(&dtau_du);
        let mut fu = DMatrix::zeros(self.state.ndx(), self.nu());
        fu.rows_mut(nv, nv).copy_from(&minv_dtau_du);

        // fx by central differences; rigid-body derivative propagation
        // is not carried analytically.
        let space: &dyn StateSpace = self.state.as_ref();
        let fx = numdiff::state_jacobian(space, x, numdiff::DEFAULT_DISTURBANCE, |xp| {
            self.xdot(xp, u)
        })?;

        Ok(DynamicsDerivatives {
            fx,
            fu,
            cost: self.costs.calc_diff(x, u)?,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::actuation::FullActuation;
    use crate::arm::ArmModel;
    use crate::cost::{ControlRegCost, QuadraticActivation, StateTrackingCost};
    use approx::assert_relative_eq;

    fn arm_fixture(n: usize) -> ForwardDynamics {
        let state = Arc::new(MultibodySpace::new(Arc::new(ArmModel::serial_arm(
            n, 0.3, 1.0,
        ))));
        let actuation = Arc::new(FullActuation::new(Arc::clone(&state)));
        let shared: Arc<dyn StateSpace> = state.clone();
        let mut costs = CostSum::new(Arc::clone(&shared), actuation.nu());
        costs
            .add(
                "state",
                Arc::new(StateTrackingCost::new(
                    Arc::clone(&shared),
                    shared.zero(),
                    Arc::new(QuadraticActivation),
                    n,
                )),
                1.0,
            )
            .unwrap();
        costs
            .add(
                "control",
                Arc::new(ControlRegCost::new(
                    shared,
                    Arc::new(QuadraticActivation),
                    n,
                )),
                1.0,
            )
            .unwrap();
        ForwardDynamics::new(state, actuation, costs).unwrap()
    }

    #[test]
    fn test_lqr_dimensions_and_drift() {
        let model = LqrDynamics::new(40, 40, true);
        assert_eq!(model.nx(), 40);
        assert_eq!(model.ndx(), 40);
        assert_eq!(model.nu(), 40);
        assert!(model.has_drift());
        assert!(!LqrDynamics::new(40, 40, false).has_drift());
    }

    #[test]
    fn test_lqr_drift_shifts_the_origin() {
        let x = DVector::zeros(3);
        let u = DVector::zeros(3);

        let drift_free = LqrDynamics::new(3, 3, false).calc(&x, &u).unwrap();
        assert_eq!(drift_free.xdot, DVector::zeros(3));
        assert_relative_eq!(drift_free.cost, 0.0);

        let with_drift = LqrDynamics::new(3, 3, true).calc(&x, &u).unwrap();
        assert_eq!(with_drift.xdot, DVector::from_element(3, 1.0));
    }

    #[test]
    fn test_lqr_calc_values() {
        let model = LqrDynamics::new(2, 2, false);
        let x = DVector::from_vec(vec![1.0, 2.0]);
        let u = DVector::from_vec(vec![0.5, -0.5]);
        let value = model.calc(&x, &u).unwrap();

        // xdot = -x + u
        assert_relative_eq!(value.xdot[0], -0.5);
        assert_relative_eq!(value.xdot[1], -2.5);
        // cost = 1/2 (|x|^2 + |u|^2)
        assert_relative_eq!(value.cost, 0.5 * (5.0 + 0.5));
    }

    #[test]
    fn test_lqr_rejects_bad_dims() {
        let model = LqrDynamics::new(4, 2, false);
        let err = model
            .calc(&DVector::zeros(4), &DVector::zeros(3))
            .unwrap_err();
        assert!(err.is_dimension_mismatch());
    }

    #[test]
    fn test_arm_hangs_at_equilibrium() {
        let model = arm_fixture(3);
        let x = model.state().zero();
        let u = DVector::zeros(3);

        let value = model.calc(&x, &u).unwrap();
        assert_eq!(value.xdot.len(), model.ndx());
        for i in 0..model.ndx() {
            assert_relative_eq!(value.xdot[i], 0.0, epsilon = 1e-12);
        }
        assert_relative_eq!(value.cost, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_link_free_fall() {
        let model = arm_fixture(1);
        // Horizontal pendulum, at rest, no torque.
        let x = DVector::from_vec(vec![std::f64::consts::FRAC_PI_2, 0.0]);
        let u = DVector::zeros(1);

        let value = model.calc(&x, &u).unwrap();
        // qdd = -g/l at the horizontal.
        assert_relative_eq!(value.xdot[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(value.xdot[1], -crate::arm::STANDARD_GRAVITY / 0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_arm_fu_matches_finite_difference() {
        let model = arm_fixture(3);
        let x = DVector::from_vec(vec![0.4, -0.3, 0.9, 0.2, -0.1, 0.5]);
        let u = DVector::from_vec(vec![1.0, 0.0, -2.0]);

        let derivatives = model.calc_diff(&x, &u).unwrap();
        let fu_fd = numdiff::control_jacobian(&u, 1e-6, |up| {
            model.calc(&x, up).map(|value| value.xdot)
        })
        .unwrap();

        for i in 0..model.ndx() {
            for j in 0..model.nu() {
                assert_relative_eq!(
                    derivatives.fu[(i, j)],
                    fu_fd[(i, j)],
                    epsilon = 1e-6
                );
            }
        }
    }

    #[test]
    fn test_arm_rejects_foreign_submodels() {
        let state = Arc::new(MultibodySpace::new(Arc::new(ArmModel::serial_arm(
            2, 0.3, 1.0,
        ))));
        let foreign = Arc::new(MultibodySpace::new(Arc::new(ArmModel::serial_arm(
            2, 0.3, 1.0,
        ))));
        let actuation = Arc::new(FullActuation::new(foreign));
        let shared: Arc<dyn StateSpace> = state.clone();
        let costs = CostSum::new(shared, 2);

        let err = ForwardDynamics::new(state, actuation, costs).unwrap_err();
        assert_eq!(err, ModelError::SharedStateMismatch { what: "actuation" });
    }
}
