//! Finite-difference derivatives and the numerical derivative checker.
//!
//! [`NumDiffDynamics`] wraps any [`DifferentialDynamics`] and recomputes
//! its first-order derivatives by central differences. Solver tests use
//! it to validate analytic `calc_diff` implementations; the arm
//! forward-dynamics model reuses the same helpers for the derivative
//! blocks it does not carry analytically.

use nalgebra::{DMatrix, DVector};

use crate::dynamics::{DifferentialDynamics, DynamicsDerivatives, DynamicsValue};
use crate::state::StateSpace;
use crate::Result;

/// Default finite-difference disturbance.
pub const DEFAULT_DISTURBANCE: f64 = 1e-6;

/// Central-difference Jacobian of `f` with respect to the state, taken
/// along tangent-space directions of `space`.
///
/// # Errors
/// Propagates failures of the manifold operations or of `f`.
pub fn state_jacobian<F>(
    space: &dyn StateSpace,
    x: &DVector<f64>,
    h: f64,
    mut f: F,
) -> Result<DMatrix<f64>>
where
    F: FnMut(&DVector<f64>) -> Result<DVector<f64>>,
{
    let ndx = space.ndx();
    let rows = f(x)?.len();
    let mut jac = DMatrix::zeros(rows, ndx);
    let mut dx = DVector::zeros(ndx);
    for j in 0..ndx {
        dx[j] = h;
        let plus = f(&space.integrate(x, &dx)?)?;
        dx[j] = -h;
        let minus = f(&space.integrate(x, &dx)?)?;
        dx[j] = 0.0;
        jac.set_column(j, &((plus - minus) / (2.0 * h)));
    }
    Ok(jac)
}

/// Central-difference Jacobian of `f` with respect to the control.
///
/// # Errors
/// Propagates failures of `f`.
pub fn control_jacobian<F>(u: &DVector<f64>, h: f64, mut f: F) -> Result<DMatrix<f64>>
where
    F: FnMut(&DVector<f64>) -> Result<DVector<f64>>,
{
    let nu = u.len();
    let rows = f(u)?.len();
    let mut jac = DMatrix::zeros(rows, nu);
    let mut up = u.clone();
    for j in 0..nu {
        up[j] = u[j] + h;
        let plus = f(&up)?;
        up[j] = u[j] - h;
        let minus = f(&up)?;
        up[j] = u[j];
        jac.set_column(j, &((plus - minus) / (2.0 * h)));
    }
    Ok(jac)
}

/// Central-difference gradient of a scalar `f` with respect to the state.
///
/// # Errors
/// Propagates failures of the manifold operations or of `f`.
pub fn state_gradient<F>(
    space: &dyn StateSpace,
    x: &DVector<f64>,
    h: f64,
    mut f: F,
) -> Result<DVector<f64>>
where
    F: FnMut(&DVector<f64>) -> Result<f64>,
{
    let ndx = space.ndx();
    let mut grad = DVector::zeros(ndx);
    let mut dx = DVector::zeros(ndx);
    for j in 0..ndx {
        dx[j] = h;
        let plus = f(&space.integrate(x, &dx)?)?;
        dx[j] = -h;
        let minus = f(&space.integrate(x, &dx)?)?;
        dx[j] = 0.0;
        grad[j] = (plus - minus) / (2.0 * h);
    }
    Ok(grad)
}

/// Central-difference gradient of a scalar `f` with respect to the control.
///
/// # Errors
/// Propagates failures of `f`.
pub fn control_gradient<F>(u: &DVector<f64>, h: f64, mut f: F) -> Result<DVector<f64>>
where
    F: FnMut(&DVector<f64>) -> Result<f64>,
{
    let nu = u.len();
    let mut grad = DVector::zeros(nu);
    let mut up = u.clone();
    for j in 0..nu {
        up[j] = u[j] + h;
        let plus = f(&up)?;
        up[j] = u[j] - h;
        let minus = f(&up)?;
        up[j] = u[j];
        grad[j] = (plus - minus) / (2.0 * h);
    }
    Ok(grad)
}

/// First-order derivative checker for differential dynamics models.
///
/// `calc` delegates to the wrapped model; `calc_diff` recomputes `fx`,
/// `fu`, `lx`, and `lu` by central differences and leaves the
/// second-order cost blocks at zero.
pub struct NumDiffDynamics<M> {
    inner: M,
    disturbance: f64,
}

impl<M: DifferentialDynamics> NumDiffDynamics<M> {
    /// Wrap `inner` with the default disturbance.
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self::with_disturbance(inner, DEFAULT_DISTURBANCE)
    }

    /// Wrap `inner` with an explicit disturbance.
    ///
    /// # Panics
    /// Panics if `disturbance` is not strictly positive.
    #[must_use]
    pub fn with_disturbance(inner: M, disturbance: f64) -> Self {
        assert!(disturbance > 0.0, "disturbance must be positive");
        Self { inner, disturbance }
    }

    /// The wrapped model.
    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// The finite-difference disturbance in use.
    #[must_use]
    pub fn disturbance(&self) -> f64 {
        self.disturbance
    }
}

impl<M: DifferentialDynamics + 'static> DifferentialDynamics for NumDiffDynamics<M> {
    fn state(&self) -> std::sync::Arc<dyn StateSpace> {
        self.inner.state()
    }

    fn nu(&self) -> usize {
        self.inner.nu()
    }

    fn calc(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<DynamicsValue> {
        self.inner.calc(x, u)
    }

    fn calc_diff(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<DynamicsDerivatives> {
        let space = self.inner.state();
        let h = self.disturbance;

        let fx = state_jacobian(space.as_ref(), x, h, |xp| {
            self.inner.calc(xp, u).map(|value| value.xdot)
        })?;
        let fu = control_jacobian(u, h, |up| {
            self.inner.calc(x, up).map(|value| value.xdot)
        })?;

        let mut cost = crate::cost::CostDerivatives::zeros(space.ndx(), self.inner.nu());
        cost.lx = state_gradient(space.as_ref(), x, h, |xp| {
            self.inner.calc(xp, u).map(|value| value.cost)
        })?;
        cost.lu = control_gradient(u, h, |up| {
            self.inner.calc(x, up).map(|value| value.cost)
        })?;

        Ok(DynamicsDerivatives { fx, fu, cost })
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
