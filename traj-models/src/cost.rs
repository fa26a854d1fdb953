//! Cost terms and the weighted cost sum.
//!
//! A [`CostTerm`] evaluates a scalar cost at a state/control pair by
//! passing a residual through an [`Activation`]. Terms are aggregated by
//! name and weight in a [`CostSum`], whose total is the weighted sum of
//! its terms. Term names are unique within one sum; iteration order over
//! terms is unspecified.

use std::f64::consts::{PI, TAU};
use std::sync::Arc;

use hashbrown::HashMap;
use nalgebra::{DMatrix, DVector, Vector3};

use crate::error::ModelError;
use crate::state::{MultibodySpace, StateSpace};
use crate::Result;

/// Shapes a residual vector into a scalar cost.
pub trait Activation: Send + Sync {
    /// Activation value at residual `r`.
    fn calc(&self, r: &DVector<f64>) -> f64;

    /// First and second derivatives with respect to the residual:
    /// `(da_dr, d2a_dr2)`.
    fn calc_diff(&self, r: &DVector<f64>) -> (DVector<f64>, DMatrix<f64>);
}

/// Quadratic activation `a(r) = 1/2 ||r||^2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadraticActivation;

impl Activation for QuadraticActivation {
    fn calc(&self, r: &DVector<f64>) -> f64 {
        0.5 * r.dot(r)
    }

    fn calc_diff(&self, r: &DVector<f64>) -> (DVector<f64>, DMatrix<f64>) {
        (r.clone(), DMatrix::identity(r.len(), r.len()))
    }
}

/// First- and second-order partials of a cost at one state/control pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CostDerivatives {
    /// Gradient with respect to the state tangent (`ndx`).
    pub lx: DVector<f64>,
    /// Gradient with respect to the control (`nu`).
    pub lu: DVector<f64>,
    /// State Hessian (`ndx` x `ndx`).
    pub lxx: DMatrix<f64>,
    /// Cross partials (`ndx` x `nu`).
    pub lxu: DMatrix<f64>,
    /// Control Hessian (`nu` x `nu`).
    pub luu: DMatrix<f64>,
}

impl CostDerivatives {
    /// All-zero partials for the given tangent and control dimensions.
    #[must_use]
    pub fn zeros(ndx: usize, nu: usize) -> Self {
        Self {
            lx: DVector::zeros(ndx),
            lu: DVector::zeros(nu),
            lxx: DMatrix::zeros(ndx, ndx),
            lxu: DMatrix::zeros(ndx, nu),
            luu: DMatrix::zeros(nu, nu),
        }
    }
}

/// A single named-weight candidate for a [`CostSum`].
pub trait CostTerm: Send + Sync {
    /// The state space this term is defined over (shared handle).
    fn state(&self) -> Arc<dyn StateSpace>;

    /// Residual dimension.
    fn nr(&self) -> usize;

    /// Control dimension this term expects.
    fn nu(&self) -> usize;

    /// Cost value at `(x, u)`.
    ///
    /// # Errors
    /// Returns a dimension error when `x` or `u` is mis-sized.
    fn calc(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<f64>;

    /// Cost partials at `(x, u)`.
    ///
    /// Second-order blocks use the Gauss-Newton approximation
    /// `R^T a'' R` through the residual Jacobian `R`.
    ///
    /// # Errors
    /// Returns a dimension error when `x` or `u` is mis-sized.
    fn calc_diff(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<CostDerivatives>;
}

/// Penalizes the manifold distance of the state from a reference state.
pub struct StateTrackingCost {
    state: Arc<dyn StateSpace>,
    x_ref: DVector<f64>,
    activation: Arc<dyn Activation>,
    nu: usize,
}

impl StateTrackingCost {
    /// Create a tracking term toward `x_ref`.
    ///
    /// # Panics
    /// Panics if `x_ref` does not live in `state`.
    #[must_use]
    pub fn new(
        state: Arc<dyn StateSpace>,
        x_ref: DVector<f64>,
        activation: Arc<dyn Activation>,
        nu: usize,
    ) -> Self {
        assert_eq!(state.nx(), x_ref.len(), "x_ref must live in the state space");
        Self {
            state,
            x_ref,
            activation,
            nu,
        }
    }
}

impl CostTerm for StateTrackingCost {
    fn state(&self) -> Arc<dyn StateSpace> {
        Arc::clone(&self.state)
    }

    fn nr(&self) -> usize {
        self.state.ndx()
    }

    fn nu(&self) -> usize {
        self.nu
    }

    fn calc(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<f64> {
        ModelError::check_dim("u", self.nu, u.len())?;
        let r = self.state.difference(&self.x_ref, x)?;
        Ok(self.activation.calc(&r))
    }

    fn calc_diff(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<CostDerivatives> {
        ModelError::check_dim("u", self.nu, u.len())?;
        let r = self.state.difference(&self.x_ref, x)?;
        let (ar, arr) = self.activation.calc_diff(&r);

        // Residual Jacobian in x is the identity on the tangent space.
        let mut partials = CostDerivatives::zeros(self.state.ndx(), self.nu);
        partials.lx = ar;
        partials.lxx = arr;
        Ok(partials)
    }
}

/// Penalizes control effort against a zero reference.
pub struct ControlRegCost {
    state: Arc<dyn StateSpace>,
    activation: Arc<dyn Activation>,
    nu: usize,
}

impl ControlRegCost {
    /// Create a control regularization term for `nu` inputs.
    #[must_use]
    pub fn new(state: Arc<dyn StateSpace>, activation: Arc<dyn Activation>, nu: usize) -> Self {
        Self {
            state,
            activation,
            nu,
        }
    }
}

impl CostTerm for ControlRegCost {
    fn state(&self) -> Arc<dyn StateSpace> {
        Arc::clone(&self.state)
    }

    fn nr(&self) -> usize {
        self.nu
    }

    fn nu(&self) -> usize {
        self.nu
    }

    fn calc(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<f64> {
        ModelError::check_dim("x", self.state.nx(), x.len())?;
        ModelError::check_dim("u", self.nu, u.len())?;
        Ok(self.activation.calc(u))
    }

    fn calc_diff(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<CostDerivatives> {
        ModelError::check_dim("x", self.state.nx(), x.len())?;
        ModelError::check_dim("u", self.nu, u.len())?;
        let (ar, arr) = self.activation.calc_diff(u);

        let mut partials = CostDerivatives::zeros(self.state.ndx(), self.nu);
        partials.lu = ar;
        partials.luu = arr;
        Ok(partials)
    }
}

/// Penalizes the end-effector placement error against a fixed target.
pub struct FramePlacementCost {
    state: Arc<MultibodySpace>,
    target: Vector3<f64>,
    activation: Arc<dyn Activation>,
    nu: usize,
}

impl FramePlacementCost {
    /// Create a placement term toward `target` = `(x, z, heading)`.
    #[must_use]
    pub fn new(
        state: Arc<MultibodySpace>,
        target: Vector3<f64>,
        activation: Arc<dyn Activation>,
        nu: usize,
    ) -> Self {
        Self {
            state,
            target,
            activation,
            nu,
        }
    }

    fn residual(&self, x: &DVector<f64>) -> Result<DVector<f64>> {
        ModelError::check_dim("x", self.state.nx(), x.len())?;
        let q = x.rows(0, self.state.nq()).into_owned();
        let placement = self.state.arm().tip_placement(&q)?;
        let error = placement - self.target;
        Ok(DVector::from_vec(vec![
            error.x,
            error.y,
            wrap_angle(error.z),
        ]))
    }
}

impl CostTerm for FramePlacementCost {
    fn state(&self) -> Arc<dyn StateSpace> {
        self.state.clone()
    }

    fn nr(&self) -> usize {
        3
    }

    fn nu(&self) -> usize {
        self.nu
    }

    fn calc(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<f64> {
        ModelError::check_dim("u", self.nu, u.len())?;
        let r = self.residual(x)?;
        Ok(self.activation.calc(&r))
    }

    fn calc_diff(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<CostDerivatives> {
        ModelError::check_dim("u", self.nu, u.len())?;
        let r = self.residual(x)?;
        let (ar, arr) = self.activation.calc_diff(&r);

        let nq = self.state.nq();
        let nv = self.state.nv();
        let q = x.rows(0, nq).into_owned();
        let tip_jac = self.state.arm().tip_jacobian(&q)?;

        // Residual Jacobian: placement depends on q only.
        let mut rx = DMatrix::zeros(3, self.state.ndx());
        rx.columns_mut(0, nv).copy_from(&tip_jac);

        let mut partials = CostDerivatives::zeros(self.state.ndx(), self.nu);
        partials.lx = rx.transpose() * &ar;
        partials.lxx = rx.transpose() * &arr * &rx;
        Ok(partials)
    }
}

/// Wrap an angle difference into `(-pi, pi]`.
fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI {
        PI
    } else {
        wrapped
    }
}

/// A cost term registered in a [`CostSum`].
pub struct WeightedCost {
    /// The term itself.
    pub cost: Arc<dyn CostTerm>,
    /// Multiplier applied to the term's value and partials.
    pub weight: f64,
}

/// Weighted sum of named cost terms over one shared state space.
pub struct CostSum {
    state: Arc<dyn StateSpace>,
    nu: usize,
    items: HashMap<String, WeightedCost>,
}

impl CostSum {
    /// Create an empty sum over `state` with control dimension `nu`.
    #[must_use]
    pub fn new(state: Arc<dyn StateSpace>, nu: usize) -> Self {
        Self {
            state,
            nu,
            items: HashMap::new(),
        }
    }

    /// The state space this sum is defined over (shared handle).
    #[must_use]
    pub fn state(&self) -> Arc<dyn StateSpace> {
        Arc::clone(&self.state)
    }

    /// Control dimension.
    #[must_use]
    pub fn nu(&self) -> usize {
        self.nu
    }

    /// Number of registered terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check whether no terms are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check whether a term with `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// Iterate over `(name, weighted term)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &WeightedCost)> {
        self.items.iter().map(|(name, item)| (name.as_str(), item))
    }

    /// Register a term under a unique name.
    ///
    /// # Errors
    /// Returns [`ModelError::DuplicateCostTerm`] when `name` is taken,
    /// [`ModelError::SharedStateMismatch`] when the term was built over a
    /// different state-space instance, and a dimension error when the
    /// term's control dimension disagrees.
    pub fn add(&mut self, name: &str, cost: Arc<dyn CostTerm>, weight: f64) -> Result<()> {
        if self.items.contains_key(name) {
            return Err(ModelError::DuplicateCostTerm {
                name: name.to_string(),
            });
        }
        ModelError::check_dim("cost nu", self.nu, cost.nu())?;
        if !crate::state::same_state_instance(&self.state, &cost.state()) {
            return Err(ModelError::SharedStateMismatch { what: "cost term" });
        }
        tracing::debug!(name, weight, "registered cost term");
        self.items
            .insert(name.to_string(), WeightedCost { cost, weight });
        Ok(())
    }

    /// Remove the term registered under `name`.
    ///
    /// # Errors
    /// Returns [`ModelError::UnknownCostTerm`] when no such term exists.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        self.items
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ModelError::UnknownCostTerm {
                name: name.to_string(),
            })
    }

    /// Total weighted cost at `(x, u)`.
    ///
    /// # Errors
    /// Propagates the first term evaluation failure.
    pub fn calc(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<f64> {
        let mut total = 0.0;
        for item in self.items.values() {
            total += item.weight * item.cost.calc(x, u)?;
        }
        Ok(total)
    }

    /// Total weighted cost partials at `(x, u)`.
    ///
    /// # Errors
    /// Propagates the first term evaluation failure.
    pub fn calc_diff(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<CostDerivatives> {
        let mut total = CostDerivatives::zeros(self.state.ndx(), self.nu);
        for item in self.items.values() {
            let partials = item.cost.calc_diff(x, u)?;
            total.lx += &partials.lx * item.weight;
            total.lu += &partials.lu * item.weight;
            total.lxx += &partials.lxx * item.weight;
            total.lxu += &partials.lxu * item.weight;
            total.luu += &partials.luu * item.weight;
        }
        Ok(total)
    }
}
