//! State-space abstractions for continuous-time dynamics.
//!
//! A [`StateSpace`] describes the manifold a model's state lives on:
//! its representation dimension, its tangent dimension, and the
//! integrate/difference operations that move between the two. Two
//! implementations are provided:
//!
//! - [`VectorSpace`] - plain Euclidean state, used by analytic models
//! - [`MultibodySpace`] - configuration/velocity state over a shared
//!   [`ArmModel`]

use std::sync::Arc;

use nalgebra::DVector;

use crate::arm::ArmModel;
use crate::error::ModelError;
use crate::Result;

/// A differentiable state manifold.
///
/// Implementations are immutable after construction and shared between
/// the dynamics model and its sub-models by reference counting; mutating
/// a shared instance after composition is unsupported.
pub trait StateSpace: Send + Sync {
    /// Dimension of the state representation.
    fn nx(&self) -> usize;

    /// Dimension of the tangent space.
    fn ndx(&self) -> usize;

    /// The neutral state.
    fn zero(&self) -> DVector<f64>;

    /// Walk from `x` along the tangent step `dx`.
    ///
    /// # Errors
    /// Returns a dimension error when `x` or `dx` is mis-sized.
    fn integrate(&self, x: &DVector<f64>, dx: &DVector<f64>) -> Result<DVector<f64>>;

    /// Tangent step taking `x0` to `x1`.
    ///
    /// # Errors
    /// Returns a dimension error when `x0` or `x1` is mis-sized.
    fn difference(&self, x0: &DVector<f64>, x1: &DVector<f64>) -> Result<DVector<f64>>;
}

/// Check whether two state-space handles point at the same instance.
///
/// Sub-models of one dynamics model are required to share a single state
/// space rather than hold equal copies; this is the identity test used to
/// enforce that.
#[must_use]
pub fn same_state_instance(a: &Arc<dyn StateSpace>, b: &Arc<dyn StateSpace>) -> bool {
    std::ptr::eq(Arc::as_ptr(a).cast::<u8>(), Arc::as_ptr(b).cast::<u8>())
}

/// Euclidean state in `R^n`.
///
/// Integrate and difference are plain vector addition and subtraction,
/// and the tangent dimension equals the state dimension.
#[derive(Debug, Clone)]
pub struct VectorSpace {
    nx: usize,
}

impl VectorSpace {
    /// Create a Euclidean state space of dimension `nx`.
    ///
    /// # Panics
    /// Panics if `nx` is 0.
    #[must_use]
    pub fn new(nx: usize) -> Self {
        assert!(nx > 0, "VectorSpace requires a positive dimension");
        Self { nx }
    }
}

impl StateSpace for VectorSpace {
    fn nx(&self) -> usize {
        self.nx
    }

    fn ndx(&self) -> usize {
        self.nx
    }

    fn zero(&self) -> DVector<f64> {
        DVector::zeros(self.nx)
    }

    fn integrate(&self, x: &DVector<f64>, dx: &DVector<f64>) -> Result<DVector<f64>> {
        ModelError::check_dim("x", self.nx, x.len())?;
        ModelError::check_dim("dx", self.nx, dx.len())?;
        Ok(x + dx)
    }

    fn difference(&self, x0: &DVector<f64>, x1: &DVector<f64>) -> Result<DVector<f64>> {
        ModelError::check_dim("x0", self.nx, x0.len())?;
        ModelError::check_dim("x1", self.nx, x1.len())?;
        Ok(x1 - x0)
    }
}

/// Configuration/velocity state over a rigid serial arm.
///
/// The state is `x = (q, v)` with `nq` joint angles and `nv` joint
/// velocities. Every joint is an unbounded revolute, so the chart is a
/// vector space and integrate/difference reduce to vector arithmetic;
/// the manifold operations are kept so consumers never special-case
/// this representation.
#[derive(Debug, Clone)]
pub struct MultibodySpace {
    arm: Arc<ArmModel>,
}

impl MultibodySpace {
    /// Create the state space of `arm`.
    #[must_use]
    pub fn new(arm: Arc<ArmModel>) -> Self {
        Self { arm }
    }

    /// The underlying arm model.
    #[must_use]
    pub fn arm(&self) -> &Arc<ArmModel> {
        &self.arm
    }

    /// Number of configuration coordinates.
    #[must_use]
    pub fn nq(&self) -> usize {
        self.arm.ndof()
    }

    /// Number of velocity coordinates.
    #[must_use]
    pub fn nv(&self) -> usize {
        self.arm.ndof()
    }
}

impl StateSpace for MultibodySpace {
    fn nx(&self) -> usize {
        self.nq() + self.nv()
    }

    fn ndx(&self) -> usize {
        2 * self.nv()
    }

    fn zero(&self) -> DVector<f64> {
        DVector::zeros(self.nx())
    }

    fn integrate(&self, x: &DVector<f64>, dx: &DVector<f64>) -> Result<DVector<f64>> {
        ModelError::check_dim("x", self.nx(), x.len())?;
        ModelError::check_dim("dx", self.ndx(), dx.len())?;
        Ok(x + dx)
    }

    fn difference(&self, x0: &DVector<f64>, x1: &DVector<f64>) -> Result<DVector<f64>> {
        ModelError::check_dim("x0", self.nx(), x0.len())?;
        ModelError::check_dim("x1", self.nx(), x1.len())?;
        Ok(x1 - x0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_space_roundtrip() {
        let space = VectorSpace::new(4);
        assert_eq!(space.nx(), 4);
        assert_eq!(space.ndx(), 4);

        let x0 = space.zero();
        let dx = DVector::from_vec(vec![1.0, -2.0, 0.5, 3.0]);
        let x1 = space.integrate(&x0, &dx).unwrap();
        let back = space.difference(&x0, &x1).unwrap();
        assert_eq!(back, dx);
    }

    #[test]
    fn test_vector_space_rejects_bad_dims() {
        let space = VectorSpace::new(4);
        let err = space
            .integrate(&space.zero(), &DVector::zeros(3))
            .unwrap_err();
        assert!(err.is_dimension_mismatch());
    }

    #[test]
    fn test_multibody_space_dims() {
        let arm = Arc::new(ArmModel::serial_arm(3, 0.5, 1.0));
        let space = MultibodySpace::new(arm);
        assert_eq!(space.nq(), 3);
        assert_eq!(space.nv(), 3);
        assert_eq!(space.nx(), 6);
        assert_eq!(space.ndx(), 6);
        assert_eq!(space.zero().len(), 6);
    }

    #[test]
    fn test_same_state_instance() {
        let shared: Arc<dyn StateSpace> = Arc::new(VectorSpace::new(4));
        let alias = Arc::clone(&shared);
        let other: Arc<dyn StateSpace> = Arc::new(VectorSpace::new(4));

        assert!(same_state_instance(&shared, &alias));
        assert!(!same_state_instance(&shared, &other));
    }
}
