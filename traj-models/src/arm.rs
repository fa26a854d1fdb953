//! Planar rigid serial-arm model.
//!
//! A serial chain of point-mass links hinging in the x-z plane, with
//! gravity along -z and all joints at rest hanging straight down. The
//! point-mass-at-link-end approximation keeps the joint-space quantities
//! exact with a few nested loops instead of a spatial-algebra recursion:
//!
//! - mass matrix `M(q) = sum_k m_k J_k(q)^T J_k(q)`
//! - bias forces `b(q, v) = sum_k m_k J_k^T (Jdot_k v + g_vec)`
//!
//! where `J_k` is the planar Jacobian of link `k`'s mass point. The
//! equations of motion are `M(q) qdd + b(q, v) = tau`.

use nalgebra::{DMatrix, DVector, Vector3};

use crate::error::ModelError;
use crate::Result;

/// Default gravitational acceleration (m/s^2).
pub const STANDARD_GRAVITY: f64 = 9.81;

/// A planar serial arm of point-mass links.
///
/// Joint angles are measured from the downward vertical, so `q = 0` is
/// the arm hanging straight down and the zero configuration is a gravity
/// equilibrium.
#[derive(Debug, Clone)]
pub struct ArmModel {
    link_lengths: Vec<f64>,
    link_masses: Vec<f64>,
    gravity: f64,
}

impl ArmModel {
    /// Create an arm from per-link lengths and masses.
    ///
    /// # Arguments
    /// * `link_lengths` - Length of each link (meters)
    /// * `link_masses` - Mass of each link (kg), lumped at the link end
    /// * `gravity` - Gravitational acceleration (m/s^2), applied along -z
    ///
    /// # Panics
    /// Panics if the arm has no links, the length/mass lists disagree, or
    /// any length or mass is not strictly positive.
    #[must_use]
    pub fn new(link_lengths: Vec<f64>, link_masses: Vec<f64>, gravity: f64) -> Self {
        assert!(!link_lengths.is_empty(), "ArmModel requires at least 1 link");
        assert_eq!(
            link_lengths.len(),
            link_masses.len(),
            "link length/mass lists must have equal size"
        );
        assert!(
            link_lengths.iter().all(|&l| l > 0.0) && link_masses.iter().all(|&m| m > 0.0),
            "link lengths and masses must be positive"
        );
        Self {
            link_lengths,
            link_masses,
            gravity,
        }
    }

    /// Create a uniform serial arm of `n` identical links.
    ///
    /// # Panics
    /// Panics if `n` is 0 or a parameter is not strictly positive.
    #[must_use]
    pub fn serial_arm(n: usize, link_length: f64, link_mass: f64) -> Self {
        Self::new(
            vec![link_length; n],
            vec![link_mass; n],
            STANDARD_GRAVITY,
        )
    }

    /// Number of degrees of freedom (one hinge per link).
    #[must_use]
    pub fn ndof(&self) -> usize {
        self.link_lengths.len()
    }

    /// Gravitational acceleration used by this model.
    #[must_use]
    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    /// Joint-space mass matrix `M(q)`.
    ///
    /// Symmetric positive definite for any configuration of a chain with
    /// positive link lengths and masses.
    ///
    /// # Errors
    /// Returns a dimension error when `q` is mis-sized.
    pub fn mass_matrix(&self, q: &DVector<f64>) -> Result<DMatrix<f64>> {
        let n = self.ndof();
        ModelError::check_dim("q", n, q.len())?;

        let phi = self.cumulative_angles(q);
        let mut m = DMatrix::zeros(n, n);
        for k in 0..n {
            let jk = self.point_jacobian(&phi, k);
            m += jk.transpose() * &jk * self.link_masses[k];
        }
        Ok(m)
    }

    /// Bias forces `b(q, v)`: Coriolis, centrifugal, and gravity terms.
    ///
    /// # Errors
    /// Returns a dimension error when `q` or `v` is mis-sized.
    pub fn bias_forces(&self, q: &DVector<f64>, v: &DVector<f64>) -> Result<DVector<f64>> {
        let n = self.ndof();
        ModelError::check_dim("q", n, q.len())?;
        ModelError::check_dim("v", n, v.len())?;

        let phi = self.cumulative_angles(q);
        let phidot = cumulative_sum(v);

        let mut grav = DVector::zeros(2);
        grav[1] = self.gravity;

        let mut bias = DVector::zeros(n);
        for k in 0..n {
            let jk = self.point_jacobian(&phi, k);
            let jdot = self.point_jacobian_dot(&phi, &phidot, k);
            bias += jk.transpose() * (jdot * v + &grav) * self.link_masses[k];
        }
        Ok(bias)
    }

    /// Placement of the end effector: `(x, z, heading)`.
    ///
    /// The heading is the absolute angle of the last link from the
    /// downward vertical.
    ///
    /// # Errors
    /// Returns a dimension error when `q` is mis-sized.
    pub fn tip_placement(&self, q: &DVector<f64>) -> Result<Vector3<f64>> {
        let n = self.ndof();
        ModelError::check_dim("q", n, q.len())?;

        let phi = self.cumulative_angles(q);
        let mut x = 0.0;
        let mut z = 0.0;
        for j in 0..n {
            x += self.link_lengths[j] * phi[j].sin();
            z -= self.link_lengths[j] * phi[j].cos();
        }
        Ok(Vector3::new(x, z, phi[n - 1]))
    }

    /// Jacobian of [`Self::tip_placement`] with respect to `q` (3 x ndof).
    ///
    /// # Errors
    /// Returns a dimension error when `q` is mis-sized.
    pub fn tip_jacobian(&self, q: &DVector<f64>) -> Result<DMatrix<f64>> {
        let n = self.ndof();
        ModelError::check_dim("q", n, q.len())?;

        let phi = self.cumulative_angles(q);
        let planar = self.point_jacobian(&phi, n - 1);
        let mut jac = DMatrix::zeros(3, n);
        jac.rows_mut(0, 2).copy_from(&planar);
        for i in 0..n {
            jac[(2, i)] = 1.0;
        }
        Ok(jac)
    }

    /// Absolute link angles `phi_k = q_0 + ... + q_k`.
    fn cumulative_angles(&self, q: &DVector<f64>) -> Vec<f64> {
        cumulative_sum(q)
    }

    /// Planar Jacobian (2 x ndof) of link `k`'s mass point.
    ///
    /// Column `i` is `sum_{j in i..=k} l_j (cos phi_j, sin phi_j)` for
    /// `i <= k`, zero otherwise.
    fn point_jacobian(&self, phi: &[f64], k: usize) -> DMatrix<f64> {
        let n = self.ndof();
        let mut jac = DMatrix::zeros(2, n);
        for i in 0..=k {
            let mut dx = 0.0;
            let mut dz = 0.0;
            for j in i..=k {
                dx += self.link_lengths[j] * phi[j].cos();
                dz += self.link_lengths[j] * phi[j].sin();
            }
            jac[(0, i)] = dx;
            jac[(1, i)] = dz;
        }
        jac
    }

    /// Time derivative of [`Self::point_jacobian`] at joint rates `phidot`.
    fn point_jacobian_dot(&self, phi: &[f64], phidot: &[f64], k: usize) -> DMatrix<f64> {
        let n = self.ndof();
        let mut jac = DMatrix::zeros(2, n);
        for i in 0..=k {
            let mut dx = 0.0;
            let mut dz = 0.0;
            for j in i..=k {
                dx -= self.link_lengths[j] * phidot[j] * phi[j].sin();
                dz += self.link_lengths[j] * phidot[j] * phi[j].cos();
            }
            jac[(0, i)] = dx;
            jac[(1, i)] = dz;
        }
        jac
    }
}

fn cumulative_sum(values: &DVector<f64>) -> Vec<f64> {
    let mut total = 0.0;
    values
        .iter()
        .map(|&value| {
            total += value;
            total
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_pendulum_mass_matrix() {
        let arm = ArmModel::new(vec![0.7], vec![2.0], STANDARD_GRAVITY);
        let q = DVector::from_vec(vec![0.3]);
        let m = arm.mass_matrix(&q).unwrap();
        // Point pendulum: M = m l^2, independent of q.
        assert_relative_eq!(m[(0, 0)], 2.0 * 0.7 * 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_pendulum_gravity_torque() {
        let arm = ArmModel::new(vec![0.7], vec![2.0], STANDARD_GRAVITY);
        let v = DVector::zeros(1);

        for &angle in &[0.0, 0.4, FRAC_PI_2, 2.0] {
            let q = DVector::from_vec(vec![angle]);
            let bias = arm.bias_forces(&q, &v).unwrap();
            // Closed form: g(q) = m g l sin(q).
            assert_relative_eq!(
                bias[0],
                2.0 * STANDARD_GRAVITY * 0.7 * angle.sin(),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_pendulum_has_no_coriolis() {
        let arm = ArmModel::new(vec![0.7], vec![2.0], 0.0);
        let q = DVector::from_vec(vec![0.9]);
        let v = DVector::from_vec(vec![3.0]);
        let bias = arm.bias_forces(&q, &v).unwrap();
        assert_relative_eq!(bias[0], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mass_matrix_is_spd() {
        let arm = ArmModel::serial_arm(5, 0.3, 1.0);
        for &scale in &[0.0, 0.3, -1.1, 2.5] {
            let q = DVector::from_fn(5, |i, _| scale * (i as f64 + 1.0));
            let m = arm.mass_matrix(&q).unwrap();

            for i in 0..5 {
                for j in 0..5 {
                    assert_relative_eq!(m[(i, j)], m[(j, i)], epsilon = 1e-12);
                }
            }
            assert!(
                m.cholesky().is_some(),
                "mass matrix should factor at q scale {scale}"
            );
        }
    }

    #[test]
    fn test_tip_placement_hanging_and_level() {
        let arm = ArmModel::serial_arm(2, 0.5, 1.0);

        let tip = arm.tip_placement(&DVector::zeros(2)).unwrap();
        assert_relative_eq!(tip.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(tip.y, -1.0, epsilon = 1e-12);
        assert_relative_eq!(tip.z, 0.0, epsilon = 1e-12);

        // First joint level, second joint straight: arm points along +x.
        let tip = arm
            .tip_placement(&DVector::from_vec(vec![FRAC_PI_2, 0.0]))
            .unwrap();
        assert_relative_eq!(tip.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(tip.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(tip.z, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_tip_jacobian_matches_finite_difference() {
        let arm = ArmModel::serial_arm(3, 0.4, 1.2);
        let q = DVector::from_vec(vec![0.2, -0.5, 1.1]);
        let jac = arm.tip_jacobian(&q).unwrap();

        let h = 1e-7;
        for i in 0..3 {
            let mut qp = q.clone();
            let mut qm = q.clone();
            qp[i] += h;
            qm[i] -= h;
            let fd = (arm.tip_placement(&qp).unwrap() - arm.tip_placement(&qm).unwrap())
                / (2.0 * h);
            for row in 0..3 {
                assert_relative_eq!(jac[(row, i)], fd[row], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_rejects_mis_sized_configuration() {
        let arm = ArmModel::serial_arm(3, 0.4, 1.0);
        let err = arm.mass_matrix(&DVector::zeros(2)).unwrap_err();
        assert!(err.is_dimension_mismatch());
    }
}
