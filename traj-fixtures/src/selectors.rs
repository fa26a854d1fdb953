//! Closed selector enumerations for the fixture factories.
//!
//! Each enumeration is the single source of truth for its family of
//! fixtures: the `ALL` companion list is written next to the variants,
//! and every factory dispatches with an exhaustive `match`, so adding a
//! variant without updating the recipe fails to compile. Raw values only
//! enter through [`ModelSelector::from_index`] / [`ModelSelector::from_name`],
//! which reject anything outside the closed set - the variant count
//! itself included.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::FixtureError;
use crate::Result;

/// Differential dynamics model variants the factory can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ModelSelector {
    /// Analytic linear-quadratic model with a constant drift term.
    Lqr,
    /// Analytic linear-quadratic model without drift.
    LqrDriftFree,
    /// Serial-arm forward dynamics with full actuation and a three-term
    /// cost sum.
    ArmForwardDynamics,
}

impl ModelSelector {
    /// Number of variants; also the first invalid raw index.
    pub const COUNT: usize = 3;

    /// Every valid selector, for exhaustive iteration in test loops.
    pub const ALL: [Self; Self::COUNT] =
        [Self::Lqr, Self::LqrDriftFree, Self::ArmForwardDynamics];

    /// Human-readable selector name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Lqr => "lqr",
            Self::LqrDriftFree => "lqr_drift_free",
            Self::ArmForwardDynamics => "arm_forward_dynamics",
        }
    }

    /// Selector for a raw index.
    ///
    /// # Errors
    /// Returns [`FixtureError::UnrecognizedSelector`] for any index at or
    /// past [`Self::COUNT`].
    #[track_caller]
    pub fn from_index(index: usize) -> Result<Self> {
        match Self::ALL.get(index) {
            Some(selector) => Ok(*selector),
            None => Err(FixtureError::unrecognized("model", index)),
        }
    }

    /// Selector for a human-readable name.
    ///
    /// # Errors
    /// Returns [`FixtureError::UnrecognizedSelector`] for unknown names.
    #[track_caller]
    pub fn from_name(name: &str) -> Result<Self> {
        match Self::ALL.iter().find(|selector| selector.name() == name) {
            Some(selector) => Ok(*selector),
            None => Err(FixtureError::unrecognized("model", name)),
        }
    }
}

impl fmt::Display for ModelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// State-representation variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StateSelector {
    /// Euclidean state of fixed dimension.
    Vector,
    /// Configuration/velocity state of the example arm.
    ArmMultibody,
}

impl StateSelector {
    /// Number of variants.
    pub const COUNT: usize = 2;

    /// Every valid selector.
    pub const ALL: [Self; Self::COUNT] = [Self::Vector, Self::ArmMultibody];

    /// Human-readable selector name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::ArmMultibody => "arm_multibody",
        }
    }
}

impl fmt::Display for StateSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Actuation-model variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ActuationSelector {
    /// One torque input per velocity degree of freedom.
    Full,
}

impl ActuationSelector {
    /// Number of variants.
    pub const COUNT: usize = 1;

    /// Every valid selector.
    pub const ALL: [Self; Self::COUNT] = [Self::Full];

    /// Human-readable selector name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Full => "full",
        }
    }
}

impl fmt::Display for ActuationSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cost-term variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CostSelector {
    /// Track a reference state.
    StateTracking,
    /// Regularize the control input.
    ControlReg,
    /// Place the end effector at a target.
    FramePlacement,
}

impl CostSelector {
    /// Number of variants.
    pub const COUNT: usize = 3;

    /// Every valid selector.
    pub const ALL: [Self; Self::COUNT] =
        [Self::StateTracking, Self::ControlReg, Self::FramePlacement];

    /// Human-readable selector name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::StateTracking => "state_tracking",
            Self::ControlReg => "control_reg",
            Self::FramePlacement => "frame_placement",
        }
    }
}

impl fmt::Display for CostSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Activation variants for cost residuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ActivationSelector {
    /// Quadratic activation `1/2 ||r||^2`.
    Quadratic,
}

impl ActivationSelector {
    /// Number of variants.
    pub const COUNT: usize = 1;

    /// Every valid selector.
    pub const ALL: [Self; Self::COUNT] = [Self::Quadratic];

    /// Human-readable selector name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Quadratic => "quadratic",
        }
    }
}

impl fmt::Display for ActivationSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
