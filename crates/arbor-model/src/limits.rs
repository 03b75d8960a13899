//! Joint limits: per-coordinate position bounds plus the actuation and
//! dissipation data a model description carries for each joint.

use crate::{ArborError, Result};
use arbor_math::DVec;

/// Physical limits of a joint.
///
/// `lower` and `upper` have one entry per configuration coordinate (`nq`).
/// Infinite entries mean the coordinate is unbounded.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointLimits {
    /// Lower position bound per configuration coordinate.
    pub lower: DVec,
    /// Upper position bound per configuration coordinate.
    pub upper: DVec,
    /// Maximum torque or force the joint can apply.
    pub effort: f64,
    /// Maximum joint speed.
    pub velocity: f64,
    /// Viscous friction coefficient.
    pub friction: f64,
    /// Damping coefficient.
    pub damping: f64,
    /// Dry friction loss.
    pub friction_loss: f64,
}

impl JointLimits {
    /// No bounds, no friction, no damping.
    pub fn unbounded(nq: usize) -> Self {
        Self {
            lower: DVec::from_element(nq, f64::NEG_INFINITY),
            upper: DVec::from_element(nq, f64::INFINITY),
            effort: f64::INFINITY,
            velocity: f64::INFINITY,
            friction: 0.0,
            damping: 0.0,
            friction_loss: 0.0,
        }
    }

    /// Position bounds only. Effort and velocity stay unbounded.
    pub fn position(lower: &[f64], upper: &[f64]) -> Self {
        Self {
            lower: DVec::from_column_slice(lower),
            upper: DVec::from_column_slice(upper),
            ..Self::unbounded(0)
        }
    }

    pub fn with_effort(mut self, effort: f64) -> Self {
        self.effort = effort;
        self
    }

    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the viscous friction coefficient and the dry friction loss.
    pub fn with_friction(mut self, friction: f64, friction_loss: f64) -> Self {
        self.friction = friction;
        self.friction_loss = friction_loss;
        self
    }

    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Bounds of coordinate `i`, each side replaced by `fallback` when
    /// infinite.
    pub fn bounds_or(&self, i: usize, fallback: [f64; 2]) -> [f64; 2] {
        let lo = self.lower[i];
        let hi = self.upper[i];
        [
            if lo.is_finite() { lo } else { fallback[0] },
            if hi.is_finite() { hi } else { fallback[1] },
        ]
    }

    /// Both bound vectors must have `nq` entries.
    pub fn check(&self, nq: usize) -> Result<()> {
        for (name, bound) in [("lower limits", &self.lower), ("upper limits", &self.upper)] {
            if bound.len() != nq {
                return Err(ArborError::DimensionMismatch {
                    name,
                    expected: nq,
                    got: bound.len(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded() {
        let limits = JointLimits::unbounded(3);
        assert_eq!(limits.lower.len(), 3);
        assert!(limits.lower.iter().all(|x| *x == f64::NEG_INFINITY));
        assert!(limits.upper.iter().all(|x| *x == f64::INFINITY));
        assert_eq!(limits.effort, f64::INFINITY);
        assert_eq!((limits.friction, limits.damping, limits.friction_loss), (0.0, 0.0, 0.0));
        assert_eq!(limits.bounds_or(1, [-1.0, 1.0]), [-1.0, 1.0]);
    }

    #[test]
    fn test_position_and_actuation() {
        let limits = JointLimits::position(&[-0.5, f64::NEG_INFINITY], &[0.25, 2.0])
            .with_effort(40.0)
            .with_velocity(3.0)
            .with_friction(0.1, 0.02)
            .with_damping(0.5);
        assert_eq!(limits.bounds_or(0, [-9.0, 9.0]), [-0.5, 0.25]);
        assert_eq!(limits.bounds_or(1, [-9.0, 9.0]), [-9.0, 2.0]);
        assert_eq!((limits.effort, limits.velocity), (40.0, 3.0));
        assert_eq!((limits.friction, limits.friction_loss, limits.damping), (0.1, 0.02, 0.5));
    }

    #[test]
    fn test_check_sizes() {
        assert!(JointLimits::unbounded(7).check(7).is_ok());
        assert_eq!(
            JointLimits::position(&[0.0], &[1.0, 2.0]).check(1),
            Err(ArborError::DimensionMismatch {
                name: "upper limits",
                expected: 1,
                got: 2,
            })
        );
    }
}
