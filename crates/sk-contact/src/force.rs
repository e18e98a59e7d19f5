//! Compliant contact force laws.
//!
//! Contact forces are finite and continuous in penetration and slip: the
//! normal direction uses a nonlinear spring-damper, the tangential direction a
//! spring-damper regularization of Coulomb friction.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use sk_core::{ensure_finite, ensure_positive};

use crate::error::{ContactError, ContactResult};

/// Normal force as a function of penetration.
pub trait NormalForceModel: Send + Sync {
    /// Repelling normal force magnitude.
    ///
    /// # Arguments
    /// * `penetration` - Depth below the surface (positive when penetrating)
    /// * `penetration_rate` - Time derivative of `penetration`
    ///
    /// # Returns
    /// Force magnitude in newtons, never negative (contacts do not pull).
    fn normal_force(&self, penetration: f64, penetration_rate: f64) -> f64;
}

/// Result of a tangential force evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentialResponse {
    /// Friction force acting on the body, in the tangent plane.
    pub force: Vector3<f64>,
    /// Time derivative of the tangential deflection state.
    pub deflection_rate: Vector3<f64>,
    /// True if the stick force exceeded the friction cone.
    pub sliding: bool,
}

/// Tangential (friction) force with an internal deflection state.
pub trait TangentialForceModel: Send + Sync {
    /// Compute friction force and deflection dynamics.
    ///
    /// # Arguments
    /// * `deflection` - Current tangential deflection of the contact spring
    /// * `velocity` - Tangential slip velocity of the contact point
    /// * `normal_force` - Normal force magnitude bounding the friction cone
    fn tangential_force(
        &self,
        deflection: &Vector3<f64>,
        velocity: &Vector3<f64>,
        normal_force: f64,
    ) -> TangentialResponse;
}

/// Hunt–Crossley nonlinear spring-damper: `f = λ·zⁿ·ż + k·zⁿ`, clamped at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HuntCrossley {
    /// Stiffness
    pub k: f64,
    /// Damping
    pub lambda: f64,
    /// Penetration exponent
    pub n: f64,
}

impl HuntCrossley {
    pub fn new(k: f64, lambda: f64, n: f64) -> ContactResult<Self> {
        ensure_positive(k, "normal stiffness")?;
        ensure_finite(lambda, "normal damping")?;
        ensure_positive(n, "penetration exponent")?;
        if lambda < 0.0 {
            return Err(ContactError::NonPhysical {
                what: "negative normal damping",
            });
        }
        Ok(Self { k, lambda, n })
    }

    /// Hertzian variant: `n = 3/2`, `λ = 1.5·α·k`.
    ///
    /// `alpha` relates damping to the coefficient of restitution
    /// (roughly `(1 - e) / v_impact`).
    pub fn hertz(k: f64, alpha: f64) -> ContactResult<Self> {
        Self::new(k, 1.5 * alpha * k, 1.5)
    }
}

impl NormalForceModel for HuntCrossley {
    fn normal_force(&self, penetration: f64, penetration_rate: f64) -> f64 {
        if penetration <= 0.0 {
            return 0.0;
        }
        let zn = penetration.powf(self.n);
        (self.lambda * zn * penetration_rate + self.k * zn).max(0.0)
    }
}

/// Coulomb friction regularized by a tangential spring `k` and damper `b`.
///
/// While the stick force `-k·x - b·v` lies inside the cone of radius
/// `μ·f_n`, the contact sticks and the deflection follows the slip velocity.
/// Outside, the force is projected onto the cone boundary and the deflection
/// relaxes so the spring-damper reproduces that force.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViscoelasticCoulomb {
    /// Friction coefficient
    pub mu: f64,
    /// Tangential stiffness
    pub k: f64,
    /// Tangential damping
    pub b: f64,
}

impl ViscoelasticCoulomb {
    pub fn new(mu: f64, k: f64, b: f64) -> ContactResult<Self> {
        ensure_finite(mu, "friction coefficient")?;
        if mu < 0.0 {
            return Err(ContactError::NonPhysical {
                what: "negative friction coefficient",
            });
        }
        ensure_positive(k, "tangential stiffness")?;
        ensure_positive(b, "tangential damping")?;
        Ok(Self { mu, k, b })
    }
}

impl TangentialForceModel for ViscoelasticCoulomb {
    fn tangential_force(
        &self,
        deflection: &Vector3<f64>,
        velocity: &Vector3<f64>,
        normal_force: f64,
    ) -> TangentialResponse {
        let stick = -self.k * deflection - self.b * velocity;
        let max_norm = self.mu * normal_force.max(0.0);
        let stick_norm_sq = stick.norm_squared();

        if stick_norm_sq > max_norm * max_norm {
            let force = stick * (max_norm / stick_norm_sq.sqrt());
            TangentialResponse {
                force,
                deflection_rate: -(self.k * deflection + force) / self.b,
                sliding: true,
            }
        } else {
            TangentialResponse {
                force: stick,
                deflection_rate: *velocity,
                sliding: false,
            }
        }
    }
}

/// Two-term compliant contact law attached to a contact point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoftContactModel {
    pub normal: HuntCrossley,
    pub tangential: ViscoelasticCoulomb,
}

impl SoftContactModel {
    pub fn new(normal: HuntCrossley, tangential: ViscoelasticCoulomb) -> Self {
        Self { normal, tangential }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hertz_parameters() {
        let model = HuntCrossley::hertz(500e3, 0.2).unwrap();
        assert_eq!(model.n, 1.5);
        assert!((model.lambda - 150e3).abs() < 1e-9);
    }

    #[test]
    fn no_force_without_penetration() {
        let model = HuntCrossley::hertz(500e3, 0.2).unwrap();
        assert_eq!(model.normal_force(0.0, -1.0), 0.0);
        assert_eq!(model.normal_force(-0.01, 5.0), 0.0);
    }

    #[test]
    fn normal_force_grows_with_depth() {
        let model = HuntCrossley::hertz(500e3, 0.2).unwrap();
        let shallow = model.normal_force(1e-3, 0.0);
        let deep = model.normal_force(4e-3, 0.0);
        // f ~ z^1.5 → factor 8 for 4x depth
        assert!((deep / shallow - 8.0).abs() < 1e-9);
    }

    #[test]
    fn normal_force_never_pulls() {
        let model = HuntCrossley::hertz(500e3, 0.2).unwrap();
        // Fast separation would give a negative raw force
        assert_eq!(model.normal_force(1e-3, -100.0), 0.0);
    }

    #[test]
    fn invalid_parameters_rejected() {
        assert!(HuntCrossley::new(0.0, 1.0, 1.5).is_err());
        assert!(HuntCrossley::new(1.0, -1.0, 1.5).is_err());
        assert!(ViscoelasticCoulomb::new(-0.1, 20e3, 100.0).is_err());
        assert!(ViscoelasticCoulomb::new(0.8, 20e3, 0.0).is_err());
    }

    #[test]
    fn friction_sticks_inside_cone() {
        let model = ViscoelasticCoulomb::new(0.8, 20e3, 100.0).unwrap();
        let x = Vector3::new(1e-4, 0.0, 0.0);
        let v = Vector3::new(0.01, 0.0, 0.0);

        let response = model.tangential_force(&x, &v, 100.0);
        assert!(!response.sliding);
        assert!((response.force.x - (-2.0 - 1.0)).abs() < 1e-12);
        assert_eq!(response.deflection_rate, v);
    }

    #[test]
    fn friction_saturates_on_cone() {
        let model = ViscoelasticCoulomb::new(0.8, 20e3, 100.0).unwrap();
        let x = Vector3::new(0.01, 0.0, 0.0);
        let v = Vector3::new(1.0, 0.0, 0.0);

        let response = model.tangential_force(&x, &v, 10.0);
        assert!(response.sliding);
        assert!((response.force.norm() - 8.0).abs() < 1e-9);
        assert!(response.force.x < 0.0);
        // deflection relaxes toward the cone boundary
        assert!(response.deflection_rate.x < 0.0);
    }
}
