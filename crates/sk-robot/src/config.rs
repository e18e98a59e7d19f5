//! Robot configuration.
//!
//! Everything the pipeline needs besides the kinematic description: which
//! names to resolve, contact parameters, nominal pose, cost weights and the
//! solver settings. Every section has defaults describing the reference box
//! robot, so a YAML file only needs to list what differs.

use std::collections::BTreeMap;
use std::path::Path;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use sk_contact::{AllowList, ContactPlane, HuntCrossley, SoftContactModel, ViscoelasticCoulomb};
use sk_core::{Sided, ensure_positive};
use sk_lqr::RiccatiConfig;

use crate::error::{RobotError, RobotResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub floating_base: FloatingBaseConfig,
    pub limbs: LimbConfig,
    pub contact: ContactConfig,
    pub nominal: NominalConfig,
    pub cost: CostConfig,
    pub lqr: LqrConfig,
    pub mpc: MpcParams,
}

impl RobotConfig {
    /// Load from YAML; missing sections keep their defaults.
    pub fn load_yaml(path: &Path) -> RobotResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RobotError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| RobotError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Numeric sanity checks that do not need the mechanism.
    pub fn validate(&self) -> RobotResult<()> {
        self.floating_base.validate()?;
        self.contact.soft_contact_model()?;
        ensure_positive(self.contact.scale, "contact geometry scale")?;
        self.cost.validate()?;
        self.mpc.validate()?;
        if self.lqr.riccati.max_iterations == 0 {
            return Err(RobotError::InvalidConfig(
                "lqr.riccati.max_iterations must be at least 1".into(),
            ));
        }
        ensure_positive(self.lqr.riccati.rel_tol, "Riccati tolerance")?;
        Ok(())
    }
}

/// The unactuated planar joint connecting the robot to the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatingBaseConfig {
    pub joint: String,
    /// Symmetric position limit; large enough to be effectively unconstrained.
    pub position_limit: f64,
    pub velocity_limit: f64,
}

impl Default for FloatingBaseConfig {
    fn default() -> Self {
        Self {
            joint: "floating_base".into(),
            position_limit: 1e3,
            velocity_limit: 1e3,
        }
    }
}

impl FloatingBaseConfig {
    fn validate(&self) -> RobotResult<()> {
        ensure_positive(self.position_limit, "floating base position limit")?;
        ensure_positive(self.velocity_limit, "floating base velocity limit")?;
        Ok(())
    }
}

/// Left/right names of the end-effector bodies and limb joints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimbConfig {
    pub feet: Sided<String>,
    pub hands: Sided<String>,
    pub leg_extension: Sided<String>,
    pub hand_rotation: Sided<String>,
    pub hand_extension: Sided<String>,
}

impl Default for LimbConfig {
    fn default() -> Self {
        Self {
            feet: Sided::new("l_foot".into(), "r_foot".into()),
            hands: Sided::new("l_hand".into(), "r_hand".into()),
            leg_extension: Sided::new(
                "core_to_lf_extension".into(),
                "core_to_rf_extension".into(),
            ),
            hand_rotation: Sided::new(
                "core_to_lh_rotation".into(),
                "core_to_rh_rotation".into(),
            ),
            hand_extension: Sided::new(
                "core_to_lh_extension".into(),
                "core_to_rh_extension".into(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Hertz normal stiffness.
    pub stiffness: f64,
    /// Hunt–Crossley dissipation coefficient.
    pub dissipation: f64,
    pub friction_coefficient: f64,
    pub tangential_stiffness: f64,
    pub tangential_damping: f64,
    /// Body-frame location of every contact point. Must match the scaled
    /// point of each description contact entry on an assigned body.
    pub location: [f64; 3],
    /// Bodies that receive a contact point.
    pub bodies: Vec<String>,
    pub allow: AllowList,
    pub plane: ContactPlane,
    pub scale: f64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            stiffness: 500e3,
            dissipation: 0.2,
            friction_coefficient: 0.8,
            tangential_stiffness: 20e3,
            tangential_damping: 100.0,
            location: [0.0; 3],
            bodies: ["r_hand", "l_hand", "r_foot", "l_foot"]
                .into_iter()
                .map(String::from)
                .collect(),
            allow: AllowList::new()
                .allow("r_hand", Vec::<String>::new())
                .allow("l_hand", ["wall"])
                .allow("r_foot", ["floor"])
                .allow("l_foot", ["floor", "wall"]),
            plane: ContactPlane::Xz,
            scale: 1.0,
        }
    }
}

impl ContactConfig {
    pub fn soft_contact_model(&self) -> RobotResult<SoftContactModel> {
        let normal = HuntCrossley::hertz(self.stiffness, self.dissipation)?;
        let tangential = ViscoelasticCoulomb::new(
            self.friction_coefficient,
            self.tangential_stiffness,
            self.tangential_damping,
        )?;
        Ok(SoftContactModel::new(normal, tangential))
    }

    pub fn location(&self) -> Point3<f64> {
        Point3::from(self.location)
    }
}

/// Equilibrium pose: standing on both feet, hands tucked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NominalConfig {
    /// Floating base `[x, z, pitch]`.
    pub base: [f64; 3],
    pub leg_extension: f64,
    pub hand_rotation: f64,
    pub hand_extension: f64,
}

impl Default for NominalConfig {
    fn default() -> Self {
        Self {
            base: [0.0, 0.8, 0.0],
            leg_extension: 0.8,
            hand_rotation: 0.0,
            hand_extension: 0.5,
        }
    }
}

/// Diagonal running-cost weights keyed by joint name.
///
/// Each entry lists one weight per coordinate of that joint. Coordinates of
/// joints without an entry get the default weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    pub position: BTreeMap<String, Vec<f64>>,
    pub velocity: BTreeMap<String, Vec<f64>>,
    pub default_position: f64,
    pub default_velocity: f64,
    /// Uniform control weight.
    pub r: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        let limbs = LimbConfig::default();
        let limb_joints: Vec<String> = [
            limbs.leg_extension,
            limbs.hand_rotation,
            limbs.hand_extension,
        ]
        .into_iter()
        .flat_map(|s| [s.left, s.right])
        .collect();

        let mut position = BTreeMap::new();
        let mut velocity = BTreeMap::new();
        position.insert("floating_base".to_string(), vec![100.0, 1000.0, 1000.0]);
        velocity.insert("floating_base".to_string(), vec![10.0, 100.0, 100.0]);
        for joint in limb_joints {
            position.insert(joint.clone(), vec![10.0]);
            velocity.insert(joint, vec![1.0]);
        }

        Self {
            position,
            velocity,
            default_position: 0.1,
            default_velocity: 0.01,
            r: 1e-3,
        }
    }
}

impl CostConfig {
    pub fn validate(&self) -> RobotResult<()> {
        ensure_positive(self.default_position, "default position weight")?;
        ensure_positive(self.default_velocity, "default velocity weight")?;
        ensure_positive(self.r, "control weight")?;
        for weights in self.position.values().chain(self.velocity.values()) {
            for w in weights {
                ensure_positive(*w, "joint cost weight")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LqrConfig {
    /// Project the floating base's horizontal coordinate out of the terminal value.
    pub horizontal_invariance: bool,
    pub riccati: RiccatiConfig,
}

impl Default for LqrConfig {
    fn default() -> Self {
        Self {
            horizontal_invariance: true,
            riccati: RiccatiConfig::default(),
        }
    }
}

/// Settings handed to the external trajectory optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MpcParams {
    /// Timestep in seconds; also the LQR discretization step.
    pub dt: f64,
    pub horizon: usize,
    pub time_limit_s: f64,
    pub optimality_gap: f64,
    pub feasibility_tol: f64,
}

impl Default for MpcParams {
    fn default() -> Self {
        Self {
            dt: 0.05,
            horizon: 10,
            time_limit_s: 5.0,
            optimality_gap: 0.1,
            feasibility_tol: 1e-3,
        }
    }
}

impl MpcParams {
    pub fn validate(&self) -> RobotResult<()> {
        ensure_positive(self.dt, "mpc timestep")?;
        ensure_positive(self.time_limit_s, "mpc time limit")?;
        ensure_positive(self.optimality_gap, "mpc optimality gap")?;
        ensure_positive(self.feasibility_tol, "mpc feasibility tolerance")?;
        if self.horizon == 0 {
            return Err(RobotError::InvalidConfig("mpc.horizon must be at least 1".into()));
        }
        Ok(())
    }
}
