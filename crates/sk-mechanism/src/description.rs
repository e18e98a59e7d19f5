//! Kinematic description schema.
//!
//! The description is a YAML document listing bodies, joints, contact
//! obstacles and raw contact entries. It is read once at startup.

use std::collections::HashSet;
use std::path::Path;

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use sk_core::Bounds;

use crate::builder::MechanismBuilder;
use crate::error::{MechanismError, MechanismResult};
use crate::mechanism::{JointKind, Mechanism};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Description {
    pub name: String,
    /// Fixed world body; must not be repeated in `bodies`.
    #[serde(default = "default_root")]
    pub root: String,
    #[serde(default)]
    pub bodies: Vec<String>,
    #[serde(default)]
    pub joints: Vec<JointDef>,
    #[serde(default)]
    pub obstacles: Vec<ObstacleDef>,
    #[serde(default)]
    pub contacts: Vec<ContactDef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JointType {
    Planar,
    Prismatic,
    Revolute,
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JointDef {
    pub name: String,
    #[serde(rename = "type")]
    pub joint_type: JointType,
    pub parent: String,
    pub child: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis: Option<[f64; 3]>,
    #[serde(default)]
    pub origin: OriginDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<LimitsDef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OriginDef {
    #[serde(default)]
    pub xyz: [f64; 3],
    #[serde(default)]
    pub rpy: [f64; 3],
}

impl OriginDef {
    pub fn to_isometry(&self) -> Isometry3<f64> {
        let [x, y, z] = self.xyz;
        let [roll, pitch, yaw] = self.rpy;
        Isometry3::from_parts(
            Translation3::new(x, y, z),
            UnitQuaternion::from_euler_angles(roll, pitch, yaw),
        )
    }
}

/// `[lower, upper]` pairs applied to every coordinate of the joint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LimitsDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<[f64; 2]>,
}

/// A flat obstacle face, given in the frame of the body it is attached to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObstacleDef {
    pub name: String,
    pub body: String,
    pub point: [f64; 3],
    pub normal: [f64; 3],
    #[serde(default = "default_friction")]
    pub friction: f64,
}

/// Raw contact entry: a body-local point that may touch an obstacle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactDef {
    pub body: String,
    #[serde(default)]
    pub point: [f64; 3],
    pub obstacle: String,
}

fn default_root() -> String {
    "world".to_string()
}

fn default_friction() -> f64 {
    0.5
}

fn to_bounds(pair: Option<[f64; 2]>) -> MechanismResult<Bounds> {
    match pair {
        Some([lower, upper]) => Ok(Bounds::new(lower, upper)?),
        None => Ok(Bounds::unbounded()),
    }
}

impl Description {
    pub fn load_yaml(path: &Path) -> MechanismResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MechanismError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> MechanismResult<Self> {
        let description: Description = serde_yaml::from_str(content)?;
        description.validate_references()?;
        Ok(description)
    }

    pub fn obstacle(&self, name: &str) -> Option<&ObstacleDef> {
        self.obstacles.iter().find(|o| o.name == name)
    }

    /// Check that obstacles and contacts only reference declared names.
    pub fn validate_references(&self) -> MechanismResult<()> {
        let bodies: HashSet<&str> = std::iter::once(self.root.as_str())
            .chain(self.bodies.iter().map(String::as_str))
            .collect();

        let mut obstacles = HashSet::new();
        for obstacle in &self.obstacles {
            if !bodies.contains(obstacle.body.as_str()) {
                return Err(MechanismError::BodyNotFound(obstacle.body.clone()));
            }
            if !obstacles.insert(obstacle.name.as_str()) {
                return Err(MechanismError::DuplicateObstacle(obstacle.name.clone()));
            }
        }

        for contact in &self.contacts {
            if !bodies.contains(contact.body.as_str()) {
                return Err(MechanismError::BodyNotFound(contact.body.clone()));
            }
            if !obstacles.contains(contact.obstacle.as_str()) {
                return Err(MechanismError::ObstacleNotFound(contact.obstacle.clone()));
            }
        }

        Ok(())
    }

    /// Build and validate the kinematic tree described here.
    pub fn build_mechanism(&self) -> MechanismResult<Mechanism> {
        let mut builder = MechanismBuilder::new(self.name.clone(), self.root.clone());
        for body in &self.bodies {
            builder.add_body(body.clone());
        }

        for def in &self.joints {
            let resolve = |body: &str| {
                builder
                    .body_id(body)
                    .ok_or_else(|| MechanismError::UnknownBodyRef {
                        joint: def.name.clone(),
                        body: body.to_string(),
                    })
            };
            let parent = resolve(&def.parent)?;
            let child = resolve(&def.child)?;

            let kind = def.kind()?;
            let origin = def.origin.to_isometry();
            let joint = builder.add_joint(def.name.clone(), kind, parent, child, origin);

            if let Some(limits) = &def.limits {
                builder.set_joint_limits(
                    joint,
                    to_bounds(limits.position)?,
                    to_bounds(limits.velocity)?,
                    to_bounds(limits.effort)?,
                )?;
            }
        }

        builder.build()
    }
}

impl JointDef {
    fn kind(&self) -> MechanismResult<JointKind> {
        let axis = || -> MechanismResult<Vector3<f64>> {
            let [x, y, z] = self.axis.ok_or_else(|| MechanismError::InvalidAxis {
                joint: self.name.clone(),
            })?;
            Ok(Vector3::new(x, y, z))
        };
        let invalid = || MechanismError::InvalidAxis {
            joint: self.name.clone(),
        };

        match self.joint_type {
            JointType::Planar => Ok(JointKind::Planar),
            JointType::Fixed => Ok(JointKind::Fixed),
            JointType::Prismatic => JointKind::prismatic(axis()?).ok_or_else(invalid),
            JointType::Revolute => JointKind::revolute(axis()?).ok_or_else(invalid),
        }
    }
}
