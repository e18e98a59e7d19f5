//! Contact environment construction.
//!
//! Obstacles referenced by the description's raw contact entries are
//! deduplicated, evaluated in the world frame at a reference pose, registered
//! on the mechanism as half-space primitives, and then paired with
//! end-effector bodies through an explicit allow-list.

use std::collections::{BTreeMap, HashSet};

use nalgebra::{Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};
use sk_core::{BodyId, ObstacleId, ensure_positive};
use sk_mechanism::{Description, HalfSpace, Kinematics, Mechanism, MechanismState};

use crate::error::{ContactError, ContactResult};

/// Largest out-of-plane normal component still treated as in-plane.
const PLANE_TOLERANCE: f64 = 1e-9;

/// Operating plane of a planar robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactPlane {
    Xy,
    #[default]
    Xz,
    Yz,
}

impl ContactPlane {
    /// Unit axis perpendicular to the plane.
    pub fn normal_axis(self) -> Unit<Vector3<f64>> {
        match self {
            ContactPlane::Xy => Vector3::z_axis(),
            ContactPlane::Xz => Vector3::y_axis(),
            ContactPlane::Yz => Vector3::x_axis(),
        }
    }

    /// True if `direction` has no component out of the plane.
    pub fn contains_direction(self, direction: &Vector3<f64>) -> bool {
        direction.dot(&self.normal_axis()).abs() <= PLANE_TOLERANCE
    }
}

/// Permitted obstacles per end-effector body, keyed by names.
///
/// Bodies without an entry may touch nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowList(BTreeMap<String, Vec<String>>);

impl AllowList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the permitted obstacles for `body`.
    pub fn allow<I, S>(mut self, body: impl Into<String>, obstacles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .insert(body.into(), obstacles.into_iter().map(Into::into).collect());
        self
    }

    pub fn permits(&self, body: &str, obstacle: &str) -> bool {
        self.0
            .get(body)
            .is_some_and(|allowed| allowed.iter().any(|o| o == obstacle))
    }

    pub fn obstacles_for(&self, body: &str) -> &[String] {
        self.0.get(body).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(b, o)| (b.as_str(), o.as_slice()))
    }

    /// Every named body must exist in the mechanism and every named obstacle
    /// in the description.
    pub fn validate(&self, mechanism: &Mechanism, description: &Description) -> ContactResult<()> {
        for (body, obstacles) in self.iter() {
            if mechanism.find_body(body).is_err() {
                return Err(ContactError::UnknownAllowedBody(body.to_string()));
            }
            if let Some(missing) = obstacles.iter().find(|o| description.obstacle(o).is_none()) {
                return Err(ContactError::ObstacleNotFound(missing.clone()));
            }
        }
        Ok(())
    }
}

/// A unique obstacle face, fixed in the world frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactSurface {
    pub id: ObstacleId,
    pub name: String,
    /// Index of the matching primitive in the mechanism's environment list.
    pub primitive: usize,
    pub half_space: HalfSpace,
    pub friction: f64,
}

/// An admissible (body point, obstacle) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactPair {
    pub body: BodyId,
    pub body_name: String,
    /// Contact point in the body frame.
    pub point: Point3<f64>,
    pub obstacle: ObstacleId,
    pub obstacle_name: String,
}

/// Filtered contact environment.
///
/// Immutable once built; its surfaces mirror the primitives registered on the
/// mechanism at build time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactEnvironment {
    surfaces: Vec<ContactSurface>,
    pairs: Vec<ContactPair>,
}

impl ContactEnvironment {
    pub fn surfaces(&self) -> &[ContactSurface] {
        &self.surfaces
    }

    pub fn pairs(&self) -> &[ContactPair] {
        &self.pairs
    }

    pub fn surface(&self, id: ObstacleId) -> Option<&ContactSurface> {
        self.surfaces.get(id.slot())
    }

    pub fn surface_named(&self, name: &str) -> Option<&ContactSurface> {
        self.surfaces.iter().find(|s| s.name == name)
    }

    pub fn pairs_for_body(&self, body: BodyId) -> impl Iterator<Item = &ContactPair> {
        self.pairs.iter().filter(move |p| p.body == body)
    }

    pub fn has_pair(&self, body_name: &str, obstacle_name: &str) -> bool {
        self.pairs
            .iter()
            .any(|p| p.body_name == body_name && p.obstacle_name == obstacle_name)
    }
}

/// Builds a [`ContactEnvironment`] from a description at a reference pose.
#[derive(Debug, Clone)]
pub struct ContactEnvironmentBuilder<'a> {
    description: &'a Description,
    plane: ContactPlane,
    scale: f64,
}

impl<'a> ContactEnvironmentBuilder<'a> {
    pub fn new(description: &'a Description) -> Self {
        Self {
            description,
            plane: ContactPlane::default(),
            scale: 1.0,
        }
    }

    pub fn with_plane(mut self, plane: ContactPlane) -> Self {
        self.plane = plane;
        self
    }

    /// Scale applied to description geometry: obstacle face points and raw
    /// contact points, each in its own body frame.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    fn scaled(&self, point: [f64; 3]) -> Point3<f64> {
        Point3::from(Vector3::from(point) * self.scale)
    }

    /// Build surfaces at `reference`, register them on `mechanism`, and keep
    /// only the pairs `allow` permits.
    pub fn build(
        &self,
        mechanism: &mut Mechanism,
        reference: &MechanismState,
        allow: &AllowList,
    ) -> ContactResult<ContactEnvironment> {
        ensure_positive(self.scale, "geometry scale")?;
        allow.validate(mechanism, self.description)?;

        let kinematics = Kinematics::new(mechanism, reference)?;

        // Unique obstacles in first-reference order
        let mut seen = HashSet::new();
        let referenced: Vec<&str> = self
            .description
            .contacts
            .iter()
            .map(|c| c.obstacle.as_str())
            .filter(|name| seen.insert(*name))
            .collect();

        let mut surfaces = Vec::with_capacity(referenced.len());
        for name in referenced {
            let def = self
                .description
                .obstacle(name)
                .ok_or_else(|| ContactError::ObstacleNotFound(name.to_string()))?;
            let body = mechanism.find_body(&def.body)?.id;

            let local_point = self.scaled(def.point);
            let local_normal = Unit::try_new(Vector3::from(def.normal), f64::EPSILON).ok_or(
                ContactError::NonPhysical {
                    what: "zero obstacle normal",
                },
            )?;

            let point = kinematics.point_to_world(body, &local_point)?;
            let normal = kinematics.normal_to_world(body, &local_normal)?;
            if !self.plane.contains_direction(&normal) {
                tracing::warn!(
                    obstacle = name,
                    ?normal,
                    "obstacle normal leaves the operating plane, skipped"
                );
                continue;
            }

            let half_space = HalfSpace::new(point, normal);
            let primitive = mechanism.add_environment_primitive(half_space.clone());
            tracing::debug!(obstacle = name, primitive, ?point, "registered contact surface");

            surfaces.push(ContactSurface {
                id: ObstacleId::from_index(surfaces.len() as u32),
                name: name.to_string(),
                primitive,
                half_space,
                friction: def.friction,
            });
        }

        let mut pairs: Vec<ContactPair> = Vec::new();
        for contact in &self.description.contacts {
            let Some(surface) = surfaces.iter().find(|s| s.name == contact.obstacle) else {
                continue;
            };
            let point = self.scaled(contact.point);
            if !allow.permits(&contact.body, &contact.obstacle) {
                tracing::debug!(
                    body = %contact.body,
                    obstacle = %contact.obstacle,
                    "contact pair filtered out"
                );
                continue;
            }
            let repeated = pairs.iter().any(|p| {
                p.body_name == contact.body && p.obstacle == surface.id && p.point == point
            });
            if repeated {
                tracing::warn!(
                    body = %contact.body,
                    obstacle = %contact.obstacle,
                    "duplicate contact entry ignored"
                );
                continue;
            }
            pairs.push(ContactPair {
                body: mechanism.find_body(&contact.body)?.id,
                body_name: contact.body.clone(),
                point,
                obstacle: surface.id,
                obstacle_name: surface.name.clone(),
            });
        }

        tracing::info!(
            surfaces = surfaces.len(),
            candidates = self.description.contacts.len(),
            pairs = pairs.len(),
            "contact environment built"
        );

        Ok(ContactEnvironment { surfaces, pairs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_lookup() {
        let allow = AllowList::new()
            .allow("r_hand", Vec::<String>::new())
            .allow("l_foot", ["floor", "wall"]);

        assert!(allow.permits("l_foot", "wall"));
        assert!(!allow.permits("r_hand", "wall"));
        assert!(!allow.permits("r_foot", "floor"));
        assert_eq!(allow.obstacles_for("l_foot").len(), 2);
        assert!(allow.obstacles_for("nobody").is_empty());
    }

    #[test]
    fn plane_membership() {
        assert!(ContactPlane::Xz.contains_direction(&Vector3::z()));
        assert!(ContactPlane::Xz.contains_direction(&Vector3::x()));
        assert!(!ContactPlane::Xz.contains_direction(&Vector3::y()));
        assert!(!ContactPlane::Xy.contains_direction(&Vector3::z()));
    }

    #[test]
    fn allow_list_yaml_shape() {
        let allow: AllowList = serde_json::from_str(r#"{"l_hand": ["wall"]}"#).unwrap();
        assert!(allow.permits("l_hand", "wall"));
    }
}
