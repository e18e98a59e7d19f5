//! Compliant contact points on end-effector bodies.

use nalgebra::Point3;
use sk_core::BodyId;
use sk_mechanism::Mechanism;

use crate::error::ContactResult;
use crate::force::SoftContactModel;

/// A body-local attachment point carrying a compliant force law.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactPoint {
    pub body: BodyId,
    pub location: Point3<f64>,
    pub model: SoftContactModel,
}

/// Contact points registered on a mechanism's bodies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactPoints {
    points: Vec<ContactPoint>,
}

impl ContactPoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContactPoint> {
        self.points.iter()
    }

    pub fn for_body(&self, body: BodyId) -> impl Iterator<Item = &ContactPoint> {
        self.points.iter().filter(move |p| p.body == body)
    }

    pub fn has_point(&self, body: BodyId) -> bool {
        self.points.iter().any(|p| p.body == body)
    }
}

/// Attaches one contact point per listed end-effector body.
///
/// Each force law contributes once per point, so a second point on the same
/// body would double that body's contact force. [`assign`](Self::assign)
/// therefore skips bodies that already carry a point.
#[derive(Debug, Clone)]
pub struct ContactForceModelAssigner {
    model: SoftContactModel,
    location: Point3<f64>,
}

impl ContactForceModelAssigner {
    /// Points are attached at the body origin.
    pub fn new(model: SoftContactModel) -> Self {
        Self {
            model,
            location: Point3::origin(),
        }
    }

    pub fn with_location(mut self, location: Point3<f64>) -> Self {
        self.location = location;
        self
    }

    /// Add a contact point to each named body and return how many were added.
    ///
    /// All names are resolved before anything is added, so an unknown body
    /// leaves `points` untouched.
    pub fn assign<S: AsRef<str>>(
        &self,
        mechanism: &Mechanism,
        points: &mut ContactPoints,
        bodies: &[S],
    ) -> ContactResult<usize> {
        let resolved = bodies
            .iter()
            .map(|name| mechanism.find_body(name.as_ref()).map(|b| (b.id, b.name.as_str())))
            .collect::<Result<Vec<_>, _>>()?;

        let mut added = 0;
        for (body, name) in resolved {
            if points.has_point(body) {
                tracing::warn!(body = name, "body already has a contact point, not adding another");
                continue;
            }
            points.points.push(ContactPoint {
                body,
                location: self.location,
                model: self.model,
            });
            added += 1;
        }

        tracing::debug!(added, total = points.len(), "contact points assigned");
        Ok(added)
    }
}
