//! Core mechanism data structures.

use std::ops::Range;

use nalgebra::{Isometry3, Point3, Translation3, Unit, UnitQuaternion, Vector3};
use sk_core::{BodyId, Bounds, JointId};

use crate::error::{MechanismError, MechanismResult};
use crate::layout::CoordinateLayout;

/// Smallest axis norm accepted for prismatic/revolute joints.
const MIN_AXIS_NORM: f64 = 1e-12;

/// A rigid body in the kinematic tree.
///
/// Bodies carry no inertia here: dynamics live in the external engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RigidBody {
    pub id: BodyId,
    pub name: String,
}

/// Joint motion model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointKind {
    /// Floating base restricted to the x–z plane.
    ///
    /// Coordinates are `[x, z, pitch]`; pitch rotates about +y.
    Planar,
    /// Translation along a unit axis.
    Prismatic { axis: Unit<Vector3<f64>> },
    /// Rotation about a unit axis.
    Revolute { axis: Unit<Vector3<f64>> },
    /// No relative motion.
    Fixed,
}

impl JointKind {
    pub fn prismatic(axis: Vector3<f64>) -> Option<Self> {
        Unit::try_new(axis, MIN_AXIS_NORM).map(|axis| JointKind::Prismatic { axis })
    }

    pub fn revolute(axis: Vector3<f64>) -> Option<Self> {
        Unit::try_new(axis, MIN_AXIS_NORM).map(|axis| JointKind::Revolute { axis })
    }

    pub fn num_positions(&self) -> usize {
        match self {
            JointKind::Planar => 3,
            JointKind::Prismatic { .. } | JointKind::Revolute { .. } => 1,
            JointKind::Fixed => 0,
        }
    }

    /// Planar and 1-DOF joints have as many velocities as positions.
    pub fn num_velocities(&self) -> usize {
        self.num_positions()
    }

    /// Transform from the joint's successor frame to its predecessor frame.
    ///
    /// `q` must hold exactly [`JointKind::num_positions`] values.
    pub fn transform(&self, q: &[f64]) -> Isometry3<f64> {
        match *self {
            JointKind::Planar => Isometry3::from_parts(
                Translation3::new(q[0], 0.0, q[1]),
                UnitQuaternion::from_axis_angle(&Vector3::y_axis(), q[2]),
            ),
            JointKind::Prismatic { axis } => Isometry3::from_parts(
                Translation3::from(axis.into_inner() * q[0]),
                UnitQuaternion::identity(),
            ),
            JointKind::Revolute { axis } => Isometry3::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_axis_angle(&axis, q[0]),
            ),
            JointKind::Fixed => Isometry3::identity(),
        }
    }
}

/// A joint connects a parent body to a child body.
///
/// Bounds are stored per coordinate: `position_bounds` has one entry per
/// position coordinate, velocity and effort bounds one per velocity coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub id: JointId,
    pub name: String,
    pub kind: JointKind,
    pub parent: BodyId,
    pub child: BodyId,
    /// Pose of the joint frame in the parent body frame.
    pub origin: Isometry3<f64>,
    pub(crate) position_bounds: Vec<Bounds>,
    pub(crate) velocity_bounds: Vec<Bounds>,
    pub(crate) effort_bounds: Vec<Bounds>,
}

impl Joint {
    pub(crate) fn new(
        id: JointId,
        name: String,
        kind: JointKind,
        parent: BodyId,
        child: BodyId,
        origin: Isometry3<f64>,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            parent,
            child,
            origin,
            position_bounds: vec![Bounds::unbounded(); kind.num_positions()],
            velocity_bounds: vec![Bounds::unbounded(); kind.num_velocities()],
            effort_bounds: vec![Bounds::unbounded(); kind.num_velocities()],
        }
    }

    pub fn num_positions(&self) -> usize {
        self.kind.num_positions()
    }

    pub fn num_velocities(&self) -> usize {
        self.kind.num_velocities()
    }

    pub fn position_bounds(&self) -> &[Bounds] {
        &self.position_bounds
    }

    pub fn velocity_bounds(&self) -> &[Bounds] {
        &self.velocity_bounds
    }

    pub fn effort_bounds(&self) -> &[Bounds] {
        &self.effort_bounds
    }

    pub fn set_position_bounds(&mut self, bounds: Vec<Bounds>) -> MechanismResult<()> {
        self.check_count(self.num_positions(), bounds.len())?;
        self.position_bounds = bounds;
        Ok(())
    }

    pub fn set_velocity_bounds(&mut self, bounds: Vec<Bounds>) -> MechanismResult<()> {
        self.check_count(self.num_velocities(), bounds.len())?;
        self.velocity_bounds = bounds;
        Ok(())
    }

    pub fn set_effort_bounds(&mut self, bounds: Vec<Bounds>) -> MechanismResult<()> {
        self.check_count(self.num_velocities(), bounds.len())?;
        self.effort_bounds = bounds;
        Ok(())
    }

    /// Apply the same interval to every coordinate of each bound kind.
    pub fn set_uniform_bounds(&mut self, position: Bounds, velocity: Bounds, effort: Bounds) {
        self.position_bounds.fill(position);
        self.velocity_bounds.fill(velocity);
        self.effort_bounds.fill(effort);
    }

    fn check_count(&self, expected: usize, actual: usize) -> MechanismResult<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(MechanismError::CoordinateCount {
                joint: self.name.clone(),
                expected,
                actual,
            })
        }
    }
}

/// Planar contact boundary: the set of points on the inner side of a plane.
///
/// `outward_normal` points away from the obstacle material.
#[derive(Debug, Clone, PartialEq)]
pub struct HalfSpace {
    pub point: Point3<f64>,
    pub outward_normal: Unit<Vector3<f64>>,
}

impl HalfSpace {
    pub fn new(point: Point3<f64>, outward_normal: Unit<Vector3<f64>>) -> Self {
        Self {
            point,
            outward_normal,
        }
    }

    /// Positive outside the obstacle, negative inside.
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        self.outward_normal.dot(&(p - self.point))
    }

    /// Depth of `p` below the surface, zero when outside.
    pub fn penetration(&self, p: &Point3<f64>) -> f64 {
        (-self.signed_distance(p)).max(0.0)
    }

    /// Closest point on the boundary plane.
    pub fn project(&self, p: &Point3<f64>) -> Point3<f64> {
        p - self.outward_normal.into_inner() * self.signed_distance(p)
    }
}

/// The mechanism: a validated tree of bodies and joints plus its environment.
///
/// Joints keep their builder-assigned IDs; `tree_order` lists them
/// root-outward and defines the coordinate layout.
#[derive(Debug, Clone)]
pub struct Mechanism {
    pub(crate) name: String,
    pub(crate) root: BodyId,
    pub(crate) bodies: Vec<RigidBody>,
    pub(crate) joints: Vec<Joint>,
    pub(crate) tree_order: Vec<JointId>,
    /// Parent joint of each body, indexed by body slot; `None` for the root.
    pub(crate) parent_joint: Vec<Option<JointId>>,
    pub(crate) layout: CoordinateLayout,
    pub(crate) environment: Vec<HalfSpace>,
}

impl Mechanism {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> BodyId {
        self.root
    }

    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(id.slot())
    }

    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id.slot())
    }

    /// Mutable access for bound adjustments. Topology is fixed after build.
    pub fn joint_mut(&mut self, id: JointId) -> Option<&mut Joint> {
        self.joints.get_mut(id.slot())
    }

    pub fn find_body(&self, name: &str) -> MechanismResult<&RigidBody> {
        self.bodies
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| MechanismError::BodyNotFound(name.to_string()))
    }

    pub fn find_joint(&self, name: &str) -> MechanismResult<&Joint> {
        self.joints
            .iter()
            .find(|j| j.name == name)
            .ok_or_else(|| MechanismError::JointNotFound(name.to_string()))
    }

    /// Joints in root-outward order.
    pub fn tree_joints(&self) -> impl Iterator<Item = &Joint> {
        self.tree_order.iter().map(|id| &self.joints[id.slot()])
    }

    /// The joint whose child is `body`; `None` for the root.
    pub fn parent_joint(&self, body: BodyId) -> Option<&Joint> {
        let id = self.parent_joint.get(body.slot()).copied().flatten()?;
        self.joint(id)
    }

    pub fn layout(&self) -> &CoordinateLayout {
        &self.layout
    }

    pub fn num_positions(&self) -> usize {
        self.layout.num_positions()
    }

    pub fn num_velocities(&self) -> usize {
        self.layout.num_velocities()
    }

    /// Position-vector slice occupied by `joint`.
    pub fn configuration_range(&self, joint: JointId) -> MechanismResult<Range<usize>> {
        self.layout.configuration_range(joint)
    }

    /// Velocity-vector slice occupied by `joint`.
    pub fn velocity_range(&self, joint: JointId) -> MechanismResult<Range<usize>> {
        self.layout.velocity_range(joint)
    }

    /// Register a world-frame contact primitive and return its index.
    pub fn add_environment_primitive(&mut self, primitive: HalfSpace) -> usize {
        self.environment.push(primitive);
        self.environment.len() - 1
    }

    pub fn environment_primitives(&self) -> &[HalfSpace] {
        &self.environment
    }
}
