//! Incremental mechanism builder.

use nalgebra::Isometry3;
use sk_core::{BodyId, Bounds, JointId};

use crate::error::{MechanismError, MechanismResult};
use crate::layout::CoordinateLayout;
use crate::mechanism::{Joint, JointKind, Mechanism, RigidBody};
use crate::validate;

/// Builder for constructing a mechanism incrementally.
///
/// The root (world) body is created by [`MechanismBuilder::new`]. Use
/// `add_body` and `add_joint` to grow the tree, then call `build()` to
/// validate and freeze it into a `Mechanism`.
#[derive(Debug)]
pub struct MechanismBuilder {
    name: String,
    bodies: Vec<RigidBody>,
    joints: Vec<Joint>,
    next_body_id: u32,
    next_joint_id: u32,
}

impl MechanismBuilder {
    /// Create a builder holding only the root body.
    pub fn new(name: impl Into<String>, root_name: impl Into<String>) -> Self {
        let mut builder = Self {
            name: name.into(),
            bodies: Vec::new(),
            joints: Vec::new(),
            next_body_id: 0,
            next_joint_id: 0,
        };
        builder.add_body(root_name);
        builder
    }

    pub fn root(&self) -> BodyId {
        BodyId::from_index(0)
    }

    /// Add a body and return its ID.
    pub fn add_body(&mut self, name: impl Into<String>) -> BodyId {
        let id = BodyId::from_index(self.next_body_id);
        self.next_body_id += 1;
        self.bodies.push(RigidBody {
            id,
            name: name.into(),
        });
        id
    }

    /// Add a joint from `parent` to `child` with unbounded limits.
    pub fn add_joint(
        &mut self,
        name: impl Into<String>,
        kind: JointKind,
        parent: BodyId,
        child: BodyId,
        origin: Isometry3<f64>,
    ) -> JointId {
        let id = JointId::from_index(self.next_joint_id);
        self.next_joint_id += 1;
        self.joints
            .push(Joint::new(id, name.into(), kind, parent, child, origin));
        id
    }

    /// Apply uniform limits to every coordinate of a joint.
    pub fn set_joint_limits(
        &mut self,
        joint: JointId,
        position: Bounds,
        velocity: Bounds,
        effort: Bounds,
    ) -> MechanismResult<()> {
        let joint = self
            .joints
            .get_mut(joint.slot())
            .ok_or(MechanismError::UnknownJoint(joint))?;
        joint.set_uniform_bounds(position, velocity, effort);
        Ok(())
    }

    /// Look up a body added so far by name.
    pub fn body_id(&self, name: &str) -> Option<BodyId> {
        self.bodies.iter().find(|b| b.name == name).map(|b| b.id)
    }

    /// Validate the tree and compute the coordinate layout.
    pub fn build(self) -> MechanismResult<Mechanism> {
        let root = self.root();
        validate::validate_structure(root, &self.bodies, &self.joints)?;
        let (tree_order, parent_joint) = validate::tree_order(root, &self.bodies, &self.joints)?;
        let layout = CoordinateLayout::from_tree_order(&self.joints, &tree_order);

        tracing::debug!(
            mechanism = %self.name,
            bodies = self.bodies.len(),
            joints = self.joints.len(),
            nq = layout.num_positions(),
            nv = layout.num_velocities(),
            "mechanism built"
        );

        Ok(Mechanism {
            name: self.name,
            root,
            bodies: self.bodies,
            joints: self.joints,
            tree_order,
            parent_joint,
            layout,
            environment: Vec::new(),
        })
    }
}
