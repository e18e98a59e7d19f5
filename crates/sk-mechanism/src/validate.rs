//! Mechanism validation logic.

use std::collections::{HashSet, VecDeque};

use sk_core::{BodyId, JointId};

use crate::error::{MechanismError, MechanismResult};
use crate::mechanism::{Joint, RigidBody};

/// Validate names and references: unique names, joints point at existing
/// bodies, the root is never a child, and no body has two parents.
pub(crate) fn validate_structure(
    root: BodyId,
    bodies: &[RigidBody],
    joints: &[Joint],
) -> MechanismResult<()> {
    let mut body_names = HashSet::new();
    for body in bodies {
        if !body_names.insert(body.name.as_str()) {
            return Err(MechanismError::DuplicateBody(body.name.clone()));
        }
    }

    let mut joint_names = HashSet::new();
    for joint in joints {
        if !joint_names.insert(joint.name.as_str()) {
            return Err(MechanismError::DuplicateJoint(joint.name.clone()));
        }
    }

    let mut has_parent = vec![false; bodies.len()];
    for joint in joints {
        for body in [joint.parent, joint.child] {
            if body.slot() >= bodies.len() {
                return Err(MechanismError::UnknownBodyRef {
                    joint: joint.name.clone(),
                    body: body.to_string(),
                });
            }
        }

        if joint.child == root {
            return Err(MechanismError::RootAsChild {
                joint: joint.name.clone(),
            });
        }

        let seen = &mut has_parent[joint.child.slot()];
        if *seen {
            return Err(MechanismError::MultipleParents {
                body: bodies[joint.child.slot()].name.clone(),
            });
        }
        *seen = true;
    }

    Ok(())
}

/// Breadth-first walk from the root.
///
/// Returns joints in root-outward order and the parent joint of every body.
/// Fails if any body cannot be reached (missing parent joint or a cycle).
pub(crate) fn tree_order(
    root: BodyId,
    bodies: &[RigidBody],
    joints: &[Joint],
) -> MechanismResult<(Vec<JointId>, Vec<Option<JointId>>)> {
    let mut parent_joint = vec![None; bodies.len()];
    let mut visited = vec![false; bodies.len()];
    let mut order = Vec::with_capacity(joints.len());

    let mut queue = VecDeque::from([root]);
    visited[root.slot()] = true;

    while let Some(body) = queue.pop_front() {
        // Joints are scanned in ID order for determinism
        for joint in joints.iter().filter(|j| j.parent == body) {
            if visited[joint.child.slot()] {
                continue;
            }
            visited[joint.child.slot()] = true;
            parent_joint[joint.child.slot()] = Some(joint.id);
            order.push(joint.id);
            queue.push_back(joint.child);
        }
    }

    if let Some(body) = bodies.iter().find(|b| !visited[b.id.slot()]) {
        return Err(MechanismError::Unreachable {
            body: body.name.clone(),
        });
    }

    Ok((order, parent_joint))
}
