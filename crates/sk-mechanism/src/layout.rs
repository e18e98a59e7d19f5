//! Coordinate layout for state vectors.
//!
//! Maps each joint to the contiguous slices it occupies in the position
//! vector `q` and the velocity vector `v`. Slices follow the tree order,
//! so the layout changes whenever the description reorders joints; callers
//! must go through this map instead of assuming fixed offsets.

use std::ops::Range;

use sk_core::JointId;

use crate::error::{MechanismError, MechanismResult};
use crate::mechanism::Joint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    q_start: usize,
    nq: usize,
    v_start: usize,
    nv: usize,
}

/// Joint → coordinate range lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateLayout {
    /// Indexed by joint slot; `None` if that ID doesn't exist.
    slots: Vec<Option<Slot>>,
    num_positions: usize,
    num_velocities: usize,
}

impl CoordinateLayout {
    /// Build the layout by walking `joints` in the given tree order.
    pub(crate) fn from_tree_order(joints: &[Joint], order: &[JointId]) -> Self {
        let max_slot = joints.iter().map(|j| j.id.slot()).max().unwrap_or(0);
        let mut slots = vec![None; max_slot + 1];

        let mut q_start = 0;
        let mut v_start = 0;
        for &id in order {
            let joint = &joints[id.slot()];
            let nq = joint.num_positions();
            let nv = joint.num_velocities();
            slots[id.slot()] = Some(Slot {
                q_start,
                nq,
                v_start,
                nv,
            });
            q_start += nq;
            v_start += nv;
        }

        Self {
            slots,
            num_positions: q_start,
            num_velocities: v_start,
        }
    }

    pub fn num_positions(&self) -> usize {
        self.num_positions
    }

    pub fn num_velocities(&self) -> usize {
        self.num_velocities
    }

    /// Position + velocity dimension.
    pub fn state_dim(&self) -> usize {
        self.num_positions + self.num_velocities
    }

    pub fn configuration_range(&self, joint: JointId) -> MechanismResult<Range<usize>> {
        let slot = self.slot(joint)?;
        Ok(slot.q_start..slot.q_start + slot.nq)
    }

    pub fn velocity_range(&self, joint: JointId) -> MechanismResult<Range<usize>> {
        let slot = self.slot(joint)?;
        Ok(slot.v_start..slot.v_start + slot.nv)
    }

    fn slot(&self, joint: JointId) -> MechanismResult<Slot> {
        self.slots
            .get(joint.slot())
            .and_then(|&opt| opt)
            .ok_or(MechanismError::UnknownJoint(joint))
    }
}
