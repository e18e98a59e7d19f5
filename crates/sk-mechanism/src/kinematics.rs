//! Forward kinematics over the mechanism tree.

use nalgebra::{Isometry3, Point3, Unit, Vector3};
use sk_core::BodyId;

use crate::error::{MechanismError, MechanismResult};
use crate::mechanism::Mechanism;
use crate::state::MechanismState;

/// World poses of every body at one mechanism state.
///
/// Poses are computed once in [`Kinematics::new`]; the struct is a
/// snapshot and does not follow later state changes.
#[derive(Debug, Clone)]
pub struct Kinematics {
    /// Indexed by body slot.
    poses: Vec<Isometry3<f64>>,
}

impl Kinematics {
    pub fn new(mechanism: &Mechanism, state: &MechanismState) -> MechanismResult<Self> {
        if state.q().len() != mechanism.num_positions() {
            return Err(MechanismError::StateDimension {
                what: "q",
                expected: mechanism.num_positions(),
                actual: state.q().len(),
            });
        }

        let mut poses = vec![Isometry3::identity(); mechanism.bodies().len()];
        for joint in mechanism.tree_joints() {
            let q = state.configuration(mechanism, joint.id)?;
            let parent = poses[joint.parent.slot()];
            poses[joint.child.slot()] = parent * joint.origin * joint.kind.transform(q);
        }

        Ok(Self { poses })
    }

    pub fn pose(&self, body: BodyId) -> MechanismResult<&Isometry3<f64>> {
        self.poses
            .get(body.slot())
            .ok_or_else(|| MechanismError::BodyNotFound(body.to_string()))
    }

    /// Map a point from `body`'s frame into the world frame.
    pub fn point_to_world(&self, body: BodyId, local: &Point3<f64>) -> MechanismResult<Point3<f64>> {
        Ok(self.pose(body)? * local)
    }

    /// Rotate a direction from `body`'s frame into the world frame.
    pub fn normal_to_world(
        &self,
        body: BodyId,
        local: &Unit<Vector3<f64>>,
    ) -> MechanismResult<Unit<Vector3<f64>>> {
        Ok(self.pose(body)?.rotation * *local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MechanismBuilder;
    use crate::mechanism::JointKind;
    use nalgebra::{Translation3, UnitQuaternion};
    use std::f64::consts::FRAC_PI_2;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn leg_tip_in_world() {
        let mut builder = MechanismBuilder::new("hopper", "world");
        let world = builder.root();
        let core = builder.add_body("core");
        let foot = builder.add_body("foot");
        let base = builder.add_joint("base", JointKind::Planar, world, core, Isometry3::identity());
        let hip = Isometry3::from_parts(Translation3::new(0.1, 0.0, 0.0), UnitQuaternion::identity());
        let leg = builder.add_joint("leg", JointKind::prismatic(-Vector3::z()).unwrap(), core, foot, hip);
        let mechanism = builder.build().unwrap();

        let mut state = MechanismState::zero(&mechanism);
        state.set_configuration(&mechanism, base, &[0.5, 1.0, 0.0]).unwrap();
        state.set_configuration(&mechanism, leg, &[0.8]).unwrap();

        let kin = Kinematics::new(&mechanism, &state).unwrap();
        let tip = kin.point_to_world(foot, &Point3::origin()).unwrap();
        assert!(close(tip.x, 0.6));
        assert!(close(tip.z, 0.2));

        // Pitch the base: leg now points along -x
        state.set_configuration(&mechanism, base, &[0.0, 1.0, FRAC_PI_2]).unwrap();
        let kin = Kinematics::new(&mechanism, &state).unwrap();
        let tip = kin.point_to_world(foot, &Point3::origin()).unwrap();
        assert!(close(tip.x, -0.8), "x = {}", tip.x);
        assert!(close(tip.z, 1.0 - 0.1), "z = {}", tip.z);

        let n = kin.normal_to_world(foot, &Vector3::z_axis()).unwrap();
        assert!(close(n.x, 1.0));
    }
}
