//! Joint-space state of a mechanism.

use nalgebra::DVector;
use sk_core::JointId;

use crate::error::{MechanismError, MechanismResult};
use crate::mechanism::Mechanism;

/// Position and velocity vectors laid out by the mechanism's
/// [`CoordinateLayout`](crate::CoordinateLayout).
#[derive(Debug, Clone, PartialEq)]
pub struct MechanismState {
    q: DVector<f64>,
    v: DVector<f64>,
}

impl MechanismState {
    /// All coordinates zero.
    pub fn zero(mechanism: &Mechanism) -> Self {
        Self {
            q: DVector::zeros(mechanism.num_positions()),
            v: DVector::zeros(mechanism.num_velocities()),
        }
    }

    pub fn from_vectors(
        mechanism: &Mechanism,
        q: DVector<f64>,
        v: DVector<f64>,
    ) -> MechanismResult<Self> {
        check_len("q", mechanism.num_positions(), q.len())?;
        check_len("v", mechanism.num_velocities(), v.len())?;
        Ok(Self { q, v })
    }

    pub fn q(&self) -> &DVector<f64> {
        &self.q
    }

    pub fn v(&self) -> &DVector<f64> {
        &self.v
    }

    pub fn configuration(&self, mechanism: &Mechanism, joint: JointId) -> MechanismResult<&[f64]> {
        let range = mechanism.configuration_range(joint)?;
        Ok(&self.q.as_slice()[range])
    }

    pub fn velocity(&self, mechanism: &Mechanism, joint: JointId) -> MechanismResult<&[f64]> {
        let range = mechanism.velocity_range(joint)?;
        Ok(&self.v.as_slice()[range])
    }

    pub fn set_configuration(
        &mut self,
        mechanism: &Mechanism,
        joint: JointId,
        values: &[f64],
    ) -> MechanismResult<()> {
        let range = mechanism.configuration_range(joint)?;
        check_joint_len(mechanism, joint, range.len(), values.len())?;
        self.q.as_mut_slice()[range].copy_from_slice(values);
        Ok(())
    }

    pub fn set_velocity(
        &mut self,
        mechanism: &Mechanism,
        joint: JointId,
        values: &[f64],
    ) -> MechanismResult<()> {
        let range = mechanism.velocity_range(joint)?;
        check_joint_len(mechanism, joint, range.len(), values.len())?;
        self.v.as_mut_slice()[range].copy_from_slice(values);
        Ok(())
    }

    /// Stacked `[q; v]`.
    pub fn to_vector(&self) -> DVector<f64> {
        let mut x = DVector::zeros(self.q.len() + self.v.len());
        x.rows_mut(0, self.q.len()).copy_from(&self.q);
        x.rows_mut(self.q.len(), self.v.len()).copy_from(&self.v);
        x
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> MechanismResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(MechanismError::StateDimension {
            what,
            expected,
            actual,
        })
    }
}

fn check_joint_len(
    mechanism: &Mechanism,
    joint: JointId,
    expected: usize,
    actual: usize,
) -> MechanismResult<()> {
    if expected == actual {
        return Ok(());
    }
    let name = mechanism
        .joint(joint)
        .map_or_else(|| joint.to_string(), |j| j.name.clone());
    Err(MechanismError::CoordinateCount {
        joint: name,
        expected,
        actual,
    })
}
