//! Quadratic running-cost weights.

use std::collections::BTreeMap;
use std::ops::Range;

use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use sk_core::JointId;
use sk_mechanism::{Mechanism, MechanismResult};

use crate::config::CostConfig;
use crate::error::{RobotError, RobotResult};

/// Diagonal state and control weights.
///
/// `q` is `(nq + nv) × (nq + nv)` over `[q; v]`, `r` is `nv × nv`.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrices {
    pub q: DMatrix<f64>,
    pub r: DMatrix<f64>,
}

/// One joint's slice of the state weights.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JointWeights {
    pub joint: String,
    pub position: Vec<f64>,
    pub velocity: Vec<f64>,
}

impl CostMatrices {
    /// Place each configured joint's weights at the coordinates the mechanism
    /// reports for it.
    pub fn build(mechanism: &Mechanism, config: &CostConfig) -> RobotResult<Self> {
        config.validate()?;
        let nq = mechanism.num_positions();
        let nv = mechanism.num_velocities();

        let positions = weight_vector(
            mechanism,
            nq,
            config.default_position,
            &config.position,
            Mechanism::configuration_range,
        )?;
        let velocities = weight_vector(
            mechanism,
            nv,
            config.default_velocity,
            &config.velocity,
            Mechanism::velocity_range,
        )?;

        let mut diagonal = DVector::zeros(nq + nv);
        diagonal.rows_mut(0, nq).copy_from(&positions);
        diagonal.rows_mut(nq, nv).copy_from(&velocities);

        tracing::debug!(nq, nv, r = config.r, "Cost matrices assembled");

        Ok(Self {
            q: DMatrix::from_diagonal(&diagonal),
            r: DMatrix::from_diagonal_element(nv, nv, config.r),
        })
    }

    /// Both matrices diagonal with strictly positive diagonals.
    pub fn is_positive_diagonal(&self) -> bool {
        positive_diagonal(&self.q) && positive_diagonal(&self.r)
    }

    pub fn per_joint(&self, mechanism: &Mechanism) -> RobotResult<Vec<JointWeights>> {
        let nq = mechanism.num_positions();
        let q = self.q.diagonal();
        mechanism
            .tree_joints()
            .map(|joint| -> RobotResult<JointWeights> {
                let pos = mechanism.configuration_range(joint.id)?;
                let vel = mechanism.velocity_range(joint.id)?;
                Ok(JointWeights {
                    joint: joint.name.clone(),
                    position: q.as_slice()[pos].to_vec(),
                    velocity: q.as_slice()[nq + vel.start..nq + vel.end].to_vec(),
                })
            })
            .collect()
    }
}

fn weight_vector<F>(
    mechanism: &Mechanism,
    dim: usize,
    default: f64,
    weights: &BTreeMap<String, Vec<f64>>,
    range_of: F,
) -> RobotResult<DVector<f64>>
where
    F: Fn(&Mechanism, JointId) -> MechanismResult<Range<usize>>,
{
    let mut out = DVector::from_element(dim, default);
    for (name, values) in weights {
        let joint = mechanism
            .find_joint(name)
            .map_err(|_| RobotError::MissingJoint(name.clone()))?;
        let range = range_of(mechanism, joint.id)?;
        if range.len() != values.len() {
            return Err(RobotError::WeightCount {
                joint: name.clone(),
                expected: range.len(),
                actual: values.len(),
            });
        }
        out.as_mut_slice()[range].copy_from_slice(values);
    }
    Ok(out)
}

fn positive_diagonal(m: &DMatrix<f64>) -> bool {
    m.is_square()
        && m.row_iter().enumerate().all(|(i, row)| {
            row.iter()
                .enumerate()
                .all(|(j, v)| if i == j { *v > 0.0 } else { *v == 0.0 })
        })
}
