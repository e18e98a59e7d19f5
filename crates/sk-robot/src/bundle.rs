//! The bundle handed to the MPC engine.

use std::path::{Path, PathBuf};

use nalgebra::{DVector, Point3};
use serde::Serialize;
use sk_contact::{ContactEnvironment, ContactEnvironmentBuilder};
use sk_core::{BodyId, Bounds, Side, Sided};
use sk_lqr::{Linearizer, LqrSolution, TerminalValueBuilder};
use sk_mechanism::{Kinematics, Mechanism, MechanismState};

use crate::config::{MpcParams, RobotConfig};
use crate::cost::{CostMatrices, JointWeights};
use crate::error::{RobotError, RobotResult};
use crate::model::RobotModel;
use crate::nominal::nominal_state;

/// Read-only view an MPC engine needs each control cycle.
pub trait ControlModel {
    fn mechanism(&self) -> &Mechanism;

    fn environment(&self) -> &ContactEnvironment;

    fn nominal_state(&self) -> &MechanismState;

    fn cost(&self) -> &CostMatrices;

    fn description_path(&self) -> &Path;
}

/// A foot (or other body) position carried with the LQR solution.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePoint {
    pub side: Side,
    pub body: BodyId,
    /// World position at the nominal state.
    pub position: Point3<f64>,
}

/// Everything built at initialization, immutable afterwards.
#[derive(Debug, Clone)]
pub struct MpcBundle {
    model: RobotModel,
    environment: ContactEnvironment,
    nominal: MechanismState,
    cost: CostMatrices,
    lqr: LqrSolution<ReferencePoint>,
    mpc: MpcParams,
}

impl MpcBundle {
    /// Evaluate contact geometry, cost and terminal value for `model`.
    ///
    /// Contact surfaces are registered on the model's mechanism at the nominal
    /// state. Building again from the same model requires a fresh model.
    pub fn build<L>(mut model: RobotModel, config: &RobotConfig, linearizer: &L) -> RobotResult<Self>
    where
        L: Linearizer + ?Sized,
    {
        config.validate()?;

        let nominal = nominal_state(&model, &config.nominal)?;

        let environment = ContactEnvironmentBuilder::new(&model.description)
            .with_plane(config.contact.plane)
            .with_scale(config.contact.scale)
            .build(&mut model.mechanism, &nominal, &config.contact.allow)?;
        check_contact_locations(&model, &environment)?;

        let cost = CostMatrices::build(&model.mechanism, &config.cost)?;

        let kinematics = Kinematics::new(&model.mechanism, &nominal)?;
        let reference_points = model
            .feet
            .iter()
            .map(|(side, body)| -> RobotResult<ReferencePoint> {
                Ok(ReferencePoint {
                    side,
                    body: *body,
                    position: kinematics.point_to_world(*body, &config.contact.location())?,
                })
            })
            .collect::<RobotResult<Vec<_>>>()?;

        let mut terminal = TerminalValueBuilder::new(config.mpc.dt)?.with_riccati(config.lqr.riccati);
        if config.lqr.horizontal_invariance {
            let horizontal = model.mechanism.configuration_range(model.floating_base)?.start;
            terminal = terminal.with_invariant_coordinate(horizontal);
        }

        let x0 = nominal.to_vector();
        let u0 = DVector::zeros(model.mechanism.num_velocities());
        let lqr = terminal.build(linearizer, &x0, &u0, &cost.q, &cost.r, reference_points)?;

        tracing::info!(
            robot = model.mechanism.name(),
            surfaces = environment.surfaces().len(),
            pairs = environment.pairs().len(),
            contact_points = model.contact_points.len(),
            "MPC bundle built"
        );

        Ok(Self {
            model,
            environment,
            nominal,
            cost,
            lqr,
            mpc: config.mpc,
        })
    }

    pub fn model(&self) -> &RobotModel {
        &self.model
    }

    pub fn lqr(&self) -> &LqrSolution<ReferencePoint> {
        &self.lqr
    }

    pub fn mpc_params(&self) -> &MpcParams {
        &self.mpc
    }

    pub fn summary(&self) -> RobotResult<BundleSummary> {
        let mechanism = self.mechanism();
        let body_name = |id: BodyId| {
            mechanism
                .body(id)
                .map(|b| b.name.clone())
                .unwrap_or_else(|| id.to_string())
        };

        let base = mechanism.joint(self.model.floating_base());
        Ok(BundleSummary {
            name: mechanism.name().to_string(),
            description_path: self.description_path().to_path_buf(),
            num_positions: mechanism.num_positions(),
            num_velocities: mechanism.num_velocities(),
            floating_base: FloatingBaseSummary {
                joint: base.map(|j| j.name.clone()).unwrap_or_default(),
                position_bounds: base.map(|j| j.position_bounds().to_vec()).unwrap_or_default(),
                velocity_bounds: base.map(|j| j.velocity_bounds().to_vec()).unwrap_or_default(),
                effort_bounds: base.map(|j| j.effort_bounds().to_vec()).unwrap_or_default(),
            },
            feet: self.model.feet().map(|_, b| body_name(b)),
            hands: self.model.hands().map(|_, b| body_name(b)),
            surfaces: self
                .environment
                .surfaces()
                .iter()
                .map(|s| SurfaceSummary {
                    name: s.name.clone(),
                    point: s.half_space.point.coords.into(),
                    normal: s.half_space.outward_normal.into_inner().into(),
                    friction: s.friction,
                })
                .collect(),
            pairs: self
                .environment
                .pairs()
                .iter()
                .map(|p| PairSummary {
                    body: p.body_name.clone(),
                    obstacle: p.obstacle_name.clone(),
                })
                .collect(),
            contact_points: self
                .model
                .contact_points()
                .iter()
                .map(|p| body_name(p.body))
                .collect(),
            nominal_q: self.nominal.q().iter().copied().collect(),
            weights: self.cost.per_joint(mechanism)?,
            r_diagonal: self.cost.r.diagonal().iter().copied().collect(),
            lqr: LqrSummary {
                dt: self.lqr.dt,
                invariant_coordinate: self.lqr.invariant_coordinate,
                s_diagonal: self.lqr.s.diagonal().iter().copied().collect(),
                gain_shape: self.lqr.k.shape(),
                reference_points: self
                    .lqr
                    .reference_points
                    .iter()
                    .map(|p| (p.side, p.position.coords.into()))
                    .collect(),
            },
            mpc: self.mpc,
        })
    }
}

/// Every admissible pair on a body with an assigned contact point must sit at
/// that point's location.
fn check_contact_locations(
    model: &RobotModel,
    environment: &ContactEnvironment,
) -> RobotResult<()> {
    const TOLERANCE: f64 = 1e-9;
    for pair in environment.pairs() {
        for assigned in model.contact_points.for_body(pair.body) {
            if (assigned.location - pair.point).norm() > TOLERANCE {
                return Err(RobotError::ContactLocationMismatch {
                    body: pair.body_name.clone(),
                    obstacle: pair.obstacle_name.clone(),
                    pair_point: pair.point.coords.into(),
                    assigned: assigned.location.coords.into(),
                });
            }
        }
    }
    Ok(())
}

impl ControlModel for MpcBundle {
    fn mechanism(&self) -> &Mechanism {
        self.model.mechanism()
    }

    fn environment(&self) -> &ContactEnvironment {
        &self.environment
    }

    fn nominal_state(&self) -> &MechanismState {
        &self.nominal
    }

    fn cost(&self) -> &CostMatrices {
        &self.cost
    }

    fn description_path(&self) -> &Path {
        self.model.description_path()
    }
}

/// Serializable overview of a built bundle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BundleSummary {
    pub name: String,
    pub description_path: PathBuf,
    pub num_positions: usize,
    pub num_velocities: usize,
    pub floating_base: FloatingBaseSummary,
    pub feet: Sided<String>,
    pub hands: Sided<String>,
    pub surfaces: Vec<SurfaceSummary>,
    pub pairs: Vec<PairSummary>,
    pub contact_points: Vec<String>,
    pub nominal_q: Vec<f64>,
    pub weights: Vec<JointWeights>,
    pub r_diagonal: Vec<f64>,
    pub lqr: LqrSummary,
    pub mpc: MpcParams,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloatingBaseSummary {
    pub joint: String,
    pub position_bounds: Vec<Bounds>,
    pub velocity_bounds: Vec<Bounds>,
    pub effort_bounds: Vec<Bounds>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceSummary {
    pub name: String,
    pub point: [f64; 3],
    pub normal: [f64; 3],
    pub friction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairSummary {
    pub body: String,
    pub obstacle: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LqrSummary {
    pub dt: f64,
    pub invariant_coordinate: Option<usize>,
    pub s_diagonal: Vec<f64>,
    pub gain_shape: (usize, usize),
    pub reference_points: Vec<(Side, [f64; 3])>,
}
