//! ModelBuilder: description → mechanism with named limb handles.

use std::path::{Path, PathBuf};

use sk_contact::{ContactForceModelAssigner, ContactPoints};
use sk_core::{BodyId, Bounds, JointId, Sided};
use sk_mechanism::{Description, Mechanism};

use crate::config::RobotConfig;
use crate::error::{RobotError, RobotResult};

/// A loaded robot: mechanism, description, and resolved handles.
#[derive(Debug, Clone)]
pub struct RobotModel {
    pub(crate) mechanism: Mechanism,
    pub(crate) description: Description,
    pub(crate) description_path: PathBuf,
    pub(crate) floating_base: JointId,
    pub(crate) feet: Sided<BodyId>,
    pub(crate) hands: Sided<BodyId>,
    pub(crate) leg_extension: Sided<JointId>,
    pub(crate) hand_rotation: Sided<JointId>,
    pub(crate) hand_extension: Sided<JointId>,
    pub(crate) contact_points: ContactPoints,
}

impl RobotModel {
    pub fn mechanism(&self) -> &Mechanism {
        &self.mechanism
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn description_path(&self) -> &Path {
        &self.description_path
    }

    pub fn floating_base(&self) -> JointId {
        self.floating_base
    }

    pub fn feet(&self) -> Sided<BodyId> {
        self.feet
    }

    pub fn hands(&self) -> Sided<BodyId> {
        self.hands
    }

    pub fn leg_extension(&self) -> Sided<JointId> {
        self.leg_extension
    }

    pub fn hand_rotation(&self) -> Sided<JointId> {
        self.hand_rotation
    }

    pub fn hand_extension(&self) -> Sided<JointId> {
        self.hand_extension
    }

    pub fn contact_points(&self) -> &ContactPoints {
        &self.contact_points
    }
}

/// Loads a description and prepares it for control.
///
/// Building never partially succeeds: a missing joint or body named in the
/// configuration aborts with [`RobotError::MissingJoint`] or
/// [`RobotError::MissingBody`].
#[derive(Debug, Clone)]
pub struct ModelBuilder<'a> {
    config: &'a RobotConfig,
    with_contacts: bool,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(config: &'a RobotConfig) -> Self {
        Self {
            config,
            with_contacts: true,
        }
    }

    /// Whether to attach compliant contact points to the configured bodies.
    pub fn with_contacts(mut self, attach: bool) -> Self {
        self.with_contacts = attach;
        self
    }

    pub fn build(&self, path: &Path) -> RobotResult<RobotModel> {
        let description = Description::load_yaml(path)?;
        self.build_from_description(description, path)
    }

    /// Same as [`build`](Self::build) for an already parsed description.
    /// `path` is recorded, not read.
    pub fn build_from_description(
        &self,
        description: Description,
        path: &Path,
    ) -> RobotResult<RobotModel> {
        let mut mechanism = description.build_mechanism()?;
        let limbs = &self.config.limbs;

        let floating_base = joint_id(&mechanism, &self.config.floating_base.joint)?;
        let feet = limbs.feet.as_ref().try_map(|_, name| body_id(&mechanism, name))?;
        let hands = limbs.hands.as_ref().try_map(|_, name| body_id(&mechanism, name))?;
        let leg_extension = limbs
            .leg_extension
            .as_ref()
            .try_map(|_, name| joint_id(&mechanism, name))?;
        let hand_rotation = limbs
            .hand_rotation
            .as_ref()
            .try_map(|_, name| joint_id(&mechanism, name))?;
        let hand_extension = limbs
            .hand_extension
            .as_ref()
            .try_map(|_, name| joint_id(&mechanism, name))?;

        // The base moves only through contact forces
        let base = &self.config.floating_base;
        mechanism
            .joint_mut(floating_base)
            .ok_or_else(|| RobotError::MissingJoint(base.joint.clone()))?
            .set_uniform_bounds(
                Bounds::symmetric(base.position_limit),
                Bounds::symmetric(base.velocity_limit),
                Bounds::zero(),
            );

        let mut contact_points = ContactPoints::new();
        if self.with_contacts {
            let contact = &self.config.contact;
            ContactForceModelAssigner::new(contact.soft_contact_model()?)
                .with_location(contact.location())
                .assign(&mechanism, &mut contact_points, &contact.bodies)?;
        }

        tracing::info!(
            robot = mechanism.name(),
            positions = mechanism.num_positions(),
            velocities = mechanism.num_velocities(),
            contact_points = contact_points.len(),
            "Robot model built"
        );

        Ok(RobotModel {
            mechanism,
            description,
            description_path: path.to_path_buf(),
            floating_base,
            feet,
            hands,
            leg_extension,
            hand_rotation,
            hand_extension,
            contact_points,
        })
    }
}

fn joint_id(mechanism: &Mechanism, name: &str) -> RobotResult<JointId> {
    mechanism
        .find_joint(name)
        .map(|j| j.id)
        .map_err(|_| RobotError::MissingJoint(name.to_string()))
}

fn body_id(mechanism: &Mechanism, name: &str) -> RobotResult<BodyId> {
    mechanism
        .find_body(name)
        .map(|b| b.id)
        .map_err(|_| RobotError::MissingBody(name.to_string()))
}
