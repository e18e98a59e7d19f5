//! Error types for robot model construction.

use std::path::PathBuf;

use sk_contact::ContactError;
use sk_core::SkError;
use sk_lqr::LqrError;
use sk_mechanism::MechanismError;

#[derive(Debug, thiserror::Error)]
pub enum RobotError {
    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Required joint '{0}' is missing from the description")]
    MissingJoint(String),

    #[error("Required body '{0}' is missing from the description")]
    MissingBody(String),

    #[error("Joint '{joint}' has {expected} coordinates but {actual} weights were given")]
    WeightCount {
        joint: String,
        expected: usize,
        actual: usize,
    },

    #[error(
        "Contact pair '{body}'/'{obstacle}' sits at {pair_point:?} but the body's contact point is at {assigned:?}"
    )]
    ContactLocationMismatch {
        body: String,
        obstacle: String,
        pair_point: [f64; 3],
        assigned: [f64; 3],
    },

    #[error(transparent)]
    Mechanism(#[from] MechanismError),

    #[error(transparent)]
    Contact(#[from] ContactError),

    #[error(transparent)]
    Lqr(#[from] LqrError),

    #[error(transparent)]
    Core(#[from] SkError),
}

pub type RobotResult<T> = Result<T, RobotError>;
