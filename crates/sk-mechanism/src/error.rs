//! Mechanism-specific error types.

use std::path::PathBuf;

use sk_core::{JointId, SkError};
use thiserror::Error;

/// Description loading, mechanism construction and lookup errors.
#[derive(Error, Debug)]
pub enum MechanismError {
    #[error("Failed to read description {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Description YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Body not found: {0}")]
    BodyNotFound(String),

    #[error("Joint not found: {0}")]
    JointNotFound(String),

    #[error("Duplicate body name: {0}")]
    DuplicateBody(String),

    #[error("Duplicate joint name: {0}")]
    DuplicateJoint(String),

    #[error("Obstacle not found: {0}")]
    ObstacleNotFound(String),

    #[error("Duplicate obstacle name: {0}")]
    DuplicateObstacle(String),

    /// A joint refers to a body that doesn't exist.
    #[error("Joint {joint} refers to unknown body {body}")]
    UnknownBodyRef { joint: String, body: String },

    #[error("Joint {joint} has the root body as its child")]
    RootAsChild { joint: String },

    #[error("Body {body} is the child of more than one joint")]
    MultipleParents { body: String },

    #[error("Body {body} is not reachable from the root")]
    Unreachable { body: String },

    #[error("Joint {joint} needs a non-zero axis")]
    InvalidAxis { joint: String },

    #[error("Joint {joint} expects {expected} coordinates, got {actual}")]
    CoordinateCount {
        joint: String,
        expected: usize,
        actual: usize,
    },

    #[error("Joint {0} is not part of this mechanism")]
    UnknownJoint(JointId),

    #[error("State dimension mismatch: {what} (expected {expected}, got {actual})")]
    StateDimension {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Core(#[from] SkError),
}

pub type MechanismResult<T> = Result<T, MechanismError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_culprit() {
        let e = MechanismError::BodyNotFound("lf".into());
        assert_eq!(e.to_string(), "Body not found: lf");

        let e = MechanismError::CoordinateCount {
            joint: "floating_base".into(),
            expected: 3,
            actual: 2,
        };
        assert!(e.to_string().contains("floating_base"));
    }

    #[test]
    fn io_error_includes_path() {
        let e = MechanismError::Io {
            path: PathBuf::from("/tmp/robot.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(e.to_string().contains("/tmp/robot.yaml"));
    }
}
