//! Error types for contact construction.

use sk_core::SkError;
use sk_mechanism::MechanismError;
use thiserror::Error;

/// Errors raised while building the contact environment or contact points.
#[derive(Error, Debug)]
pub enum ContactError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Obstacle not found: {0}")]
    ObstacleNotFound(String),

    #[error("Allow-list names unknown body: {0}")]
    UnknownAllowedBody(String),

    #[error("Mechanism error: {0}")]
    Mechanism(#[from] MechanismError),

    #[error(transparent)]
    Core(#[from] SkError),
}

pub type ContactResult<T> = Result<T, ContactError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ContactError::NonPhysical { what: "stiffness" };
        assert!(err.to_string().contains("stiffness"));
    }

    #[test]
    fn error_conversion() {
        let err: ContactError = MechanismError::BodyNotFound("l_hand".into()).into();
        assert!(matches!(err, ContactError::Mechanism(_)));
        assert!(err.to_string().contains("l_hand"));
    }
}
