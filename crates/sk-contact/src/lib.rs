//! sk-contact: contact environment and compliant contact laws.
//!
//! Provides:
//! - World-frame half-space contact surfaces built once at a reference pose
//! - Allow-list filtering of (end-effector body, obstacle) pairs
//! - Hunt–Crossley normal and viscoelastic Coulomb tangential force laws
//! - Assignment of one compliant contact point per end-effector body
//!
//! Geometry is evaluated at construction time only. Callers that change the
//! description or the reference pose must rebuild the environment.

pub mod environment;
pub mod error;
pub mod force;
pub mod points;

// Re-exports
pub use environment::{
    AllowList, ContactEnvironment, ContactEnvironmentBuilder, ContactPair, ContactPlane,
    ContactSurface,
};
pub use error::{ContactError, ContactResult};
pub use force::{
    HuntCrossley, NormalForceModel, SoftContactModel, TangentialForceModel, TangentialResponse,
    ViscoelasticCoulomb,
};
pub use points::{ContactForceModelAssigner, ContactPoint, ContactPoints};
