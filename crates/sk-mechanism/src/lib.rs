//! sk-mechanism: kinematic tree layer for stancekit.
//!
//! Provides:
//! - Description schema for the YAML kinematic description
//! - Mechanism data structures (RigidBody, Joint, Mechanism)
//! - Incremental mechanism builder with validation
//! - Coordinate layout for position/velocity vectors
//! - Mechanism state and planar kinematics
//!
//! # Example
//!
//! ```
//! use nalgebra::{Isometry3, Vector3};
//! use sk_mechanism::{JointKind, MechanismBuilder};
//!
//! let mut builder = MechanismBuilder::new("hopper", "world");
//! let world = builder.root();
//! let core = builder.add_body("core");
//! let foot = builder.add_body("foot");
//! builder.add_joint("floating_base", JointKind::Planar, world, core, Isometry3::identity());
//! builder.add_joint(
//!     "leg",
//!     JointKind::prismatic(-Vector3::z()).unwrap(),
//!     core,
//!     foot,
//!     Isometry3::identity(),
//! );
//! let mechanism = builder.build().unwrap();
//!
//! assert_eq!(mechanism.num_positions(), 4);
//! assert_eq!(mechanism.bodies().len(), 3);
//! ```

pub mod builder;
pub mod description;
pub mod error;
pub mod kinematics;
pub mod layout;
pub mod mechanism;
pub mod state;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::MechanismBuilder;
pub use description::{ContactDef, Description, JointDef, JointType, ObstacleDef};
pub use error::{MechanismError, MechanismResult};
pub use kinematics::Kinematics;
pub use layout::CoordinateLayout;
pub use mechanism::{HalfSpace, Joint, JointKind, Mechanism, RigidBody};
pub use state::MechanismState;
