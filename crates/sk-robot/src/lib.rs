//! Robot-level model construction for a contact-rich MPC.
//!
//! This crate ties the lower layers together into the bundle an MPC engine
//! consumes once at initialization:
//!
//! 1. [`ModelBuilder`] loads the description, fixes the floating base bounds
//!    and resolves the left/right end-effector handles.
//! 2. [`nominal_state`] produces the equilibrium pose.
//! 3. The contact environment is evaluated at that pose.
//! 4. [`CostMatrices`] places running-cost weights by coordinate layout.
//! 5. The LQR terminal value closes the horizon.
//!
//! [`MpcBundle`] runs steps 2 to 5 on a built [`RobotModel`].

pub mod bundle;
pub mod config;
pub mod cost;
pub mod error;
pub mod model;
pub mod nominal;

pub use bundle::{BundleSummary, ControlModel, MpcBundle, ReferencePoint};
pub use config::{
    ContactConfig, CostConfig, FloatingBaseConfig, LimbConfig, LqrConfig, MpcParams,
    NominalConfig, RobotConfig,
};
pub use cost::CostMatrices;
pub use error::{RobotError, RobotResult};
pub use model::{ModelBuilder, RobotModel};
pub use nominal::nominal_state;
