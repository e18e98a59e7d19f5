//! Discrete-time LQR for MPC terminal costs.
//!
//! This crate linearizes a discrete dynamics map around an operating point,
//! solves the discrete algebraic Riccati equation for the value matrix `S` and
//! gain `K`, and optionally projects a coordinate out of both so the terminal
//! cost ignores it (e.g. absolute horizontal position).

pub mod error;
pub mod jacobian;
pub mod linearize;
pub mod riccati;
pub mod terminal;

pub use error::{LqrError, LqrResult};
pub use jacobian::{DifferenceScheme, difference_jacobian};
pub use linearize::{
    DiscreteDynamics, DoubleIntegratorProxy, FiniteDifferenceLinearizer, Linearization,
    Linearizer,
};
pub use riccati::{RiccatiConfig, RiccatiMethod, RiccatiSolution, solve_discrete_riccati};
pub use terminal::{LqrSolution, TerminalValueBuilder, project_out_coordinate};
