//! Linear models of discrete dynamics around an operating point.

use nalgebra::{DMatrix, DVector};
use sk_core::ensure_positive;

use crate::error::{LqrResult, expect_shape};
use crate::jacobian::{DifferenceScheme, difference_jacobian};

/// Discrete linear model `x⁺ = A·x + B·u` (deviations from the operating point).
#[derive(Debug, Clone, PartialEq)]
pub struct Linearization {
    pub a: DMatrix<f64>,
    pub b: DMatrix<f64>,
}

impl Linearization {
    pub fn new(a: DMatrix<f64>, b: DMatrix<f64>) -> LqrResult<Self> {
        let n = a.nrows();
        expect_shape("A", (n, n), a.shape())?;
        expect_shape("B", (n, b.ncols()), b.shape())?;
        Ok(Self { a, b })
    }

    pub fn state_dim(&self) -> usize {
        self.a.nrows()
    }

    pub fn input_dim(&self) -> usize {
        self.b.ncols()
    }
}

/// Source of `(A, B)` at an operating point `(x0, u0)` for timestep `dt`.
///
/// Implemented by whatever owns the dynamics; this crate only consumes it.
pub trait Linearizer {
    fn linearize(&self, x0: &DVector<f64>, u0: &DVector<f64>, dt: f64) -> LqrResult<Linearization>;
}

/// A precomputed linearization, valid for the dimensions it was built with.
impl Linearizer for Linearization {
    fn linearize(&self, x0: &DVector<f64>, u0: &DVector<f64>, _dt: f64) -> LqrResult<Linearization> {
        expect_shape("x0", (self.state_dim(), 1), x0.shape())?;
        expect_shape("u0", (self.input_dim(), 1), u0.shape())?;
        Ok(self.clone())
    }
}

/// Fully actuated double integrator over `[q; v]` with one input per velocity.
///
/// `q⁺ = q + dt·v + dt²/2·u`, `v⁺ = v + dt·u`. A stand-in for the contact
/// dynamics linearization when only the cost structure is of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleIntegratorProxy {
    pub positions: usize,
}

impl Linearizer for DoubleIntegratorProxy {
    fn linearize(&self, x0: &DVector<f64>, u0: &DVector<f64>, dt: f64) -> LqrResult<Linearization> {
        ensure_positive(dt, "timestep")?;
        let n = self.positions;
        expect_shape("x0", (2 * n, 1), x0.shape())?;
        expect_shape("u0", (n, 1), u0.shape())?;

        let eye = DMatrix::<f64>::identity(n, n);
        let mut a = DMatrix::identity(2 * n, 2 * n);
        a.view_mut((0, n), (n, n)).copy_from(&(&eye * dt));

        let mut b = DMatrix::zeros(2 * n, n);
        b.view_mut((0, 0), (n, n)).copy_from(&(&eye * (0.5 * dt * dt)));
        b.view_mut((n, 0), (n, n)).copy_from(&(&eye * dt));

        Ok(Linearization { a, b })
    }
}

/// One step of a discrete-time system.
pub trait DiscreteDynamics {
    fn state_dim(&self) -> usize;

    fn input_dim(&self) -> usize;

    fn step(&self, x: &DVector<f64>, u: &DVector<f64>, dt: f64) -> LqrResult<DVector<f64>>;
}

/// Linearizes any [`DiscreteDynamics`] by finite differences.
#[derive(Debug, Clone)]
pub struct FiniteDifferenceLinearizer<D> {
    dynamics: D,
    epsilon: f64,
    scheme: DifferenceScheme,
}

impl<D: DiscreteDynamics> FiniteDifferenceLinearizer<D> {
    pub fn new(dynamics: D) -> Self {
        Self {
            dynamics,
            epsilon: 1e-6,
            scheme: DifferenceScheme::default(),
        }
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_scheme(mut self, scheme: DifferenceScheme) -> Self {
        self.scheme = scheme;
        self
    }
}

impl<D: DiscreteDynamics> Linearizer for FiniteDifferenceLinearizer<D> {
    /// A state Jacobian that is not square means `step` returned the wrong
    /// number of states.
    fn linearize(&self, x0: &DVector<f64>, u0: &DVector<f64>, dt: f64) -> LqrResult<Linearization> {
        ensure_positive(dt, "timestep")?;
        expect_shape("x0", (self.dynamics.state_dim(), 1), x0.shape())?;
        expect_shape("u0", (self.dynamics.input_dim(), 1), u0.shape())?;

        let a = difference_jacobian(
            x0,
            |x| self.dynamics.step(x, u0, dt),
            self.epsilon,
            self.scheme,
        )?;
        let b = difference_jacobian(
            u0,
            |u| self.dynamics.step(x0, u, dt),
            self.epsilon,
            self.scheme,
        )?;
        Linearization::new(a, b)
    }
}
