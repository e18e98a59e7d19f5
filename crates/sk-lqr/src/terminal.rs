//! LQR terminal value for a receding-horizon controller.

use nalgebra::{DMatrix, DVector};
use sk_core::ensure_positive;

use crate::error::{LqrError, LqrResult, expect_shape};
use crate::linearize::Linearizer;
use crate::riccati::{RiccatiConfig, solve_discrete_riccati};

/// Value matrix and feedback gain around an operating point.
///
/// Built once and then only read. `P` is whatever the caller uses to describe
/// reference contact points (the feet, typically); it is carried, not used.
#[derive(Debug, Clone, PartialEq)]
pub struct LqrSolution<P = ()> {
    pub x0: DVector<f64>,
    pub u0: DVector<f64>,
    pub s: DMatrix<f64>,
    pub k: DMatrix<f64>,
    pub q: DMatrix<f64>,
    pub r: DMatrix<f64>,
    pub dt: f64,
    pub reference_points: Vec<P>,
    /// State coordinate projected out of `S` and `K`, if any.
    pub invariant_coordinate: Option<usize>,
}

impl<P> LqrSolution<P> {
    pub fn state_dim(&self) -> usize {
        self.s.nrows()
    }

    pub fn input_dim(&self) -> usize {
        self.k.nrows()
    }

    /// `u = u0 − K(x − x0)`.
    pub fn feedback(&self, x: &DVector<f64>) -> LqrResult<DVector<f64>> {
        expect_shape("x", (self.state_dim(), 1), x.shape())?;
        Ok(&self.u0 - &self.k * (x - &self.x0))
    }

    /// `(x − x0)ᵀ S (x − x0)`.
    pub fn terminal_cost(&self, x: &DVector<f64>) -> LqrResult<f64> {
        expect_shape("x", (self.state_dim(), 1), x.shape())?;
        let dx = x - &self.x0;
        Ok(dx.dot(&(&self.s * &dx)))
    }
}

/// Zero row and column `index` of `s` and column `index` of `k`.
pub fn project_out_coordinate(s: &mut DMatrix<f64>, k: &mut DMatrix<f64>, index: usize) -> LqrResult<()> {
    let dim = s.nrows();
    if index >= dim || index >= s.ncols() || index >= k.ncols() {
        return Err(LqrError::CoordinateOutOfRange { index, dim });
    }
    s.row_mut(index).fill(0.0);
    s.column_mut(index).fill(0.0);
    k.column_mut(index).fill(0.0);
    Ok(())
}

/// Linearize, solve the Riccati equation, then optionally project out one
/// coordinate.
#[derive(Debug, Clone)]
pub struct TerminalValueBuilder {
    dt: f64,
    horizontal_coordinate: Option<usize>,
    riccati: RiccatiConfig,
}

impl TerminalValueBuilder {
    pub fn new(dt: f64) -> LqrResult<Self> {
        Ok(Self {
            dt: ensure_positive(dt, "LQR timestep")?,
            horizontal_coordinate: None,
            riccati: RiccatiConfig::default(),
        })
    }

    /// Make the terminal cost and feedback law blind to state coordinate `index`.
    pub fn with_invariant_coordinate(mut self, index: usize) -> Self {
        self.horizontal_coordinate = Some(index);
        self
    }

    pub fn with_riccati(mut self, config: RiccatiConfig) -> Self {
        self.riccati = config;
        self
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn build<L, P>(
        &self,
        linearizer: &L,
        x0: &DVector<f64>,
        u0: &DVector<f64>,
        q: &DMatrix<f64>,
        r: &DMatrix<f64>,
        reference_points: Vec<P>,
    ) -> LqrResult<LqrSolution<P>>
    where
        L: Linearizer + ?Sized,
    {
        let lin = linearizer.linearize(x0, u0, self.dt)?;
        expect_shape("A", (x0.len(), x0.len()), lin.a.shape())?;
        expect_shape("B", (x0.len(), u0.len()), lin.b.shape())?;

        let solution = solve_discrete_riccati(&lin.a, &lin.b, q, r, &self.riccati)?;
        let mut s = solution.s;
        let mut k = solution.k;

        if let Some(index) = self.horizontal_coordinate {
            project_out_coordinate(&mut s, &mut k, index)?;
            tracing::debug!(index, "Projected coordinate out of terminal value");
        }

        tracing::info!(
            state_dim = x0.len(),
            input_dim = u0.len(),
            iterations = solution.iterations,
            dt = self.dt,
            "LQR terminal value built"
        );

        Ok(LqrSolution {
            x0: x0.clone(),
            u0: u0.clone(),
            s,
            k,
            q: q.clone(),
            r: r.clone(),
            dt: self.dt,
            reference_points,
            invariant_coordinate: self.horizontal_coordinate,
        })
    }
}
