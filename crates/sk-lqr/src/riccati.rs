//! Discrete algebraic Riccati equation.
//!
//! Solves `S = Q + AᵀSA − AᵀSB (R + BᵀSB)⁻¹ BᵀSA` for the stabilizing `S`
//! and returns the matching gain `K = (R + BᵀSB)⁻¹ BᵀSA`.

use nalgebra::DMatrix;

use crate::error::{LqrError, LqrResult, expect_shape};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RiccatiMethod {
    /// Structure-preserving doubling; quadratic convergence.
    #[default]
    Doubling,
    /// Plain value iteration from `S = Q`.
    FixedPoint,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RiccatiConfig {
    pub method: RiccatiMethod,
    pub max_iterations: usize,
    /// Converged when `‖ΔS‖_F ≤ rel_tol · max(1, ‖S‖_F)`.
    pub rel_tol: f64,
}

impl Default for RiccatiConfig {
    fn default() -> Self {
        Self {
            method: RiccatiMethod::Doubling,
            max_iterations: 10_000,
            rel_tol: 1e-10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiccatiSolution {
    pub s: DMatrix<f64>,
    pub k: DMatrix<f64>,
    pub iterations: usize,
}

/// Solve the DARE for `(A, B, Q, R)`.
///
/// `Q` must be symmetric positive semidefinite and `R` symmetric positive
/// definite; both are symmetrized before use. Fails with
/// [`LqrError::ConvergenceFailed`] if the iteration cap is reached, which
/// typically means `(A, B)` is not stabilizable.
pub fn solve_discrete_riccati(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    q: &DMatrix<f64>,
    r: &DMatrix<f64>,
    config: &RiccatiConfig,
) -> LqrResult<RiccatiSolution> {
    let n = a.nrows();
    let m = b.ncols();
    expect_shape("A", (n, n), a.shape())?;
    expect_shape("B", (n, m), b.shape())?;
    expect_shape("Q", (n, n), q.shape())?;
    expect_shape("R", (m, m), r.shape())?;
    ensure_all_finite("A", a)?;
    ensure_all_finite("B", b)?;
    ensure_all_finite("Q", q)?;
    ensure_all_finite("R", r)?;
    if config.max_iterations == 0 || config.rel_tol.is_nan() || config.rel_tol <= 0.0 {
        return Err(LqrError::Numeric {
            what: "Riccati config needs max_iterations > 0 and rel_tol > 0".into(),
        });
    }

    let q = symmetrize(q);
    let r = symmetrize(r);
    if r.clone().cholesky().is_none() {
        return Err(LqrError::Numeric {
            what: "R is not positive definite".into(),
        });
    }

    let (s, iterations) = match config.method {
        RiccatiMethod::Doubling => doubling(a, b, &q, &r, config)?,
        RiccatiMethod::FixedPoint => fixed_point(a, b, &q, &r, config)?,
    };
    let k = gain(a, b, &s, &r)?;
    ensure_all_finite("S", &s)?;
    ensure_all_finite("K", &k)?;

    tracing::debug!(
        method = ?config.method,
        iterations,
        state_dim = n,
        input_dim = m,
        "Riccati equation solved"
    );

    Ok(RiccatiSolution { s, k, iterations })
}

/// `K = (R + BᵀSB)⁻¹ BᵀSA`.
fn gain(a: &DMatrix<f64>, b: &DMatrix<f64>, s: &DMatrix<f64>, r: &DMatrix<f64>) -> LqrResult<DMatrix<f64>> {
    let bt_s = b.transpose() * s;
    let lhs = r + &bt_s * b;
    let rhs = bt_s * a;
    solve_spd(lhs, &rhs, "R + BᵀSB")
}

fn doubling(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    q: &DMatrix<f64>,
    r: &DMatrix<f64>,
    config: &RiccatiConfig,
) -> LqrResult<(DMatrix<f64>, usize)> {
    let n = a.nrows();
    let eye = DMatrix::<f64>::identity(n, n);

    let r_inv_bt = solve_spd(r.clone(), &b.transpose(), "R")?;
    let mut ak = a.clone();
    let mut gk = symmetrize(&(b * r_inv_bt));
    let mut hk = q.clone();
    let mut change = f64::INFINITY;

    for iteration in 1..=config.max_iterations {
        let w = &eye + &gk * &hk;
        let lu = w.lu();
        let w_inv_a = lu.solve(&ak).ok_or_else(singular("I + GH"))?;
        let w_inv_g = lu.solve(&gk).ok_or_else(singular("I + GH"))?;

        let h_next = symmetrize(&(&hk + ak.transpose() * &hk * &w_inv_a));
        let g_next = symmetrize(&(&gk + &ak * w_inv_g * ak.transpose()));
        let a_next = &ak * w_inv_a;

        change = (&h_next - &hk).norm();
        let scale = h_next.norm().max(1.0);
        if !change.is_finite() {
            break;
        }

        ak = a_next;
        gk = g_next;
        hk = h_next;

        if change <= config.rel_tol * scale {
            return Ok((hk, iteration));
        }
    }

    Err(LqrError::ConvergenceFailed {
        iterations: config.max_iterations,
        change,
    })
}

fn fixed_point(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    q: &DMatrix<f64>,
    r: &DMatrix<f64>,
    config: &RiccatiConfig,
) -> LqrResult<(DMatrix<f64>, usize)> {
    let mut s = q.clone();
    let mut change = f64::INFINITY;

    for iteration in 1..=config.max_iterations {
        let k = gain(a, b, &s, r)?;
        let at_s = a.transpose() * &s;
        let s_next = symmetrize(&(q + &at_s * a - at_s * b * k));

        change = (&s_next - &s).norm();
        let scale = s_next.norm().max(1.0);
        if !change.is_finite() {
            break;
        }
        s = s_next;

        if change <= config.rel_tol * scale {
            return Ok((s, iteration));
        }
    }

    Err(LqrError::ConvergenceFailed {
        iterations: config.max_iterations,
        change,
    })
}

/// Solve `lhs · X = rhs` for symmetric positive definite `lhs`, falling back
/// to LU when Cholesky rejects it.
fn solve_spd(lhs: DMatrix<f64>, rhs: &DMatrix<f64>, what: &'static str) -> LqrResult<DMatrix<f64>> {
    let lhs = symmetrize(&lhs);
    if let Some(chol) = lhs.clone().cholesky() {
        return Ok(chol.solve(rhs));
    }
    lhs.lu().solve(rhs).ok_or_else(singular(what))
}

fn singular(what: &'static str) -> impl FnOnce() -> LqrError {
    move || LqrError::Numeric {
        what: format!("{what} is singular"),
    }
}

fn symmetrize(m: &DMatrix<f64>) -> DMatrix<f64> {
    (m + m.transpose()) * 0.5
}

fn ensure_all_finite(what: &'static str, m: &DMatrix<f64>) -> LqrResult<()> {
    if m.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(LqrError::Numeric {
            what: format!("{what} contains non-finite entries"),
        })
    }
}
