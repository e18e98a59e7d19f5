//! Numerical Jacobians of vector functions.

use nalgebra::{DMatrix, DVector};
use sk_core::ensure_positive;

use crate::error::{LqrResult, expect_shape};

/// Finite difference stencil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DifferenceScheme {
    /// `(f(x + h) - f(x)) / h`, one extra evaluation per column.
    Forward,
    /// `(f(x + h) - f(x - h)) / 2h`, two evaluations per column.
    #[default]
    Central,
}

/// Jacobian of `f` at `x`.
///
/// The step for coordinate j is `epsilon · max(|x[j]|, 1)`. Every evaluation
/// must return as many values as `f(x)`.
pub fn difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
    scheme: DifferenceScheme,
) -> LqrResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> LqrResult<DVector<f64>>,
{
    ensure_positive(epsilon, "finite difference step")?;

    let f_x = f(x)?;
    let rows = f_x.len();
    let eval = |at: &DVector<f64>| -> LqrResult<DVector<f64>> {
        let value = f(at)?;
        expect_shape("jacobian column", (rows, 1), value.shape())?;
        Ok(value)
    };
    let shifted = |j: usize, h: f64| {
        let mut at = x.clone();
        at[j] += h;
        at
    };

    let mut jac = DMatrix::zeros(rows, x.len());
    for j in 0..x.len() {
        let h = epsilon * x[j].abs().max(1.0);
        let column = match scheme {
            DifferenceScheme::Forward => (eval(&shifted(j, h))? - &f_x) / h,
            DifferenceScheme::Central => {
                (eval(&shifted(j, h))? - eval(&shifted(j, -h))?) / (2.0 * h)
            }
        };
        jac.set_column(j, &column);
    }

    Ok(jac)
}
