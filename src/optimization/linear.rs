use log::trace;
use nalgebra as na;

use crate::error::CalibrationError;

/// Full output of a least-squares solve.
#[derive(Debug, Clone)]
pub struct LeastSquaresSolution {
    pub x: na::DVector<f64>,
    /// Sum of squared residuals `‖A·x − B‖²`.
    pub residual: f64,
    pub rank: usize,
    pub singular_values: na::DVector<f64>,
}

/// Upper bound on SVD sweeps; nalgebra's default never gives up.
pub const SVD_MAX_ITERATIONS: usize = 10_000;

/// Singular values at or below this are treated as zero.
///
/// Relative to the largest singular value and scaled by the larger matrix
/// dimension, so rank decisions do not depend on the magnitude of `A`.
pub fn singular_value_cutoff(nrows: usize, ncols: usize, max_singular_value: f64) -> f64 {
    nrows.max(ncols) as f64 * f64::EPSILON * max_singular_value
}

/// Position of the first NaN or infinity in the augmented matrix `[A | B]`.
fn first_non_finite(a: &na::DMatrix<f64>, b: &na::DVector<f64>) -> Option<(usize, usize)> {
    (0..a.nrows()).find_map(|row| {
        (0..a.ncols())
            .find(|&column| !a[(row, column)].is_finite())
            .or_else(|| (!b[row].is_finite()).then_some(a.ncols()))
            .map(|column| (row, column))
    })
}

/// Minimizes `‖A·x − B‖₂` through SVD and keeps the residual, rank and
/// singular values.
///
/// Rank-deficient systems yield the minimum-norm solution.
pub fn least_squares_solve_detailed(
    a: &na::DMatrix<f64>,
    b: &na::DVector<f64>,
) -> Result<LeastSquaresSolution, CalibrationError> {
    if a.nrows() != b.len() {
        return Err(CalibrationError::DimensionMismatch {
            a_rows: a.nrows(),
            b_rows: b.len(),
        });
    }
    // Non-finite entries keep the SVD from converging.
    if let Some((row, column)) = first_non_finite(a, b) {
        return Err(CalibrationError::NonFiniteEntry { row, column });
    }
    if a.is_empty() {
        return Ok(LeastSquaresSolution {
            x: na::DVector::zeros(a.ncols()),
            residual: b.norm_squared(),
            rank: 0,
            singular_values: na::DVector::zeros(0),
        });
    }

    let svd = a
        .clone()
        .try_svd(true, true, f64::EPSILON, SVD_MAX_ITERATIONS)
        .ok_or_else(|| CalibrationError::SvdFailed("did not converge".to_string()))?;
    let max_sv = svd.singular_values.max();
    let cutoff = singular_value_cutoff(a.nrows(), a.ncols(), max_sv);
    let rank = svd.singular_values.iter().filter(|s| **s > cutoff).count();
    trace!(
        "lstsq {}x{}: rank {}, cutoff {:e}",
        a.nrows(),
        a.ncols(),
        rank,
        cutoff
    );

    let x = svd
        .solve(b, cutoff)
        .map_err(|e| CalibrationError::SvdFailed(e.to_string()))?;
    let residual = (a * &x - b).norm_squared();

    Ok(LeastSquaresSolution {
        x,
        residual,
        rank,
        singular_values: svd.singular_values,
    })
}

/// Solves `A·x = B` in the least-squares sense and returns `x` flattened.
pub fn least_squares_solve(
    a: &na::DMatrix<f64>,
    b: &na::DVector<f64>,
) -> Result<Vec<f64>, CalibrationError> {
    let solution = least_squares_solve_detailed(a, b)?;
    Ok(solution.x.as_slice().to_vec())
}
