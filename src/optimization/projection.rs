use log::{debug, warn};
use nalgebra as na;
use serde::{Deserialize, Serialize};

use super::linear::{SVD_MAX_ITERATIONS, least_squares_solve};
use crate::error::CalibrationError;
use crate::types::{Correspondence, ProjectionMatrix};

/// Each correspondence gives two equations for twelve unknowns.
pub const MIN_CORRESPONDENCES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SolveMethod {
    /// Ordinary least squares against a zero target vector.
    LeastSquares,
    /// Right singular vector of the smallest singular value of `A`.
    NullSpace,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    pub method: SolveMethod,
    /// Hartley-normalize pixels and world points before the null-space solve.
    pub normalize: bool,
    pub min_correspondences: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            method: SolveMethod::NullSpace,
            normalize: true,
            min_correspondences: MIN_CORRESPONDENCES,
        }
    }
}

fn check_count(found: usize, required: usize) -> Result<(), CalibrationError> {
    let required = required.max(MIN_CORRESPONDENCES);
    if found < required {
        return Err(CalibrationError::InsufficientData { required, found });
    }
    Ok(())
}

/// Rejects NaN and infinite components before any numeric work.
fn check_finite(correspondences: &[Correspondence]) -> Result<(), CalibrationError> {
    for (index, c) in correspondences.iter().enumerate() {
        let components = [c.u, c.v, c.x, c.y, c.z];
        if let Some(component) = components.iter().position(|v| !v.is_finite()) {
            return Err(CalibrationError::NonNumericElement { index, component });
        }
    }
    Ok(())
}

/// The `u` and `v` constraint rows contributed by one correspondence.
pub fn correspondence_rows(c: &Correspondence) -> [[f64; 12]; 2] {
    let Correspondence { u, v, x, y, z } = *c;
    [
        [x, y, z, 1.0, 0.0, 0.0, 0.0, 0.0, -u * x, -u * y, -u * z, -u],
        [0.0, 0.0, 0.0, 0.0, x, y, z, 1.0, -v * x, -v * y, -v * z, -v],
    ]
}

/// Stacks the constraint rows of all correspondences into a `2n x 12` matrix.
pub fn coefficient_matrix(correspondences: &[Correspondence]) -> na::DMatrix<f64> {
    na::DMatrix::from_row_iterator(
        correspondences.len() * 2,
        12,
        correspondences
            .iter()
            .flat_map(correspondence_rows)
            .flatten(),
    )
}

/// Estimates the projection matrix by ordinary least squares on `A·p = 0`.
///
/// The target vector is zero, so the minimum-norm solution is the zero
/// matrix. Use [`estimate_projection_matrix_dlt`] for a non-trivial camera.
pub fn estimate_projection_matrix(
    correspondences: &[Correspondence],
) -> Result<ProjectionMatrix, CalibrationError> {
    check_count(correspondences.len(), MIN_CORRESPONDENCES)?;
    check_finite(correspondences)?;

    let a = coefficient_matrix(correspondences);
    let b = na::DVector::zeros(a.nrows());
    let x = least_squares_solve(&a, &b)?;
    let p = ProjectionMatrix::from_solution(&x);
    if p.is_zero() {
        warn!(
            "least squares on the homogeneous system of {} correspondences gave the zero matrix",
            correspondences.len()
        );
    }
    Ok(p)
}

/// Hartley normalization of pixel coordinates.
///
/// Returns the centered points scaled to mean distance `√2` and the 3x3
/// transform that maps homogeneous pixels onto them.
fn normalize_pixels(
    correspondences: &[Correspondence],
) -> Option<(Vec<glam::DVec2>, na::Matrix3<f64>)> {
    let n = correspondences.len() as f64;
    let centroid = correspondences
        .iter()
        .fold(glam::DVec2::ZERO, |acc, c| acc + c.pixel())
        / n;
    let mean_dist = correspondences
        .iter()
        .map(|c| (c.pixel() - centroid).length())
        .sum::<f64>()
        / n;
    if mean_dist <= f64::EPSILON {
        return None;
    }
    let s = std::f64::consts::SQRT_2 / mean_dist;
    let t = na::Matrix3::new(
        s,
        0.0,
        -s * centroid.x,
        0.0,
        s,
        -s * centroid.y,
        0.0,
        0.0,
        1.0,
    );
    let pts = correspondences
        .iter()
        .map(|c| (c.pixel() - centroid) * s)
        .collect();
    Some((pts, t))
}

/// 3D analog of [`normalize_pixels`], mean distance `√3`.
fn normalize_world(
    correspondences: &[Correspondence],
) -> Option<(Vec<glam::DVec3>, na::Matrix4<f64>)> {
    let n = correspondences.len() as f64;
    let centroid = correspondences
        .iter()
        .fold(glam::DVec3::ZERO, |acc, c| acc + c.world())
        / n;
    let mean_dist = correspondences
        .iter()
        .map(|c| (c.world() - centroid).length())
        .sum::<f64>()
        / n;
    if mean_dist <= f64::EPSILON {
        return None;
    }
    let s = 3.0f64.sqrt() / mean_dist;
    let mut t = na::Matrix4::identity() * s;
    t[(0, 3)] = -s * centroid.x;
    t[(1, 3)] = -s * centroid.y;
    t[(2, 3)] = -s * centroid.z;
    t[(3, 3)] = 1.0;
    let pts = correspondences
        .iter()
        .map(|c| (c.world() - centroid) * s)
        .collect();
    Some((pts, t))
}

/// Direct linear transform solved through the null space of `A`.
///
/// The result has unit Frobenius norm and `p34 >= 0`.
pub fn estimate_projection_matrix_dlt(
    correspondences: &[Correspondence],
    config: &EstimatorConfig,
) -> Result<ProjectionMatrix, CalibrationError> {
    check_count(correspondences.len(), config.min_correspondences)?;
    check_finite(correspondences)?;

    let (conditioned, t_pixel, t_world) = if config.normalize {
        let (pixels, t_pixel) = normalize_pixels(correspondences).ok_or_else(|| {
            CalibrationError::DegenerateConfiguration("all pixels coincide".to_string())
        })?;
        let (worlds, t_world) = normalize_world(correspondences).ok_or_else(|| {
            CalibrationError::DegenerateConfiguration("all world points coincide".to_string())
        })?;
        let conditioned: Vec<_> = pixels
            .iter()
            .zip(&worlds)
            .map(|(p2d, p3d)| Correspondence::from_points(*p2d, *p3d))
            .collect();
        (conditioned, t_pixel, t_world)
    } else {
        (
            correspondences.to_vec(),
            na::Matrix3::identity(),
            na::Matrix4::identity(),
        )
    };

    let a = coefficient_matrix(&conditioned);
    if a.iter().any(|v| !v.is_finite()) {
        return Err(CalibrationError::DegenerateConfiguration(
            "coefficients overflow".to_string(),
        ));
    }
    let svd = a
        .try_svd(false, true, f64::EPSILON, SVD_MAX_ITERATIONS)
        .ok_or_else(|| CalibrationError::SvdFailed("did not converge".to_string()))?;
    let v_t = svd
        .v_t
        .ok_or_else(|| CalibrationError::SvdFailed("right singular vectors missing".to_string()))?;
    let smallest = svd.singular_values.imin();
    debug!(
        "dlt smallest singular value {:e} of {:e}",
        svd.singular_values[smallest],
        svd.singular_values.max()
    );

    let null_vector: Vec<f64> = v_t.row(smallest).iter().copied().collect();
    let p_conditioned = ProjectionMatrix::from_solution(&null_vector).to_matrix();
    let t_pixel_inv = t_pixel.try_inverse().ok_or_else(|| {
        CalibrationError::DegenerateConfiguration("pixel normalization is singular".to_string())
    })?;
    let p = t_pixel_inv * p_conditioned * t_world;

    Ok(ProjectionMatrix::from_matrix(&p).normalized())
}

/// Runs the estimator selected by `config.method`.
pub fn estimate(
    correspondences: &[Correspondence],
    config: &EstimatorConfig,
) -> Result<ProjectionMatrix, CalibrationError> {
    match config.method {
        SolveMethod::LeastSquares => {
            check_count(correspondences.len(), config.min_correspondences)?;
            estimate_projection_matrix(correspondences)
        }
        SolveMethod::NullSpace => estimate_projection_matrix_dlt(correspondences, config),
    }
}
