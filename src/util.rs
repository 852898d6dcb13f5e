use rayon::prelude::*;

use crate::error::CalibrationError;
use crate::optimization::{EstimatorConfig, estimate};
use crate::types::{Correspondence, ProjectionMatrix};

/// Pixel distance between each observation and its reprojection.
///
/// `None` for points on the camera's principal plane.
pub fn reprojection_errors(
    p: &ProjectionMatrix,
    correspondences: &[Correspondence],
) -> Vec<Option<f64>> {
    correspondences
        .iter()
        .map(|c| {
            p.project(c.x, c.y, c.z)
                .map(|(u, v)| ((u - c.u).powi(2) + (v - c.v).powi(2)).sqrt())
        })
        .collect()
}

/// Root mean square of the projectable reprojection errors.
pub fn rms_reprojection_error(
    p: &ProjectionMatrix,
    correspondences: &[Correspondence],
) -> Option<f64> {
    let errors: Vec<f64> = reprojection_errors(p, correspondences)
        .into_iter()
        .flatten()
        .collect();
    if errors.is_empty() {
        return None;
    }
    Some((errors.iter().map(|e| e * e).sum::<f64>() / errors.len() as f64).sqrt())
}

/// Frobenius distance between two matrices after removing scale and sign.
pub fn relative_projection_error(a: &ProjectionMatrix, b: &ProjectionMatrix) -> f64 {
    let a = a.normalized();
    let b = b.normalized();
    let dist = |sign: f64| {
        a.as_slice()
            .iter()
            .zip(b.as_slice())
            .map(|(x, y)| (x - sign * y).powi(2))
            .sum::<f64>()
            .sqrt()
    };
    dist(1.0).min(dist(-1.0))
}

/// Estimates every correspondence set independently on the rayon pool.
pub fn estimate_many(
    sets: &[Vec<Correspondence>],
    config: &EstimatorConfig,
) -> Vec<Result<ProjectionMatrix, CalibrationError>> {
    log::trace!("estimating {} correspondence sets", sets.len());
    sets.par_iter()
        .map(|correspondences| estimate(correspondences, config))
        .collect()
}
