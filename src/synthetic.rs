use nalgebra as na;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::types::{Correspondence, ProjectionMatrix};

/// A pinhole camera looking at a cube of random world points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub num_points: usize,
    /// Half width of the uniform pixel noise.
    pub pixel_noise: f64,
    pub seed: u64,
    pub focal: (f64, f64),
    pub principal_point: (f64, f64),
    /// Roll, pitch, yaw in radians.
    pub rotation: (f64, f64, f64),
    pub translation: (f64, f64, f64),
    /// Half side length of the cube centered at the world origin.
    pub half_extent: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            num_points: 24,
            pixel_noise: 0.0,
            seed: 0,
            focal: (800.0, 780.0),
            principal_point: (320.0, 240.0),
            rotation: (0.1, -0.05, 0.02),
            translation: (0.1, -0.2, 4.0),
            half_extent: 1.0,
        }
    }
}

impl SyntheticConfig {
    /// `K [R | t]` of the configured camera.
    pub fn projection_matrix(&self) -> ProjectionMatrix {
        let k = na::Matrix3::new(
            self.focal.0,
            0.0,
            self.principal_point.0,
            0.0,
            self.focal.1,
            self.principal_point.1,
            0.0,
            0.0,
            1.0,
        );
        let (roll, pitch, yaw) = self.rotation;
        let r = na::Rotation3::from_euler_angles(roll, pitch, yaw);
        let t = na::Vector3::new(self.translation.0, self.translation.1, self.translation.2);
        let mut rt = na::Matrix3x4::zeros();
        rt.fixed_view_mut::<3, 3>(0, 0).copy_from(r.matrix());
        rt.set_column(3, &t);
        ProjectionMatrix::from_matrix(&(k * rt))
    }
}

/// Seeded correspondences of the configured camera.
///
/// Points that cannot be projected are skipped, so fewer than `num_points`
/// may come back for cameras placed inside the cube.
pub fn generate_correspondences(config: &SyntheticConfig) -> Vec<Correspondence> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let p = config.projection_matrix();
    let e = config.half_extent;
    (0..config.num_points)
        .filter_map(|_| {
            let p3d = glam::DVec3::new(
                rng.random_range(-e..=e),
                rng.random_range(-e..=e),
                rng.random_range(-e..=e),
            );
            let (u, v) = p.project(p3d.x, p3d.y, p3d.z)?;
            let noise = if config.pixel_noise > 0.0 {
                glam::DVec2::new(
                    rng.random_range(-config.pixel_noise..config.pixel_noise),
                    rng.random_range(-config.pixel_noise..config.pixel_noise),
                )
            } else {
                glam::DVec2::ZERO
            };
            Some(Correspondence::from_points(
                glam::DVec2::new(u, v) + noise,
                p3d,
            ))
        })
        .collect()
}
