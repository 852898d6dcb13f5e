use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::error::CalibrationError;

/// One observed world point and its pixel projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Correspondence {
    pub u: f64,
    pub v: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Correspondence {
    pub fn new(u: f64, v: f64, x: f64, y: f64, z: f64) -> Correspondence {
        Correspondence { u, v, x, y, z }
    }

    pub fn from_points(p2d: glam::DVec2, p3d: glam::DVec3) -> Correspondence {
        Correspondence::new(p2d.x, p2d.y, p3d.x, p3d.y, p3d.z)
    }

    /// Builds a correspondence from `[u, v, x, y, z]`.
    ///
    /// `index` is only used to report which record was malformed.
    pub fn from_components(
        index: usize,
        components: &[f64],
    ) -> Result<Correspondence, CalibrationError> {
        match *components {
            [u, v, x, y, z] => Ok(Correspondence::new(u, v, x, y, z)),
            _ => Err(CalibrationError::MalformedCorrespondence {
                index,
                components: components.len(),
            }),
        }
    }

    pub fn pixel(&self) -> glam::DVec2 {
        glam::DVec2::new(self.u, self.v)
    }

    pub fn world(&self) -> glam::DVec3 {
        glam::DVec3::new(self.x, self.y, self.z)
    }
}

impl From<[f64; 5]> for Correspondence {
    fn from(c: [f64; 5]) -> Self {
        Correspondence::new(c[0], c[1], c[2], c[3], c[4])
    }
}

/// Row-major 3x4 camera matrix `[p11..p14, p21..p24, p31..p34]`, up to scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionMatrix {
    coefficients: [f64; 12],
}

impl ProjectionMatrix {
    pub fn new(coefficients: [f64; 12]) -> ProjectionMatrix {
        ProjectionMatrix { coefficients }
    }

    /// Takes the first twelve values of a solver output.
    pub(crate) fn from_solution(x: &[f64]) -> ProjectionMatrix {
        let mut coefficients = [0.0; 12];
        coefficients.iter_mut().zip(x).for_each(|(c, v)| *c = *v);
        ProjectionMatrix { coefficients }
    }

    pub fn from_matrix(m: &na::Matrix3x4<f64>) -> ProjectionMatrix {
        let mut coefficients = [0.0; 12];
        for r in 0..3 {
            for c in 0..4 {
                coefficients[r * 4 + c] = m[(r, c)];
            }
        }
        ProjectionMatrix { coefficients }
    }

    pub fn to_matrix(&self) -> na::Matrix3x4<f64> {
        na::Matrix3x4::from_row_slice(&self.coefficients)
    }

    pub fn coefficients(&self) -> &[f64; 12] {
        &self.coefficients
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.coefficients.to_vec()
    }

    pub fn is_zero(&self) -> bool {
        self.coefficients.iter().all(|c| *c == 0.0)
    }

    pub fn norm(&self) -> f64 {
        self.coefficients.iter().map(|c| c * c).sum::<f64>().sqrt()
    }

    /// Scales to unit Frobenius norm with `p34 >= 0`.
    ///
    /// The zero matrix is returned unchanged.
    pub fn normalized(&self) -> ProjectionMatrix {
        let norm = self.norm();
        if norm <= f64::EPSILON {
            return *self;
        }
        let scale = if self.coefficients[11] < 0.0 {
            -1.0 / norm
        } else {
            1.0 / norm
        };
        let mut coefficients = self.coefficients;
        coefficients.iter_mut().for_each(|c| *c *= scale);
        ProjectionMatrix { coefficients }
    }

    /// Projects a world point to pixel coordinates.
    ///
    /// Returns `None` when the point lies on the camera's principal plane.
    pub fn project(&self, x: f64, y: f64, z: f64) -> Option<(f64, f64)> {
        let h = self.to_matrix() * na::Vector4::new(x, y, z, 1.0);
        if h.z.abs() <= f64::EPSILON {
            None
        } else {
            Some((h.x / h.z, h.y / h.z))
        }
    }
}

impl std::ops::Index<usize> for ProjectionMatrix {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.coefficients[index]
    }
}
