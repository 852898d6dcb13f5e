//! Camera projection matrix estimation from 2D-3D point correspondences.
//!
//! [`optimization::least_squares_solve`] is the generic SVD least-squares
//! primitive. [`optimization::estimate_projection_matrix`] builds the `2n x 12`
//! constraint system and hands it to that solver, while
//! [`optimization::estimate_projection_matrix_dlt`] solves the same system
//! through its null space.
pub mod error;
pub mod io;
pub mod optimization;
pub mod synthetic;
pub mod types;
pub mod util;

pub use error::CalibrationError;
pub use io::estimate_projection_matrix_from_records;
pub use optimization::{
    EstimatorConfig, SolveMethod, estimate_projection_matrix, estimate_projection_matrix_dlt,
    least_squares_solve,
};
pub use types::{Correspondence, ProjectionMatrix};
