pub mod linear;
pub mod projection;

pub use linear::*;
pub use projection::*;
