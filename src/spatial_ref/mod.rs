//! Spatial references, coordinate transformations and the lenient [`Crs`]
//! used for layer metadata.

mod crs;
mod srs;
mod transform;

pub use crs::Crs;
pub use srs::SpatialRef;
pub use transform::CoordTransform;

#[cfg(test)]
mod tests;
