//! Vector layers, features and geometries
//!
//! ```
//! use std::path::Path;
//! use gdal_processor::vector::VectorLayer;
//!
//! let layer = VectorLayer::open(Path::new("fixtures/test_data.geojson"), "cities").unwrap();
//! let population = layer.schema().integer_field("population").unwrap();
//! for feature in layer.features() {
//!     println!("{:?}", feature.field_as_integer64(&population).unwrap());
//! }
//! ```

pub use defn::{FieldDefn, FieldKey, FieldType, Schema};
pub use feature::Feature;
pub use gdal_sys::OGRwkbGeometryType;
pub use geometry::{Geometry, GeometryRef};
pub use layer::{AttributeFilter, FeatureIterator, Provenance, VectorLayer};

use crate::errors::Result;

/// Convert object to a GDAL geometry.
pub trait ToGdal {
    fn to_gdal(&self) -> Result<Geometry>;
}

mod defn;
mod feature;
mod geometry;
mod layer;
