//! Vector layer processing on top of [GDAL](http://gdal.org/).
//!
//! A [`Processor`] loads vector files into [`VectorLayer`](vector::VectorLayer)s,
//! filters their features with OGR SQL expressions, reprojects them and
//! builds buffered polygon layers. Every layer a processor loads or builds is
//! published to a [`LayerRegistry`] owned by the caller.
//!
//! ## Use
//!
//! ```
//! use gdal_processor::{LayerRegistry, Processor};
//!
//! let mut registry = LayerRegistry::new();
//! let mut processor = Processor::new(&mut registry);
//!
//! let cities = processor.load_layer("fixtures/test_data.geojson").unwrap();
//! let large = processor.filter_features(&cities, "population > 1000").unwrap();
//! println!("{} cities with more than 1000 inhabitants", large.len());
//!
//! let buffered = processor.create_buffer_layer(&large, 0.01).unwrap();
//! assert_eq!(buffered.name(), "buffered_cities");
//! assert_eq!(buffered.feature_count(), 3);
//! ```

pub mod config;
pub mod dataset;
pub mod driver;
pub mod errors;
pub mod processor;
pub mod registry;
pub mod spatial_ref;
pub mod utils;
pub mod vector;

pub use errors::{GdalError, Result};
pub use processor::{Derivation, Processor, ProcessorOptions};
pub use registry::{LayerId, LayerRegistry};

#[cfg(test)]
mod test_utils;
