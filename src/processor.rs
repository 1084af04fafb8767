//! The load, filter, reproject and buffer pipeline.
//!
//! ```no_run
//! use gdal_processor::processor::Processor;
//! use gdal_processor::registry::LayerRegistry;
//!
//! let mut registry = LayerRegistry::new();
//! let mut processor = Processor::new(&mut registry);
//! let buffered = processor.full_pipeline("fixtures/test_data.geojson").unwrap();
//! println!("{} buffered features", buffered.feature_count());
//! drop(processor);
//! assert_eq!(registry.layers_by_name("buffered_cities").len(), 1);
//! ```

use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use gdal_sys::OGRFeatureDefnH;

use crate::config;
use crate::errors::*;
use crate::registry::LayerRegistry;
use crate::spatial_ref::{CoordTransform, Crs};
use crate::vector::{
    Feature, FieldDefn, FieldKey, FieldType, OGRwkbGeometryType, VectorLayer,
};

/// Computes the `population` of a buffer feature from the source value.
#[derive(Clone)]
pub struct Derivation(Arc<dyn Fn(i64) -> i64 + Send + Sync>);

impl Derivation {
    pub fn new<F>(f: F) -> Derivation
    where
        F: Fn(i64) -> i64 + Send + Sync + 'static,
    {
        Derivation(Arc::new(f))
    }

    /// Copy the source value unchanged.
    pub fn identity() -> Derivation {
        Derivation::new(|value| value)
    }

    /// Multiply the source value, saturating on overflow.
    pub fn scale(factor: i64) -> Derivation {
        Derivation::new(move |value| value.saturating_mul(factor))
    }

    pub fn apply(&self, value: i64) -> i64 {
        (self.0)(value)
    }
}

/// Doubles the source value.
impl Default for Derivation {
    fn default() -> Self {
        Derivation::scale(2)
    }
}

impl fmt::Debug for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Derivation(..)")
    }
}

/// Every constant the pipeline uses.
#[derive(Debug, Clone)]
pub struct ProcessorOptions {
    /// Name given to layers opened by [`Processor::load_layer`].
    pub source_layer_name: String,
    /// Expression used by [`Processor::full_pipeline`].
    pub filter_expression: String,
    /// Buffer distance used by [`Processor::full_pipeline`], in CRS units.
    pub buffer_distance: f64,
    /// Segments per quarter circle when buffering.
    pub quad_segments: u32,
    pub buffer_layer_name: String,
    pub buffer_crs: String,
    /// Default target of [`Processor::to_gsk_2011`].
    pub target_crs: String,
    /// The integer attribute read from the source and written to the buffer layer.
    pub population_field: String,
    pub derivation: Derivation,
    /// GDAL configuration options set when the processor is built.
    pub gdal_config: Vec<(String, String)>,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        ProcessorOptions {
            source_layer_name: "cities".to_string(),
            filter_expression: "population >= 1000".to_string(),
            buffer_distance: 1000.0,
            quad_segments: 25,
            buffer_layer_name: "buffered_cities".to_string(),
            buffer_crs: "EPSG:4326".to_string(),
            target_crs: "EPSG:7683".to_string(),
            population_field: "population".to_string(),
            derivation: Derivation::default(),
            gdal_config: Vec::new(),
        }
    }
}

/// A population key resolved against the schema of one source layer.
struct SourceKey {
    c_defn: OGRFeatureDefnH,
    key: FieldKey,
}

/// Runs the pipeline steps, publishing results to a borrowed registry.
pub struct Processor<'r> {
    registry: &'r mut LayerRegistry,
    options: ProcessorOptions,
}

impl<'r> Processor<'r> {
    pub fn new(registry: &'r mut LayerRegistry) -> Processor<'r> {
        Processor {
            registry,
            options: ProcessorOptions::default(),
        }
    }

    /// Builds a processor, applying `options.gdal_config` first.
    pub fn with_options(
        registry: &'r mut LayerRegistry,
        options: ProcessorOptions,
    ) -> Result<Processor<'r>> {
        for (key, value) in &options.gdal_config {
            config::set_config_option(key, value)?;
            log::debug!("set GDAL option {key}={value}");
        }
        Ok(Processor { registry, options })
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    pub fn registry(&self) -> &LayerRegistry {
        self.registry
    }

    pub fn registry_mut(&mut self) -> &mut LayerRegistry {
        self.registry
    }

    /// Open the vector file at `path` and register its first layer.
    ///
    /// Nothing is registered when the file cannot be loaded.
    pub fn load_layer<P: AsRef<Path>>(&mut self, path: P) -> Result<Rc<VectorLayer>> {
        let path = path.as_ref();
        let layer = VectorLayer::open(path, &self.options.source_layer_name).map_err(|e| {
            GdalError::LoadError {
                path: path.to_path_buf(),
                msg: e.to_string(),
            }
        })?;
        log::debug!(
            "loaded {} features from {}",
            layer.feature_count(),
            path.display()
        );
        let layer = Rc::new(layer);
        self.registry.add(Rc::clone(&layer));
        Ok(layer)
    }

    /// The features of `layer` matching `expression`, in provider order.
    ///
    /// The layer is left unfiltered afterwards, whatever the outcome.
    pub fn filter_features<'l>(
        &self,
        layer: &'l VectorLayer,
        expression: &str,
    ) -> Result<Vec<Feature<'l>>> {
        let filter = layer.set_attribute_filter(expression)?;
        let features: Vec<Feature<'l>> = filter.features().collect();
        log::debug!(
            "'{expression}' matched {} features of '{}'",
            features.len(),
            layer.name()
        );
        Ok(features)
    }

    /// [`reproject`](Processor::reproject) into the configured target CRS,
    /// GSK-2011 unless changed.
    pub fn to_gsk_2011(&self, layer: &VectorLayer) -> Result<VectorLayer> {
        self.reproject(layer, &self.options.target_crs)
    }

    /// Copy `layer` into a new in-memory polygon layer with coordinates in
    /// `target`. Features keep their own geometry type.
    ///
    /// An unrecognised `target`, or a source without CRS, is not an error:
    /// the result has an invalid CRS and the geometries are copied as they
    /// are. The result is not registered.
    pub fn reproject(&self, layer: &VectorLayer, target: &str) -> Result<VectorLayer> {
        let source_crs = layer.crs();
        let target_crs = Crs::from_user_input(target);
        let transform = match (source_crs.spatial_ref(), target_crs.spatial_ref()) {
            (Some(source), Some(target)) => Some(CoordTransform::new(source, target)?),
            _ => {
                log::warn!(
                    "cannot transform '{}' from '{}' to '{target}', copying coordinates",
                    layer.name(),
                    source_crs.authid()
                );
                None
            }
        };

        let transformed = VectorLayer::create_in_memory(
            &format!("{}_transformed", layer.name()),
            &target_crs,
            OGRwkbGeometryType::wkbPolygon,
        )?;
        transformed.copy_fields_from(layer)?;

        for feature in layer.features() {
            let mut new_feature = Feature::new(&transformed)?;
            new_feature.copy_fields_from(&feature)?;
            match feature.geometry() {
                Some(geometry) if !geometry.is_empty() => {
                    let mut geometry = geometry.clone();
                    if let Some(transform) = &transform {
                        geometry.transform_inplace(transform)?;
                    }
                    new_feature.set_geometry(geometry)?;
                }
                _ => new_feature.clear_geometry(),
            }
            new_feature.create(&transformed)?;
        }

        log::debug!(
            "reprojected '{}' into '{}' ({} features)",
            layer.name(),
            transformed.name(),
            transformed.feature_count()
        );
        Ok(transformed)
    }

    /// Build and register a polygon layer holding the buffered outline of
    /// every feature, with a population derived from the source one.
    ///
    /// Features without geometry give features without geometry, a null
    /// source population gives a null population. Any other failure aborts
    /// the whole operation and nothing is registered.
    pub fn create_buffer_layer<'f, 'l: 'f, I>(
        &mut self,
        features: I,
        distance: f64,
    ) -> Result<Rc<VectorLayer>>
    where
        I: IntoIterator<Item = &'f Feature<'l>>,
    {
        let options = &self.options;
        let buffer_layer = VectorLayer::create_in_memory(
            &options.buffer_layer_name,
            &Crs::from_user_input(&options.buffer_crs),
            OGRwkbGeometryType::wkbPolygon,
        )?;
        buffer_layer.create_field(&FieldDefn::new(
            &options.population_field,
            FieldType::Integer,
        ))?;
        let target_key = buffer_layer
            .schema()
            .integer_field(&options.population_field)?;

        let mut source_key: Option<SourceKey> = None;
        for feature in features {
            let c_defn = feature.c_defn();
            let resolved = match source_key.take() {
                Some(cached) if cached.c_defn == c_defn => cached,
                _ => SourceKey {
                    c_defn,
                    key: feature.schema().integer_field(&options.population_field)?,
                },
            };

            let mut new_feature = Feature::new(&buffer_layer)?;
            if let Some(value) = feature.field_as_integer64(&resolved.key)? {
                let derived = options.derivation.apply(value);
                let derived =
                    i32::try_from(derived).map_err(|_| GdalError::FieldOverflow {
                        field_name: options.population_field.clone(),
                        value: derived,
                    })?;
                new_feature.set_field_integer(&target_key, derived)?;
            }
            source_key = Some(resolved);

            if let Some(geometry) = feature.geometry().filter(|g| !g.is_empty()) {
                new_feature.set_geometry(geometry.buffer(distance, options.quad_segments)?)?;
            }
            new_feature.create(&buffer_layer)?;
        }

        log::debug!(
            "buffered {} features by {distance}",
            buffer_layer.feature_count()
        );
        let buffer_layer = Rc::new(buffer_layer);
        self.registry.add(Rc::clone(&buffer_layer));
        Ok(buffer_layer)
    }

    /// Load `path`, keep the features matching the configured expression and
    /// buffer them by the configured distance.
    pub fn full_pipeline<P: AsRef<Path>>(&mut self, path: P) -> Result<Rc<VectorLayer>> {
        let layer = self.load_layer(path)?;
        let filtered = self.filter_features(&layer, &self.options.filter_expression)?;
        let buffered = self.create_buffer_layer(&filtered, self.options.buffer_distance)?;
        log::info!(
            "pipeline produced '{}' with {} features",
            buffered.name(),
            buffered.feature_count()
        );
        Ok(buffered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fixture, SuppressGDALErrorLog, TempFixture};

    #[test]
    fn test_derivations() {
        assert_eq!(Derivation::default().apply(2500), 5000);
        assert_eq!(Derivation::identity().apply(2500), 2500);
        assert_eq!(Derivation::scale(3).apply(-4), -12);
        assert_eq!(Derivation::scale(2).apply(i64::MAX), i64::MAX);
        assert_eq!(Derivation::new(|v| v + 1).apply(1), 2);
    }

    #[test]
    fn test_default_options() {
        let options = ProcessorOptions::default();
        assert_eq!(options.source_layer_name, "cities");
        assert_eq!(options.filter_expression, "population >= 1000");
        assert_eq!(options.buffer_distance, 1000.0);
        assert_eq!(options.quad_segments, 25);
        assert_eq!(options.buffer_layer_name, "buffered_cities");
        assert_eq!(options.target_crs, "EPSG:7683");
    }

    #[test]
    fn test_with_options_sets_gdal_config() {
        let mut registry = LayerRegistry::new();
        let options = ProcessorOptions {
            gdal_config: vec![("GDAL_PROCESSOR_OPTION".to_string(), "on".to_string())],
            ..Default::default()
        };
        Processor::with_options(&mut registry, options).unwrap();
        assert_eq!(
            config::get_config_option("GDAL_PROCESSOR_OPTION", "").unwrap(),
            "on"
        );
        config::clear_config_option("GDAL_PROCESSOR_OPTION").unwrap();
    }

    #[test]
    fn test_load_names_layer() {
        let mut registry = LayerRegistry::new();
        let mut processor = Processor::new(&mut registry);
        let layer = processor.load_layer(fixture("test_data.geojson")).unwrap();
        assert_eq!(layer.name(), processor.options().source_layer_name);
        assert!(processor.registry().id_of(&layer).is_some());

        processor.registry_mut().remove_all();
        assert!(processor.registry().is_empty());
    }

    #[test]
    fn test_load_garbage_file() {
        let _nolog = SuppressGDALErrorLog::new();
        let garbage = TempFixture::with_contents("garbage.geojson", "this is not json");
        let mut registry = LayerRegistry::new();
        let mut processor = Processor::new(&mut registry);
        match processor.load_layer(garbage.path()) {
            Err(GdalError::LoadError { path, .. }) => assert_eq!(path, garbage.path()),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(processor.registry().is_empty());
    }

    #[test]
    fn test_buffer_overflow_aborts() {
        let mut registry = LayerRegistry::new();
        let options = ProcessorOptions {
            derivation: Derivation::scale(1_000_000),
            ..Default::default()
        };
        let mut processor = Processor::with_options(&mut registry, options).unwrap();
        let layer = processor.load_layer(fixture("test_data.geojson")).unwrap();
        let features = processor
            .filter_features(&layer, "population > 10000")
            .unwrap();
        match processor.create_buffer_layer(&features, 0.01) {
            Err(GdalError::FieldOverflow { field_name, value }) => {
                assert_eq!(field_name, "population");
                assert_eq!(value, 12_000_000_000);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        // only the source layer was registered
        assert_eq!(processor.registry().len(), 1);
    }
}
