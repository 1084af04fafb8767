use std::ffi::CString;
use std::fmt::{self, Debug, Formatter};
use std::path::{Path, PathBuf};
use std::ptr::null;

use gdal_sys::{self, OGRErr, OGRLayerH, OGRwkbGeometryType};

use crate::dataset::{Dataset, LayerOptions};
use crate::driver::Driver;
use crate::errors::*;
use crate::spatial_ref::Crs;
use crate::utils::_last_err_msg;
use crate::vector::{Feature, FieldDefn, Schema};

/// Where the features of a [`VectorLayer`] live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// Read-only layer backed by a file.
    File(PathBuf),
    /// Mutable layer built in memory.
    Memory,
}

/// A named vector layer together with the dataset that owns it.
///
/// Closing the dataset releases the layer, so a `VectorLayer` is valid for
/// as long as it exists.
///
/// ```
/// use std::path::Path;
/// use gdal_processor::vector::VectorLayer;
///
/// let layer = VectorLayer::open(Path::new("fixtures/test_data.geojson"), "cities").unwrap();
/// for feature in layer.features() {
///     println!("{:?}", feature.geometry());
/// }
/// ```
pub struct VectorLayer {
    name: String,
    provenance: Provenance,
    c_layer: OGRLayerH,
    _dataset: Dataset,
}

impl VectorLayer {
    /// Opens the first layer of the vector file at `path` and calls it `name`.
    pub fn open(path: &Path, name: &str) -> Result<VectorLayer> {
        let dataset = Dataset::open_vector(path)?;
        let c_layer = dataset.layer_handle(0)?;
        Ok(VectorLayer {
            name: name.to_string(),
            provenance: Provenance::File(path.to_path_buf()),
            c_layer,
            _dataset: dataset,
        })
    }

    /// Creates an empty in-memory layer.
    ///
    /// An invalid `crs` gives a layer without spatial reference.
    pub fn create_in_memory(
        name: &str,
        crs: &Crs,
        ty: OGRwkbGeometryType::Type,
    ) -> Result<VectorLayer> {
        let mut dataset = Driver::memory()?.create_vector_only("")?;
        let c_layer = dataset.create_layer(LayerOptions {
            name,
            srs: crs.spatial_ref(),
            ty,
        })?;
        Ok(VectorLayer {
            name: name.to_string(),
            provenance: Provenance::Memory,
            c_layer,
            _dataset: dataset,
        })
    }

    /// Returns the wrapped C pointer
    ///
    /// # Safety
    /// This method returns a raw C pointer
    pub unsafe fn c_layer(&self) -> OGRLayerH {
        self.c_layer
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// A `VectorLayer` only exists once its provider opened or created it.
    pub fn is_valid(&self) -> bool {
        !self.c_layer.is_null()
    }

    pub fn feature_count(&self) -> u64 {
        (unsafe { gdal_sys::OGR_L_GetFeatureCount(self.c_layer, 1) }).max(0) as u64
    }

    pub fn geometry_type(&self) -> OGRwkbGeometryType::Type {
        unsafe { gdal_sys::OGR_L_GetGeomType(self.c_layer) }
    }

    /// The CRS of the layer, invalid when the layer has none.
    pub fn crs(&self) -> Crs {
        unsafe { Crs::from_c_obj(gdal_sys::OGR_L_GetSpatialRef(self.c_layer)) }
    }

    pub fn schema(&self) -> Schema {
        unsafe { Schema::from_c_defn(gdal_sys::OGR_L_GetLayerDefn(self.c_layer)) }
    }

    /// Position of the field called `name`, if any.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        let c_name = CString::new(name).ok()?;
        let idx = unsafe {
            gdal_sys::OGR_FD_GetFieldIndex(
                gdal_sys::OGR_L_GetLayerDefn(self.c_layer),
                c_name.as_ptr(),
            )
        };
        usize::try_from(idx).ok()
    }

    /// Iterate over the features of this layer, from the start.
    ///
    /// Iterators share the layer's read cursor: interleaving two of them
    /// skips features.
    pub fn features(&self) -> FeatureIterator<'_> {
        unsafe { gdal_sys::OGR_L_ResetReading(self.c_layer) };
        FeatureIterator { layer: self }
    }

    /// Restrict iteration to features matching `expression`, an OGR SQL
    /// `WHERE` clause. The restriction is lifted when the returned guard is
    /// dropped.
    pub fn set_attribute_filter(&self, expression: &str) -> Result<AttributeFilter<'_>> {
        let c_expression = CString::new(expression).map_err(|e| GdalError::FilterError {
            expression: expression.to_string(),
            msg: e.to_string(),
        })?;
        let rv =
            unsafe { gdal_sys::OGR_L_SetAttributeFilter(self.c_layer, c_expression.as_ptr()) };
        if rv != OGRErr::OGRERR_NONE {
            let msg = _last_err_msg();
            self.clear_attribute_filter();
            return Err(GdalError::FilterError {
                expression: expression.to_string(),
                msg: if msg.is_empty() {
                    format!("OGR_L_SetAttributeFilter returned {rv}")
                } else {
                    msg
                },
            });
        }
        Ok(AttributeFilter { layer: self })
    }

    fn clear_attribute_filter(&self) {
        unsafe { gdal_sys::OGR_L_SetAttributeFilter(self.c_layer, null()) };
    }

    /// Add a field to the schema of this layer.
    pub fn create_field(&self, field: &FieldDefn) -> Result<()> {
        let c_name = CString::new(field.name())?;
        let c_field_defn =
            unsafe { gdal_sys::OGR_Fld_Create(c_name.as_ptr(), field.field_type().to_ogr()) };
        let rv = unsafe { gdal_sys::OGR_L_CreateField(self.c_layer, c_field_defn, 1) };
        unsafe { gdal_sys::OGR_Fld_Destroy(c_field_defn) };
        if rv != OGRErr::OGRERR_NONE {
            return Err(GdalError::OgrError {
                err: rv,
                method_name: "OGR_L_CreateField",
            });
        }
        Ok(())
    }

    /// Add every field of `other` to the schema of this layer, keeping
    /// widths and precisions.
    pub fn copy_fields_from(&self, other: &VectorLayer) -> Result<()> {
        let c_defn = unsafe { gdal_sys::OGR_L_GetLayerDefn(other.c_layer) };
        let total = unsafe { gdal_sys::OGR_FD_GetFieldCount(c_defn) };
        for idx in 0..total {
            let rv = unsafe {
                gdal_sys::OGR_L_CreateField(
                    self.c_layer,
                    gdal_sys::OGR_FD_GetFieldDefn(c_defn, idx),
                    1,
                )
            };
            if rv != OGRErr::OGRERR_NONE {
                return Err(GdalError::OgrError {
                    err: rv,
                    method_name: "OGR_L_CreateField",
                });
            }
        }
        Ok(())
    }
}

impl Debug for VectorLayer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorLayer")
            .field("name", &self.name)
            .field("provenance", &self.provenance)
            .finish()
    }
}

pub struct FeatureIterator<'a> {
    layer: &'a VectorLayer,
}

impl<'a> Iterator for FeatureIterator<'a> {
    type Item = Feature<'a>;

    #[inline]
    fn next(&mut self) -> Option<Feature<'a>> {
        let c_feature = unsafe { gdal_sys::OGR_L_GetNextFeature(self.layer.c_layer) };
        if c_feature.is_null() {
            None
        } else {
            Some(unsafe { Feature::from_c_feature(c_feature) })
        }
    }
}

/// An attribute filter installed on a layer, see
/// [`VectorLayer::set_attribute_filter`].
#[derive(Debug)]
pub struct AttributeFilter<'a> {
    layer: &'a VectorLayer,
}

impl<'a> AttributeFilter<'a> {
    /// Iterate over the matching features.
    pub fn features(&self) -> FeatureIterator<'a> {
        self.layer.features()
    }
}

impl Drop for AttributeFilter<'_> {
    fn drop(&mut self) {
        self.layer.clear_attribute_filter();
    }
}
