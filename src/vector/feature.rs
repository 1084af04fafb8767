use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;

use gdal_sys::{self, OGRErr, OGRFeatureDefnH, OGRFeatureH};

use crate::errors::*;
use crate::utils::{_last_null_pointer_err, _string};
use crate::vector::{FieldKey, FieldType, Geometry, GeometryRef, Schema, VectorLayer};

/// OGR Feature
///
/// The handle is owned and destroyed on drop. A feature borrows the layer it
/// was read from or built for.
pub struct Feature<'a> {
    c_feature: OGRFeatureH,
    _layer: PhantomData<&'a VectorLayer>,
}

impl<'a> Feature<'a> {
    /// Creates an empty feature bound to the schema of `layer`.
    pub fn new(layer: &'a VectorLayer) -> Result<Feature<'a>> {
        let c_defn = unsafe { gdal_sys::OGR_L_GetLayerDefn(layer.c_layer()) };
        let c_feature = unsafe { gdal_sys::OGR_F_Create(c_defn) };
        if c_feature.is_null() {
            return Err(_last_null_pointer_err("OGR_F_Create"));
        };
        Ok(Feature {
            c_feature,
            _layer: PhantomData,
        })
    }

    /// Wraps a feature handle returned by OGR.
    ///
    /// # Safety
    /// The handle must be valid and owned by the caller.
    pub(crate) unsafe fn from_c_feature(c_feature: OGRFeatureH) -> Feature<'a> {
        Feature {
            c_feature,
            _layer: PhantomData,
        }
    }

    /// Returns the wrapped C pointer
    ///
    /// # Safety
    /// This method returns a raw C pointer
    pub unsafe fn c_feature(&self) -> OGRFeatureH {
        self.c_feature
    }

    pub(crate) fn c_defn(&self) -> OGRFeatureDefnH {
        unsafe { gdal_sys::OGR_F_GetDefnRef(self.c_feature) }
    }

    /// The schema this feature conforms to.
    pub fn schema(&self) -> Schema {
        unsafe { Schema::from_c_defn(self.c_defn()) }
    }

    /// The feature id, if the provider assigned one.
    pub fn fid(&self) -> Option<u64> {
        let fid = unsafe { gdal_sys::OGR_F_GetFID(self.c_feature) };
        if fid < 0 {
            None
        } else {
            Some(fid as u64)
        }
    }

    /// A key is usable on this feature only if the field at its index has
    /// the key's name and type.
    fn check_key(&self, key: &FieldKey) -> Result<()> {
        let count = unsafe { gdal_sys::OGR_F_GetFieldCount(self.c_feature) };
        if key.c_index() < count {
            let c_field_defn =
                unsafe { gdal_sys::OGR_F_GetFieldDefnRef(self.c_feature, key.c_index()) };
            if !c_field_defn.is_null() {
                let name = _string(unsafe { gdal_sys::OGR_Fld_GetNameRef(c_field_defn) });
                let field_type: FieldType =
                    unsafe { gdal_sys::OGR_Fld_GetType(c_field_defn) }.into();
                if name == key.name() && field_type == key.field_type() {
                    return Ok(());
                }
            }
        }
        Err(GdalError::InvalidFieldName {
            field_name: key.name().to_string(),
            method_name: "OGR_F_GetFieldDefnRef",
        })
    }

    /// Read an integer attribute. Returns `None` when the field is unset or null.
    pub fn field_as_integer64(&self, key: &FieldKey) -> Result<Option<i64>> {
        self.check_key(key)?;
        let idx = key.c_index();
        if unsafe { gdal_sys::OGR_F_IsFieldSetAndNotNull(self.c_feature, idx) } == 0 {
            return Ok(None);
        }
        Ok(Some(unsafe {
            gdal_sys::OGR_F_GetFieldAsInteger64(self.c_feature, idx)
        }))
    }

    pub fn set_field_integer(&mut self, key: &FieldKey, value: i32) -> Result<()> {
        self.check_key(key)?;
        unsafe { gdal_sys::OGR_F_SetFieldInteger(self.c_feature, key.c_index(), value) };
        Ok(())
    }

    /// Copy every attribute of `other` whose name exists in this feature's
    /// schema. The geometry is left untouched.
    pub fn copy_fields_from(&mut self, other: &Feature) -> Result<()> {
        let geometry = self.geometry().map(|g| g.clone());
        let rv = unsafe { gdal_sys::OGR_F_SetFrom(self.c_feature, other.c_feature, 1) };
        if rv != OGRErr::OGRERR_NONE {
            return Err(GdalError::OgrError {
                err: rv,
                method_name: "OGR_F_SetFrom",
            });
        }
        match geometry {
            Some(geom) => self.set_geometry(geom),
            None => {
                self.clear_geometry();
                Ok(())
            }
        }
    }

    /// The geometry of this feature, or `None` when it has no geometry.
    pub fn geometry(&self) -> Option<GeometryRef<'_>> {
        let c_geom = unsafe { gdal_sys::OGR_F_GetGeometryRef(self.c_feature) };
        if c_geom.is_null() {
            None
        } else {
            Some(unsafe { GeometryRef::with_c_geometry(c_geom) })
        }
    }

    pub fn set_geometry(&mut self, geom: Geometry) -> Result<()> {
        let rv = unsafe { gdal_sys::OGR_F_SetGeometry(self.c_feature, geom.c_geometry()) };
        if rv != OGRErr::OGRERR_NONE {
            return Err(GdalError::OgrError {
                err: rv,
                method_name: "OGR_F_SetGeometry",
            });
        }
        Ok(())
    }

    pub fn clear_geometry(&mut self) {
        unsafe { gdal_sys::OGR_F_SetGeometryDirectly(self.c_feature, std::ptr::null_mut()) };
    }

    /// Append this feature to `layer`.
    pub fn create(&self, layer: &VectorLayer) -> Result<()> {
        let rv = unsafe { gdal_sys::OGR_L_CreateFeature(layer.c_layer(), self.c_feature) };
        if rv != OGRErr::OGRERR_NONE {
            return Err(GdalError::OgrError {
                err: rv,
                method_name: "OGR_L_CreateFeature",
            });
        }
        Ok(())
    }
}

impl Drop for Feature<'_> {
    fn drop(&mut self) {
        unsafe {
            gdal_sys::OGR_F_Destroy(self.c_feature);
        }
    }
}

impl Debug for Feature<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feature")
            .field("fid", &self.fid())
            .field("geometry", &self.geometry())
            .finish()
    }
}
