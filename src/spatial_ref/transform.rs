use gdal_sys::{CPLErr, OGRCoordinateTransformationH};
use libc::c_int;
use std::ptr::null_mut;

use crate::errors::{GdalError, Result};
use crate::spatial_ref::SpatialRef;
use crate::utils::{_last_cpl_err, _last_null_pointer_err};

/// Defines a coordinate transformation from one [`SpatialRef`] to another.
#[derive(Debug)]
pub struct CoordTransform {
    inner: OGRCoordinateTransformationH,
    from: String,
    to: String,
}

impl Drop for CoordTransform {
    fn drop(&mut self) {
        unsafe { gdal_sys::OCTDestroyCoordinateTransformation(self.inner) };
    }
}

fn describe(srs: &SpatialRef) -> String {
    srs.authority()
        .ok()
        .or_else(|| srs.name())
        .unwrap_or_else(|| "unknown".to_string())
}

impl CoordTransform {
    /// Constructs a new transformation from `source` to `target`.
    ///
    /// See: [OCTNewCoordinateTransformation](https://gdal.org/api/ogr_srs_api.html#_CPPv430OCTNewCoordinateTransformation20OGRSpatialReferenceH20OGRSpatialReferenceH)
    pub fn new(source: &SpatialRef, target: &SpatialRef) -> Result<CoordTransform> {
        let c_obj = unsafe {
            gdal_sys::OCTNewCoordinateTransformation(source.to_c_hsrs(), target.to_c_hsrs())
        };
        if c_obj.is_null() {
            return Err(_last_null_pointer_err("OCTNewCoordinateTransformation"));
        }
        Ok(Self {
            inner: c_obj,
            from: describe(source),
            to: describe(target),
        })
    }

    /// Transform coordinates in place.
    ///
    /// # Arguments
    /// * `x` - slice of x coordinates
    /// * `y` - slice of y coordinates (must match x in length)
    /// * `z` - slice of z coordinates, or an empty slice to ignore
    pub fn transform_coords(&self, x: &mut [f64], y: &mut [f64], z: &mut [f64]) -> Result<()> {
        let nb_coords = x.len();
        assert_eq!(
            nb_coords,
            y.len(),
            "transform coordinate slices have different lengths: {} != {}",
            nb_coords,
            y.len()
        );
        let ret_val = unsafe {
            gdal_sys::OCTTransform(
                self.inner,
                nb_coords as c_int,
                x.as_mut_ptr(),
                y.as_mut_ptr(),
                if z.is_empty() {
                    null_mut()
                } else {
                    assert_eq!(
                        nb_coords,
                        z.len(),
                        "transform coordinate slices have different lengths: {} != {}",
                        nb_coords,
                        z.len()
                    );
                    z.as_mut_ptr()
                },
            ) == 1
        };

        if ret_val {
            Ok(())
        } else {
            Err(self.range_error())
        }
    }

    /// Builds the error reported when a transformation fails, taking the
    /// last GDAL error message with it.
    pub(crate) fn range_error(&self) -> GdalError {
        let msg = match _last_cpl_err(CPLErr::CE_Failure) {
            GdalError::CplError { msg, .. } if !msg.trim().is_empty() => Some(msg),
            _ => None,
        };
        GdalError::InvalidCoordinateRange {
            from: self.from.clone(),
            to: self.to.clone(),
            msg,
        }
    }

    /// Returns a C pointer to the allocated [`gdal_sys::OGRCoordinateTransformationH`] memory.
    ///
    /// # Safety
    /// This method returns a raw C pointer
    pub unsafe fn to_c_hct(&self) -> OGRCoordinateTransformationH {
        self.inner
    }
}
