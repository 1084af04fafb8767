use std::ffi::{CStr, CString};
use std::ptr;
use std::str::FromStr;

use gdal_sys::{self, OGRErr, OGRSpatialReferenceH, OSRAxisMappingStrategy};
use libc::{c_char, c_int};

use crate::errors::*;
use crate::utils::{_last_null_pointer_err, _option_string, _string};

/// An OGR spatial reference system.
///
/// Every constructor switches the axis mapping to traditional GIS order
/// (longitude, latitude), which is the order geometries are stored in.
#[derive(Debug)]
pub struct SpatialRef(OGRSpatialReferenceH);

impl Drop for SpatialRef {
    fn drop(&mut self) {
        unsafe { gdal_sys::OSRRelease(self.0) };
        self.0 = ptr::null_mut();
    }
}

impl Clone for SpatialRef {
    fn clone(&self) -> SpatialRef {
        let n_obj = unsafe { gdal_sys::OSRClone(self.0) };
        SpatialRef(n_obj)
    }
}

impl PartialEq for SpatialRef {
    fn eq(&self, other: &SpatialRef) -> bool {
        unsafe { gdal_sys::OSRIsSame(self.0, other.0) == 1 }
    }
}

impl SpatialRef {
    /// Builds a reference from anything `OSRSetFromUserInput` accepts, such
    /// as `EPSG:4326`, a WKT string or a PROJ string.
    pub fn from_definition(definition: &str) -> Result<SpatialRef> {
        let c_definition = CString::new(definition)?;
        let c_obj = unsafe { gdal_sys::OSRNewSpatialReference(ptr::null()) };
        if c_obj.is_null() {
            return Err(_last_null_pointer_err("OSRNewSpatialReference"));
        }
        let rv = unsafe { gdal_sys::OSRSetFromUserInput(c_obj, c_definition.as_ptr()) };
        if rv != OGRErr::OGRERR_NONE {
            unsafe { gdal_sys::OSRRelease(c_obj) };
            return Err(GdalError::OgrError {
                err: rv,
                method_name: "OSRSetFromUserInput",
            });
        }
        Ok(SpatialRef::with_gis_axis_order(c_obj))
    }

    pub fn from_epsg(epsg_code: u32) -> Result<SpatialRef> {
        let c_obj = unsafe { gdal_sys::OSRNewSpatialReference(ptr::null()) };
        if c_obj.is_null() {
            return Err(_last_null_pointer_err("OSRNewSpatialReference"));
        }
        let rv = unsafe { gdal_sys::OSRImportFromEPSG(c_obj, epsg_code as c_int) };
        if rv != OGRErr::OGRERR_NONE {
            unsafe { gdal_sys::OSRRelease(c_obj) };
            return Err(GdalError::OgrError {
                err: rv,
                method_name: "OSRImportFromEPSG",
            });
        }
        Ok(SpatialRef::with_gis_axis_order(c_obj))
    }

    /// Creates a new SpatialRef by cloning a borrowed C pointer.
    ///
    /// # Safety
    /// The pointer must be a valid spatial reference handle.
    pub unsafe fn from_c_obj(c_obj: OGRSpatialReferenceH) -> Result<SpatialRef> {
        let mut_c_obj = gdal_sys::OSRClone(c_obj);
        if mut_c_obj.is_null() {
            return Err(_last_null_pointer_err("OSRClone"));
        }
        Ok(SpatialRef::with_gis_axis_order(mut_c_obj))
    }

    fn with_gis_axis_order(c_obj: OGRSpatialReferenceH) -> SpatialRef {
        unsafe {
            gdal_sys::OSRSetAxisMappingStrategy(
                c_obj,
                OSRAxisMappingStrategy::OAMS_TRADITIONAL_GIS_ORDER,
            )
        };
        SpatialRef(c_obj)
    }

    pub fn name(&self) -> Option<String> {
        _option_string(unsafe { gdal_sys::OSRGetName(self.0) })
    }

    pub fn to_wkt(&self) -> Result<String> {
        let mut c_wkt: *mut c_char = ptr::null_mut();
        let rv = unsafe { gdal_sys::OSRExportToWkt(self.0, &mut c_wkt) };
        let res = if rv != OGRErr::OGRERR_NONE {
            Err(GdalError::OgrError {
                err: rv,
                method_name: "OSRExportToWkt",
            })
        } else {
            Ok(_string(c_wkt))
        };
        unsafe { gdal_sys::VSIFree(c_wkt.cast()) };
        res
    }

    /// The authority name of the root node, e.g. `EPSG`.
    pub fn auth_name(&self) -> Option<String> {
        _option_string(unsafe { gdal_sys::OSRGetAuthorityName(self.0, ptr::null()) })
    }

    /// The authority code of the root node, e.g. `4326`.
    pub fn auth_code(&self) -> Result<i32> {
        let c_ptr = unsafe { gdal_sys::OSRGetAuthorityCode(self.0, ptr::null()) };
        if c_ptr.is_null() {
            return Err(_last_null_pointer_err("OSRGetAuthorityCode"));
        }
        let c_str = unsafe { CStr::from_ptr(c_ptr) };
        i32::from_str(c_str.to_str()?).map_err(|_| GdalError::OgrError {
            err: OGRErr::OGRERR_UNSUPPORTED_SRS,
            method_name: "OSRGetAuthorityCode",
        })
    }

    /// `authority:code`, e.g. `EPSG:4326`.
    pub fn authority(&self) -> Result<String> {
        let name = self
            .auth_name()
            .ok_or_else(|| _last_null_pointer_err("OSRGetAuthorityName"))?;
        Ok(format!("{}:{}", name, self.auth_code()?))
    }

    /// Returns a C pointer to the allocated [`gdal_sys::OGRSpatialReferenceH`] memory.
    ///
    /// # Safety
    /// This method returns a raw C pointer
    pub unsafe fn to_c_hsrs(&self) -> OGRSpatialReferenceH {
        self.0
    }
}
