use std::ffi::CString;
use std::path::Path;
use std::ptr::{self, null_mut};

use gdal_sys::{self, GDALDatasetH, OGRLayerH, OGRwkbGeometryType};
use libc::c_int;

use crate::driver::_register_drivers;
use crate::errors::*;
use crate::spatial_ref::SpatialRef;
use crate::utils::{_last_null_pointer_err, _path_to_c_string};

// `GDALOpenEx` flags from gdal.h; these are C macros that gdal-sys does not export.
const GDAL_OF_READONLY: libc::c_uint = 0x00;
const GDAL_OF_VECTOR: libc::c_uint = 0x04;
const GDAL_OF_VERBOSE_ERROR: libc::c_uint = 0x40;

/// Parameters for [`Dataset::create_layer`].
#[derive(Debug, Default)]
pub struct LayerOptions<'a> {
    /// The name of the new layer.
    pub name: &'a str,
    /// The spatial reference of the geometry field, if any.
    pub srs: Option<&'a SpatialRef>,
    /// The geometry type, `wkbUnknown` when left as default.
    pub ty: OGRwkbGeometryType::Type,
}

/// An open GDAL dataset. The underlying handle is closed on drop, which also
/// releases every layer it owns.
#[derive(Debug)]
pub struct Dataset {
    c_dataset: GDALDatasetH,
}

impl Dataset {
    /// Open the vector dataset at `path`, letting GDAL pick the driver.
    pub fn open_vector(path: &Path) -> Result<Dataset> {
        _register_drivers();
        let c_filename = _path_to_c_string(path)?;
        let open_flags =
            GDAL_OF_VECTOR | GDAL_OF_READONLY | GDAL_OF_VERBOSE_ERROR;
        let c_dataset = unsafe {
            gdal_sys::GDALOpenEx(
                c_filename.as_ptr(),
                open_flags,
                ptr::null(),
                ptr::null(),
                ptr::null(),
            )
        };
        if c_dataset.is_null() {
            return Err(_last_null_pointer_err("GDALOpenEx"));
        }
        log::debug!("opened vector dataset {}", path.display());
        Ok(Dataset { c_dataset })
    }

    /// Creates a new Dataset by wrapping a C pointer
    ///
    /// # Safety
    /// The pointer must be a valid, owned dataset handle.
    pub unsafe fn from_c_dataset(c_dataset: GDALDatasetH) -> Dataset {
        Dataset { c_dataset }
    }

    /// Returns the wrapped C pointer
    ///
    /// # Safety
    /// This method returns a raw C pointer
    pub unsafe fn c_dataset(&self) -> GDALDatasetH {
        self.c_dataset
    }

    pub fn layer_count(&self) -> isize {
        (unsafe { gdal_sys::OGR_DS_GetLayerCount(self.c_dataset) }) as isize
    }

    /// Returns the handle of layer number `idx`. The handle stays owned by
    /// this dataset.
    pub(crate) fn layer_handle(&self, idx: isize) -> Result<OGRLayerH> {
        let c_layer = unsafe { gdal_sys::OGR_DS_GetLayer(self.c_dataset, idx as c_int) };
        if c_layer.is_null() {
            return Err(_last_null_pointer_err("OGR_DS_GetLayer"));
        }
        Ok(c_layer)
    }

    /// Create a new layer. The handle stays owned by this dataset.
    pub(crate) fn create_layer(&mut self, options: LayerOptions<'_>) -> Result<OGRLayerH> {
        let c_name = CString::new(options.name)?;
        let c_srs = match options.srs {
            Some(srs) => unsafe { srs.to_c_hsrs() },
            None => null_mut(),
        };
        let c_layer = unsafe {
            gdal_sys::GDALDatasetCreateLayer(
                self.c_dataset,
                c_name.as_ptr(),
                c_srs,
                options.ty,
                null_mut(),
            )
        };
        if c_layer.is_null() {
            return Err(_last_null_pointer_err("GDALDatasetCreateLayer"));
        };
        Ok(c_layer)
    }
}

impl Drop for Dataset {
    fn drop(&mut self) {
        unsafe {
            gdal_sys::GDALClose(self.c_dataset);
        }
    }
}
