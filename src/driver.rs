use gdal_sys::{self, GDALDataType, GDALDriverH};
use std::ffi::CString;
use std::ptr::null_mut;
use std::sync::Once;

use crate::dataset::Dataset;
use crate::errors::*;
use crate::utils::{_last_null_pointer_err, _string};

static START: Once = Once::new();

pub fn _register_drivers() {
    START.call_once(|| unsafe {
        gdal_sys::GDALAllRegister();
    });
}

/// Names under which GDAL exposes its in-memory vector driver. GDAL 3.11
/// folded `Memory` into `MEM`, older releases only know `Memory`.
const MEMORY_DRIVER_NAMES: [&str; 2] = ["Memory", "MEM"];

#[allow(missing_copy_implementations)]
pub struct Driver {
    c_driver: GDALDriverH,
}

impl Driver {
    /// Returns the driver with the given short name.
    pub fn get_by_name(name: &str) -> Result<Driver> {
        _register_drivers();
        let c_name = CString::new(name)?;
        let c_driver = unsafe { gdal_sys::GDALGetDriverByName(c_name.as_ptr()) };
        if c_driver.is_null() {
            unsafe { gdal_sys::CPLErrorReset() };
            return Err(GdalError::UnknownDriver {
                name: name.to_string(),
            });
        };
        Ok(Driver { c_driver })
    }

    /// Returns the driver used to build in-memory vector layers.
    pub fn memory() -> Result<Driver> {
        let mut last_err = None;
        for name in MEMORY_DRIVER_NAMES {
            match Driver::get_by_name(name) {
                Ok(driver) if driver.supports_vector() => return Ok(driver),
                Ok(_) => {}
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| GdalError::UnknownDriver {
            name: MEMORY_DRIVER_NAMES.join("|"),
        }))
    }

    pub fn short_name(&self) -> String {
        let rv = unsafe { gdal_sys::GDALGetDriverShortName(self.c_driver) };
        _string(rv)
    }

    fn supports_vector(&self) -> bool {
        let key = c"DCAP_VECTOR";
        let rv = unsafe {
            gdal_sys::GDALGetMetadataItem(self.c_driver as _, key.as_ptr(), std::ptr::null())
        };
        !rv.is_null()
    }

    /// Creates a dataset without raster bands, for holding vector layers.
    pub fn create_vector_only(&self, filename: &str) -> Result<Dataset> {
        let c_filename = CString::new(filename)?;
        let c_dataset = unsafe {
            gdal_sys::GDALCreate(
                self.c_driver,
                c_filename.as_ptr(),
                0,
                0,
                0,
                GDALDataType::GDT_Unknown,
                null_mut(),
            )
        };

        if c_dataset.is_null() {
            return Err(_last_null_pointer_err("GDALCreate"));
        };

        log::debug!(
            "created vector dataset '{filename}' with driver {}",
            self.short_name()
        );
        Ok(unsafe { Dataset::from_c_dataset(c_dataset) })
    }
}
