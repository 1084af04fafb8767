//! GDAL configuration and diagnostics
//!
//! GDAL reads runtime configuration from environment variables or from options
//! set through this module. Options set here override the environment.
//!
//! ```
//! use gdal_processor::config::*;
//!
//! set_config_option("OGR_GEOJSON_MAX_OBJ_SIZE", "0").unwrap();
//! assert_eq!(get_config_option("OGR_GEOJSON_MAX_OBJ_SIZE", "").unwrap(), "0");
//! clear_config_option("OGR_GEOJSON_MAX_OBJ_SIZE").unwrap();
//! ```
//!
//! GDAL writes its own diagnostics to stderr by default. Call
//! [`set_log_error_handler`] to route them through the [`log`] facade instead.

use gdal_sys::{CPLErr, CPLErrorNum};
use libc::c_char;
use std::ffi::CString;

use crate::errors::Result;
use crate::utils::_string;

/// Set a GDAL library configuration option.
///
/// Refer to [GDAL `ConfigOptions`](https://gdal.org/user/configoptions.html) for
/// a full list of options.
pub fn set_config_option(key: &str, value: &str) -> Result<()> {
    let c_key = CString::new(key.as_bytes())?;
    let c_val = CString::new(value.as_bytes())?;
    unsafe {
        gdal_sys::CPLSetConfigOption(c_key.as_ptr(), c_val.as_ptr());
    };
    Ok(())
}

/// Get the value of a GDAL library configuration option.
///
/// If `key` is not set, `default` is returned.
pub fn get_config_option(key: &str, default: &str) -> Result<String> {
    let c_key = CString::new(key.as_bytes())?;
    let c_default = CString::new(default.as_bytes())?;
    let rv = unsafe { gdal_sys::CPLGetConfigOption(c_key.as_ptr(), c_default.as_ptr()) };
    Ok(_string(rv))
}

/// Clear the value of a GDAL library configuration option.
pub fn clear_config_option(key: &str) -> Result<()> {
    let c_key = CString::new(key.as_bytes())?;
    unsafe {
        gdal_sys::CPLSetConfigOption(c_key.as_ptr(), ::std::ptr::null());
    };
    Ok(())
}

fn log_level(error_type: CPLErr::Type) -> log::Level {
    match error_type {
        CPLErr::CE_None => log::Level::Trace,
        CPLErr::CE_Debug => log::Level::Debug,
        CPLErr::CE_Warning => log::Level::Warn,
        _ => log::Level::Error,
    }
}

/// Route GDAL's error and debug messages to the `log` facade.
///
/// The handler is process wide. Thread-local handlers pushed with
/// `CPLPushErrorHandler` still take precedence.
pub fn set_log_error_handler() {
    unsafe extern "C" fn error_handler(
        error_type: CPLErr::Type,
        error_num: CPLErrorNum,
        error_msg_ptr: *const c_char,
    ) {
        let error_msg = _string(error_msg_ptr);
        log::log!(
            target: "gdal",
            log_level(error_type),
            "GDAL error {error_num}: {error_msg}"
        );
    }

    unsafe {
        gdal_sys::CPLSetErrorHandler(Some(error_handler));
    };
}

/// Restore GDAL's default stderr error handler.
pub fn remove_error_handler() {
    unsafe {
        gdal_sys::CPLSetErrorHandler(None);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_options() {
        // Config state is global to the process, so these run sequentially.

        test_set_get_option();

        test_set_option_with_embedded_nul();

        test_clear_option();
    }

    fn test_set_get_option() {
        assert!(set_config_option("GDAL_PROCESSOR_TEST", "128").is_ok());
        assert_eq!(
            get_config_option("GDAL_PROCESSOR_TEST", "").unwrap_or_default(),
            "128"
        );
        assert_eq!(
            get_config_option("NON_EXISTANT_OPTION", "DEFAULT_VALUE").unwrap_or_default(),
            "DEFAULT_VALUE"
        );
    }

    fn test_set_option_with_embedded_nul() {
        assert!(set_config_option("f\0oo", "valid").is_err());
        assert!(set_config_option("foo", "in\0valid").is_err());
    }

    fn test_clear_option() {
        assert!(set_config_option("GDAL_PROCESSOR_CLEAR", "256").is_ok());
        assert!(clear_config_option("GDAL_PROCESSOR_CLEAR").is_ok());
        assert_eq!(
            get_config_option("GDAL_PROCESSOR_CLEAR", "DEFAULT").unwrap_or_default(),
            "DEFAULT"
        );
    }

    #[test]
    fn test_log_error_handler_round_trip() {
        set_log_error_handler();
        let msg = CString::new("routed to log").unwrap();
        unsafe { gdal_sys::CPLError(CPLErr::CE_Warning, 1, msg.as_ptr()) };
        remove_error_handler();
        unsafe { gdal_sys::CPLErrorReset() };
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(log_level(CPLErr::CE_Debug), log::Level::Debug);
        assert_eq!(log_level(CPLErr::CE_Warning), log::Level::Warn);
        assert_eq!(log_level(CPLErr::CE_Failure), log::Level::Error);
        assert_eq!(log_level(CPLErr::CE_Fatal), log::Level::Error);
    }
}
