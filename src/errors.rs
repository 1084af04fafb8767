use libc::c_int;
use std::ffi::NulError;
use std::path::PathBuf;
use thiserror::Error;

use gdal_sys::{CPLErr, OGRErr, OGRFieldType};

pub type Result<T> = std::result::Result<T, GdalError>;

#[derive(Clone, Debug, Error)]
pub enum GdalError {
    #[error("FfiNulError")]
    FfiNulError(#[from] NulError),
    #[error("StrUtf8Error")]
    StrUtf8Error(#[from] std::str::Utf8Error),
    #[error("CPL error class: '{class:?}', error number: '{number}', error msg: '{msg}'")]
    CplError {
        class: CPLErr::Type,
        number: c_int,
        msg: String,
    },
    #[error("GDAL method '{method_name}' returned a NULL pointer. Error msg: '{msg}'")]
    NullPointer {
        method_name: &'static str,
        msg: String,
    },
    #[error("OGR method '{method_name}' returned error: '{err:?}'")]
    OgrError {
        err: OGRErr::Type,
        method_name: &'static str,
    },
    #[error("Unhandled type '{field_type:?}' on OGR method {method_name}")]
    UnhandledFieldType {
        field_type: OGRFieldType::Type,
        method_name: &'static str,
    },
    #[error("Invalid field name '{field_name}' used on method {method_name}")]
    InvalidFieldName {
        field_name: String,
        method_name: &'static str,
    },
    #[error("Value {value} of field '{field_name}' does not fit the target field type")]
    FieldOverflow { field_name: String, value: i64 },
    #[error("Unable to find driver '{name}'")]
    UnknownDriver { name: String },
    #[error("Unable to load layer from '{}': {msg}", path.display())]
    LoadError { path: PathBuf, msg: String },
    #[error("Unable to apply filter expression '{expression}': {msg}")]
    FilterError { expression: String, msg: String },
    #[error("Could not transform coordinates: from {from} to {to}{}", msg.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    InvalidCoordinateRange {
        from: String,
        to: String,
        msg: Option<String>,
    },
}
