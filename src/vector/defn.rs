use gdal_sys::{self, OGRFeatureDefnH, OGRFieldType};
use libc::c_int;

use crate::errors::*;
use crate::utils::_string;

/// The attribute type of a field, as far as this crate distinguishes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Integer64,
    Real,
    String,
    Other(OGRFieldType::Type),
}

impl From<OGRFieldType::Type> for FieldType {
    fn from(ty: OGRFieldType::Type) -> Self {
        match ty {
            OGRFieldType::OFTInteger => FieldType::Integer,
            OGRFieldType::OFTInteger64 => FieldType::Integer64,
            OGRFieldType::OFTReal => FieldType::Real,
            OGRFieldType::OFTString => FieldType::String,
            other => FieldType::Other(other),
        }
    }
}

impl FieldType {
    pub fn to_ogr(self) -> OGRFieldType::Type {
        match self {
            FieldType::Integer => OGRFieldType::OFTInteger,
            FieldType::Integer64 => OGRFieldType::OFTInteger64,
            FieldType::Real => OGRFieldType::OFTReal,
            FieldType::String => OGRFieldType::OFTString,
            FieldType::Other(ty) => ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefn {
    name: String,
    field_type: FieldType,
}

impl FieldDefn {
    pub fn new(name: &str, field_type: FieldType) -> FieldDefn {
        FieldDefn {
            name: name.to_string(),
            field_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }
}

/// An attribute resolved against a [`Schema`].
///
/// Features are read and written through keys rather than field names, so a
/// misspelt or mistyped field fails once, when the key is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKey {
    index: c_int,
    name: String,
    field_type: FieldType,
}

impl FieldKey {
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub(crate) fn c_index(&self) -> c_int {
        self.index
    }
}

/// A snapshot of the ordered attribute fields of a layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    fields: Vec<FieldDefn>,
}

impl Schema {
    pub fn new(fields: Vec<FieldDefn>) -> Schema {
        Schema { fields }
    }

    /// Reads the fields of a feature definition.
    ///
    /// # Safety
    /// `c_defn` must be a valid feature definition handle.
    pub(crate) unsafe fn from_c_defn(c_defn: OGRFeatureDefnH) -> Schema {
        let total = gdal_sys::OGR_FD_GetFieldCount(c_defn);
        let fields = (0..total)
            .map(|idx| {
                let c_field_defn = gdal_sys::OGR_FD_GetFieldDefn(c_defn, idx);
                FieldDefn {
                    name: _string(gdal_sys::OGR_Fld_GetNameRef(c_field_defn)),
                    field_type: gdal_sys::OGR_Fld_GetType(c_field_defn).into(),
                }
            })
            .collect();
        Schema { fields }
    }

    pub fn fields(&self) -> &[FieldDefn] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldDefn::name)
    }

    /// Resolve `name` to a key, whatever its type.
    pub fn field(&self, name: &str) -> Result<FieldKey> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .map(|idx| FieldKey {
                index: idx as c_int,
                name: name.to_string(),
                field_type: self.fields[idx].field_type,
            })
            .ok_or_else(|| GdalError::InvalidFieldName {
                field_name: name.to_string(),
                method_name: "Schema::field",
            })
    }

    /// Resolve `name` to a key, requiring a 32 or 64 bit integer field.
    pub fn integer_field(&self, name: &str) -> Result<FieldKey> {
        let key = self.field(name)?;
        match key.field_type {
            FieldType::Integer | FieldType::Integer64 => Ok(key),
            other => Err(GdalError::UnhandledFieldType {
                field_type: other.to_ogr(),
                method_name: "Schema::integer_field",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cities() -> Schema {
        Schema::new(vec![
            FieldDefn::new("name", FieldType::String),
            FieldDefn::new("population", FieldType::Integer64),
            FieldDefn::new("area", FieldType::Real),
        ])
    }

    #[test]
    fn test_resolve_integer_field() {
        let key = cities().integer_field("population").unwrap();
        assert_eq!(key.index(), 1);
        assert_eq!(key.name(), "population");
        assert_eq!(key.field_type(), FieldType::Integer64);
    }

    #[test]
    fn test_missing_field() {
        assert!(matches!(
            cities().integer_field("populaton"),
            Err(GdalError::InvalidFieldName { field_name, .. }) if field_name == "populaton"
        ));
    }

    #[test]
    fn test_wrong_field_type() {
        assert!(matches!(
            cities().integer_field("area"),
            Err(GdalError::UnhandledFieldType {
                field_type: OGRFieldType::OFTReal,
                ..
            })
        ));
        assert!(cities().field("area").is_ok());
    }

    #[test]
    fn test_names() {
        let schema = cities();
        let names: Vec<&str> = schema.names().collect();
        assert_eq!(names, ["name", "population", "area"]);
        assert_eq!(cities().len(), 3);
        assert_eq!(
            cities().fields()[2],
            FieldDefn::new("area", FieldType::Real)
        );
        assert!(Schema::default().is_empty());
    }

    #[test]
    fn test_field_type_mapping() {
        assert_eq!(FieldType::from(OGRFieldType::OFTInteger), FieldType::Integer);
        assert_eq!(
            FieldType::from(OGRFieldType::OFTDate),
            FieldType::Other(OGRFieldType::OFTDate)
        );
        assert_eq!(FieldType::Real.to_ogr(), OGRFieldType::OFTReal);
    }
}
