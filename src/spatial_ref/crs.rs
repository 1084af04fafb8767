use gdal_sys::OGRSpatialReferenceH;

use crate::spatial_ref::SpatialRef;
use crate::utils::_last_err_msg;

/// The coordinate reference system attached to a layer.
///
/// Unlike [`SpatialRef`], a `Crs` can be invalid: building one from a
/// definition GDAL does not recognise succeeds and yields a `Crs` whose
/// [`srid`](Crs::srid) is `0`. Callers that care must check
/// [`is_valid`](Crs::is_valid).
///
/// ```
/// use gdal_processor::spatial_ref::Crs;
///
/// assert_eq!(Crs::from_user_input("EPSG:7683").srid(), 7683);
/// assert_eq!(Crs::from_user_input("epsg:1234").srid(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Crs {
    definition: String,
    srs: Option<SpatialRef>,
}

impl Crs {
    pub fn from_user_input(definition: &str) -> Crs {
        // Unrecognised codes are expected here, keep GDAL from printing them.
        unsafe { gdal_sys::CPLPushErrorHandler(Some(gdal_sys::CPLQuietErrorHandler)) };
        let srs = SpatialRef::from_definition(definition);
        unsafe { gdal_sys::CPLPopErrorHandler() };

        match srs {
            Ok(srs) => Crs {
                definition: definition.to_string(),
                srs: Some(srs),
            },
            Err(e) => {
                let msg = _last_err_msg();
                log::warn!("'{definition}' is not a known CRS, using an invalid one ({e}; {msg})");
                Crs {
                    definition: definition.to_string(),
                    srs: None,
                }
            }
        }
    }

    pub fn from_spatial_ref(srs: SpatialRef) -> Crs {
        Crs {
            definition: srs.authority().unwrap_or_default(),
            srs: Some(srs),
        }
    }

    /// A CRS carrying no spatial reference at all.
    pub fn invalid() -> Crs {
        Crs {
            definition: String::new(),
            srs: None,
        }
    }

    /// Wraps the spatial reference a layer reports, or an invalid `Crs` when
    /// the layer has none.
    ///
    /// # Safety
    /// The pointer must be NULL or a valid spatial reference handle.
    pub(crate) unsafe fn from_c_obj(c_obj: OGRSpatialReferenceH) -> Crs {
        if c_obj.is_null() {
            return Crs::invalid();
        }
        match SpatialRef::from_c_obj(c_obj) {
            Ok(srs) => Crs::from_spatial_ref(srs),
            Err(_) => Crs::invalid(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.srs.is_some()
    }

    /// The definition this CRS was built from.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    pub fn spatial_ref(&self) -> Option<&SpatialRef> {
        self.srs.as_ref()
    }

    /// The EPSG code of this CRS, or `0` when it is invalid or not an EPSG
    /// definition.
    pub fn srid(&self) -> i32 {
        self.srs
            .as_ref()
            .filter(|srs| {
                srs.auth_name()
                    .is_some_and(|name| name.eq_ignore_ascii_case("EPSG"))
            })
            .and_then(|srs| srs.auth_code().ok())
            .unwrap_or(0)
    }

    /// `authority:code`, or an empty string when unavailable.
    pub fn authid(&self) -> String {
        self.srs
            .as_ref()
            .and_then(|srs| srs.authority().ok())
            .unwrap_or_default()
    }
}

impl PartialEq for Crs {
    fn eq(&self, other: &Crs) -> bool {
        self.srs == other.srs
    }
}
