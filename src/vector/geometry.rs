use std::ffi::CString;
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::ops::Deref;
use std::ptr::{self, null_mut};

use gdal_sys::{self, OGREnvelope, OGRErr, OGRGeometryH, OGRwkbGeometryType};
use libc::c_char;

use crate::errors::*;
use crate::spatial_ref::CoordTransform;
use crate::utils::{_last_null_pointer_err, _string};
use crate::vector::ToGdal;

/// OGR Geometry
pub struct Geometry {
    c_geometry: OGRGeometryH,
    owned: bool,
}

impl Geometry {
    /// Create a new Geometry by wrapping a C pointer.
    ///
    /// # Safety
    /// The pointer must be a valid geometry. When `owned` is true the
    /// geometry is destroyed on drop.
    pub unsafe fn with_c_geometry(c_geom: OGRGeometryH, owned: bool) -> Geometry {
        Geometry {
            c_geometry: c_geom,
            owned,
        }
    }

    /// Create an empty geometry of the given type.
    pub fn empty(wkb_type: OGRwkbGeometryType::Type) -> Result<Geometry> {
        let c_geom = unsafe { gdal_sys::OGR_G_CreateGeometry(wkb_type) };
        if c_geom.is_null() {
            return Err(_last_null_pointer_err("OGR_G_CreateGeometry"));
        };
        Ok(unsafe { Geometry::with_c_geometry(c_geom, true) })
    }

    /// Create a geometry by parsing a
    /// [WKT](https://en.wikipedia.org/wiki/Well-known_text) string.
    pub fn from_wkt(wkt: &str) -> Result<Geometry> {
        let c_wkt = CString::new(wkt)?;
        // OGR_G_CreateFromWkt advances this pointer, keep `c_wkt` alive for it
        let mut c_wkt_ptr = c_wkt.as_ptr() as *mut c_char;
        let mut c_geom = null_mut();
        let rv = unsafe { gdal_sys::OGR_G_CreateFromWkt(&mut c_wkt_ptr, null_mut(), &mut c_geom) };
        if rv != OGRErr::OGRERR_NONE {
            return Err(GdalError::OgrError {
                err: rv,
                method_name: "OGR_G_CreateFromWkt",
            });
        }
        Ok(unsafe { Geometry::with_c_geometry(c_geom, true) })
    }

    /// Returns a C pointer to the wrapped geometry.
    ///
    /// # Safety
    /// This method returns a raw C pointer
    pub unsafe fn c_geometry(&self) -> OGRGeometryH {
        self.c_geometry
    }

    /// Serialize the geometry as WKT.
    pub fn wkt(&self) -> Result<String> {
        let mut c_wkt = null_mut();
        let rv = unsafe { gdal_sys::OGR_G_ExportToWkt(self.c_geometry, &mut c_wkt) };
        if rv != OGRErr::OGRERR_NONE {
            return Err(GdalError::OgrError {
                err: rv,
                method_name: "OGR_G_ExportToWkt",
            });
        }
        let wkt = _string(c_wkt);
        unsafe { gdal_sys::VSIFree(c_wkt.cast()) };
        Ok(wkt)
    }

    pub fn geometry_type(&self) -> OGRwkbGeometryType::Type {
        unsafe { gdal_sys::OGR_G_GetGeometryType(self.c_geometry) }
    }

    pub fn is_empty(&self) -> bool {
        unsafe { gdal_sys::OGR_G_IsEmpty(self.c_geometry) == 1 }
    }

    /// The bounding rectangle of this geometry.
    pub fn envelope(&self) -> geo_types::Rect<f64> {
        let mut envelope = OGREnvelope {
            MinX: 0.0,
            MaxX: 0.0,
            MinY: 0.0,
            MaxY: 0.0,
        };
        unsafe { gdal_sys::OGR_G_GetEnvelope(self.c_geometry, &mut envelope) };
        geo_types::Rect::new(
            geo_types::coord! { x: envelope.MinX, y: envelope.MinY },
            geo_types::coord! { x: envelope.MaxX, y: envelope.MaxY },
        )
    }

    /// The coordinate of a non-empty point geometry.
    pub fn coord(&self) -> Option<geo_types::Coord<f64>> {
        let flat = unsafe { gdal_sys::OGR_GT_Flatten(self.geometry_type()) };
        if flat != OGRwkbGeometryType::wkbPoint || self.is_empty() {
            return None;
        }
        let x = unsafe { gdal_sys::OGR_G_GetX(self.c_geometry, 0) };
        let y = unsafe { gdal_sys::OGR_G_GetY(self.c_geometry, 0) };
        Some(geo_types::coord! { x: x, y: y })
    }

    /// Apply a coordinate transformation to this geometry in place.
    ///
    /// See: [`OGR_G_Transform`](https://gdal.org/api/vector_c_api.html#_CPPv415OGR_G_Transform12OGRGeometryH28OGRCoordinateTransformationH)
    pub fn transform_inplace(&mut self, htransform: &CoordTransform) -> Result<()> {
        let rv = unsafe { gdal_sys::OGR_G_Transform(self.c_geometry, htransform.to_c_hct()) };
        if rv != OGRErr::OGRERR_NONE {
            return Err(htransform.range_error());
        }
        Ok(())
    }

    /// Compute buffer of geometry
    ///
    /// # Arguments
    /// * `distance`: the buffer distance to be applied. Should be expressed in
    ///   the same unit as the coordinates of the geometry.
    /// * `n_quad_segs` specifies the number of segments used to approximate a
    ///   90 degree (quadrant) of curvature.
    ///
    /// This requires GDAL to be built with GEOS.
    ///
    /// See: [`OGR_G_Buffer`](https://gdal.org/api/vector_c_api.html#_CPPv412OGR_G_Buffer12OGRGeometryHdi)
    pub fn buffer(&self, distance: f64, n_quad_segs: u32) -> Result<Geometry> {
        let c_geom =
            unsafe { gdal_sys::OGR_G_Buffer(self.c_geometry, distance, n_quad_segs as i32) };
        if c_geom.is_null() {
            return Err(_last_null_pointer_err("OGR_G_Buffer"));
        };
        Ok(unsafe { Geometry::with_c_geometry(c_geom, true) })
    }

    pub fn area(&self) -> f64 {
        unsafe { gdal_sys::OGR_G_Area(self.c_geometry) }
    }
}

impl Drop for Geometry {
    fn drop(&mut self) {
        if self.owned {
            unsafe { gdal_sys::OGR_G_DestroyGeometry(self.c_geometry) };
            self.c_geometry = ptr::null_mut();
        }
    }
}

impl Clone for Geometry {
    fn clone(&self) -> Geometry {
        let c_geom = unsafe { gdal_sys::OGR_G_Clone(self.c_geometry) };
        unsafe { Geometry::with_c_geometry(c_geom, true) }
    }
}

impl Debug for Geometry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.wkt() {
            Ok(wkt) => f.write_str(wkt.as_str()),
            Err(_) => Err(fmt::Error),
        }
    }
}

/// A geometry borrowed from a [`Feature`](crate::vector::Feature). It is
/// never destroyed by this crate and cannot outlive its feature.
pub struct GeometryRef<'a> {
    geom: Geometry,
    _owner: PhantomData<&'a ()>,
}

impl GeometryRef<'_> {
    /// # Safety
    /// `c_geom` must stay valid for the chosen lifetime.
    pub(crate) unsafe fn with_c_geometry<'a>(c_geom: OGRGeometryH) -> GeometryRef<'a> {
        GeometryRef {
            geom: Geometry::with_c_geometry(c_geom, false),
            _owner: PhantomData,
        }
    }
}

impl Deref for GeometryRef<'_> {
    type Target = Geometry;

    fn deref(&self) -> &Geometry {
        &self.geom
    }
}

impl Debug for GeometryRef<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.geom, f)
    }
}

impl ToGdal for geo_types::Coord<f64> {
    fn to_gdal(&self) -> Result<Geometry> {
        let geom = Geometry::empty(OGRwkbGeometryType::wkbPoint)?;
        unsafe { gdal_sys::OGR_G_SetPoint_2D(geom.c_geometry(), 0, self.x, self.y) };
        Ok(geom)
    }
}

impl ToGdal for geo_types::Point<f64> {
    fn to_gdal(&self) -> Result<Geometry> {
        self.0.to_gdal()
    }
}
