use super::{CoordTransform, Crs, SpatialRef};
use crate::assert_near;
use crate::errors::GdalError;
use crate::test_utils::SuppressGDALErrorLog;

#[test]
fn from_definition_epsg() {
    let spatial_ref = SpatialRef::from_definition("EPSG:4326").unwrap();
    assert_eq!(spatial_ref.auth_name().as_deref(), Some("EPSG"));
    assert_eq!(spatial_ref.auth_code().unwrap(), 4326);
    assert_eq!(spatial_ref.authority().unwrap(), "EPSG:4326");
    assert!(spatial_ref.to_wkt().unwrap().contains("WGS 84"));
}

#[test]
fn from_definition_is_case_insensitive() {
    let upper = SpatialRef::from_definition("EPSG:7683").unwrap();
    let lower = SpatialRef::from_definition("epsg:7683").unwrap();
    assert_eq!(upper, lower);
    assert_eq!(lower.auth_code().unwrap(), 7683);
}

#[test]
fn from_definition_unknown_code() {
    let _nolog = SuppressGDALErrorLog::new();
    let err = SpatialRef::from_definition("epsg:1234").unwrap_err();
    assert!(matches!(
        err,
        GdalError::OgrError {
            method_name: "OSRSetFromUserInput",
            ..
        }
    ));
}

#[test]
fn comparison() {
    let spatial_ref1 = SpatialRef::from_definition("EPSG:4326").unwrap();
    let spatial_ref2 = SpatialRef::from_epsg(4326).unwrap();
    let spatial_ref3 = SpatialRef::from_epsg(3857).unwrap();
    assert_eq!(spatial_ref1, spatial_ref2);
    assert_ne!(spatial_ref2, spatial_ref3);
    assert_eq!(spatial_ref3.clone(), spatial_ref3);
}

#[test]
fn transform_coordinates_in_gis_order() {
    let wgs84 = SpatialRef::from_epsg(4326).unwrap();
    let webmercator = SpatialRef::from_epsg(3857).unwrap();
    let transform = CoordTransform::new(&wgs84, &webmercator).unwrap();

    // longitude first
    let mut xs = [37.6173];
    let mut ys = [55.7558];
    transform.transform_coords(&mut xs, &mut ys, &mut []).unwrap();
    assert_near!(xs[0], 4187538.68, epsilon = 1.0);
    assert_near!(ys[0], 7509955.14, epsilon = 1.0);
}

#[test]
fn failing_transformation() {
    let _nolog = SuppressGDALErrorLog::new();
    let wgs84 = SpatialRef::from_epsg(4326).unwrap();
    let webmercator = SpatialRef::from_epsg(3857).unwrap();

    let mut x = [1000000.0];
    let mut y = [1000000.0];

    let trafo = CoordTransform::new(&wgs84, &webmercator).unwrap();
    let r = trafo.transform_coords(&mut x, &mut y, &mut []);

    match r {
        Err(GdalError::InvalidCoordinateRange { from, to, .. }) => {
            assert_eq!(from, "EPSG:4326");
            assert_eq!(to, "EPSG:3857");
        }
        other => panic!("Wrong result: {other:?}"),
    }
}

#[test]
fn crs_valid() {
    let crs = Crs::from_user_input("EPSG:7683");
    assert!(crs.is_valid());
    assert_eq!(crs.srid(), 7683);
    assert_eq!(crs.authid(), "EPSG:7683");
    assert_eq!(crs.definition(), "EPSG:7683");
}

#[test]
fn crs_unknown_code_degrades() {
    let crs = Crs::from_user_input("epsg:1234");
    assert!(!crs.is_valid());
    assert_eq!(crs.srid(), 0);
    assert_eq!(crs.authid(), "");
    assert!(crs.spatial_ref().is_none());
    assert_eq!(crs.definition(), "epsg:1234");
}

#[test]
fn crs_without_epsg_authority() {
    let crs = Crs::from_user_input("+proj=longlat +ellps=GRS80 +no_defs");
    assert!(crs.is_valid());
    assert_eq!(crs.srid(), 0);
}

#[test]
fn crs_equality() {
    let a = Crs::from_user_input("EPSG:4326");
    let b = Crs::from_spatial_ref(SpatialRef::from_epsg(4326).unwrap());
    assert_eq!(a, b);
    assert_eq!(Crs::invalid(), Crs::from_user_input("epsg:1234"));
    assert_ne!(a, Crs::invalid());
}
