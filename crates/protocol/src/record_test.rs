//! Tests for line parsing

use crate::error::{ParseError, ParseErrorKind};
use crate::record::{Record, parse_line};

// =============================================================================
// Valid lines
// =============================================================================

#[test]
fn test_parse_valid_line() {
    let record = parse_line("idfa\t1rfw452y52g2gq4g\t55.55\t42.42\t1423,43,567,3,7,23").unwrap();

    assert_eq!(
        record,
        Record {
            device_type: "idfa".into(),
            device_id: "1rfw452y52g2gq4g".into(),
            lat: 55.55,
            lon: 42.42,
            apps: vec![1423, 43, 567, 3, 7, 23],
        }
    );
}

#[test]
fn test_parse_empty_apps_is_empty_list() {
    let record = parse_line("gaid\tabc\t1.0\t2.0\t").unwrap();
    assert!(record.apps.is_empty());
}

#[test]
fn test_parse_single_app() {
    let record = parse_line("adid\tabc\t0\t0\t42").unwrap();
    assert_eq!(record.apps, vec![42]);
}

#[test]
fn test_parse_extra_fields_ignored() {
    let record = parse_line("dvid\tabc\t1\t2\t3,4\textra\tmore").unwrap();
    assert_eq!(record.device_type, "dvid");
    assert_eq!(record.apps, vec![3, 4]);
}

#[test]
fn test_parse_negative_coordinates() {
    let record = parse_line("idfa\tabc\t-33.86\t-151.2\t1").unwrap();
    assert_eq!(record.lat, -33.86);
    assert_eq!(record.lon, -151.2);
}

#[test]
fn test_parse_app_tokens_with_spaces() {
    let record = parse_line("idfa\tabc\t1\t2\t1, 2 ,3").unwrap();
    assert_eq!(record.apps, vec![1, 2, 3]);
}

#[test]
fn test_parse_max_app_id() {
    let record = parse_line("idfa\tabc\t1\t2\t4294967295").unwrap();
    assert_eq!(record.apps, vec![u32::MAX]);
}

#[test]
fn test_record_key() {
    let record = parse_line("idfa\tid1\t55.5\t37.5\t1,2,3").unwrap();
    assert_eq!(record.key(), "idfa:id1");
}

// =============================================================================
// MalformedLine
// =============================================================================

#[test]
fn test_parse_too_few_fields() {
    for line in ["", "idfa", "idfa\tabc", "idfa\tabc\t1", "idfa\tabc\t1\t2"] {
        let err = parse_line(line).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::MalformedLine, "line: {line:?}");
    }
}

#[test]
fn test_parse_malformed_reports_field_count() {
    let err = parse_line("idfa\tabc\t1").unwrap_err();
    assert_eq!(
        err,
        ParseError::MalformedLine {
            expected: 5,
            actual: 3
        }
    );
}

#[test]
fn test_parse_space_separated_is_malformed() {
    let err = parse_line("idfa abc 1 2 3").unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::MalformedLine);
}

// =============================================================================
// MissingIdentity
// =============================================================================

#[test]
fn test_parse_empty_device_type() {
    let err = parse_line("\tabc\t1\t2\t3").unwrap_err();
    assert_eq!(err, ParseError::missing_identity("device_type"));
}

#[test]
fn test_parse_empty_device_id() {
    let err = parse_line("idfa\t\t1\t2\t3").unwrap_err();
    assert_eq!(err, ParseError::missing_identity("device_id"));
}

// =============================================================================
// InvalidCoordinate
// =============================================================================

#[test]
fn test_parse_invalid_lat() {
    let err = parse_line("idfa\tabc\tnorth\t2\t3").unwrap_err();
    assert_eq!(err, ParseError::invalid_coordinate("lat", "north"));
}

#[test]
fn test_parse_invalid_lon() {
    let err = parse_line("idfa\tabc\t1\t\t3").unwrap_err();
    assert_eq!(err, ParseError::invalid_coordinate("lon", ""));
}

#[test]
fn test_parse_non_finite_coordinates_rejected() {
    for raw in ["NaN", "inf", "-inf", "infinity"] {
        let line = format!("idfa\tabc\t{raw}\t2\t3");
        let err = parse_line(&line).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::InvalidCoordinate, "lat: {raw}");
    }
}

// =============================================================================
// InvalidAppId
// =============================================================================

#[test]
fn test_parse_non_numeric_app() {
    let err = parse_line("idfa\tabc\t1\t2\t1,two,3").unwrap_err();
    assert_eq!(err, ParseError::invalid_app_id("two"));
}

#[test]
fn test_parse_negative_app() {
    let err = parse_line("idfa\tabc\t1\t2\t-5").unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::InvalidAppId);
}

#[test]
fn test_parse_empty_app_token() {
    let err = parse_line("idfa\tabc\t1\t2\t1,,3").unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::InvalidAppId);
}

#[test]
fn test_parse_app_overflow() {
    let err = parse_line("idfa\tabc\t1\t2\t4294967296").unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::InvalidAppId);
}

#[test]
fn test_parse_fractional_app() {
    let err = parse_line("idfa\tabc\t1\t2\t1.5").unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::InvalidAppId);
}

// =============================================================================
// Validation order
// =============================================================================

#[test]
fn test_identity_checked_before_coordinates() {
    let err = parse_line("\tabc\tbad\tbad\tbad").unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::MissingIdentity);
}

#[test]
fn test_coordinates_checked_before_apps() {
    let err = parse_line("idfa\tabc\tbad\t2\tbad").unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::InvalidCoordinate);
}
