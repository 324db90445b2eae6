//! Tests for error module

use std::path::PathBuf;

use tracegraph::error::{OptionExt, TraceGraphError};

#[test]
fn test_error_display() {
    let err = TraceGraphError::InsufficientPoints {
        trace_id: "trip-1".to_string(),
        point_count: 1,
        minimum_required: 2,
    };
    assert!(err.to_string().contains("trip-1"));
    assert!(err.to_string().contains("1 points"));

    let err = TraceGraphError::Parse {
        path: PathBuf::from("roads.graph"),
        line: 7,
        message: "bad".to_string(),
    };
    assert_eq!(err.to_string(), "roads.graph:7: bad");

    let err = TraceGraphError::DanglingEdge {
        src: 0,
        dst: 9,
        vertex_count: 3,
    };
    assert!(err.to_string().contains("0 -> 9"));

    let err = TraceGraphError::NonFiniteObservation {
        trace_id: "trip-2".to_string(),
        index: 4,
    };
    assert!(err.to_string().contains("trip-2"));
    assert!(err.to_string().contains("index 4"));
}

#[test]
fn test_option_ext() {
    let none: Option<i32> = None;
    let result = none.ok_or_insufficient_points("trip", 0, 2);
    assert!(matches!(
        result,
        Err(TraceGraphError::InsufficientPoints { .. })
    ));

    let none: Option<i32> = None;
    assert!(matches!(
        none.ok_or_empty_graph("inferred"),
        Err(TraceGraphError::EmptyGraph { graph: "inferred" })
    ));

    assert_eq!(Some(3).ok_or_empty_graph("actual").unwrap(), 3);
}

#[test]
fn test_io_error_converts() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err: TraceGraphError = io.into();
    assert!(matches!(err, TraceGraphError::Io(_)));
}
