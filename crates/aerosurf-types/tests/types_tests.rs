//! Integration tests for aerosurf-types.

use aerosurf_types::{AeroError, EdgeId, NodeId, SurfaceId};

// ─── ID Tests ──────────────────────────────────────────────────

#[test]
fn node_id_index() {
    let id = NodeId(42);
    assert_eq!(id.index(), 42);
}

#[test]
fn ids_convert_from_u32() {
    assert_eq!(EdgeId::from(3), EdgeId(3));
    assert_eq!(EdgeId::from(9).index(), 9);
    assert_eq!(SurfaceId::from(1), SurfaceId(1));
}

#[test]
fn ids_are_ordered() {
    let mut ids = vec![NodeId(5), NodeId(1), NodeId(3)];
    ids.sort();
    assert_eq!(ids, vec![NodeId(1), NodeId(3), NodeId(5)]);
}

#[test]
fn ids_are_serializable() {
    let id = NodeId(100);
    let json = serde_json::to_string(&id).unwrap();
    let deserialized: NodeId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, deserialized);
}

// ─── Error Tests ──────────────────────────────────────────────

#[test]
fn error_display() {
    let err = AeroError::Geometry("span section 3 is fully degenerate".into());
    assert!(err.to_string().contains("span section 3"));
    assert!(err.to_string().starts_with("Geometry error"));
}

#[test]
fn fatal_classification() {
    assert!(AeroError::Geometry("x".into()).is_fatal_for_surface());
    assert!(AeroError::Mesh("x".into()).is_fatal_for_surface());
    assert!(!AeroError::Agglomeration("x".into()).is_fatal_for_surface());
    assert!(!AeroError::InvalidConfig("x".into()).is_fatal_for_surface());
}

#[test]
fn io_error_converts() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
    let err: AeroError = io.into();
    assert!(err.to_string().contains("missing.json"));
}
