//! Integration tests for aerosurf-io.

use aerosurf_io::contract::{
    lattice_input_from_patch, plate_input_from_patch, ControlSurfaceInput, SectionInput,
};
use aerosurf_io::{
    validate_fem, validate_model, validate_surface, FemInput, LatticeInput, MeshSummary,
    ModelInput, SurfaceInput, TriangulatedInput,
};
use aerosurf_surface::generators::{body_of_revolution, rectangular_wing, thick_wing};
use aerosurf_surface::{MeshConfig, MeshPipeline, SurfaceKind};
use aerosurf_types::{AeroError, SurfaceId};

fn wing_input() -> SurfaceInput {
    let patch = thick_wing(4.0, 1.0, 0.12, 4, 7);
    SurfaceInput {
        name: "wing".into(),
        kind: SurfaceKind::Wing,
        component_id: 3,
        lifting: None,
        geometry: Some(lattice_input_from_patch(&patch)),
        plate: plate_input_from_patch(&patch),
        sections: Some(SectionInput {
            thickness_to_chord: vec![0.12; 3],
            ..Default::default()
        }),
        triangulation: None,
        control_surfaces: vec![ControlSurfaceInput {
            name: "flap".into(),
            uv_min: [0.0, 0.0],
            uv_max: [0.5, 0.2],
            hinge_start: [0.0, 0.1],
            hinge_end: [0.5, 0.1],
            deflection_deg: 10.0,
        }],
    }
}

fn body_input() -> SurfaceInput {
    let patch = body_of_revolution(4.0, 0.5, 6, 9);
    let mut geometry = lattice_input_from_patch(&patch);
    geometry.normals = None;
    geometry.u = None;
    geometry.v = None;
    SurfaceInput {
        name: "fuselage".into(),
        kind: SurfaceKind::Body,
        component_id: 0,
        lifting: None,
        geometry: Some(geometry),
        plate: None,
        sections: None,
        triangulation: None,
        control_surfaces: Vec::new(),
    }
}

fn square_triangulation() -> TriangulatedInput {
    TriangulatedInput {
        positions: vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            0.0, 1.0, 0.0,
        ],
        indices: vec![0, 1, 2, 0, 2, 3],
        uvs: vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
    }
}

// ─── Contract Tests ───────────────────────────────────────────

#[test]
fn model_json_round_trip() {
    let model = ModelInput {
        surfaces: vec![wing_input(), body_input()],
    };
    let json = serde_json::to_string(&model).unwrap();
    let back: ModelInput = serde_json::from_str(&json).unwrap();
    assert_eq!(back.surfaces.len(), 2);
    assert_eq!(back.surfaces[0].component_id, 3);
    assert_eq!(back.surfaces[1].kind, SurfaceKind::Body);
}

#[test]
fn minimal_json_uses_defaults() {
    let json = r#"{
        "name": "plate",
        "kind": "Wing",
        "geometry": {
            "ni": 2, "nj": 2,
            "xyz": [[0,0,0],[1,0,0],[0,1,0],[1,1,0]]
        }
    }"#;
    let input: SurfaceInput = serde_json::from_str(json).unwrap();
    assert!(input.plate.is_none());
    assert!(input.control_surfaces.is_empty());
    assert!(validate_surface(&input).is_ok());
}

#[test]
fn wing_record_becomes_surface() {
    let surface = wing_input().into_surface(&MeshConfig::default()).unwrap();
    assert_eq!(surface.kind(), SurfaceKind::Wing);
    assert_eq!(surface.component_id(), 3);
    assert!(surface.is_lifting_surface());
    assert_eq!(surface.number_of_span_stations(), 3);
    assert!((surface.edges().thickness_to_chord(2) - 0.12).abs() < 1e-12);
    assert_eq!(surface.number_of_control_surfaces(), 1);
    assert!((surface.control_surface(0).unwrap().deflection_deg - 10.0).abs() < 1e-12);
}

#[test]
fn derived_normals_and_uniform_params() {
    let input = body_input();
    let patch = input.to_patch(1e-6).unwrap();
    assert!((*patch.u.get(6, 1) - 1.0).abs() < 1e-12);
    assert!((*patch.v.get(1, 5) - 0.5).abs() < 1e-12);
    // Tail pole faces downstream
    assert!(patch.normal.get(6, 3).x > 0.9);
}

#[test]
fn body_record_meshes_closed() {
    let mut surface = body_input().into_surface(&MeshConfig::default()).unwrap();
    let report = surface.create_mesh(SurfaceId(0)).unwrap();
    assert_eq!(report.triangles, 64);
    assert!(report.nose_is_closed && report.tail_is_closed);
}

#[test]
fn cart3d_record_becomes_surface() {
    let input = SurfaceInput {
        name: "pod".into(),
        kind: SurfaceKind::Cart3d,
        component_id: 0,
        lifting: Some(false),
        geometry: None,
        plate: None,
        sections: None,
        triangulation: Some(square_triangulation()),
        control_surfaces: Vec::new(),
    };
    let mut surface = input.into_surface(&MeshConfig::default()).unwrap();
    let report = surface.create_mesh(SurfaceId(0)).unwrap();
    assert_eq!(report.triangles, 2);
    assert!((report.wetted_area - 1.0).abs() < 1e-12);
}

#[test]
fn fem_record_becomes_grid() {
    let input = FemInput {
        u: vec![0.0, 1.0],
        v: vec![0.0, 1.0],
        displacement: vec![[0.0, 0.0, 0.0]; 4],
    };
    assert!(validate_fem(&input).is_ok());
    let grid = input.into_grid().unwrap();
    assert_eq!(grid.nu(), 2);
    assert_eq!(grid.max_displacement(), 0.0);
}

#[test]
fn summary_from_pipeline() {
    let config = MeshConfig::default();
    let model = ModelInput {
        surfaces: vec![wing_input(), body_input()],
    };
    let mut surfaces = model.into_surfaces(&config).unwrap();
    let outcome = MeshPipeline::default().run(&mut surfaces).unwrap();
    let summary = MeshSummary::from_outcome(outcome, 0.25);
    assert_eq!(summary.surfaces.len(), 2);
    assert!(summary.excluded.is_empty());
    assert_eq!(summary.total_kutta_nodes(), 4);
    assert!(summary.total_triangles() > 64);

    let json = serde_json::to_string(&summary).unwrap();
    let back: MeshSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(back, summary);
}

#[test]
fn lattice_records_round_trip() {
    let patch = rectangular_wing(2.0, 1.0, 3, 4);
    let input = SurfaceInput {
        name: "w".into(),
        kind: SurfaceKind::Wing,
        component_id: 0,
        lifting: None,
        geometry: Some(lattice_input_from_patch(&patch)),
        plate: plate_input_from_patch(&patch),
        sections: None,
        triangulation: None,
        control_surfaces: Vec::new(),
    };
    let rebuilt = input.to_patch(1e-6).unwrap();
    assert_eq!(rebuilt.plate_xyz, patch.plate_xyz);
    assert_eq!(rebuilt.xyz, patch.xyz);
}

// ─── Validator Tests ──────────────────────────────────────────

#[test]
fn valid_model_passes() {
    let model = ModelInput {
        surfaces: vec![wing_input(), body_input()],
    };
    assert!(validate_model(&model).is_ok());
}

#[test]
fn empty_model_rejected() {
    assert!(validate_model(&ModelInput::default()).is_err());
}

#[test]
fn duplicate_names_rejected() {
    let model = ModelInput {
        surfaces: vec![wing_input(), wing_input()],
    };
    assert!(matches!(
        validate_model(&model),
        Err(AeroError::InvalidConfig(_))
    ));
}

#[test]
fn wrong_point_count_rejected() {
    let mut input = wing_input();
    if let Some(g) = input.geometry.as_mut() {
        g.xyz.pop();
    }
    assert!(matches!(
        validate_surface(&input),
        Err(AeroError::Geometry(_))
    ));
    assert!(input.into_surface(&MeshConfig::default()).is_err());
}

#[test]
fn tiny_lattice_rejected() {
    let mut input = body_input();
    input.geometry = Some(LatticeInput {
        ni: 1,
        nj: 3,
        xyz: vec![[0.0; 3]; 3],
        normals: None,
        u: None,
        v: None,
    });
    assert!(validate_surface(&input).is_err());
}

#[test]
fn non_monotonic_parameters_rejected() {
    let mut input = wing_input();
    if let Some(g) = input.geometry.as_mut() {
        let nj = g.nj;
        if let Some(v) = g.v.as_mut() {
            // Swap two stations of the second row
            v.swap(nj + 2, nj + 3);
        }
    }
    assert!(matches!(
        validate_surface(&input),
        Err(AeroError::Geometry(_))
    ));

    let mut input = wing_input();
    if let Some(g) = input.geometry.as_mut() {
        let nj = g.nj;
        if let Some(u) = g.u.as_mut() {
            // Repeat a span station on the first column
            u[nj] = u[0];
        }
    }
    assert!(matches!(
        validate_surface(&input),
        Err(AeroError::Geometry(_))
    ));
}

#[test]
fn non_finite_points_rejected() {
    let mut input = body_input();
    if let Some(g) = input.geometry.as_mut() {
        g.xyz[4][1] = f64::NAN;
    }
    assert!(validate_surface(&input).is_err());
}

#[test]
fn missing_geometry_rejected() {
    let mut input = wing_input();
    input.geometry = None;
    assert!(matches!(
        validate_surface(&input),
        Err(AeroError::Geometry(_))
    ));
}

#[test]
fn body_with_plate_rejected() {
    let mut input = body_input();
    input.plate = wing_input().plate;
    assert!(matches!(
        validate_surface(&input),
        Err(AeroError::InvalidConfig(_))
    ));
}

#[test]
fn bad_triangulation_rejected() {
    let mut tri = square_triangulation();
    tri.indices.pop();
    let input = SurfaceInput {
        name: "pod".into(),
        kind: SurfaceKind::Cart3d,
        component_id: 0,
        lifting: None,
        geometry: None,
        plate: None,
        sections: None,
        triangulation: Some(tri),
        control_surfaces: Vec::new(),
    };
    assert!(matches!(validate_surface(&input), Err(AeroError::Mesh(_))));
}

#[test]
fn fem_shape_mismatch_rejected() {
    let input = FemInput {
        u: vec![0.0, 1.0],
        v: vec![0.0, 0.5, 1.0],
        displacement: vec![[0.0; 3]; 4],
    };
    assert!(matches!(
        validate_fem(&input),
        Err(AeroError::Deformation(_))
    ));
}
