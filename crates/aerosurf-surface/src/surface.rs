//! The surface aggregate.
//!
//! A [`Surface`] owns everything about one aerodynamic component: the
//! structured patch, edge spans, the triangulated mesh and its multigrid
//! hierarchy, Kutta nodes, control surfaces, FEM deformation state and
//! ground-effect parameters. Cloning a surface duplicates all of it.
//!
//! Pipeline: `create_mesh` (analyze → triangulate → reorder → Kutta scan)
//! then `agglomerate_mesh`. Deformation and rigid-body moves only touch
//! coordinates; connectivity and node order are left alone.

use aerosurf_math::{DQuat, DVec3, RigidTransform};
use aerosurf_mesh::agglomerate::agglomerate;
use aerosurf_mesh::normals::compute_vertex_normals;
use aerosurf_mesh::reorder::{node_graph, reorder_mesh, ReorderReport};
use aerosurf_mesh::{GridHierarchy, GridLevel, Topology, TriangleMesh};
use aerosurf_types::{AeroError, AeroResult, SurfaceId};

use crate::analyzer::{
    check_for_degenerate_span_sections, check_for_degenerate_x_sections, find_sharp_edges,
    KuttaNode, XSectionReport,
};
use crate::config::MeshConfig;
use crate::control::ControlSurface;
use crate::edges::EdgeSpans;
use crate::fem::{DisplacementField, FemGrid};
use crate::ground::GroundEffects;
use crate::lattice::Lattice;
use crate::patch::{difference_normals, interpolate_lattice, StructuredPatch};
use crate::report::MeshReport;
use crate::triangulate::{create_body_tri_mesh, create_wing_tri_mesh, SurfaceKind};

/// Lattice seeds tried by the inverse deformation.
const UNDEFORM_SEEDS: usize = 8;

/// Geometry captured before the first deformation.
#[derive(Debug, Clone)]
struct Undeformed {
    patch: StructuredPatch,
    mesh_nodes: Vec<DVec3>,
}

/// One aerodynamic component.
#[derive(Debug, Clone)]
pub struct Surface {
    name: String,
    kind: SurfaceKind,
    component_id: u32,
    case: u32,
    is_lifting_surface: bool,
    number_of_surface_patches: u32,
    verbose: bool,
    config: MeshConfig,

    patch: StructuredPatch,
    edges: EdgeSpans,
    cart3d_mesh: Option<TriangleMesh>,

    surface_id: SurfaceId,
    sections: Option<XSectionReport>,
    grids: Option<GridHierarchy>,
    lattice_to_node: Option<Lattice<u32>>,
    wrapped: bool,
    collapsed_panels: usize,
    reorder: Option<ReorderReport>,
    kutta_nodes: Vec<KuttaNode>,
    wetted_area: f64,
    cdo: f64,

    control_surfaces: Vec<ControlSurface>,
    ground_effects: GroundEffects,

    fem: Option<FemGrid>,
    undeformed: Option<Undeformed>,
}

impl Surface {
    /// A wing or body built from a structured patch.
    pub fn new(
        name: impl Into<String>,
        kind: SurfaceKind,
        patch: StructuredPatch,
        config: MeshConfig,
    ) -> AeroResult<Self> {
        config.validate()?;
        if kind == SurfaceKind::Cart3d {
            return Err(AeroError::InvalidConfig(
                "Cart3D surfaces are built with Surface::from_triangulation".into(),
            ));
        }
        patch.check_sizes()?;
        let edges = EdgeSpans::from_plate(&patch);
        Ok(Self {
            name: name.into(),
            kind,
            component_id: 0,
            case: 0,
            is_lifting_surface: kind == SurfaceKind::Wing,
            number_of_surface_patches: 1,
            verbose: false,
            config,
            patch,
            edges,
            cart3d_mesh: None,
            surface_id: SurfaceId(0),
            sections: None,
            grids: None,
            lattice_to_node: None,
            wrapped: false,
            collapsed_panels: 0,
            reorder: None,
            kutta_nodes: Vec::new(),
            wetted_area: 0.0,
            cdo: 0.0,
            control_surfaces: Vec::new(),
            ground_effects: GroundEffects::default(),
            fem: None,
            undeformed: None,
        })
    }

    /// A surface from an already triangulated component.
    pub fn from_triangulation(
        name: impl Into<String>,
        mesh: TriangleMesh,
        config: MeshConfig,
    ) -> AeroResult<Self> {
        mesh.validate()?;
        if mesh.triangle_count() == 0 {
            return Err(AeroError::Geometry("triangulated input has no triangles".into()));
        }
        let extent = match mesh.bounding_box() {
            Some((lo, hi)) if (hi - lo).length() > 0.0 => (hi - lo).length(),
            _ => 1.0,
        };
        let min_area = (config.coincidence_tolerance * extent).powi(2);
        if let Some(t) = (0..mesh.triangle_count()).find(|&t| !(mesh.triangle_area(t) >= min_area)) {
            return Err(AeroError::Mesh(format!(
                "triangle {t} is degenerate (area {:e})",
                mesh.triangle_area(t)
            )));
        }
        let mut surface = Self::new(name, SurfaceKind::Wing, StructuredPatch::new(), config)?;
        surface.kind = SurfaceKind::Cart3d;
        surface.is_lifting_surface = false;
        surface.cart3d_mesh = Some(mesh);
        Ok(surface)
    }

    // ─── Identity ───────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn component_id(&self) -> u32 {
        self.component_id
    }

    pub fn set_component_id(&mut self, id: u32) {
        self.component_id = id;
    }

    /// Which split of a degenerate-geometry component this surface is.
    pub fn case(&self) -> u32 {
        self.case
    }

    pub fn set_case(&mut self, case: u32) {
        self.case = case;
    }

    pub fn is_lifting_surface(&self) -> bool {
        self.is_lifting_surface
    }

    pub fn set_lifting_surface(&mut self, lifting: bool) {
        self.is_lifting_surface = lifting;
    }

    pub fn number_of_surface_patches(&self) -> u32 {
        self.number_of_surface_patches
    }

    pub fn set_number_of_surface_patches(&mut self, n: u32) {
        self.number_of_surface_patches = n;
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    // ─── Structured data ────────────────────────────────────────

    pub fn patch(&self) -> &StructuredPatch {
        &self.patch
    }

    /// Replaces the structured patch. Edge spans are rebuilt; the mesh,
    /// Kutta nodes and deformation state are dropped.
    pub fn set_patch(&mut self, patch: StructuredPatch) {
        self.edges = EdgeSpans::from_plate(&patch);
        self.patch = patch;
        self.grids = None;
        self.lattice_to_node = None;
        self.sections = None;
        self.kutta_nodes.clear();
        self.undeformed = None;
    }

    pub fn edges(&self) -> &EdgeSpans {
        &self.edges
    }

    pub fn edges_mut(&mut self) -> &mut EdgeSpans {
        &mut self.edges
    }

    pub fn number_of_span_stations(&self) -> usize {
        self.edges.number_of_span_stations()
    }

    pub fn average_chord(&self) -> f64 {
        self.edges.average_chord()
    }

    /// Absolute coincidence tolerance for this surface.
    pub fn tolerance(&self) -> f64 {
        self.config.coincidence_tolerance * self.reference_length()
    }

    fn reference_length(&self) -> f64 {
        match self.bounding_box() {
            Some((lo, hi)) if (hi - lo).length() > 0.0 => (hi - lo).length(),
            _ => 1.0,
        }
    }

    /// Component bounding box.
    pub fn bounding_box(&self) -> Option<(DVec3, DVec3)> {
        match self.kind {
            SurfaceKind::Cart3d => self.mesh().or(self.cart3d_mesh.as_ref())?.bounding_box(),
            _ => self.patch.bounding_box(),
        }
    }

    pub fn interpolate_xyz_from_uv(&self, u: f64, v: f64) -> DVec3 {
        self.patch.interpolate_xyz_from_uv(u, v)
    }

    // ─── Meshing ────────────────────────────────────────────────

    /// Analyzes and triangulates the surface, reorders its nodes, builds
    /// adjacency and upwind data and finds the Kutta nodes.
    ///
    /// Any previous deformation is undone first. The multigrid hierarchy
    /// holds only the fine level until [`Surface::agglomerate_mesh`] runs.
    pub fn create_mesh(&mut self, surface_id: SurfaceId) -> AeroResult<MeshReport> {
        self.restore_undeformed();
        self.surface_id = surface_id;
        let tol = self.tolerance();

        let mut mesh = match self.kind {
            SurfaceKind::Wing | SurfaceKind::Body => {
                let sections = check_for_degenerate_x_sections(&self.patch, tol)?;
                check_for_degenerate_span_sections(&self.patch, tol)?;
                let tri = if self.kind == SurfaceKind::Wing {
                    create_wing_tri_mesh(&self.patch, &sections, tol, surface_id)?
                } else {
                    create_body_tri_mesh(&self.patch, &sections, tol, surface_id)?
                };
                self.sections = Some(sections);
                self.lattice_to_node = Some(tri.lattice_to_node);
                self.wrapped = tri.wrapped;
                self.collapsed_panels = tri.collapsed_panels;
                tri.mesh
            }
            SurfaceKind::Cart3d => {
                let mut mesh = self
                    .cart3d_mesh
                    .clone()
                    .ok_or_else(|| AeroError::Mesh("no triangulated input".into()))?;
                for id in mesh.surface_ids.iter_mut() {
                    *id = surface_id;
                }
                compute_vertex_normals(&mut mesh);
                self.sections = None;
                self.lattice_to_node = None;
                self.collapsed_panels = 0;
                mesh
            }
        };

        let reorder = if self.config.reorder_nodes {
            let (perm, report) = reorder_mesh(&mut mesh);
            if let Some(map) = self.lattice_to_node.as_mut() {
                map.map_in_place(|n| perm.map(n));
            }
            report
        } else {
            let bandwidth = node_graph(&mesh).bandwidth();
            ReorderReport {
                bandwidth_before: bandwidth,
                bandwidth_after: bandwidth,
                applied: false,
            }
        };
        self.reorder = Some(reorder);

        let grids = GridHierarchy::new(mesh, self.config.flow_direction());
        self.kutta_nodes = match (self.kind, self.lattice_to_node.as_ref()) {
            (SurfaceKind::Wing, Some(map)) => {
                let te = trailing_edge_nodes(map, self.wrapped);
                find_sharp_edges(
                    &grids.mesh,
                    &grids.topology,
                    &te,
                    self.config.sharp_edge_angle_deg,
                    tol,
                )
            }
            _ => Vec::new(),
        };
        self.wetted_area = grids.mesh.total_area();
        let boundary_edges = grids.topology.boundary_edge_count();
        self.grids = Some(grids);

        let report = self.require_report()?;
        tracing::info!(
            surface = %self.name,
            nodes = report.nodes,
            triangles = report.triangles,
            kutta = report.kutta_nodes,
            boundary_edges,
            "mesh created"
        );
        Ok(report)
    }

    /// Builds the coarse multigrid levels. Returns the number of levels.
    pub fn agglomerate_mesh(&mut self) -> AeroResult<usize> {
        let params = self.config.agglomeration_params();
        let grids = self.grids_mut()?;
        let levels = agglomerate(grids, &params);
        tracing::info!(surface = %self.name, levels, "agglomerated");
        Ok(levels)
    }

    /// Summary of the current mesh, `None` before `create_mesh`.
    pub fn report(&self) -> Option<MeshReport> {
        let grids = self.grids.as_ref()?;
        let sections = self.sections.clone().unwrap_or_default();
        let reorder = self.reorder.unwrap_or(ReorderReport {
            bandwidth_before: 0,
            bandwidth_after: 0,
            applied: false,
        });
        Some(MeshReport {
            surface_id: self.surface_id,
            name: self.name.clone(),
            kind: self.kind,
            nodes: grids.mesh.vertex_count(),
            triangles: grids.mesh.triangle_count(),
            collapsed_panels: self.collapsed_panels,
            degenerate_rows: sections.degenerate_row_count(),
            nose_is_closed: sections.nose_is_closed,
            tail_is_closed: sections.tail_is_closed,
            wrapped: self.wrapped,
            bandwidth_before: reorder.bandwidth_before,
            bandwidth_after: reorder.bandwidth_after,
            kutta_nodes: self.kutta_nodes.len(),
            grid_levels: grids.number_of_levels(),
            loops_per_level: grids.levels.iter().map(|l| l.number_of_loops()).collect(),
            wetted_area: self.wetted_area,
        })
    }

    fn require_report(&self) -> AeroResult<MeshReport> {
        self.report()
            .ok_or_else(|| AeroError::Mesh("mesh has not been created".into()))
    }

    fn grids_mut(&mut self) -> AeroResult<&mut GridHierarchy> {
        self.grids
            .as_mut()
            .ok_or_else(|| AeroError::Mesh("mesh has not been created".into()))
    }

    pub fn number_of_grid_levels(&self) -> usize {
        self.grids.as_ref().map_or(0, |g| g.number_of_levels())
    }

    /// Grid level `level`, saturating at the coarsest level.
    pub fn grid(&self, level: usize) -> Option<&GridLevel> {
        self.grids.as_ref().map(|g| g.grid(level))
    }

    pub fn fine_grid(&self) -> Option<&GridLevel> {
        self.grid(0)
    }

    pub fn grid_hierarchy(&self) -> Option<&GridHierarchy> {
        self.grids.as_ref()
    }

    /// The fine triangle mesh.
    pub fn mesh(&self) -> Option<&TriangleMesh> {
        self.grids.as_ref().map(|g| &g.mesh)
    }

    pub fn topology(&self) -> Option<&Topology> {
        self.grids.as_ref().map(|g| &g.topology)
    }

    /// Mesh node of lattice point `(i, j)`, after reordering.
    pub fn lattice_node(&self, i: usize, j: usize) -> Option<u32> {
        self.lattice_to_node.as_ref().map(|m| *m.get(i, j))
    }

    pub fn number_of_tris_for_node(&self, node: u32) -> usize {
        self.topology()
            .map_or(0, |t| t.number_of_tris_for_node(node))
    }

    pub fn node_to_tri_list(&self, node: u32) -> &[u32] {
        match self.topology() {
            Some(topo) => topo.node_to_tri_list(node),
            None => &[],
        }
    }

    pub fn kutta_nodes(&self) -> &[KuttaNode] {
        &self.kutta_nodes
    }

    pub fn x_sections(&self) -> Option<&XSectionReport> {
        self.sections.as_ref()
    }

    pub fn wetted_area(&self) -> f64 {
        self.wetted_area
    }

    /// Zero-lift drag coefficient.
    pub fn cdo(&self) -> f64 {
        self.cdo
    }

    pub fn cdo_mut(&mut self) -> &mut f64 {
        &mut self.cdo
    }

    // ─── Control surfaces ───────────────────────────────────────

    /// Appends a control surface and locates its hinge line.
    pub fn add_control_surface(&mut self, mut control: ControlSurface) -> AeroResult<usize> {
        if self.control_surfaces.len() >= self.config.max_control_surfaces {
            return Err(AeroError::InvalidConfig(format!(
                "surface '{}' already has the maximum of {} control surfaces",
                self.name, self.config.max_control_surfaces
            )));
        }
        if !self.patch.xyz.is_empty() {
            control.locate_hinge_line(&self.patch);
        }
        self.control_surfaces.push(control);
        Ok(self.control_surfaces.len() - 1)
    }

    pub fn number_of_control_surfaces(&self) -> usize {
        self.control_surfaces.len()
    }

    pub fn control_surfaces(&self) -> &[ControlSurface] {
        &self.control_surfaces
    }

    pub fn control_surface(&self, k: usize) -> Option<&ControlSurface> {
        self.control_surfaces.get(k)
    }

    pub fn control_surface_mut(&mut self, k: usize) -> Option<&mut ControlSurface> {
        self.control_surfaces.get_mut(k)
    }

    /// Mesh nodes whose `(u, v)` lies inside control surface `k`.
    pub fn control_surface_nodes(&self, k: usize) -> Vec<u32> {
        let (Some(control), Some(mesh)) = (self.control_surfaces.get(k), self.mesh()) else {
            return Vec::new();
        };
        (0..mesh.vertex_count())
            .filter(|&n| control.region.contains(mesh.uv_u[n], mesh.uv_v[n]))
            .map(|n| n as u32)
            .collect()
    }

    // ─── Ground effects ─────────────────────────────────────────

    pub fn ground_effects(&self) -> &GroundEffects {
        &self.ground_effects
    }

    pub fn ground_effects_mut(&mut self) -> &mut GroundEffects {
        &mut self.ground_effects
    }

    /// Rotates the surface about the Y axis through the ground-effect CG and
    /// moves the CG to the configured height.
    pub fn rotate_geometry_about_y_axis(&mut self) {
        let t = self.ground_effects.placement();
        self.apply_transform(&t);
    }

    // ─── Rigid-body update ──────────────────────────────────────

    /// Applies `p' = q·(p − origin)·q_inverse + origin + translation` to
    /// every owned point; normals and FEM displacements are only rotated.
    pub fn update_geometry_location(
        &mut self,
        translation: DVec3,
        origin: DVec3,
        q: DQuat,
        q_inverse: DQuat,
    ) {
        let t = RigidTransform::new(translation, origin, q, q_inverse);
        self.apply_transform(&t);
    }

    fn apply_transform(&mut self, t: &RigidTransform) {
        self.patch.transform(t);
        self.edges.transform(t);
        for control in self.control_surfaces.iter_mut() {
            control.transform(t);
        }
        if let Some(fem) = self.fem.as_mut() {
            fem.transform(t);
        }
        if let Some(snapshot) = self.undeformed.as_mut() {
            snapshot.patch.transform(t);
            for p in snapshot.mesh_nodes.iter_mut() {
                *p = t.apply_point(*p);
            }
        }
        if let Some(mesh) = self.cart3d_mesh.as_mut() {
            transform_mesh(mesh, t);
        }
        if let Some(grids) = self.grids.as_mut() {
            transform_mesh(&mut grids.mesh, t);
            grids.refresh_geometry();
        }
    }

    // ─── FEM deformation ────────────────────────────────────────

    /// Stores the structural displacement field.
    pub fn load_fem_deformation_data(&mut self, grid: FemGrid) -> AeroResult<()> {
        grid.validate()?;
        tracing::debug!(
            surface = %self.name,
            nu = grid.nu(),
            nv = grid.nv(),
            "FEM data loaded"
        );
        self.fem = Some(grid);
        Ok(())
    }

    pub fn fem_data_loaded(&self) -> bool {
        self.fem.is_some()
    }

    pub fn fem_data(&self) -> Option<&FemGrid> {
        self.fem.as_ref()
    }

    pub fn is_deformed(&self) -> bool {
        self.undeformed.is_some()
    }

    fn require_fem(&self) -> AeroResult<&FemGrid> {
        self.fem
            .as_ref()
            .ok_or_else(|| AeroError::Deformation("no FEM deformation data loaded".into()))
    }

    /// Displacement of the structural field at `(u, v)`.
    pub fn fem_displacement_at(&self, u: f64, v: f64) -> AeroResult<DVec3> {
        Ok(self.require_fem()?.displacement_at(u, v))
    }

    /// Moves every patch, edge-span and mesh point by the displacement at
    /// its `(u, v)`, starting from the undeformed geometry each time.
    ///
    /// Returns the largest displacement applied.
    pub fn fem_deform_geometry(&mut self) -> AeroResult<f64> {
        let fem = self.require_fem()?.clone();
        let tol = self.tolerance();
        let snapshot = match self.undeformed.take() {
            Some(s) => s,
            None => Undeformed {
                patch: self.patch.clone(),
                mesh_nodes: self
                    .mesh()
                    .map(|m| (0..m.vertex_count()).map(|n| m.position_vec3(n)).collect())
                    .unwrap_or_default(),
            },
        };

        let mut max_displacement: f64 = 0.0;
        let base = &snapshot.patch;
        let mut deformed = base.clone();

        // Geometric lattice
        let wrapped = base.is_wrapped(tol);
        for (i, j) in base.xyz.indices() {
            let d = fem.displacement_at(*base.u.get(i, j), *base.v.get(i, j));
            max_displacement = max_displacement.max(d.length());
            deformed.xyz.set(i, j, base.point(i, j) + d);
        }
        let before = difference_normals(&base.xyz, wrapped);
        let after = difference_normals(&deformed.xyz, wrapped);
        for (i, j) in base.xyz.indices() {
            let n = rotate_normal(*base.normal.get(i, j), *before.get(i, j), *after.get(i, j));
            deformed.normal.set(i, j, n);
        }

        // Flat-plate lattice
        for (i, j) in base.plate_xyz.indices() {
            let d = fem.displacement_at(*base.u_plate.get(i, j), *base.v_plate.get(i, j));
            deformed.plate_xyz.set(i, j, base.plate_point(i, j) + d);
        }
        let before = difference_normals(&base.plate_xyz, false);
        let after = difference_normals(&deformed.plate_xyz, false);
        for (i, j) in base.plate_xyz.indices() {
            let (b, a) = (*before.get(i, j), *after.get(i, j));
            deformed
                .flat_plate_normal
                .set(i, j, rotate_normal(*base.flat_plate_normal.get(i, j), b, a));
            deformed
                .camber_normal
                .set(i, j, rotate_normal(*base.camber_normal.get(i, j), b, a));
        }

        self.edges.refresh_deformed(&deformed);
        self.patch = deformed;
        for control in self.control_surfaces.iter_mut() {
            if !self.patch.xyz.is_empty() {
                control.locate_hinge_line(&self.patch);
            }
        }

        if let Some(grids) = self.grids.as_mut() {
            let mesh = &mut grids.mesh;
            for (n, &p0) in snapshot.mesh_nodes.iter().enumerate() {
                let d = fem.displacement_at(mesh.uv_u[n], mesh.uv_v[n]);
                max_displacement = max_displacement.max(d.length());
                mesh.set_position(n, p0 + d);
            }
            compute_vertex_normals(mesh);
            grids.refresh_geometry();
        }

        self.undeformed = Some(snapshot);
        tracing::info!(surface = %self.name, max_displacement, "deformed");
        Ok(max_displacement)
    }

    /// Maps a point on the deformed surface back to the undeformed one.
    ///
    /// Solves `X(u, v) + d(u, v) = p` for `(u, v)` by Gauss–Newton from the
    /// nearest deformed lattice points, keeps the solution with the smallest
    /// residual and returns `X(u, v)`.
    pub fn fem_undeform_geometry(&self, p: DVec3) -> AeroResult<DVec3> {
        let fem = self.require_fem()?;
        let base = self
            .undeformed
            .as_ref()
            .map_or(&self.patch, |s| &s.patch);

        if base.xyz.is_empty() {
            return self.undeform_unstructured(fem, p);
        }

        let undeformed_at = |u: f64, v: f64| interpolate_lattice(&base.xyz, &base.u, &base.v, u, v);
        let deformed_at = |u: f64, v: f64| undeformed_at(u, v) + fem.displacement_at(u, v);

        let (ni, nj) = (base.surface_num_i(), base.surface_num_j());
        let u_axis: Vec<f64> = (1..=ni).map(|i| *base.u.get(i, 1)).collect();
        let v_axis: Vec<f64> = (1..=nj).map(|j| *base.v.get(1, j)).collect();
        let range = |axis: &[f64]| {
            let lo = axis.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = axis.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (lo, hi)
        };
        let (u_lo, u_hi) = range(&u_axis);
        let (v_lo, v_hi) = range(&v_axis);
        let u_span = (u_hi - u_lo).max(f64::EPSILON);
        let v_span = (v_hi - v_lo).max(f64::EPSILON);

        let reference_length = self.reference_length();
        let (hu, hv) = (1e-7 * u_span, 1e-7 * v_span);
        let solve = |mut u: f64, mut v: f64| -> (f64, f64, f64) {
            for _ in 0..self.config.undeform_max_iterations {
                let r = deformed_at(u, v) - p;
                if r.length() <= f64::EPSILON * reference_length {
                    break;
                }
                let ju = (deformed_at((u + hu).min(u_hi), v) - deformed_at((u - hu).max(u_lo), v))
                    / ((u + hu).min(u_hi) - (u - hu).max(u_lo));
                let jv = (deformed_at(u, (v + hv).min(v_hi)) - deformed_at(u, (v - hv).max(v_lo)))
                    / ((v + hv).min(v_hi) - (v - hv).max(v_lo));

                let (a, b, c) = (ju.dot(ju), ju.dot(jv), jv.dot(jv));
                let det = a * c - b * b;
                if det.abs() <= f64::MIN_POSITIVE {
                    break;
                }
                let (gu, gv) = (ju.dot(r), jv.dot(r));
                let du = -(c * gu - b * gv) / det;
                let dv = -(a * gv - b * gu) / det;

                u = (u + du).clamp(u_lo, u_hi);
                v = (v + dv).clamp(v_lo, v_hi);
                if du.abs() / u_span + dv.abs() / v_span < self.config.undeform_tolerance {
                    break;
                }
            }
            (u, v, deformed_at(u, v).distance(p))
        };

        // Several nearest lattice seeds. On a wrapped section the two sheets
        // meet at the trailing edge, so a single seed can land on the wrong one.
        let mut seeds: Vec<(f64, f64, f64)> = base
            .xyz
            .indices()
            .map(|(i, j)| {
                let (u, v) = (*base.u.get(i, j), *base.v.get(i, j));
                (deformed_at(u, v).distance_squared(p), u, v)
            })
            .collect();
        seeds.sort_by(|a, b| a.0.total_cmp(&b.0));

        let converged = self.config.undeform_tolerance * reference_length;
        let mut best = (u_lo, v_lo, f64::INFINITY);
        for &(_, u0, v0) in seeds.iter().take(UNDEFORM_SEEDS) {
            let candidate = solve(u0, v0);
            if candidate.2 < best.2 {
                best = candidate;
            }
            if best.2 <= converged {
                break;
            }
        }
        let (u, v, _) = best;

        let x = undeformed_at(u, v);
        if !x.is_finite() {
            return Err(AeroError::Deformation(format!(
                "could not map {p:?} back to the undeformed surface"
            )));
        }
        Ok(x)
    }

    /// Cart3D surfaces: subtract the displacement of the nearest node.
    fn undeform_unstructured(&self, fem: &FemGrid, p: DVec3) -> AeroResult<DVec3> {
        let mesh = self
            .mesh()
            .ok_or_else(|| AeroError::Deformation("surface has no geometry to undeform".into()))?;
        let nearest = (0..mesh.vertex_count())
            .min_by(|&a, &b| {
                let da = mesh.position_vec3(a).distance_squared(p);
                let db = mesh.position_vec3(b).distance_squared(p);
                da.total_cmp(&db)
            })
            .ok_or_else(|| AeroError::Deformation("surface mesh is empty".into()))?;
        Ok(p - fem.displacement_at(mesh.uv_u[nearest], mesh.uv_v[nearest]))
    }

    /// Puts every point back where it was before the first deformation.
    fn restore_undeformed(&mut self) {
        let Some(snapshot) = self.undeformed.take() else {
            return;
        };
        self.patch = snapshot.patch;
        self.edges.reset_deformed();
        if let Some(grids) = self.grids.as_mut() {
            for (n, &p) in snapshot.mesh_nodes.iter().enumerate() {
                grids.mesh.set_position(n, p);
            }
            compute_vertex_normals(&mut grids.mesh);
            grids.refresh_geometry();
        }
    }
}

/// Trailing-edge mesh nodes: column 1 of a wrapped wing, column `nj` of an
/// open sheet, one node per row in row order.
fn trailing_edge_nodes(map: &Lattice<u32>, wrapped: bool) -> Vec<u32> {
    let column = if wrapped { 1 } else { map.nj() };
    let mut nodes: Vec<u32> = Vec::with_capacity(map.ni());
    for i in 1..=map.ni() {
        let n = *map.get(i, column);
        if !nodes.contains(&n) {
            nodes.push(n);
        }
    }
    nodes
}

/// Carries `normal` along the rotation that takes the undeformed surface
/// direction `before` to the deformed one `after`.
fn rotate_normal(normal: DVec3, before: DVec3, after: DVec3) -> DVec3 {
    if before == DVec3::ZERO || after == DVec3::ZERO {
        return normal;
    }
    DQuat::from_rotation_arc(before, after) * normal
}

fn transform_mesh(mesh: &mut TriangleMesh, t: &RigidTransform) {
    for n in 0..mesh.vertex_count() {
        mesh.set_position(n, t.apply_point(mesh.position_vec3(n)));
        mesh.set_normal(n, t.apply_vector(mesh.normal_vec3(n)));
    }
}
