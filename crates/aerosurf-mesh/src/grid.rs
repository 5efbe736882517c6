//! Multigrid grid hierarchy.
//!
//! Level 0 is the fine triangle mesh: one loop per triangle and one grid
//! edge per mesh edge. Coarser levels are produced by
//! [`crate::agglomerate`]; each coarse loop keeps the list of fine triangles
//! it covers, so its geometry can always be recomputed from the mesh after
//! a deformation or rigid-body move.

use aerosurf_math::DVec3;
use aerosurf_types::{AeroError, AeroResult};
use serde::{Deserialize, Serialize};

use crate::mesh::TriangleMesh;
use crate::topology::Topology;

/// A panel of a grid level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loop {
    /// Fine-mesh triangles covered by this loop, ascending.
    pub triangles: Vec<u32>,
    pub area: f64,
    /// Area-weighted centroid.
    pub centroid: DVec3,
    /// Area-weighted unit normal.
    pub normal: DVec3,
}

/// An edge of a grid level with its upwind classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridEdge {
    /// First adjacent loop.
    pub left: u32,
    /// Second adjacent loop; `None` on the surface boundary.
    pub right: Option<u32>,
    /// Edges of the previous level merged into this one (empty on level 0).
    pub fine_edges: Vec<u32>,
    /// Mesh edges (topology ids) making up this edge.
    pub mesh_edges: Vec<u32>,
    pub length: f64,
    /// Length-weighted midpoint.
    pub midpoint: DVec3,
    pub upwind: Option<u32>,
    pub downwind: Option<u32>,
}

impl GridEdge {
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.right.is_none()
    }

    /// The loop across this edge from `lp`.
    pub fn other(&self, lp: u32) -> Option<u32> {
        if self.left == lp {
            self.right
        } else if self.right == Some(lp) {
            Some(self.left)
        } else {
            None
        }
    }
}

/// One level of the hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridLevel {
    pub loops: Vec<Loop>,
    pub edges: Vec<GridEdge>,
    /// Edge ids bounding each loop, ascending.
    pub loop_edges: Vec<Vec<u32>>,
    /// Previous-level loop → loop of this level. Empty on level 0.
    pub fine_to_coarse: Vec<u32>,
}

impl GridLevel {
    #[inline]
    pub fn number_of_loops(&self) -> usize {
        self.loops.len()
    }

    #[inline]
    pub fn number_of_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn total_area(&self) -> f64 {
        self.loops.iter().map(|l| l.area).sum()
    }

    /// Loop upwind of `lp` across edge `edge`, if that neighbour is upwind.
    pub fn upwind_neighbor(&self, lp: u32, edge: u32) -> Option<u32> {
        let e = self.edges.get(edge as usize)?;
        let other = e.other(lp)?;
        (e.upwind == Some(other)).then_some(other)
    }

    /// Loops adjacent to `lp`, in edge order.
    pub fn neighbors(&self, lp: u32) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.loop_edges[lp as usize]
            .iter()
            .filter_map(move |&e| self.edges[e as usize].other(lp).map(|n| (n, e)))
    }

    /// Builds a level from a loop partition of the previous level.
    ///
    /// `fine_to_coarse[f]` names the coarse loop owning fine loop `f`; coarse
    /// ids must be dense `0..coarse_count`.
    pub fn from_partition(
        fine: &GridLevel,
        fine_to_coarse: Vec<u32>,
        coarse_count: usize,
        mesh: &TriangleMesh,
        topo: &Topology,
        flow_dir: DVec3,
    ) -> AeroResult<Self> {
        if fine_to_coarse.len() != fine.loops.len()
            || fine_to_coarse.iter().any(|&c| c as usize >= coarse_count)
        {
            return Err(AeroError::Agglomeration(
                "fine-to-coarse map does not cover the fine level".into(),
            ));
        }

        let mut members: Vec<Vec<u32>> = vec![Vec::new(); coarse_count];
        for (f, &c) in fine_to_coarse.iter().enumerate() {
            members[c as usize].extend_from_slice(&fine.loops[f].triangles);
        }
        let loops = members
            .into_iter()
            .map(|mut tris| {
                tris.sort_unstable();
                loop_from_triangles(mesh, tris)
            })
            .collect::<Vec<_>>();

        // Coarse edges group the previous level's edges by coarse loop pair,
        // in order of first appearance; edges inside one coarse loop vanish
        let mut edges: Vec<GridEdge> = Vec::new();
        let mut by_pair = std::collections::HashMap::new();
        for (fe, edge) in fine.edges.iter().enumerate() {
            let a = fine_to_coarse[edge.left as usize];
            let b = edge.right.map(|r| fine_to_coarse[r as usize]);
            let key = match b {
                Some(b) if b == a => continue,
                Some(b) => (a.min(b), Some(a.max(b))),
                None => (a, None),
            };
            let id = *by_pair.entry(key).or_insert_with(|| {
                edges.push(GridEdge {
                    left: key.0,
                    right: key.1,
                    fine_edges: Vec::new(),
                    mesh_edges: Vec::new(),
                    length: 0.0,
                    midpoint: DVec3::ZERO,
                    upwind: None,
                    downwind: None,
                });
                edges.len() - 1
            });
            edges[id].fine_edges.push(fe as u32);
            edges[id].mesh_edges.extend_from_slice(&edge.mesh_edges);
        }

        let mut level = Self {
            loop_edges: loop_edges(loops.len(), &edges),
            loops,
            edges,
            fine_to_coarse,
        };
        level.refresh_edges(mesh, topo, flow_dir);
        Ok(level)
    }

    /// Recomputes loop and edge geometry and upwind data from `mesh`.
    pub fn refresh_geometry(&mut self, mesh: &TriangleMesh, topo: &Topology, flow_dir: DVec3) {
        for lp in self.loops.iter_mut() {
            let tris = std::mem::take(&mut lp.triangles);
            *lp = loop_from_triangles(mesh, tris);
        }
        self.refresh_edges(mesh, topo, flow_dir);
    }

    fn refresh_edges(&mut self, mesh: &TriangleMesh, topo: &Topology, flow_dir: DVec3) {
        for edge in self.edges.iter_mut() {
            let mut length = 0.0;
            let mut weighted = DVec3::ZERO;
            for &me in &edge.mesh_edges {
                let [a, b] = topo.edges[me as usize];
                let pa = mesh.position_vec3(a as usize);
                let pb = mesh.position_vec3(b as usize);
                let l = pa.distance(pb);
                length += l;
                weighted += 0.5 * (pa + pb) * l;
            }
            edge.length = length;
            edge.midpoint = if length > 0.0 {
                weighted / length
            } else {
                // Zero-length edge: fall back to the plain mean of midpoints
                let n = edge.mesh_edges.len().max(1) as f64;
                edge.mesh_edges
                    .iter()
                    .map(|&me| {
                        let [a, b] = topo.edges[me as usize];
                        0.5 * (mesh.position_vec3(a as usize) + mesh.position_vec3(b as usize))
                    })
                    .sum::<DVec3>()
                    / n
            };
            classify_upwind(edge, &self.loops, flow_dir);
        }
    }
}

/// The grid-level chain of one surface, together with the fine mesh it is
/// built on.
#[derive(Debug, Clone)]
pub struct GridHierarchy {
    pub mesh: TriangleMesh,
    pub topology: Topology,
    pub levels: Vec<GridLevel>,
    pub flow_direction: DVec3,
}

impl GridHierarchy {
    /// Builds the hierarchy with only the fine level.
    pub fn new(mesh: TriangleMesh, flow_direction: DVec3) -> Self {
        let topology = Topology::build(&mesh);
        let flow_direction = flow_direction.normalize_or_zero();
        let fine = build_fine_level(&mesh, &topology, flow_direction);
        Self {
            mesh,
            topology,
            levels: vec![fine],
            flow_direction,
        }
    }

    #[inline]
    pub fn number_of_levels(&self) -> usize {
        self.levels.len()
    }

    /// Level `level`, saturating at the coarsest available level.
    pub fn grid(&self, level: usize) -> &GridLevel {
        let last = self.levels.len().saturating_sub(1);
        &self.levels[level.min(last)]
    }

    #[inline]
    pub fn fine_grid(&self) -> &GridLevel {
        &self.levels[0]
    }

    /// Drops every coarse level.
    pub fn truncate_to_fine(&mut self) {
        self.levels.truncate(1);
    }

    /// Recomputes every level's geometry after the mesh nodes moved.
    pub fn refresh_geometry(&mut self) {
        for level in self.levels.iter_mut() {
            level.refresh_geometry(&self.mesh, &self.topology, self.flow_direction);
        }
    }
}

/// Level 0: one loop per triangle, one edge per mesh edge.
pub fn build_fine_level(mesh: &TriangleMesh, topo: &Topology, flow_dir: DVec3) -> GridLevel {
    let loops = (0..mesh.triangle_count())
        .map(|t| loop_from_triangles(mesh, vec![t as u32]))
        .collect::<Vec<_>>();

    let edges = topo
        .edge_triangles
        .iter()
        .enumerate()
        .map(|(e, tris)| GridEdge {
            left: tris[0],
            right: tris.get(1).copied(),
            fine_edges: Vec::new(),
            mesh_edges: vec![e as u32],
            length: 0.0,
            midpoint: DVec3::ZERO,
            upwind: None,
            downwind: None,
        })
        .collect::<Vec<_>>();

    let mut level = GridLevel {
        loop_edges: loop_edges(loops.len(), &edges),
        loops,
        edges,
        fine_to_coarse: Vec::new(),
    };
    level.refresh_edges(mesh, topo, flow_dir);
    level
}

fn loop_from_triangles(mesh: &TriangleMesh, triangles: Vec<u32>) -> Loop {
    let mut area = 0.0;
    let mut centroid = DVec3::ZERO;
    let mut normal = DVec3::ZERO;
    for &t in &triangles {
        let cross = mesh.triangle_cross(t as usize);
        let a = 0.5 * cross.length();
        area += a;
        centroid += a * mesh.triangle_centroid(t as usize);
        normal += 0.5 * cross;
    }
    let centroid = if area > 0.0 {
        centroid / area
    } else {
        let n = triangles.len().max(1) as f64;
        triangles
            .iter()
            .map(|&t| mesh.triangle_centroid(t as usize))
            .sum::<DVec3>()
            / n
    };
    Loop {
        triangles,
        area,
        centroid,
        normal: normal.normalize_or_zero(),
    }
}

fn loop_edges(loop_count: usize, edges: &[GridEdge]) -> Vec<Vec<u32>> {
    let mut out = vec![Vec::new(); loop_count];
    for (e, edge) in edges.iter().enumerate() {
        out[edge.left as usize].push(e as u32);
        if let Some(r) = edge.right {
            out[r as usize].push(e as u32);
        }
    }
    out
}

fn classify_upwind(edge: &mut GridEdge, loops: &[Loop], flow_dir: DVec3) {
    let left_x = loops[edge.left as usize].centroid.dot(flow_dir);
    match edge.right {
        Some(right) => {
            let right_x = loops[right as usize].centroid.dot(flow_dir);
            let left_first = left_x < right_x || (left_x == right_x && edge.left < right);
            let (up, down) = if left_first {
                (edge.left, right)
            } else {
                (right, edge.left)
            };
            edge.upwind = Some(up);
            edge.downwind = Some(down);
        }
        None => {
            if edge.midpoint.dot(flow_dir) > left_x {
                edge.upwind = Some(edge.left);
                edge.downwind = None;
            } else {
                edge.upwind = None;
                edge.downwind = Some(edge.left);
            }
        }
    }
}
