//! Mesh topology queries.
//!
//! Builds adjacency data structures from the triangle index buffer,
//! enabling the neighbor queries needed downstream
//! (node-to-triangle, edge adjacency, triangle-to-edge).
//!
//! Edge numbering is deterministic: edges are numbered in the order they
//! are first met while sweeping triangles in index order, local edges
//! `(n0,n1)`, `(n1,n2)`, `(n2,n0)`. Identical connectivity therefore always
//! yields identical edge ids, which the Kutta-node and upwind metadata rely on.

use std::collections::HashMap;

use crate::mesh::TriangleMesh;

/// Precomputed topology information for a triangle mesh.
///
/// Rebuilt whenever a new mesh is generated or renumbered.
/// Provides O(1) adjacency queries used by:
/// - Sharp trailing-edge detection (edge neighbors, node fans)
/// - Upwind edge classification
/// - Multigrid agglomeration (triangle neighbors)
#[derive(Debug, Clone)]
pub struct Topology {
    /// For each node, the list of triangles that contain it.
    pub vertex_triangles: Vec<Vec<u32>>,

    /// Unique edges as `[n_min, n_max]` pairs.
    pub edges: Vec<[u32; 2]>,

    /// For each edge, the one or two adjacent triangles, in triangle order.
    /// Boundary edges have exactly 1 adjacent triangle.
    pub edge_triangles: Vec<Vec<u32>>,

    /// For each triangle, its three edge ids in local edge order.
    pub triangle_edges: Vec<[u32; 3]>,

    edge_lookup: HashMap<(u32, u32), u32>,
}

impl Topology {
    /// Build topology from a triangle mesh.
    pub fn build(mesh: &TriangleMesh) -> Self {
        let vertex_count = mesh.vertex_count();
        let tri_count = mesh.triangle_count();

        // Build node → triangle adjacency
        let mut vertex_triangles: Vec<Vec<u32>> = vec![Vec::new(); vertex_count];
        for t in 0..tri_count {
            for n in mesh.triangle(t) {
                vertex_triangles[n as usize].push(t as u32);
            }
        }

        // Build edge → triangle map
        // Key: (min_node, max_node) to canonicalize edge direction
        let mut edge_lookup: HashMap<(u32, u32), u32> = HashMap::new();
        let mut edges: Vec<[u32; 2]> = Vec::new();
        let mut edge_triangles: Vec<Vec<u32>> = Vec::new();
        let mut triangle_edges: Vec<[u32; 3]> = Vec::with_capacity(tri_count);

        for t in 0..tri_count {
            let [a, b, c] = mesh.triangle(t);
            let mut local = [0u32; 3];
            for (k, (v0, v1)) in [(a, b), (b, c), (c, a)].into_iter().enumerate() {
                let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };
                let edge = *edge_lookup.entry(key).or_insert_with(|| {
                    edges.push([key.0, key.1]);
                    edge_triangles.push(Vec::with_capacity(2));
                    (edges.len() - 1) as u32
                });
                edge_triangles[edge as usize].push(t as u32);
                local[k] = edge;
            }
            triangle_edges.push(local);
        }

        Self {
            vertex_triangles,
            edges,
            edge_triangles,
            triangle_edges,
            edge_lookup,
        }
    }

    /// Number of triangles incident on node `v` (`NumberOfTrisForNode`).
    #[inline]
    pub fn number_of_tris_for_node(&self, v: u32) -> usize {
        self.vertex_triangles[v as usize].len()
    }

    /// Triangles incident on node `v`, ascending (`NodeToTriList`).
    #[inline]
    pub fn node_to_tri_list(&self, v: u32) -> &[u32] {
        &self.vertex_triangles[v as usize]
    }

    /// Edge id joining nodes `a` and `b`, if it exists.
    pub fn edge_index(&self, a: u32, b: u32) -> Option<u32> {
        let key = if a < b { (a, b) } else { (b, a) };
        self.edge_lookup.get(&key).copied()
    }

    /// Triangle across edge `edge` from triangle `tri`, if any.
    pub fn neighbor_across(&self, tri: u32, edge: u32) -> Option<u32> {
        self.edge_triangles[edge as usize]
            .iter()
            .copied()
            .find(|&t| t != tri)
    }

    /// Returns the number of boundary edges (edges with only 1 adjacent triangle).
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_triangles
            .iter()
            .filter(|tris| tris.len() == 1)
            .count()
    }

    /// Returns true if the mesh is closed (no boundary edges).
    pub fn is_closed(&self) -> bool {
        self.boundary_edge_count() == 0
    }
}
