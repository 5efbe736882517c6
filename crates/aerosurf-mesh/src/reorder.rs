//! Bandwidth-reducing node reordering (reverse Cuthill–McKee).
//!
//! The node adjacency graph is walked breadth-first from a pseudo-peripheral
//! start node, neighbours visited in increasing degree, and the visitation
//! order reversed. Disconnected components are processed one after another
//! and concatenated.
//!
//! The reorder never makes things worse: if the RCM numbering has a larger
//! bandwidth than the incoming one, the identity permutation is kept.

use std::collections::VecDeque;

use aerosurf_math::CsrGraph;
use serde::{Deserialize, Serialize};

use crate::mesh::TriangleMesh;

/// A bijective node renumbering.
///
/// `new_to_old[new] = old` and `old_to_new[old] = new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permutation {
    pub new_to_old: Vec<u32>,
    pub old_to_new: Vec<u32>,
}

/// Outcome of a mesh reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderReport {
    pub bandwidth_before: usize,
    pub bandwidth_after: usize,
    /// False when the RCM numbering was rejected in favour of the identity.
    pub applied: bool,
}

impl Permutation {
    /// The identity permutation on `n` nodes.
    pub fn identity(n: usize) -> Self {
        let ids: Vec<u32> = (0..n as u32).collect();
        Self {
            new_to_old: ids.clone(),
            old_to_new: ids,
        }
    }

    /// Builds a permutation from a `new → old` ordering.
    ///
    /// Returns `None` unless `order` is a bijection on `0..order.len()`.
    pub fn from_new_to_old(order: Vec<u32>) -> Option<Self> {
        let n = order.len();
        let mut old_to_new = vec![u32::MAX; n];
        for (new, &old) in order.iter().enumerate() {
            let slot = old_to_new.get_mut(old as usize)?;
            if *slot != u32::MAX {
                return None;
            }
            *slot = new as u32;
        }
        Some(Self {
            new_to_old: order,
            old_to_new,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.new_to_old.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.new_to_old.is_empty()
    }

    pub fn is_identity(&self) -> bool {
        self.new_to_old
            .iter()
            .enumerate()
            .all(|(i, &o)| i as u32 == o)
    }

    /// True if both maps are mutually inverse bijections.
    pub fn is_bijection(&self) -> bool {
        let n = self.len();
        self.old_to_new.len() == n
            && self.new_to_old.iter().enumerate().all(|(new, &old)| {
                (old as usize) < n && self.old_to_new[old as usize] as usize == new
            })
    }

    /// The inverse renumbering.
    pub fn inverse(&self) -> Self {
        Self {
            new_to_old: self.old_to_new.clone(),
            old_to_new: self.new_to_old.clone(),
        }
    }

    /// New index of old node `old`.
    #[inline]
    pub fn map(&self, old: u32) -> u32 {
        self.old_to_new[old as usize]
    }

    /// Reorders a per-node array: `out[new] = data[new_to_old[new]]`.
    pub fn apply<T: Clone>(&self, data: &[T]) -> Vec<T> {
        self.new_to_old
            .iter()
            .map(|&old| data[old as usize].clone())
            .collect()
    }

    /// Applies `self` first and then `next`.
    pub fn then(&self, next: &Permutation) -> Self {
        let new_to_old = next
            .new_to_old
            .iter()
            .map(|&mid| self.new_to_old[mid as usize])
            .collect();
        let old_to_new = self
            .old_to_new
            .iter()
            .map(|&mid| next.old_to_new[mid as usize])
            .collect();
        Self {
            new_to_old,
            old_to_new,
        }
    }
}

/// Node adjacency graph derived from triangle connectivity.
pub fn node_graph(mesh: &TriangleMesh) -> CsrGraph {
    let mut edges = Vec::with_capacity(mesh.triangle_count() * 3);
    for t in 0..mesh.triangle_count() {
        let [a, b, c] = mesh.triangle(t);
        edges.push((a, b));
        edges.push((b, c));
        edges.push((c, a));
    }
    CsrGraph::from_edges(mesh.vertex_count(), &edges)
}

/// Reverse Cuthill–McKee ordering of `graph`.
pub fn reverse_cuthill_mckee(graph: &CsrGraph) -> Permutation {
    let n = graph.nodes;
    let mut visited = vec![false; n];
    let mut order: Vec<u32> = Vec::with_capacity(n);
    let mut queue = VecDeque::new();

    while order.len() < n {
        // Minimum-degree unvisited node seeds the next component
        let seed = (0..n)
            .filter(|&v| !visited[v])
            .min_by_key(|&v| (graph.degree(v), v))
            .unwrap_or(0);
        let start = pseudo_peripheral_node(graph, seed);

        visited[start] = true;
        queue.push_back(start);
        while let Some(v) = queue.pop_front() {
            order.push(v as u32);
            let mut next: Vec<usize> = graph
                .neighbors(v)
                .iter()
                .map(|&w| w as usize)
                .filter(|&w| !visited[w])
                .collect();
            next.sort_by_key(|&w| (graph.degree(w), w));
            for w in next {
                visited[w] = true;
                queue.push_back(w);
            }
        }
    }

    order.reverse();
    let old_to_new = inverse_order(&order);
    Permutation {
        new_to_old: order,
        old_to_new,
    }
}

/// Computes RCM for `mesh` without touching it, falling back to the
/// identity when RCM would widen the band.
pub fn plan_reorder(mesh: &TriangleMesh) -> (Permutation, ReorderReport) {
    let graph = node_graph(mesh);
    let bandwidth_before = graph.bandwidth();
    let rcm = reverse_cuthill_mckee(&graph);
    let bandwidth_rcm = graph.bandwidth_with(|v| rcm.old_to_new[v] as usize);

    if bandwidth_rcm <= bandwidth_before {
        (
            rcm,
            ReorderReport {
                bandwidth_before,
                bandwidth_after: bandwidth_rcm,
                applied: true,
            },
        )
    } else {
        tracing::warn!(
            bandwidth_before,
            bandwidth_rcm,
            "RCM widened the band, keeping incoming node order"
        );
        (
            Permutation::identity(mesh.vertex_count()),
            ReorderReport {
                bandwidth_before,
                bandwidth_after: bandwidth_before,
                applied: false,
            },
        )
    }
}

/// Renumbers the nodes of `mesh` and the triangle references to them.
pub fn apply_to_mesh(mesh: &mut TriangleMesh, perm: &Permutation) {
    mesh.pos_x = perm.apply(&mesh.pos_x);
    mesh.pos_y = perm.apply(&mesh.pos_y);
    mesh.pos_z = perm.apply(&mesh.pos_z);
    mesh.normal_x = perm.apply(&mesh.normal_x);
    mesh.normal_y = perm.apply(&mesh.normal_y);
    mesh.normal_z = perm.apply(&mesh.normal_z);
    mesh.uv_u = perm.apply(&mesh.uv_u);
    mesh.uv_v = perm.apply(&mesh.uv_v);
    for idx in mesh.indices.iter_mut() {
        *idx = perm.map(*idx);
    }
}

/// Runs [`plan_reorder`] and applies the result in place.
pub fn reorder_mesh(mesh: &mut TriangleMesh) -> (Permutation, ReorderReport) {
    let (perm, report) = plan_reorder(mesh);
    if report.applied {
        apply_to_mesh(mesh, &perm);
    }
    tracing::debug!(
        before = report.bandwidth_before,
        after = report.bandwidth_after,
        "node reorder"
    );
    (perm, report)
}

/// Finds a pseudo-peripheral node of the component containing `seed`
/// (George–Liu): jump to a minimum-degree node of the deepest BFS level
/// until the eccentricity stops growing.
fn pseudo_peripheral_node(graph: &CsrGraph, seed: usize) -> usize {
    let mut current = seed;
    let (mut depth, mut last_level) = bfs_levels(graph, current);
    loop {
        let candidate = last_level
            .iter()
            .copied()
            .min_by_key(|&v| (graph.degree(v), v))
            .unwrap_or(current);
        let (cand_depth, cand_last) = bfs_levels(graph, candidate);
        if cand_depth > depth {
            current = candidate;
            depth = cand_depth;
            last_level = cand_last;
        } else {
            return current;
        }
    }
}

/// BFS from `root`: returns the eccentricity and the deepest level's nodes.
fn bfs_levels(graph: &CsrGraph, root: usize) -> (usize, Vec<usize>) {
    let mut dist = vec![usize::MAX; graph.nodes];
    dist[root] = 0;
    let mut level = vec![root];
    let mut depth = 0;
    loop {
        let mut next = Vec::new();
        for &v in &level {
            for &w in graph.neighbors(v) {
                let w = w as usize;
                if dist[w] == usize::MAX {
                    dist[w] = depth + 1;
                    next.push(w);
                }
            }
        }
        if next.is_empty() {
            return (depth, level);
        }
        depth += 1;
        level = next;
    }
}

fn inverse_order(order: &[u32]) -> Vec<u32> {
    let mut inv = vec![0u32; order.len()];
    for (new, &old) in order.iter().enumerate() {
        inv[old as usize] = new as u32;
    }
    inv
}
