//! Sparse adjacency representation.
//!
//! Node-to-node connectivity of a triangulated surface stored as a
//! symmetric CSR (Compressed Sparse Row) pattern without values. This is
//! the graph the bandwidth-reducing reorder walks.

use serde::{Deserialize, Serialize};

/// Symmetric adjacency graph in CSR layout.
///
/// `col_idx[row_ptr[v]..row_ptr[v + 1]]` are the neighbours of `v`,
/// sorted ascending, without duplicates or self loops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrGraph {
    /// Number of nodes.
    pub nodes: usize,
    /// Row pointer array (length = nodes + 1).
    pub row_ptr: Vec<usize>,
    /// Neighbour indices.
    pub col_idx: Vec<u32>,
}

impl CsrGraph {
    /// Creates a graph with `nodes` isolated nodes.
    pub fn new(nodes: usize) -> Self {
        Self {
            nodes,
            row_ptr: vec![0; nodes + 1],
            col_idx: Vec::new(),
        }
    }

    /// Builds the graph from undirected edges `(a, b)`.
    ///
    /// Each edge is inserted in both directions. Duplicates and self loops
    /// are dropped.
    pub fn from_edges(nodes: usize, edges: &[(u32, u32)]) -> Self {
        // Count entries per row
        let mut row_counts = vec![0usize; nodes];
        for &(a, b) in edges {
            if a == b {
                continue;
            }
            row_counts[a as usize] += 1;
            row_counts[b as usize] += 1;
        }

        let mut row_ptr = vec![0usize; nodes + 1];
        for i in 0..nodes {
            row_ptr[i + 1] = row_ptr[i] + row_counts[i];
        }

        // Fill in; cursor tracks the write position of each row
        let mut col_idx = vec![0u32; row_ptr[nodes]];
        let mut cursor = row_ptr[..nodes].to_vec();
        for &(a, b) in edges {
            if a == b {
                continue;
            }
            col_idx[cursor[a as usize]] = b;
            cursor[a as usize] += 1;
            col_idx[cursor[b as usize]] = a;
            cursor[b as usize] += 1;
        }

        // Sort and deduplicate each row, compacting in place
        let mut compact_ptr = vec![0usize; nodes + 1];
        let mut write = 0usize;
        for v in 0..nodes {
            let (start, end) = (row_ptr[v], row_ptr[v + 1]);
            let mut row: Vec<u32> = col_idx[start..end].to_vec();
            row.sort_unstable();
            row.dedup();
            for n in row {
                col_idx[write] = n;
                write += 1;
            }
            compact_ptr[v + 1] = write;
        }
        col_idx.truncate(write);

        Self {
            nodes,
            row_ptr: compact_ptr,
            col_idx,
        }
    }

    /// Returns the number of stored (directed) adjacency entries.
    pub fn nnz(&self) -> usize {
        self.col_idx.len()
    }

    /// Neighbours of node `v`, ascending.
    #[inline]
    pub fn neighbors(&self, v: usize) -> &[u32] {
        &self.col_idx[self.row_ptr[v]..self.row_ptr[v + 1]]
    }

    /// Number of neighbours of node `v`.
    #[inline]
    pub fn degree(&self, v: usize) -> usize {
        self.row_ptr[v + 1] - self.row_ptr[v]
    }

    /// Matrix bandwidth under the current numbering: max |a − b| over edges.
    pub fn bandwidth(&self) -> usize {
        self.bandwidth_with(|v| v)
    }

    /// Bandwidth if node `v` were renumbered to `number(v)`.
    pub fn bandwidth_with<F: Fn(usize) -> usize>(&self, number: F) -> usize {
        let mut bw = 0usize;
        for v in 0..self.nodes {
            let nv = number(v);
            for &w in self.neighbors(v) {
                bw = bw.max(nv.abs_diff(number(w as usize)));
            }
        }
        bw
    }
}
