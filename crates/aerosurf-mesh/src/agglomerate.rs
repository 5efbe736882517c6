//! Multigrid agglomeration.
//!
//! Each coarse level is produced from the previous one by greedy pairwise
//! merging of adjacent loops whose normals agree, followed by a pass that
//! attaches leftover loops to an adjacent coarse loop with room to spare.
//! A level that would be too small, or that barely coarsens its parent,
//! ends the hierarchy.

use aerosurf_types::constants::{
    DEFAULT_MAX_AGGLOMERATE_SIZE, DEFAULT_MAX_GRID_LEVELS, DEFAULT_MAX_MERGE_RATIO,
    DEFAULT_MIN_COARSE_PANELS, DEFAULT_MIN_NORMAL_ALIGNMENT,
};
use aerosurf_types::{AeroError, AeroResult};
use serde::{Deserialize, Serialize};

use crate::grid::{GridHierarchy, GridLevel};

/// Coarsening controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgglomerationParams {
    /// Maximum number of levels, including the fine level.
    pub max_levels: usize,
    /// A coarse level with fewer loops is rejected.
    pub min_coarse_panels: usize,
    /// A coarse level keeping more than this fraction of its parent's loops is rejected.
    pub max_merge_ratio: f64,
    /// Minimum normal cosine for two loops to merge.
    pub min_normal_alignment: f64,
    /// Maximum number of parent loops in one coarse loop.
    pub max_agglomerate_size: usize,
}

impl Default for AgglomerationParams {
    fn default() -> Self {
        Self {
            max_levels: DEFAULT_MAX_GRID_LEVELS,
            min_coarse_panels: DEFAULT_MIN_COARSE_PANELS,
            max_merge_ratio: DEFAULT_MAX_MERGE_RATIO,
            min_normal_alignment: DEFAULT_MIN_NORMAL_ALIGNMENT,
            max_agglomerate_size: DEFAULT_MAX_AGGLOMERATE_SIZE,
        }
    }
}

/// Computes the fine → coarse partition of `fine`.
///
/// Returns the map and the number of coarse loops.
pub fn partition(fine: &GridLevel, params: &AgglomerationParams) -> (Vec<u32>, usize) {
    const UNASSIGNED: u32 = u32::MAX;
    let n = fine.number_of_loops();
    let mut owner = vec![UNASSIGNED; n];
    let mut sizes: Vec<usize> = Vec::new();

    // Pairing pass
    if params.max_agglomerate_size >= 2 {
        for lp in 0..n as u32 {
            if owner[lp as usize] != UNASSIGNED {
                continue;
            }
            let normal = fine.loops[lp as usize].normal;
            let mut best: Option<(f64, f64, u32)> = None;
            for (nb, e) in fine.neighbors(lp) {
                if owner[nb as usize] != UNASSIGNED || nb == lp {
                    continue;
                }
                let align = normal.dot(fine.loops[nb as usize].normal);
                if align < params.min_normal_alignment {
                    continue;
                }
                let len = fine.edges[e as usize].length;
                let better = match best {
                    None => true,
                    Some((ba, bl, bn)) => {
                        align > ba || (align == ba && (len > bl || (len == bl && nb < bn)))
                    }
                };
                if better {
                    best = Some((align, len, nb));
                }
            }
            if let Some((_, _, nb)) = best {
                let id = sizes.len() as u32;
                owner[lp as usize] = id;
                owner[nb as usize] = id;
                sizes.push(2);
            }
        }
    }

    // Leftovers join a neighbouring coarse loop with room, else stay single
    for lp in 0..n as u32 {
        if owner[lp as usize] != UNASSIGNED {
            continue;
        }
        let normal = fine.loops[lp as usize].normal;
        let mut best: Option<(f64, u32)> = None;
        for (nb, _) in fine.neighbors(lp) {
            let c = owner[nb as usize];
            if c == UNASSIGNED || sizes[c as usize] >= params.max_agglomerate_size {
                continue;
            }
            let align = normal.dot(fine.loops[nb as usize].normal);
            if align < params.min_normal_alignment {
                continue;
            }
            let better = match best {
                None => true,
                Some((ba, bc)) => align > ba || (align == ba && c < bc),
            };
            if better {
                best = Some((align, c));
            }
        }
        match best {
            Some((_, c)) => {
                owner[lp as usize] = c;
                sizes[c as usize] += 1;
            }
            None => {
                owner[lp as usize] = sizes.len() as u32;
                sizes.push(1);
            }
        }
    }

    (owner, sizes.len())
}

/// Builds one coarse level on top of `fine`, or explains why it cannot.
pub fn coarsen(
    hierarchy: &GridHierarchy,
    fine: &GridLevel,
    params: &AgglomerationParams,
) -> AeroResult<GridLevel> {
    let fine_count = fine.number_of_loops();
    let (map, coarse_count) = partition(fine, params);

    if coarse_count < params.min_coarse_panels {
        return Err(AeroError::Agglomeration(format!(
            "coarse level would have {} panels, minimum is {}",
            coarse_count, params.min_coarse_panels
        )));
    }
    if coarse_count as f64 > params.max_merge_ratio * fine_count as f64 {
        return Err(AeroError::Agglomeration(format!(
            "coarse level keeps {} of {} panels, above merge ratio {}",
            coarse_count, fine_count, params.max_merge_ratio
        )));
    }

    GridLevel::from_partition(
        fine,
        map,
        coarse_count,
        &hierarchy.mesh,
        &hierarchy.topology,
        hierarchy.flow_direction,
    )
}

/// Rebuilds every coarse level of `hierarchy`.
///
/// Stops early, without failing, when a level cannot be coarsened further.
/// Returns the resulting number of levels.
pub fn agglomerate(hierarchy: &mut GridHierarchy, params: &AgglomerationParams) -> usize {
    hierarchy.truncate_to_fine();
    let max_levels = params.max_levels.max(1);

    while hierarchy.number_of_levels() < max_levels {
        let fine = &hierarchy.levels[hierarchy.number_of_levels() - 1];
        match coarsen(hierarchy, fine, params) {
            Ok(level) => {
                tracing::debug!(
                    level = hierarchy.number_of_levels(),
                    loops = level.number_of_loops(),
                    "coarse level built"
                );
                hierarchy.levels.push(level);
            }
            Err(e) => {
                tracing::warn!(
                    levels = hierarchy.number_of_levels(),
                    reason = %e,
                    "agglomeration stopped early"
                );
                break;
            }
        }
    }

    hierarchy.number_of_levels()
}
