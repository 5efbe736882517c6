//! Procedural structured patches.
//!
//! Used by the CLI, the benchmarks and the tests. All of them follow the
//! lattice conventions of [`StructuredPatch`]: `i` runs spanwise (or along
//! the body axis), `j` around the cross-section, and normals are
//! `∂p/∂j × ∂p/∂i`.

use std::f64::consts::PI;

use aerosurf_math::DVec3;

use crate::patch::StructuredPatch;

/// Relative tolerance used when deriving normals of generated geometry.
const GENERATOR_TOLERANCE: f64 = 1e-9;

/// A flat rectangular plate in the `z = 0` plane.
///
/// `ni` span rows from `y = 0` to `y = span`, `nj` chord points from the
/// leading edge `x = 0` to the trailing edge `x = chord`. The flat-plate
/// lattice equals the geometric one.
pub fn rectangular_wing(span: f64, chord: f64, ni: usize, nj: usize) -> StructuredPatch {
    let ni = ni.max(2);
    let nj = nj.max(2);
    let mut patch = StructuredPatch::new();
    patch.size_geometry_lists(ni, nj);
    patch.size_flat_plate_lists(ni, nj);

    for i in 1..=ni {
        let u = (i - 1) as f64 / (ni - 1) as f64;
        for j in 1..=nj {
            let v = (j - 1) as f64 / (nj - 1) as f64;
            let p = DVec3::new(v * chord, u * span, 0.0);
            patch.set_point(i, j, p, DVec3::Z, u, v);
            patch.set_plate_point(i, j, p, DVec3::Z, u, v);
        }
    }
    patch.compute_point_areas();
    patch
}

/// Half-thickness of a closed-trailing-edge NACA 4-digit symmetric section.
fn naca_half_thickness(x: f64, thickness: f64) -> f64 {
    5.0 * thickness
        * (0.2969 * x.sqrt() - 0.1260 * x - 0.3516 * x.powi(2) + 0.2843 * x.powi(3)
            - 0.1036 * x.powi(4))
}

/// A wrapped symmetric wing with `thickness` as a fraction of chord.
///
/// Each cross-section runs trailing edge → lower surface → leading edge →
/// upper surface → trailing edge with cosine spacing, so the lattice has
/// `2 * n_chord - 1` points in `j` and closes on itself. The flat plate is
/// the mean line: `ni` rows of `n_chord` points from leading to trailing
/// edge. A zero thickness gives a wrapped sheet folded back on itself.
pub fn thick_wing(
    span: f64,
    chord: f64,
    thickness: f64,
    ni: usize,
    n_chord: usize,
) -> StructuredPatch {
    let ni = ni.max(2);
    let n_chord = n_chord.max(3);
    let nj = 2 * n_chord - 1;

    // Cosine-spaced stations from x = 1 (TE) to x = 0 (LE)
    let stations: Vec<f64> = (0..n_chord)
        .map(|k| 0.5 * (1.0 + (PI * k as f64 / (n_chord - 1) as f64).cos()))
        .collect();

    let mut patch = StructuredPatch::new();
    patch.size_geometry_lists(ni, nj);
    patch.size_flat_plate_lists(ni, n_chord);

    for i in 1..=ni {
        let u = (i - 1) as f64 / (ni - 1) as f64;
        let y = u * span;
        for j in 1..=nj {
            let (x, side) = if j <= n_chord {
                (stations[j - 1], -1.0)
            } else {
                (stations[nj - j], 1.0)
            };
            let z = side * naca_half_thickness(x, thickness) * chord;
            let v = (j - 1) as f64 / (nj - 1) as f64;
            patch.set_point(i, j, DVec3::new(x * chord, y, z), DVec3::ZERO, u, v);
        }
        for j in 1..=n_chord {
            let x = stations[n_chord - j];
            let v = (j - 1) as f64 / (n_chord - 1) as f64;
            patch.set_plate_point(i, j, DVec3::new(x * chord, y, 0.0), DVec3::Z, u, v);
        }
    }

    patch.derive_normals(GENERATOR_TOLERANCE * patch.reference_length());
    patch.compute_point_areas();
    patch
}

/// A closed body of revolution about the `x` axis.
///
/// Radius `r(x) = radius · sin(π x / length)`, so the first and last rows
/// collapse to nose and tail poles. Each cross-section has `n_circ` points
/// with the last repeating the first.
pub fn body_of_revolution(length: f64, radius: f64, ni: usize, n_circ: usize) -> StructuredPatch {
    let ni = ni.max(3);
    let nj = n_circ.max(4);
    let mut patch = StructuredPatch::new();
    patch.size_geometry_lists(ni, nj);

    for i in 1..=ni {
        let u = (i - 1) as f64 / (ni - 1) as f64;
        let x = u * length;
        let r = if i == 1 || i == ni {
            0.0
        } else {
            radius * (PI * u).sin()
        };
        for j in 1..=nj {
            let v = (j - 1) as f64 / (nj - 1) as f64;
            let theta = if j == nj { 0.0 } else { 2.0 * PI * v };
            let p = DVec3::new(x, r * theta.cos(), r * theta.sin());
            patch.set_point(i, j, p, DVec3::ZERO, u, v);
        }
    }

    patch.derive_normals(GENERATOR_TOLERANCE * patch.reference_length());
    patch.compute_point_areas();
    patch
}
