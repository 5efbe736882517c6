//! Structured patch store.
//!
//! Two 1-based lattices describe a surface: the geometric lattice
//! (point, normal, tributary area, u, v) and the flat-plate lattice used by
//! the vortex-lattice model (point, camber normal, flat-plate normal,
//! camber, u, v). Index `i` runs across cross-sections, `j` along them.
//!
//! Resizing either lattice drops its contents; anything derived from it
//! (edge spans, meshes) must be rebuilt by the owner.

use aerosurf_math::interp::{bilinear_weights, locate_interval};
use aerosurf_math::{DVec3, RigidTransform};
use aerosurf_types::{AeroError, AeroResult};
use serde::{Deserialize, Serialize};

use crate::lattice::Lattice;

/// Geometric and flat-plate lattices of one surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredPatch {
    pub xyz: Lattice<DVec3>,
    pub normal: Lattice<DVec3>,
    pub area: Lattice<f64>,
    pub u: Lattice<f64>,
    pub v: Lattice<f64>,

    pub plate_xyz: Lattice<DVec3>,
    pub camber_normal: Lattice<DVec3>,
    pub flat_plate_normal: Lattice<DVec3>,
    pub camber: Lattice<f64>,
    pub u_plate: Lattice<f64>,
    pub v_plate: Lattice<f64>,
}

impl StructuredPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reallocates the geometric lattice as `ni × nj` zeros.
    pub fn size_geometry_lists(&mut self, ni: usize, nj: usize) {
        self.xyz.resize(ni, nj);
        self.normal.resize(ni, nj);
        self.area.resize(ni, nj);
        self.u.resize(ni, nj);
        self.v.resize(ni, nj);
    }

    /// Reallocates the flat-plate lattice as `ni × nj` zeros.
    pub fn size_flat_plate_lists(&mut self, ni: usize, nj: usize) {
        self.plate_xyz.resize(ni, nj);
        self.camber_normal.resize(ni, nj);
        self.flat_plate_normal.resize(ni, nj);
        self.camber.resize(ni, nj);
        self.u_plate.resize(ni, nj);
        self.v_plate.resize(ni, nj);
    }

    /// Checks that every lattice has the size of its point lattice.
    pub fn check_sizes(&self) -> AeroResult<()> {
        fn check<T>(what: &str, lattice: &Lattice<T>, ni: usize, nj: usize) -> AeroResult<()> {
            if lattice.ni() != ni || lattice.nj() != nj || lattice.as_slice().len() != ni * nj {
                return Err(AeroError::Geometry(format!(
                    "{what} lattice is {} × {} with {} entries, expected {ni} × {nj}",
                    lattice.ni(),
                    lattice.nj(),
                    lattice.as_slice().len()
                )));
            }
            Ok(())
        }

        let (ni, nj) = (self.xyz.ni(), self.xyz.nj());
        check("point", &self.xyz, ni, nj)?;
        check("normal", &self.normal, ni, nj)?;
        check("area", &self.area, ni, nj)?;
        check("u", &self.u, ni, nj)?;
        check("v", &self.v, ni, nj)?;

        let (ni, nj) = (self.plate_xyz.ni(), self.plate_xyz.nj());
        check("plate point", &self.plate_xyz, ni, nj)?;
        check("camber normal", &self.camber_normal, ni, nj)?;
        check("flat-plate normal", &self.flat_plate_normal, ni, nj)?;
        check("camber", &self.camber, ni, nj)?;
        check("plate u", &self.u_plate, ni, nj)?;
        check("plate v", &self.v_plate, ni, nj)
    }

    #[inline]
    pub fn surface_num_i(&self) -> usize {
        self.xyz.ni()
    }

    #[inline]
    pub fn surface_num_j(&self) -> usize {
        self.xyz.nj()
    }

    #[inline]
    pub fn plate_num_i(&self) -> usize {
        self.plate_xyz.ni()
    }

    #[inline]
    pub fn plate_num_j(&self) -> usize {
        self.plate_xyz.nj()
    }

    /// Strips between consecutive flat-plate rows.
    #[inline]
    pub fn number_of_span_stations(&self) -> usize {
        self.plate_num_i().saturating_sub(1)
    }

    #[inline]
    pub fn point(&self, i: usize, j: usize) -> DVec3 {
        *self.xyz.get(i, j)
    }

    #[inline]
    pub fn x(&self, i: usize, j: usize) -> f64 {
        self.xyz.get(i, j).x
    }

    #[inline]
    pub fn y(&self, i: usize, j: usize) -> f64 {
        self.xyz.get(i, j).y
    }

    #[inline]
    pub fn z(&self, i: usize, j: usize) -> f64 {
        self.xyz.get(i, j).z
    }

    #[inline]
    pub fn plate_point(&self, i: usize, j: usize) -> DVec3 {
        *self.plate_xyz.get(i, j)
    }

    /// Sets one geometric lattice entry.
    pub fn set_point(&mut self, i: usize, j: usize, p: DVec3, n: DVec3, u: f64, v: f64) {
        self.xyz.set(i, j, p);
        self.normal.set(i, j, n);
        self.u.set(i, j, u);
        self.v.set(i, j, v);
    }

    /// Sets one flat-plate lattice entry; the camber normal defaults to the
    /// flat-plate normal.
    pub fn set_plate_point(&mut self, i: usize, j: usize, p: DVec3, n: DVec3, u: f64, v: f64) {
        self.plate_xyz.set(i, j, p);
        self.flat_plate_normal.set(i, j, n);
        self.camber_normal.set(i, j, n);
        self.u_plate.set(i, j, u);
        self.v_plate.set(i, j, v);
    }

    /// Axis-aligned box of the geometric lattice; `None` when empty.
    pub fn bounding_box(&self) -> Option<(DVec3, DVec3)> {
        let mut points = self.xyz.as_slice().iter();
        let first = *points.next()?;
        Some(points.fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))))
    }

    /// Bounding-box diagonal, or 1 for a patch with no extent.
    pub fn reference_length(&self) -> f64 {
        match self.bounding_box() {
            Some((lo, hi)) if (hi - lo).length() > 0.0 => (hi - lo).length(),
            _ => 1.0,
        }
    }

    /// True if points `(i, 1)` and `(i, nj)` coincide on every row.
    pub fn is_wrapped(&self, tol: f64) -> bool {
        let nj = self.surface_num_j();
        nj >= 3
            && (1..=self.surface_num_i())
                .all(|i| self.point(i, 1).distance(self.point(i, nj)) <= tol)
    }

    /// Bilinear interpolation of the geometric lattice at `(u, v)`.
    ///
    /// `u` is searched along `i` on column 1 and `v` along `j` on row 1;
    /// values outside the parameter range are clamped to the boundary cell.
    pub fn interpolate_xyz_from_uv(&self, u: f64, v: f64) -> DVec3 {
        interpolate_lattice(&self.xyz, &self.u, &self.v, u, v)
    }

    /// Fills the geometric normals from central differences
    /// (one-sided on open boundaries, across the seam when wrapped).
    ///
    /// The normal is `∂p/∂j × ∂p/∂i`. A row collapsed to a point gets the
    /// direction away from its neighbouring row.
    pub fn derive_normals(&mut self, tol: f64) {
        let wrapped = self.is_wrapped(tol);
        self.normal = difference_normals(&self.xyz, wrapped);
    }

    /// Fills the flat-plate and camber normals from differences over the
    /// flat-plate lattice.
    pub fn derive_plate_normals(&mut self) {
        let normals = difference_normals(&self.plate_xyz, false);
        self.camber_normal = normals.clone();
        self.flat_plate_normal = normals;
    }

    /// Tributary areas: a quarter of each adjacent cell's area.
    pub fn compute_point_areas(&mut self) {
        let (ni, nj) = (self.surface_num_i(), self.surface_num_j());
        let mut area = Lattice::new(ni, nj);
        for i in 1..ni {
            for j in 1..nj {
                let p00 = self.point(i, j);
                let p10 = self.point(i + 1, j);
                let p11 = self.point(i + 1, j + 1);
                let p01 = self.point(i, j + 1);
                let cell = 0.5 * (p11 - p00).cross(p01 - p10).length();
                for (a, b) in [(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)] {
                    *area.get_mut(a, b) += 0.25 * cell;
                }
            }
        }
        self.area = area;
    }

    /// Applies a rigid-body move to every point and normal.
    pub fn transform(&mut self, t: &RigidTransform) {
        self.xyz.map_in_place(|p| t.apply_point(p));
        self.normal.map_in_place(|n| t.apply_vector(n));
        self.plate_xyz.map_in_place(|p| t.apply_point(p));
        self.camber_normal.map_in_place(|n| t.apply_vector(n));
        self.flat_plate_normal.map_in_place(|n| t.apply_vector(n));
    }
}

/// Bilinear interpolation of `values` over a tensor-product `(u, v)` lattice.
pub(crate) fn interpolate_lattice(
    values: &Lattice<DVec3>,
    u: &Lattice<f64>,
    v: &Lattice<f64>,
    uq: f64,
    vq: f64,
) -> DVec3 {
    let (ni, nj) = (values.ni(), values.nj());
    if ni == 0 || nj == 0 {
        return DVec3::ZERO;
    }
    let (k, s) = if ni >= 2 {
        let axis: Vec<f64> = (1..=ni).map(|i| *u.get(i, 1)).collect();
        locate_interval(&axis, uq)
    } else {
        (0, 0.0)
    };
    let (l, t) = if nj >= 2 {
        let axis: Vec<f64> = (1..=nj).map(|j| *v.get(1, j)).collect();
        locate_interval(&axis, vq)
    } else {
        (0, 0.0)
    };
    let (i0, j0) = (k + 1, l + 1);
    let (i1, j1) = ((i0 + 1).min(ni), (j0 + 1).min(nj));
    let w = bilinear_weights(s, t);
    w[0] * *values.get(i0, j0)
        + w[1] * *values.get(i1, j0)
        + w[2] * *values.get(i1, j1)
        + w[3] * *values.get(i0, j1)
}

/// Normals `∂p/∂j × ∂p/∂i` from finite differences over a point lattice.
pub(crate) fn difference_normals(points: &Lattice<DVec3>, wrapped: bool) -> Lattice<DVec3> {
    let (ni, nj) = (points.ni(), points.nj());
    let p = |i: usize, j: usize| *points.get(i, j);

    let d_i = |i: usize, j: usize| {
        let lo = if i > 1 { i - 1 } else { i };
        let hi = if i < ni { i + 1 } else { i };
        p(hi, j) - p(lo, j)
    };
    let d_j = |i: usize, j: usize| {
        let (lo, hi) = if wrapped && (j == 1 || j == nj) {
            // Column nj duplicates column 1
            (nj - 1, 2)
        } else {
            (if j > 1 { j - 1 } else { j }, if j < nj { j + 1 } else { j })
        };
        p(i, hi) - p(i, lo)
    };

    let mut normals = Lattice::from_fn(ni, nj, |i, j| d_j(i, j).cross(d_i(i, j)).normalize_or_zero());

    // Rows collapsed to a point point away from their neighbours
    for i in 1..=ni {
        let collapsed = (1..=nj).all(|j| d_j(i, j).length_squared() == 0.0);
        if !collapsed || ni < 2 {
            continue;
        }
        let neighbours: Vec<usize> = [i.checked_sub(1), (i < ni).then_some(i + 1)]
            .into_iter()
            .flatten()
            .filter(|&r| r >= 1)
            .collect();
        let mut mean = DVec3::ZERO;
        for &r in &neighbours {
            for j in 1..=nj {
                mean += p(r, j);
            }
        }
        let count = (neighbours.len() * nj).max(1) as f64;
        let dir = (p(i, 1) - mean / count).normalize_or_zero();
        for j in 1..=nj {
            normals.set(i, j, dir);
        }
    }
    normals
}
