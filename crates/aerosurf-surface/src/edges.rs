//! Leading/trailing-edge span arrays.
//!
//! One entry per span station (the strip between flat-plate rows `k` and
//! `k + 1`), in both the original and the deformed configuration. Station
//! accessors are 1-based like the lattices.

use aerosurf_math::{DVec3, RigidTransform};
use serde::{Deserialize, Serialize};

use crate::patch::StructuredPatch;

/// Leading edge, trailing edge and quarter chord of one plate row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChordLine {
    pub le: DVec3,
    pub te: DVec3,
    pub qc: DVec3,
}

impl ChordLine {
    fn new(le: DVec3, te: DVec3) -> Self {
        Self {
            le,
            te,
            qc: le + 0.25 * (te - le),
        }
    }

    fn transform(&mut self, t: &RigidTransform) {
        self.le = t.apply_point(self.le);
        self.te = t.apply_point(self.te);
        self.qc = t.apply_point(self.qc);
    }
}

/// Per-station edge geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpans {
    le: Vec<DVec3>,
    te: Vec<DVec3>,
    le_def: Vec<DVec3>,
    te_def: Vec<DVec3>,
    s: Vec<f64>,
    s_def: Vec<f64>,
    local_chord: Vec<f64>,
    local_chord_def: Vec<f64>,
    thickness_to_chord: Vec<f64>,
    location_of_max_thickness: Vec<f64>,
    radius_to_chord: Vec<f64>,
    qc_normal: Vec<DVec3>,
    pub root: ChordLine,
    pub tip: ChordLine,
    average_chord: f64,
}

impl EdgeSpans {
    /// Derives the span arrays from the flat-plate lattice.
    ///
    /// The deformed arrays start out equal to the original ones.
    pub fn from_plate(patch: &StructuredPatch) -> Self {
        let stations = patch.number_of_span_stations();
        if stations == 0 || patch.plate_num_j() == 0 {
            return Self::default();
        }
        let jp = patch.plate_num_j();
        let rows = patch.plate_num_i();

        let root = ChordLine::new(patch.plate_point(1, 1), patch.plate_point(1, jp));
        let tip = ChordLine::new(patch.plate_point(rows, 1), patch.plate_point(rows, jp));

        let qc_normal = (1..=stations)
            .map(|k| {
                (1..=jp)
                    .map(|j| {
                        *patch.flat_plate_normal.get(k, j) + *patch.flat_plate_normal.get(k + 1, j)
                    })
                    .sum::<DVec3>()
                    .normalize_or_zero()
            })
            .collect();

        let mut spans = Self {
            thickness_to_chord: vec![0.0; stations],
            location_of_max_thickness: vec![0.0; stations],
            radius_to_chord: vec![0.0; stations],
            qc_normal,
            root,
            tip,
            ..Default::default()
        };
        let (le, te, s, chord) = station_geometry(patch, root.qc);
        spans.average_chord = weighted_average_chord(patch, &chord);
        spans.le_def = le.clone();
        spans.te_def = te.clone();
        spans.s_def = s.clone();
        spans.local_chord_def = chord.clone();
        spans.le = le;
        spans.te = te;
        spans.s = s;
        spans.local_chord = chord;
        spans
    }

    /// Recomputes the deformed arrays from a deformed flat-plate lattice.
    pub fn refresh_deformed(&mut self, deformed: &StructuredPatch) {
        if self.number_of_span_stations() != deformed.number_of_span_stations() {
            return;
        }
        let jp = deformed.plate_num_j();
        let root_qc = ChordLine::new(deformed.plate_point(1, 1), deformed.plate_point(1, jp)).qc;
        let (le, te, s, chord) = station_geometry(deformed, root_qc);
        self.le_def = le;
        self.te_def = te;
        self.s_def = s;
        self.local_chord_def = chord;
    }

    /// Resets the deformed arrays to the original ones.
    pub fn reset_deformed(&mut self) {
        self.le_def = self.le.clone();
        self.te_def = self.te.clone();
        self.s_def = self.s.clone();
        self.local_chord_def = self.local_chord.clone();
    }

    /// Stores per-station section data supplied by the geometry source.
    ///
    /// Slices shorter than the station count leave the remaining stations
    /// at zero.
    pub fn set_section_data(
        &mut self,
        thickness_to_chord: &[f64],
        location_of_max_thickness: &[f64],
        radius_to_chord: &[f64],
    ) {
        let copy = |dst: &mut Vec<f64>, src: &[f64]| {
            for (d, s) in dst.iter_mut().zip(src) {
                *d = *s;
            }
        };
        copy(&mut self.thickness_to_chord, thickness_to_chord);
        copy(&mut self.location_of_max_thickness, location_of_max_thickness);
        copy(&mut self.radius_to_chord, radius_to_chord);
    }

    pub fn transform(&mut self, t: &RigidTransform) {
        for p in self
            .le
            .iter_mut()
            .chain(self.te.iter_mut())
            .chain(self.le_def.iter_mut())
            .chain(self.te_def.iter_mut())
        {
            *p = t.apply_point(*p);
        }
        for n in self.qc_normal.iter_mut() {
            *n = t.apply_vector(*n);
        }
        self.root.transform(t);
        self.tip.transform(t);
    }

    #[inline]
    pub fn number_of_span_stations(&self) -> usize {
        self.le.len()
    }

    #[inline]
    pub fn le(&self, k: usize) -> DVec3 {
        self.le[k - 1]
    }

    #[inline]
    pub fn te(&self, k: usize) -> DVec3 {
        self.te[k - 1]
    }

    #[inline]
    pub fn le_def(&self, k: usize) -> DVec3 {
        self.le_def[k - 1]
    }

    #[inline]
    pub fn te_def(&self, k: usize) -> DVec3 {
        self.te_def[k - 1]
    }

    /// Arc length along the quarter-chord line from the root to station `k`.
    #[inline]
    pub fn s(&self, k: usize) -> f64 {
        self.s[k - 1]
    }

    #[inline]
    pub fn s_def(&self, k: usize) -> f64 {
        self.s_def[k - 1]
    }

    #[inline]
    pub fn local_chord(&self, k: usize) -> f64 {
        self.local_chord[k - 1]
    }

    #[inline]
    pub fn local_chord_def(&self, k: usize) -> f64 {
        self.local_chord_def[k - 1]
    }

    #[inline]
    pub fn thickness_to_chord(&self, k: usize) -> f64 {
        self.thickness_to_chord[k - 1]
    }

    #[inline]
    pub fn location_of_max_thickness(&self, k: usize) -> f64 {
        self.location_of_max_thickness[k - 1]
    }

    #[inline]
    pub fn radius_to_chord(&self, k: usize) -> f64 {
        self.radius_to_chord[k - 1]
    }

    /// Mean flat-plate normal of the two rows bounding station `k`.
    #[inline]
    pub fn qc_normal(&self, k: usize) -> DVec3 {
        self.qc_normal[k - 1]
    }

    /// Quarter-chord point of station `k`.
    pub fn qc(&self, k: usize) -> DVec3 {
        let le = self.le(k);
        le + 0.25 * (self.te(k) - le)
    }

    #[inline]
    pub fn average_chord(&self) -> f64 {
        self.average_chord
    }
}

type StationArrays = (Vec<DVec3>, Vec<DVec3>, Vec<f64>, Vec<f64>);

fn station_geometry(patch: &StructuredPatch, root_qc: DVec3) -> StationArrays {
    let stations = patch.number_of_span_stations();
    let jp = patch.plate_num_j();
    let mut le = Vec::with_capacity(stations);
    let mut te = Vec::with_capacity(stations);
    let mut s = Vec::with_capacity(stations);
    let mut chord = Vec::with_capacity(stations);

    let mut prev_qc = root_qc;
    let mut arc = 0.0;
    for k in 1..=stations {
        let l = 0.5 * (patch.plate_point(k, 1) + patch.plate_point(k + 1, 1));
        let t = 0.5 * (patch.plate_point(k, jp) + patch.plate_point(k + 1, jp));
        let qc = l + 0.25 * (t - l);
        arc += prev_qc.distance(qc);
        prev_qc = qc;
        le.push(l);
        te.push(t);
        s.push(arc);
        chord.push(l.distance(t));
    }
    (le, te, s, chord)
}

fn weighted_average_chord(patch: &StructuredPatch, chord: &[f64]) -> f64 {
    let jp = patch.plate_num_j();
    let row_qc = |k: usize| {
        let l = patch.plate_point(k, 1);
        l + 0.25 * (patch.plate_point(k, jp) - l)
    };
    let widths: Vec<f64> = (1..=chord.len())
        .map(|k| row_qc(k).distance(row_qc(k + 1)))
        .collect();
    let total: f64 = widths.iter().sum();
    if total > 0.0 {
        widths.iter().zip(chord).map(|(w, c)| w * c).sum::<f64>() / total
    } else if chord.is_empty() {
        0.0
    } else {
        chord.iter().sum::<f64>() / chord.len() as f64
    }
}
