//! Parametric interval search and bilinear shape functions.
//!
//! Structured lattices (geometry patches, FEM displacement grids) carry a
//! monotonic parameter along each direction. Locating the cell that
//! contains `(u, v)` is two independent interval searches; evaluating inside
//! the cell uses the four bilinear shape functions.

/// Locates `value` on a monotonic `axis`.
///
/// Returns `(k, t)` such that the value lies between `axis[k]` and
/// `axis[k + 1]` at local parameter `t ∈ [0, 1]`. Values outside the axis
/// range are clamped onto the first or last interval. Works for both
/// increasing and decreasing axes. Requires `axis.len() >= 2`.
pub fn locate_interval(axis: &[f64], value: f64) -> (usize, f64) {
    let n = axis.len();
    debug_assert!(n >= 2, "axis needs at least two samples");

    let ascending = axis[n - 1] >= axis[0];
    let before = |a: f64, b: f64| if ascending { a <= b } else { a >= b };

    // Binary search for the last k with axis[k] "before" value
    let (mut lo, mut hi) = (0usize, n - 1);
    if !before(axis[0], value) {
        hi = 0;
    } else if before(axis[n - 1], value) {
        lo = n - 2;
        hi = n - 1;
    } else {
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if before(axis[mid], value) {
                lo = mid;
            } else {
                hi = mid;
            }
        }
    }
    let k = if hi == 0 { 0 } else { lo.min(n - 2) };

    let span = axis[k + 1] - axis[k];
    let t = if span.abs() > 0.0 {
        ((value - axis[k]) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (k, t)
}

/// Bilinear shape functions at local coordinates `(s, t)`.
///
/// Corner order is `[N00, N10, N11, N01]`, matching a cell with corners
/// `(k, l)`, `(k+1, l)`, `(k+1, l+1)`, `(k, l+1)`.
#[inline]
pub fn bilinear_weights(s: f64, t: f64) -> [f64; 4] {
    [
        (1.0 - s) * (1.0 - t),
        s * (1.0 - t),
        s * t,
        (1.0 - s) * t,
    ]
}
