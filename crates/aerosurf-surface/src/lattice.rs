//! 1-based row-major lattice storage.
//!
//! Entry `(i, j)` with `1 <= i <= ni` and `1 <= j <= nj` lives at linear
//! index `(i - 1) * nj + (j - 1)`. Bounds are checked in debug builds only;
//! callers are expected to respect the lattice size.

use serde::{Deserialize, Serialize};

/// An `ni × nj` grid of values addressed from 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice<T> {
    ni: usize,
    nj: usize,
    data: Vec<T>,
}

impl<T> Default for Lattice<T> {
    fn default() -> Self {
        Self {
            ni: 0,
            nj: 0,
            data: Vec::new(),
        }
    }
}

impl<T: Clone + Default> Lattice<T> {
    /// A lattice filled with `T::default()`.
    pub fn new(ni: usize, nj: usize) -> Self {
        Self {
            ni,
            nj,
            data: vec![T::default(); ni * nj],
        }
    }

    /// Drops the current contents and reallocates zero-initialized storage.
    pub fn resize(&mut self, ni: usize, nj: usize) {
        *self = Self::new(ni, nj);
    }
}

impl<T> Lattice<T> {
    /// Builds a lattice by evaluating `f(i, j)` at every entry.
    pub fn from_fn(ni: usize, nj: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(ni * nj);
        for i in 1..=ni {
            for j in 1..=nj {
                data.push(f(i, j));
            }
        }
        Self { ni, nj, data }
    }

    #[inline]
    pub fn ni(&self) -> usize {
        self.ni
    }

    #[inline]
    pub fn nj(&self) -> usize {
        self.nj
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Linear index of `(i, j)`.
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(
            (1..=self.ni).contains(&i) && (1..=self.nj).contains(&j),
            "lattice access ({i}, {j}) outside 1..={} × 1..={}",
            self.ni,
            self.nj
        );
        (i - 1) * self.nj + (j - 1)
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[self.index(i, j)]
    }

    #[inline]
    pub fn get_mut(&mut self, i: usize, j: usize) -> &mut T {
        let k = self.index(i, j);
        &mut self.data[k]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        let k = self.index(i, j);
        self.data[k] = value;
    }

    /// Row `i` as a slice over `j = 1..=nj`.
    pub fn row(&self, i: usize) -> &[T] {
        let start = self.index(i, 1);
        &self.data[start..start + self.nj]
    }

    /// Values in storage order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    /// `(i, j)` pairs in storage order.
    pub fn indices(&self) -> impl Iterator<Item = (usize, usize)> {
        let nj = self.nj;
        (1..=self.ni).flat_map(move |i| (1..=nj).map(move |j| (i, j)))
    }
}

impl<T: Copy> Lattice<T> {
    /// Applies `f` to every value in place.
    pub fn map_in_place(&mut self, mut f: impl FnMut(T) -> T) {
        for v in self.data.iter_mut() {
            *v = f(*v);
        }
    }
}
