// Copyright 2025 Geosel Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! N-dimensional bounding box primitives
//!
//! Everything the statistics engine does is driven by axis-aligned boxes:
//! [`FeatureBounds`] is the double-precision box a caller derives from a
//! feature's geometry, [`NdBox`] is the compact single-precision box the
//! histogram machinery works in, and [`NdCellRange`] is the integer range
//! of histogram cells a box overlaps.

/// Maximum number of dimensions the statistics code handles.
/// Used to statically size the arrays below.
pub const ND_DIMS: usize = 4;

/// Minimum width of a dimension worth computing statistics on.
/// We have no control over units, but noting that for geographics
/// 1e-5 is in the range of meters, we go well below that.
pub const MIN_DIMENSION_WIDTH: f64 = 1e-9;

/// Maximum width of a dimension worth computing statistics on.
pub const MAX_DIMENSION_WIDTH: f64 = 1e20;

/// Axis-aligned bounding box in up to [`ND_DIMS`] dimensions.
///
/// Unused higher dimensions are zero-filled; the active dimensionality is
/// carried by the caller, not the box. Single-precision is deliberate:
/// a histogram stores thousands of these and the estimates it feeds are
/// approximate to begin with.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NdBox {
    pub min: [f32; ND_DIMS],
    pub max: [f32; ND_DIMS],
}

impl NdBox {
    /// Zero-filled box.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Accumulator box: mins at the largest float, maxes at the
    /// smallest, so the first [`merge`](Self::merge) snaps it to the
    /// merged operand.
    pub fn accumulator() -> Self {
        Self {
            min: [f32::MAX; ND_DIMS],
            max: [f32::MIN; ND_DIMS],
        }
    }

    /// Widen this box in place to include `other`.
    pub fn merge(&mut self, other: &NdBox) {
        for d in 0..ND_DIMS {
            self.min[d] = self.min[d].min(other.min[d]);
            self.max[d] = self.max[d].max(other.max[d]);
        }
    }

    /// True if this box overlaps `other` in every one of the first
    /// `ndims` dimensions.
    pub fn intersects(&self, other: &NdBox, ndims: usize) -> bool {
        for d in 0..ndims {
            if self.min[d] > other.max[d] || self.max[d] < other.min[d] {
                return false;
            }
        }
        true
    }

    /// True if this box strictly encloses `other` in every one of the
    /// first `ndims` dimensions.
    pub fn contains(&self, other: &NdBox, ndims: usize) -> bool {
        for d in 0..ndims {
            if !(self.min[d] < other.min[d] && self.max[d] > other.max[d]) {
                return false;
            }
        }
        true
    }

    /// Grow every dimension's span by `factor` of its width, centered.
    ///
    /// Dimensions narrower than [`MIN_DIMENSION_WIDTH`] or wider than
    /// [`MAX_DIMENSION_WIDTH`] are left alone: scaling a degenerate or
    /// effectively-infinite span produces garbage bounds.
    pub fn expand(&mut self, factor: f64) {
        for d in 0..ND_DIMS {
            let size = (self.max[d] - self.min[d]) as f64;
            if size < MIN_DIMENSION_WIDTH || size > MAX_DIMENSION_WIDTH {
                continue;
            }
            self.min[d] -= (size * factor / 2.0) as f32;
            self.max[d] += (size * factor / 2.0) as f32;
        }
    }

    /// Proportion of `other`'s volume covered by `self ∩ other`, over the
    /// first `ndims` dimensions.
    ///
    /// Returns 0 when the boxes are disjoint in any dimension (touching
    /// edges count as disjoint), 1 when `self` covers `other` entirely,
    /// and 0 when `other` has zero volume.
    pub fn ratio(&self, other: &NdBox, ndims: usize) -> f64 {
        let mut covered = true;

        for d in 0..ndims {
            if self.max[d] <= other.min[d] || self.min[d] >= other.max[d] {
                return 0.0;
            }
            if self.min[d] > other.min[d] || self.max[d] < other.max[d] {
                covered = false;
            }
        }

        if covered {
            return 1.0;
        }

        let mut ivol = 1.0_f64;
        let mut vol2 = 1.0_f64;
        for d in 0..ndims {
            let width2 = (other.max[d] - other.min[d]) as f64;
            vol2 *= width2;

            let imin = self.min[d].max(other.min[d]) as f64;
            let imax = self.max[d].min(other.max[d]) as f64;
            ivol *= (imax - imin).max(0.0);
        }

        if vol2 == 0.0 {
            return 0.0;
        }

        ivol / vol2
    }

    /// Width of dimension `d`.
    pub fn width(&self, d: usize) -> f64 {
        (self.max[d] - self.min[d]) as f64
    }

    /// JSON rendering of the first `ndims` dimensions, for diagnostics.
    pub fn to_json(&self, ndims: usize) -> String {
        let fmt = |vals: &[f32]| {
            vals.iter()
                .take(ndims)
                .map(|v| format!("{}", v))
                .collect::<Vec<_>>()
                .join(",")
        };
        format!("{{\"min\":[{}],\"max\":[{}]}}", fmt(&self.min), fmt(&self.max))
    }
}

/// Double-precision bounding box of a single feature, as derived by the
/// caller from its geometry. X and Y are always present; Z and M are
/// optional; geodetic boxes are geocentric X/Y/Z regardless of the
/// underlying geometry dimensionality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureBounds {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub zmin: f64,
    pub zmax: f64,
    pub mmin: f64,
    pub mmax: f64,
    pub has_z: bool,
    pub has_m: bool,
    pub geodetic: bool,
}

impl FeatureBounds {
    /// Planar XY box.
    pub fn xy(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
            zmin: 0.0,
            zmax: 0.0,
            mmin: 0.0,
            mmax: 0.0,
            has_z: false,
            has_m: false,
            geodetic: false,
        }
    }

    /// Planar XYZ box.
    pub fn xyz(xmin: f64, ymin: f64, zmin: f64, xmax: f64, ymax: f64, zmax: f64) -> Self {
        let mut b = Self::xy(xmin, ymin, xmax, ymax);
        b.zmin = zmin;
        b.zmax = zmax;
        b.has_z = true;
        b
    }

    /// Geocentric XYZ box of a geodetic feature.
    pub fn geodetic_xyz(
        xmin: f64,
        ymin: f64,
        zmin: f64,
        xmax: f64,
        ymax: f64,
        zmax: f64,
    ) -> Self {
        let mut b = Self::xyz(xmin, ymin, zmin, xmax, ymax, zmax);
        b.geodetic = true;
        b
    }

    /// Attach a measure range.
    pub fn with_m(mut self, mmin: f64, mmax: f64) -> Self {
        self.mmin = mmin;
        self.mmax = mmax;
        self.has_m = true;
        self
    }

    /// Active dimensionality: geodetic boxes are X/Y/Z regardless of the
    /// underlying geometry, other boxes are guided by their Z/M flags.
    pub fn ndims(&self) -> usize {
        if self.geodetic {
            return 3;
        }
        let mut dims = 2;
        if self.has_z {
            dims += 1;
        }
        if self.has_m {
            dims += 1;
        }
        dims
    }

    /// True if every active coordinate is finite (no NaN / infinity).
    pub fn is_finite(&self) -> bool {
        if !(self.xmin.is_finite()
            && self.xmax.is_finite()
            && self.ymin.is_finite()
            && self.ymax.is_finite())
        {
            return false;
        }
        if (self.geodetic || self.has_z) && !(self.zmin.is_finite() && self.zmax.is_finite()) {
            return false;
        }
        if self.has_m && !(self.mmin.is_finite() && self.mmax.is_finite()) {
            return false;
        }
        true
    }

    /// Pack the active dimensions into an [`NdBox`], in X, Y, Z, M order.
    /// Geodetic boxes contribute X/Y/Z only.
    pub fn nd_box(&self) -> NdBox {
        let mut b = NdBox::zero();
        let mut d = 0;
        b.min[d] = self.xmin as f32;
        b.max[d] = self.xmax as f32;
        d += 1;
        b.min[d] = self.ymin as f32;
        b.max[d] = self.ymax as f32;
        d += 1;
        if self.geodetic {
            b.min[d] = self.zmin as f32;
            b.max[d] = self.zmax as f32;
            return b;
        }
        if self.has_z {
            b.min[d] = self.zmin as f32;
            b.max[d] = self.zmax as f32;
            d += 1;
        }
        if self.has_m {
            b.min[d] = self.mmin as f32;
            b.max[d] = self.mmax as f32;
        }
        b
    }
}

/// Integer range of histogram cell addresses overlapped by a box.
/// Transient: recomputed per feature during builds and per query during
/// estimation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NdCellRange {
    pub min: [usize; ND_DIMS],
    pub max: [usize; ND_DIMS],
}

impl NdCellRange {
    /// Advance `at` to the next cell address inside this range,
    /// odometer-style over the first `ndims` dimensions. Returns false
    /// once every address has been visited.
    pub fn increment(&self, ndims: usize, at: &mut [usize; ND_DIMS]) -> bool {
        for d in 0..ndims {
            if at[d] < self.max[d] {
                at[d] += 1;
                return true;
            }
            at[d] = self.min[d];
        }
        false
    }
}
