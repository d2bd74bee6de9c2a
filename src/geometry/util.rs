// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Alexandre Severino
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use crate::geometry::Point2;

/// 2⁻⁵², the spacing of `f64` around 1.0.
pub const EPSILON: f64 = f64::EPSILON;

/// Axis-aligned bounds `(min_x, min_y, max_x, max_y)` of a non-empty slice.
/// Returns `None` for an empty slice.
pub fn bbox(points: &[Point2]) -> Option<(f64, f64, f64, f64)> {
    let first = points.first()?;
    let mut min_x = first.x;
    let mut min_y = first.y;
    let mut max_x = first.x;
    let mut max_y = first.y;
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some((min_x, min_y, max_x, max_y))
}

/// Monotonic stand-in for `atan2(dy, dx)` mapped to `[0, 1)`, no trigonometry.
#[inline]
pub fn pseudo_angle(dx: f64, dy: f64) -> f64 {
    let p = dx / (dx.abs() + dy.abs());
    if dy > 0.0 {
        (3.0 - p) / 4.0
    } else {
        (1.0 + p) / 4.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_of_empty_is_none() {
        assert!(bbox(&[]).is_none());
    }

    #[test]
    fn bbox_covers_all_points() {
        let pts = [
            Point2::new(0.5, -1.0),
            Point2::new(2.0, 0.0),
            Point2::new(-3.0, 4.0),
        ];
        assert_eq!(bbox(&pts), Some((-3.0, -1.0, 2.0, 4.0)));
    }

    #[test]
    fn pseudo_angle_is_monotonic_around_circle() {
        let mut last = -1.0;
        for k in 0..64 {
            // start just past the negative x axis so the sweep never wraps
            let a = -std::f64::consts::PI + 1e-6 + k as f64 * (2.0 * std::f64::consts::PI / 64.0);
            let pa = pseudo_angle(a.cos(), a.sin());
            assert!((0.0..=1.0).contains(&pa));
            assert!(pa > last);
            last = pa;
        }
    }
}
