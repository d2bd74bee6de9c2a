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
use crate::numeric::ExactRational;

// (10 + 96ε)ε
const ICC_ERRBOUND_A: f64 = 1.110_223_024_625_157_7e-15;

/// Positive when `d` lies strictly inside the circle through the
/// counter-clockwise triangle `(a, b, c)`, negative outside, zero on it.
pub fn incircle(a: &Point2, b: &Point2, c: &Point2, d: &Point2) -> f64 {
    let adx = a.x - d.x;
    let ady = a.y - d.y;
    let bdx = b.x - d.x;
    let bdy = b.y - d.y;
    let cdx = c.x - d.x;
    let cdy = c.y - d.y;

    let bdxcdy = bdx * cdy;
    let cdxbdy = cdx * bdy;
    let alift = adx * adx + ady * ady;

    let cdxady = cdx * ady;
    let adxcdy = adx * cdy;
    let blift = bdx * bdx + bdy * bdy;

    let adxbdy = adx * bdy;
    let bdxady = bdx * ady;
    let clift = cdx * cdx + cdy * cdy;

    let det = alift * (bdxcdy - cdxbdy) + blift * (cdxady - adxcdy) + clift * (adxbdy - bdxady);

    let permanent = (bdxcdy.abs() + cdxbdy.abs()) * alift
        + (cdxady.abs() + adxcdy.abs()) * blift
        + (adxbdy.abs() + bdxady.abs()) * clift;
    if det.abs() > ICC_ERRBOUND_A * permanent {
        return det;
    }
    incircle_exact(a, b, c, d)
}

fn incircle_exact(a: &Point2, b: &Point2, c: &Point2, d: &Point2) -> f64 {
    let [ax, ay, bx, by, cx, cy, dx, dy] =
        [a.x, a.y, b.x, b.y, c.x, c.y, d.x, d.y].map(ExactRational::from_f64);

    let adx = &ax - &dx;
    let ady = &ay - &dy;
    let bdx = &bx - &dx;
    let bdy = &by - &dy;
    let cdx = &cx - &dx;
    let cdy = &cy - &dy;

    let alift = &(&adx * &adx) + &(&ady * &ady);
    let blift = &(&bdx * &bdx) + &(&bdy * &bdy);
    let clift = &(&cdx * &cdx) + &(&cdy * &cdy);

    let ta = &alift * &(&(&bdx * &cdy) - &(&cdx * &bdy));
    let tb = &blift * &(&(&cdx * &ady) - &(&adx * &cdy));
    let tc = &clift * &(&(&adx * &bdy) - &(&bdx * &ady));

    (&(&ta + &tb) + &tc).to_signed_f64()
}

/// Offset of the circumcentre of `(a, b, c)` relative to `a`.
/// Non-finite when the triangle is degenerate.
#[inline]
fn circumcenter_offset(a: &Point2, b: &Point2, c: &Point2) -> (f64, f64) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let ex = c.x - a.x;
    let ey = c.y - a.y;

    let bl = dx * dx + dy * dy;
    let cl = ex * ex + ey * ey;
    let d = 0.5 / (dx * ey - dy * ex);

    let x = (ey * bl - dy * cl) * d;
    let y = (dx * cl - ex * bl) * d;
    (x, y)
}

/// Squared circumradius of `(a, b, c)`. Infinite (or NaN) for collinear
/// triples, which never compares less than a finite radius.
pub fn circumradius(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    let (x, y) = circumcenter_offset(a, b, c);
    x * x + y * y
}

pub fn circumcenter(a: &Point2, b: &Point2, c: &Point2) -> Point2 {
    let (x, y) = circumcenter_offset(a, b, c);
    Point2::new(a.x + x, a.y + y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incircle_inside_outside() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(0.0, 1.0);

        assert!(incircle(&a, &b, &c, &Point2::new(0.4, 0.4)) > 0.0);
        assert!(incircle(&a, &b, &c, &Point2::new(2.0, 2.0)) < 0.0);
        // (1, 1) is cocircular with the right triangle
        assert_eq!(incircle(&a, &b, &c, &Point2::new(1.0, 1.0)), 0.0);
    }

    #[test]
    fn circumcenter_of_right_triangle_is_hypotenuse_midpoint() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(2.0, 0.0);
        let c = Point2::new(0.0, 2.0);
        let cc = circumcenter(&a, &b, &c);
        assert!((cc.x - 1.0).abs() < 1e-12);
        assert!((cc.y - 1.0).abs() < 1e-12);
        assert!((circumradius(&a, &b, &c) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn collinear_circumradius_is_not_finite() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(2.0, 0.0);
        let r = circumradius(&a, &b, &c);
        assert!(!(r < f64::INFINITY));
    }
}
