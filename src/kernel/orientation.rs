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

// (3 + 16ε)ε, Shewchuk's static bound for the 2x2 determinant.
const CCW_ERRBOUND_A: f64 = 3.330_669_073_875_471_6e-16;

/// Returns:
/// - >0 if counter-clockwise
/// - <0 if clockwise
/// - =0 if collinear
///
/// Only the sign is exact; results too close to zero for `f64` are
/// recomputed with rationals.
pub fn orient2d(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    let detleft = (b.x - a.x) * (c.y - a.y);
    let detright = (b.y - a.y) * (c.x - a.x);
    let det = detleft - detright;

    let detsum = detleft.abs() + detright.abs();
    if det.abs() >= CCW_ERRBOUND_A * detsum {
        return det;
    }
    orient2d_exact(a, b, c)
}

fn orient2d_exact(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    let [ax, ay, bx, by, cx, cy] =
        [a.x, a.y, b.x, b.y, c.x, c.y].map(ExactRational::from_f64);
    let left = &(&bx - &ax) * &(&cy - &ay);
    let right = &(&by - &ay) * &(&cx - &ax);
    (&left - &right).to_signed_f64()
}
