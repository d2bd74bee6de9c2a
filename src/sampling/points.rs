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

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::geometry::Point2;

/// Source of the point set a network is built over.
pub trait PointSampler {
    /// Draws `count` random points, plus whatever fixed points the sampler
    /// adds. Same count and seed, same points.
    fn sample(&self, count: usize, seed: u64) -> Vec<Point2>;
}

/// Uniform random points in the unit square, followed by evenly spaced
/// points along its border.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UniformSampler {
    pub border_points_per_side: usize,
}

impl UniformSampler {
    pub fn new(border_points_per_side: usize) -> Self {
        Self {
            border_points_per_side,
        }
    }

    /// Number of points `sample(count, _)` returns.
    pub fn total(&self, count: usize) -> usize {
        count + 4 * self.border_points_per_side
    }
}

impl PointSampler for UniformSampler {
    fn sample(&self, count: usize, seed: u64) -> Vec<Point2> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut points = Vec::with_capacity(self.total(count));
        for _ in 0..count {
            let x = rng.random_range(0.0..1.0);
            let y = rng.random_range(0.0..1.0);
            points.push(Point2::new(x, y));
        }

        let k = self.border_points_per_side;
        for s in 0..k {
            let t = s as f64 / k as f64;
            points.push(Point2::new(t, 0.0));
            points.push(Point2::new(1.0, t));
            points.push(Point2::new(1.0 - t, 1.0));
            points.push(Point2::new(0.0, 1.0 - t));
        }
        points
    }
}
