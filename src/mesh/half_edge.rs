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

//! Navigation over the flat half-edge arrays of a [`Triangulation`].
//!
//! Half-edge `e` belongs to triangle `e / 3`, starts at `triangles[e]` and
//! ends at `triangles[next_halfedge(e)]`.

use crate::geometry::Point2;
use crate::operations::triangulation::{EMPTY, Triangulation};

#[inline]
pub fn next_halfedge(e: usize) -> usize {
    if e % 3 == 2 { e - 2 } else { e + 1 }
}

#[inline]
pub fn prev_halfedge(e: usize) -> usize {
    if e % 3 == 0 { e + 2 } else { e - 1 }
}

#[inline]
pub fn triangle_of_edge(e: usize) -> usize {
    e / 3
}

#[inline]
pub fn edges_of_triangle(t: usize) -> [usize; 3] {
    [3 * t, 3 * t + 1, 3 * t + 2]
}

impl Triangulation {
    pub fn points_of_triangle(&self, t: usize) -> [usize; 3] {
        edges_of_triangle(t).map(|e| self.triangles[e])
    }

    /// Centroid of triangle `t`.
    pub fn triangle_center(&self, points: &[Point2], t: usize) -> Point2 {
        let [a, b, c] = self.points_of_triangle(t).map(|i| points[i]);
        Point2::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
    }

    /// Incoming half-edges around the start point of `start`, walking
    /// clockwise until the fan closes or reaches the hull.
    pub fn edges_around_point(&self, start: usize) -> Vec<usize> {
        let mut result = Vec::new();
        let mut incoming = start;
        loop {
            result.push(incoming);
            let outgoing = next_halfedge(incoming);
            incoming = self.halfedges[outgoing];
            if incoming == EMPTY || incoming == start {
                break;
            }
        }
        result
    }

    /// Each undirected edge exactly once, as `(from, to)` point pairs.
    pub fn undirected_edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.halfedges
            .iter()
            .enumerate()
            .filter(|&(e, &h)| h == EMPTY || e < h)
            .map(|(e, _)| (self.triangles[e], self.triangles[next_halfedge(e)]))
    }
}
