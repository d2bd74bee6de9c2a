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

use std::fmt;

use num_traits::ToPrimitive;
use thiserror::Error;

use crate::geometry::Point2;
use crate::kernel::{incircle, orient2d};
use crate::mesh::half_edge::next_halfedge;

pub mod delaunay;

/// Half-edge sentinel for edges on the convex hull (no opposite edge).
pub const EMPTY: usize = usize::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TriangulationError {
    #[error("{axis} coordinate of point {index} is not a finite number")]
    InvalidInput { index: usize, axis: Axis },
    #[error("triangulation invariant violated: {0}")]
    Corrupt(String),
}

/// Delaunay triangulation in flat half-edge form.
///
/// `triangles[3t..3t + 3]` are the counter-clockwise vertices of triangle `t`;
/// `halfedges[e]` is the opposite half-edge of `e` or [`EMPTY`] on the hull.
/// When every input point is collinear the triangle arrays are empty and
/// `hull` lists the points along the line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Triangulation {
    pub triangles: Vec<usize>,
    pub halfedges: Vec<usize>,
    pub hull: Vec<usize>,
}

/// Converts numeric coordinate pairs, rejecting values with no finite `f64`
/// representation.
pub fn points_from_coords<C: ToPrimitive>(
    coords: &[[C; 2]],
) -> Result<Vec<Point2>, TriangulationError> {
    coords
        .iter()
        .enumerate()
        .map(|(index, [x, y])| {
            let x = finite(x.to_f64(), index, Axis::X)?;
            let y = finite(y.to_f64(), index, Axis::Y)?;
            Ok(Point2::new(x, y))
        })
        .collect()
}

fn finite(v: Option<f64>, index: usize, axis: Axis) -> Result<f64, TriangulationError> {
    match v {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(TriangulationError::InvalidInput { index, axis }),
    }
}

impl Triangulation {
    /// Triangulates `points`. Fails on the first non-finite coordinate; no
    /// partial result is produced.
    pub fn new(points: &[Point2]) -> Result<Self, TriangulationError> {
        for (index, p) in points.iter().enumerate() {
            finite(Some(p.x), index, Axis::X)?;
            finite(Some(p.y), index, Axis::Y)?;
        }
        Ok(delaunay::triangulate(points))
    }

    pub fn from_coords<C: ToPrimitive>(
        coords: &[[C; 2]],
    ) -> Result<(Vec<Point2>, Self), TriangulationError> {
        let points = points_from_coords(coords)?;
        let triangulation = Self::new(&points)?;
        Ok((points, triangulation))
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// True when the input had no three non-collinear points.
    pub fn is_collinear(&self) -> bool {
        self.triangles.is_empty() && !self.hull.is_empty()
    }

    #[inline]
    pub fn is_hull_edge(&self, e: usize) -> bool {
        self.halfedges[e] == EMPTY
    }

    /// Checks the structural invariants: array shapes, index ranges,
    /// half-edge involution, twin endpoints and a repeat-free hull.
    pub fn validate(&self, point_count: usize) -> Result<(), TriangulationError> {
        let corrupt = |msg: String| Err(TriangulationError::Corrupt(msg));

        if self.triangles.len() % 3 != 0 {
            return corrupt(format!(
                "triangle array length {} is not a multiple of 3",
                self.triangles.len()
            ));
        }
        if self.halfedges.len() != self.triangles.len() {
            return corrupt(format!(
                "{} half-edges for {} triangle corners",
                self.halfedges.len(),
                self.triangles.len()
            ));
        }
        if let Some(v) = self.triangles.iter().find(|&&v| v >= point_count) {
            return corrupt(format!("vertex {v} out of range"));
        }
        for (e, &h) in self.halfedges.iter().enumerate() {
            if h == EMPTY {
                continue;
            }
            if h >= self.halfedges.len() || self.halfedges[h] != e {
                return corrupt(format!("half-edge {e} is not paired with {h}"));
            }
            if self.triangles[e] != self.triangles[next_halfedge(h)]
                || self.triangles[next_halfedge(e)] != self.triangles[h]
            {
                return corrupt(format!("twins {e} and {h} do not share endpoints"));
            }
        }
        let mut seen = vec![false; point_count];
        for &v in &self.hull {
            if v >= point_count {
                return corrupt(format!("hull vertex {v} out of range"));
            }
            if seen[v] {
                return corrupt(format!("hull repeats vertex {v}"));
            }
            seen[v] = true;
        }
        Ok(())
    }

    /// Local Delaunay check across every interior edge. For a valid
    /// triangulation this implies the global empty-circumcircle property.
    pub fn is_delaunay(&self, points: &[Point2]) -> bool {
        for (e, &h) in self.halfedges.iter().enumerate() {
            if h == EMPTY || h < e {
                continue;
            }
            let t = e - e % 3;
            let a = &points[self.triangles[t]];
            let b = &points[self.triangles[t + 1]];
            let c = &points[self.triangles[t + 2]];
            let apex = &points[self.triangles[next_halfedge(next_halfedge(h))]];
            if incircle(a, b, c, apex) > 0.0 {
                return false;
            }
        }
        true
    }

    /// True when every triangle winds counter-clockwise with nonzero area.
    pub fn is_counter_clockwise(&self, points: &[Point2]) -> bool {
        self.triangles.chunks_exact(3).all(|t| {
            orient2d(&points[t[0]], &points[t[1]], &points[t[2]]) > 0.0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_nan() {
        let pts = [Point2::new(0.0, 0.0), Point2::new(f64::NAN, 1.0)];
        assert_eq!(
            Triangulation::new(&pts),
            Err(TriangulationError::InvalidInput {
                index: 1,
                axis: Axis::X
            })
        );
    }

    #[test]
    fn rejects_infinite_y() {
        let coords = [[0.0, 0.0], [1.0, 0.0], [0.5, f64::INFINITY]];
        let err = Triangulation::from_coords(&coords).unwrap_err();
        assert_eq!(
            err,
            TriangulationError::InvalidInput {
                index: 2,
                axis: Axis::Y
            }
        );
        assert_eq!(err.to_string(), "y coordinate of point 2 is not a finite number");
    }

    #[test]
    fn accepts_integer_coordinates() {
        let (points, t) = Triangulation::from_coords(&[[0i32, 0], [4, 0], [0, 3]]).unwrap();
        assert_eq!(points[1], Point2::new(4.0, 0.0));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn validate_catches_broken_twin() {
        let (points, mut t) =
            Triangulation::from_coords(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]).unwrap();
        assert!(t.validate(points.len()).is_ok());
        let e = t.halfedges.iter().position(|&h| h != EMPTY).unwrap();
        t.halfedges[e] = EMPTY;
        assert!(matches!(
            t.validate(points.len()),
            Err(TriangulationError::Corrupt(_))
        ));
    }
}
