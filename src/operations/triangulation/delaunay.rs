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

//! Sweep-hull Delaunay triangulation.
//!
//! Points are inserted in order of distance from the circumcentre of a seed
//! triangle, so every new point lies outside the current convex hull. Each
//! insertion fans triangles over the visible hull edges and legalizes them
//! with edge flips.

use tracing::{debug, trace};

use crate::geometry::Point2;
use crate::geometry::util::{EPSILON, bbox, pseudo_angle};
use crate::kernel::{circumcenter, circumradius, incircle, orient2d};
use crate::operations::triangulation::{EMPTY, Triangulation};

/// Capacity of the pending-flip stack used by legalization.
pub const EDGE_STACK_CAPACITY: usize = 512;

/// Triangulates finite `points`. Coordinates are assumed validated.
pub(crate) fn triangulate(points: &[Point2]) -> Triangulation {
    if points.len() < 2 {
        return Triangulation::default();
    }

    let Some(seed) = find_seed_triangle(points) else {
        debug!(points = points.len(), "input is collinear, emitting hull only");
        return collinear_hull(points);
    };

    let mut sweep = SweepHull::new(points);
    sweep.run(seed)
}

/// Picks `(i0, i1, i2)` in counter-clockwise order, or `None` when no
/// non-degenerate seed exists.
fn find_seed_triangle(points: &[Point2]) -> Option<(usize, usize, usize)> {
    let (min_x, min_y, max_x, max_y) = bbox(points)?;
    let center = Point2::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);

    // seed point closest to the centre
    let mut i0 = 0;
    let mut min_dist = f64::INFINITY;
    for (i, p) in points.iter().enumerate() {
        let d = center.squared_distance_to(p);
        if d < min_dist {
            i0 = i;
            min_dist = d;
        }
    }
    let p0 = points[i0];

    // closest distinct point to the seed
    let mut i1 = None;
    let mut min_dist = f64::INFINITY;
    for (i, p) in points.iter().enumerate() {
        if i == i0 {
            continue;
        }
        let d = p0.squared_distance_to(p);
        if d < min_dist && d > 0.0 {
            i1 = Some(i);
            min_dist = d;
        }
    }
    let i1 = i1?;
    let p1 = points[i1];

    // third point forming the smallest circumcircle
    let mut i2 = None;
    let mut min_radius = f64::INFINITY;
    for (i, p) in points.iter().enumerate() {
        if i == i0 || i == i1 {
            continue;
        }
        let r = circumradius(&p0, &p1, p);
        if r < min_radius {
            i2 = Some(i);
            min_radius = r;
        }
    }
    let i2 = i2?;

    let o = orient2d(&p0, &p1, &points[i2]);
    if o == 0.0 {
        return None;
    }
    if o < 0.0 {
        Some((i0, i2, i1))
    } else {
        Some((i0, i1, i2))
    }
}

/// Hull-only result for collinear input: points ordered along the line by
/// their x offset from the first point (y offset when x does not change),
/// keeping one index per distinct position.
fn collinear_hull(points: &[Point2]) -> Triangulation {
    let origin = points[0];
    let dists: Vec<f64> = points
        .iter()
        .map(|p| {
            let dx = p.x - origin.x;
            if dx != 0.0 { dx } else { p.y - origin.y }
        })
        .collect();

    let mut ids: Vec<usize> = (0..points.len()).collect();
    ids.sort_by(|&a, &b| dists[a].total_cmp(&dists[b]));

    let mut hull = Vec::with_capacity(ids.len());
    let mut d0 = f64::NEG_INFINITY;
    for id in ids {
        if dists[id] > d0 {
            hull.push(id);
            d0 = dists[id];
        }
    }

    Triangulation {
        triangles: Vec::new(),
        halfedges: Vec::new(),
        hull,
    }
}

struct SweepHull<'a> {
    points: &'a [Point2],
    triangles: Vec<usize>,
    halfedges: Vec<usize>,

    // circular doubly linked hull; a removed vertex v has hull_next[v] == v
    hull_prev: Vec<usize>,
    hull_next: Vec<usize>,
    // half-edge of the triangle adjacent to the hull edge starting at v
    hull_tri: Vec<usize>,
    hull_hash: Vec<usize>,
    hull_start: usize,
    center: Point2,

    edge_stack: Vec<usize>,
    dropped_flips: usize,
}

impl<'a> SweepHull<'a> {
    fn new(points: &'a [Point2]) -> Self {
        let n = points.len();
        let max_triangles = (2 * n).saturating_sub(5).max(1);
        let hash_size = ((n as f64).sqrt().ceil() as usize).max(1);

        Self {
            points,
            triangles: Vec::with_capacity(max_triangles * 3),
            halfedges: Vec::with_capacity(max_triangles * 3),
            hull_prev: vec![0; n],
            hull_next: vec![0; n],
            hull_tri: vec![0; n],
            hull_hash: vec![EMPTY; hash_size],
            hull_start: 0,
            center: Point2::default(),
            edge_stack: Vec::with_capacity(EDGE_STACK_CAPACITY),
            dropped_flips: 0,
        }
    }

    #[inline]
    fn hash_key(&self, p: &Point2) -> usize {
        let size = self.hull_hash.len();
        let angle = pseudo_angle(p.x - self.center.x, p.y - self.center.y);
        // NaN (a point on the centre) casts to 0
        ((angle * size as f64).floor() as usize) % size
    }

    fn run(&mut self, (i0, i1, i2): (usize, usize, usize)) -> Triangulation {
        let points = self.points;
        let n = points.len();

        self.center = circumcenter(&points[i0], &points[i1], &points[i2]);
        let center = self.center;
        let dists: Vec<f64> = points
            .iter()
            .map(|p| p.squared_distance_to(&center))
            .collect();
        let mut ids: Vec<usize> = (0..n).collect();
        ids.sort_by(|&a, &b| dists[a].total_cmp(&dists[b]));

        self.hull_start = i0;
        let mut hull_size = 3;

        self.hull_next[i0] = i1;
        self.hull_prev[i2] = i1;
        self.hull_next[i1] = i2;
        self.hull_prev[i0] = i2;
        self.hull_next[i2] = i0;
        self.hull_prev[i1] = i0;

        self.hull_tri[i0] = 0;
        self.hull_tri[i1] = 1;
        self.hull_tri[i2] = 2;

        for i in [i0, i1, i2] {
            let key = self.hash_key(&points[i]);
            self.hull_hash[key] = i;
        }

        self.add_triangle(i0, i1, i2, EMPTY, EMPTY, EMPTY);

        let mut previous: Option<Point2> = None;
        for &i in &ids {
            let p = points[i];

            // skip near-duplicate points
            if let Some(pp) = previous {
                if (p.x - pp.x).abs() <= EPSILON && (p.y - pp.y).abs() <= EPSILON {
                    continue;
                }
            }
            previous = Some(p);

            if i == i0 || i == i1 || i == i2 {
                continue;
            }

            // find a visible edge on the convex hull using the angular hash
            let size = self.hull_hash.len();
            let key = self.hash_key(&p);
            let mut start = EMPTY;
            for j in 0..size {
                let candidate = self.hull_hash[(key + j) % size];
                if candidate != EMPTY && candidate != self.hull_next[candidate] {
                    start = candidate;
                    break;
                }
            }
            if start == EMPTY {
                start = self.hull_start;
            }

            start = self.hull_prev[start];
            let mut e = start;
            loop {
                let q = self.hull_next[e];
                if orient2d(&p, &points[e], &points[q]) < 0.0 {
                    break;
                }
                e = q;
                if e == start {
                    e = EMPTY;
                    break;
                }
            }
            if e == EMPTY {
                // nothing visible: a near-duplicate the epsilon check missed
                continue;
            }

            // first triangle from the point
            let mut t = self.add_triangle(e, i, self.hull_next[e], EMPTY, EMPTY, self.hull_tri[e]);
            self.hull_tri[i] = self.legalize(t + 2);
            self.hull_tri[e] = t;
            hull_size += 1;

            // walk forward through the hull
            let mut nx = self.hull_next[e];
            loop {
                let q = self.hull_next[nx];
                if orient2d(&p, &points[nx], &points[q]) >= 0.0 {
                    break;
                }
                t = self.add_triangle(nx, i, q, self.hull_tri[i], EMPTY, self.hull_tri[nx]);
                self.hull_tri[i] = self.legalize(t + 2);
                self.hull_next[nx] = nx;
                hull_size -= 1;
                nx = q;
            }

            // walk backward from the other side
            if e == start {
                loop {
                    let q = self.hull_prev[e];
                    if orient2d(&p, &points[q], &points[e]) >= 0.0 {
                        break;
                    }
                    t = self.add_triangle(q, i, e, EMPTY, self.hull_tri[e], self.hull_tri[q]);
                    self.legalize(t + 2);
                    self.hull_tri[q] = t;
                    self.hull_next[e] = e;
                    hull_size -= 1;
                    e = q;
                }
            }

            self.hull_start = e;
            self.hull_prev[i] = e;
            self.hull_next[e] = i;
            self.hull_prev[nx] = i;
            self.hull_next[i] = nx;

            let key = self.hash_key(&p);
            self.hull_hash[key] = i;
            let key = self.hash_key(&points[e]);
            self.hull_hash[key] = e;
        }

        if self.dropped_flips > 0 {
            debug!(
                dropped = self.dropped_flips,
                "legalization stack overflowed; some flips were not re-tested"
            );
        }

        let mut hull = Vec::with_capacity(hull_size);
        let mut e = self.hull_start;
        for _ in 0..hull_size {
            hull.push(e);
            e = self.hull_next[e];
        }

        Triangulation {
            triangles: std::mem::take(&mut self.triangles),
            halfedges: std::mem::take(&mut self.halfedges),
            hull,
        }
    }

    fn add_triangle(
        &mut self,
        i0: usize,
        i1: usize,
        i2: usize,
        a: usize,
        b: usize,
        c: usize,
    ) -> usize {
        let t = self.triangles.len();
        self.triangles.extend_from_slice(&[i0, i1, i2]);
        self.halfedges.extend_from_slice(&[EMPTY; 3]);
        self.link(t, a);
        self.link(t + 1, b);
        self.link(t + 2, c);
        t
    }

    #[inline]
    fn link(&mut self, a: usize, b: usize) {
        self.halfedges[a] = b;
        if b != EMPTY {
            self.halfedges[b] = a;
        }
    }

    /// Flips edges until the fan around half-edge `a` is locally Delaunay.
    /// Returns the half-edge that ends up opposite the new point's hull edge.
    ///
    /// ```text
    ///           pl                    pl
    ///          /||\                  /  \
    ///       al/ || \bl            al/    \a
    ///        /  ||  \              /      \
    ///       /  a||b  \    flip    /___ar___\
    ///     p0\   ||   /p1   =>   p0\---bl---/p1
    ///        \  ||  /              \      /
    ///       ar\ || /br             b\    /br
    ///          \||/                  \  /
    ///           pr                    pr
    /// ```
    fn legalize(&mut self, mut a: usize) -> usize {
        let points = self.points;
        let mut ar;
        self.edge_stack.clear();

        loop {
            let b = self.halfedges[a];
            let a0 = a - a % 3;
            ar = a0 + (a + 2) % 3;

            if b == EMPTY {
                match self.edge_stack.pop() {
                    Some(next) => {
                        a = next;
                        continue;
                    }
                    None => break,
                }
            }

            let b0 = b - b % 3;
            let al = a0 + (a + 1) % 3;
            let bl = b0 + (b + 2) % 3;

            let p0 = self.triangles[ar];
            let pr = self.triangles[a];
            let pl = self.triangles[al];
            let p1 = self.triangles[bl];

            let illegal = incircle(&points[p0], &points[pr], &points[pl], &points[p1]) > 0.0;
            if !illegal {
                match self.edge_stack.pop() {
                    Some(next) => {
                        a = next;
                        continue;
                    }
                    None => break,
                }
            }

            self.triangles[a] = p1;
            self.triangles[b] = p0;

            let hbl = self.halfedges[bl];
            // the flipped edge was on the hull: repoint the hull triangle
            if hbl == EMPTY {
                let mut e = self.hull_start;
                loop {
                    if self.hull_tri[e] == bl {
                        self.hull_tri[e] = a;
                        break;
                    }
                    e = self.hull_prev[e];
                    if e == self.hull_start {
                        break;
                    }
                }
            }
            self.link(a, hbl);
            let har = self.halfedges[ar];
            self.link(b, har);
            self.link(ar, bl);

            let br = b0 + (b + 1) % 3;
            // overflow only happens on extremely degenerate input
            if self.edge_stack.len() < EDGE_STACK_CAPACITY {
                self.edge_stack.push(br);
            } else {
                self.dropped_flips += 1;
                trace!(edge = br, "edge stack full, dropping flip re-test");
            }
        }

        ar
    }
}
