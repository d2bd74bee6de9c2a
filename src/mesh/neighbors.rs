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

use smallvec::SmallVec;

use crate::geometry::Point2;
use crate::mesh::half_edge::next_halfedge;
use crate::operations::triangulation::Triangulation;

pub type NeighborList = SmallVec<[usize; 8]>;

/// Symmetric adjacency derived from triangulation edges no longer than a
/// threshold. Neighbor lists keep discovery order and hold no duplicates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NeighborGraph {
    adjacency: Vec<NeighborList>,
}

impl NeighborGraph {
    /// Keeps every triangulation edge `(p, q)` with `|pq| <= max_edge_length`.
    /// For collinear input the consecutive hull points act as edges.
    pub fn build(points: &[Point2], triangulation: &Triangulation, max_edge_length: f64) -> Self {
        let mut graph = NeighborGraph {
            adjacency: vec![NeighborList::new(); points.len()],
        };

        if triangulation.is_collinear() {
            for pair in triangulation.hull.windows(2) {
                graph.connect(points, pair[0], pair[1], max_edge_length);
            }
            return graph;
        }

        for e in 0..triangulation.triangles.len() {
            let p = triangulation.triangles[e];
            let q = triangulation.triangles[next_halfedge(e)];
            graph.connect(points, p, q, max_edge_length);
        }
        graph
    }

    fn connect(&mut self, points: &[Point2], p: usize, q: usize, max_edge_length: f64) {
        if p == q || points[p].distance_to(&points[q]) > max_edge_length {
            return;
        }
        if !self.adjacency[p].contains(&q) {
            self.adjacency[p].push(q);
        }
        if !self.adjacency[q].contains(&p) {
            self.adjacency[q].push(p);
        }
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn neighbors(&self, i: usize) -> &[usize] {
        self.adjacency.get(i).map(|n| n.as_slice()).unwrap_or(&[])
    }

    pub fn degree(&self, i: usize) -> usize {
        self.neighbors(i).len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(|n| n.len()).sum::<usize>() / 2
    }

    pub fn is_symmetric(&self) -> bool {
        self.adjacency
            .iter()
            .enumerate()
            .all(|(p, ns)| ns.iter().all(|&q| self.neighbors(q).contains(&p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_with_center() -> (Vec<Point2>, Triangulation) {
        Triangulation::from_coords(&[
            [0.0, 0.0],
            [2.0, 0.0],
            [2.0, 2.0],
            [0.0, 2.0],
            [1.0, 1.0],
        ])
        .unwrap()
    }

    #[test]
    fn unbounded_threshold_keeps_all_edges() {
        let (points, t) = square_with_center();
        let g = NeighborGraph::build(&points, &t, f64::INFINITY);
        assert_eq!(g.edge_count(), t.undirected_edges().count());
        assert_eq!(g.degree(4), 4);
        assert!(g.is_symmetric());
    }

    #[test]
    fn threshold_drops_long_edges() {
        let (points, t) = square_with_center();
        // sides are 2.0 long, spokes are sqrt(2)
        let g = NeighborGraph::build(&points, &t, 1.5);
        assert_eq!(g.edge_count(), 4);
        for corner in 0..4 {
            assert_eq!(g.neighbors(corner), &[4]);
        }
        assert!(g.is_symmetric());
    }

    #[test]
    fn collinear_input_links_consecutive_points() {
        let (points, t) = Triangulation::from_coords(&[[0, 0], [2, 0], [1, 0]]).unwrap();
        let g = NeighborGraph::build(&points, &t, 10.0);
        assert_eq!(g.neighbors(2), &[0, 1]);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn out_of_range_index_has_no_neighbors() {
        let g = NeighborGraph::default();
        assert!(g.neighbors(3).is_empty());
    }
}
