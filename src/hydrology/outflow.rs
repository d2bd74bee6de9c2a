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

//! Ballistic outflow search.
//!
//! A node's inbound momentum and mass give it a horizontal velocity. Each
//! admissible neighbor is scored by the time a particle needs to slide there
//! under constant gravity; the longest feasible flight becomes the outflow
//! target.

use ahash::AHashSet;

use crate::config::FlowConfig;
use crate::geometry::util::EPSILON;
use crate::geometry::{Point2, Vector2};
use crate::hydrology::flow_graph::FlowEdge;
use crate::mesh::NeighborGraph;

/// Chosen outflow of a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Outflow {
    pub target: usize,
    pub edge: FlowEdge,
    pub time_of_flight: f64,
}

/// Kinematics of one candidate edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Flight {
    /// Unit horizontal direction from source to target.
    pub direction: Vector2,
    /// Speed along `direction` on arrival.
    pub final_speed: f64,
    pub time_of_flight: f64,
}

/// Evaluates the slide from `from` to `to` with elevation change `dz`.
///
/// Returns `None` when the particle cannot reach `to`: either it runs out of
/// speed climbing, or its mean speed along the edge is not positive.
pub fn flight(
    from: &Point2,
    to: &Point2,
    dz: f64,
    velocity: Vector2,
    gravity: f64,
) -> Option<Flight> {
    let offset = to - from;
    let run = offset.norm().max(EPSILON);
    let direction = offset.scale(1.0 / run);

    let initial_speed = velocity.dot(&direction);
    let final_squared = initial_speed * initial_speed - 2.0 * gravity * dz;
    if final_squared < 0.0 {
        return None;
    }
    let final_speed = final_squared.sqrt();

    let mean_speed = 0.5 * (initial_speed + final_speed);
    if mean_speed <= EPSILON {
        return None;
    }

    let length = (offset.norm().powi(2) + dz * dz).sqrt();
    Some(Flight {
        direction,
        final_speed,
        time_of_flight: length / mean_speed,
    })
}

/// Read-only inputs shared by every outflow search of one build.
pub struct OutflowSearch<'a> {
    pub points: &'a [Point2],
    pub elevations: &'a [f64],
    pub neighbors: &'a NeighborGraph,
    pub config: &'a FlowConfig,
}

impl OutflowSearch<'_> {
    #[inline]
    pub fn is_boundary(&self, i: usize) -> bool {
        let p = self.points[i];
        self.config.boundary.contains(p.x, p.y)
    }

    /// Outflow of `node` given its aggregated inbound momentum and mass: the
    /// feasible neighbor with the largest time of flight. Ties keep the
    /// neighbor seen first.
    pub fn search(
        &self,
        node: usize,
        inbound_momentum: Vector2,
        inbound_mass: f64,
        vetoes: &AHashSet<usize>,
    ) -> Option<Outflow> {
        let total_mass = self.config.node_mass + inbound_mass;
        let velocity = inbound_momentum.scale(1.0 / total_mass.max(EPSILON));
        let here = &self.points[node];
        let z = self.elevations[node];

        let mut best: Option<Outflow> = None;
        for &j in self.neighbors.neighbors(node) {
            if j == node || vetoes.contains(&j) {
                continue;
            }
            let dz = self.elevations[j] - z;
            if self.config.uphill_veto && dz > 0.0 {
                continue;
            }
            if !self.config.flow_into_boundary && self.is_boundary(j) {
                continue;
            }
            let Some(f) = flight(here, &self.points[j], dz, velocity, self.config.gravity) else {
                continue;
            };
            if best.is_none_or(|b| f.time_of_flight > b.time_of_flight) {
                best = Some(Outflow {
                    target: j,
                    edge: FlowEdge {
                        momentum: f.direction.scale(total_mass * f.final_speed),
                        weight: total_mass,
                    },
                    time_of_flight: f.time_of_flight,
                });
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::triangulation::Triangulation;

    #[test]
    fn resting_particle_cannot_cross_flat_ground() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        assert!(flight(&a, &b, 0.0, Vector2::ZERO, 1.0).is_none());
    }

    #[test]
    fn falling_from_rest() {
        // dz = -0.5, g = 1: vf = 1, mean speed 0.5
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let f = flight(&a, &b, -0.5, Vector2::ZERO, 1.0).unwrap();
        assert!((f.final_speed - 1.0).abs() < 1e-12);
        assert!((f.time_of_flight - 2.0 * 1.25f64.sqrt()).abs() < 1e-12);
        assert_eq!(f.direction, Vector2::new(1.0, 0.0));
    }

    #[test]
    fn momentum_carries_particle_uphill() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        assert!(flight(&a, &b, 0.1, Vector2::new(1.0, 0.0), 1.0).is_some());
        assert!(flight(&a, &b, 1.0, Vector2::new(1.0, 0.0), 1.0).is_none());
        // moving away from the target
        assert!(flight(&a, &b, 0.0, Vector2::new(-1.0, 0.0), 1.0).is_none());
    }

    fn star() -> (Vec<Point2>, NeighborGraph) {
        let (points, t) = Triangulation::from_coords(&[
            [0.5, 0.5],
            [0.6, 0.5],
            [0.5, 0.6],
            [0.4, 0.5],
            [0.5, 0.4],
        ])
        .unwrap();
        let graph = NeighborGraph::build(&points, &t, 1.0);
        (points, graph)
    }

    #[test]
    fn longest_flight_wins() {
        let (points, neighbors) = star();
        let elevations = [1.0, 0.98, 0.9, 1.2, 0.99];
        let config = FlowConfig::default();
        let search = OutflowSearch {
            points: &points,
            elevations: &elevations,
            neighbors: &neighbors,
            config: &config,
        };
        // from rest: dt is about 1.02 to 1, 0.63 to 2 and 1.42 to 4
        let out = search.search(0, Vector2::ZERO, 0.0, &AHashSet::new()).unwrap();
        assert_eq!(out.target, 4);
        assert!((out.time_of_flight - 0.0101f64.sqrt() / 0.02f64.sqrt() * 2.0).abs() < 1e-12);
        assert_eq!(out.edge.weight, 1.0);
    }

    #[test]
    fn vetoed_and_uphill_neighbors_are_skipped() {
        let (points, neighbors) = star();
        let elevations = [1.0, 0.98, 0.9, 1.2, 0.99];
        let config = FlowConfig::default();
        let search = OutflowSearch {
            points: &points,
            elevations: &elevations,
            neighbors: &neighbors,
            config: &config,
        };
        let vetoes: AHashSet<usize> = [4].into_iter().collect();
        let out = search.search(0, Vector2::ZERO, 0.0, &vetoes).unwrap();
        assert_eq!(out.target, 1);

        let all: AHashSet<usize> = [1, 2, 4].into_iter().collect();
        assert!(search.search(0, Vector2::ZERO, 0.0, &all).is_none());
    }

    #[test]
    fn outgoing_weight_includes_inbound_mass() {
        let (points, neighbors) = star();
        let elevations = [1.0, 0.98, 0.9, 1.2, 0.99];
        let config = FlowConfig::default();
        let search = OutflowSearch {
            points: &points,
            elevations: &elevations,
            neighbors: &neighbors,
            config: &config,
        };
        let out = search
            .search(0, Vector2::new(0.0, 3.0), 3.0, &AHashSet::new())
            .unwrap();
        assert_eq!(out.edge.weight, 4.0);
        // barely creeping against the flow toward 4 is the longest flight
        assert_eq!(out.target, 4);
        assert!(out.time_of_flight > 10.0);
    }
}
