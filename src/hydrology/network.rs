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

//! Scheduling of the flow network construction.
//!
//! Nodes are processed from the highest elevation down. Whenever a node's
//! outflow changes and the affected target was already processed, the target
//! is pushed onto a recheck list that drains before the next main-queue node,
//! so accumulated momentum keeps propagating downstream.

use ahash::AHashSet;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::config::FlowConfig;
use crate::geometry::Point2;
use crate::hydrology::flow_graph::{FlowEdgeRecord, FlowGraph};
use crate::hydrology::outflow::OutflowSearch;
use crate::mesh::NeighborGraph;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FlowError {
    #[error("{what} has {got} entries but there are {expected} points")]
    LengthMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    #[error("flow network construction was cancelled")]
    Cancelled,
}

/// Receives progress while the main queue drains.
pub trait FlowObserver {
    fn on_progress(&mut self, processed: usize, total: usize);
}

impl<F: FnMut(usize, usize)> FlowObserver for F {
    fn on_progress(&mut self, processed: usize, total: usize) {
        self(processed, total)
    }
}

/// Observer that ignores progress.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl FlowObserver for Silent {
    fn on_progress(&mut self, _processed: usize, _total: usize) {}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlowStats {
    /// Nodes evaluated, main queue and rechecks together.
    pub iterations: usize,
    pub rechecks: usize,
    /// The iteration cap was hit and pending rechecks were dropped.
    pub capped: bool,
}

/// Finished flow network over a point set.
#[derive(Clone, Debug, Default)]
pub struct FlowNetwork {
    graph: FlowGraph,
    stats: FlowStats,
}

impl FlowNetwork {
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn stats(&self) -> FlowStats {
        self.stats
    }

    /// Installed edges ordered by source index.
    pub fn edges(&self) -> Vec<FlowEdgeRecord> {
        self.graph.edges()
    }

    pub fn successor(&self, i: usize) -> Option<usize> {
        self.graph.node(i).and_then(|n| n.successor())
    }

    pub fn predecessors(&self, i: usize) -> Vec<usize> {
        self.graph
            .node(i)
            .map(|n| n.predecessors().collect())
            .unwrap_or_default()
    }

    pub fn out_degree(&self, i: usize) -> usize {
        usize::from(self.successor(i).is_some())
    }

    /// Nodes without an outgoing edge.
    pub fn sinks(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.successor(i).is_none()).collect()
    }

    /// Follows successors from `start`. The walk stops at a sink or at the
    /// first repeated node, so it terminates even if the graph has a cycle.
    pub fn downstream_path(&self, start: usize) -> Vec<usize> {
        let mut path = Vec::new();
        if start >= self.len() {
            return path;
        }
        let mut seen = AHashSet::new();
        let mut current = Some(start);
        while let Some(i) = current {
            if !seen.insert(i) {
                break;
            }
            path.push(i);
            current = self.successor(i);
        }
        path
    }
}

/// Builds the flow network over `points`.
///
/// `elevations` and `neighbors` must be indexed like `points`.
pub fn build_flow_network(
    points: &[Point2],
    elevations: &[f64],
    neighbors: &NeighborGraph,
    config: &FlowConfig,
    observer: &mut dyn FlowObserver,
    cancel: &CancelToken,
) -> Result<FlowNetwork, FlowError> {
    let n = points.len();
    if elevations.len() != n {
        return Err(FlowError::LengthMismatch {
            what: "elevations",
            got: elevations.len(),
            expected: n,
        });
    }
    if neighbors.len() != n {
        return Err(FlowError::LengthMismatch {
            what: "neighbor graph",
            got: neighbors.len(),
            expected: n,
        });
    }

    let mut scheduler = Scheduler::new(points, elevations, neighbors, config);
    scheduler.run(observer, cancel)?;

    info!(
        nodes = n,
        edges = scheduler.graph.edges().len(),
        iterations = scheduler.stats.iterations,
        rechecks = scheduler.stats.rechecks,
        capped = scheduler.stats.capped,
        "flow network built"
    );

    Ok(FlowNetwork {
        graph: scheduler.graph,
        stats: scheduler.stats,
    })
}

struct Scheduler<'a> {
    search: OutflowSearch<'a>,
    graph: FlowGraph,
    /// Main queue: node indices by descending elevation, ties by index.
    order: Vec<usize>,
    /// Position of each node in `order`.
    rank: Vec<usize>,
    /// Next position of the main queue; everything ranked below it has been
    /// popped already.
    head: usize,
    recheck: Vec<usize>,
    visited: AHashSet<usize>,
    vetoes: AHashSet<usize>,
    max_iterations: usize,
    stats: FlowStats,
}

impl<'a> Scheduler<'a> {
    fn new(
        points: &'a [Point2],
        elevations: &'a [f64],
        neighbors: &'a NeighborGraph,
        config: &'a FlowConfig,
    ) -> Self {
        let n = points.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| elevations[b].total_cmp(&elevations[a]).then(a.cmp(&b)));
        let mut rank = vec![0; n];
        for (r, &i) in order.iter().enumerate() {
            rank[i] = r;
        }

        Self {
            search: OutflowSearch {
                points,
                elevations,
                neighbors,
                config,
            },
            graph: FlowGraph::new(n),
            order,
            rank,
            head: 0,
            recheck: Vec::new(),
            visited: AHashSet::new(),
            vetoes: AHashSet::new(),
            max_iterations: config.max_iterations_per_node.saturating_mul(n.max(1)),
            stats: FlowStats::default(),
        }
    }

    fn run(
        &mut self,
        observer: &mut dyn FlowObserver,
        cancel: &CancelToken,
    ) -> Result<(), FlowError> {
        let total = self.order.len();
        let interval = self.search.config.progress_interval.max(1);

        while let Some(node) = self.next_node(observer, total, interval) {
            if cancel.is_cancelled() {
                debug!(processed = self.head, "flow construction cancelled");
                return Err(FlowError::Cancelled);
            }

            self.stats.iterations += 1;
            if !self.stats.capped && self.stats.iterations > self.max_iterations {
                warn!(
                    iterations = self.stats.iterations,
                    pending = self.recheck.len(),
                    "flow iteration cap reached; dropping pending rechecks"
                );
                self.stats.capped = true;
                self.recheck.clear();
            }

            self.process(node);
        }
        Ok(())
    }

    /// Pops the highest pending recheck, else the next main-queue node.
    fn next_node(
        &mut self,
        observer: &mut dyn FlowObserver,
        total: usize,
        interval: usize,
    ) -> Option<usize> {
        if !self.recheck.is_empty() {
            let rank = &self.rank;
            // highest elevation ends up last
            self.recheck.sort_unstable_by(|&a, &b| rank[b].cmp(&rank[a]));
            self.stats.rechecks += 1;
            return self.recheck.pop();
        }

        let node = *self.order.get(self.head)?;
        self.head += 1;
        self.visited.clear();
        self.vetoes.clear();
        if self.head % interval == 0 {
            debug!(processed = self.head, total, "flow progress");
            observer.on_progress(self.head, total);
        }
        Some(node)
    }

    fn process(&mut self, node: usize) {
        if self.visited.contains(&node) {
            let z = self.search.elevations[node];
            if let Some(n) = self.graph.node(node) {
                for pred in n.predecessors() {
                    if self.visited.contains(&pred) && self.search.elevations[pred] > z {
                        self.vetoes.insert(pred);
                    }
                }
            }
        }

        if let Some(old) = self.graph.remove_outgoing(node) {
            self.schedule(old);
        }
        self.visited.insert(node);

        if self.search.is_boundary(node) {
            return;
        }

        let (momentum, mass) = self.graph.inbound_totals(node);
        if let Some(out) = self.search.search(node, momentum, mass, &self.vetoes) {
            self.graph.install(node, out.target, out.edge);
            self.schedule(out.target);
        }
    }

    /// Queues `node` for recomputation if the main queue already passed it.
    fn schedule(&mut self, node: usize) {
        if self.stats.capped || self.rank[node] >= self.head {
            return;
        }
        if !self.recheck.contains(&node) {
            self.recheck.push(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector2;
    use crate::hydrology::flow_graph::FlowEdge;
    use crate::operations::triangulation::Triangulation;

    fn build(coords: &[[f64; 2]], elevations: &[f64], config: &FlowConfig) -> FlowNetwork {
        build_within(coords, elevations, config, f64::INFINITY)
    }

    fn build_within(
        coords: &[[f64; 2]],
        elevations: &[f64],
        config: &FlowConfig,
        max_edge_length: f64,
    ) -> FlowNetwork {
        let (points, t) = Triangulation::from_coords(coords).unwrap();
        let neighbors = NeighborGraph::build(&points, &t, max_edge_length);
        build_flow_network(
            &points,
            elevations,
            &neighbors,
            config,
            &mut Silent,
            &CancelToken::new(),
        )
        .unwrap()
    }

    #[test]
    fn empty_input_has_no_edges() {
        let net = build(&[], &[], &FlowConfig::default());
        assert!(net.is_empty());
        assert!(net.edges().is_empty());
    }

    #[test]
    fn chain_flows_downhill() {
        let coords = [[0.2, 0.5], [0.4, 0.5], [0.6, 0.5], [0.8, 0.52]];
        let net = build_within(&coords, &[1.0, 0.8, 0.6, 0.4], &FlowConfig::default(), 0.25);
        assert_eq!(net.successor(0), Some(1));
        assert_eq!(net.successor(1), Some(2));
        assert_eq!(net.successor(2), Some(3));
        assert_eq!(net.downstream_path(0), vec![0, 1, 2, 3]);
        assert_eq!(net.sinks(), vec![3]);
    }

    #[test]
    fn accumulated_weight_grows_downstream() {
        let coords = [[0.2, 0.5], [0.4, 0.5], [0.6, 0.5], [0.8, 0.52]];
        let net = build_within(&coords, &[1.0, 0.8, 0.6, 0.4], &FlowConfig::default(), 0.25);
        let weights: Vec<f64> = net.edges().iter().map(|e| e.weight).collect();
        assert_eq!(weights, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn boundary_nodes_never_flow() {
        let coords = [[0.0, 0.5], [0.5, 0.5], [0.5, 0.9]];
        let config = FlowConfig {
            flow_into_boundary: true,
            ..FlowConfig::default()
        };
        let net = build(&coords, &[1.0, 0.5, 0.0], &config);
        assert_eq!(net.out_degree(0), 0);
        assert_eq!(net.successor(1), Some(2));
    }

    #[test]
    fn boundary_targets_are_opt_in() {
        let coords = [[0.5, 0.5], [1.0, 0.5], [0.5, 0.7]];
        let elevations = [1.0, 0.0, 0.9];
        let net = build(&coords, &elevations, &FlowConfig::default());
        assert_eq!(net.successor(0), Some(2));

        let config = FlowConfig {
            flow_into_boundary: true,
            ..FlowConfig::default()
        };
        let net = build(&coords, &elevations, &config);
        assert_eq!(net.successor(0), Some(1));
        assert_eq!(net.successor(2), Some(1));
        assert_eq!(net.sinks(), vec![1]);
    }

    #[test]
    fn flat_ground_has_no_edges() {
        let coords = [[0.3, 0.3], [0.6, 0.3], [0.45, 0.6]];
        let net = build(&coords, &[0.5, 0.5, 0.5], &FlowConfig::default());
        assert!(net.edges().is_empty());
    }

    #[test]
    fn mismatched_elevations_are_rejected() {
        let (points, t) = Triangulation::from_coords(&[[0.1, 0.1], [0.2, 0.2]]).unwrap();
        let neighbors = NeighborGraph::build(&points, &t, 1.0);
        let err = build_flow_network(
            &points,
            &[1.0],
            &neighbors,
            &FlowConfig::default(),
            &mut Silent,
            &CancelToken::new(),
        )
        .unwrap_err();
        assert!(matches!(err, FlowError::LengthMismatch { got: 1, expected: 2, .. }));
    }

    #[test]
    fn cancelled_token_stops_construction() {
        let (points, t) =
            Triangulation::from_coords(&[[0.2, 0.2], [0.4, 0.4], [0.2, 0.4]]).unwrap();
        let neighbors = NeighborGraph::build(&points, &t, 1.0);
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = build_flow_network(
            &points,
            &[0.3, 0.2, 0.1],
            &neighbors,
            &FlowConfig::default(),
            &mut Silent,
            &cancel,
        )
        .unwrap_err();
        assert_eq!(err, FlowError::Cancelled);
    }

    #[test]
    fn progress_reports_every_interval() {
        let coords = [[0.2, 0.5], [0.4, 0.5], [0.6, 0.5], [0.8, 0.52]];
        let (points, t) = Triangulation::from_coords(&coords).unwrap();
        let neighbors = NeighborGraph::build(&points, &t, 1.0);
        let config = FlowConfig {
            progress_interval: 2,
            ..FlowConfig::default()
        };
        let mut seen = Vec::new();
        let mut observer = |done: usize, total: usize| seen.push((done, total));
        build_flow_network(
            &points,
            &[1.0, 0.8, 0.6, 0.4],
            &neighbors,
            &config,
            &mut observer,
            &CancelToken::new(),
        )
        .unwrap();
        assert_eq!(seen, vec![(2, 4), (4, 4)]);
    }

    #[test]
    fn revisited_node_vetoes_higher_visited_predecessors() {
        let (points, t) =
            Triangulation::from_coords(&[[0.3, 0.5], [0.4, 0.5], [0.4, 0.6]]).unwrap();
        let neighbors = NeighborGraph::build(&points, &t, 1.0);
        let elevations = [0.6, 0.5, 0.5];
        let config = FlowConfig {
            uphill_veto: false,
            ..FlowConfig::default()
        };
        // inbound momentum strong enough to climb back to the source
        let push_back = FlowEdge {
            momentum: Vector2::new(-5.0, 0.0),
            weight: 1.0,
        };

        let mut first = Scheduler::new(&points, &elevations, &neighbors, &config);
        first.graph.install(0, 1, push_back);
        first.visited.insert(0);
        first.process(1);
        assert!(first.vetoes.is_empty());
        assert_eq!(first.graph.node(1).and_then(|n| n.successor()), Some(0));

        let mut again = Scheduler::new(&points, &elevations, &neighbors, &config);
        again.graph.install(0, 1, push_back);
        again.visited.extend([0, 1]);
        again.process(1);
        assert!(again.vetoes.contains(&0));
        assert_eq!(again.graph.node(1).and_then(|n| n.successor()), None);
    }

    #[test]
    fn downstream_path_of_unknown_node_is_empty() {
        let net = FlowNetwork::default();
        assert!(net.downstream_path(5).is_empty());
        assert!(net.predecessors(5).is_empty());
    }
}
