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

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::geometry::Vector2;

/// Momentum and accumulated mass carried along one directed edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowEdge {
    pub momentum: Vector2,
    pub weight: f64,
}

/// Serializable `{source, target, weight}` form of an installed edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowEdgeRecord {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
}

#[derive(Clone, Debug, Default)]
pub struct FlowNode {
    /// Edges arriving from predecessors, keyed by predecessor index.
    inbound: SmallVec<[(usize, FlowEdge); 4]>,
    /// The single outgoing edge, if any.
    outbound: Option<(usize, FlowEdge)>,
}

impl FlowNode {
    pub fn predecessors(&self) -> impl Iterator<Item = usize> + '_ {
        self.inbound.iter().map(|&(p, _)| p)
    }

    pub fn successor(&self) -> Option<usize> {
        self.outbound.map(|(s, _)| s)
    }

    pub fn outbound(&self) -> Option<(usize, FlowEdge)> {
        self.outbound
    }

    pub fn inbound(&self) -> &[(usize, FlowEdge)] {
        &self.inbound
    }
}

/// Index-addressed flow graph. Each node has at most one successor; both
/// endpoints of an edge always agree on it.
#[derive(Clone, Debug, Default)]
pub struct FlowGraph {
    nodes: Vec<FlowNode>,
}

impl FlowGraph {
    pub fn new(len: usize) -> Self {
        Self {
            nodes: vec![FlowNode::default(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, i: usize) -> Option<&FlowNode> {
        self.nodes.get(i)
    }

    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    /// Detaches the outgoing edge of `source` from both endpoints and returns
    /// its former target.
    pub fn remove_outgoing(&mut self, source: usize) -> Option<usize> {
        let (target, _) = self.nodes.get_mut(source)?.outbound.take()?;
        if let Some(t) = self.nodes.get_mut(target) {
            t.inbound.retain(|(p, _)| *p != source);
        }
        Some(target)
    }

    /// Installs `source -> target`, replacing any outgoing edge of `source`.
    pub fn install(&mut self, source: usize, target: usize, edge: FlowEdge) {
        if source == target || target >= self.nodes.len() || source >= self.nodes.len() {
            return;
        }
        self.remove_outgoing(source);
        self.nodes[source].outbound = Some((target, edge));
        self.nodes[target].inbound.push((source, edge));
    }

    /// Summed inbound momentum and mass of `node`.
    ///
    /// A predecessor whose outgoing edge now carries more than the record
    /// held here contributes nothing: its recorded share is stale.
    pub fn inbound_totals(&self, node: usize) -> (Vector2, f64) {
        let mut momentum = Vector2::ZERO;
        let mut mass = 0.0;
        let Some(n) = self.nodes.get(node) else {
            return (momentum, mass);
        };
        for &(pred, edge) in &n.inbound {
            momentum += edge.momentum;
            mass += edge.weight;
            let strongest = self.nodes[pred].outbound.map(|(_, e)| e.weight);
            if strongest.is_some_and(|w| w > edge.weight) {
                momentum -= edge.momentum;
                mass -= edge.weight;
            }
        }
        (momentum, mass)
    }

    /// Installed edges ordered by source index.
    pub fn edges(&self) -> Vec<FlowEdgeRecord> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(source, n)| {
                n.outbound.map(|(target, e)| FlowEdgeRecord {
                    source,
                    target,
                    weight: e.weight,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(weight: f64) -> FlowEdge {
        FlowEdge {
            momentum: Vector2::new(weight, 0.0),
            weight,
        }
    }

    #[test]
    fn install_links_both_endpoints() {
        let mut g = FlowGraph::new(3);
        g.install(0, 1, edge(2.0));
        assert_eq!(g.node(0).unwrap().successor(), Some(1));
        assert_eq!(g.node(1).unwrap().predecessors().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn reinstall_moves_edge() {
        let mut g = FlowGraph::new(3);
        g.install(0, 1, edge(1.0));
        g.install(0, 2, edge(1.0));
        assert_eq!(g.node(0).unwrap().successor(), Some(2));
        assert!(g.node(1).unwrap().inbound().is_empty());
        assert_eq!(g.edges().len(), 1);
    }

    #[test]
    fn self_loops_are_ignored() {
        let mut g = FlowGraph::new(2);
        g.install(1, 1, edge(1.0));
        assert!(g.edges().is_empty());
    }

    #[test]
    fn inbound_totals_sum_predecessors() {
        let mut g = FlowGraph::new(3);
        g.install(0, 2, edge(1.0));
        g.install(1, 2, edge(3.0));
        let (m, mass) = g.inbound_totals(2);
        assert_eq!(mass, 4.0);
        assert_eq!(m, Vector2::new(4.0, 0.0));
    }

    #[test]
    fn remove_outgoing_returns_old_target() {
        let mut g = FlowGraph::new(2);
        assert_eq!(g.remove_outgoing(0), None);
        g.install(0, 1, edge(1.0));
        assert_eq!(g.remove_outgoing(0), Some(1));
        assert_eq!(g.inbound_totals(1).1, 0.0);
    }
}
