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

//! End-to-end generation: sample, triangulate, connect, route flow.

pub mod messages;
pub mod worker;

use thiserror::Error;
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::config::{ConfigError, RiverConfig};
use crate::geometry::Point2;
use crate::hydrology::{FlowError, FlowNetwork, build_flow_network};
use crate::mesh::NeighborGraph;
use crate::operations::triangulation::{Triangulation, TriangulationError};
use crate::sampling::{ElevationProvider, PointSampler, sample_elevations};

pub use messages::{Request, Response};
pub use worker::{Worker, spawn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Triangulation(#[from] TriangulationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Flow(FlowError),
    #[error("generation was cancelled")]
    Cancelled,
    #[error("failed to start worker thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("worker thread panicked")]
    WorkerPanicked,
}

impl From<FlowError> for PipelineError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::Cancelled => PipelineError::Cancelled,
            other => PipelineError::Flow(other),
        }
    }
}

/// Everything one generation run produced.
#[derive(Clone, Debug)]
pub struct RiverNetwork {
    pub points: Vec<Point2>,
    pub elevations: Vec<f64>,
    pub triangulation: Triangulation,
    pub neighbors: NeighborGraph,
    pub flow: FlowNetwork,
}

impl RiverNetwork {
    /// The terminal `result` message for this network.
    pub fn to_response(&self) -> Response {
        Response::Result {
            edges: self.flow.edges(),
            points: self.points.clone(),
        }
    }
}

fn check_cancelled(cancel: &CancelToken) -> Result<(), PipelineError> {
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }
    Ok(())
}

/// Runs triangulation, neighbor construction and flow routing over a
/// prepared point set.
pub fn build_network(
    points: Vec<Point2>,
    elevations: Vec<f64>,
    config: &RiverConfig,
    progress: &mut dyn FnMut(String),
    cancel: &CancelToken,
) -> Result<RiverNetwork, PipelineError> {
    check_cancelled(cancel)?;
    let triangulation = Triangulation::new(&points)?;
    if cfg!(debug_assertions) {
        triangulation.validate(points.len())?;
    }
    debug!(
        points = points.len(),
        triangles = triangulation.len(),
        hull = triangulation.hull.len(),
        "triangulated"
    );

    check_cancelled(cancel)?;
    let neighbors =
        NeighborGraph::build(&points, &triangulation, config.neighbors.max_edge_length);
    debug!(edges = neighbors.edge_count(), "neighbor graph built");

    check_cancelled(cancel)?;
    let mut observer = |done: usize, total: usize| {
        progress(format!("Processed {done}/{total} nodes"));
    };
    let flow = build_flow_network(
        &points,
        &elevations,
        &neighbors,
        &config.flow,
        &mut observer,
        cancel,
    )?;

    Ok(RiverNetwork {
        points,
        elevations,
        triangulation,
        neighbors,
        flow,
    })
}

/// Serves one host request with the given collaborators.
///
/// The request's `pointCount` is the number of random points drawn from
/// `sampler`; the sampler may add fixed points on top.
pub fn run_request(
    request: &Request,
    config: &RiverConfig,
    sampler: &dyn PointSampler,
    field: &dyn ElevationProvider,
    progress: &mut dyn FnMut(String),
    cancel: &CancelToken,
) -> Result<RiverNetwork, PipelineError> {
    let Request::Start { point_count, seed } = request;
    if *point_count == 0 {
        return Err(PipelineError::InvalidRequest(
            "pointCount must be greater than zero".to_string(),
        ));
    }
    let seed = seed.unwrap_or(config.seed);
    info!(point_count, seed, "generating river network");

    let points = sampler.sample(*point_count, seed);
    check_cancelled(cancel)?;
    let elevations = sample_elevations(&points, field);
    build_network(points, elevations, config, progress, cancel)
}
