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

//! Pipeline configuration.
//!
//! Every section uses `#[serde(default)]`, so a JSON document only needs the
//! fields it overrides; `{}` is the default configuration.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverConfig {
    /// Seed shared by the point sampler and the elevation noise.
    pub seed: u64,
    pub sampler: SamplerConfig,
    pub elevation: ElevationConfig,
    pub neighbors: NeighborConfig,
    pub flow: FlowConfig,
}

impl Default for RiverConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            sampler: SamplerConfig::default(),
            elevation: ElevationConfig::default(),
            neighbors: NeighborConfig::default(),
            flow: FlowConfig::default(),
        }
    }
}

impl RiverConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RiverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if !(self.neighbors.max_edge_length > 0.0) {
            return invalid("neighbors.max_edge_length must be positive");
        }
        if !(self.flow.node_mass > 0.0) || !self.flow.node_mass.is_finite() {
            return invalid("flow.node_mass must be positive and finite");
        }
        if !(self.flow.gravity > 0.0) || !self.flow.gravity.is_finite() {
            return invalid("flow.gravity must be positive and finite");
        }
        if !(self.flow.boundary.lower < self.flow.boundary.upper) {
            return invalid("flow.boundary.lower must be below flow.boundary.upper");
        }
        if self.flow.progress_interval == 0 {
            return invalid("flow.progress_interval must be at least 1");
        }
        if self.flow.max_iterations_per_node == 0 {
            return invalid("flow.max_iterations_per_node must be at least 1");
        }
        if self.elevation.octaves == 0 {
            return invalid("elevation.octaves must be at least 1");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Evenly spaced points placed on each side of the unit square so flow
    /// has boundary sinks to reach. Zero disables the border.
    pub border_points_per_side: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            border_points_per_side: 32,
        }
    }
}

/// Fractal Brownian motion parameters for the default elevation field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevationConfig {
    pub octaves: usize,
    pub frequency: f64,
    pub lacunarity: f64,
    pub persistence: f64,
}

impl Default for ElevationConfig {
    fn default() -> Self {
        Self {
            octaves: 6,
            frequency: 2.0,
            lacunarity: 2.0,
            persistence: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighborConfig {
    /// Triangulation edges longer than this are not flow candidates.
    pub max_edge_length: f64,
}

impl Default for NeighborConfig {
    fn default() -> Self {
        Self {
            max_edge_length: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Mass each node contributes on its own.
    pub node_mass: f64,
    pub gravity: f64,
    /// Never route flow to a higher neighbor.
    pub uphill_veto: bool,
    /// Allow boundary nodes to be chosen as outflow targets. Off by default;
    /// turn it on to let rivers drain into the boundary sinks.
    pub flow_into_boundary: bool,
    pub boundary: BoundaryConfig,
    /// Iteration cap, as a multiple of the node count.
    pub max_iterations_per_node: usize,
    /// Main-queue nodes between progress notifications.
    pub progress_interval: usize,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            node_mass: 1.0,
            gravity: 1.0,
            uphill_veto: true,
            flow_into_boundary: false,
            boundary: BoundaryConfig::default(),
            max_iterations_per_node: 64,
            progress_interval: 1000,
        }
    }
}

/// A point is on the boundary when either coordinate is `<= lower` or
/// `>= upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    pub lower: f64,
    pub upper: f64,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            lower: 0.0,
            upper: 1.0,
        }
    }
}

impl BoundaryConfig {
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x <= self.lower || x >= self.upper || y <= self.lower || y >= self.upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        let config = RiverConfig::from_json_str("{}").unwrap();
        assert_eq!(config, RiverConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config =
            RiverConfig::from_json_str(r#"{ "seed": 7, "flow": { "uphill_veto": false } }"#)
                .unwrap();
        assert_eq!(config.seed, 7);
        assert!(!config.flow.uphill_veto);
        assert_eq!(config.flow.node_mass, 1.0);
        assert_eq!(config.neighbors.max_edge_length, 0.1);
    }

    #[test]
    fn rejects_non_positive_edge_length() {
        let err = RiverConfig::from_json_str(r#"{ "neighbors": { "max_edge_length": 0.0 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = RiverConfig::from_json_str("{ seed: }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = RiverConfig::from_file(Path::new("/nonexistent/rivergraph.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rivergraph.json"));
    }

    #[test]
    fn boundary_predicate_is_inclusive() {
        let b = BoundaryConfig::default();
        assert!(b.contains(0.0, 0.5));
        assert!(b.contains(0.5, 1.0));
        assert!(!b.contains(0.5, 0.5));
        assert!(b.contains(-0.1, 0.5));
    }
}
