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

use crate::geometry::Point2;
use crate::hydrology::FlowEdgeRecord;

/// Host request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Request {
    Start {
        #[serde(rename = "pointCount")]
        point_count: usize,
        /// Overrides the configured seed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u64>,
    },
}

/// Worker message. Every run ends with exactly one `Result` or `Error`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Response {
    Progress {
        message: String,
    },
    Result {
        edges: Vec<FlowEdgeRecord>,
        points: Vec<Point2>,
    },
    Error {
        message: String,
    },
}

impl Response {
    pub fn progress(message: impl Into<String>) -> Self {
        Response::Progress {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Response::Progress { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn start_request_wire_shape() {
        let req: Request = serde_json::from_str(r#"{"command":"start","pointCount":500}"#).unwrap();
        assert_eq!(
            req,
            Request::Start {
                point_count: 500,
                seed: None
            }
        );

        let with_seed: Request =
            serde_json::from_value(json!({"command": "start", "pointCount": 3, "seed": 11}))
                .unwrap();
        assert_eq!(
            with_seed,
            Request::Start {
                point_count: 3,
                seed: Some(11)
            }
        );
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(serde_json::from_str::<Request>(r#"{"command":"stop"}"#).is_err());
    }

    #[test]
    fn result_wire_shape() {
        let msg = Response::Result {
            edges: vec![FlowEdgeRecord {
                source: 0,
                target: 1,
                weight: 2.0,
            }],
            points: vec![Point2::new(0.25, 0.5), Point2::new(1.0, 0.0)],
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "type": "result",
                "edges": [{"source": 0, "target": 1, "weight": 2.0}],
                "points": [[0.25, 0.5], [1.0, 0.0]],
            })
        );
        assert!(msg.is_terminal());
    }

    #[test]
    fn progress_and_error_wire_shape() {
        assert_eq!(
            serde_json::to_value(Response::progress("Processed 1000/5000 nodes")).unwrap(),
            json!({"type": "progress", "message": "Processed 1000/5000 nodes"})
        );
        let err = Response::error("bad");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"type": "error", "message": "bad"})
        );
        assert!(err.is_terminal());
        assert!(!Response::progress("x").is_terminal());
    }
}
