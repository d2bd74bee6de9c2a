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

//! Background execution of a request.
//!
//! The worker owns its whole run. The host reads [`Response`]s from a channel
//! and may cancel at any time; dropping an unfinished [`Worker`] cancels it.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use tracing::warn;

use crate::cancel::CancelToken;
use crate::config::RiverConfig;
use crate::pipeline::messages::{Request, Response};
use crate::pipeline::{PipelineError, run_request};
use crate::sampling::{NoiseElevation, UniformSampler};

pub struct Worker {
    receiver: Receiver<Response>,
    cancel: CancelToken,
    handle: Option<JoinHandle<()>>,
}

/// Starts `request` on a dedicated thread with the default sampler and
/// noise field.
pub fn spawn(request: Request, config: RiverConfig) -> Result<Worker, PipelineError> {
    let (sender, receiver) = crossbeam_channel::unbounded();
    let cancel = CancelToken::new();
    let token = cancel.clone();
    let handle = thread::Builder::new()
        .name("rivergraph-worker".to_string())
        .spawn(move || serve(&request, &config, &sender, &token))
        .map_err(PipelineError::Spawn)?;

    Ok(Worker {
        receiver,
        cancel,
        handle: Some(handle),
    })
}

/// Runs `request` on the current thread, sending progress and then exactly
/// one terminal message to `sender`.
pub fn serve(
    request: &Request,
    config: &RiverConfig,
    sender: &Sender<Response>,
    cancel: &CancelToken,
) {
    let Request::Start { seed, .. } = request;
    let sampler = UniformSampler::new(config.sampler.border_points_per_side);
    let field = NoiseElevation::new(seed.unwrap_or(config.seed), &config.elevation);

    // a disconnected host has abandoned the run; nothing left to report to
    let mut progress = |message: String| {
        let _ = sender.send(Response::Progress { message });
    };
    let terminal = match run_request(request, config, &sampler, &field, &mut progress, cancel) {
        Ok(network) => network.to_response(),
        Err(err) => {
            warn!(%err, "generation failed");
            Response::error(err.to_string())
        }
    };
    let _ = sender.send(terminal);
}

impl Worker {
    pub fn receiver(&self) -> &Receiver<Response> {
        &self.receiver
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Forwards every message to `on_message` until the terminal one, joins
    /// the thread and returns the terminal message.
    pub fn finish(
        mut self,
        mut on_message: impl FnMut(&Response),
    ) -> Result<Response, PipelineError> {
        let mut terminal = None;
        for message in self.receiver.iter() {
            on_message(&message);
            if message.is_terminal() {
                terminal = Some(message);
                break;
            }
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                return Err(PipelineError::WorkerPanicked);
            }
        }
        terminal.ok_or(PipelineError::WorkerPanicked)
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_run_ends_with_result() {
        let config = RiverConfig::default();
        let worker = spawn(
            Request::Start {
                point_count: 40,
                seed: Some(2),
            },
            config.clone(),
        )
        .unwrap();
        let mut seen = 0;
        let terminal = worker.finish(|_| seen += 1).unwrap();
        assert!(seen >= 1);
        match terminal {
            Response::Result { edges, points } => {
                assert_eq!(points.len(), 40 + 4 * config.sampler.border_points_per_side);
                assert!(edges.windows(2).all(|w| w[0].source < w[1].source));
            }
            other => panic!("expected result, got {other:?}"),
        }
    }

    #[test]
    fn cancelled_run_reports_error() {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let cancel = CancelToken::new();
        cancel.cancel();
        serve(
            &Request::Start {
                point_count: 10,
                seed: None,
            },
            &RiverConfig::default(),
            &sender,
            &cancel,
        );
        drop(sender);
        let messages: Vec<Response> = receiver.iter().collect();
        assert_eq!(messages, vec![Response::error("generation was cancelled")]);
    }

    #[test]
    fn zero_point_request_reports_error() {
        let worker = spawn(
            Request::Start {
                point_count: 0,
                seed: None,
            },
            RiverConfig::default(),
        )
        .unwrap();
        let terminal = worker.finish(|_| {}).unwrap();
        assert!(matches!(terminal, Response::Error { .. }));
    }
}
