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

use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use rivergraph::config::RiverConfig;
use rivergraph::pipeline::{self, Request, Response};

#[derive(Parser, Debug)]
#[command(name = "rivergraph")]
#[command(about = "Generate a river flow network over a random triangulated point set")]
struct Args {
    /// Number of random interior points
    #[arg(short, long, default_value = "10000")]
    points: usize,

    /// Random seed; overrides the config file
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read a start request from stdin instead of using --points/--seed
    #[arg(long)]
    stdin: bool,

    /// Pretty-print each JSON message
    #[arg(long)]
    pretty: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => RiverConfig::from_file(path)?,
        None => RiverConfig::default(),
    };

    let request = if args.stdin {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        serde_json::from_str::<Request>(&input)?
    } else {
        Request::Start {
            point_count: args.points,
            seed: args.seed,
        }
    };
    info!(?request, "starting worker");

    let worker = pipeline::spawn(request, config)?;
    let mut out = BufWriter::new(io::stdout().lock());
    let mut write_failed = None;
    let terminal = worker.finish(|message| {
        if write_failed.is_some() {
            return;
        }
        let written = if args.pretty {
            serde_json::to_writer_pretty(&mut out, message)
        } else {
            serde_json::to_writer(&mut out, message)
        };
        if let Err(err) = written
            .map_err(io::Error::from)
            .and_then(|()| writeln!(out))
            .and_then(|()| out.flush())
        {
            write_failed = Some(err);
        }
    })?;
    if let Some(err) = write_failed {
        return Err(err.into());
    }

    Ok(match terminal {
        Response::Error { .. } => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}
