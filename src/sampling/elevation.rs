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

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::config::ElevationConfig;
use crate::geometry::Point2;

/// Scalar elevation field over the plane. Any `Fn(f64, f64) -> f64` is one.
pub trait ElevationProvider {
    fn elevation_at(&self, x: f64, y: f64) -> f64;
}

impl<F: Fn(f64, f64) -> f64> ElevationProvider for F {
    fn elevation_at(&self, x: f64, y: f64) -> f64 {
        self(x, y)
    }
}

/// Fractal Perlin noise clamped to `[-1, 1]`.
pub struct NoiseElevation {
    fbm: Fbm<Perlin>,
}

impl NoiseElevation {
    pub fn new(seed: u64, config: &ElevationConfig) -> Self {
        let fbm = Fbm::<Perlin>::new(seed as u32)
            .set_octaves(config.octaves)
            .set_frequency(config.frequency)
            .set_lacunarity(config.lacunarity)
            .set_persistence(config.persistence);
        Self { fbm }
    }
}

impl ElevationProvider for NoiseElevation {
    fn elevation_at(&self, x: f64, y: f64) -> f64 {
        self.fbm.get([x, y]).clamp(-1.0, 1.0)
    }
}

pub fn sample_elevations(points: &[Point2], field: &dyn ElevationProvider) -> Vec<f64> {
    points.iter().map(|p| field.elevation_at(p.x, p.y)).collect()
}
