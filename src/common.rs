/////////////////////////////////////////////////////////////////////////////////////////////
//
// Shared helpers for generating sample data.
//
// Created on: 22 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::Mat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generates `n` uniform random points in the `dim`-dimensional unit cube,
/// one point per row. A seed makes the sample reproducible; `None` draws
/// fresh entropy from the operating system.
pub fn generate_random_points(n: usize, dim: usize, seed: Option<u64>) -> Mat<f64> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    Mat::from_fn(n, dim, |_, _| rng.random_range(0.0..1.0))
}
