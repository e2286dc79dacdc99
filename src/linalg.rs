/////////////////////////////////////////////////////////////////////////////////////////////
//
// Wraps the dense linear solve used for the augmented interpolation system.
//
// Created on: 22 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::errors::RbfError;
use faer::linalg::solvers::Solve;
use faer::Mat;

/// Largest absolute entry of a matrix, `0` for an empty one.
fn max_abs(m: &Mat<f64>) -> f64 {
    let mut value: f64 = 0.0;
    for j in 0..m.ncols() {
        for i in 0..m.nrows() {
            value = value.max(m[(i, j)].abs());
        }
    }
    value
}

/// Solves the dense system `A X = B` with a full pivoting LU factorisation.
///
/// The saddle-point matrices assembled for conditionally positive definite
/// kernels are symmetric but indefinite, so full pivoting is used rather than
/// a Cholesky method. A residual check after the solve classifies singular or
/// numerically unstable systems: those report [`RbfError::SingularSystem`]
/// and are fatal to model construction, never retried.
pub(crate) fn solve_dense(a: &Mat<f64>, b: &Mat<f64>) -> Result<Mat<f64>, RbfError> {
    assert_eq!(a.nrows(), a.ncols(), "system matrix must be square");
    assert_eq!(a.nrows(), b.nrows(), "right-hand side rows must match");

    let lu = a.full_piv_lu();
    let x = lu.solve(b);

    // |A X - B| measured against the magnitudes involved in forming it.
    let product = a * &x;
    let mut residual: f64 = 0.0;
    for j in 0..b.ncols() {
        for i in 0..b.nrows() {
            residual = residual.max((product[(i, j)] - b[(i, j)]).abs());
        }
    }

    let scale = 1.0 + max_abs(a) * max_abs(&x) + max_abs(b);
    if !residual.is_finite() || residual > f64::EPSILON.sqrt() * scale {
        return Err(RbfError::SingularSystem { size: a.nrows() });
    }

    Ok(x)
}
