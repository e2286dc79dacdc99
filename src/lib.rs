/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API and high-level documentation for RBF interpolation models.
//
// Created on: 22 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Radial Basis Function (RBF) interpolation models.
//!
//! An RBF model interpolates data sites `x¹, …, x^N ⊂ ℝⁿ` with values in
//! `ℝᵏ` by a sum of shifted radial kernels plus a low-degree polynomial tail:
//!
//! ```text
//! r(x) = Σᵢ wᵢ φ(|x - xⁱ|₂) + p(x)
//! ```
//!
//! The kernel weights and polynomial coefficients are determined together by
//! a dense augmented linear system; for conditionally positive definite
//! kernels the polynomial tail is what makes that system uniquely solvable.
//! The required tail degree follows from the kernel's CPD order and the
//! requested degree is capped accordingly at construction.
//!
//! # Features
//! - Five kernel families (Gaussian, multiquadric, inverse multiquadric,
//!   generalised cubic, thin plate spline) with validated shape parameters
//! - Arbitrary input and output dimensions, with scalar and vector data
//!   treated uniformly
//! - Analytic gradients, Jacobians, and Hessians of the fitted interpolant
//! - A process-wide cache of canonical polynomial bases shared across models
//! - Built on [`faer`](https://docs.rs/faer/latest/faer/) for linear algebra,
//!   avoiding complex build dependencies
//!
//! # Examples
//!
//! ```
//! use ferreus_rbf_models::{RbfModel, RadialKernel, ModelSettings, RbfError};
//! use faer::mat;
//!
//! // Samples of y = x^2 at three sites on the line.
//! let sites = mat![[0.0], [1.0], [2.0]];
//! let values = mat![[0.0], [1.0], [4.0]];
//!
//! let model = RbfModel::builder(sites, values, ModelSettings::default())
//!     .kernel(RadialKernel::thin_plate_spline(1)?)
//!     .build()?;
//!
//! // The model reproduces the data at the sites.
//! assert!((model.evaluate(&[1.0])[0] - 1.0).abs() < 1e-10);
//!
//! // Between the sites it gives a smooth interpolated value.
//! let mid = model.evaluate(&[0.5]);
//! assert!(mid[0].is_finite());
//! # Ok::<(), RbfError>(())
//! ```
pub mod config;

mod common;

mod derivatives;

mod errors;

mod kernels;

mod linalg;

mod model;

mod polynomials;

mod solver;

pub use {
    common::generate_random_points,
    config::{ArrayStrategy, ModelSettings, ModelSettingsBuilder},
    errors::RbfError,
    kernels::{distances, get_distance, RadialKernel, ShiftedKernel, KERNEL_NAMES},
    model::{RbfModel, RbfModelBuilder},
    polynomials::{
        basis_dimension, canonical_basis, non_negative_solutions, PolyBasis, Polynomial,
    },
};
