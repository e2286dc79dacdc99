/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the radial kernel catalogue, shifted kernels, and the distance layer.
//
// Created on: 22 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Radial kernel functions `phi(r)`, their conditional positive definiteness
//! orders, and their radial derivatives.

use crate::errors::RbfError;
use faer::{MatRef, Row, RowRef};
use serde::{Deserialize, Serialize};

/// Recognised kernel identifiers for [`RadialKernel::from_name`].
pub const KERNEL_NAMES: [&str; 5] = [
    "gaussian",
    "multiquadric",
    "inv_multiquadric",
    "cubic",
    "thin_plate_spline",
];

/// The catalogue of implemented radial functions.
///
/// Each variant carries its shape parameters, which are validated once by the
/// constructors below and immutable afterwards:
///
/// | variant                    | `phi(r)`                          | CPD order |
/// |----------------------------|-----------------------------------|-----------|
/// | `Gaussian(α)`              | `exp(-(αr)²)`                     | 0         |
/// | `Multiquadric(α, β)`       | `(-1)^⌈β⌉ (1 + (αr)²)^β`          | `⌈β⌉`     |
/// | `InverseMultiquadric(α, β)`| `(1 + (αr)²)^(-β)`                | 0         |
/// | `Cubic(β)`                 | `(-1)^⌈β/2⌉ r^β`                  | `⌈β/2⌉`   |
/// | `ThinPlateSpline(k)`       | `(-1)^(k+1) r^(2k) log r`         | `k + 1`   |
///
/// The CPD order bounds the polynomial tail required for the augmented
/// interpolation system to be solvable: a kernel of CPD order `D` needs a
/// polynomial of degree `D - 1` added to the model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum RadialKernel {
    Gaussian { alpha: f64 },
    Multiquadric { alpha: f64, beta: f64 },
    InverseMultiquadric { alpha: f64, beta: f64 },
    Cubic { beta: f64 },
    ThinPlateSpline { k: u32 },
}

/// `(-1)^m` as a floating point factor.
#[inline(always)]
fn alt_sign(m: i64) -> f64 {
    if m % 2 == 0 { 1.0 } else { -1.0 }
}

impl RadialKernel {
    /// Gaussian kernel `phi(r) = exp(-(αr)²)` with shape parameter `α > 0`.
    pub fn gaussian(alpha: f64) -> Result<Self, RbfError> {
        if !(alpha > 0.0) {
            return Err(RbfError::parameter(
                "gaussian",
                format!("the shape parameter α must be positive, got {alpha}"),
            ));
        }
        Ok(RadialKernel::Gaussian { alpha })
    }

    /// Generalised multiquadric `phi(r) = (-1)^⌈β⌉ (1 + (αr)²)^β`.
    ///
    /// Requires `α > 0` and a positive, non-integer exponent `β`.
    pub fn multiquadric(alpha: f64, beta: f64) -> Result<Self, RbfError> {
        if !(alpha > 0.0) {
            return Err(RbfError::parameter(
                "multiquadric",
                format!("the shape parameter α must be positive, got {alpha}"),
            ));
        }
        if !(beta > 0.0) {
            return Err(RbfError::parameter(
                "multiquadric",
                format!("the exponent β must be positive, got {beta}"),
            ));
        }
        if beta.fract() == 0.0 {
            return Err(RbfError::parameter(
                "multiquadric",
                format!("the exponent β must not be an integer, got {beta}"),
            ));
        }
        Ok(RadialKernel::Multiquadric { alpha, beta })
    }

    /// Inverse multiquadric `phi(r) = (1 + (αr)²)^(-β)` with `α > 0`, `β > 0`.
    pub fn inverse_multiquadric(alpha: f64, beta: f64) -> Result<Self, RbfError> {
        if !(alpha > 0.0) {
            return Err(RbfError::parameter(
                "inv_multiquadric",
                format!("the shape parameter α must be positive, got {alpha}"),
            ));
        }
        if !(beta > 0.0) {
            return Err(RbfError::parameter(
                "inv_multiquadric",
                format!("the exponent β must be positive, got {beta}"),
            ));
        }
        Ok(RadialKernel::InverseMultiquadric { alpha, beta })
    }

    /// Generalised cubic `phi(r) = (-1)^⌈β/2⌉ r^β`.
    ///
    /// Requires a positive exponent `β` that is not an even integer. The
    /// classic cubic is `β = 3`.
    pub fn cubic(beta: f64) -> Result<Self, RbfError> {
        if !(beta > 0.0) {
            return Err(RbfError::parameter(
                "cubic",
                format!("the exponent β must be positive, got {beta}"),
            ));
        }
        if beta.fract() == 0.0 && (beta as i64) % 2 == 0 {
            return Err(RbfError::parameter(
                "cubic",
                format!("the exponent β must not be an even integer, got {beta}"),
            ));
        }
        Ok(RadialKernel::Cubic { beta })
    }

    /// Generalised thin plate spline `phi(r) = (-1)^(k+1) r^(2k) log r` with a
    /// positive integer order `k`. The classic surface spline is `k = 1`.
    ///
    /// `phi(0)` is defined as `0`, matching the limit `r^(2k) log r -> 0`.
    pub fn thin_plate_spline(k: u32) -> Result<Self, RbfError> {
        if k == 0 {
            return Err(RbfError::parameter(
                "thin_plate_spline",
                "the order k must be a positive integer, got 0",
            ));
        }
        Ok(RadialKernel::ThinPlateSpline { k })
    }

    /// Looks up a kernel constructor by identifier and applies the optional
    /// shape parameter arguments (missing arguments take the defaults
    /// `α = 1`, `β = 1/2`, `β = 3`, `k = 2` per kernel kind).
    ///
    /// Unknown identifiers are not fatal: a warning is logged and the default
    /// Gaussian is substituted.
    pub fn from_name(name: &str, args: Option<&[f64]>) -> Result<Self, RbfError> {
        let args = args.unwrap_or(&[]);
        let arg = |i: usize, default: f64| args.get(i).copied().unwrap_or(default);

        match name.to_ascii_lowercase().as_str() {
            "gaussian" => Self::gaussian(arg(0, 1.0)),
            "multiquadric" => Self::multiquadric(arg(0, 1.0), arg(1, 0.5)),
            "inv_multiquadric" => Self::inverse_multiquadric(arg(0, 1.0), arg(1, 0.5)),
            "cubic" => Self::cubic(arg(0, 3.0)),
            "thin_plate_spline" => {
                let k = arg(0, 2.0);
                if k < 1.0 || k.fract() != 0.0 {
                    return Err(RbfError::parameter(
                        "thin_plate_spline",
                        format!("the order k must be a positive integer, got {k}"),
                    ));
                }
                Self::thin_plate_spline(k as u32)
            }
            unknown => {
                log::warn!("radial function {unknown:?} not known, using gaussian");
                Self::gaussian(arg(0, 1.0))
            }
        }
    }

    /// Returns the identifier of this kernel in the [`KERNEL_NAMES`] table.
    pub fn name(&self) -> &'static str {
        match self {
            RadialKernel::Gaussian { .. } => "gaussian",
            RadialKernel::Multiquadric { .. } => "multiquadric",
            RadialKernel::InverseMultiquadric { .. } => "inv_multiquadric",
            RadialKernel::Cubic { .. } => "cubic",
            RadialKernel::ThinPlateSpline { .. } => "thin_plate_spline",
        }
    }

    /// Evaluates the radial function at distance `rho >= 0`.
    #[inline(always)]
    pub fn phi(&self, rho: f64) -> f64 {
        match *self {
            RadialKernel::Gaussian { alpha } => (-(alpha * rho).powi(2)).exp(),
            RadialKernel::Multiquadric { alpha, beta } => {
                alt_sign(beta.ceil() as i64) * (1.0 + (alpha * rho).powi(2)).powf(beta)
            }
            RadialKernel::InverseMultiquadric { alpha, beta } => {
                (1.0 + (alpha * rho).powi(2)).powf(-beta)
            }
            RadialKernel::Cubic { beta } => alt_sign((beta / 2.0).ceil() as i64) * rho.powf(beta),
            RadialKernel::ThinPlateSpline { k } => match rho.abs() < f64::EPSILON {
                true => 0.0,
                false => alt_sign(k as i64 + 1) * rho.powi(2 * k as i32) * rho.ln(),
            },
        }
    }

    /// The conditional positive definiteness order of this kernel.
    ///
    /// A polynomial tail of degree `cpd_order() - 1` must be added to the
    /// interpolation system; order-0 kernels need no tail at all.
    #[inline(always)]
    pub fn cpd_order(&self) -> u32 {
        match *self {
            RadialKernel::Gaussian { .. } => 0,
            RadialKernel::Multiquadric { beta, .. } => beta.ceil() as u32,
            RadialKernel::InverseMultiquadric { .. } => 0,
            RadialKernel::Cubic { beta } => (beta / 2.0).ceil() as u32,
            RadialKernel::ThinPlateSpline { k } => k + 1,
        }
    }

    /// First radial derivative `phi'(rho)`.
    ///
    /// For every admissible kernel `phi'(0) = 0`, which keeps the factor
    /// `phi'(rho) / rho` in the model gradient bounded near a center.
    #[inline(always)]
    pub fn phi_deriv(&self, rho: f64) -> f64 {
        match *self {
            RadialKernel::Gaussian { alpha } => {
                let u = alpha * alpha;
                -2.0 * u * rho * (-u * rho * rho).exp()
            }
            RadialKernel::Multiquadric { alpha, beta } => {
                let u = alpha * alpha;
                let t = 1.0 + u * rho * rho;
                alt_sign(beta.ceil() as i64) * 2.0 * u * beta * rho * t.powf(beta - 1.0)
            }
            RadialKernel::InverseMultiquadric { alpha, beta } => {
                let u = alpha * alpha;
                let t = 1.0 + u * rho * rho;
                -2.0 * u * beta * rho * t.powf(-beta - 1.0)
            }
            RadialKernel::Cubic { beta } => {
                alt_sign((beta / 2.0).ceil() as i64) * beta * rho.powf(beta - 1.0)
            }
            RadialKernel::ThinPlateSpline { k } => match rho.abs() < f64::EPSILON {
                true => 0.0,
                false => {
                    let k = k as f64;
                    alt_sign(k as i64 + 1)
                        * rho.powf(2.0 * k - 1.0)
                        * (2.0 * k * rho.ln() + 1.0)
                }
            },
        }
    }

    /// Second radial derivative `phi''(rho)`.
    ///
    /// `phi_deriv2(0.0)` returns the analytic limit used by the Hessian at a
    /// kernel center. For the thin plate spline this limit is only finite for
    /// `k >= 2`; the `k = 1` spline is not twice differentiable at its center
    /// and the logarithmic convention value `0` is returned there.
    #[inline(always)]
    pub fn phi_deriv2(&self, rho: f64) -> f64 {
        match *self {
            RadialKernel::Gaussian { alpha } => {
                let u = alpha * alpha;
                (4.0 * u * u * rho * rho - 2.0 * u) * (-u * rho * rho).exp()
            }
            RadialKernel::Multiquadric { alpha, beta } => {
                let u = alpha * alpha;
                let t = 1.0 + u * rho * rho;
                alt_sign(beta.ceil() as i64)
                    * 2.0
                    * u
                    * beta
                    * t.powf(beta - 2.0)
                    * (t + 2.0 * u * rho * rho * (beta - 1.0))
            }
            RadialKernel::InverseMultiquadric { alpha, beta } => {
                let u = alpha * alpha;
                let t = 1.0 + u * rho * rho;
                -2.0 * u * beta * t.powf(-beta - 2.0) * (t - 2.0 * u * rho * rho * (beta + 1.0))
            }
            RadialKernel::Cubic { beta } => {
                alt_sign((beta / 2.0).ceil() as i64) * beta * (beta - 1.0) * rho.powf(beta - 2.0)
            }
            RadialKernel::ThinPlateSpline { k } => match rho.abs() < f64::EPSILON {
                true => 0.0,
                false => {
                    let k = k as f64;
                    alt_sign(k as i64 + 1)
                        * rho.powf(2.0 * k - 2.0)
                        * (2.0 * k * (2.0 * k - 1.0) * rho.ln() + 4.0 * k - 1.0)
                }
            },
        }
    }
}

/// A radial kernel bound to one fixed center point, evaluated as
/// `phi(|x - center|₂)`.
#[derive(Clone, Debug)]
pub struct ShiftedKernel {
    pub phi: RadialKernel,
    pub center: Row<f64>,
}

impl ShiftedKernel {
    pub fn new(phi: RadialKernel, center: Row<f64>) -> Self {
        Self { phi, center }
    }

    /// Evaluates the kernel at the point `x`.
    #[inline(always)]
    pub fn evaluate(&self, x: RowRef<'_, f64>) -> f64 {
        self.phi.phi(get_distance(x, self.center.as_ref()))
    }
}

/// Calculates the euclidean distance between two points.
#[inline(always)]
pub fn get_distance(target: RowRef<'_, f64>, source: RowRef<'_, f64>) -> f64 {
    let mut dist = 0.0;
    for (t, s) in target.iter().zip(source.iter()) {
        let diff = t - s;
        dist += diff * diff;
    }
    dist.sqrt()
}

/// Returns the euclidean distance from `x` to every kernel center.
///
/// Pure function with no side effects; safe to call concurrently from
/// multiple evaluations.
#[inline(always)]
pub fn distances(x: RowRef<'_, f64>, kernels: &[ShiftedKernel]) -> Vec<f64> {
    kernels
        .iter()
        .map(|kernel| get_distance(x, kernel.center.as_ref()))
        .collect()
}

/// Views a coordinate slice as a single-row matrix for row-based kernel
/// evaluation.
#[inline(always)]
pub(crate) fn as_point_row(x: &[f64]) -> MatRef<'_, f64> {
    MatRef::from_row_major_slice(x, 1, x.len())
}
