/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the error type reported during kernel and model construction.
//
// Created on: 22 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use std::error::Error;
use std::fmt;

/// Errors that can occur while constructing a radial kernel or an RBF model.
///
/// All failures are detected synchronously during construction. Evaluating a
/// successfully built model raises no domain errors; the zero-distance cases of
/// the derivative formulas are handled analytically instead of via errors.
#[derive(Debug)]
pub enum RbfError {
    /// An invalid kernel shape parameter (non-positive, wrong parity or
    /// integrality). Raised by the kernel constructors, never at evaluation.
    Parameter {
        kernel: &'static str,
        message: String,
    },

    /// Site/value count mismatch, inconsistent per-item dimension, or a
    /// per-site kernel list whose length does not match the site count.
    DimensionMismatch { message: String },

    /// The augmented interpolation system could not be solved. Fatal to the
    /// construction attempt; the caller may retry with a different kernel or
    /// polynomial degree.
    SingularSystem { size: usize },
}

impl RbfError {
    pub(crate) fn parameter(kernel: &'static str, message: impl Into<String>) -> Self {
        RbfError::Parameter {
            kernel,
            message: message.into(),
        }
    }

    pub(crate) fn dimensions(message: impl Into<String>) -> Self {
        RbfError::DimensionMismatch {
            message: message.into(),
        }
    }
}

impl fmt::Display for RbfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RbfError::Parameter { kernel, message } => {
                write!(f, "invalid parameter for {} kernel: {}", kernel, message)
            }
            RbfError::DimensionMismatch { message } => {
                write!(f, "dimension mismatch: {}", message)
            }
            RbfError::SingularSystem { size } => write!(
                f,
                "the {size} x {size} interpolation system is singular or too ill-conditioned to solve"
            ),
        }
    }
}

impl Error for RbfError {}
