/////////////////////////////////////////////////////////////////////////////////////////////
//
// Specifies construction options for RBF interpolation models.
//
// Created on: 22 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Construction options for RBF interpolation models.

use serde::{Deserialize, Serialize};

/// Storage strategy hint for the model's evaluation buffers.
///
/// This is a performance hint with no effect on results. `Auto` resolves at
/// construction time: small problems (at most 10 input and 10 output
/// dimensions) resolve to `Static`, everything else to `Dynamic`. The
/// resolved value is recorded on the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrayStrategy {
    Auto,
    Static,
    Dynamic,
}

impl ArrayStrategy {
    /// Resolves `Auto` against the model dimensions.
    pub(crate) fn resolve(self, num_vars: usize, num_outputs: usize) -> ArrayStrategy {
        match self {
            ArrayStrategy::Auto => match num_vars <= 10 && num_outputs <= 10 {
                true => ArrayStrategy::Static,
                false => ArrayStrategy::Dynamic,
            },
            other => other,
        }
    }
}

/// A convenience builder for constructing a [`ModelSettings`] instance.
///
/// The builder should be called via the [`ModelSettings::builder`] method.
#[derive(Debug, Clone, Copy)]
pub struct ModelSettingsBuilder {
    poly_degree: i32,
    array_strategy: ArrayStrategy,
    vector_output: bool,
}

impl ModelSettingsBuilder {
    fn new() -> Self {
        Self {
            poly_degree: 1,
            array_strategy: ArrayStrategy::Auto,
            vector_output: true,
        }
    }

    /// Sets the requested degree of the polynomial tail.
    ///
    /// The working degree is capped to `cpd_order - 1` for the chosen kernel
    /// during construction; it is never raised.
    pub fn poly_degree(mut self, poly_degree: i32) -> Self {
        self.poly_degree = poly_degree;
        self
    }

    /// Sets the array storage hint.
    pub fn array_strategy(mut self, array_strategy: ArrayStrategy) -> Self {
        self.array_strategy = array_strategy;
        self
    }

    /// Chooses between vector and scalar return for single-output models.
    ///
    /// Ignored when the value dimension is greater than one.
    pub fn vector_output(mut self, vector_output: bool) -> Self {
        self.vector_output = vector_output;
        self
    }

    /// Builds and returns a [`ModelSettings`] instance.
    pub fn build(self) -> ModelSettings {
        ModelSettings {
            poly_degree: self.poly_degree,
            array_strategy: self.array_strategy,
            vector_output: self.vector_output,
        }
    }
}

/// Options controlling RBF model construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Requested degree of the polynomial tail added to the RBF sum. Capped
    /// during construction by the kernel's CPD order; `-1` drops the tail.
    pub poly_degree: i32,

    /// Storage strategy hint, see [`ArrayStrategy`].
    pub array_strategy: ArrayStrategy,

    /// Whether single-output models return length-1 vectors (`true`) or are
    /// flagged for scalar use (`false`). No effect for multi-output models.
    pub vector_output: bool,
}

impl ModelSettings {
    /// Returns a new [`ModelSettingsBuilder`] with the default settings.
    pub fn builder() -> ModelSettingsBuilder {
        ModelSettingsBuilder::new()
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        ModelSettings::builder().build()
    }
}
