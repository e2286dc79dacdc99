/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the RBF model, its two output evaluators, and the construction logic.
//
// Created on: 22 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! The interpolating RBF model
//!
//! An interpolating model for sites `x¹ … x^N` in `ℝⁿ` and values in `ℝᵏ` has
//! the form
//!
//! ```text
//! r(x) = Σᵢ wᵢ φ(|x - xⁱ|₂) + p(x)
//! ```
//!
//! where `p` is a multivariate polynomial tail whose degree is dictated by the
//! conditional positive definiteness order of `φ`. The model is split into a
//! kernel-sum evaluator and a polynomial evaluator that share the same
//! vector/scalar selection contract; evaluation sums both parts element-wise.

use crate::config::{ArrayStrategy, ModelSettings};
use crate::errors::RbfError;
use crate::kernels::{as_point_row, distances, RadialKernel, ShiftedKernel};
use crate::polynomials::{canonical_basis, Polynomial};
use crate::solver;
use faer::{Mat, Row, RowRef};

/// The kernel-sum part of a model: `N` shifted kernels and the `N x k` weight
/// matrix solved for them.
#[derive(Debug)]
pub(crate) struct RbfSystem {
    pub(crate) kernels: Vec<ShiftedKernel>,
    pub(crate) weights: Mat<f64>,
}

impl RbfSystem {
    /// Kernel responses `[φ₁(ρ₁) … φₙ(ρₙ)]` at the distances from `x` to the
    /// centers.
    fn kernel_vector(&self, x: RowRef<'_, f64>) -> Vec<f64> {
        let rho = distances(x, &self.kernels);
        self.kernels
            .iter()
            .zip(rho)
            .map(|(kernel, r)| kernel.phi.phi(r))
            .collect()
    }

    /// All outputs of the kernel sum at `x`.
    fn evaluate(&self, x: RowRef<'_, f64>) -> Vec<f64> {
        let phi_vals = self.kernel_vector(x);
        (0..self.weights.ncols())
            .map(|l| {
                phi_vals
                    .iter()
                    .enumerate()
                    .map(|(i, phi)| phi * self.weights[(i, l)])
                    .sum()
            })
            .collect()
    }

    /// A single output of the kernel sum at `x`.
    fn evaluate_output(&self, x: RowRef<'_, f64>, output: usize) -> f64 {
        self.kernel_vector(x)
            .iter()
            .enumerate()
            .map(|(i, phi)| phi * self.weights[(i, output)])
            .sum()
    }
}

/// The polynomial tail part of a model: one polynomial per output, all sharing
/// the same cached canonical basis.
#[derive(Debug)]
pub(crate) struct PolySystem {
    pub(crate) polys: Vec<Polynomial>,
}

impl PolySystem {
    fn evaluate(&self, x: &[f64]) -> Vec<f64> {
        self.polys.iter().map(|p| p.evaluate(x)).collect()
    }

    fn evaluate_output(&self, x: &[f64], output: usize) -> f64 {
        self.polys[output].evaluate(x)
    }
}

/// How the radial function is assigned to the data sites: one kernel
/// broadcast to every site, or one kernel per site.
#[derive(Debug, Clone)]
enum KernelChoice {
    Broadcast(RadialKernel),
    PerSite(Vec<RadialKernel>),
}

/// Convenience builder for constructing an [`RbfModel`].
///
/// The builder should be called via the [`RbfModel::builder`] method. The
/// radial function defaults to the unit-width Gaussian when none is chosen.
pub struct RbfModelBuilder {
    sites: Mat<f64>,
    values: Mat<f64>,
    settings: ModelSettings,
    kernel: KernelChoice,
}

impl RbfModelBuilder {
    fn new(sites: Mat<f64>, values: Mat<f64>, settings: ModelSettings) -> Self {
        Self {
            sites,
            values,
            settings,
            kernel: KernelChoice::Broadcast(RadialKernel::Gaussian { alpha: 1.0 }),
        }
    }

    /// Broadcasts a single radial function to all sites.
    pub fn kernel(mut self, phi: RadialKernel) -> Self {
        self.kernel = KernelChoice::Broadcast(phi);
        self
    }

    /// Pairs one radial function with each site; the list length must equal
    /// the site count when the model is built.
    pub fn kernels(mut self, phis: Vec<RadialKernel>) -> Self {
        self.kernel = KernelChoice::PerSite(phis);
        self
    }

    /// Selects the radial function by identifier with optional shape
    /// parameter arguments, see [`RadialKernel::from_name`]. Unknown
    /// identifiers substitute the default Gaussian with a logged warning;
    /// invalid shape parameters fail here.
    pub fn kernel_name(self, name: &str, args: Option<&[f64]>) -> Result<Self, RbfError> {
        let phi = RadialKernel::from_name(name, args)?;
        Ok(self.kernel(phi))
    }

    /// Builds the interpolating model: validates the data, caps the
    /// polynomial degree, solves the augmented system, and assembles the two
    /// evaluators.
    pub fn build(self) -> Result<RbfModel, RbfError> {
        RbfModel::new(self.sites, self.values, self.settings, self.kernel)
    }
}

/// An immutable interpolating RBF model.
///
/// Built via [`RbfModel::builder`]; for every data site `i` the model
/// satisfies `evaluate(site_i) == value_i` up to the accuracy of the dense
/// solve. Once constructed the model holds no mutable state, so concurrent
/// evaluation and derivative calls from multiple threads need no locking.
#[derive(Debug)]
pub struct RbfModel {
    pub(crate) rbf_sys: RbfSystem,
    pub(crate) poly_sys: PolySystem,

    num_vars: usize,
    num_outputs: usize,
    num_centers: usize,

    poly_degree: i32,
    num_poly_terms: usize,
    array_strategy: ArrayStrategy,
    scalar_output: bool,
}

impl RbfModel {
    /// Creates a new [`RbfModelBuilder`] for the given data.
    ///
    /// `sites` is `N x n` (one row per data site), `values` is `N x k` (one
    /// row of output values per site). This is the way to construct a model.
    pub fn builder(sites: Mat<f64>, values: Mat<f64>, settings: ModelSettings) -> RbfModelBuilder {
        RbfModelBuilder::new(sites, values, settings)
    }

    fn new(
        sites: Mat<f64>,
        values: Mat<f64>,
        settings: ModelSettings,
        kernel: KernelChoice,
    ) -> Result<Self, RbfError> {
        let num_centers = sites.nrows();
        let num_vars = sites.ncols();
        let num_outputs = values.ncols();

        if num_centers == 0 {
            return Err(RbfError::dimensions("provide at least 1 data site"));
        }
        if values.nrows() != num_centers {
            return Err(RbfError::dimensions(format!(
                "provide as many data values as data sites, got {} sites and {} values",
                num_centers,
                values.nrows()
            )));
        }
        if num_vars == 0 || num_outputs == 0 {
            return Err(RbfError::dimensions(
                "sites and values must have at least one dimension",
            ));
        }

        let center = |i: usize| -> Row<f64> { sites.row(i).iter().copied().collect() };
        let kernels: Vec<ShiftedKernel> = match kernel {
            KernelChoice::Broadcast(phi) => (0..num_centers)
                .map(|i| ShiftedKernel::new(phi, center(i)))
                .collect(),
            KernelChoice::PerSite(phis) => {
                if phis.len() != num_centers {
                    return Err(RbfError::dimensions(format!(
                        "provide as many radial functions as data sites, got {} functions and {} sites",
                        phis.len(),
                        num_centers
                    )));
                }
                phis.into_iter()
                    .enumerate()
                    .map(|(i, phi)| ShiftedKernel::new(phi, center(i)))
                    .collect()
            }
        };

        // The working degree is capped by the strictest kernel and never
        // raised; -1 drops the polynomial tail entirely.
        let min_cpd = kernels
            .iter()
            .map(|kernel| kernel.phi.cpd_order())
            .min()
            .unwrap_or(0);
        let poly_degree = settings.poly_degree.min(min_cpd as i32 - 1).max(-1);

        let basis = canonical_basis(num_vars, poly_degree);
        let num_poly_terms = basis.len();

        let coeff = solver::coefficients(&sites, &values, &kernels, &basis)?;

        let polys = (0..num_outputs)
            .map(|l| {
                let column = (0..num_poly_terms)
                    .map(|j| coeff.poly_coefficients[(j, l)])
                    .collect();
                Polynomial::new(basis.clone(), column)
            })
            .collect();

        log::debug!(
            "solved RBF system for {} centers ({} -> {} dims, polynomial degree {})",
            num_centers,
            num_vars,
            num_outputs,
            poly_degree,
        );

        Ok(Self {
            rbf_sys: RbfSystem {
                kernels,
                weights: coeff.weights,
            },
            poly_sys: PolySystem { polys },
            num_vars,
            num_outputs,
            num_centers,
            poly_degree,
            num_poly_terms,
            array_strategy: settings.array_strategy.resolve(num_vars, num_outputs),
            scalar_output: !settings.vector_output && num_outputs == 1,
        })
    }

    /// Evaluates all outputs of the model at the point `x`.
    ///
    /// ### Panics
    /// If `x.len()` does not match the input dimension.
    pub fn evaluate(&self, x: &[f64]) -> Vec<f64> {
        assert_eq!(
            x.len(),
            self.num_vars,
            "expected a point with {} coordinates",
            self.num_vars
        );

        let row = as_point_row(x);
        let mut result = self.rbf_sys.evaluate(row.row(0));
        for (r, p) in result.iter_mut().zip(self.poly_sys.evaluate(x)) {
            *r += p;
        }
        result
    }

    /// Evaluates a single output of the model at the point `x`.
    pub fn evaluate_output(&self, x: &[f64], output: usize) -> f64 {
        assert_eq!(
            x.len(),
            self.num_vars,
            "expected a point with {} coordinates",
            self.num_vars
        );
        assert!(
            output < self.num_outputs,
            "output index {output} out of range"
        );

        let row = as_point_row(x);
        self.rbf_sys.evaluate_output(row.row(0), output) + self.poly_sys.evaluate_output(x, output)
    }

    /// Scalar-return evaluation for single-output models.
    ///
    /// Equals the single entry of [`RbfModel::evaluate`]. Only available when
    /// the value dimension is 1 (the scalar-return request is ignored for
    /// vector-valued data).
    pub fn evaluate_scalar(&self, x: &[f64]) -> f64 {
        assert_eq!(
            self.num_outputs, 1,
            "scalar evaluation requires a single-output model"
        );
        self.evaluate_output(x, 0)
    }

    /// Convenience wrapper for one-dimensional models: wraps the scalar
    /// argument into a length-1 point.
    pub fn evaluate_1d(&self, x: f64) -> Vec<f64> {
        self.evaluate(&[x])
    }

    /// Evaluates the model at every row of `targets`, returning an
    /// `n_targets x k` matrix of interpolated values.
    pub fn evaluate_many(&self, targets: &Mat<f64>) -> Mat<f64> {
        assert_eq!(
            targets.ncols(),
            self.num_vars,
            "expected points with {} coordinates",
            self.num_vars
        );

        let mut result = Mat::<f64>::zeros(targets.nrows(), self.num_outputs);
        let mut point = vec![0.0; self.num_vars];
        for i in 0..targets.nrows() {
            for (j, coord) in point.iter_mut().enumerate() {
                *coord = targets[(i, j)];
            }
            let row = self.evaluate(&point);
            for (j, value) in row.into_iter().enumerate() {
                result[(i, j)] = value;
            }
        }
        result
    }

    /// Input dimension `n`.
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Output dimension `k`.
    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    /// Number of kernel centers `N`.
    pub fn num_centers(&self) -> usize {
        self.num_centers
    }

    /// The working polynomial degree after capping, `-1` when the model has
    /// no polynomial tail.
    pub fn poly_degree(&self) -> i32 {
        self.poly_degree
    }

    /// Number of polynomial basis terms `Q` used by the tail.
    pub fn num_poly_terms(&self) -> usize {
        self.num_poly_terms
    }

    /// The resolved storage strategy hint.
    pub fn array_strategy(&self) -> ArrayStrategy {
        self.array_strategy
    }

    /// Whether the model was flagged for scalar-return use.
    pub fn scalar_output(&self) -> bool {
        self.scalar_output
    }

    /// The solved kernel weight matrix `W`, `N x k`.
    pub fn weights(&self) -> &Mat<f64> {
        &self.rbf_sys.weights
    }

    /// The shifted kernels, one per center.
    pub fn kernels(&self) -> &[ShiftedKernel] {
        &self.rbf_sys.kernels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::generate_random_points;
    use faer::mat;

    fn assert_interpolates(model: &RbfModel, sites: &Mat<f64>, values: &Mat<f64>) {
        let fitted = model.evaluate_many(sites);
        for i in 0..sites.nrows() {
            for l in 0..values.ncols() {
                assert!(
                    (fitted[(i, l)] - values[(i, l)]).abs() < 1e-8,
                    "site {i} output {l}: {} vs {}",
                    fitted[(i, l)],
                    values[(i, l)]
                );
            }
        }
    }

    #[test]
    fn interpolates_quadratic_data_1d() {
        // Samples of y = x^2.
        let sites = mat![[0.0], [1.0], [2.0]];
        let values = mat![[0.0], [1.0], [4.0]];

        let model = RbfModel::builder(
            sites.clone(),
            values.clone(),
            ModelSettings::builder().poly_degree(1).build(),
        )
        .kernel(RadialKernel::gaussian(1.0).unwrap())
        .build()
        .unwrap();

        assert_interpolates(&model, &sites, &values);

        // Gaussian kernels are CPD of order 0, so the requested degree 1 is
        // capped away entirely.
        assert_eq!(model.poly_degree(), -1);
        assert_eq!(model.num_poly_terms(), 0);

        let between = model.evaluate(&[0.5]);
        assert_eq!(between.len(), 1);
        assert!(between[0].is_finite());
    }

    #[test]
    fn interpolates_with_polynomial_tail_2d() {
        let sites = generate_random_points(12, 2, Some(7));
        let values = Mat::from_fn(12, 1, |i, _| {
            let (x, y) = (sites[(i, 0)], sites[(i, 1)]);
            1.0 + 2.0 * x - y + x * y
        });

        let model = RbfModel::builder(
            sites.clone(),
            values.clone(),
            ModelSettings::builder().poly_degree(1).build(),
        )
        .kernel(RadialKernel::thin_plate_spline(1).unwrap())
        .build()
        .unwrap();

        assert_eq!(model.poly_degree(), 1);
        assert_eq!(model.num_poly_terms(), 3);
        assert_interpolates(&model, &sites, &values);
    }

    #[test]
    fn interpolates_vector_valued_data() {
        let sites = generate_random_points(10, 2, Some(3));
        let values = Mat::from_fn(10, 3, |i, l| {
            let (x, y) = (sites[(i, 0)], sites[(i, 1)]);
            match l {
                0 => x + y,
                1 => x * y,
                _ => (x - y).powi(2),
            }
        });

        let model = RbfModel::builder(sites.clone(), values.clone(), ModelSettings::default())
            .kernel(RadialKernel::multiquadric(1.0, 0.5).unwrap())
            .build()
            .unwrap();

        assert_eq!(model.num_outputs(), 3);
        assert_interpolates(&model, &sites, &values);

        // Restricting to one output matches the corresponding full entry.
        let probe = [0.3, 0.4];
        let all = model.evaluate(&probe);
        for l in 0..3 {
            assert!((model.evaluate_output(&probe, l) - all[l]).abs() < 1e-12);
        }
    }

    #[test]
    fn per_site_kernels() {
        let sites = mat![[0.0], [1.0], [2.0], [3.0]];
        let values = mat![[1.0], [0.0], [1.0], [0.5]];
        let phis = vec![
            RadialKernel::gaussian(1.0).unwrap(),
            RadialKernel::gaussian(2.0).unwrap(),
            RadialKernel::inverse_multiquadric(1.0, 0.5).unwrap(),
            RadialKernel::gaussian(0.5).unwrap(),
        ];

        let model = RbfModel::builder(sites.clone(), values.clone(), ModelSettings::default())
            .kernels(phis)
            .build()
            .unwrap();

        assert_interpolates(&model, &sites, &values);
    }

    #[test]
    fn degree_capping_is_observable() {
        let sites = generate_random_points(15, 2, Some(11));
        let values = Mat::from_fn(15, 1, |i, _| sites[(i, 0)] + sites[(i, 1)]);

        // Multiquadric with β = 1/2 is CPD of order 1: degree caps to 0.
        let model = RbfModel::builder(
            sites.clone(),
            values.clone(),
            ModelSettings::builder().poly_degree(3).build(),
        )
        .kernel(RadialKernel::multiquadric(1.0, 0.5).unwrap())
        .build()
        .unwrap();
        assert_eq!(model.poly_degree(), 0);
        assert_eq!(model.num_poly_terms(), 1);

        // Thin plate spline of order 2 is CPD of order 3: degree 3 caps to 2.
        let model = RbfModel::builder(
            sites.clone(),
            values,
            ModelSettings::builder().poly_degree(3).build(),
        )
        .kernel(RadialKernel::thin_plate_spline(2).unwrap())
        .build()
        .unwrap();
        assert_eq!(model.poly_degree(), 2);
        assert_eq!(model.num_poly_terms(), 6);
    }

    #[test]
    fn scalar_and_vector_output_agree() {
        let sites = mat![[0.0], [0.5], [1.0]];
        let values = mat![[1.0], [2.0], [0.0]];

        let model = RbfModel::builder(
            sites,
            values,
            ModelSettings::builder().vector_output(false).build(),
        )
        .kernel(RadialKernel::gaussian(1.5).unwrap())
        .build()
        .unwrap();

        assert!(model.scalar_output());
        let x = [0.25];
        assert_eq!(model.evaluate_scalar(&x), model.evaluate(&x)[0]);
        assert_eq!(model.evaluate_1d(0.25)[0], model.evaluate_scalar(&x));
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let sites = mat![[0.0], [1.0], [2.0]];
        let values = mat![[0.0], [1.0]];

        let err = RbfModel::builder(sites, values, ModelSettings::default())
            .build()
            .unwrap_err();
        assert!(matches!(err, RbfError::DimensionMismatch { .. }));
    }

    #[test]
    fn kernel_list_length_must_match_sites() {
        let sites = mat![[0.0], [1.0], [2.0]];
        let values = mat![[0.0], [1.0], [4.0]];
        let phis = vec![RadialKernel::gaussian(1.0).unwrap(); 2];

        let err = RbfModel::builder(sites, values, ModelSettings::default())
            .kernels(phis)
            .build()
            .unwrap_err();
        assert!(matches!(err, RbfError::DimensionMismatch { .. }));
    }

    #[test]
    fn empty_data_is_rejected() {
        let sites = Mat::<f64>::zeros(0, 2);
        let values = Mat::<f64>::zeros(0, 1);
        let err = RbfModel::builder(sites, values, ModelSettings::default())
            .build()
            .unwrap_err();
        assert!(matches!(err, RbfError::DimensionMismatch { .. }));
    }

    #[test]
    fn duplicate_sites_report_a_singular_system() {
        let sites = mat![[1.0], [1.0]];
        let values = mat![[0.0], [1.0]];
        let err = RbfModel::builder(sites, values, ModelSettings::default())
            .kernel(RadialKernel::gaussian(1.0).unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(err, RbfError::SingularSystem { .. }));
    }

    #[test]
    fn kernel_name_constructor() {
        let _ = env_logger::builder().is_test(true).try_init();

        let sites = mat![[0.0], [1.0], [2.0]];
        let values = mat![[0.0], [1.0], [4.0]];

        // An unknown identifier warns and substitutes the default gaussian.
        let model = RbfModel::builder(sites.clone(), values.clone(), ModelSettings::default())
            .kernel_name("wendland", None)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            model.kernels()[0].phi,
            RadialKernel::Gaussian { alpha: 1.0 }
        );
        assert_interpolates(&model, &sites, &values);

        // Invalid shape parameters fail even through the name table.
        assert!(RbfModel::builder(sites, values, ModelSettings::default())
            .kernel_name("gaussian", Some(&[-1.0]))
            .is_err());
    }

    #[test]
    fn models_are_send_and_sync() {
        fn is_send_sync<T: Send + Sync>() {}
        is_send_sync::<RbfModel>();
    }
}
