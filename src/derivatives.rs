/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements analytic gradients, Jacobians, and Hessians of RBF models.
//
// Created on: 22 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Analytic derivatives of the interpolant
//!
//! With `ξⁱ = x - xⁱ` and `ρᵢ = |ξⁱ|₂`, each output of the model
//! differentiates by the chain rule to
//!
//! ```text
//! ∇r(x)  = Σᵢ wᵢ (φ'(ρᵢ) / ρᵢ) ξⁱ + ∇p(x)
//! ∇²r(x) = Σᵢ wᵢ [ (φ''(ρᵢ)/ρᵢ² - φ'(ρᵢ)/ρᵢ³) ξⁱ(ξⁱ)ᵗ + (φ'(ρᵢ)/ρᵢ) I ] + ∇²p(x)
//! ```
//!
//! Every admissible kernel satisfies `φ'(0) = 0`, so the `φ'(ρ) / ρ` factors
//! stay bounded and the gradient term of a kernel simply drops out when `x`
//! coincides with its center. The Hessian term degenerates to `wᵢ φ''(0) I`
//! there.

use crate::kernels::get_distance;
use crate::model::RbfModel;
use faer::Mat;

impl RbfModel {
    /// Gradient of the output `output` at the point `x`, length `n`.
    ///
    /// ### Panics
    /// If `x.len()` does not match the input dimension or `output` is out of
    /// range.
    pub fn gradient(&self, x: &[f64], output: usize) -> Vec<f64> {
        assert_eq!(
            x.len(),
            self.num_vars(),
            "expected a point with {} coordinates",
            self.num_vars()
        );
        assert!(
            output < self.num_outputs(),
            "output index {output} out of range"
        );

        let point = crate::kernels::as_point_row(x);
        let mut grad = self.poly_sys.polys[output].gradient(x);

        for (i, kernel) in self.rbf_sys.kernels.iter().enumerate() {
            let rho = get_distance(point.row(0), kernel.center.as_ref());
            if rho < f64::EPSILON {
                // phi'(0) = 0 for every admissible kernel.
                continue;
            }
            let factor = self.rbf_sys.weights[(i, output)] * kernel.phi.phi_deriv(rho) / rho;
            for (j, g) in grad.iter_mut().enumerate() {
                *g += factor * (x[j] - kernel.center[j]);
            }
        }

        grad
    }

    /// Jacobian of the model at `x` as a `k x n` matrix: row `l` holds the
    /// gradient of output `l`.
    pub fn jacobian(&self, x: &[f64]) -> Mat<f64> {
        let mut jac = Mat::<f64>::zeros(self.num_outputs(), self.num_vars());
        for l in 0..self.num_outputs() {
            for (j, g) in self.gradient(x, l).into_iter().enumerate() {
                jac[(l, j)] = g;
            }
        }
        jac
    }

    /// Hessian of the output `output` at the point `x`, an `n x n` symmetric
    /// matrix.
    ///
    /// At a kernel center the rank-one term vanishes and the kernel
    /// contributes `w phi''(0) I`; see [`crate::kernels::RadialKernel::phi_deriv2`]
    /// for the one kernel where that limit is not finite.
    pub fn hessian(&self, x: &[f64], output: usize) -> Mat<f64> {
        assert_eq!(
            x.len(),
            self.num_vars(),
            "expected a point with {} coordinates",
            self.num_vars()
        );
        assert!(
            output < self.num_outputs(),
            "output index {output} out of range"
        );

        let n = self.num_vars();
        let point = crate::kernels::as_point_row(x);
        let mut hess = self.poly_sys.polys[output].hessian(x);

        for (i, kernel) in self.rbf_sys.kernels.iter().enumerate() {
            let w = self.rbf_sys.weights[(i, output)];
            let rho = get_distance(point.row(0), kernel.center.as_ref());

            if rho < f64::EPSILON {
                let diag = w * kernel.phi.phi_deriv2(0.0);
                for r in 0..n {
                    hess[(r, r)] += diag;
                }
                continue;
            }

            let d1 = kernel.phi.phi_deriv(rho);
            let d2 = kernel.phi.phi_deriv2(rho);
            let outer = w * (d2 - d1 / rho) / (rho * rho);
            let diag = w * d1 / rho;

            for r in 0..n {
                let xi_r = x[r] - kernel.center[r];
                for s in 0..n {
                    let xi_s = x[s] - kernel.center[s];
                    hess[(r, s)] += outer * xi_r * xi_s;
                }
                hess[(r, r)] += diag;
            }
        }

        hess
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::generate_random_points;
    use crate::config::ModelSettings;
    use crate::kernels::RadialKernel;

    fn build_model(phi: RadialKernel, degree: i32, num_outputs: usize) -> RbfModel {
        let sites = generate_random_points(14, 2, Some(42));
        let values = Mat::from_fn(14, num_outputs, |i, l| {
            let (x, y) = (sites[(i, 0)], sites[(i, 1)]);
            match l {
                0 => (x * y).sin() + x,
                _ => x * x - y,
            }
        });
        RbfModel::builder(
            sites,
            values,
            ModelSettings::builder().poly_degree(degree).build(),
        )
        .kernel(phi)
        .build()
        .unwrap()
    }

    fn fd_gradient(model: &RbfModel, x: &[f64], output: usize, h: f64) -> Vec<f64> {
        (0..x.len())
            .map(|j| {
                let mut plus = x.to_vec();
                let mut minus = x.to_vec();
                plus[j] += h;
                minus[j] -= h;
                (model.evaluate_output(&plus, output) - model.evaluate_output(&minus, output))
                    / (2.0 * h)
            })
            .collect()
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let kernels = [
            RadialKernel::gaussian(1.2).unwrap(),
            RadialKernel::multiquadric(0.9, 0.5).unwrap(),
            RadialKernel::inverse_multiquadric(1.0, 1.5).unwrap(),
            RadialKernel::thin_plate_spline(2).unwrap(),
        ];

        for phi in kernels {
            let model = build_model(phi, 1, 1);
            for probe in [[0.31, 0.62], [0.85, 0.15]] {
                let grad = model.gradient(&probe, 0);
                let fd = fd_gradient(&model, &probe, 0, 1e-5);
                for j in 0..2 {
                    assert!(
                        (grad[j] - fd[j]).abs() < 1e-4 * (1.0 + fd[j].abs()),
                        "{phi:?} gradient[{j}] at {probe:?}: {} vs {}",
                        grad[j],
                        fd[j]
                    );
                }
            }
        }
    }

    #[test]
    fn hessian_matches_finite_differences() {
        let model = build_model(RadialKernel::gaussian(1.1).unwrap(), 1, 1);
        let probe = [0.4, 0.55];
        let h = 1e-4;

        let hess = model.hessian(&probe, 0);
        for r in 0..2 {
            // Central difference of the analytic gradient.
            let mut plus = probe;
            let mut minus = probe;
            plus[r] += h;
            minus[r] -= h;
            let gp = model.gradient(&plus, 0);
            let gm = model.gradient(&minus, 0);
            for s in 0..2 {
                let fd = (gp[s] - gm[s]) / (2.0 * h);
                assert!(
                    (hess[(r, s)] - fd).abs() < 1e-4 * (1.0 + fd.abs()),
                    "hessian[({r}, {s})]: {} vs {}",
                    hess[(r, s)],
                    fd
                );
            }
        }

        // Symmetry is exact by construction.
        assert_eq!(hess[(0, 1)], hess[(1, 0)]);
    }

    #[test]
    fn derivatives_are_finite_at_a_center() {
        let model = build_model(RadialKernel::thin_plate_spline(2).unwrap(), 2, 1);
        let center: Vec<f64> = model.kernels()[0].center.iter().copied().collect();

        for g in model.gradient(&center, 0) {
            assert!(g.is_finite());
        }
        let hess = model.hessian(&center, 0);
        for r in 0..2 {
            for s in 0..2 {
                assert!(hess[(r, s)].is_finite());
            }
        }
    }

    #[test]
    fn jacobian_stacks_output_gradients() {
        let model = build_model(RadialKernel::multiquadric(1.0, 0.5).unwrap(), 1, 2);
        let probe = [0.2, 0.7];

        let jac = model.jacobian(&probe);
        assert_eq!(jac.nrows(), 2);
        assert_eq!(jac.ncols(), 2);
        for l in 0..2 {
            let grad = model.gradient(&probe, l);
            for j in 0..2 {
                assert_eq!(jac[(l, j)], grad[j]);
            }
        }
    }
}
