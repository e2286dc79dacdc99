/////////////////////////////////////////////////////////////////////////////////////////////
//
// Assembles and solves the augmented interpolation system for the model coefficients.
//
// Created on: 22 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::errors::RbfError;
use crate::kernels::ShiftedKernel;
use crate::linalg;
use crate::polynomials::{self, PolyBasis};
use faer::Mat;

/// Coefficients of a solved RBF system.
///
/// Produced once per model build and never mutated afterwards: `weights` holds
/// one column of kernel weights per output, `poly_coefficients` one column of
/// polynomial tail coefficients per output (zero rows when the working degree
/// is `-1` and no tail is present).
#[derive(Debug)]
pub(crate) struct CoefficientMatrices {
    /// Kernel weights `W`, `N x k`.
    pub weights: Mat<f64>,

    /// Polynomial tail coefficients `Λ`, `Q x k`.
    pub poly_coefficients: Mat<f64>,
}

/// Solves the augmented interpolation system
///
/// ```text
/// [ Φ   P ] [ w ]   [ Y ]
/// [ Pᵗ  0 ] [ λ ] = [ 0 ]
/// ```
///
/// where `Φ[i, j] = kernels[j](sites.row(i))` and `P[i, j]` is the `j`-th
/// basis monomial at site `i`. The zero block constrains the kernel weights
/// to be orthogonal to the polynomial space, which together with the degree
/// rule from the kernel's CPD order makes the system uniquely solvable for
/// distinct sites.
pub(crate) fn coefficients(
    sites: &Mat<f64>,
    values: &Mat<f64>,
    kernels: &[ShiftedKernel],
    basis: &PolyBasis,
) -> Result<CoefficientMatrices, RbfError> {
    let n = sites.nrows();
    let q = basis.len();
    let num_outputs = values.ncols();

    let phi = Mat::from_fn(n, n, |i, j| kernels[j].evaluate(sites.row(i)));

    if q == 0 {
        // CPD order 0: no polynomial tail, the system is just Φ w = Y.
        let weights = linalg::solve_dense(&phi, values)?;
        return Ok(CoefficientMatrices {
            weights,
            poly_coefficients: Mat::zeros(0, num_outputs),
        });
    }

    let p = polynomials::evaluate_monomials(sites, basis);

    let mut a = Mat::<f64>::zeros(n + q, n + q);
    a.submatrix_mut(0, 0, n, n).copy_from(&phi);
    a.submatrix_mut(0, n, n, q).copy_from(&p);
    a.submatrix_mut(n, 0, q, n).copy_from(p.transpose());

    let mut b = Mat::<f64>::zeros(n + q, num_outputs);
    b.submatrix_mut(0, 0, n, num_outputs).copy_from(values);

    let x = linalg::solve_dense(&a, &b)?;

    Ok(CoefficientMatrices {
        weights: x.submatrix(0, 0, n, num_outputs).to_owned(),
        poly_coefficients: x.submatrix(n, 0, q, num_outputs).to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::RadialKernel;
    use crate::polynomials::canonical_basis;
    use faer::mat;

    fn kernels_for(sites: &Mat<f64>, phi: RadialKernel) -> Vec<ShiftedKernel> {
        (0..sites.nrows())
            .map(|i| ShiftedKernel::new(phi, sites.row(i).iter().copied().collect()))
            .collect()
    }

    #[test]
    fn reproduces_values_at_sites() {
        let sites = mat![[0.0], [0.7], [1.5], [2.0]];
        let values = mat![[1.0], [-0.5], [2.0], [0.25]];
        let kernels = kernels_for(&sites, RadialKernel::gaussian(1.0).unwrap());
        let basis = canonical_basis(1, -1);

        let coeff = coefficients(&sites, &values, &kernels, &basis).unwrap();
        assert_eq!(coeff.weights.nrows(), 4);
        assert_eq!(coeff.poly_coefficients.nrows(), 0);

        for i in 0..sites.nrows() {
            let fitted: f64 = (0..kernels.len())
                .map(|j| kernels[j].evaluate(sites.row(i)) * coeff.weights[(j, 0)])
                .sum();
            assert!((fitted - values[(i, 0)]).abs() < 1e-10);
        }
    }

    #[test]
    fn weights_are_orthogonal_to_the_polynomial_space() {
        let sites = mat![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.4, 0.6]];
        let values = mat![[0.0], [1.0], [2.0], [3.0], [1.6]];
        let kernels = kernels_for(&sites, RadialKernel::thin_plate_spline(1).unwrap());
        let basis = canonical_basis(2, 1);

        let coeff = coefficients(&sites, &values, &kernels, &basis).unwrap();
        assert_eq!(coeff.poly_coefficients.nrows(), 3);

        // The lower block of the system enforces Pᵗ w = 0.
        let p = polynomials::evaluate_monomials(&sites, &basis);
        let constraint = p.transpose() * &coeff.weights;
        for j in 0..constraint.nrows() {
            assert!(constraint[(j, 0)].abs() < 1e-9);
        }
    }

    #[test]
    fn duplicate_sites_make_the_system_singular() {
        let sites = mat![[0.0], [0.0]];
        let values = mat![[0.0], [1.0]];
        let kernels = kernels_for(&sites, RadialKernel::gaussian(1.0).unwrap());
        let basis = canonical_basis(1, -1);

        assert!(matches!(
            coefficients(&sites, &values, &kernels, &basis),
            Err(RbfError::SingularSystem { .. })
        ));
    }
}
