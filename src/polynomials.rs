/////////////////////////////////////////////////////////////////////////////////////////////
//
// Generates and caches canonical monomial bases and evaluates polynomial tails.
//
// Created on: 22 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! The canonical basis of `n`-variate polynomials of bounded total degree,
//! memoized process-wide, plus the polynomial type built over it.

use faer::Mat;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};

/// Returns all tuples of `n` non-negative integers summing to exactly `d`.
///
/// The order is deterministic: the leading entry descends from `d` to `0`
/// while the remaining entries recurse on the residual sum. Reproducible
/// ordering is what makes cached bases element-wise identical across calls.
pub fn non_negative_solutions(d: u32, n: usize) -> Vec<Vec<u32>> {
    assert!(n >= 1, "need at least one variable");

    if n == 1 {
        return vec![vec![d]];
    }

    let mut solutions = Vec::new();
    for i in 0..=d {
        for shorter in non_negative_solutions(i, n - 1) {
            let mut solution = Vec::with_capacity(n);
            solution.push(d - i);
            solution.extend(shorter);
            solutions.push(solution);
        }
    }
    solutions
}

/// Dimension of the space of `n`-variate polynomials of degree at most `d`,
/// the binomial coefficient `C(n + d, n)`. A degree of `-1` denotes the
/// empty basis.
pub fn basis_dimension(n: usize, degree: i32) -> usize {
    if degree < 0 {
        return 0;
    }
    let d = degree as u64;
    let n = n as u64;
    // C(n + d, n) built up multiplicatively; exact for every size this crate
    // can realistically solve for.
    let mut q: u64 = 1;
    for i in 1..=n {
        q = q * (d + i) / i;
    }
    q as usize
}

/// An ordered monomial exponent basis for `Π_d(ℝ^n)`.
///
/// Entries are exponent tuples of length `num_vars` grouped by ascending total
/// degree; the number of entries equals [`basis_dimension`]. Instances are
/// built once per `(n, d)` key by [`canonical_basis`] and immutable afterwards.
#[derive(Debug, PartialEq, Eq)]
pub struct PolyBasis {
    num_vars: usize,
    degree: i32,
    exponents: Vec<Vec<u32>>,
}

impl PolyBasis {
    fn build(num_vars: usize, degree: i32) -> Self {
        let mut exponents = Vec::new();
        if degree >= 0 {
            for d in 0..=degree as u32 {
                exponents.extend(non_negative_solutions(d, num_vars));
            }
        }

        debug_assert_eq!(exponents.len(), basis_dimension(num_vars, degree));

        Self {
            num_vars,
            degree,
            exponents,
        }
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn degree(&self) -> i32 {
        self.degree
    }

    /// Number of monomials, `Q = C(n + d, n)`.
    pub fn len(&self) -> usize {
        self.exponents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exponents.is_empty()
    }

    pub fn exponents(&self) -> &[Vec<u32>] {
        &self.exponents
    }

    /// Evaluates the `j`-th monomial at the coordinates yielded by `x`.
    #[inline(always)]
    pub fn monomial<I>(&self, j: usize, x: I) -> f64
    where
        I: IntoIterator<Item = f64>,
    {
        self.exponents[j]
            .iter()
            .zip(x)
            .map(|(e, xi)| xi.powi(*e as i32))
            .product()
    }
}

/// Process-wide basis cache keyed by `(n, d)`.
///
/// Empty at process start, entries persist for the process lifetime. One
/// global lock guards the whole check-and-insert sequence, so concurrent
/// model constructions observe at most one build per key and never a
/// partially built basis.
static BASIS_CACHE: LazyLock<Mutex<HashMap<(usize, i32), Arc<PolyBasis>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Returns the canonical basis of the space of `n`-variate polynomials of
/// degree at most `degree`, memoized per `(n, degree)`.
///
/// `degree = -1` yields the empty basis used when a kernel needs no
/// polynomial tail.
pub fn canonical_basis(n: usize, degree: i32) -> Arc<PolyBasis> {
    let mut cache = BASIS_CACHE.lock().unwrap();
    cache
        .entry((n, degree))
        .or_insert_with(|| Arc::new(PolyBasis::build(n, degree)))
        .clone()
}

/// Evaluates every basis monomial at every point, giving the `N x Q` matrix
/// `P` with `P[i, j] = p_j(points.row(i))`.
pub fn evaluate_monomials(points: &Mat<f64>, basis: &PolyBasis) -> Mat<f64> {
    Mat::from_fn(points.nrows(), basis.len(), |i, j| {
        basis.monomial(j, points.row(i).iter().copied())
    })
}

/// A polynomial expressed as coefficients over a shared canonical basis.
///
/// One instance per model output is built from a column of the solved
/// polynomial coefficient matrix.
#[derive(Clone, Debug)]
pub struct Polynomial {
    basis: Arc<PolyBasis>,
    coefficients: Vec<f64>,
}

impl Polynomial {
    pub fn new(basis: Arc<PolyBasis>, coefficients: Vec<f64>) -> Self {
        assert_eq!(
            basis.len(),
            coefficients.len(),
            "one coefficient per basis monomial"
        );
        Self {
            basis,
            coefficients,
        }
    }

    pub fn basis(&self) -> &Arc<PolyBasis> {
        &self.basis
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Evaluates the polynomial at `x`. The empty basis evaluates to `0`.
    pub fn evaluate(&self, x: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .enumerate()
            .map(|(j, c)| c * self.basis.monomial(j, x.iter().copied()))
            .sum()
    }

    /// Gradient of the polynomial at `x`.
    pub fn gradient(&self, x: &[f64]) -> Vec<f64> {
        let n = self.basis.num_vars;
        let mut grad = vec![0.0; n];

        for (exps, c) in self.basis.exponents.iter().zip(&self.coefficients) {
            for i in 0..n {
                let e = exps[i];
                if e == 0 {
                    continue;
                }
                let mut term = c * e as f64 * x[i].powi(e as i32 - 1);
                for j in 0..n {
                    if j != i {
                        term *= x[j].powi(exps[j] as i32);
                    }
                }
                grad[i] += term;
            }
        }

        grad
    }

    /// Hessian of the polynomial at `x`.
    pub fn hessian(&self, x: &[f64]) -> Mat<f64> {
        let n = self.basis.num_vars;
        let mut hess = Mat::<f64>::zeros(n, n);

        for (exps, c) in self.basis.exponents.iter().zip(&self.coefficients) {
            for r in 0..n {
                for s in r..n {
                    let term = if r == s {
                        let e = exps[r];
                        if e < 2 {
                            continue;
                        }
                        let mut t = c * (e * (e - 1)) as f64 * x[r].powi(e as i32 - 2);
                        for j in 0..n {
                            if j != r {
                                t *= x[j].powi(exps[j] as i32);
                            }
                        }
                        t
                    } else {
                        let (er, es) = (exps[r], exps[s]);
                        if er == 0 || es == 0 {
                            continue;
                        }
                        let mut t = c
                            * (er * es) as f64
                            * x[r].powi(er as i32 - 1)
                            * x[s].powi(es as i32 - 1);
                        for j in 0..n {
                            if j != r && j != s {
                                t *= x[j].powi(exps[j] as i32);
                            }
                        }
                        t
                    };

                    hess[(r, s)] += term;
                    if r != s {
                        hess[(s, r)] += term;
                    }
                }
            }
        }

        hess
    }
}
