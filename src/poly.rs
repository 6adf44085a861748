//! Dense polynomial arithmetic over the scalar field.
//!
//! Everything the accumulator needs from `Fr[z]`: characteristic polynomials
//! built from integer roots, division with remainder, and the extended
//! Euclidean algorithm that backs the disjointness half of the intersection
//! proof.

use crate::error::{AccumulatorError, Result};
use crate::Fr;
use ark_ff::{Field, One, Zero};
use ark_poly::{
    univariate::{DenseOrSparsePolynomial, DensePolynomial},
    UVPolynomial,
};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::ops::Neg;

/// Lifts a signed integer into the scalar field.
pub fn element_to_fr(x: i64) -> Fr {
    let lifted = Fr::from(x.unsigned_abs());
    if x < 0 {
        lifted.neg()
    } else {
        lifted
    }
}

/// The linear factor `z - x`.
pub fn root_factor(x: Fr) -> DensePolynomial<Fr> {
    DensePolynomial::from_coefficients_vec(vec![x.neg(), Fr::one()])
}

/// Monic polynomial with exactly the given roots, `prod (z - r)`.
///
/// An empty slice yields the constant polynomial `1`. The product is taken
/// divide-and-conquer so the factor degrees stay balanced; the halves expand
/// on the rayon pool.
pub fn poly_from_roots(roots: &[Fr]) -> DensePolynomial<Fr> {
    let factors: Vec<DensePolynomial<Fr>> = roots.iter().map(|r| root_factor(*r)).collect();

    fn expand(factors: &[DensePolynomial<Fr>]) -> Cow<'_, DensePolynomial<Fr>> {
        if factors.is_empty() {
            return Cow::Owned(DensePolynomial::from_coefficients_vec(vec![Fr::one()]));
        } else if factors.len() == 1 {
            return Cow::Borrowed(&factors[0]);
        }
        let mid = factors.len() / 2;
        let (left, right) = rayon::join(|| expand(&factors[..mid]), || expand(&factors[mid..]));
        Cow::Owned(left.as_ref() * right.as_ref())
    }

    expand(&factors).into_owned()
}

/// Characteristic polynomial of an integer set.
pub fn poly_from_set(set: &BTreeSet<i64>) -> DensePolynomial<Fr> {
    let roots: Vec<Fr> = set.iter().map(|x| element_to_fr(*x)).collect();
    poly_from_roots(&roots)
}

/// Division with remainder: `p = quot * q + rem` with `deg rem < deg q`.
pub fn divmod(
    p: &DensePolynomial<Fr>,
    q: &DensePolynomial<Fr>,
) -> Result<(DensePolynomial<Fr>, DensePolynomial<Fr>)> {
    DenseOrSparsePolynomial::from(p)
        .divide_with_q_and_r(&DenseOrSparsePolynomial::from(q))
        .ok_or(AccumulatorError::ZeroDivisor)
}

/// Exact division; errors if `q` does not divide `p`.
pub fn divide_exact(
    p: &DensePolynomial<Fr>,
    q: &DensePolynomial<Fr>,
) -> Result<DensePolynomial<Fr>> {
    let (quot, rem) = divmod(p, q)?;
    if !rem.is_zero() {
        return Err(AccumulatorError::InexactDivision);
    }
    Ok(quot)
}

/// Extended Euclidean algorithm over `Fr[z]`.
///
/// Returns `(g, a, b)` with `a * p + b * q = g = gcd(p, q)`, where `g` is
/// monic (the Bezout cofactors are scaled by the same constant). Returns
/// `None` only when both inputs are zero, as the gcd is undefined there.
pub fn xgcd(
    p: DensePolynomial<Fr>,
    q: DensePolynomial<Fr>,
) -> Option<(
    DensePolynomial<Fr>,
    DensePolynomial<Fr>,
    DensePolynomial<Fr>,
)> {
    if p.is_zero() && q.is_zero() {
        return None;
    }

    let mut r0 = p;
    let mut r1 = q;
    let mut s0 = DensePolynomial::from_coefficients_vec(vec![Fr::one()]);
    let mut s1 = DensePolynomial::zero();
    let mut t0 = DensePolynomial::zero();
    let mut t1 = DensePolynomial::from_coefficients_vec(vec![Fr::one()]);

    while !r1.is_zero() {
        let (quot, rem) = DenseOrSparsePolynomial::from(&r0)
            .divide_with_q_and_r(&DenseOrSparsePolynomial::from(&r1))?;
        let s2 = &s0 - &(&quot * &s1);
        let t2 = &t0 - &(&quot * &t1);
        r0 = std::mem::replace(&mut r1, rem);
        s0 = std::mem::replace(&mut s1, s2);
        t0 = std::mem::replace(&mut t1, t2);
    }

    // Normalize so the gcd is monic.
    let lead_inv = r0.coeffs.last()?.inverse()?;
    Some((scale(&r0, lead_inv), scale(&s0, lead_inv), scale(&t0, lead_inv)))
}

fn scale(poly: &DensePolynomial<Fr>, k: Fr) -> DensePolynomial<Fr> {
    DensePolynomial::from_coefficients_vec(poly.coeffs.iter().map(|c| *c * k).collect())
}
