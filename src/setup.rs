//! Trusted setup: secrets, generators, and the published SRS power tables.
//!
//! The setup samples (or derives) a secret point `s`, hashes fixed domain
//! tags onto both source groups to obtain the generators, and publishes
//! `g1^{s^i}` and `g2^{s^i}` for `i = 0..=d+1`. Commitments are formed as
//! multi-scalar multiplications of polynomial coefficients against these
//! powers, so neither the accumulator nor any verifier ever needs the secret
//! point itself. The secrets stay readable on this object for test
//! cross-checks; a production deployment would zeroize them after
//! `generate_powers`.

use crate::error::{AccumulatorError, Result};
use crate::{Fr, G1Affine, G1Projective, G2Affine, G2Projective};
use ark_ec::msm::VariableBaseMSM;
use ark_ec::{AffineCurve, ProjectiveCurve};
use ark_ff::{Field, One, PrimeField, Zero};
use ark_poly::univariate::DensePolynomial;
use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

/// Default maximum set size; the power tables run one degree past it.
pub const DEFAULT_DEGREE_BOUND: usize = 1000;

const G1_DOMAIN_TAG: &[u8] = b"expressive_generator_g1";
const G2_DOMAIN_TAG: &[u8] = b"expressive_generator_g2";
const SECRET_S_DOMAIN_TAG: &[u8] = b"expressive_secret_s";
const SECRET_R_DOMAIN_TAG: &[u8] = b"expressive_secret_r";

// Enough hash output to cover the base field of each group (48 bytes for
// G1's Fq, 96 for G2's Fq2) plus the point flags.
const G1_HASH_BYTES: usize = 64;
const G2_HASH_BYTES: usize = 128;

/// Configuration for deriving a trusted setup deterministically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupConfig {
    /// Seed string the secret point `s` is derived from.
    pub secret_s_seed: String,
    /// Seed string the auxiliary secret `r` is derived from.
    pub secret_r_seed: String,
    /// Maximum supported set size; must exceed every set the accumulators
    /// will hold.
    pub degree: usize,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            secret_s_seed: "expressive-acc setup secret s".to_string(),
            secret_r_seed: "expressive-acc setup secret r".to_string(),
            degree: DEFAULT_DEGREE_BOUND,
        }
    }
}

/// Holder of the setup secrets and the published SRS powers.
#[derive(Debug, Clone)]
pub struct TrustedSetup {
    secret_s: Fr,
    secret_r: Fr,
    degree: usize,
    g1_generator: G1Affine,
    g2_generator: G2Affine,
    g1_s_powers: Vec<G1Affine>,
    g2_s_powers: Vec<G2Affine>,
}

impl TrustedSetup {
    /// Stores the secrets and bound. Powers are computed separately by
    /// [`generate_powers`](Self::generate_powers).
    pub fn new(secret_s: Fr, secret_r: Fr, degree: usize) -> Result<Self> {
        if secret_s.is_zero() {
            return Err(AccumulatorError::ZeroSecret);
        }
        Ok(Self {
            secret_s,
            secret_r,
            degree,
            g1_generator: G1Affine::zero(),
            g2_generator: G2Affine::zero(),
            g1_s_powers: Vec::new(),
            g2_s_powers: Vec::new(),
        })
    }

    /// Derives the secrets from the configured seeds and generates the
    /// powers in one step.
    pub fn from_config(config: &SetupConfig) -> Result<Self> {
        let s = hash_to_scalar(SECRET_S_DOMAIN_TAG, config.secret_s_seed.as_bytes());
        let r = hash_to_scalar(SECRET_R_DOMAIN_TAG, config.secret_r_seed.as_bytes());
        let mut setup = Self::new(s, r, config.degree)?;
        setup.generate_powers();
        Ok(setup)
    }

    /// Derives the generators and computes both power tables,
    /// `g^{s^i}` for `i = 0..=degree+1`.
    pub fn generate_powers(&mut self) {
        self.g1_generator = hash_to_group::<G1Affine>(G1_DOMAIN_TAG, G1_HASH_BYTES);
        self.g2_generator = hash_to_group::<G2Affine>(G2_DOMAIN_TAG, G2_HASH_BYTES);

        let count = self.degree + 2;
        let mut g1_powers = Vec::with_capacity(count);
        let mut g2_powers = Vec::with_capacity(count);
        let mut s_power = Fr::one();
        for _ in 0..count {
            g1_powers.push(self.g1_generator.mul(s_power.into_repr()));
            g2_powers.push(self.g2_generator.mul(s_power.into_repr()));
            s_power *= self.secret_s;
        }
        self.g1_s_powers = G1Projective::batch_normalization_into_affine(&g1_powers);
        self.g2_s_powers = G2Projective::batch_normalization_into_affine(&g2_powers);
        debug!(
            "trusted setup generated {} powers per group (degree bound {})",
            count, self.degree
        );
    }

    pub fn secret_s(&self) -> Fr {
        self.secret_s
    }

    pub fn secret_r(&self) -> Fr {
        self.secret_r
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// G1 generator; meaningful once the powers have been generated.
    pub fn g1_generator(&self) -> G1Affine {
        self.g1_generator
    }

    /// G2 generator; meaningful once the powers have been generated.
    pub fn g2_generator(&self) -> G2Affine {
        self.g2_generator
    }

    /// `g1^{s^i}`. Errors past the `degree + 1` bound.
    pub fn g1_s_pow(&self, i: usize) -> Result<G1Affine> {
        if self.g1_s_powers.is_empty() {
            return Err(AccumulatorError::PowersNotGenerated);
        }
        self.g1_s_powers
            .get(i)
            .copied()
            .ok_or(AccumulatorError::PowerOutOfRange {
                index: i,
                max: self.degree + 1,
            })
    }

    /// `g2^{s^i}`. Errors past the `degree + 1` bound.
    pub fn g2_s_pow(&self, i: usize) -> Result<G2Affine> {
        if self.g2_s_powers.is_empty() {
            return Err(AccumulatorError::PowersNotGenerated);
        }
        self.g2_s_powers
            .get(i)
            .copied()
            .ok_or(AccumulatorError::PowerOutOfRange {
                index: i,
                max: self.degree + 1,
            })
    }

    /// Commits to a polynomial in G1 as `g1^{p(s)}`, by multi-scalar
    /// multiplication of its coefficients against the published powers.
    pub fn commit_g1(&self, poly: &DensePolynomial<Fr>) -> Result<G1Affine> {
        commit_in(&self.g1_s_powers, poly, self.degree)
    }

    /// Commits to a polynomial in G2 as `g2^{p(s)}`.
    pub fn commit_g2(&self, poly: &DensePolynomial<Fr>) -> Result<G2Affine> {
        commit_in(&self.g2_s_powers, poly, self.degree)
    }

    /// `g1^{s - x}`, assembled from public powers only.
    pub fn g1_s_minus(&self, x: Fr) -> Result<G1Affine> {
        let g1_s = self.g1_s_pow(1)?;
        Ok((g1_s.into_projective() - self.g1_generator.mul(x.into_repr())).into_affine())
    }
}

fn commit_in<G: AffineCurve<ScalarField = Fr>>(
    powers: &[G],
    poly: &DensePolynomial<Fr>,
    degree: usize,
) -> Result<G> {
    if powers.is_empty() {
        return Err(AccumulatorError::PowersNotGenerated);
    }
    if poly.is_zero() {
        // g^0, the group identity.
        return Ok(G::zero());
    }
    if poly.coeffs.len() > powers.len() {
        return Err(AccumulatorError::DegreeOutOfRange {
            degree: poly.coeffs.len() - 1,
            max: degree + 1,
        });
    }
    let scalars: Vec<<Fr as PrimeField>::BigInt> =
        poly.coeffs.iter().map(|c| c.into_repr()).collect();
    Ok(VariableBaseMSM::multi_scalar_mul(&powers[..scalars.len()], &scalars).into_affine())
}

/// Hashes a domain tag to a nonzero scalar, counter-style.
fn hash_to_scalar(domain_tag: &[u8], seed: &[u8]) -> Fr {
    let mut counter: u32 = 0;
    loop {
        let mut hasher = Sha256::new();
        hasher.update(domain_tag);
        hasher.update(seed);
        hasher.update(counter.to_le_bytes());
        let digest = hasher.finalize();
        if let Some(scalar) = Fr::from_random_bytes(&digest) {
            if !scalar.is_zero() {
                return scalar;
            }
        }
        counter += 1;
    }
}

/// Try-and-increment hashing of a fixed domain tag onto a prime-order
/// subgroup: expand the tag to enough bytes for an x-coordinate candidate,
/// decompress, clear the cofactor, retry on failure.
fn hash_to_group<G: AffineCurve>(domain_tag: &[u8], byte_len: usize) -> G {
    let mut counter: u32 = 0;
    loop {
        let bytes = expand_tag(domain_tag, counter, byte_len);
        if let Some(candidate) = G::from_random_bytes(&bytes) {
            let point = candidate.mul_by_cofactor();
            if !point.is_zero() {
                return point;
            }
        }
        counter += 1;
    }
}

fn expand_tag(domain_tag: &[u8], counter: u32, byte_len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(byte_len);
    let mut block: u32 = 0;
    while out.len() < byte_len {
        let mut hasher = Sha256::new();
        hasher.update(domain_tag);
        hasher.update(counter.to_le_bytes());
        hasher.update(block.to_le_bytes());
        out.extend_from_slice(&hasher.finalize());
        block += 1;
    }
    out.truncate(byte_len);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poly::poly_from_roots;
    use ark_poly::{Polynomial, UVPolynomial};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn small_setup(degree: usize) -> TrustedSetup {
        let config = SetupConfig {
            degree,
            ..Default::default()
        };
        TrustedSetup::from_config(&config).unwrap()
    }

    #[test]
    fn test_power_table_shape() {
        init_logger();
        let setup = small_setup(10);
        // Powers run 0..=degree+1, i.e. degree+2 entries.
        assert!(setup.g1_s_pow(11).is_ok());
        assert_eq!(
            setup.g1_s_pow(12),
            Err(AccumulatorError::PowerOutOfRange { index: 12, max: 11 })
        );
        assert_eq!(
            setup.g2_s_pow(12),
            Err(AccumulatorError::PowerOutOfRange { index: 12, max: 11 })
        );
    }

    #[test]
    fn test_powers_not_generated() {
        let setup = TrustedSetup::new(Fr::from(3u64), Fr::from(5u64), 4).unwrap();
        assert_eq!(setup.g2_s_pow(0), Err(AccumulatorError::PowersNotGenerated));
        let poly = poly_from_roots(&[Fr::from(1u64)]);
        assert_eq!(
            setup.commit_g1(&poly),
            Err(AccumulatorError::PowersNotGenerated)
        );
    }

    #[test]
    fn test_zero_secret_rejected() {
        assert_eq!(
            TrustedSetup::new(Fr::zero(), Fr::one(), 4).err(),
            Some(AccumulatorError::ZeroSecret)
        );
    }

    #[test]
    fn test_generators_are_independent() {
        init_logger();
        let setup = small_setup(2);
        assert!(!setup.g1_generator().is_zero());
        assert!(!setup.g2_generator().is_zero());
        // Power 0 is the generator itself, power 1 is g^s.
        assert_eq!(setup.g1_s_pow(0).unwrap(), setup.g1_generator());
        assert_eq!(setup.g2_s_pow(0).unwrap(), setup.g2_generator());
        assert_ne!(setup.g1_s_pow(1).unwrap(), setup.g1_generator());
    }

    #[test]
    fn test_commit_matches_secret_evaluation() {
        init_logger();
        let setup = small_setup(8);
        let poly = poly_from_roots(&[Fr::from(2u64), Fr::from(4u64), Fr::from(6u64)]);

        let committed = setup.commit_g1(&poly).unwrap();
        let evaluated = setup
            .g1_generator()
            .mul(poly.evaluate(&setup.secret_s()).into_repr())
            .into_affine();
        assert_eq!(committed, evaluated);

        let committed = setup.commit_g2(&poly).unwrap();
        let evaluated = setup
            .g2_generator()
            .mul(poly.evaluate(&setup.secret_s()).into_repr())
            .into_affine();
        assert_eq!(committed, evaluated);
    }

    #[test]
    fn test_commit_degree_bound() {
        init_logger();
        let setup = small_setup(3);
        // Degree 4 = bound + 1 is the last committable degree.
        let roots: Vec<Fr> = (1..=4u64).map(Fr::from).collect();
        assert!(setup.commit_g1(&poly_from_roots(&roots)).is_ok());

        let roots: Vec<Fr> = (1..=5u64).map(Fr::from).collect();
        assert_eq!(
            setup.commit_g1(&poly_from_roots(&roots)),
            Err(AccumulatorError::DegreeOutOfRange { degree: 5, max: 4 })
        );
    }

    #[test]
    fn test_commit_zero_polynomial_is_identity() {
        init_logger();
        let setup = small_setup(2);
        let zero = DensePolynomial::from_coefficients_vec(vec![]);
        assert_eq!(setup.commit_g1(&zero).unwrap(), G1Affine::zero());
    }

    #[test]
    fn test_g1_s_minus() {
        init_logger();
        let setup = small_setup(2);
        let x = Fr::from(9u64);
        let expected = setup
            .g1_generator()
            .mul((setup.secret_s() - x).into_repr())
            .into_affine();
        assert_eq!(setup.g1_s_minus(x).unwrap(), expected);
    }

    #[test]
    fn test_config_round_trip() {
        let config = SetupConfig {
            degree: 64,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let restored: SetupConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.degree, 64);
        assert_eq!(restored.secret_s_seed, config.secret_s_seed);

        // Same seeds, same setup.
        let a = TrustedSetup::from_config(&config).unwrap();
        let b = TrustedSetup::from_config(&restored).unwrap();
        assert_eq!(a.secret_s(), b.secret_s());
        assert_eq!(a.g1_s_pow(1).unwrap(), b.g1_s_pow(1).unwrap());
    }
}
