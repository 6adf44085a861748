//! Bilinear-pairing set accumulator with exact intersection proofs.
//!
//! Commits a finite set of integers to a short digest `g^{P_S(s)}` over
//! BLS12-381, where `P_S(z) = prod_{x in S} (z - x)` is the characteristic
//! polynomial of the set, and produces constant-size, publicly verifiable
//! proofs of membership, dynamic update (add/delete) and exact set
//! intersection between two digests.
//!
//! The intersection argument combines two quotient-polynomial subset checks
//! with a Bezout-identity disjointness check: for `I = A ∩ B` the prover
//! exhibits `Q_A = P_A / P_I`, `Q_B = P_B / P_I` and cofactors `a, b` with
//! `a·Q_A + b·Q_B = 1`. The three pairing equations together pin the claimed
//! intersection exactly: it can neither be grown (a subset check fails) nor
//! shrunk (the leftover common factor makes the Bezout identity unsatisfiable).
//!
//! ```
//! use expressive_acc::{Accumulator, DigestGroup, SetupConfig, TrustedSetup};
//! use expressive_acc::generate_intersection_proof;
//!
//! let config = SetupConfig { degree: 16, ..Default::default() };
//! let setup = TrustedSetup::from_config(&config).unwrap();
//!
//! let mut a = Accumulator::new(&setup, DigestGroup::G1).unwrap();
//! let mut b = Accumulator::new(&setup, DigestGroup::G1).unwrap();
//! for x in [1, 3, 5] {
//!     a.add(x);
//! }
//! for x in [3, 5, 8] {
//!     b.add(x);
//! }
//!
//! let proof = generate_intersection_proof(&a, &b);
//! assert!(proof.verify(&a.digest_g1(), &b.digest_g1(), &setup));
//! ```

pub mod accumulator;
pub mod error;
pub mod intersection;
pub mod poly;
mod ser;
pub mod setup;

pub use accumulator::{
    Accumulator, Digest, DigestGroup, MembershipProof, UpdateOperation, UpdateProof,
};
pub use error::{AccumulatorError, Result};
pub use intersection::{generate_intersection_proof, IntersectionProof};
pub use setup::{SetupConfig, TrustedSetup, DEFAULT_DEGREE_BOUND};

/// The pairing engine everything in this crate is instantiated over.
pub type Curve = ark_bls12_381::Bls12_381;
/// Scalar field of the curve (255-bit prime order).
pub type Fr = ark_bls12_381::Fr;
/// First source group, affine representation. Digests live here.
pub type G1Affine = ark_bls12_381::G1Affine;
/// First source group, projective representation.
pub type G1Projective = ark_bls12_381::G1Projective;
/// Second source group, affine representation. Witnesses live here.
pub type G2Affine = ark_bls12_381::G2Affine;
/// Second source group, projective representation.
pub type G2Projective = ark_bls12_381::G2Projective;
