//! Exact set-intersection proofs between two accumulators.
//!
//! For `I = A ∩ B` the prover publishes `D_I = g1^{P_I(s)}` together with
//! quotient witnesses `W_QA = g2^{Q_A(s)}`, `W_QB = g2^{Q_B(s)}` and Bezout
//! witnesses `W_a = g1^{a(s)}`, `W_b = g1^{b(s)}` where
//! `a·Q_A + b·Q_B = 1`. Verification needs only the two digests, the proof,
//! and the public setup.

use crate::accumulator::Accumulator;
use crate::poly::{poly_from_set, xgcd};
use crate::setup::TrustedSetup;
use crate::{Curve, G1Affine, G2Affine};
use ark_ec::PairingEngine;
use ark_ff::Zero;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Proof that a committed set `I` is exactly the intersection of the sets
/// behind two digests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionProof {
    /// `g1^{P_I(s)}`, the digest of the claimed intersection.
    #[serde(with = "crate::ser")]
    pub intersection_digest: G1Affine,
    /// `g2^{Q_A(s)}` with `Q_A = P_A / P_I`.
    #[serde(with = "crate::ser")]
    pub witness_qa: G2Affine,
    /// `g2^{Q_B(s)}` with `Q_B = P_B / P_I`.
    #[serde(with = "crate::ser")]
    pub witness_qb: G2Affine,
    /// `g1^{a(s)}` from the Bezout identity `a·Q_A + b·Q_B = 1`.
    #[serde(with = "crate::ser")]
    pub bezout_a: G1Affine,
    /// `g1^{b(s)}` from the Bezout identity.
    #[serde(with = "crate::ser")]
    pub bezout_b: G1Affine,
    pub is_valid: bool,
}

/// Builds the intersection proof for two accumulators sharing a setup.
///
/// Partitions `S_A ∪ S_B` into `I`, `S_A ∖ I` and `S_B ∖ I`; by construction
/// `P_A = P_I · Q_A` and `P_B = P_I · Q_B`, and `Q_A`, `Q_B` are coprime
/// since their root sets are disjoint. A non-unit gcd cannot occur for these
/// inputs; if the algebra reports one anyway, or the accumulators are bound
/// to different setups, the proof comes back flagged invalid.
pub fn generate_intersection_proof(
    acc_a: &Accumulator<'_>,
    acc_b: &Accumulator<'_>,
) -> IntersectionProof {
    let invalid = IntersectionProof {
        intersection_digest: G1Affine::zero(),
        witness_qa: G2Affine::zero(),
        witness_qb: G2Affine::zero(),
        bezout_a: G1Affine::zero(),
        bezout_b: G1Affine::zero(),
        is_valid: false,
    };

    if !std::ptr::eq(acc_a.setup(), acc_b.setup()) {
        warn!("intersection proof over accumulators with different setups");
        return invalid;
    }
    let setup = acc_a.setup();

    let intersection: BTreeSet<i64> = acc_a
        .elements()
        .intersection(acc_b.elements())
        .copied()
        .collect();
    let only_a: BTreeSet<i64> = acc_a.elements().difference(&intersection).copied().collect();
    let only_b: BTreeSet<i64> = acc_b.elements().difference(&intersection).copied().collect();

    let poly_i = poly_from_set(&intersection);
    let poly_qa = poly_from_set(&only_a);
    let poly_qb = poly_from_set(&only_b);

    let commitments = setup.commit_g1(&poly_i).and_then(|intersection_digest| {
        let witness_qa = setup.commit_g2(&poly_qa)?;
        let witness_qb = setup.commit_g2(&poly_qb)?;
        Ok((intersection_digest, witness_qa, witness_qb))
    });
    let (intersection_digest, witness_qa, witness_qb) = match commitments {
        Ok(commitments) => commitments,
        Err(err) => {
            warn!("intersection commitments failed: {}", err);
            return invalid;
        }
    };

    let (gcd, cofactor_a, cofactor_b) = match xgcd(poly_qa, poly_qb) {
        Some(result) => result,
        None => {
            warn!("xgcd on zero quotient polynomials");
            return invalid;
        }
    };
    if gcd.coeffs.len() != 1 {
        // Disjoint difference sets cannot share a root; a nontrivial gcd
        // here means the inputs were not what this prover constructed.
        warn!("quotient polynomials are not coprime, gcd degree {}", gcd.coeffs.len() - 1);
        return invalid;
    }

    let bezout = setup.commit_g1(&cofactor_a).and_then(|bezout_a| {
        let bezout_b = setup.commit_g1(&cofactor_b)?;
        Ok((bezout_a, bezout_b))
    });
    let (bezout_a, bezout_b) = match bezout {
        Ok(bezout) => bezout,
        Err(err) => {
            warn!("bezout commitments failed: {}", err);
            return invalid;
        }
    };

    IntersectionProof {
        intersection_digest,
        witness_qa,
        witness_qb,
        bezout_a,
        bezout_b,
        is_valid: true,
    }
}

impl IntersectionProof {
    /// Verifies the proof against the two set digests with three pairing
    /// checks:
    ///
    /// 1. `e(D_A, g2) == e(D_I, W_QA)`: the intersection divides `P_A`,
    ///    so `I ⊆ A`.
    /// 2. `e(D_B, g2) == e(D_I, W_QB)`: symmetrically `I ⊆ B`.
    /// 3. `e(W_a, W_QA) · e(W_b, W_QB) == e(g1, g2)`: the Bezout identity
    ///    `a(s)·Q_A(s) + b(s)·Q_B(s) = 1`, so nothing outside `I` is shared.
    ///
    /// Together: `I` is exactly `A ∩ B`.
    pub fn verify(
        &self,
        digest_a: &G1Affine,
        digest_b: &G1Affine,
        setup: &TrustedSetup,
    ) -> bool {
        if !self.is_valid {
            return false;
        }
        let g1 = setup.g1_generator();
        let g2 = setup.g2_generator();

        let subset_a = Curve::pairing(*digest_a, g2)
            == Curve::pairing(self.intersection_digest, self.witness_qa);
        if !subset_a {
            return false;
        }

        let subset_b = Curve::pairing(*digest_b, g2)
            == Curve::pairing(self.intersection_digest, self.witness_qb);
        if !subset_b {
            return false;
        }

        let disjoint = Curve::pairing(self.bezout_a, self.witness_qa)
            * Curve::pairing(self.bezout_b, self.witness_qb)
            == Curve::pairing(g1, g2);
        disjoint
    }

    /// Canonical wire form: the compressed group elements concatenated in
    /// field order, then the validity flag.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.intersection_digest.serialize(&mut bytes).unwrap();
        self.witness_qa.serialize(&mut bytes).unwrap();
        self.witness_qb.serialize(&mut bytes).unwrap();
        self.bezout_a.serialize(&mut bytes).unwrap();
        self.bezout_b.serialize(&mut bytes).unwrap();
        bytes.push(self.is_valid as u8);
        bytes
    }

    /// Inverse of [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let mut reader = bytes;
        let intersection_digest = G1Affine::deserialize(&mut reader).ok()?;
        let witness_qa = G2Affine::deserialize(&mut reader).ok()?;
        let witness_qb = G2Affine::deserialize(&mut reader).ok()?;
        let bezout_a = G1Affine::deserialize(&mut reader).ok()?;
        let bezout_b = G1Affine::deserialize(&mut reader).ok()?;
        let is_valid = match reader {
            [0] => false,
            [1] => true,
            _ => return None,
        };
        Some(Self {
            intersection_digest,
            witness_qa,
            witness_qb,
            bezout_a,
            bezout_b,
            is_valid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::DigestGroup;
    use crate::setup::SetupConfig;

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

    fn accumulate<'a>(setup: &'a TrustedSetup, elements: &[i64]) -> Accumulator<'a> {
        let mut acc = Accumulator::new(setup, DigestGroup::G1).unwrap();
        for x in elements {
            acc.add(*x);
        }
        acc
    }

    #[test]
    fn test_intersection_proof_verifies() {
        init_logger();
        let setup = small_setup(16);
        let acc_a = accumulate(&setup, &[1, 3, 5, 7, 9]);
        let acc_b = accumulate(&setup, &[2, 3, 5, 8, 9]);

        let proof = generate_intersection_proof(&acc_a, &acc_b);
        assert!(proof.is_valid);
        assert!(proof.verify(&acc_a.digest_g1(), &acc_b.digest_g1(), &setup));

        // The committed intersection digest is exactly g1^{P_{3,5,9}(s)}.
        let expected = accumulate(&setup, &[3, 5, 9]);
        assert_eq!(proof.intersection_digest, expected.digest_g1());
    }

    #[test]
    fn test_intersection_is_commutative() {
        init_logger();
        let setup = small_setup(16);
        let acc_a = accumulate(&setup, &[1, 3, 5, 7]);
        let acc_b = accumulate(&setup, &[3, 4, 5, 6]);

        let ab = generate_intersection_proof(&acc_a, &acc_b);
        let ba = generate_intersection_proof(&acc_b, &acc_a);
        assert!(ab.verify(&acc_a.digest_g1(), &acc_b.digest_g1(), &setup));
        assert!(ba.verify(&acc_b.digest_g1(), &acc_a.digest_g1(), &setup));
        // Both commit to the same intersection.
        assert_eq!(ab.intersection_digest, ba.intersection_digest);
    }

    #[test]
    fn test_disjoint_sets_empty_intersection() {
        init_logger();
        let setup = small_setup(16);
        let acc_a = accumulate(&setup, &[1, 2]);
        let acc_b = accumulate(&setup, &[3, 4]);

        let proof = generate_intersection_proof(&acc_a, &acc_b);
        assert!(proof.verify(&acc_a.digest_g1(), &acc_b.digest_g1(), &setup));
        // Empty intersection commits to the constant polynomial 1.
        assert_eq!(proof.intersection_digest, setup.g1_generator());
    }

    #[test]
    fn test_identical_sets() {
        init_logger();
        let setup = small_setup(16);
        let acc_a = accumulate(&setup, &[4, 5, 6]);
        let acc_b = accumulate(&setup, &[4, 5, 6]);

        let proof = generate_intersection_proof(&acc_a, &acc_b);
        assert!(proof.verify(&acc_a.digest_g1(), &acc_b.digest_g1(), &setup));
        assert_eq!(proof.intersection_digest, acc_a.digest_g1());
    }

    #[test]
    fn test_empty_accumulators() {
        init_logger();
        let setup = small_setup(16);
        let acc_a = accumulate(&setup, &[]);
        let acc_b = accumulate(&setup, &[1]);

        let proof = generate_intersection_proof(&acc_a, &acc_b);
        assert!(proof.verify(&acc_a.digest_g1(), &acc_b.digest_g1(), &setup));
        assert_eq!(proof.intersection_digest, setup.g1_generator());
    }

    #[test]
    fn test_tampered_intersection_digest_fails() {
        init_logger();
        let setup = small_setup(16);
        let acc_a = accumulate(&setup, &[1, 3, 5, 7, 9]);
        let acc_b = accumulate(&setup, &[2, 3, 5, 8, 9]);
        let proof = generate_intersection_proof(&acc_a, &acc_b);

        // Claiming a strictly larger intersection breaks a subset check.
        let grown = accumulate(&setup, &[1, 3, 5, 9]);
        let mut tampered = proof.clone();
        tampered.intersection_digest = grown.digest_g1();
        assert!(!tampered.verify(&acc_a.digest_g1(), &acc_b.digest_g1(), &setup));

        // Claiming a strictly smaller intersection breaks at least one check.
        let shrunk = accumulate(&setup, &[3, 5]);
        let mut tampered = proof.clone();
        tampered.intersection_digest = shrunk.digest_g1();
        assert!(!tampered.verify(&acc_a.digest_g1(), &acc_b.digest_g1(), &setup));
    }

    #[test]
    fn test_tampered_witnesses_fail() {
        init_logger();
        let setup = small_setup(16);
        let acc_a = accumulate(&setup, &[1, 3, 5]);
        let acc_b = accumulate(&setup, &[3, 4, 6]);
        let proof = generate_intersection_proof(&acc_a, &acc_b);
        assert!(proof.verify(&acc_a.digest_g1(), &acc_b.digest_g1(), &setup));

        let mut tampered = proof.clone();
        tampered.witness_qa = setup.g2_generator();
        assert!(!tampered.verify(&acc_a.digest_g1(), &acc_b.digest_g1(), &setup));

        let mut tampered = proof.clone();
        tampered.witness_qb = setup.g2_generator();
        assert!(!tampered.verify(&acc_a.digest_g1(), &acc_b.digest_g1(), &setup));

        let mut tampered = proof.clone();
        tampered.bezout_a = setup.g1_generator();
        assert!(!tampered.verify(&acc_a.digest_g1(), &acc_b.digest_g1(), &setup));

        let mut tampered = proof.clone();
        tampered.bezout_b = setup.g1_generator();
        assert!(!tampered.verify(&acc_a.digest_g1(), &acc_b.digest_g1(), &setup));
    }

    #[test]
    fn test_mismatched_digests_fail() {
        init_logger();
        let setup = small_setup(16);
        let acc_a = accumulate(&setup, &[1, 3, 5]);
        let acc_b = accumulate(&setup, &[3, 4, 6]);
        let acc_c = accumulate(&setup, &[7, 8]);

        let proof = generate_intersection_proof(&acc_a, &acc_b);
        assert!(!proof.verify(&acc_c.digest_g1(), &acc_b.digest_g1(), &setup));
        assert!(!proof.verify(&acc_a.digest_g1(), &acc_c.digest_g1(), &setup));
    }

    #[test]
    fn test_mismatched_setups_yield_invalid_proof() {
        init_logger();
        let setup_one = small_setup(16);
        let setup_two = small_setup(16);
        let acc_a = accumulate(&setup_one, &[1, 2]);
        let acc_b = accumulate(&setup_two, &[2, 3]);

        let proof = generate_intersection_proof(&acc_a, &acc_b);
        assert!(!proof.is_valid);
        assert!(!proof.verify(&acc_a.digest_g1(), &acc_b.digest_g1(), &setup_one));
    }

    #[test]
    fn test_byte_round_trip() {
        init_logger();
        let setup = small_setup(16);
        let acc_a = accumulate(&setup, &[1, 3]);
        let acc_b = accumulate(&setup, &[3, 4]);
        let proof = generate_intersection_proof(&acc_a, &acc_b);

        let restored = IntersectionProof::from_bytes(&proof.to_bytes()).unwrap();
        assert_eq!(restored, proof);
        assert!(restored.verify(&acc_a.digest_g1(), &acc_b.digest_g1(), &setup));

        assert!(IntersectionProof::from_bytes(&[0u8; 3]).is_none());
    }
}
