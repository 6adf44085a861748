//! The dynamic accumulator: set state, digests, and the proofs for
//! membership and updates.

use crate::error::Result;
use crate::poly::{divide_exact, element_to_fr, poly_from_set, root_factor};
use crate::setup::TrustedSetup;
use crate::{Curve, Fr, G1Affine, G2Affine};
use ark_ec::PairingEngine;
use ark_ff::{Field, PrimeField, Zero};
use ark_poly::univariate::DensePolynomial;
use ark_serialize::CanonicalSerialize;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Neg;

/// Which source group carries the digest exposed by [`Accumulator::digest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DigestGroup {
    G1,
    G2,
}

/// Short commitment to an accumulated set, `g^{P_S(s)}` in the chosen group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Digest {
    G1(G1Affine),
    G2(G2Affine),
}

impl Digest {
    /// Canonical compressed encoding of the underlying group element.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        match self {
            Digest::G1(p) => p.serialize(&mut bytes).unwrap(),
            Digest::G2(p) => p.serialize(&mut bytes).unwrap(),
        }
        bytes
    }
}

/// A membership claim for `element` against a G1 digest.
///
/// For a member, `witness = g2^{Q(s)}` with `Q(z) = P_S(z) / (z - x)`. For a
/// non-member the claim is flagged and the witness carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipProof {
    pub is_member: bool,
    #[serde(with = "crate::ser")]
    pub witness: G2Affine,
    pub element: i64,
}

impl MembershipProof {
    /// Checks `e(D, g2) == e(g1^{s-x}, W)` against the given digest.
    ///
    /// `D = g1^{P(s)}` and `W = g2^{Q(s)}` with `Q(s)·(s-x) = P(s)`, so the
    /// equation holds exactly when the witness divides out the claimed
    /// element. Claims flagged `is_member = false` never verify.
    pub fn verify(&self, digest: &G1Affine, setup: &TrustedSetup) -> bool {
        if !self.is_member {
            return false;
        }
        let g1_s_minus_x = match setup.g1_s_minus(element_to_fr(self.element)) {
            Ok(point) => point,
            Err(_) => return false,
        };
        let lhs = Curve::pairing(*digest, setup.g2_generator());
        let rhs = Curve::pairing(g1_s_minus_x, self.witness);
        lhs == rhs
    }
}

/// Whether an update added or removed an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOperation {
    Add,
    Delete,
}

/// Proof that one add/delete transformed `old_digest` into `new_digest`.
///
/// Deletions carry the membership proof of the removed element against the
/// old digest as the right to delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProof {
    pub op: UpdateOperation,
    pub element: i64,
    #[serde(with = "crate::ser")]
    pub old_digest: G1Affine,
    #[serde(with = "crate::ser")]
    pub new_digest: G1Affine,
    pub membership_proof: Option<MembershipProof>,
    pub is_valid: bool,
}

impl UpdateProof {
    fn invalid(op: UpdateOperation, element: i64, digest: G1Affine) -> Self {
        Self {
            op,
            element,
            old_digest: digest,
            new_digest: digest,
            membership_proof: None,
            is_valid: false,
        }
    }

    /// Verifies the digest transition.
    ///
    /// Add: `e(new, g2) == e(old, g2^s) · e(old, g2)^{-x}`, the pairing form
    /// of `P_new(s) = P_old(s)·(s - x)`. Delete: the attached membership
    /// proof must hold against the old digest, then the same equation with
    /// old and new swapped.
    pub fn verify(&self, setup: &TrustedSetup) -> bool {
        if !self.is_valid {
            return false;
        }
        let g2_s = match setup.g2_s_pow(1) {
            Ok(point) => point,
            Err(_) => return false,
        };
        let g2 = setup.g2_generator();
        let x = element_to_fr(self.element);

        let (grown, shrunk) = match self.op {
            UpdateOperation::Add => (self.new_digest, self.old_digest),
            UpdateOperation::Delete => {
                let membership = match &self.membership_proof {
                    Some(proof) => proof,
                    None => return false,
                };
                if membership.element != self.element
                    || !membership.verify(&self.old_digest, setup)
                {
                    return false;
                }
                (self.old_digest, self.new_digest)
            }
        };

        let lhs = Curve::pairing(grown, g2);
        let rhs = Curve::pairing(shrunk, g2_s)
            * Curve::pairing(shrunk, g2).pow(x.neg().into_repr());
        lhs == rhs
    }
}

/// Dynamic set accumulator bound to a trusted setup.
///
/// Owns its element set, the materialized characteristic polynomial, and the
/// digests in both source groups. All mutation goes through [`add`] and
/// [`delete`], which keep `digest = g^{P_S(s)}` current and hand back update
/// proofs.
///
/// [`add`]: Self::add
/// [`delete`]: Self::delete
#[derive(Debug, Clone)]
pub struct Accumulator<'a> {
    setup: &'a TrustedSetup,
    group: DigestGroup,
    elements: BTreeSet<i64>,
    poly: DensePolynomial<Fr>,
    digest_g1: G1Affine,
    digest_g2: G2Affine,
}

impl<'a> Accumulator<'a> {
    /// Empty accumulator; its digest is the generator, the commitment to the
    /// constant polynomial `1`.
    pub fn new(setup: &'a TrustedSetup, group: DigestGroup) -> Result<Self> {
        let poly = poly_from_set(&BTreeSet::new());
        let digest_g1 = setup.commit_g1(&poly)?;
        let digest_g2 = setup.commit_g2(&poly)?;
        Ok(Self {
            setup,
            group,
            elements: BTreeSet::new(),
            poly,
            digest_g1,
            digest_g2,
        })
    }

    /// Inserts `element` and returns the update proof.
    ///
    /// Inserting a present element does not change any state; the returned
    /// trivial proof is flagged valid with `old == new`. Growing the set past
    /// the setup's degree bound is a precondition failure: the state is
    /// untouched and the proof comes back invalid.
    pub fn add(&mut self, element: i64) -> UpdateProof {
        let old_digest = self.digest_g1;
        if self.elements.contains(&element) {
            return UpdateProof {
                op: UpdateOperation::Add,
                element,
                old_digest,
                new_digest: old_digest,
                membership_proof: None,
                is_valid: true,
            };
        }
        if self.elements.len() >= self.setup.degree() {
            warn!(
                "add({}) rejected: set size {} at the setup degree bound",
                element,
                self.elements.len()
            );
            return UpdateProof::invalid(UpdateOperation::Add, element, old_digest);
        }

        let new_poly = &self.poly * &root_factor(element_to_fr(element));
        let (digest_g1, digest_g2) = match self.commit_both(&new_poly) {
            Ok(digests) => digests,
            Err(err) => {
                warn!("add({}) failed to recommit: {}", element, err);
                return UpdateProof::invalid(UpdateOperation::Add, element, old_digest);
            }
        };

        self.elements.insert(element);
        self.poly = new_poly;
        self.digest_g1 = digest_g1;
        self.digest_g2 = digest_g2;

        UpdateProof {
            op: UpdateOperation::Add,
            element,
            old_digest,
            new_digest: self.digest_g1,
            membership_proof: None,
            is_valid: true,
        }
    }

    /// Removes `element` and returns the update proof, which carries the
    /// membership proof of the element against the old digest.
    ///
    /// Deleting an absent element is a precondition failure: no state change,
    /// invalid proof.
    pub fn delete(&mut self, element: i64) -> UpdateProof {
        let old_digest = self.digest_g1;
        if !self.elements.contains(&element) {
            return UpdateProof::invalid(UpdateOperation::Delete, element, old_digest);
        }

        let membership_proof = self.prove_membership(element);
        if !membership_proof.is_member {
            return UpdateProof::invalid(UpdateOperation::Delete, element, old_digest);
        }

        let new_poly = match divide_exact(&self.poly, &root_factor(element_to_fr(element))) {
            Ok(quotient) => quotient,
            Err(err) => {
                warn!("delete({}) failed to divide out the root: {}", element, err);
                return UpdateProof::invalid(UpdateOperation::Delete, element, old_digest);
            }
        };
        let (digest_g1, digest_g2) = match self.commit_both(&new_poly) {
            Ok(digests) => digests,
            Err(err) => {
                warn!("delete({}) failed to recommit: {}", element, err);
                return UpdateProof::invalid(UpdateOperation::Delete, element, old_digest);
            }
        };

        self.elements.remove(&element);
        self.poly = new_poly;
        self.digest_g1 = digest_g1;
        self.digest_g2 = digest_g2;

        UpdateProof {
            op: UpdateOperation::Delete,
            element,
            old_digest,
            new_digest: self.digest_g1,
            membership_proof: Some(membership_proof),
            is_valid: true,
        }
    }

    /// Replaces one element with another: a delete followed by an add, with
    /// both proofs returned in that order.
    pub fn update(&mut self, old_element: i64, new_element: i64) -> (UpdateProof, UpdateProof) {
        let delete_proof = self.delete(old_element);
        if !delete_proof.is_valid {
            let add_proof = UpdateProof::invalid(UpdateOperation::Add, new_element, self.digest_g1);
            return (delete_proof, add_proof);
        }
        let add_proof = self.add(new_element);
        (delete_proof, add_proof)
    }

    /// Inserts a batch of elements, returning one proof per element.
    pub fn add_batch(&mut self, elements: &[i64]) -> Vec<UpdateProof> {
        elements.iter().map(|x| self.add(*x)).collect()
    }

    /// Membership proof for `element` against the current digest.
    ///
    /// For a member, commits the quotient `P_S(z) / (z - x)` in G2. For a
    /// non-member the proof is flagged and carries an identity witness.
    pub fn prove_membership(&self, element: i64) -> MembershipProof {
        let non_member = MembershipProof {
            is_member: false,
            witness: G2Affine::zero(),
            element,
        };
        if !self.elements.contains(&element) {
            return non_member;
        }

        let quotient = match divide_exact(&self.poly, &root_factor(element_to_fr(element))) {
            Ok(quotient) => quotient,
            Err(err) => {
                warn!("membership witness division failed for {}: {}", element, err);
                return non_member;
            }
        };
        match self.setup.commit_g2(&quotient) {
            Ok(witness) => MembershipProof {
                is_member: true,
                witness,
                element,
            },
            Err(err) => {
                warn!("membership witness commitment failed for {}: {}", element, err);
                non_member
            }
        }
    }

    /// The digest in the group chosen at construction.
    pub fn digest(&self) -> Digest {
        match self.group {
            DigestGroup::G1 => Digest::G1(self.digest_g1),
            DigestGroup::G2 => Digest::G2(self.digest_g2),
        }
    }

    /// The G1 digest the proof systems bind to.
    pub fn digest_g1(&self) -> G1Affine {
        self.digest_g1
    }

    /// The dual digest in G2.
    pub fn digest_g2(&self) -> G2Affine {
        self.digest_g2
    }

    pub fn group(&self) -> DigestGroup {
        self.group
    }

    pub fn setup(&self) -> &'a TrustedSetup {
        self.setup
    }

    pub fn elements(&self) -> &BTreeSet<i64> {
        &self.elements
    }

    /// The materialized characteristic polynomial of the current set.
    pub fn characteristic_poly(&self) -> &DensePolynomial<Fr> {
        &self.poly
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn commit_both(&self, poly: &DensePolynomial<Fr>) -> Result<(G1Affine, G2Affine)> {
        Ok((self.setup.commit_g1(poly)?, self.setup.commit_g2(poly)?))
    }
}
