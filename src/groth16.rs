//! Groth16 pairing-based proof verification on BN254, restricted to exactly
//! one non-constant public input — the `pubhash` reconstructed by
//! `crate::pubhash`.

use ark_bn254::{Bn254, Fr, G1Affine, G2Affine};
use ark_ec::pairing::{Pairing, PairingOutput};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{PrimeField, Zero};

use crate::curve::{g1_from_decimal, g2_from_decimal_swapped, parse_fr};
use crate::error::VerifierError;

#[derive(Debug, Clone, Copy)]
pub struct Proof {
    pub a: G1Affine,
    pub b: G2Affine,
    pub c: G1Affine,
}

impl Proof {
    /// Decodes a proof from decimal-string coordinates. `b` is given in the
    /// wire's `[c1, c0]` per-coordinate order; see `crate::curve`.
    pub fn from_decimal(
        a: (&str, &str),
        b: ([&str; 2], [&str; 2]),
        c: (&str, &str),
    ) -> Result<Self, VerifierError> {
        Ok(Proof {
            a: g1_from_decimal(a.0, a.1)?,
            b: g2_from_decimal_swapped(b.0, b.1)?,
            c: g1_from_decimal(c.0, c.1)?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VerifyingKey {
    pub alpha1: G1Affine,
    pub beta2: G2Affine,
    pub gamma2: G2Affine,
    pub delta2: G2Affine,
    pub ic0: G1Affine,
    pub ic1: G1Affine,
}

impl VerifyingKey {
    #[allow(clippy::too_many_arguments)]
    pub fn from_decimal(
        alpha1: (&str, &str),
        beta2: ([&str; 2], [&str; 2]),
        gamma2: ([&str; 2], [&str; 2]),
        delta2: ([&str; 2], [&str; 2]),
        ic0: (&str, &str),
        ic1: (&str, &str),
    ) -> Result<Self, VerifierError> {
        Ok(VerifyingKey {
            alpha1: g1_from_decimal(alpha1.0, alpha1.1)?,
            beta2: g2_from_decimal_swapped(beta2.0, beta2.1)?,
            gamma2: g2_from_decimal_swapped(gamma2.0, gamma2.1)?,
            delta2: g2_from_decimal_swapped(delta2.0, delta2.1)?,
            ic0: g1_from_decimal(ic0.0, ic0.1)?,
            ic1: g1_from_decimal(ic1.0, ic1.1)?,
        })
    }

    /// Builds from the wire's full `IC` array, taking only `IC[0]`/`IC[1]`
    /// (this verifier supports exactly one non-constant public input).
    /// Rejects an `IC` array shorter than two entries, matching the
    /// "wrong vk IC length" `StructuralMismatch` case named in spec §7.
    pub fn from_decimal_ic_array(
        alpha1: (&str, &str),
        beta2: ([&str; 2], [&str; 2]),
        gamma2: ([&str; 2], [&str; 2]),
        delta2: ([&str; 2], [&str; 2]),
        ic: &[(&str, &str)],
    ) -> Result<Self, VerifierError> {
        if ic.len() < 2 {
            return Err(VerifierError::StructuralMismatch(format!(
                "verifying key IC array must have at least 2 entries, got {}",
                ic.len()
            )));
        }
        Self::from_decimal(alpha1, beta2, gamma2, delta2, ic[0], ic[1])
    }
}

/// Checks `e(-A, B) * e(alpha1, beta2) * e(vk_x, gamma2) * e(C, delta2) == 1`
/// where `vk_x = IC0 + input * IC1`. Returns `false` on pairing mismatch;
/// point-not-on-curve or out-of-range coordinates are rejected earlier, at
/// decode time, per `crate::curve`.
pub fn verify_groth16(input: Fr, proof: &Proof, vk: &VerifyingKey) -> bool {
    let vk_x = (vk.ic0.into_group() + vk.ic1.mul_bigint(input.into_bigint())).into_affine();
    let neg_a = -proof.a;

    let g1s = [neg_a, vk.alpha1, vk_x, proof.c];
    let g2s = [proof.b, vk.beta2, vk.gamma2, vk.delta2];

    let product: PairingOutput<Bn254> = Bn254::multi_pairing(g1s, g2s);
    product == PairingOutput::<Bn254>::zero()
}

/// Convenience entry point taking the public input as a decimal string (the
/// wire representation of `target_pubhash`, or the output of
/// `crate::pubhash::compute_pubhash` re-encoded).
pub fn verify_groth16_decimal(
    input: &str,
    proof: &Proof,
    vk: &VerifyingKey,
) -> Result<bool, VerifierError> {
    let x = parse_fr(input)?;
    Ok(verify_groth16(x, proof, vk))
}
