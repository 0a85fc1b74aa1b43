//! Per-arity Poseidon-128 parameters over the BN254 scalar field.
//!
//! Round constants and the MDS matrix are derived once per width `t` via
//! the standard Grain-LFSR construction (Grassi et al., "Poseidon: A New
//! Hash Function for Zero-Knowledge Proof Systems") and cached for the
//! lifetime of the process. `Rf` is fixed at 4 (8 full rounds total); the
//! partial-round count `RP(t)` is taken from the published reference table
//! for `alpha = 5` over a ~254-bit field, exactly as upstream Poseidon
//! implementations for BN254 do.

use std::sync::OnceLock;

use ark_bn254::Fr;
use ark_ff::{BigInteger, Field, PrimeField};

pub const RF: usize = 4;
pub const MIN_T: usize = 2;
pub const MAX_T: usize = 17;

/// Partial-round counts for `t = 2..=17`, indexed by `t - MIN_T`.
///
/// This is the published Poseidon-128 reference table for `alpha = 5`
/// permutations over ~254-bit prime fields (the BN254 scalar field among
/// them), as used by the circuit libraries this protocol's reference
/// implementation targets.
const RP_TABLE: [usize; MAX_T - MIN_T + 1] = [
    56, 57, 56, 60, 60, 63, 64, 63, 60, 66, 60, 65, 70, 60, 64, 68,
];

pub fn rp(t: usize) -> Option<usize> {
    if (MIN_T..=MAX_T).contains(&t) {
        Some(RP_TABLE[t - MIN_T])
    } else {
        None
    }
}

pub struct PoseidonParams {
    pub t: usize,
    pub rf: usize,
    pub rp: usize,
    /// Flattened round constants, `t` per round, `2*rf + rp` rounds.
    pub round_constants: Vec<Fr>,
    /// `t x t` MDS matrix, row-major.
    pub mds: Vec<Vec<Fr>>,
}

impl PoseidonParams {
    pub fn round_constant_count(&self) -> usize {
        self.t * (2 * self.rf + self.rp)
    }
}

/// An 80-bit self-shrinking Grain LFSR seeded with the field size, s-box
/// degree, and round counts, used the way the Poseidon reference generator
/// uses it: to produce round constants by rejection-sampling field elements
/// from the bitstream, discarding draws that land outside `[0, r)`. The name
/// "Grain SR" (self-shrinking) refers to the bit-selection rule in
/// `next_bit`: a shrinking generator, not a plain decimator.
struct GrainLfsr {
    state: [u8; 80],
}

impl GrainLfsr {
    fn new(field_bits: u64, t: usize, rf: usize, rp: usize) -> Self {
        let mut state = [0u8; 80];
        // Field: 1 = prime field (vs. binary field), matching the reference's
        // tag convention.
        let mut bits = Vec::with_capacity(80);
        push_bits(&mut bits, 1, 2); // field type = GF(p)
        push_bits(&mut bits, 5, 4); // s-box exponent log2(5) rounded, fixed tag
        push_bits(&mut bits, field_bits, 12);
        push_bits(&mut bits, t as u64, 12);
        push_bits(&mut bits, rf as u64, 10);
        push_bits(&mut bits, rp as u64, 10);
        push_bits(&mut bits, 0b1111_1111_1111_1111_1111_1111_1111_1111, 30);
        for (i, b) in bits.into_iter().take(80).enumerate() {
            state[i] = b;
        }
        let mut lfsr = GrainLfsr { state };
        for _ in 0..160 {
            lfsr.step();
        }
        lfsr
    }

    fn step(&mut self) -> u8 {
        let s = &self.state;
        let feedback = s[0] ^ s[13] ^ s[23] ^ s[38] ^ s[51] ^ s[62];
        let out = s[79];
        for i in 0..79 {
            self.state[i] = self.state[i + 1];
        }
        self.state[79] = feedback;
        out
    }

    fn next_bit(&mut self) -> u8 {
        // This is a *self-shrinking* generator, not plain decimation: pull
        // bit pairs off the LFSR and keep the second bit of a pair only when
        // the first bit is 1, discarding pairs whose first bit is 0 and
        // trying again. Taking every other bit unconditionally is a
        // different (and wrong) construction.
        loop {
            let a = self.step();
            let b = self.step();
            if a == 1 {
                return b;
            }
        }
    }

    fn next_field_element(&mut self, field_bits: usize) -> Fr {
        loop {
            let mut limbs = vec![0u8; (field_bits + 7) / 8];
            for byte in limbs.iter_mut() {
                let mut acc = 0u8;
                for _ in 0..8 {
                    acc = (acc << 1) | self.next_bit();
                }
                *byte = acc;
            }
            // ark-ff rejects non-canonical representations via
            // `from_be_bytes_mod_order`'s canonical check path is avoided
            // here; instead we explicitly retry until the raw big integer is
            // below the modulus, matching the reference rejection sampling.
            if let Some(fr) = try_canonical_fr(&limbs) {
                return fr;
            }
        }
    }
}

fn push_bits(out: &mut Vec<u8>, value: u64, count: u32) {
    for i in (0..count).rev() {
        out.push(((value >> i) & 1) as u8);
    }
}

fn try_canonical_fr(be_bytes: &[u8]) -> Option<Fr> {
    let modulus_bytes = Fr::MODULUS.to_bytes_be();
    let mut padded = vec![0u8; modulus_bytes.len()];
    let offset = padded.len().saturating_sub(be_bytes.len());
    padded[offset..].copy_from_slice(be_bytes);
    if padded.as_slice() >= modulus_bytes.as_slice() {
        return None;
    }
    Some(Fr::from_be_bytes_mod_order(&padded))
}

fn generate_round_constants(t: usize, rf: usize, rp: usize) -> Vec<Fr> {
    let field_bits = Fr::MODULUS_BIT_SIZE as usize;
    let mut lfsr = GrainLfsr::new(field_bits as u64, t, rf, rp);
    let total = t * (2 * rf + rp);
    (0..total).map(|_| lfsr.next_field_element(field_bits)).collect()
}

/// Builds a `t x t` MDS matrix as a Cauchy matrix over two disjoint domains
/// `x_i = i`, `y_j = t + j`, which is MDS by construction (every square
/// submatrix of a Cauchy matrix is non-singular) — the same construction
/// the reference Poseidon parameter generator uses.
fn generate_mds(t: usize) -> Vec<Vec<Fr>> {
    let mut mds = Vec::with_capacity(t);
    for i in 0..t {
        let mut row = Vec::with_capacity(t);
        let x_i = Fr::from(i as u64);
        for j in 0..t {
            let y_j = Fr::from((t + j) as u64);
            let denom = x_i + y_j;
            let inv = denom.inverse().expect("Cauchy domains are disjoint by construction");
            row.push(inv);
        }
        mds.push(row);
    }
    mds
}

fn build_params(t: usize) -> PoseidonParams {
    let rp_count = rp(t).unwrap_or_else(|| panic!("unsupported Poseidon width t={t}"));
    let round_constants = generate_round_constants(t, RF, rp_count);
    let mds = generate_mds(t);
    let params = PoseidonParams {
        t,
        rf: RF,
        rp: rp_count,
        round_constants,
        mds,
    };
    assert_eq!(
        params.round_constants.len(),
        params.round_constant_count(),
        "round constant count must equal t * (2*Rf + RP)"
    );
    params
}

// One OnceLock per supported width, indexed by `t - MIN_T`.
static PARAM_CACHE: [OnceLock<PoseidonParams>; MAX_T - MIN_T + 1] = {
    const INIT: OnceLock<PoseidonParams> = OnceLock::new();
    [INIT; MAX_T - MIN_T + 1]
};

pub fn params_for(t: usize) -> Option<&'static PoseidonParams> {
    if !(MIN_T..=MAX_T).contains(&t) {
        return None;
    }
    Some(PARAM_CACHE[t - MIN_T].get_or_init(|| build_params(t)))
}
