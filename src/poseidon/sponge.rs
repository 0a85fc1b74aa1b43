//! The two sponge constructions built on top of the raw permutation:
//! `poseidon_hash` (fixed-arity, capacity-prefixed) and `linear_hash_many`
//! (variable-length, zero-suffix-padded, chained through a `(arity-1)`-wide
//! rate).

use ark_bn254::Fr;

use super::permutation::permute;
use crate::error::VerifierError;

pub const DEFAULT_LINEAR_ARITY: usize = 16;

/// `poseidon_hash(inputs, arity) -> Fr`.
///
/// Builds the state `[0] ++ inputs` (length `arity + 1`, the leading zero is
/// the capacity / domain-separation element), permutes, and returns the
/// first state element. `inputs.len()` must equal `arity`.
pub fn poseidon_hash(inputs: &[Fr], arity: usize) -> Result<Fr, VerifierError> {
    if inputs.len() != arity {
        return Err(VerifierError::StructuralMismatch(format!(
            "poseidon_hash: expected {arity} inputs, got {}",
            inputs.len()
        )));
    }
    let mut state = Vec::with_capacity(arity + 1);
    state.push(Fr::from(0u64));
    state.extend_from_slice(inputs);
    permute(&mut state);
    Ok(state[0])
}

/// `linear_hash_many(inputs, arity=16) -> Fr`, a sponge in "linear" mode.
///
/// Absorbs fresh material one block at a time through a `(arity - 1)`-wide
/// rate. The padding convention is zero-suffix with no length field: this is
/// a protocol commitment, not an omission, and MUST be reproduced exactly —
/// appending trailing zeros to `inputs` changes the digest only up to the
/// point where it no longer fits in the same number of blocks.
pub fn linear_hash_many(inputs: &[Fr], arity: usize) -> Result<Fr, VerifierError> {
    if arity < 2 {
        return Err(VerifierError::OutOfRange(format!(
            "linear_hash_many: arity must be >= 2, got {arity}"
        )));
    }

    if inputs.len() <= arity {
        let mut block = inputs.to_vec();
        block.resize(arity, Fr::from(0u64));
        return poseidon_hash(&block, arity);
    }

    let mut remaining = inputs;
    let first_block = &remaining[..arity];
    let mut h = poseidon_hash(first_block, arity)?;
    remaining = &remaining[arity..];

    while !remaining.is_empty() {
        let take = (arity - 1).min(remaining.len());
        let mut block = Vec::with_capacity(arity);
        block.push(h);
        block.extend_from_slice(&remaining[..take]);
        block.resize(arity, Fr::from(0u64));
        h = poseidon_hash(&block, arity)?;
        remaining = &remaining[take..];
    }

    Ok(h)
}

/// `linear_hash_many` with the protocol's default rate of 16.
pub fn linear_hash_many_default(inputs: &[Fr]) -> Result<Fr, VerifierError> {
    linear_hash_many(inputs, DEFAULT_LINEAR_ARITY)
}
