//! The Poseidon round function itself: s-box, round-constant addition, and
//! MDS mixing, composed into a full permutation over a width-`t` state.

use ark_bn254::Fr;

use super::params::{params_for, PoseidonParams};

fn sbox(x: Fr) -> Fr {
    let x2 = x * x;
    let x4 = x2 * x2;
    x4 * x
}

fn mds_multiply(state: &[Fr], mds: &[Vec<Fr>]) -> Vec<Fr> {
    mds.iter()
        .map(|row| row.iter().zip(state.iter()).map(|(m, s)| *m * *s).sum())
        .collect()
}

/// Runs the full Poseidon permutation on `state` in place.
///
/// `state.len()` must equal `t`. Round structure: `Rf` full rounds (s-box on
/// every element), `RP` partial rounds (s-box on element 0 only), `Rf` full
/// rounds again — each round followed by an MDS multiply, each round
/// preceded by adding the next `t` round constants.
pub fn permute(state: &mut [Fr]) {
    let t = state.len();
    let params: &PoseidonParams = params_for(t)
        .unwrap_or_else(|| panic!("unsupported Poseidon width t={t}"));

    let total_rounds = 2 * params.rf + params.rp;
    let mut rc_idx = 0usize;

    for round in 0..total_rounds {
        for s in state.iter_mut() {
            *s += params.round_constants[rc_idx];
            rc_idx += 1;
        }

        let is_full_round = round < params.rf || round >= params.rf + params.rp;
        if is_full_round {
            for s in state.iter_mut() {
                *s = sbox(*s);
            }
        } else {
            state[0] = sbox(state[0]);
        }

        let mixed = mds_multiply(state, &params.mds);
        state.copy_from_slice(&mixed);
    }

    assert_eq!(rc_idx, params.round_constant_count());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permutation_is_deterministic() {
        let mut a = vec![Fr::from(0u64), Fr::from(0u64), Fr::from(0u64)];
        let mut b = a.clone();
        permute(&mut a);
        permute(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn permutation_changes_all_zero_state() {
        let mut state = vec![Fr::from(0u64); 3];
        permute(&mut state);
        assert_ne!(state[0], Fr::from(0u64));
    }

    #[test]
    #[should_panic(expected = "unsupported Poseidon width")]
    fn rejects_unsupported_width() {
        let mut state = vec![Fr::from(0u64)];
        permute(&mut state);
    }
}
