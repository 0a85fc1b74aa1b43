//! Anonymity-set snapshot hashing: commits an ordered list of
//! `(address, balances)` pairs to a single `Fr` via two `linear_hash_many`
//! passes (balances, then addresses) combined with one `poseidon_hash`.

use ark_bn254::Fr;

use crate::address::{address_to_registers, AnonsetType};
use crate::balance::{balance_orders, snapshot_precision_to_proof_precision, BALANCE_DIMENSION};
use crate::error::VerifierError;
use crate::poseidon::{linear_hash_many_default, poseidon_hash};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PublicAddressInfo {
    pub address: String,
    /// Snapshot-precision balances, canonical order (index 0 = BTC, 1 = ETH,
    /// 2..17 reserved), length `BALANCE_DIMENSION`.
    pub balances: Vec<u128>,
}

/// Computes the anonset commitment for `anonset` under `anonset_type`.
///
/// Steps, in order: flatten and scale every balance to proof precision and
/// `linear_hash_many` the result; flatten every address's registers and
/// `linear_hash_many` those; combine the two digests with one
/// `poseidon_hash([balances_hash, addrs_hash], 2)`.
pub fn get_anonset_hash(
    anonset: &[PublicAddressInfo],
    anonset_type: AnonsetType,
    npubaddrs: usize,
) -> Result<Fr, VerifierError> {
    if anonset.len() != npubaddrs {
        return Err(VerifierError::StructuralMismatch(format!(
            "anonset length {} does not match expected length {npubaddrs}",
            anonset.len()
        )));
    }

    let orders = balance_orders();
    let mut anonset_balances = Vec::with_capacity(npubaddrs * BALANCE_DIMENSION);
    for info in anonset {
        if info.balances.len() != BALANCE_DIMENSION {
            return Err(VerifierError::StructuralMismatch(format!(
                "address {} has {} balances, expected {BALANCE_DIMENSION}",
                info.address,
                info.balances.len()
            )));
        }
        for (j, &snapshot_balance) in info.balances.iter().enumerate() {
            let proof_balance =
                snapshot_precision_to_proof_precision(&orders[j], snapshot_balance);
            anonset_balances.push(Fr::from(proof_balance));
        }
    }
    let balances_hash = linear_hash_many_default(&anonset_balances)?;

    let register_count = anonset_type.register_count();
    let mut flat_addrs = Vec::with_capacity(npubaddrs * register_count);
    for info in anonset {
        let regs = address_to_registers(&info.address, anonset_type)?;
        flat_addrs.extend(regs);
    }
    let addrs_hash = linear_hash_many_default(&flat_addrs)?;

    poseidon_hash(&[balances_hash, addrs_hash], 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_balances() -> Vec<u128> {
        vec![0; BALANCE_DIMENSION]
    }

    #[test]
    fn anonset_hash_is_deterministic_across_runs() {
        let anonset = vec![
            PublicAddressInfo {
                address: "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa".to_string(),
                balances: zero_balances(),
            },
            PublicAddressInfo {
                address: "3P14159f73E4gFr7JterCCQh9QjiTjiZrG".to_string(),
                balances: zero_balances(),
            },
        ];
        let h1 = get_anonset_hash(&anonset, AnonsetType::BtcPubkey, 2).unwrap();
        let h2 = get_anonset_hash(&anonset, AnonsetType::BtcPubkey, 2).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn anonset_hash_rejects_length_mismatch() {
        let anonset = vec![PublicAddressInfo {
            address: "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa".to_string(),
            balances: zero_balances(),
        }];
        assert!(get_anonset_hash(&anonset, AnonsetType::BtcPubkey, 2).is_err());
    }

    #[test]
    fn anonset_hash_changes_with_balance() {
        let mut anonset = vec![PublicAddressInfo {
            address: "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa".to_string(),
            balances: zero_balances(),
        }];
        let h1 = get_anonset_hash(&anonset, AnonsetType::BtcPubkey, 1).unwrap();
        anonset[0].balances[0] = 1;
        let h2 = get_anonset_hash(&anonset, AnonsetType::BtcPubkey, 1).unwrap();
        assert_ne!(h1, h2);
    }
}
