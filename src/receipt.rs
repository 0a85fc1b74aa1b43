//! Receipt Merkle verification: confirms that a user's claimed liability
//! balance was included as a leaf in the Merkle tree whose root the
//! liabilities proof publicly reveals.

use ark_bn254::Fr;
use sha2::{Digest, Sha512};

use crate::balance::{account_precision_to_proof_precision, balance_orders, unformat_balance_value};
use crate::curve::parse_fr;
use crate::error::VerifierError;
use crate::poseidon::poseidon_hash;

const ACCT_BALANCE_BITS: u32 = 42;
const ACCT_BALANCES_PER_ELT: usize = 6;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ReceiptBalance {
    pub token: String,
    pub balance: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Receipt {
    pub username: String,
    pub nonce: String,
    /// Hex string, e.g. `"0x1a2b..."`.
    pub account_id: String,
    pub balances: Vec<ReceiptBalance>,
    /// Decimal-string `Fr` value.
    pub merkle_root: String,
    /// `;`-separated Merkle levels, each a comma-separated list of
    /// decimal-string `Fr` preimage entries.
    pub merkle_branch: String,
    pub merkle_arity: usize,
    pub merkle_leaf_hash_arity: usize,
}

/// Top 252 bits of `SHA-512(username || nonce)`, viewed big-endian.
fn calculate_account_id(username: &str, nonce: &str) -> num_bigint::BigUint {
    let mut hasher = Sha512::new();
    hasher.update(username.as_bytes());
    hasher.update(nonce.as_bytes());
    let digest = hasher.finalize();
    let full = num_bigint::BigUint::from_bytes_be(&digest);
    full >> 260u32
}

fn pack_balance(chunk: &[u128]) -> Fr {
    let mut acc = num_bigint::BigUint::from(0u8);
    let mut mult = num_bigint::BigUint::from(1u8);
    let lane = num_bigint::BigUint::from(1u8) << ACCT_BALANCE_BITS;
    for &balance in chunk {
        acc += &mult * num_bigint::BigUint::from(balance);
        mult *= &lane;
    }
    biguint_to_fr(&acc)
}

fn biguint_to_fr(v: &num_bigint::BigUint) -> Fr {
    use ark_ff::PrimeField;
    Fr::from_be_bytes_mod_order(&v.to_bytes_be())
}

/// `[account_id] ++ pack6(balances)`: the leaf preimage.
fn account_info_packed(account_id: &num_bigint::BigUint, balances: &[u128]) -> Vec<Fr> {
    let mut out = vec![biguint_to_fr(account_id)];
    for chunk in balances.chunks(ACCT_BALANCES_PER_ELT) {
        out.push(pack_balance(chunk));
    }
    out
}

fn parse_preimages(branch: &str) -> Result<Vec<Vec<Fr>>, VerifierError> {
    branch
        .split(';')
        .map(|level| {
            level
                .split(',')
                .map(|s| parse_fr(s.trim()))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect()
}

/// Verifies `r`'s account-id derivation and Merkle branch. Returns
/// `(account_id_ok, merkle_ok)`; both must be `true` for the receipt to be
/// accepted.
pub fn verify_receipt(r: &Receipt) -> Result<(bool, bool), VerifierError> {
    let orders = balance_orders();

    let expected_account_id = calculate_account_id(&r.username, &r.nonce);
    let claimed_account_id_str = r.account_id.trim_start_matches("0x").trim_start_matches("0X");
    let claimed_account_id = num_bigint::BigUint::parse_bytes(claimed_account_id_str.as_bytes(), 16)
        .ok_or_else(|| {
            VerifierError::MalformedInput(format!("receipt account_id is not valid hex: {}", r.account_id))
        })?;
    let correct_account_id = expected_account_id == claimed_account_id;

    let mut balance_map = std::collections::HashMap::new();
    for entry in &r.balances {
        let value = unformat_balance_value(&entry.token, &entry.balance)?;
        balance_map.insert(entry.token.clone(), value);
    }

    let mut receipt_balances = Vec::with_capacity(orders.len());
    for token in &orders {
        let raw = *balance_map.get(token).unwrap_or(&0);
        let scaled = if raw == 0 {
            0
        } else {
            account_precision_to_proof_precision(token, raw)
        };
        receipt_balances.push(scaled);
    }

    let merkle_preimages = parse_preimages(&r.merkle_branch)?;
    if merkle_preimages.is_empty() {
        return Err(VerifierError::StructuralMismatch(
            "receipt merkle_branch has no levels".into(),
        ));
    }

    let mut merkle_branch_valid = true;

    let expected_leaf = account_info_packed(&claimed_account_id, &receipt_balances);
    if expected_leaf != merkle_preimages[0] {
        merkle_branch_valid = false;
    }

    let root = parse_fr(&r.merkle_root)?;
    let top_preimage = merkle_preimages.last().expect("checked non-empty above");
    let top_hash = poseidon_hash(top_preimage, r.merkle_arity)?;
    if top_hash != root {
        merkle_branch_valid = false;
    }

    for i in 0..merkle_preimages.len() - 1 {
        let arity = if i == 0 { r.merkle_leaf_hash_arity } else { r.merkle_arity };
        let curr_hash = poseidon_hash(&merkle_preimages[i], arity)?;
        if !merkle_preimages[i + 1].contains(&curr_hash) {
            merkle_branch_valid = false;
        }
    }

    Ok((correct_account_id, merkle_branch_valid))
}
