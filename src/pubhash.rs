//! Public-output aggregation (`pubhash`): deterministic reconstruction of
//! the Groth16 circuit's single non-trivial public input from the prover's
//! revealed liability and asset public outputs.
//!
//! Every field here arrives as a decimal string (the wire convention shared
//! with `Proof`/`VerifyingKey`, see `crate::curve`) and is parsed into a
//! canonical `Fr` (or, for `msg_hash`, a raw sub-`2^256` integer) before any
//! hashing happens.

use ark_bn254::Fr;
use num_bigint::BigUint;

use crate::curve::parse_fr;
use crate::error::VerifierError;
use crate::poseidon::poseidon_hash;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LiabilitiesPubOutputs {
    pub merkle_root: String,
    pub hashed_vkey_liab_base: String,
    pub hashed_vkey_liab_rec: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AbasePubOutputs {
    /// A raw (not necessarily `Fr`-reduced) integer below `2^256`, split
    /// into four 64-bit registers by `int_to_regs`.
    pub msg_hash: String,
    pub hashed_pub_addrs: String,
    pub min_owned_addr_selector: String,
    pub max_owned_addr_selector: String,
    pub hashed_vkey_base: String,
    pub hashed_vkey_anonsetagg: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AssetsPubOutputs {
    pub eth: AbasePubOutputs,
    pub btc: AbasePubOutputs,
    pub btc_multi3: AbasePubOutputs,
    pub anonsetagg_vkey_hash: String,
    pub dummy_vkey_hash: String,
    pub assetsrec_vkey_hash: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PubOutputs {
    pub liabilities: LiabilitiesPubOutputs,
    pub assets: AssetsPubOutputs,
}

/// `int_to_regs`: 4 limbs of `x mod 2^64`, least-significant first. `x` must
/// be strictly below `2^256`.
fn int_to_regs(x: &BigUint) -> Result<[Fr; 4], VerifierError> {
    let bound = BigUint::from(1u8) << 256u32;
    if x >= &bound {
        return Err(VerifierError::OutOfRange(format!(
            "int_to_regs: value {x} is not below 2**256"
        )));
    }
    let mask = BigUint::from(u64::MAX) + BigUint::from(1u8);
    let mut regs = [Fr::from(0u64); 4];
    let mut temp = x.clone();
    for reg in regs.iter_mut() {
        let limb = &temp % &mask;
        let limb_u64 = limb.iter_u64_digits().next().unwrap_or(0);
        *reg = Fr::from(limb_u64);
        temp /= &mask;
    }
    Ok(regs)
}

fn parse_big(s: &str, what: &str) -> Result<BigUint, VerifierError> {
    BigUint::parse_bytes(s.trim().as_bytes(), 10)
        .ok_or_else(|| VerifierError::MalformedInput(format!("{what}: invalid integer {s:?}")))
}

/// `hash_liab(L) = poseidon_hash([hashed_vkey_liab_base, hashed_vkey_liab_rec, merkle_root], 3)`.
pub fn hash_liab(liab: &LiabilitiesPubOutputs) -> Result<Fr, VerifierError> {
    let root = parse_fr(&liab.merkle_root)?;
    let base = parse_fr(&liab.hashed_vkey_liab_base)?;
    let rec = parse_fr(&liab.hashed_vkey_liab_rec)?;
    poseidon_hash(&[base, rec, root], 3)
}

/// `hash_abase(A, name)`: one 9-ary aggregate per asset base (eth / btc /
/// btc_multi3).
pub fn hash_abase(abase: &AbasePubOutputs) -> Result<Fr, VerifierError> {
    let msg_hash = parse_big(&abase.msg_hash, "msg_hash")?;
    let regs = int_to_regs(&msg_hash)?;
    let hashed_pub_addrs = parse_fr(&abase.hashed_pub_addrs)?;
    let min_sel = parse_fr(&abase.min_owned_addr_selector)?;
    let max_sel = parse_fr(&abase.max_owned_addr_selector)?;
    let hashed_vkey_base = parse_fr(&abase.hashed_vkey_base)?;
    let hashed_vkey_anonsetagg = parse_fr(&abase.hashed_vkey_anonsetagg)?;

    let mut inputs = regs.to_vec();
    inputs.push(hashed_pub_addrs);
    inputs.push(min_sel);
    inputs.push(max_sel);
    inputs.push(hashed_vkey_base);
    inputs.push(hashed_vkey_anonsetagg);

    poseidon_hash(&inputs, 9)
}

/// `hash_assets(S)`. The `0` in position 3 and the triple repetition of
/// `anonsetagg_vkey_hash` are structural protocol commitments and MUST be
/// preserved bit-exactly, not simplified.
pub fn hash_assets(assets: &AssetsPubOutputs) -> Result<Fr, VerifierError> {
    let agg_eth = hash_abase(&assets.eth)?;
    let agg_btc = hash_abase(&assets.btc)?;
    let agg_btc_multi3 = hash_abase(&assets.btc_multi3)?;
    let dummy_agg_hash = Fr::from(0u64);

    let anonsetagg_vkey_hash = parse_fr(&assets.anonsetagg_vkey_hash)?;
    let dummy_vkey_hash = parse_fr(&assets.dummy_vkey_hash)?;

    let rec_h = poseidon_hash(
        &[
            agg_eth,
            agg_btc,
            agg_btc_multi3,
            dummy_agg_hash,
            anonsetagg_vkey_hash,
            anonsetagg_vkey_hash,
            anonsetagg_vkey_hash,
            dummy_vkey_hash,
        ],
        8,
    )?;

    let assetsrec_vkey_hash = parse_fr(&assets.assetsrec_vkey_hash)?;
    poseidon_hash(&[rec_h, assetsrec_vkey_hash], 2)
}

/// `pubhash = poseidon_hash([hash_assets(assets), hash_liab(liab)], 2)`.
pub fn compute_pubhash(pub_outputs: &PubOutputs) -> Result<Fr, VerifierError> {
    let assets_hash = hash_assets(&pub_outputs.assets)?;
    let liab_hash = hash_liab(&pub_outputs.liabilities)?;
    poseidon_hash(&[assets_hash, liab_hash], 2)
}
