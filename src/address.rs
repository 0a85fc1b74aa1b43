//! Decoding public addresses into the fixed-width field-element registers
//! that anonset hashing (`crate::anonset`) flattens and hashes.
//!
//! Three address conventions are supported, each with its own fixed
//! register count — mixing conventions within one anonset is a protocol
//! violation the caller is responsible for avoiding (the type tag fixes the
//! decoder for the whole set, it is never inferred per-address).

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;
use num_traits::Zero;
use sha2::{Digest, Sha256};

use crate::error::VerifierError;

const BECH32_CHARSET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const BECH32_GEN: [u32; 5] = [0x3b6a_57b2, 0x2650_8e6d, 0x1ea1_19fa, 0x3d42_33dd, 0x2a14_62b3];

/// Tags which address convention an anonset uses. The register count per
/// address is fixed by the tag, not discovered per address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum AnonsetType {
    /// Base58Check P2PKH/P2SH: one 160-bit hash, one register.
    BtcPubkey,
    /// Bech32-style P2WPKH/P2WSH: one 256-bit hash, two 128-bit registers.
    BtcScript,
    /// Ethereum hex address: one 160-bit-ish value, one register.
    Eth,
}

impl AnonsetType {
    pub const fn register_count(self) -> usize {
        match self {
            AnonsetType::BtcPubkey => 1,
            AnonsetType::BtcScript => 2,
            AnonsetType::Eth => 1,
        }
    }
}

fn biguint_to_fr(value: &BigUint) -> Fr {
    Fr::from_be_bytes_mod_order(&value.to_bytes_be())
}

fn bound_200() -> BigUint {
    BigUint::from(1u8) << 200u32
}

fn bound_256() -> BigUint {
    BigUint::from(1u8) << 256u32
}

/// Base58Check decode with the source protocol's exact (non-standard)
/// trimming: always chop the trailing 4 checksum bytes without verifying
/// them, then if more than 20 bytes remain, assert exactly 21 and drop the
/// leading version byte.
fn btc_pubkey_to_int(address: &str) -> Result<BigUint, VerifierError> {
    let mut bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| VerifierError::MalformedInput(format!("invalid base58 address: {e}")))?;

    if bytes.len() < 4 {
        return Err(VerifierError::MalformedInput(format!(
            "base58 address {address} decodes to fewer than 4 bytes"
        )));
    }
    bytes.truncate(bytes.len() - 4);

    if bytes.len() > 20 {
        if bytes.len() != 21 {
            return Err(VerifierError::StructuralMismatch(format!(
                "base58 address {address}: expected 21 bytes after stripping checksum, got {}",
                bytes.len()
            )));
        }
        bytes = bytes[bytes.len() - 20..].to_vec();
    }

    let result = BigUint::from_bytes_be(&bytes);
    if result >= bound_200() {
        return Err(VerifierError::OutOfRange(format!(
            "BTC pubkey address {address} is too large as an integer: {result}"
        )));
    }
    Ok(result)
}

fn bech32_char_to_value(c: char) -> Result<u8, VerifierError> {
    BECH32_CHARSET
        .find(c)
        .map(|idx| idx as u8)
        .ok_or_else(|| VerifierError::MalformedInput(format!("{c} not in bech32 charset")))
}

/// General power-of-2 base conversion, matching the reference
/// `convertbits(data, frombits, tobits, pad)`: with `pad = false`, leftover
/// bits that don't cleanly resolve to zero are an error; with `pad = true`,
/// a final short group is flushed left-justified (used for the encode
/// direction, where the decoder never round-trips leftover bits).
fn convertbits(data: &[u8], from_bits: u32, to_bits: u32, pad: bool) -> Result<Vec<u8>, VerifierError> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut ret = Vec::new();
    let maxv: u32 = (1 << to_bits) - 1;
    let max_acc: u32 = (1 << (from_bits + to_bits - 1)) - 1;

    for &value in data {
        if value as u32 >> from_bits != 0 {
            return Err(VerifierError::MalformedInput(
                "bech32 bit-conversion input value out of range".into(),
            ));
        }
        acc = ((acc << from_bits) | value as u32) & max_acc;
        bits += from_bits;
        while bits >= to_bits {
            bits -= to_bits;
            ret.push(((acc >> bits) & maxv) as u8);
        }
    }

    if pad {
        if bits > 0 {
            ret.push(((acc << (to_bits - bits)) & maxv) as u8);
        }
    } else if bits >= from_bits || ((acc << (to_bits - bits)) & maxv) != 0 {
        return Err(VerifierError::MalformedInput(
            "bech32 bit conversion had non-zero leftover padding".into(),
        ));
    }
    Ok(ret)
}

fn convertbits_5_to_8(data: &[u8]) -> Result<Vec<u8>, VerifierError> {
    convertbits(data, 5, 8, false)
}

/// Hand-rolled bech32-like decode matching the reference protocol's
/// non-standard convention: no checksum verification, a fixed 4-character
/// `bc1<witver>` prefix and 6-character checksum suffix are simply stripped.
fn btc_script_to_int(address: &str) -> Result<BigUint, VerifierError> {
    if address.len() != 42 && address.len() != 62 {
        return Err(VerifierError::MalformedInput(format!(
            "expected bech32 address to be 42 or 62 characters, got {}",
            address.len()
        )));
    }
    let lower = address.to_lowercase();
    let upper = address.to_uppercase();
    if address != lower && address != upper {
        return Err(VerifierError::MalformedInput(
            "mismatched lower/upper case not allowed in bech32 address".into(),
        ));
    }
    if &lower[..3] != "bc1" {
        return Err(VerifierError::MalformedInput(format!(
            "bech32 address {address} must start with bc1"
        )));
    }

    let important = &lower[4..lower.len() - 6];
    let five_bit: Vec<u8> = important
        .chars()
        .map(bech32_char_to_value)
        .collect::<Result<_, _>>()?;
    let decoded = convertbits_5_to_8(&five_bit)?;
    let result = BigUint::from_bytes_be(&decoded);

    if result >= bound_256() {
        return Err(VerifierError::OutOfRange(format!(
            "BTC script address {address} is too large as an integer: {result}"
        )));
    }
    if result.is_zero() {
        return Err(VerifierError::OutOfRange(format!(
            "BTC script address {address} decodes to zero"
        )));
    }
    Ok(result)
}

fn eth_to_int(address: &str) -> Result<BigUint, VerifierError> {
    let stripped = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);
    let result = BigUint::parse_bytes(stripped.as_bytes(), 16).ok_or_else(|| {
        VerifierError::MalformedInput(format!("invalid ETH hex address: {address}"))
    })?;
    if result >= bound_200() {
        return Err(VerifierError::OutOfRange(format!(
            "ETH address {address} is too large as an integer: {result}"
        )));
    }
    Ok(result)
}

fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    second.into()
}

/// Re-encodes a 160-bit value as a Base58Check address (`version = 0x00` for
/// P2PKH, `0x05` for P2SH), the inverse of `btc_pubkey_to_int`.
pub fn btc_pubkey_int_to_address(version: u8, value: &BigUint) -> Result<String, VerifierError> {
    let mut hash_bytes = value.to_bytes_be();
    if hash_bytes.len() > 20 {
        return Err(VerifierError::OutOfRange(format!(
            "value {value} does not fit in 20 bytes"
        )));
    }
    let mut versioned = Vec::with_capacity(21);
    versioned.push(version);
    versioned.extend(std::iter::repeat(0u8).take(20 - hash_bytes.len()));
    versioned.append(&mut hash_bytes);

    let checksum = double_sha256(&versioned);
    versioned.extend_from_slice(&checksum[..4]);
    Ok(bs58::encode(versioned).into_string())
}

fn bech32_polymod(values: &[u8]) -> u32 {
    let mut chk: u32 = 1;
    for &v in values {
        let top = chk >> 25;
        chk = ((chk & 0x1ff_ffff) << 5) ^ (v as u32);
        for (i, gen) in BECH32_GEN.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= gen;
            }
        }
    }
    chk
}

fn bech32_hrp_expand(hrp: &str) -> Vec<u8> {
    let mut v: Vec<u8> = hrp.bytes().map(|b| b >> 5).collect();
    v.push(0);
    v.extend(hrp.bytes().map(|b| b & 31));
    v
}

/// BIP-173 bech32 checksum (`bech32_create_checksum`), constant 1 (bech32,
/// not bech32m).
fn bech32_checksum(hrp: &str, data: &[u8]) -> [u8; 6] {
    let mut values = bech32_hrp_expand(hrp);
    values.extend_from_slice(data);
    values.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
    let polymod = bech32_polymod(&values) ^ 1;
    let mut out = [0u8; 6];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = ((polymod >> (5 * (5 - i))) & 31) as u8;
    }
    out
}

/// Re-encodes a value as a `bc1<witver><data><checksum>` bech32 address, the
/// inverse of `btc_script_to_int`. `byte_len` (20 or 32) disambiguates a
/// P2WPKH- from a P2WSH-shaped value, since both collapse to the same pair
/// of 128-bit registers after decoding and can't be told apart from the
/// registers alone.
pub fn btc_script_int_to_address(
    witness_version: u8,
    byte_len: usize,
    value: &BigUint,
) -> Result<String, VerifierError> {
    if byte_len != 20 && byte_len != 32 {
        return Err(VerifierError::OutOfRange(format!(
            "bech32 encode: byte_len must be 20 or 32, got {byte_len}"
        )));
    }
    if witness_version >= 32 {
        return Err(VerifierError::OutOfRange(format!(
            "bech32 encode: witness version {witness_version} does not fit in 5 bits"
        )));
    }
    let mut value_bytes = value.to_bytes_be();
    if value_bytes.len() > byte_len {
        return Err(VerifierError::OutOfRange(format!(
            "value {value} does not fit in {byte_len} bytes"
        )));
    }
    let mut padded = vec![0u8; byte_len - value_bytes.len()];
    padded.append(&mut value_bytes);

    let five_bit = convertbits(&padded, 8, 5, true)?;
    let mut data = Vec::with_capacity(1 + five_bit.len());
    data.push(witness_version);
    data.extend_from_slice(&five_bit);

    let checksum = bech32_checksum("bc", &data);
    let mut addr = String::with_capacity(3 + data.len() + checksum.len());
    addr.push_str("bc1");
    for &d in &data {
        addr.push(BECH32_CHARSET.as_bytes()[d as usize] as char);
    }
    for &d in &checksum {
        addr.push(BECH32_CHARSET.as_bytes()[d as usize] as char);
    }
    Ok(addr)
}

/// Re-encodes a value as a canonical (lowercase, zero-padded to 40 hex
/// digits) `0x`-prefixed ETH address, the inverse of `eth_to_int`.
pub fn eth_int_to_address(value: &BigUint) -> String {
    format!("0x{value:040x}")
}

fn fr_to_biguint(fr: &Fr) -> BigUint {
    BigUint::from_bytes_be(&fr.into_bigint().to_bytes_be())
}

/// Recombines `address_to_registers`' output back into the integer it was
/// split from.
fn registers_to_biguint(
    registers: &[Fr],
    anonset_type: AnonsetType,
) -> Result<BigUint, VerifierError> {
    if registers.len() != anonset_type.register_count() {
        return Err(VerifierError::StructuralMismatch(format!(
            "expected {} registers for {anonset_type:?}, got {}",
            anonset_type.register_count(),
            registers.len()
        )));
    }
    match anonset_type {
        AnonsetType::BtcPubkey | AnonsetType::Eth => Ok(fr_to_biguint(&registers[0])),
        AnonsetType::BtcScript => {
            let mask = BigUint::from(1u8) << 128u32;
            let low = fr_to_biguint(&registers[0]);
            let high = fr_to_biguint(&registers[1]);
            Ok(low + high * mask)
        }
    }
}

/// Extra, per-type metadata `address_to_registers` discards on decode and
/// that `registers_to_address` therefore needs back from the caller to
/// reconstruct the exact original address.
pub enum AddressEncodeParams {
    BtcPubkey { version: u8 },
    BtcScript { witness_version: u8, byte_len: usize },
    Eth,
}

/// `registers_to_address`: the inverse of `address_to_registers`.
pub fn registers_to_address(
    registers: &[Fr],
    anonset_type: AnonsetType,
    params: AddressEncodeParams,
) -> Result<String, VerifierError> {
    let value = registers_to_biguint(registers, anonset_type)?;
    match (anonset_type, params) {
        (AnonsetType::BtcPubkey, AddressEncodeParams::BtcPubkey { version }) => {
            btc_pubkey_int_to_address(version, &value)
        }
        (AnonsetType::BtcScript, AddressEncodeParams::BtcScript { witness_version, byte_len }) => {
            btc_script_int_to_address(witness_version, byte_len, &value)
        }
        (AnonsetType::Eth, AddressEncodeParams::Eth) => Ok(eth_int_to_address(&value)),
        _ => Err(VerifierError::StructuralMismatch(
            "address encode params do not match anonset type".into(),
        )),
    }
}

/// `address_to_registers`: decodes `address` under `anonset_type` into its
/// fixed number of field-element registers.
pub fn address_to_registers(
    address: &str,
    anonset_type: AnonsetType,
) -> Result<Vec<Fr>, VerifierError> {
    match anonset_type {
        AnonsetType::BtcPubkey => {
            let int = btc_pubkey_to_int(address)?;
            Ok(vec![biguint_to_fr(&int)])
        }
        AnonsetType::BtcScript => {
            let mut int = btc_script_to_int(address)?;
            let mask = BigUint::from(1u8) << 128u32;
            let mut regs = Vec::with_capacity(2);
            for _ in 0..2 {
                let reg = &int % &mask;
                regs.push(biguint_to_fr(&reg));
                int /= &mask;
            }
            Ok(regs)
        }
        AnonsetType::Eth => {
            let int = eth_to_int(address)?;
            Ok(vec![biguint_to_fr(&int)])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn btc_pubkey_round_trips_register_count() {
        let regs = address_to_registers("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa", AnonsetType::BtcPubkey)
            .unwrap();
        assert_eq!(regs.len(), AnonsetType::BtcPubkey.register_count());
    }

    #[test]
    fn btc_script_produces_two_registers() {
        let addr = "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq";
        // 42-char P2WPKH-shaped string (not checksum-verified by design).
        let regs = address_to_registers(addr, AnonsetType::BtcScript);
        assert!(regs.is_ok());
        assert_eq!(regs.unwrap().len(), 2);
    }

    #[test]
    fn btc_script_rejects_mixed_case() {
        let addr = "bc1QAr0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq";
        assert!(matches!(
            address_to_registers(addr, AnonsetType::BtcScript),
            Err(VerifierError::MalformedInput(_))
        ));
    }

    #[test]
    fn eth_address_within_bound_decodes() {
        let regs =
            address_to_registers("0x000000000000000000000000000000001234", AnonsetType::Eth)
                .unwrap();
        assert_eq!(regs.len(), 1);
    }

    #[test]
    fn eth_address_over_bound_is_rejected() {
        // 52 hex digits ~ 208 bits, over the 2**200 bound.
        let addr = "0xffffffffffffffffffffffffffffffffffffffffffffffffff";
        assert!(matches!(
            address_to_registers(addr, AnonsetType::Eth),
            Err(VerifierError::OutOfRange(_))
        ));
    }

    #[test]
    fn btc_pubkey_decode_then_encode_round_trips() {
        let addr = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
        let regs = address_to_registers(addr, AnonsetType::BtcPubkey).unwrap();
        let re_encoded = registers_to_address(
            &regs,
            AnonsetType::BtcPubkey,
            AddressEncodeParams::BtcPubkey { version: 0x00 },
        )
        .unwrap();
        assert_eq!(re_encoded, addr);
    }

    #[test]
    fn btc_script_encode_then_decode_then_encode_round_trips() {
        // No independently-verified real bech32 fixture is available, so
        // this checks our own encode/decode pair inverts itself rather than
        // matching a literal external address string.
        let value = BigUint::from(0x1234_5678_9abc_def0u64);
        let addr = btc_script_int_to_address(0, 20, &value).unwrap();
        assert!(addr.starts_with("bc1q") || addr.starts_with("bc1p") || addr.len() == 42);

        let regs = address_to_registers(&addr, AnonsetType::BtcScript).unwrap();
        let recombined = registers_to_biguint(&regs, AnonsetType::BtcScript).unwrap();
        assert_eq!(recombined, value);

        let re_encoded = registers_to_address(
            &regs,
            AnonsetType::BtcScript,
            AddressEncodeParams::BtcScript { witness_version: 0, byte_len: 20 },
        )
        .unwrap();
        assert_eq!(re_encoded, addr);
    }

    #[test]
    fn eth_decode_then_encode_round_trips_canonical_form() {
        let addr = "0x000000000000000000000000000000001234ab";
        let regs = address_to_registers(addr, AnonsetType::Eth).unwrap();
        let re_encoded =
            registers_to_address(&regs, AnonsetType::Eth, AddressEncodeParams::Eth).unwrap();
        assert_eq!(re_encoded, addr);
    }
}
