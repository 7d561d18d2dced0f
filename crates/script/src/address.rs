//! Address and key decoding at the collaborator boundary.

use bitcoin::{
    address::{AddressData, NetworkUnchecked},
    hashes::Hash,
    Address, CompressedPublicKey, Network, PrivateKey, WitnessVersion,
};
use secp256k1::SECP256K1;

use crate::errors::ScriptError;

type RefundDecoder = fn(&str, Network) -> Option<[u8; 20]>;

// Decoders are tried in order and the first success wins; the combined
// failure is surfaced only when every attempt fails.
const REFUND_DECODERS: [RefundDecoder; 2] = [decode_p2pkh, decode_p2wpkh];

/// Converts a refund address into the pubkey hash the script's refund branch
/// commits to. Tries every supported encoding (legacy base58check, then
/// native segwit v0) before failing with
/// [`InvalidRefundAddress`](ScriptError::InvalidRefundAddress).
pub fn refund_pubkey_hash(address: &str, network: Network) -> Result<[u8; 20], ScriptError> {
    REFUND_DECODERS
        .iter()
        .find_map(|decode| decode(address, network))
        .ok_or(ScriptError::InvalidRefundAddress)
}

fn decode_p2pkh(address: &str, network: Network) -> Option<[u8; 20]> {
    let address = address
        .parse::<Address<NetworkUnchecked>>()
        .ok()?
        .require_network(network)
        .ok()?;
    match address.to_address_data() {
        AddressData::P2pkh { pubkey_hash } => Some(pubkey_hash.to_byte_array()),
        _ => None,
    }
}

fn decode_p2wpkh(address: &str, network: Network) -> Option<[u8; 20]> {
    let address = address
        .parse::<Address<NetworkUnchecked>>()
        .ok()?
        .require_network(network)
        .ok()?;
    match address.to_address_data() {
        AddressData::Segwit { witness_program }
            if witness_program.version() == WitnessVersion::V0 =>
        {
            witness_program.program().as_bytes().try_into().ok()
        }
        _ => None,
    }
}

/// Decodes a WIF signing key and derives its compressed public key.
///
/// The key is a plain in-memory value scoped to the construction call that
/// requested it.
pub fn signing_key_from_wif(wif: &str) -> Result<(PrivateKey, CompressedPublicKey), ScriptError> {
    let key = PrivateKey::from_wif(wif).map_err(|_| ScriptError::InvalidSigningKey)?;
    let pubkey = CompressedPublicKey::from_private_key(SECP256K1, &key)
        .map_err(|_| ScriptError::ExpectedAddress)?;
    Ok((key, pubkey))
}
