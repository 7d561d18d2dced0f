//! Shared fixtures for transaction construction tests.

use bitcoin::{
    consensus,
    hashes::{hash160, sha256, Hash},
    opcodes::all::{
        OP_CHECKSIG, OP_CLTV, OP_CSV, OP_DROP, OP_DUP, OP_ELSE, OP_ENDIF, OP_EQUAL,
        OP_EQUALVERIFY, OP_HASH160, OP_IF, OP_SHA256,
    },
    script::Builder,
    Address, CompressedPublicKey, Network, PrivateKey, ScriptBuf, Transaction,
};
use hex_literal::hex;
use secp256k1::{SecretKey, SECP256K1};
use swap_script::{compile, SwapParams};

pub(crate) const NETWORK: Network = Network::Regtest;

const PREIMAGE: [u8; 32] =
    hex!("4242424242424242424242424242424242424242424242424242424242424242");

pub(crate) fn preimage_hex() -> String {
    hex::encode(PREIMAGE)
}

pub(crate) fn signing_key() -> PrivateKey {
    PrivateKey::from_slice(&[0x11; 32], NETWORK).unwrap()
}

pub(crate) fn signing_wif() -> String {
    signing_key().to_wif()
}

pub(crate) fn signing_pubkey() -> CompressedPublicKey {
    CompressedPublicKey(signing_key().inner.public_key(SECP256K1))
}

pub(crate) fn pubkey(seed: u8) -> CompressedPublicKey {
    let sk = SecretKey::from_slice(&[seed; 32]).unwrap();
    CompressedPublicKey(sk.public_key(SECP256K1))
}

/// A standard swap: absolute timelock, refund back to the signing key's own
/// p2wpkh address, payment hash committing to [`PREIMAGE`].
pub(crate) fn swap_params() -> SwapParams {
    SwapParams {
        destination_pubkey: signing_pubkey(),
        payment_hash: sha256::Hash::hash(&PREIMAGE),
        refund_address: Address::p2wpkh(&signing_pubkey(), NETWORK).to_string(),
        timelock_height: 500_000,
    }
}

pub(crate) fn swap_script() -> ScriptBuf {
    compile(&swap_params(), NETWORK).unwrap()
}

pub(crate) fn funding_address() -> Address {
    Address::p2shwsh(&swap_script(), NETWORK)
}

pub(crate) fn destination_address() -> Address {
    Address::p2wpkh(&pubkey(0x55), NETWORK)
}

fn claim_prefix() -> Builder {
    Builder::new()
        .push_opcode(OP_DUP)
        .push_opcode(OP_SHA256)
        .push_slice(sha256::Hash::hash(&PREIMAGE).to_byte_array())
        .push_opcode(OP_EQUAL)
        .push_opcode(OP_IF)
        .push_opcode(OP_DROP)
        .push_slice(signing_pubkey().to_bytes())
        .push_opcode(OP_ELSE)
}

fn pkh_refund_tail(builder: Builder) -> ScriptBuf {
    builder
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_slice(hash160::Hash::hash(&signing_pubkey().to_bytes()).to_byte_array())
        .push_opcode(OP_EQUALVERIFY)
        .push_opcode(OP_ENDIF)
        .push_opcode(OP_CHECKSIG)
        .into_script()
}

/// Same shape as [`swap_script`] but with a relative (CSV) lock.
pub(crate) fn relative_script(csv_value: u32) -> ScriptBuf {
    pkh_refund_tail(
        claim_prefix()
            .push_int(i64::from(csv_value))
            .push_opcode(OP_CSV)
            .push_opcode(OP_DROP),
    )
}

/// Refund branch keyed by the signing pubkey directly, no hash proof.
pub(crate) fn pubkey_refund_script() -> ScriptBuf {
    claim_prefix()
        .push_int(500_000)
        .push_opcode(OP_CLTV)
        .push_opcode(OP_DROP)
        .push_slice(signing_pubkey().to_bytes())
        .push_opcode(OP_ENDIF)
        .push_opcode(OP_CHECKSIG)
        .into_script()
}

/// Refund branch with a nested admin hashlock ahead of the timelock.
pub(crate) fn admin_script(admin_hash: [u8; 32]) -> ScriptBuf {
    pkh_refund_tail(
        claim_prefix()
            .push_opcode(OP_DUP)
            .push_opcode(OP_SHA256)
            .push_slice(admin_hash)
            .push_opcode(OP_EQUAL)
            .push_opcode(OP_IF)
            .push_opcode(OP_DROP)
            .push_opcode(OP_ELSE)
            .push_int(500_000)
            .push_opcode(OP_CLTV)
            .push_opcode(OP_DROP)
            .push_opcode(OP_ENDIF),
    )
}

pub(crate) fn parse_tx(tx_hex: &str) -> Transaction {
    consensus::encode::deserialize(&hex::decode(tx_hex).unwrap()).unwrap()
}
