//! Swap redeem script compilation.

use bitcoin::{
    absolute::LockTime,
    hashes::{sha256, Hash},
    opcodes::all::{
        OP_CHECKSIG, OP_CLTV, OP_DROP, OP_DUP, OP_ELSE, OP_ENDIF, OP_EQUAL, OP_EQUALVERIFY,
        OP_HASH160, OP_IF, OP_SHA256,
    },
    script::Builder,
    CompressedPublicKey, Network, ScriptBuf,
};
use secp256k1::PublicKey;

use crate::{address::refund_pubkey_hash, errors::ScriptError};

/// Inputs to swap redeem script compilation. Constructed once per swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapParams {
    /// Public key the claimant must sign with (33-byte compressed).
    pub destination_pubkey: CompressedPublicKey,
    /// SHA-256 digest committed by the hashlock.
    pub payment_hash: sha256::Hash,
    /// Chain-native address the refund branch pays back to.
    pub refund_address: String,
    /// Block height at which the refund branch unlocks.
    pub timelock_height: u32,
}

impl SwapParams {
    /// Parses parameters from their hex/string form, failing fast on any
    /// length or format violation.
    pub fn from_hex_parts(
        destination_pubkey: &str,
        payment_hash: &str,
        refund_address: &str,
        timelock_height: u32,
    ) -> Result<Self, ScriptError> {
        let pubkey_bytes = hex::decode(destination_pubkey)?;
        if pubkey_bytes.len() != 33 {
            return Err(ScriptError::MalformedScriptParameters(
                "destination pubkey must be 33 bytes (compressed)",
            ));
        }
        let destination_pubkey = CompressedPublicKey(PublicKey::from_slice(&pubkey_bytes)?);

        let hash_bytes = hex::decode(payment_hash)?;
        let payment_hash = sha256::Hash::from_slice(&hash_bytes)
            .map_err(|_| ScriptError::MalformedScriptParameters("payment hash must be 32 bytes"))?;

        Ok(Self {
            destination_pubkey,
            payment_hash,
            refund_address: refund_address.to_owned(),
            timelock_height,
        })
    }
}

/// Compiles the swap redeem script:
///
/// ```text
/// DUP SHA256 <paymentHash> EQUAL
/// IF
///   DROP <destinationPubkey>
/// ELSE
///   <timelock> CHECKLOCKTIMEVERIFY DROP
///   DUP HASH160 <refundPubkeyHash> EQUALVERIFY
/// ENDIF
/// CHECKSIG
/// ```
///
/// The single `OP_IF` branches into the two mutually exclusive spend
/// predicates evaluated at redemption time. The timelock is pushed with
/// minimal script-number encoding; identical parameters always yield
/// byte-identical output.
pub fn compile(params: &SwapParams, network: Network) -> Result<ScriptBuf, ScriptError> {
    let refund_pkh = refund_pubkey_hash(&params.refund_address, network)?;
    let locktime = LockTime::from_height(params.timelock_height).map_err(|_| {
        ScriptError::MalformedScriptParameters("timelock height is not a valid block height")
    })?;

    Ok(Builder::new()
        .push_opcode(OP_DUP)
        .push_opcode(OP_SHA256)
        .push_slice(params.payment_hash.to_byte_array())
        .push_opcode(OP_EQUAL)
        .push_opcode(OP_IF)
        .push_opcode(OP_DROP)
        .push_slice(params.destination_pubkey.to_bytes())
        .push_opcode(OP_ELSE)
        .push_int(i64::from(locktime.to_consensus_u32()))
        .push_opcode(OP_CLTV)
        .push_opcode(OP_DROP)
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_slice(refund_pkh)
        .push_opcode(OP_EQUALVERIFY)
        .push_opcode(OP_ENDIF)
        .push_opcode(OP_CHECKSIG)
        .into_script())
}
