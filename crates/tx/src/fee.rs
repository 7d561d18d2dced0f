//! Fee estimation for swap spends.

use bitcoin::{consensus::encode::VarInt, Script, Weight};
use tracing::trace;

use crate::{unlock::Unlock, utxo::SpendableUtxo};

/// Worst-case length of a DER-encoded ECDSA signature plus sighash byte.
/// Estimation assumes this before any signature exists, so the estimate
/// never undershoots the final witness by more than a byte per input.
pub const ASSUMED_SIGNATURE_LEN: usize = 73;

/// Estimates the fee for a spend of `utxos` whose unsigned body weighs
/// `base_weight`, assuming every input carries the witness shape implied by
/// `unlock`.
pub fn estimate_fee(
    redeem_script: &Script,
    utxos: &[SpendableUtxo],
    base_weight: Weight,
    sat_per_vbyte: u64,
    unlock: &Unlock,
) -> u64 {
    let mut item_lens: Vec<usize> = vec![ASSUMED_SIGNATURE_LEN];
    item_lens.extend(unlock.stack_items().iter().map(Vec::len));
    item_lens.push(redeem_script.len());

    let per_input: u64 = VarInt(item_lens.len() as u64).size() as u64
        + item_lens
            .iter()
            .map(|len| VarInt(*len as u64).size() as u64 + *len as u64)
            .sum::<u64>();

    // Segwit marker and flag plus one witness stack per input.
    let witness_wu = 2 + per_input * utxos.len() as u64;
    let vsize = (base_weight.to_wu() + witness_wu).div_ceil(4);
    let fee = vsize * sat_per_vbyte;

    trace!(vsize, fee, inputs = utxos.len(), "estimated spend fee");
    fee
}

/// True when `fee` would consume more than a quarter of the gross spend
/// value, i.e. fee over net exceeds one third.
pub(crate) fn exceeds_dust_ratio(fee: u64, gross: u64) -> bool {
    fee > gross || fee.saturating_mul(3) > gross - fee
}
