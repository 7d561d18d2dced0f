//! Funding transaction construction.

use bitcoin::{
    absolute::LockTime,
    ecdsa,
    hashes::Hash,
    secp256k1::Message,
    sighash::SighashCache,
    transaction::Version,
    Address, Amount, EcdsaSighashType, Network, ScriptBuf, Sequence, Transaction, TxIn, TxOut,
    Witness,
};
use secp256k1::SECP256K1;
use swap_script::signing_key_from_wif;
use tracing::{debug, warn};

use crate::{
    errors::TxError,
    utxo::FundingUtxo,
};

/// Builds and signs the transaction that moves wallet funds into the swap's
/// funding address.
///
/// Inputs must be p2wpkh outputs controlled by `wif`. Inputs without a
/// usable [`FundingProof`](crate::FundingProof) are skipped; change above
/// the swap `amount` plus `fee` returns to the signing key's own p2wpkh
/// address.
pub fn build_funding_tx(
    network: Network,
    funding_address: &Address,
    utxos: &[FundingUtxo],
    amount: Amount,
    wif: &str,
    fee: Amount,
) -> Result<Transaction, TxError> {
    let (key, pubkey) = signing_key_from_wif(wif)?;

    let mut proven = Vec::with_capacity(utxos.len());
    for utxo in utxos {
        match utxo.prevout() {
            Some(prevout) => proven.push((utxo, prevout)),
            None => warn!(txid = %utxo.txid, vout = utxo.vout, "skipping unproven funding input"),
        }
    }
    if proven.is_empty() {
        return Err(TxError::NoSpendableInputs);
    }

    let total: Amount = proven.iter().map(|(_, prevout)| prevout.value).sum();
    let change = total
        .checked_sub(amount)
        .and_then(|rest| rest.checked_sub(fee))
        .ok_or(TxError::InsufficientFunds)?;

    let change_address = Address::p2wpkh(&pubkey, network);
    let mut tx = Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: proven
            .iter()
            .map(|(utxo, _)| TxIn {
                previous_output: utxo.outpoint(),
                script_sig: ScriptBuf::new(),
                sequence: Sequence::ZERO,
                witness: Witness::new(),
            })
            .collect(),
        output: vec![
            TxOut {
                value: amount,
                script_pubkey: funding_address.script_pubkey(),
            },
            TxOut {
                value: change,
                script_pubkey: change_address.script_pubkey(),
            },
        ],
    };

    let mut cache = SighashCache::new(&tx);
    let mut sighashes = Vec::with_capacity(proven.len());
    for (index, (_, prevout)) in proven.iter().enumerate() {
        sighashes.push(cache.p2wpkh_signature_hash(
            index,
            &prevout.script_pubkey,
            prevout.value,
            EcdsaSighashType::All,
        )?);
    }
    drop(cache);

    for (input, sighash) in tx.input.iter_mut().zip(sighashes) {
        let message = Message::from_digest(sighash.to_byte_array());
        let signature = ecdsa::Signature {
            signature: SECP256K1.sign_ecdsa(&message, &key.inner),
            sighash_type: EcdsaSighashType::All,
        };
        input.witness = Witness::p2wpkh(&signature, &pubkey.0);
    }

    debug!(
        txid = %tx.compute_txid(),
        inputs = tx.input.len(),
        amount = %amount,
        change = %change,
        "built funding transaction"
    );
    Ok(tx)
}
