//! Two-phase spend assembly.
//!
//! A [`SpendDraft`] accumulates inputs and the single drained output;
//! [`SpendDraft::seal`] freezes the input set into a [`SealedSpend`], the
//! only type that can sign. Segwit sighashes commit to every outpoint, so a
//! signature computed before the input set is complete would be invalid;
//! the type split makes that ordering unrepresentable.

use bitcoin::{
    absolute::LockTime,
    ecdsa,
    hashes::Hash,
    secp256k1::Message,
    sighash::SighashCache,
    transaction::Version,
    Address, Amount, EcdsaSighashType, OutPoint, PrivateKey, Script, ScriptBuf, Sequence,
    Transaction, TxIn, TxOut, Weight, Witness,
};
use secp256k1::SECP256K1;

use crate::{errors::TxError, fee::exceeds_dust_ratio, unlock::Unlock};

/// A spend under construction: inputs may still be added and the fee has not
/// been deducted.
#[derive(Debug)]
pub(crate) struct SpendDraft {
    tx: Transaction,
    spent: Vec<Amount>,
}

impl SpendDraft {
    /// Starts a draft paying the gross input value to `destination`.
    pub(crate) fn new(lock_time: LockTime, destination: &Address, gross: Amount) -> Self {
        let tx = Transaction {
            version: Version::TWO,
            lock_time,
            input: vec![],
            output: vec![TxOut {
                value: gross,
                script_pubkey: destination.script_pubkey(),
            }],
        };
        Self { tx, spent: vec![] }
    }

    pub(crate) fn push_input(
        &mut self,
        outpoint: OutPoint,
        sequence: Sequence,
        script_sig: ScriptBuf,
        value: Amount,
    ) {
        self.tx.input.push(TxIn {
            previous_output: outpoint,
            script_sig,
            sequence,
            witness: Witness::new(),
        });
        self.spent.push(value);
    }

    /// Weight of the draft as it stands, before any witness data.
    pub(crate) fn weight(&self) -> Weight {
        self.tx.weight()
    }

    /// Deducts the fee from the drained output, rejecting fees that would
    /// dominate the spend.
    pub(crate) fn deduct_fee(&mut self, fee: u64) -> Result<(), TxError> {
        let gross = self.tx.output[0].value.to_sat();
        if exceeds_dust_ratio(fee, gross) {
            return Err(TxError::FeesTooHigh { fee, gross });
        }
        self.tx.output[0].value = Amount::from_sat(gross - fee);
        Ok(())
    }

    pub(crate) fn seal(self) -> SealedSpend {
        SealedSpend {
            tx: self.tx,
            spent: self.spent,
        }
    }
}

/// A spend whose input set is final. Signing happens here and nowhere else.
#[derive(Debug)]
pub(crate) struct SealedSpend {
    tx: Transaction,
    spent: Vec<Amount>,
}

impl SealedSpend {
    /// Computes the segwit v0 sighash for every input over the complete
    /// input set, then attaches a witness of the form
    /// `[signature, unlock items.., redeem script]` to each.
    pub(crate) fn sign_all(
        mut self,
        redeem_script: &Script,
        unlock: &Unlock,
        key: &PrivateKey,
    ) -> Result<Transaction, TxError> {
        let mut cache = SighashCache::new(&self.tx);
        let mut sighashes = Vec::with_capacity(self.spent.len());
        for (index, value) in self.spent.iter().enumerate() {
            sighashes.push(cache.p2wsh_signature_hash(
                index,
                redeem_script,
                *value,
                EcdsaSighashType::All,
            )?);
        }
        drop(cache);

        let stack_items = unlock.stack_items();
        for (input, sighash) in self.tx.input.iter_mut().zip(sighashes) {
            let message = Message::from_digest(sighash.to_byte_array());
            let signature = ecdsa::Signature {
                signature: SECP256K1.sign_ecdsa(&message, &key.inner),
                sighash_type: EcdsaSighashType::All,
            };

            let mut witness = Witness::new();
            witness.push(signature.to_vec());
            for item in &stack_items {
                witness.push(item);
            }
            witness.push(redeem_script.as_bytes());
            input.witness = witness;
        }

        Ok(self.tx)
    }
}

/// ScriptSig for a nested-segwit (P2SH-P2WSH) input: a single push of the
/// `0x00 0x20 <sha256(redeem script)>` witness program.
pub(crate) fn nested_witness_stub(redeem_script: &Script) -> ScriptBuf {
    let program = ScriptBuf::new_p2wsh(&redeem_script.wscript_hash());
    let mut bytes = Vec::with_capacity(1 + program.len());
    bytes.push(0x22);
    bytes.extend_from_slice(program.as_bytes());
    ScriptBuf::from_bytes(bytes)
}
