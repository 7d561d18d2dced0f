//! Inputs to swap spends: outpoint references and funding proofs.

use std::str::FromStr;

use bitcoin::{Amount, OutPoint, Transaction, TxOut, Txid};
use tracing::warn;

use crate::errors::TxError;

/// An unspent output paying the swap's funding address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendableUtxo {
    /// Transaction that created the output.
    pub txid: Txid,
    /// Output index within that transaction.
    pub vout: u32,
    /// Value locked in the output.
    pub value: Amount,
}

impl SpendableUtxo {
    /// Builds a reference from a display-order (big-endian) txid hex string.
    pub fn new(txid: &str, vout: u32, value: Amount) -> Result<Self, TxError> {
        let txid = Txid::from_str(txid).map_err(|_| TxError::InvalidTxid)?;
        Ok(Self { txid, vout, value })
    }

    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            txid: self.txid,
            vout: self.vout,
        }
    }
}

/// Evidence that a funding input exists and carries the claimed value.
#[derive(Debug, Clone)]
pub enum FundingProof {
    /// The full previous transaction; the referenced output is looked up and
    /// the txid cross-checked.
    PrevTx(Transaction),
    /// Just the previous output. Used when the wallet indexes outputs
    /// directly and the full transaction is not at hand.
    Output(TxOut),
}

/// A wallet UTXO offered to the funding transaction, together with its proof.
#[derive(Debug, Clone)]
pub struct FundingUtxo {
    /// Transaction that created the output, display-order hex parsed at
    /// construction.
    pub txid: Txid,
    /// Output index within that transaction.
    pub vout: u32,
    /// Proof of the output's script and value, if available.
    pub proof: Option<FundingProof>,
}

impl FundingUtxo {
    pub fn new(txid: &str, vout: u32, proof: Option<FundingProof>) -> Result<Self, TxError> {
        let txid = Txid::from_str(txid).map_err(|_| TxError::InvalidTxid)?;
        Ok(Self { txid, vout, proof })
    }

    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            txid: self.txid,
            vout: self.vout,
        }
    }

    /// Resolves the previous output this UTXO spends, validating the proof
    /// against the claimed outpoint. Returns `None` when no proof was
    /// supplied or the proof does not match.
    pub(crate) fn prevout(&self) -> Option<TxOut> {
        match &self.proof {
            Some(FundingProof::PrevTx(tx)) => {
                if tx.compute_txid() != self.txid {
                    warn!(txid = %self.txid, "funding proof txid mismatch");
                    return None;
                }
                match tx.output.get(self.vout as usize) {
                    Some(output) => Some(output.clone()),
                    None => {
                        warn!(txid = %self.txid, vout = self.vout, "funding proof lacks vout");
                        None
                    }
                }
            }
            Some(FundingProof::Output(output)) => Some(output.clone()),
            None => None,
        }
    }
}
