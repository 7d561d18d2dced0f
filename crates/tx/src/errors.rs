//! Errors during swap transaction construction and signing.

use bitcoin::sighash::P2wpkhError;
use bitcoin::transaction::InputsIndexError;
use swap_script::ScriptError;
use thiserror::Error;

/// Failures surfaced while constructing or signing swap transactions.
#[derive(Debug, Error)]
pub enum TxError {
    /// The estimated fee would consume too much of the spent value.
    #[error("fee of {fee} sats is too high for a spend of {gross} sats")]
    FeesTooHigh {
        /// Estimated fee in satoshis.
        fee: u64,
        /// Total value of the inputs being spent, in satoshis.
        gross: u64,
    },

    /// The funding inputs do not cover the swap amount plus fee.
    #[error("funding inputs do not cover the swap amount plus fee")]
    InsufficientFunds,

    /// Every candidate funding input was rejected.
    #[error("no spendable funding inputs remain")]
    NoSpendableInputs,

    /// The spend destination address failed to parse for the swap's network.
    #[error("spend destination address is invalid for this network")]
    InvalidDestinationAddress,

    /// A referenced txid failed to parse from its display hex.
    #[error("referenced txid is not valid hex")]
    InvalidTxid,

    /// The lock height cannot appear in a transaction locktime field.
    #[error("lock height {0} is not a valid block height")]
    InvalidLockHeight(u32),

    /// Unlock data (preimage or admin secret) is not valid hex.
    #[error("unlock data is not valid hex")]
    InvalidUnlockHex(#[from] hex::FromHexError),

    /// Script-layer failure.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// A sighash was requested for an input index past the end.
    #[error(transparent)]
    InputIndex(#[from] InputsIndexError),

    /// A p2wpkh sighash could not be computed for a funding input.
    #[error(transparent)]
    FundingSighash(#[from] P2wpkhError),
}
