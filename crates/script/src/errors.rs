//! Errors during script compilation, inspection, and address handling.

use bitcoin::secp256k1;
use thiserror::Error;

/// Failures surfaced by script compilation, inspection, and the address/key
/// adapter.
#[derive(Debug, Clone, Error)]
pub enum ScriptError {
    /// The refund address decodes under no supported encoding.
    #[error("refund address decodes under no supported encoding")]
    InvalidRefundAddress,

    /// A fixed-length script parameter failed length/format validation.
    #[error("malformed script parameter: {0}")]
    MalformedScriptParameters(&'static str),

    /// The supplied pubkey is not a valid curve point.
    #[error("supplied pubkey is invalid")]
    InvalidPubkey(#[from] secp256k1::Error),

    /// The script bytes are not valid hex.
    #[error("script is not valid hex")]
    InvalidScriptHex(#[from] hex::FromHexError),

    /// The script does not match any known swap layout.
    #[error("script does not match any known swap layout")]
    UnrecognizedScript,

    /// The signing key is not a valid WIF string.
    #[error("signing key is not a valid WIF string")]
    InvalidSigningKey,

    /// No address could be derived from the signing key.
    #[error("no address could be derived from the signing key")]
    ExpectedAddress,
}
