//! Funding, claim, refund, and admin-refund transaction construction for
//! swap HTLCs.
//!
//! [`SwapHtlc`] is the entry point: bind it to a redeem script (freshly
//! compiled or received from a counterparty) and build fully signed wire-hex
//! transactions against it. Spends follow a strict two-phase protocol: every
//! input joins the draft before any sighash is computed, so each signature
//! commits to the complete input set.

pub mod errors;

mod draft;
mod fee;
mod fund;
mod htlc;
mod unlock;
mod utxo;

#[cfg(test)]
pub(crate) mod test_utils;

pub use errors::TxError;
pub use fee::{estimate_fee, ASSUMED_SIGNATURE_LEN};
pub use fund::build_funding_tx;
pub use htlc::SwapHtlc;
pub use unlock::Unlock;
pub use utxo::{FundingProof, FundingUtxo, SpendableUtxo};
