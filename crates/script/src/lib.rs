//! HTLC redeem script compilation and inspection for UTXO chains.
//!
//! The compiler turns swap parameters into the canonical serialized redeem
//! script; the inspector recovers a structural description from existing
//! script bytes without verifying any signature or hash. Address and key
//! decoding sit behind the same boundary so transaction construction never
//! re-derives them.

pub mod address;
pub mod compile;
pub mod errors;
pub mod inspect;

pub use address::{refund_pubkey_hash, signing_key_from_wif};
pub use compile::{compile, SwapParams};
pub use errors::ScriptError;
pub use inspect::{inspect, RefundPredicate, SwapDetails, Timelock};
