//! Per-swap orchestrator for funding, claim, refund, and admin-refund
//! transactions.

use bitcoin::{
    absolute::LockTime,
    address::NetworkUnchecked,
    consensus::encode::serialize_hex,
    Address, Amount, Network, Script, ScriptBuf, Sequence,
};
use swap_script::{
    compile, inspect, signing_key_from_wif, RefundPredicate, SwapDetails, SwapParams,
};
use tracing::debug;

use crate::{
    draft::{nested_witness_stub, SpendDraft},
    errors::TxError,
    fee::estimate_fee,
    fund::build_funding_tx,
    unlock::Unlock,
    utxo::{FundingUtxo, SpendableUtxo},
};

/// A swap HTLC bound to one redeem script on one network.
///
/// Construction inspects the script once; every transaction builder then
/// reads the cached [`SwapDetails`] instead of re-parsing script bytes.
#[derive(Debug, Clone)]
pub struct SwapHtlc {
    network: Network,
    redeem_script: ScriptBuf,
    details: SwapDetails,
}

impl SwapHtlc {
    /// Compiles a fresh redeem script from swap parameters.
    pub fn from_params(params: &SwapParams, network: Network) -> Result<Self, TxError> {
        Self::from_script(compile(params, network)?, network)
    }

    /// Adopts an existing redeem script, e.g. one received from a
    /// counterparty.
    pub fn from_script(redeem_script: ScriptBuf, network: Network) -> Result<Self, TxError> {
        let details = inspect(&redeem_script, network)?;
        Ok(Self {
            network,
            redeem_script,
            details,
        })
    }

    pub fn from_script_hex(script_hex: &str, network: Network) -> Result<Self, TxError> {
        let bytes = hex::decode(script_hex)
            .map_err(swap_script::ScriptError::InvalidScriptHex)
            .map_err(TxError::Script)?;
        Self::from_script(ScriptBuf::from_bytes(bytes), network)
    }

    pub fn redeem_script(&self) -> &Script {
        &self.redeem_script
    }

    pub fn details(&self) -> &SwapDetails {
        &self.details
    }

    /// Nested-segwit address funding transactions pay into.
    pub fn funding_address(&self) -> &Address {
        &self.details.funding_address
    }

    /// Builds the transaction that funds the swap from the signer's wallet
    /// UTXOs. Returns the signed transaction as wire hex.
    pub fn fund(
        &self,
        utxos: &[FundingUtxo],
        amount: Amount,
        signing_wif: &str,
        fee: Amount,
    ) -> Result<String, TxError> {
        let tx = build_funding_tx(
            self.network,
            self.funding_address(),
            utxos,
            amount,
            signing_wif,
            fee,
        )?;
        Ok(serialize_hex(&tx))
    }

    /// Sweeps the funded outputs through the claim branch by revealing the
    /// payment preimage.
    pub fn claim(
        &self,
        utxos: &[SpendableUtxo],
        destination_address: &str,
        current_height: u32,
        sat_per_vbyte: u64,
        preimage_hex: &str,
        signing_wif: &str,
    ) -> Result<String, TxError> {
        let unlock = Unlock::Claim(hex::decode(preimage_hex)?);
        self.build_spend(
            utxos,
            destination_address,
            current_height,
            sat_per_vbyte,
            unlock,
            signing_wif,
        )
    }

    /// Recovers the funded outputs through the timelocked refund branch.
    ///
    /// A pubkey-hash refund script needs the refund public key on the
    /// witness stack; a fixed-pubkey script does not.
    pub fn refund(
        &self,
        utxos: &[SpendableUtxo],
        destination_address: &str,
        current_height: u32,
        sat_per_vbyte: u64,
        signing_wif: &str,
    ) -> Result<String, TxError> {
        let (_, pubkey) = signing_key_from_wif(signing_wif)?;
        let unlock = match self.details.refund {
            RefundPredicate::PubkeyHash(_) => Unlock::RefundByHash(pubkey),
            RefundPredicate::Pubkey(_) => Unlock::RefundByKeyOnly,
        };
        self.build_spend(
            utxos,
            destination_address,
            current_height,
            sat_per_vbyte,
            unlock,
            signing_wif,
        )
    }

    /// Recovers the funded outputs through the admin fast-path by revealing
    /// the admin secret, without waiting out the timelock.
    pub fn admin_refund(
        &self,
        utxos: &[SpendableUtxo],
        destination_address: &str,
        current_height: u32,
        sat_per_vbyte: u64,
        admin_secret_hex: &str,
        signing_wif: &str,
    ) -> Result<String, TxError> {
        let (_, pubkey) = signing_key_from_wif(signing_wif)?;
        let unlock = Unlock::AdminRefund {
            secret: hex::decode(admin_secret_hex)?,
            pubkey: match self.details.refund {
                RefundPredicate::PubkeyHash(_) => Some(pubkey),
                RefundPredicate::Pubkey(_) => None,
            },
        };
        self.build_spend(
            utxos,
            destination_address,
            current_height,
            sat_per_vbyte,
            unlock,
            signing_wif,
        )
    }

    /// Shared spend pipeline: drain every funded output into one payout,
    /// estimate and deduct the fee, then sign the completed input set.
    fn build_spend(
        &self,
        utxos: &[SpendableUtxo],
        destination_address: &str,
        current_height: u32,
        sat_per_vbyte: u64,
        unlock: Unlock,
        signing_wif: &str,
    ) -> Result<String, TxError> {
        let destination = destination_address
            .parse::<Address<NetworkUnchecked>>()
            .ok()
            .and_then(|address| address.require_network(self.network).ok())
            .ok_or(TxError::InvalidDestinationAddress)?;
        let (key, _) = signing_key_from_wif(signing_wif)?;

        let lock_time = LockTime::from_height(current_height)
            .map_err(|_| TxError::InvalidLockHeight(current_height))?;
        let sequence = if self.details.timelock.is_relative() && !unlock.is_claim() {
            Sequence(self.details.timelock.value())
        } else {
            Sequence::ZERO
        };

        let gross: Amount = utxos.iter().map(|utxo| utxo.value).sum();
        let mut draft = SpendDraft::new(lock_time, &destination, gross);
        let stub = nested_witness_stub(&self.redeem_script);
        for utxo in utxos {
            draft.push_input(utxo.outpoint(), sequence, stub.clone(), utxo.value);
        }

        let fee = estimate_fee(
            &self.redeem_script,
            utxos,
            draft.weight(),
            sat_per_vbyte,
            &unlock,
        );
        draft.deduct_fee(fee)?;

        let tx = draft.seal().sign_all(&self.redeem_script, &unlock, &key)?;
        debug!(
            txid = %tx.compute_txid(),
            inputs = tx.input.len(),
            fee,
            "built swap spend"
        );
        Ok(serialize_hex(&tx))
    }
}
