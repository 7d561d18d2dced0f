//! The spend-path argument a witness must supply between signature and
//! script.

use bitcoin::CompressedPublicKey;

/// Which branch of the redeem script a spend exercises, together with the
/// data that branch consumes from the witness stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unlock {
    /// Claim branch: reveal the payment preimage.
    Claim(Vec<u8>),
    /// Refund branch of a pubkey-hash script: reveal the refund public key.
    RefundByHash(CompressedPublicKey),
    /// Refund branch of a fixed-pubkey script: the signature alone suffices.
    RefundByKeyOnly,
    /// Admin fast-path: reveal the admin secret, plus the refund public key
    /// when the script's refund branch is keyed by hash.
    AdminRefund {
        secret: Vec<u8>,
        pubkey: Option<CompressedPublicKey>,
    },
}

impl Unlock {
    /// Witness items placed between the signature and the redeem script,
    /// bottom of the consumed stack last.
    pub(crate) fn stack_items(&self) -> Vec<Vec<u8>> {
        match self {
            Unlock::Claim(preimage) => vec![preimage.clone()],
            Unlock::RefundByHash(pubkey) => vec![pubkey.to_bytes().to_vec()],
            Unlock::RefundByKeyOnly => vec![],
            Unlock::AdminRefund { secret, pubkey } => match pubkey {
                Some(pubkey) => vec![pubkey.to_bytes().to_vec(), secret.clone()],
                None => vec![secret.clone()],
            },
        }
    }

    pub(crate) fn is_claim(&self) -> bool {
        matches!(self, Unlock::Claim(_))
    }
}
