//! Structural inspection of serialized swap redeem scripts.
//!
//! The inspector recognizes the script layouts a swap may have been created
//! with, not only the one [`compile`](crate::compile::compile) emits: the
//! refund branch may be keyed by a pubkey hash or by a fixed public key, the
//! lock may be absolute (CLTV) or relative (CSV), and an admin fast-path may
//! nest a second hashlock ahead of the timelock.

use bitcoin::{
    opcodes::{
        all::{
            OP_CHECKSIG, OP_CLTV, OP_CSV, OP_DROP, OP_DUP, OP_ELSE, OP_ENDIF, OP_EQUAL,
            OP_EQUALVERIFY, OP_HASH160, OP_IF, OP_PUSHNUM_1, OP_PUSHNUM_16, OP_SHA256,
        },
        Opcode,
    },
    script::Instruction,
    Address, CompressedPublicKey, Network, Script,
};
use secp256k1::PublicKey;
use tracing::trace;

use crate::errors::ScriptError;

/// Which lock opcode guards the refund branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timelock {
    /// `OP_CHECKLOCKTIMEVERIFY`, validated against the transaction locktime.
    Absolute(u32),
    /// `OP_CHECKSEQUENCEVERIFY`, validated against the input sequence.
    Relative(u32),
}

impl Timelock {
    /// The raw lock value pushed in the script.
    pub fn value(&self) -> u32 {
        match self {
            Timelock::Absolute(value) | Timelock::Relative(value) => *value,
        }
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, Timelock::Relative(_))
    }
}

/// How the refund branch authenticates the refunder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefundPredicate {
    /// The branch proves pubkey-hash ownership (`DUP HASH160 .. EQUALVERIFY`),
    /// so a refund spend must reveal the public key.
    PubkeyHash([u8; 20]),
    /// The branch is keyed by a fixed public key; no hash proof goes on the
    /// witness stack.
    Pubkey(CompressedPublicKey),
}

/// Structural view of a swap redeem script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapDetails {
    /// SHA-256 digest committed by the claim hashlock.
    pub payment_hash: [u8; 32],
    /// Public key the claim branch pays.
    pub destination_pubkey: CompressedPublicKey,
    /// The refund branch's lock.
    pub timelock: Timelock,
    /// The refund branch's key predicate.
    pub refund: RefundPredicate,
    /// Hash of the admin fast-path secret, when the script nests one.
    pub admin_secret_hash: Option<[u8; 32]>,
    /// Nested-segwit (P2SH-P2WSH) address funding transactions pay into.
    pub funding_address: Address,
}

#[derive(Debug, Clone, Copy)]
enum Elem<'a> {
    Op(Opcode),
    Push(&'a [u8]),
}

struct Cursor<'a> {
    elems: Vec<Elem<'a>>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn lex(script: &'a Script) -> Result<Self, ScriptError> {
        let elems = script
            .instructions()
            .map(|ins| match ins {
                Ok(Instruction::Op(op)) => Ok(Elem::Op(op)),
                Ok(Instruction::PushBytes(bytes)) => Ok(Elem::Push(bytes.as_bytes())),
                Err(_) => Err(ScriptError::UnrecognizedScript),
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { elems, pos: 0 })
    }

    fn next(&mut self) -> Result<Elem<'a>, ScriptError> {
        let elem = self
            .elems
            .get(self.pos)
            .copied()
            .ok_or(ScriptError::UnrecognizedScript)?;
        self.pos += 1;
        Ok(elem)
    }

    fn expect_op(&mut self, op: Opcode) -> Result<(), ScriptError> {
        match self.next()? {
            Elem::Op(found) if found == op => Ok(()),
            _ => Err(ScriptError::UnrecognizedScript),
        }
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], ScriptError> {
        match self.next()? {
            Elem::Push(bytes) => bytes
                .try_into()
                .map_err(|_| ScriptError::UnrecognizedScript),
            Elem::Op(_) => Err(ScriptError::UnrecognizedScript),
        }
    }

    fn take_pubkey(&mut self) -> Result<CompressedPublicKey, ScriptError> {
        let bytes: [u8; 33] = self.take_array()?;
        Ok(CompressedPublicKey(PublicKey::from_slice(&bytes)?))
    }

    /// Reads `<lockValue> (CLTV | CSV)`.
    fn take_lock(&mut self) -> Result<Timelock, ScriptError> {
        let value = match self.next()? {
            Elem::Push(bytes) => {
                decode_script_num(bytes).ok_or(ScriptError::UnrecognizedScript)?
            }
            Elem::Op(op)
                if (OP_PUSHNUM_1.to_u8()..=OP_PUSHNUM_16.to_u8()).contains(&op.to_u8()) =>
            {
                i64::from(op.to_u8() - OP_PUSHNUM_1.to_u8() + 1)
            }
            Elem::Op(_) => return Err(ScriptError::UnrecognizedScript),
        };
        let value = u32::try_from(value).map_err(|_| ScriptError::UnrecognizedScript)?;

        match self.next()? {
            Elem::Op(op) if op == OP_CLTV => Ok(Timelock::Absolute(value)),
            Elem::Op(op) if op == OP_CSV => Ok(Timelock::Relative(value)),
            _ => Err(ScriptError::UnrecognizedScript),
        }
    }

    fn peek_ops(&self, ops: &[Opcode]) -> bool {
        ops.iter().enumerate().all(|(offset, op)| {
            matches!(self.elems.get(self.pos + offset), Some(Elem::Op(found)) if found == op)
        })
    }

    fn finished(&self) -> bool {
        self.pos == self.elems.len()
    }
}

/// Parses a serialized redeem script into [`SwapDetails`].
///
/// Purely structural; no signature or hash verification is performed.
pub fn inspect(script: &Script, network: Network) -> Result<SwapDetails, ScriptError> {
    let mut cursor = Cursor::lex(script)?;

    cursor.expect_op(OP_DUP)?;
    cursor.expect_op(OP_SHA256)?;
    let payment_hash: [u8; 32] = cursor.take_array()?;
    cursor.expect_op(OP_EQUAL)?;
    cursor.expect_op(OP_IF)?;
    cursor.expect_op(OP_DROP)?;
    let destination_pubkey = cursor.take_pubkey()?;
    cursor.expect_op(OP_ELSE)?;

    // An admin fast-path nests a second hashlock ahead of the timelock; the
    // plain layout starts the branch with the lock value push instead.
    let (admin_secret_hash, timelock) = if cursor.peek_ops(&[OP_DUP, OP_SHA256]) {
        cursor.expect_op(OP_DUP)?;
        cursor.expect_op(OP_SHA256)?;
        let admin_hash: [u8; 32] = cursor.take_array()?;
        cursor.expect_op(OP_EQUAL)?;
        cursor.expect_op(OP_IF)?;
        cursor.expect_op(OP_DROP)?;
        cursor.expect_op(OP_ELSE)?;
        let timelock = cursor.take_lock()?;
        cursor.expect_op(OP_DROP)?;
        cursor.expect_op(OP_ENDIF)?;
        (Some(admin_hash), timelock)
    } else {
        let timelock = cursor.take_lock()?;
        cursor.expect_op(OP_DROP)?;
        (None, timelock)
    };

    let refund = if cursor.peek_ops(&[OP_DUP, OP_HASH160]) {
        cursor.expect_op(OP_DUP)?;
        cursor.expect_op(OP_HASH160)?;
        let pkh: [u8; 20] = cursor.take_array()?;
        cursor.expect_op(OP_EQUALVERIFY)?;
        RefundPredicate::PubkeyHash(pkh)
    } else {
        RefundPredicate::Pubkey(cursor.take_pubkey()?)
    };

    cursor.expect_op(OP_ENDIF)?;
    cursor.expect_op(OP_CHECKSIG)?;
    if !cursor.finished() {
        return Err(ScriptError::UnrecognizedScript);
    }

    let funding_address = Address::p2shwsh(script, network);
    trace!(
        ?timelock,
        admin = admin_secret_hash.is_some(),
        "inspected swap redeem script"
    );

    Ok(SwapDetails {
        payment_hash,
        destination_pubkey,
        timelock,
        refund,
        admin_secret_hash,
        funding_address,
    })
}

/// Decodes a minimally encoded script number (little-endian, sign bit in the
/// top byte).
fn decode_script_num(bytes: &[u8]) -> Option<i64> {
    if bytes.is_empty() {
        return Some(0);
    }
    if bytes.len() > 5 {
        return None;
    }

    let mut value = 0i64;
    for (index, byte) in bytes.iter().enumerate() {
        value |= i64::from(*byte) << (8 * index);
    }

    let top = *bytes.last()?;
    if top & 0x80 != 0 {
        let sign_bit = 0x80i64 << (8 * (bytes.len() - 1));
        value &= !sign_bit;
        value = -value;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use bitcoin::{hashes::Hash as _, script::Builder};
    use hex_literal::hex;
    use secp256k1::{SecretKey, SECP256K1};

    use super::*;
    use crate::compile::{compile, SwapParams};

    const NETWORK: Network = Network::Regtest;

    fn pubkey(seed: u8) -> CompressedPublicKey {
        let sk = SecretKey::from_slice(&[seed; 32]).unwrap();
        CompressedPublicKey(sk.public_key(SECP256K1))
    }

    fn payment_hash() -> [u8; 32] {
        hex!("1111111111111111111111111111111111111111111111111111111111111111")
    }

    fn test_params() -> SwapParams {
        let refund_address = Address::p2wpkh(&pubkey(0x33), NETWORK).to_string();
        SwapParams {
            destination_pubkey: pubkey(0x22),
            payment_hash: bitcoin::hashes::sha256::Hash::from_byte_array(payment_hash()),
            refund_address,
            timelock_height: 500_000,
        }
    }

    /// Prefix shared by every test layout: the claim hashlock and branch.
    fn claim_prefix() -> Builder {
        Builder::new()
            .push_opcode(OP_DUP)
            .push_opcode(OP_SHA256)
            .push_slice(payment_hash())
            .push_opcode(OP_EQUAL)
            .push_opcode(OP_IF)
            .push_opcode(OP_DROP)
            .push_slice(pubkey(0x22).to_bytes())
            .push_opcode(OP_ELSE)
    }

    fn relative_pubkey_refund_script(csv_value: u32) -> bitcoin::ScriptBuf {
        claim_prefix()
            .push_int(i64::from(csv_value))
            .push_opcode(OP_CSV)
            .push_opcode(OP_DROP)
            .push_slice(pubkey(0x44).to_bytes())
            .push_opcode(OP_ENDIF)
            .push_opcode(OP_CHECKSIG)
            .into_script()
    }

    fn admin_pkh_refund_script(admin_hash: [u8; 32]) -> bitcoin::ScriptBuf {
        let refund_pkh =
            bitcoin::hashes::hash160::Hash::hash(&pubkey(0x33).to_bytes()).to_byte_array();
        claim_prefix()
            .push_opcode(OP_DUP)
            .push_opcode(OP_SHA256)
            .push_slice(admin_hash)
            .push_opcode(OP_EQUAL)
            .push_opcode(OP_IF)
            .push_opcode(OP_DROP)
            .push_opcode(OP_ELSE)
            .push_int(500_000)
            .push_opcode(OP_CLTV)
            .push_opcode(OP_DROP)
            .push_opcode(OP_ENDIF)
            .push_opcode(OP_DUP)
            .push_opcode(OP_HASH160)
            .push_slice(refund_pkh)
            .push_opcode(OP_EQUALVERIFY)
            .push_opcode(OP_ENDIF)
            .push_opcode(OP_CHECKSIG)
            .into_script()
    }

    #[test]
    fn test_round_trip_with_compile() {
        let params = test_params();
        let script = compile(&params, NETWORK).unwrap();
        let details = inspect(&script, NETWORK).unwrap();

        assert_eq!(details.timelock, Timelock::Absolute(500_000));
        assert_eq!(details.payment_hash, payment_hash());
        assert_eq!(details.destination_pubkey, params.destination_pubkey);
        assert_eq!(
            details.refund,
            RefundPredicate::PubkeyHash(
                crate::address::refund_pubkey_hash(&params.refund_address, NETWORK).unwrap()
            )
        );
        assert!(details.admin_secret_hash.is_none());
        assert_eq!(details.funding_address, Address::p2shwsh(&script, NETWORK));
    }

    #[test]
    fn test_relative_pubkey_refund_layout() {
        let script = relative_pubkey_refund_script(144);
        let details = inspect(&script, NETWORK).unwrap();

        assert_eq!(details.timelock, Timelock::Relative(144));
        assert_eq!(details.refund, RefundPredicate::Pubkey(pubkey(0x44)));
        assert!(details.admin_secret_hash.is_none());
    }

    #[test]
    fn test_admin_hashlock_layout() {
        let admin_hash = [0x55; 32];
        let script = admin_pkh_refund_script(admin_hash);
        let details = inspect(&script, NETWORK).unwrap();

        assert_eq!(details.admin_secret_hash, Some(admin_hash));
        assert_eq!(details.timelock, Timelock::Absolute(500_000));
        assert!(matches!(details.refund, RefundPredicate::PubkeyHash(_)));
    }

    #[test]
    fn test_small_pushnum_lock_value() {
        let script = relative_pubkey_refund_script(6);
        let details = inspect(&script, NETWORK).unwrap();
        assert_eq!(details.timelock, Timelock::Relative(6));
    }

    #[test]
    fn test_reject_foreign_script() {
        let script = Builder::new()
            .push_opcode(OP_DUP)
            .push_opcode(OP_HASH160)
            .push_slice([0x00; 20])
            .push_opcode(OP_EQUALVERIFY)
            .push_opcode(OP_CHECKSIG)
            .into_script();

        let result = inspect(&script, NETWORK);
        assert!(matches!(result, Err(ScriptError::UnrecognizedScript)));
    }

    #[test]
    fn test_reject_trailing_bytes() {
        let mut bytes = compile(&test_params(), NETWORK).unwrap().into_bytes();
        bytes.push(OP_DROP.to_u8());

        let result = inspect(bitcoin::Script::from_bytes(&bytes), NETWORK);
        assert!(matches!(result, Err(ScriptError::UnrecognizedScript)));
    }

    #[test]
    fn test_decode_script_num() {
        assert_eq!(decode_script_num(&[]), Some(0));
        assert_eq!(decode_script_num(&[0x90, 0x00]), Some(144));
        assert_eq!(decode_script_num(&hex!("20a107")), Some(500_000));
        assert_eq!(decode_script_num(&[0x90]), Some(-16));
        assert_eq!(decode_script_num(&[0; 6]), None);
    }
}
