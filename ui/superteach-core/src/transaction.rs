//! Solana legacy transaction building for a single System Program transfer.
//!
//! The wire layout is `[shortvec sig count][signatures][message]`, where the
//! message is `[header][shortvec keys][keys][blockhash][shortvec ixs][ixs]`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, WalletError};

pub const PUBKEY_LEN: usize = 32;
pub const SIGNATURE_LEN: usize = 64;

const SYSTEM_PROGRAM_ID: Pubkey = Pubkey([0u8; PUBKEY_LEN]);
const TRANSFER_INSTRUCTION: u32 = 2;
const MAX_MESSAGE_LEN: usize = 512;

/// Ed25519 public key, displayed as base58.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pubkey([u8; PUBKEY_LEN]);

impl Pubkey {
    pub const fn new_from_array(bytes: [u8; PUBKEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(&self) -> [u8; PUBKEY_LEN] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; PUBKEY_LEN] {
        &self.0
    }
}

impl FromStr for Pubkey {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self> {
        decode_32(s)
            .map(Self)
            .ok_or_else(|| WalletError::InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({self})")
    }
}

/// Recent blockhash anchoring a transaction's validity window.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Hash([u8; 32]);

impl Hash {
    pub const fn new_from_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Hash {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self> {
        decode_32(s)
            .map(Self)
            .ok_or_else(|| WalletError::JsonParse(format!("invalid blockhash '{s}'")))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({self})")
    }
}

fn decode_32(s: &str) -> Option<[u8; 32]> {
    let bytes = bs58::decode(s.trim()).into_vec().ok()?;
    bytes.try_into().ok()
}

/// A single-signer transaction. Signature slots start zeroed until the
/// wallet provider fills them in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    fee_payer: Pubkey,
    signatures: Vec<[u8; SIGNATURE_LEN]>,
    message: Vec<u8>,
}

impl Transaction {
    /// Build an unsigned transfer of `lamports` from `from` (also the fee
    /// payer) to `to`.
    pub fn transfer(from: &Pubkey, to: &Pubkey, lamports: u64, recent_blockhash: &Hash) -> Self {
        let self_transfer = from == to;

        let mut msg = Vec::with_capacity(MAX_MESSAGE_LEN);

        // Header
        msg.push(1); // num_required_signatures
        msg.push(0); // num_readonly_signed
        msg.push(1); // num_readonly_unsigned (System Program)

        // Account keys: payer, recipient (unless it is the payer), program
        let (to_index, program_index) = if self_transfer { (0u8, 1u8) } else { (1u8, 2u8) };
        append_shortvec(&mut msg, program_index as usize + 1);
        msg.extend_from_slice(from.as_bytes());
        if !self_transfer {
            msg.extend_from_slice(to.as_bytes());
        }
        msg.extend_from_slice(SYSTEM_PROGRAM_ID.as_bytes());

        msg.extend_from_slice(&recent_blockhash.0);

        append_shortvec(&mut msg, 1);

        // Transfer instruction
        msg.push(program_index);
        append_shortvec(&mut msg, 2);
        msg.push(0);
        msg.push(to_index);

        // 4-byte instruction tag + 8-byte lamports, both little-endian
        let mut data = [0u8; 12];
        data[..4].copy_from_slice(&TRANSFER_INSTRUCTION.to_le_bytes());
        data[4..].copy_from_slice(&lamports.to_le_bytes());
        append_shortvec(&mut msg, data.len());
        msg.extend_from_slice(&data);

        Self {
            fee_payer: *from,
            signatures: vec![[0u8; SIGNATURE_LEN]],
            message: msg,
        }
    }

    pub fn fee_payer(&self) -> &Pubkey {
        &self.fee_payer
    }

    /// Bytes the signer must sign.
    pub fn message_data(&self) -> &[u8] {
        &self.message
    }

    pub fn add_signature(&mut self, signer: &Pubkey, signature: [u8; SIGNATURE_LEN]) -> Result<()> {
        if signer != &self.fee_payer {
            return Err(WalletError::Signing(format!(
                "{signer} is not a required signer (fee payer is {})",
                self.fee_payer
            )));
        }
        self.signatures[0] = signature;
        Ok(())
    }

    pub fn is_signed(&self) -> bool {
        self.signatures.iter().all(|s| s.iter().any(|b| *b != 0))
    }

    /// Base58 fee-payer signature, which is also the transaction id.
    pub fn signature(&self) -> Option<String> {
        if !self.is_signed() {
            return None;
        }
        self.signatures
            .first()
            .map(|s| bs58::encode(s).into_string())
    }

    /// Wire bytes, ready for `sendTransaction`.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        if !self.is_signed() {
            return Err(WalletError::Signing("transaction is not signed".into()));
        }
        let mut tx = Vec::with_capacity(1 + SIGNATURE_LEN * self.signatures.len() + self.message.len());
        append_shortvec(&mut tx, self.signatures.len());
        for sig in &self.signatures {
            tx.extend_from_slice(sig);
        }
        tx.extend_from_slice(&self.message);
        Ok(tx)
    }
}

/// Append a compact-u16 encoded value (Solana "shortvec").
fn append_shortvec(buf: &mut Vec<u8>, mut value: usize) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}
