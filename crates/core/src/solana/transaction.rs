//! Legacy Solana transaction wire format.
//!
//! ```text
//! transaction  = compact-u16 sig_count, sig_count * 64-byte signature, message
//! message      = u8 required_sigs, u8 readonly_signed, u8 readonly_unsigned,
//!                compact-u16 key_count, key_count * 32-byte key,
//!                32-byte recent_blockhash,
//!                compact-u16 ix_count, ix_count * instruction
//! instruction  = u8 program_index, compact-u16 n, n * u8 account_index,
//!                compact-u16 len, len * u8 data
//! ```

use ed25519_dalek::{Signer, SigningKey};

use crate::errors::CoreError;

/// System Program id: 32 zero bytes.
pub const SYSTEM_PROGRAM_ID: [u8; 32] = [0u8; 32];

/// `SystemInstruction::Transfer` discriminant.
const SYSTEM_TRANSFER: u32 = 2;

/// Encode `value` as a compact-u16 (7 bits per byte, high bit = continue).
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut rest = value as u32;
    let mut out = Vec::with_capacity(3);
    loop {
        let low = (rest & 0x7f) as u8;
        rest >>= 7;
        if rest == 0 {
            out.push(low);
            return out;
        }
        out.push(low | 0x80);
    }
}

/// Decode a compact-u16 from the front of `data`.
/// Returns `(value, bytes_consumed)`.
pub fn decode_compact_u16(data: &[u8]) -> Result<(u16, usize), CoreError> {
    let mut value: u32 = 0;
    for (i, byte) in data.iter().take(3).enumerate() {
        value |= ((byte & 0x7f) as u32) << (7 * i);
        if byte & 0x80 == 0 {
            return u16::try_from(value)
                .map(|v| (v, i + 1))
                .map_err(|_| CoreError::Serialization("compact-u16 overflow".into()));
        }
    }
    Err(CoreError::Serialization("truncated compact-u16".into()))
}

#[derive(Debug, Clone)]
pub struct AccountMeta {
    pub pubkey: [u8; 32],
    pub is_signer: bool,
    pub is_writable: bool,
}

#[derive(Debug, Clone)]
pub struct Instruction {
    pub program_id: [u8; 32],
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

/// An instruction with account references resolved to key indices.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

/// A compiled, unsigned message.
#[derive(Debug, Clone)]
pub struct Message {
    /// Ordered: writable signers, readonly signers, writable non-signers,
    /// readonly non-signers. The fee payer is always index 0.
    pub account_keys: Vec<[u8; 32]>,
    pub num_required_signatures: u8,
    pub num_readonly_signed: u8,
    pub num_readonly_unsigned: u8,
    pub recent_blockhash: [u8; 32],
    pub instructions: Vec<CompiledInstruction>,
}

/// System Program transfer of `lamports` from `from` to `to`.
pub fn system_transfer(from: &[u8; 32], to: &[u8; 32], lamports: u64) -> Instruction {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    Instruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![
            AccountMeta {
                pubkey: *from,
                is_signer: true,
                is_writable: true,
            },
            AccountMeta {
                pubkey: *to,
                is_signer: false,
                is_writable: true,
            },
        ],
        data,
    }
}

/// Build the message for a single native SOL transfer paid by `from`.
pub fn build_sol_transfer(
    from: &[u8; 32],
    to: &[u8; 32],
    lamports: u64,
    recent_blockhash: &[u8; 32],
) -> Result<Message, CoreError> {
    if lamports == 0 {
        return Err(CoreError::ValidationError("lamports must be > 0".into()));
    }
    compile_message(&[system_transfer(from, to, lamports)], from, recent_blockhash)
}

/// Compile instructions into a message with `fee_payer` as the sole payer.
pub fn compile_message(
    instructions: &[Instruction],
    fee_payer: &[u8; 32],
    recent_blockhash: &[u8; 32],
) -> Result<Message, CoreError> {
    // (key, signer, writable) in first-seen order; lists are tiny.
    let mut keys: Vec<([u8; 32], bool, bool)> = vec![(*fee_payer, true, true)];
    let mut merge = |pubkey: [u8; 32], signer: bool, writable: bool| {
        match keys.iter_mut().find(|(k, _, _)| *k == pubkey) {
            Some(entry) => {
                entry.1 |= signer;
                entry.2 |= writable;
            }
            None => keys.push((pubkey, signer, writable)),
        }
    };
    for ix in instructions {
        for meta in &ix.accounts {
            merge(meta.pubkey, meta.is_signer, meta.is_writable);
        }
        merge(ix.program_id, false, false);
    }

    // Stable sort keeps the fee payer first among writable signers.
    keys.sort_by_key(|&(_, signer, writable)| match (signer, writable) {
        (true, true) => 0u8,
        (true, false) => 1,
        (false, true) => 2,
        (false, false) => 3,
    });

    if keys.len() > u8::MAX as usize {
        return Err(CoreError::ValidationError("too many accounts in transaction".into()));
    }

    let num_required_signatures = keys.iter().filter(|k| k.1).count() as u8;
    let num_readonly_signed = keys.iter().filter(|k| k.1 && !k.2).count() as u8;
    let num_readonly_unsigned = keys.iter().filter(|k| !k.1 && !k.2).count() as u8;
    let account_keys: Vec<[u8; 32]> = keys.into_iter().map(|(k, _, _)| k).collect();

    let index_of = |key: &[u8; 32]| -> Result<u8, CoreError> {
        account_keys
            .iter()
            .position(|k| k == key)
            .map(|i| i as u8)
            .ok_or_else(|| CoreError::ValidationError("account missing from key list".into()))
    };

    let instructions = instructions
        .iter()
        .map(|ix| {
            Ok(CompiledInstruction {
                program_id_index: index_of(&ix.program_id)?,
                account_indices: ix
                    .accounts
                    .iter()
                    .map(|m| index_of(&m.pubkey))
                    .collect::<Result<_, _>>()?,
                data: ix.data.clone(),
            })
        })
        .collect::<Result<Vec<_>, CoreError>>()?;

    Ok(Message {
        account_keys,
        num_required_signatures,
        num_readonly_signed,
        num_readonly_unsigned,
        recent_blockhash: *recent_blockhash,
        instructions,
    })
}

/// Serialize the message; these are the bytes that get signed.
pub fn serialize_message(message: &Message) -> Vec<u8> {
    let mut buf = Vec::with_capacity(3 + 1 + 32 * message.account_keys.len() + 32 + 64);
    buf.push(message.num_required_signatures);
    buf.push(message.num_readonly_signed);
    buf.push(message.num_readonly_unsigned);

    buf.extend_from_slice(&encode_compact_u16(message.account_keys.len() as u16));
    for key in &message.account_keys {
        buf.extend_from_slice(key);
    }
    buf.extend_from_slice(&message.recent_blockhash);

    buf.extend_from_slice(&encode_compact_u16(message.instructions.len() as u16));
    for ix in &message.instructions {
        buf.push(ix.program_id_index);
        buf.extend_from_slice(&encode_compact_u16(ix.account_indices.len() as u16));
        buf.extend_from_slice(&ix.account_indices);
        buf.extend_from_slice(&encode_compact_u16(ix.data.len() as u16));
        buf.extend_from_slice(&ix.data);
    }
    buf
}

/// Sign a single-signer message and return the full wire transaction
/// together with its signature (the transaction id).
pub fn sign_message(
    message: &Message,
    signer: &SigningKey,
) -> Result<(Vec<u8>, [u8; 64]), CoreError> {
    if message.num_required_signatures != 1 {
        return Err(CoreError::ValidationError(format!(
            "expected exactly one signer, message requires {}",
            message.num_required_signatures
        )));
    }
    if message.account_keys.first() != Some(signer.verifying_key().as_bytes()) {
        return Err(CoreError::Wallet(
            "signing key is not the fee payer of this message".into(),
        ));
    }

    let body = serialize_message(message);
    let signature = signer.sign(&body).to_bytes();

    let mut wire = Vec::with_capacity(1 + 64 + body.len());
    wire.extend_from_slice(&encode_compact_u16(1));
    wire.extend_from_slice(&signature);
    wire.extend_from_slice(&body);
    Ok((wire, signature))
}
