//! Signature hash computation for transaction signing.
//!
//! Bitcoin Cash signs a BIP-143 style digest carrying the FORKID flag for
//! replay protection. Besides the digest, the ten preimage fields are
//! exposed individually as [`PreimageParts`]: covenant scripts receive them
//! as separate stack items and rebuild the preimage themselves.
//!
//! See <https://github.com/bitcoincashorg/bitcoincash.org/blob/master/spec/replay-protected-sighash.md>

use slp_primitives::hash::sha256d;
use slp_primitives::util::{ByteWriter, VarInt};

use crate::transaction::Transaction;
use crate::TransactionError;

// -----------------------------------------------------------------------
// Sighash flag constants
// -----------------------------------------------------------------------

/// Sign all inputs and all outputs (the default).
pub const SIGHASH_ALL: u32 = 0x01;

/// Sign all inputs but no outputs.
pub const SIGHASH_NONE: u32 = 0x02;

/// Sign all inputs and only the output with the same index as the signed input.
pub const SIGHASH_SINGLE: u32 = 0x03;

/// Only sign the current input.
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;

/// Replay-protection flag.
pub const SIGHASH_FORKID: u32 = 0x40;

/// The standard sighash type: ALL | FORKID.
pub const SIGHASH_ALL_FORKID: u32 = SIGHASH_ALL | SIGHASH_FORKID;

/// Mask applied to extract the base sighash type (ALL, NONE, SINGLE).
pub const SIGHASH_MASK: u32 = 0x1f;

/// The ten fields of a FORKID sighash preimage, each in wire form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreimageParts {
    /// nVersion, 4 bytes LE.
    pub version: [u8; 4],
    /// sha256d of all outpoints, or zeros with ANYONECANPAY.
    pub hash_prevouts: [u8; 32],
    /// sha256d of all sequences, or zeros.
    pub hash_sequence: [u8; 32],
    /// txid + vout of the input being signed.
    pub outpoint: [u8; 36],
    /// VarInt length followed by the scriptCode.
    pub script_code: Vec<u8>,
    /// Value of the spent output, 8 bytes LE.
    pub value: [u8; 8],
    /// nSequence of the input, 4 bytes LE.
    pub sequence: [u8; 4],
    /// sha256d of the committed outputs, or zeros.
    pub hash_outputs: [u8; 32],
    /// nLockTime, 4 bytes LE.
    pub lock_time: [u8; 4],
    /// Sighash type, 4 bytes LE.
    pub sighash_type: [u8; 4],
}

impl PreimageParts {
    /// The fields in preimage order.
    pub fn fields(&self) -> [&[u8]; 10] {
        [
            &self.version,
            &self.hash_prevouts,
            &self.hash_sequence,
            &self.outpoint,
            &self.script_code,
            &self.value,
            &self.sequence,
            &self.hash_outputs,
            &self.lock_time,
            &self.sighash_type,
        ]
    }

    /// Concatenate the fields into the preimage.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(156 + self.script_code.len());
        for field in self.fields() {
            writer.write_bytes(field);
        }
        writer.into_bytes()
    }
}

// -----------------------------------------------------------------------
// BIP-143 (FORKID) signature hash
// -----------------------------------------------------------------------

/// Compute the signature hash for input `input_index`.
///
/// # Arguments
/// * `tx`                  - The transaction being signed.
/// * `input_index`         - Index of the input being signed.
/// * `prev_output_script`  - The scriptCode (locking or redeem script).
/// * `sighash_type`        - The combined sighash flags.
/// * `satoshis`            - The satoshi value of the output being spent.
pub fn signature_hash(
    tx: &Transaction,
    input_index: usize,
    prev_output_script: &[u8],
    sighash_type: u32,
    satoshis: u64,
) -> Result<[u8; 32], TransactionError> {
    let preimage = calc_preimage(tx, input_index, prev_output_script, sighash_type, satoshis)?;
    Ok(sha256d(&preimage))
}

/// Compute the preimage bytes before double hashing.
pub fn calc_preimage(
    tx: &Transaction,
    input_index: usize,
    prev_output_script: &[u8],
    sighash_type: u32,
    satoshis: u64,
) -> Result<Vec<u8>, TransactionError> {
    calc_preimage_parts(tx, input_index, prev_output_script, sighash_type, satoshis)
        .map(|parts| parts.to_bytes())
}

/// Compute the preimage split into its ten fields.
pub fn calc_preimage_parts(
    tx: &Transaction,
    input_index: usize,
    prev_output_script: &[u8],
    sighash_type: u32,
    satoshis: u64,
) -> Result<PreimageParts, TransactionError> {
    let input = tx.inputs.get(input_index).ok_or_else(|| {
        TransactionError::InvalidTransaction(format!(
            "input index {} out of range (tx has {} inputs)",
            input_index,
            tx.inputs.len()
        ))
    })?;
    let base_type = sighash_type & SIGHASH_MASK;
    let anyone_can_pay = sighash_type & SIGHASH_ANYONECANPAY != 0;

    let hash_prevouts = if !anyone_can_pay {
        prevouts_hash(tx)
    } else {
        [0u8; 32]
    };

    let hash_sequence =
        if !anyone_can_pay && base_type != SIGHASH_SINGLE && base_type != SIGHASH_NONE {
            sequence_hash(tx)
        } else {
            [0u8; 32]
        };

    let hash_outputs = if base_type != SIGHASH_SINGLE && base_type != SIGHASH_NONE {
        outputs_hash(tx, None)
    } else if base_type == SIGHASH_SINGLE && input_index < tx.outputs.len() {
        outputs_hash(tx, Some(input_index))
    } else {
        [0u8; 32]
    };

    let mut outpoint = ByteWriter::with_capacity(36);
    input.write_outpoint(&mut outpoint);
    let mut outpoint_bytes = [0u8; 36];
    outpoint_bytes.copy_from_slice(outpoint.as_bytes());

    let mut script_code = VarInt::from(prev_output_script.len()).to_bytes();
    script_code.extend_from_slice(prev_output_script);

    Ok(PreimageParts {
        version: tx.version.to_le_bytes(),
        hash_prevouts,
        hash_sequence,
        outpoint: outpoint_bytes,
        script_code,
        value: satoshis.to_le_bytes(),
        sequence: input.sequence_number.to_le_bytes(),
        hash_outputs,
        lock_time: tx.lock_time.to_le_bytes(),
        sighash_type: sighash_type.to_le_bytes(),
    })
}

// -----------------------------------------------------------------------
// Internal helper functions
// -----------------------------------------------------------------------

fn prevouts_hash(tx: &Transaction) -> [u8; 32] {
    let mut writer = ByteWriter::with_capacity(tx.inputs.len() * 36);
    for input in &tx.inputs {
        input.write_outpoint(&mut writer);
    }
    sha256d(writer.as_bytes())
}

fn sequence_hash(tx: &Transaction) -> [u8; 32] {
    let mut writer = ByteWriter::with_capacity(tx.inputs.len() * 4);
    for input in &tx.inputs {
        writer.write_u32_le(input.sequence_number);
    }
    sha256d(writer.as_bytes())
}

/// sha256d of all outputs, or only output `n` for SIGHASH_SINGLE.
fn outputs_hash(tx: &Transaction, n: Option<usize>) -> [u8; 32] {
    let mut writer = ByteWriter::new();
    match n {
        None => {
            for output in &tx.outputs {
                output.write_to(&mut writer);
            }
        }
        Some(i) => tx.outputs[i].write_to(&mut writer),
    }
    sha256d(writer.as_bytes())
}
