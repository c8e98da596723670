//! Versioned unlock stack layouts.

use slp_transaction::sighash::PreimageParts;

use crate::error::TokenError;

/// Largest stack element the interpreter accepts.
const MAX_ELEMENT_SIZE: usize = 520;

/// What a stack slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// DER signature with the sighash byte appended.
    Signature,
    /// Preimage nVersion.
    Version,
    /// Preimage hashPrevouts.
    HashPrevouts,
    /// Preimage hashSequence.
    HashSequence,
    /// Preimage outpoint.
    Outpoint,
    /// Preimage scriptCode, with its VarInt length prefix.
    ScriptCode,
    /// Preimage value of the spent output.
    Value,
    /// Preimage nSequence.
    Sequence,
    /// Preimage hashOutputs.
    HashOutputs,
    /// Preimage nLockTime.
    LockTime,
    /// Preimage sighash type.
    SighashType,
    /// Minted quantity, 8 bytes big-endian.
    Quantity,
    /// Public key hash receiving the minted quantity.
    ReceiverHash,
    /// Serialized outputs after index 2, possibly empty.
    TrailingOutputs,
}

/// Byte width a slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotWidth {
    /// Exactly this many bytes.
    Fixed(usize),
    /// Between `min` and `max` bytes inclusive.
    Variable {
        /// Smallest accepted length.
        min: usize,
        /// Largest accepted length.
        max: usize,
    },
}

impl SlotWidth {
    /// `true` if `len` bytes fit.
    pub fn accepts(&self, len: usize) -> bool {
        match *self {
            SlotWidth::Fixed(n) => len == n,
            SlotWidth::Variable { min, max } => (min..=max).contains(&len),
        }
    }
}

/// One stack slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Contents.
    pub kind: SlotKind,
    /// Accepted width.
    pub width: SlotWidth,
}

const fn fixed(kind: SlotKind, n: usize) -> Slot {
    Slot { kind, width: SlotWidth::Fixed(n) }
}

const fn variable(kind: SlotKind, min: usize, max: usize) -> Slot {
    Slot { kind, width: SlotWidth::Variable { min, max } }
}

/// Version 0 slots, top of stack first.
const V0_SLOTS: [Slot; 14] = [
    variable(SlotKind::Signature, 9, 73),
    fixed(SlotKind::Version, 4),
    fixed(SlotKind::HashPrevouts, 32),
    fixed(SlotKind::HashSequence, 32),
    fixed(SlotKind::Outpoint, 36),
    variable(SlotKind::ScriptCode, 2, MAX_ELEMENT_SIZE),
    fixed(SlotKind::Value, 8),
    fixed(SlotKind::Sequence, 4),
    fixed(SlotKind::HashOutputs, 32),
    fixed(SlotKind::LockTime, 4),
    fixed(SlotKind::SighashType, 4),
    fixed(SlotKind::Quantity, 8),
    fixed(SlotKind::ReceiverHash, 20),
    variable(SlotKind::TrailingOutputs, 0, MAX_ELEMENT_SIZE),
];

/// Stack layout a vault script expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnlockSchema {
    /// Layout of the version 0 vault.
    V0,
}

impl UnlockSchema {
    /// Schema version number.
    pub fn version(&self) -> u8 {
        match self {
            UnlockSchema::V0 => 0,
        }
    }

    /// Slots in the order the script pops them.
    pub fn slots(&self) -> &'static [Slot] {
        match self {
            UnlockSchema::V0 => &V0_SLOTS,
        }
    }

    /// Check every field against its slot and return the pushes in
    /// scriptSig order, the reverse of [`slots`](Self::slots).
    pub fn assemble(&self, fields: &UnlockFields) -> Result<Vec<Vec<u8>>, TokenError> {
        let mut pushes = Vec::with_capacity(self.slots().len());
        for slot in self.slots().iter().rev() {
            let value = fields.field(slot.kind);
            if !slot.width.accepts(value.len()) {
                return Err(TokenError::UnlockLayout(format!(
                    "{:?} is {} bytes, slot accepts {:?}",
                    slot.kind,
                    value.len(),
                    slot.width
                )));
            }
            pushes.push(value.to_vec());
        }
        Ok(pushes)
    }
}

/// Values for every slot kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockFields {
    /// DER signature with the sighash byte appended.
    pub signature: Vec<u8>,
    /// The ten preimage fields.
    pub preimage: PreimageParts,
    /// Minted quantity, big-endian.
    pub quantity: [u8; 8],
    /// Public key hash receiving the minted quantity.
    pub receiver_hash: [u8; 20],
    /// Serialized outputs after index 2.
    pub trailing_outputs: Vec<u8>,
}

impl UnlockFields {
    /// Bytes for slot `kind`.
    pub fn field(&self, kind: SlotKind) -> &[u8] {
        let p = &self.preimage;
        match kind {
            SlotKind::Signature => &self.signature[..],
            SlotKind::Version => &p.version[..],
            SlotKind::HashPrevouts => &p.hash_prevouts[..],
            SlotKind::HashSequence => &p.hash_sequence[..],
            SlotKind::Outpoint => &p.outpoint[..],
            SlotKind::ScriptCode => &p.script_code[..],
            SlotKind::Value => &p.value[..],
            SlotKind::Sequence => &p.sequence[..],
            SlotKind::HashOutputs => &p.hash_outputs[..],
            SlotKind::LockTime => &p.lock_time[..],
            SlotKind::SighashType => &p.sighash_type[..],
            SlotKind::Quantity => &self.quantity[..],
            SlotKind::ReceiverHash => &self.receiver_hash[..],
            SlotKind::TrailingOutputs => &self.trailing_outputs[..],
        }
    }
}
