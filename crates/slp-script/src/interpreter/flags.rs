//! Script verification flags (bitmask).

use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Script verification flags controlling interpreter behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScriptFlags(pub u32);

#[allow(missing_docs)]
impl ScriptFlags {
    pub const NONE: ScriptFlags = ScriptFlags(0);
    pub const BIP16: ScriptFlags = ScriptFlags(1 << 0);
    pub const VERIFY_STRICT_ENCODING: ScriptFlags = ScriptFlags(1 << 1);
    pub const VERIFY_DER_SIGNATURES: ScriptFlags = ScriptFlags(1 << 2);
    pub const VERIFY_LOW_S: ScriptFlags = ScriptFlags(1 << 3);
    pub const VERIFY_SIG_PUSH_ONLY: ScriptFlags = ScriptFlags(1 << 4);
    pub const VERIFY_MINIMAL_DATA: ScriptFlags = ScriptFlags(1 << 5);
    pub const VERIFY_CLEAN_STACK: ScriptFlags = ScriptFlags(1 << 6);
    pub const VERIFY_CHECKLOCKTIMEVERIFY: ScriptFlags = ScriptFlags(1 << 7);
    pub const VERIFY_CHECKSEQUENCEVERIFY: ScriptFlags = ScriptFlags(1 << 8);
    pub const VERIFY_NULL_FAIL: ScriptFlags = ScriptFlags(1 << 9);
    pub const ENABLE_SIGHASH_FORKID: ScriptFlags = ScriptFlags(1 << 10);

    /// Flags a relaying node applies to spends of P2PKH and P2SH outputs.
    pub const STANDARD: ScriptFlags = ScriptFlags(
        Self::BIP16.0
            | Self::VERIFY_STRICT_ENCODING.0
            | Self::VERIFY_DER_SIGNATURES.0
            | Self::VERIFY_LOW_S.0
            | Self::VERIFY_SIG_PUSH_ONLY.0
            | Self::VERIFY_MINIMAL_DATA.0
            | Self::VERIFY_CLEAN_STACK.0
            | Self::VERIFY_CHECKLOCKTIMEVERIFY.0
            | Self::VERIFY_CHECKSEQUENCEVERIFY.0
            | Self::VERIFY_NULL_FAIL.0
            | Self::ENABLE_SIGHASH_FORKID.0,
    );

    pub fn has_flag(self, flag: ScriptFlags) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub fn add_flag(&mut self, flag: ScriptFlags) {
        self.0 |= flag.0;
    }
}

impl BitOr for ScriptFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        ScriptFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ScriptFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ScriptFlags {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        ScriptFlags(self.0 & rhs.0)
    }
}
