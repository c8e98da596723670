//! Token identifier type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use slp_primitives::chainhash::Hash;

use crate::error::TokenError;

/// An SLP token id: the id of the token's GENESIS transaction.
///
/// SLP scripts carry it in display (big-endian) order, the same order as
/// its hex form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TokenId(Hash);

impl TokenId {
    /// The token created by GENESIS transaction `txid`.
    pub fn from_txid(txid: Hash) -> Self {
        TokenId(txid)
    }

    /// Parse a 64-character hex token id.
    pub fn from_hex(hex_str: &str) -> Result<Self, TokenError> {
        Ok(TokenId(Hash::from_hex(hex_str)?))
    }

    /// Create from the 32 bytes pushed in an SLP script.
    pub fn from_display_bytes(bytes: &[u8]) -> Result<Self, TokenError> {
        Ok(TokenId(Hash::from_display_bytes(bytes)?))
    }

    /// The 32 bytes pushed in an SLP script.
    pub fn to_display_bytes(&self) -> [u8; 32] {
        self.0.to_display_bytes()
    }

    /// The GENESIS transaction id.
    pub fn txid(&self) -> Hash {
        self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TokenId {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "959a6818cba5af8aba391d3f7649f5f6a5ceb6cdcd2c2a3dcb5d2fbfc4b08e98";

    #[test]
    fn hex_and_display_bytes_agree() {
        let id = TokenId::from_hex(ID).unwrap();
        assert_eq!(id.to_string(), ID);
        assert_eq!(hex::encode(id.to_display_bytes()), ID);
        assert_eq!(TokenId::from_display_bytes(&id.to_display_bytes()).unwrap(), id);
        // the txid is stored in internal order
        assert_eq!(id.txid().as_bytes()[0], 0x98);
    }

    #[test]
    fn serde_roundtrip() {
        let id: TokenId = ID.parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", ID));
        let restored: TokenId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, restored);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(TokenId::from_hex("abcd").is_err());
        assert!(TokenId::from_display_bytes(&[0u8; 31]).is_err());
    }
}
