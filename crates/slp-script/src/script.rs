/// Script type - a sequence of opcodes and data pushes.
///
/// Scripts appear in transaction inputs (unlocking) and outputs (locking).
/// `Script` wraps a `Vec<u8>` and provides construction, classification,
/// serialization and ASM rendering for the shapes the SLP SDK deals with:
/// P2PKH, P2SH and `OP_RETURN` metadata.

use std::fmt;

use crate::chunk::{decode_script, push_data_prefix, ScriptChunk};
use crate::opcodes::*;
use crate::ScriptError;

/// A script, represented as a byte vector newtype.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Script(Vec<u8>);

impl Script {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Create a new empty script.
    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Create a script from a hex-encoded string.
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        Ok(Script(hex::decode(hex_str)?))
    }

    /// Create a script from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    /// Parse a space-separated ASM string.
    ///
    /// Known `OP_xxx` names become opcodes, `0` becomes `OP_0` and every
    /// other token is treated as hex push data.
    pub fn from_asm(asm: &str) -> Result<Self, ScriptError> {
        let mut script = Script::new();
        for token in asm.split_whitespace() {
            if token == "0" {
                script.0.push(OP_0);
            } else if let Some(opcode) = string_to_opcode(token) {
                script.0.push(opcode);
            } else {
                let data = hex::decode(token)
                    .map_err(|_| ScriptError::InvalidOpcodeData(token.to_string()))?;
                script.append_push_data(&data)?;
            }
        }
        Ok(script)
    }

    /// `OP_DUP OP_HASH160 <pkh> OP_EQUALVERIFY OP_CHECKSIG`.
    pub fn new_p2pkh(pub_key_hash: &[u8; 20]) -> Self {
        let mut b = Vec::with_capacity(25);
        b.extend_from_slice(&[OP_DUP, OP_HASH160, OP_DATA_20]);
        b.extend_from_slice(pub_key_hash);
        b.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
        Script(b)
    }

    /// `OP_HASH160 <script hash> OP_EQUAL`.
    pub fn new_p2sh(script_hash: &[u8; 20]) -> Self {
        let mut b = Vec::with_capacity(23);
        b.extend_from_slice(&[OP_HASH160, OP_DATA_20]);
        b.extend_from_slice(script_hash);
        b.push(OP_EQUAL);
        Script(b)
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Encode the script as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Render the script as ASM.
    ///
    /// Returns an empty string for empty or truncated scripts.
    pub fn to_asm(&self) -> String {
        match self.chunks() {
            Ok(chunks) => chunks
                .iter()
                .map(ScriptChunk::to_asm_string)
                .collect::<Vec<_>>()
                .join(" "),
            Err(_) => String::new(),
        }
    }

    /// Borrow the underlying bytes.
    pub fn to_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the script and return its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Length of the script in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if the script has no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // -----------------------------------------------------------------------
    // Classification
    // -----------------------------------------------------------------------

    /// `true` for `OP_DUP OP_HASH160 <20> OP_EQUALVERIFY OP_CHECKSIG`.
    pub fn is_p2pkh(&self) -> bool {
        let b = &self.0;
        b.len() == 25
            && b[0] == OP_DUP
            && b[1] == OP_HASH160
            && b[2] == OP_DATA_20
            && b[23] == OP_EQUALVERIFY
            && b[24] == OP_CHECKSIG
    }

    /// `true` for `OP_HASH160 <20> OP_EQUAL`.
    pub fn is_p2sh(&self) -> bool {
        let b = &self.0;
        b.len() == 23 && b[0] == OP_HASH160 && b[1] == OP_DATA_20 && b[22] == OP_EQUAL
    }

    /// `true` if the script starts with `OP_RETURN` (or `OP_FALSE OP_RETURN`).
    pub fn is_data(&self) -> bool {
        let b = &self.0;
        (!b.is_empty() && b[0] == OP_RETURN)
            || (b.len() > 1 && b[0] == OP_FALSE && b[1] == OP_RETURN)
    }

    /// `true` if every chunk is a data push or small integer.
    pub fn is_push_only(&self) -> bool {
        match self.chunks() {
            Ok(chunks) => chunks.iter().all(|c| c.op <= OP_16 && c.op != OP_RESERVED),
            Err(_) => false,
        }
    }

    // -----------------------------------------------------------------------
    // Data extraction
    // -----------------------------------------------------------------------

    /// The 20-byte public key hash of a P2PKH script.
    pub fn public_key_hash(&self) -> Option<[u8; 20]> {
        if !self.is_p2pkh() {
            return None;
        }
        self.0[3..23].try_into().ok()
    }

    /// The 20-byte script hash of a P2SH script.
    pub fn script_hash(&self) -> Option<[u8; 20]> {
        if !self.is_p2sh() {
            return None;
        }
        self.0[2..22].try_into().ok()
    }

    /// Parse the script into chunks.
    pub fn chunks(&self) -> Result<Vec<ScriptChunk>, ScriptError> {
        decode_script(&self.0)
    }

    // -----------------------------------------------------------------------
    // Building
    // -----------------------------------------------------------------------

    /// Append `data` with its minimal push prefix. Empty data pushes `OP_0`.
    pub fn append_push_data(&mut self, data: &[u8]) -> Result<&mut Self, ScriptError> {
        let prefix = push_data_prefix(data.len())?;
        self.0.extend_from_slice(&prefix);
        self.0.extend_from_slice(data);
        Ok(self)
    }

    /// Append `data` with an explicit `OP_PUSHDATA1` prefix.
    ///
    /// SLP encodes empty fields as `OP_PUSHDATA1 0x00` rather than `OP_0`.
    pub fn append_pushdata1(&mut self, data: &[u8]) -> Result<&mut Self, ScriptError> {
        let len = u8::try_from(data.len()).map_err(|_| ScriptError::DataTooBig)?;
        self.0.push(OP_PUSHDATA1);
        self.0.push(len);
        self.0.extend_from_slice(data);
        Ok(self)
    }

    /// Append non-push opcodes.
    ///
    /// Push opcodes are rejected; use `append_push_data` for those.
    pub fn append_opcodes(&mut self, opcodes: &[u8]) -> Result<&mut Self, ScriptError> {
        for &op in opcodes {
            if (OP_DATA_1..=OP_PUSHDATA4).contains(&op) {
                return Err(ScriptError::InvalidOpcodeType(
                    opcode_to_string(op).to_string(),
                ));
            }
        }
        self.0.extend_from_slice(opcodes);
        Ok(self)
    }

    /// Append the shortest push of a non-negative integer.
    ///
    /// `0..=16` use `OP_0`..`OP_16`; larger values are pushed as minimally
    /// encoded script numbers.
    pub fn append_number(&mut self, n: u64) -> Result<&mut Self, ScriptError> {
        if n <= 16 {
            if let Some(op) = small_int_opcode(n as usize) {
                self.0.push(op);
                return Ok(self);
            }
        }
        let mut bytes = Vec::new();
        let mut v = n;
        while v > 0 {
            bytes.push((v & 0xff) as u8);
            v >>= 8;
        }
        if bytes.last().map_or(false, |b| b & 0x80 != 0) {
            bytes.push(0x00);
        }
        self.append_push_data(&bytes)
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }
}

impl AsRef<[u8]> for Script {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl serde::Serialize for Script {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Script {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Script::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P2PKH_HEX: &str = "76a91476a04053bda0a88bda5177b86a15c3b29f55987388ac";
    const PKH: [u8; 20] = [
        0x76, 0xa0, 0x40, 0x53, 0xbd, 0xa0, 0xa8, 0x8b, 0xda, 0x51,
        0x77, 0xb8, 0x6a, 0x15, 0xc3, 0xb2, 0x9f, 0x55, 0x98, 0x73,
    ];

    #[test]
    fn test_p2pkh_roundtrip() {
        let script = Script::new_p2pkh(&PKH);
        assert_eq!(script.to_hex(), P2PKH_HEX);
        assert!(script.is_p2pkh());
        assert!(!script.is_p2sh());
        assert_eq!(script.public_key_hash(), Some(PKH));
        assert_eq!(script.script_hash(), None);
        assert_eq!(
            script.to_asm(),
            "OP_DUP OP_HASH160 76a04053bda0a88bda5177b86a15c3b29f559873 OP_EQUALVERIFY OP_CHECKSIG"
        );
        assert_eq!(Script::from_asm(&script.to_asm()).unwrap(), script);
    }

    #[test]
    fn test_p2sh() {
        let script = Script::new_p2sh(&PKH);
        assert_eq!(script.len(), 23);
        assert!(script.is_p2sh());
        assert!(!script.is_p2pkh());
        assert_eq!(script.script_hash(), Some(PKH));
    }

    #[test]
    fn test_is_data() {
        assert!(Script::from_hex("6a04534c5000").unwrap().is_data());
        assert!(Script::from_hex("006a").unwrap().is_data());
        assert!(!Script::from_hex(P2PKH_HEX).unwrap().is_data());
    }

    #[test]
    fn test_push_only() {
        let mut s = Script::new();
        s.append_push_data(&[0xab; 80]).unwrap();
        s.append_number(3).unwrap();
        assert!(s.is_push_only());
        s.append_opcodes(&[OP_DUP]).unwrap();
        assert!(!s.is_push_only());
    }

    #[test]
    fn test_append_opcodes_rejects_pushdata() {
        let mut s = Script::new();
        assert!(s.append_opcodes(&[OP_PUSHDATA1]).is_err());
        assert!(s.append_opcodes(&[OP_DATA_20]).is_err());
        assert!(s.is_empty());
    }

    #[test]
    fn test_append_number() {
        let mut s = Script::new();
        s.append_number(0).unwrap();
        s.append_number(16).unwrap();
        s.append_number(20).unwrap();
        s.append_number(0x80).unwrap();
        assert_eq!(s.to_hex(), "00600114028000");
    }

    #[test]
    fn test_append_pushdata1_empty() {
        let mut s = Script::new();
        s.append_pushdata1(&[]).unwrap();
        assert_eq!(s.to_hex(), "4c00");
    }

    #[test]
    fn test_serde_hex() {
        let script = Script::from_hex(P2PKH_HEX).unwrap();
        let json = serde_json::to_string(&script).unwrap();
        assert_eq!(json, format!("\"{}\"", P2PKH_HEX));
        let back: Script = serde_json::from_str(&json).unwrap();
        assert_eq!(back, script);
    }

    #[test]
    fn test_to_asm_truncated_is_empty() {
        assert_eq!(Script::from_hex("4c05").unwrap().to_asm(), "");
    }
}
