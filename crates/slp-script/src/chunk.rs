//! Script chunk parsing and encoding.
//!
//! A chunk is either an opcode or a data push with its bytes. Unlike a
//! consensus parser, `OP_RETURN` does not swallow the rest of the script:
//! SLP records are a sequence of pushes after `OP_RETURN` and must be
//! decoded field by field.

use crate::opcodes::*;
use crate::ScriptError;

/// A single parsed element of a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptChunk {
    /// The opcode byte. For direct pushes (1-75 bytes), this is the length.
    pub op: u8,
    /// The pushed bytes, if this chunk is a data push.
    pub data: Option<Vec<u8>>,
}

impl ScriptChunk {
    /// `true` for `OP_0`, direct pushes and `OP_PUSHDATA1/2/4`.
    pub fn is_push(&self) -> bool {
        self.op <= OP_PUSHDATA4
    }

    /// Pushed bytes, with `OP_0` treated as an empty push.
    ///
    /// Returns `None` for non-push opcodes.
    pub fn push_data(&self) -> Option<&[u8]> {
        match (&self.data, self.op) {
            (Some(data), _) => Some(data.as_slice()),
            (None, OP_0) => Some(&[]),
            (None, _) => None,
        }
    }

    /// ASM rendering: hex for data pushes, `OP_xxx` otherwise.
    pub fn to_asm_string(&self) -> String {
        if self.op > OP_0 && self.op <= OP_PUSHDATA4 {
            if let Some(ref data) = self.data {
                return hex::encode(data);
            }
        }
        if self.op == OP_0 {
            return "0".to_string();
        }
        opcode_to_string(self.op).to_string()
    }
}

fn take<'a>(bytes: &'a [u8], pos: usize, n: usize) -> Result<&'a [u8], ScriptError> {
    let end = pos.checked_add(n).ok_or(ScriptError::DataTooSmall)?;
    bytes.get(pos..end).ok_or(ScriptError::DataTooSmall)
}

/// Decode raw script bytes into chunks.
///
/// Fails with `DataTooSmall` if any push is truncated.
pub fn decode_script(bytes: &[u8]) -> Result<Vec<ScriptChunk>, ScriptError> {
    let mut chunks = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let op = bytes[pos];
        pos += 1;

        let len = match op {
            OP_DATA_1..=OP_DATA_75 => op as usize,
            OP_PUSHDATA1 => {
                let l = take(bytes, pos, 1)?[0] as usize;
                pos += 1;
                l
            }
            OP_PUSHDATA2 => {
                let l = take(bytes, pos, 2)?;
                pos += 2;
                u16::from_le_bytes([l[0], l[1]]) as usize
            }
            OP_PUSHDATA4 => {
                let l = take(bytes, pos, 4)?;
                pos += 4;
                u32::from_le_bytes([l[0], l[1], l[2], l[3]]) as usize
            }
            _ => {
                chunks.push(ScriptChunk { op, data: None });
                continue;
            }
        };

        let data = take(bytes, pos, len)?.to_vec();
        pos += len;
        chunks.push(ScriptChunk { op, data: Some(data) });
    }

    Ok(chunks)
}

/// Smallest push prefix for a payload of `data_len` bytes.
///
/// An empty payload yields `[OP_0]`.
pub fn push_data_prefix(data_len: usize) -> Result<Vec<u8>, ScriptError> {
    if data_len <= 75 {
        Ok(vec![data_len as u8])
    } else if data_len <= 0xFF {
        Ok(vec![OP_PUSHDATA1, data_len as u8])
    } else if data_len <= 0xFFFF {
        let mut buf = vec![OP_PUSHDATA2];
        buf.extend_from_slice(&(data_len as u16).to_le_bytes());
        Ok(buf)
    } else if data_len <= 0xFFFF_FFFF {
        let mut buf = vec![OP_PUSHDATA4];
        buf.extend_from_slice(&(data_len as u32).to_le_bytes());
        Ok(buf)
    } else {
        Err(ScriptError::DataTooBig)
    }
}

/// Encode several payloads as consecutive minimal pushes.
pub fn encode_push_datas(parts: &[&[u8]]) -> Result<Vec<u8>, ScriptError> {
    let mut result = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        let prefix = push_data_prefix(part.len()).map_err(|_| ScriptError::PartTooBig(i))?;
        result.extend_from_slice(&prefix);
        result.extend_from_slice(part);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_simple_pushes() {
        let bytes = hex::decode("05000102030401ff02abcd").unwrap();
        let parts = decode_script(&bytes).unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].data.as_deref(), Some(&[0xff][..]));

        let data: Vec<&[u8]> = parts.iter().filter_map(|p| p.data.as_deref()).collect();
        assert_eq!(encode_push_datas(&data).unwrap(), bytes);
    }

    #[test]
    fn test_op_return_does_not_consume_rest() {
        // OP_RETURN <"SLP\0"> <0x01> OP_PUSHDATA1 0x00
        let bytes = hex::decode("6a04534c500001014c00").unwrap();
        let parts = decode_script(&bytes).unwrap();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0].op, OP_RETURN);
        assert!(parts[0].data.is_none());
        assert_eq!(parts[1].data.as_deref(), Some(&b"SLP\0"[..]));
        assert_eq!(parts[3].op, OP_PUSHDATA1);
        assert_eq!(parts[3].push_data(), Some(&[][..]));
    }

    #[test]
    fn test_truncated_pushes_fail() {
        for hex_str in ["05000000", "4c05000000", "4c", "4d", "4d0500", "4e", "4e01000000"] {
            let bytes = hex::decode(hex_str).unwrap();
            assert!(
                matches!(decode_script(&bytes), Err(ScriptError::DataTooSmall)),
                "{} should be truncated",
                hex_str
            );
        }
    }

    #[test]
    fn test_push_data_prefix_boundaries() {
        assert_eq!(push_data_prefix(0).unwrap(), vec![OP_0]);
        assert_eq!(push_data_prefix(75).unwrap(), vec![75]);
        assert_eq!(push_data_prefix(76).unwrap(), vec![OP_PUSHDATA1, 76]);
        assert_eq!(push_data_prefix(255).unwrap(), vec![OP_PUSHDATA1, 255]);
        assert_eq!(push_data_prefix(256).unwrap(), vec![OP_PUSHDATA2, 0x00, 0x01]);
        assert_eq!(
            push_data_prefix(65536).unwrap(),
            vec![OP_PUSHDATA4, 0x00, 0x00, 0x01, 0x00]
        );
    }

    #[test]
    fn test_push_data_accessor() {
        let op0 = ScriptChunk { op: OP_0, data: None };
        assert!(op0.is_push());
        assert_eq!(op0.push_data(), Some(&[][..]));

        let dup = ScriptChunk { op: OP_DUP, data: None };
        assert!(!dup.is_push());
        assert_eq!(dup.push_data(), None);
        assert_eq!(dup.to_asm_string(), "OP_DUP");
    }
}
