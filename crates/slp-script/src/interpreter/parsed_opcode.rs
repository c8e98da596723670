//! Parsed opcode representation.

use crate::chunk::decode_script;
use crate::opcodes::*;
use crate::Script;

use super::error::{InterpreterError, InterpreterErrorCode};

/// An opcode with its push payload (empty for non-push opcodes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOpcode {
    /// The opcode byte.
    pub opcode: u8,
    /// Pushed bytes.
    pub data: Vec<u8>,
}

/// A fully parsed script.
pub type ParsedScript = Vec<ParsedOpcode>;

impl ParsedOpcode {
    /// Canonical name of the opcode.
    pub fn name(&self) -> &'static str {
        opcode_to_string(self.opcode)
    }

    /// `true` for opcodes that fail whenever they are executed.
    pub fn is_disabled(&self) -> bool {
        matches!(
            self.opcode,
            OP_2MUL | OP_2DIV | OP_INVERT | OP_LSHIFT | OP_RSHIFT
        )
    }

    /// `true` for `IF`/`NOTIF`/`ELSE`/`ENDIF`, which run even in skipped branches.
    pub fn is_conditional(&self) -> bool {
        matches!(self.opcode, OP_IF | OP_NOTIF | OP_ELSE | OP_ENDIF)
    }

    /// `true` for `OP_VERIF`/`OP_VERNOTIF`, which fail even in skipped branches.
    pub fn always_illegal(&self) -> bool {
        matches!(self.opcode, OP_VERIF | OP_VERNOTIF)
    }

    /// Reject pushes that have a shorter encoding.
    pub fn enforce_minimal_push(&self) -> Result<(), InterpreterError> {
        let len = self.data.len();
        let expected = match len {
            0 => OP_0,
            1 if (1..=16).contains(&self.data[0]) => OP_1 + self.data[0] - 1,
            1 if self.data[0] == 0x81 => OP_1NEGATE,
            1..=75 => len as u8,
            76..=255 => OP_PUSHDATA1,
            256..=65535 => OP_PUSHDATA2,
            _ => OP_PUSHDATA4,
        };
        if self.opcode != expected {
            return Err(InterpreterError::new(
                InterpreterErrorCode::MinimalData,
                format!(
                    "push of {} bytes encoded with {} instead of {}",
                    len,
                    self.name(),
                    opcode_to_string(expected)
                ),
            ));
        }
        Ok(())
    }
}

/// Parse a script into opcodes.
pub fn parse_script(script: &Script) -> Result<ParsedScript, InterpreterError> {
    let chunks = decode_script(script.to_bytes()).map_err(|e| {
        InterpreterError::new(InterpreterErrorCode::MalformedPush, e.to_string())
    })?;
    Ok(chunks
        .into_iter()
        .map(|c| ParsedOpcode { opcode: c.op, data: c.data.unwrap_or_default() })
        .collect())
}

/// `true` if every opcode is a push or small integer.
pub fn is_push_only(script: &[ParsedOpcode]) -> bool {
    script.iter().all(|p| p.opcode <= OP_16 && p.opcode != OP_RESERVED)
}

/// Serialize parsed opcodes back into a script.
pub fn unparse(script: &[ParsedOpcode]) -> Script {
    let mut out = Vec::new();
    for p in script {
        out.push(p.opcode);
        match p.opcode {
            OP_PUSHDATA1 => out.push(p.data.len() as u8),
            OP_PUSHDATA2 => out.extend_from_slice(&(p.data.len() as u16).to_le_bytes()),
            OP_PUSHDATA4 => out.extend_from_slice(&(p.data.len() as u32).to_le_bytes()),
            _ => {}
        }
        out.extend_from_slice(&p.data);
    }
    Script::from(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unparse_roundtrip() {
        let script = Script::from_hex("4c0201020051766a0568656c6c6f").unwrap();
        let parsed = parse_script(&script).unwrap();
        assert_eq!(parsed.len(), 6);
        assert_eq!(parsed[0].data, vec![1, 2]);
        assert_eq!(unparse(&parsed), script);
    }

    #[test]
    fn test_minimal_push() {
        let ok = ParsedOpcode { opcode: 0x02, data: vec![0xaa, 0xbb] };
        assert!(ok.enforce_minimal_push().is_ok());

        let pushdata1_small = ParsedOpcode { opcode: OP_PUSHDATA1, data: vec![0xaa, 0xbb] };
        assert!(pushdata1_small.enforce_minimal_push().is_err());

        let one_as_data = ParsedOpcode { opcode: 0x01, data: vec![0x01] };
        assert!(one_as_data.enforce_minimal_push().is_err());

        let empty = ParsedOpcode { opcode: OP_0, data: vec![] };
        assert!(empty.enforce_minimal_push().is_ok());
    }

    #[test]
    fn test_push_only() {
        let parsed = parse_script(&Script::from_hex("00510102").unwrap()).unwrap();
        assert!(is_push_only(&parsed));
        let parsed = parse_script(&Script::from_hex("0076").unwrap()).unwrap();
        assert!(!is_push_only(&parsed));
    }
}
