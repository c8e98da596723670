//! Numeric operations.

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

use crate::opcodes::*;

use super::error::{InterpreterError, InterpreterErrorCode};
use super::scriptnum::ScriptNumber;
use super::thread::Thread;

fn from_bool(v: bool) -> BigInt {
    if v {
        BigInt::one()
    } else {
        BigInt::zero()
    }
}

impl<'a> Thread<'a> {
    pub(crate) fn op_unary(&mut self, opcode: u8) -> Result<(), InterpreterError> {
        let ScriptNumber(m) = self.pop_int()?;
        let result = match opcode {
            OP_1ADD => m + 1,
            OP_1SUB => m - 1,
            OP_NEGATE => -m,
            OP_ABS => m.abs(),
            OP_NOT => from_bool(m.is_zero()),
            _ => from_bool(!m.is_zero()),
        };
        self.dstack.push_int(&ScriptNumber(result));
        Ok(())
    }

    pub(crate) fn op_binary(&mut self, opcode: u8) -> Result<(), InterpreterError> {
        let ScriptNumber(b) = self.pop_int()?;
        let ScriptNumber(a) = self.pop_int()?;

        if matches!(opcode, OP_DIV | OP_MOD) && b.is_zero() {
            return Err(InterpreterError::new(
                InterpreterErrorCode::DivideByZero,
                "division by zero",
            ));
        }

        let result = match opcode {
            OP_ADD => a + b,
            OP_SUB => a - b,
            OP_MUL => a * b,
            // truncated toward zero
            OP_DIV => a / b,
            OP_MOD => a % b,
            OP_BOOLAND => from_bool(!a.is_zero() && !b.is_zero()),
            OP_BOOLOR => from_bool(!a.is_zero() || !b.is_zero()),
            OP_NUMEQUAL => from_bool(a == b),
            OP_NUMNOTEQUAL => from_bool(a != b),
            OP_LESSTHAN => from_bool(a < b),
            OP_GREATERTHAN => from_bool(a > b),
            OP_LESSTHANOREQUAL => from_bool(a <= b),
            OP_GREATERTHANOREQUAL => from_bool(a >= b),
            OP_MIN => a.min(b),
            _ => a.max(b),
        };
        self.dstack.push_int(&ScriptNumber(result));
        Ok(())
    }

    pub(crate) fn op_within(&mut self) -> Result<(), InterpreterError> {
        let ScriptNumber(max) = self.pop_int()?;
        let ScriptNumber(min) = self.pop_int()?;
        let ScriptNumber(x) = self.pop_int()?;
        self.dstack.push_bool(min <= x && x < max);
        Ok(())
    }
}
