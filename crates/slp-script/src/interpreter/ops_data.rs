//! Splice, bitwise and equality operations.

use super::error::{InterpreterError, InterpreterErrorCode};
use super::scriptnum::{minimally_encode, ScriptNumber};
use super::thread::Thread;

impl<'a> Thread<'a> {
    pub(crate) fn op_cat(&mut self) -> Result<(), InterpreterError> {
        let b = self.dstack.pop()?;
        let mut a = self.dstack.pop()?;
        if a.len() + b.len() > self.limits.max_element_size {
            return Err(InterpreterError::new(
                InterpreterErrorCode::ElementTooBig,
                format!(
                    "concatenated size {} exceeds max allowed size {}",
                    a.len() + b.len(),
                    self.limits.max_element_size
                ),
            ));
        }
        a.extend_from_slice(&b);
        self.dstack.push(a);
        Ok(())
    }

    pub(crate) fn op_split(&mut self) -> Result<(), InterpreterError> {
        let n = self.pop_int()?.to_i64();
        let mut a = self.dstack.pop()?;
        if n < 0 {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NumberTooSmall,
                "split position is negative",
            ));
        }
        let pos = n as usize;
        if pos > a.len() {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NumberTooBig,
                format!("split position {} is past the end of a {} byte element", pos, a.len()),
            ));
        }
        let b = a.split_off(pos);
        self.dstack.push(a);
        self.dstack.push(b);
        Ok(())
    }

    pub(crate) fn op_num2bin(&mut self) -> Result<(), InterpreterError> {
        let size = self.pop_int()?.to_i64();
        let a = self.dstack.pop()?;
        if size < 0 || size as usize > self.limits.max_element_size {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NumberTooBig,
                format!("requested size {} is out of range", size),
            ));
        }
        let size = size as usize;

        let mut b = minimally_encode(&a);
        if b.len() > size {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NumberTooSmall,
                format!("cannot fit {} bytes into {}", b.len(), size),
            ));
        }
        if b.len() < size {
            let sign = match b.last_mut() {
                Some(top) => {
                    let s = *top & 0x80;
                    *top &= 0x7f;
                    s
                }
                None => 0,
            };
            b.resize(size - 1, 0);
            b.push(sign);
        }
        self.dstack.push(b);
        Ok(())
    }

    pub(crate) fn op_bin2num(&mut self) -> Result<(), InterpreterError> {
        let a = self.dstack.pop()?;
        let b = minimally_encode(&a);
        if b.len() > self.limits.max_number_length {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NumberTooBig,
                format!("script numbers are limited to {} bytes", self.limits.max_number_length),
            ));
        }
        self.dstack.push(b);
        Ok(())
    }

    pub(crate) fn op_size(&mut self) -> Result<(), InterpreterError> {
        let len = self.dstack.peek(0)?.len() as i64;
        self.dstack.push_int(&ScriptNumber::new(len));
        Ok(())
    }

    pub(crate) fn op_bitwise(&mut self, f: fn(u8, u8) -> u8) -> Result<(), InterpreterError> {
        let b = self.dstack.pop()?;
        let a = self.dstack.pop()?;
        if a.len() != b.len() {
            return Err(InterpreterError::new(
                InterpreterErrorCode::InvalidInputLength,
                "byte arrays are not the same length",
            ));
        }
        self.dstack.push(a.iter().zip(&b).map(|(&x, &y)| f(x, y)).collect());
        Ok(())
    }

    pub(crate) fn op_equal(&mut self) -> Result<(), InterpreterError> {
        let b = self.dstack.pop()?;
        let a = self.dstack.pop()?;
        self.dstack.push_bool(a == b);
        Ok(())
    }
}
