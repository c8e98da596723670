//! Script execution stack.

use super::error::{InterpreterError, InterpreterErrorCode};
use super::scriptnum::ScriptNumber;

/// Interpret a stack element as a boolean.
///
/// Any non-zero byte is true, except a lone sign bit in the last byte
/// (negative zero).
pub fn as_bool(t: &[u8]) -> bool {
    match t.iter().position(|&b| b != 0) {
        None => false,
        Some(i) => !(i == t.len() - 1 && t[i] == 0x80),
    }
}

/// Canonical encoding of a boolean.
pub fn from_bool(v: bool) -> Vec<u8> {
    if v {
        vec![1]
    } else {
        vec![]
    }
}

/// A data or alt stack. Index 0 is the top.
#[derive(Debug, Default, Clone)]
pub struct Stack {
    items: Vec<Vec<u8>>,
}

fn out_of_range(idx: usize, len: usize) -> InterpreterError {
    InterpreterError::new(
        InterpreterErrorCode::InvalidStackOperation,
        format!("index {} is invalid for stack size {}", idx, len),
    )
}

impl Stack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Stack { items: Vec::new() }
    }

    /// Number of items.
    pub fn depth(&self) -> usize {
        self.items.len()
    }

    /// Push raw bytes.
    pub fn push(&mut self, data: Vec<u8>) {
        self.items.push(data);
    }

    /// Push a number.
    pub fn push_int(&mut self, n: &ScriptNumber) {
        self.push(n.to_bytes());
    }

    /// Push a boolean.
    pub fn push_bool(&mut self, v: bool) {
        self.push(from_bool(v));
    }

    /// Pop the top item.
    pub fn pop(&mut self) -> Result<Vec<u8>, InterpreterError> {
        self.nip(0)
    }

    /// Pop the top item as a number.
    pub fn pop_int(&mut self, max_len: usize, minimal: bool) -> Result<ScriptNumber, InterpreterError> {
        let data = self.pop()?;
        ScriptNumber::from_bytes(&data, max_len, minimal)
    }

    /// Pop the top item as a boolean.
    pub fn pop_bool(&mut self) -> Result<bool, InterpreterError> {
        Ok(as_bool(&self.pop()?))
    }

    /// Borrow the item `idx` positions below the top.
    pub fn peek(&self, idx: usize) -> Result<&[u8], InterpreterError> {
        let len = self.items.len();
        if idx >= len {
            return Err(out_of_range(idx, len));
        }
        Ok(&self.items[len - idx - 1])
    }

    /// Remove and return the item `idx` positions below the top.
    pub fn nip(&mut self, idx: usize) -> Result<Vec<u8>, InterpreterError> {
        let len = self.items.len();
        if idx >= len {
            return Err(out_of_range(idx, len));
        }
        Ok(self.items.remove(len - idx - 1))
    }

    /// Copy the item `idx` positions below the top onto the top.
    pub fn pick(&mut self, idx: usize) -> Result<(), InterpreterError> {
        let item = self.peek(idx)?.to_vec();
        self.push(item);
        Ok(())
    }

    /// Move the item `idx` positions below the top onto the top.
    pub fn roll(&mut self, idx: usize) -> Result<(), InterpreterError> {
        let item = self.nip(idx)?;
        self.push(item);
        Ok(())
    }

    /// Drop the top `n` items.
    pub fn drop_n(&mut self, n: usize) -> Result<(), InterpreterError> {
        for _ in 0..n {
            self.pop()?;
        }
        Ok(())
    }

    /// Duplicate the top `n` items.
    pub fn dup_n(&mut self, n: usize) -> Result<(), InterpreterError> {
        for _ in 0..n {
            self.pick(n - 1)?;
        }
        Ok(())
    }

    /// Copy the `n` items below the top `n` onto the top.
    pub fn over_n(&mut self, n: usize) -> Result<(), InterpreterError> {
        for _ in 0..n {
            self.pick(2 * n - 1)?;
        }
        Ok(())
    }

    /// Swap the top `n` items with the `n` below them.
    pub fn swap_n(&mut self, n: usize) -> Result<(), InterpreterError> {
        for _ in 0..n {
            self.roll(2 * n - 1)?;
        }
        Ok(())
    }

    /// Rotate the third group of `n` items to the top.
    pub fn rot_n(&mut self, n: usize) -> Result<(), InterpreterError> {
        for _ in 0..n {
            self.roll(3 * n - 1)?;
        }
        Ok(())
    }

    /// Copy the top item below the second item.
    pub fn tuck(&mut self) -> Result<(), InterpreterError> {
        let top = self.pop()?;
        let second = self.pop()?;
        self.push(top.clone());
        self.push(second);
        self.push(top);
        Ok(())
    }

    /// Items from bottom to top.
    pub fn items(&self) -> &[Vec<u8>] {
        &self.items
    }

    /// Replace the contents (last = top).
    pub fn set_items(&mut self, items: Vec<Vec<u8>>) {
        self.items = items;
    }

    /// Remove all items.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack_of(items: &[u8]) -> Stack {
        let mut s = Stack::new();
        for &i in items {
            s.push(vec![i]);
        }
        s
    }

    fn tops(s: &Stack) -> Vec<u8> {
        s.items().iter().map(|v| v[0]).collect()
    }

    #[test]
    fn test_as_bool() {
        assert!(!as_bool(&[]));
        assert!(!as_bool(&[0x00]));
        assert!(!as_bool(&[0x80]));
        assert!(!as_bool(&[0x00, 0x80]));
        assert!(as_bool(&[0x01]));
        assert!(as_bool(&[0x80, 0x00]));
        assert!(as_bool(&[0x80, 0x80]));
        assert!(as_bool(&[0x00, 0x01]));
    }

    #[test]
    fn test_pick_roll() {
        let mut s = stack_of(&[1, 2, 3, 4]);
        s.pick(2).unwrap();
        assert_eq!(tops(&s), vec![1, 2, 3, 4, 2]);
        s.roll(4).unwrap();
        assert_eq!(tops(&s), vec![2, 3, 4, 2, 1]);
        assert!(s.pick(5).is_err());
    }

    #[test]
    fn test_group_ops() {
        let mut s = stack_of(&[1, 2, 3, 4]);
        s.swap_n(2).unwrap();
        assert_eq!(tops(&s), vec![3, 4, 1, 2]);

        let mut s = stack_of(&[1, 2, 3]);
        s.rot_n(1).unwrap();
        assert_eq!(tops(&s), vec![2, 3, 1]);

        let mut s = stack_of(&[1, 2]);
        s.over_n(1).unwrap();
        assert_eq!(tops(&s), vec![1, 2, 1]);

        let mut s = stack_of(&[1, 2]);
        s.dup_n(2).unwrap();
        assert_eq!(tops(&s), vec![1, 2, 1, 2]);

        let mut s = stack_of(&[1, 2]);
        s.tuck().unwrap();
        assert_eq!(tops(&s), vec![2, 1, 2]);
    }

    #[test]
    fn test_underflow() {
        let mut s = Stack::new();
        assert!(s.pop().is_err());
        assert!(s.drop_n(1).is_err());
        assert!(s.peek(0).is_err());
    }
}
