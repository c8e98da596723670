//! Script execution thread.

use crate::opcodes::*;
use crate::Script;

use super::error::{InterpreterError, InterpreterErrorCode};
use super::flags::ScriptFlags;
use super::limits::Limits;
use super::parsed_opcode::*;
use super::scriptnum::ScriptNumber;
use super::stack::{as_bool, Stack};
use super::TxContext;

/// State of one script evaluation.
pub struct Thread<'a> {
    pub(crate) dstack: Stack,
    pub(crate) astack: Stack,
    /// One entry per open `IF`; `true` while that branch executes.
    pub(crate) exec_stack: Vec<bool>,
    pub(crate) limits: Limits,
    pub(crate) flags: ScriptFlags,
    pub(crate) script: ParsedScript,
    pub(crate) script_off: usize,
    pub(crate) last_code_sep: Option<usize>,
    pub(crate) num_ops: usize,
    pub(crate) tx_context: Option<&'a dyn TxContext>,
    pub(crate) input_idx: usize,
}

impl<'a> Thread<'a> {
    /// Create an evaluation thread for one transaction input.
    pub fn new(
        limits: Limits,
        flags: ScriptFlags,
        tx_context: Option<&'a dyn TxContext>,
        input_idx: usize,
    ) -> Result<Self, InterpreterError> {
        if flags.has_flag(ScriptFlags::VERIFY_CLEAN_STACK) && !flags.has_flag(ScriptFlags::BIP16) {
            return Err(InterpreterError::new(
                InterpreterErrorCode::InvalidFlags,
                "clean stack requires BIP16",
            ));
        }
        Ok(Thread {
            dstack: Stack::new(),
            astack: Stack::new(),
            exec_stack: Vec::new(),
            limits,
            flags,
            script: Vec::new(),
            script_off: 0,
            last_code_sep: None,
            num_ops: 0,
            tx_context,
            input_idx,
        })
    }

    /// Check whether a verification flag is set.
    pub fn has_flag(&self, flag: ScriptFlags) -> bool {
        self.flags.has_flag(flag)
    }

    /// Evaluate `unlocking` followed by `locking`, then the redeem script
    /// when `locking` is P2SH and BIP16 is enabled.
    pub fn verify(&mut self, unlocking: &Script, locking: &Script) -> Result<(), InterpreterError> {
        for (what, s) in [("unlocking", unlocking), ("locking", locking)] {
            if s.len() > self.limits.max_script_size {
                return Err(InterpreterError::new(
                    InterpreterErrorCode::ScriptTooBig,
                    format!(
                        "{} script size {} is larger than the max allowed size {}",
                        what,
                        s.len(),
                        self.limits.max_script_size
                    ),
                ));
            }
        }

        let uscript = parse_script(unlocking)?;
        let lscript = parse_script(locking)?;

        let bip16 = self.has_flag(ScriptFlags::BIP16) && locking.is_p2sh();
        if (bip16 || self.has_flag(ScriptFlags::VERIFY_SIG_PUSH_ONLY)) && !is_push_only(&uscript) {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NotPushOnly,
                "signature script is not push only",
            ));
        }

        self.run(uscript)?;
        let saved = if bip16 { self.dstack.items().to_vec() } else { Vec::new() };
        self.run(lscript)?;

        if bip16 {
            self.check_result(false)?;
            let mut stack = saved;
            let redeem = stack.pop().ok_or_else(|| {
                InterpreterError::new(InterpreterErrorCode::EmptyStack, "missing redeem script")
            })?;
            self.dstack.set_items(stack);
            let redeem = parse_script(&Script::from(redeem))?;
            self.run(redeem)?;
        }

        self.check_result(true)
    }

    fn check_result(&self, final_script: bool) -> Result<(), InterpreterError> {
        if self.dstack.depth() < 1 {
            return Err(InterpreterError::new(
                InterpreterErrorCode::EmptyStack,
                "stack empty at end of script execution",
            ));
        }
        if final_script && self.has_flag(ScriptFlags::VERIFY_CLEAN_STACK) && self.dstack.depth() != 1 {
            return Err(InterpreterError::new(
                InterpreterErrorCode::CleanStack,
                format!("stack contains {} unexpected items", self.dstack.depth() - 1),
            ));
        }
        if !as_bool(self.dstack.peek(0)?) {
            return Err(InterpreterError::new(
                InterpreterErrorCode::EvalFalse,
                "false stack entry at end of script execution",
            ));
        }
        Ok(())
    }

    fn run(&mut self, script: ParsedScript) -> Result<(), InterpreterError> {
        self.script = script;
        self.last_code_sep = None;
        self.num_ops = 0;

        for off in 0..self.script.len() {
            self.script_off = off;
            let pop = self.script[off].clone();
            self.execute_opcode(&pop)?;

            let combined = self.dstack.depth() + self.astack.depth();
            if combined > self.limits.max_stack_size {
                return Err(InterpreterError::new(
                    InterpreterErrorCode::StackOverflow,
                    format!(
                        "combined stack size {} > max allowed {}",
                        combined, self.limits.max_stack_size
                    ),
                ));
            }
        }

        if !self.exec_stack.is_empty() {
            return Err(InterpreterError::new(
                InterpreterErrorCode::UnbalancedConditional,
                "end of script reached in conditional execution",
            ));
        }
        self.astack.clear();
        Ok(())
    }

    pub(crate) fn is_branch_executing(&self) -> bool {
        self.exec_stack.iter().all(|&b| b)
    }

    pub(crate) fn pop_int(&mut self) -> Result<ScriptNumber, InterpreterError> {
        let minimal = self.has_flag(ScriptFlags::VERIFY_MINIMAL_DATA);
        self.dstack.pop_int(self.limits.max_number_length, minimal)
    }

    /// Pop a stack index argument.
    pub(crate) fn pop_index(&mut self) -> Result<usize, InterpreterError> {
        let n = self.pop_int()?.to_i32();
        usize::try_from(n).map_err(|_| {
            InterpreterError::new(
                InterpreterErrorCode::InvalidStackOperation,
                format!("negative stack index {}", n),
            )
        })
    }

    /// Pop the top item and fail with `code` unless it is true.
    pub(crate) fn verify_top(&mut self, pop: &ParsedOpcode, code: InterpreterErrorCode) -> Result<(), InterpreterError> {
        if !self.dstack.pop_bool()? {
            return Err(InterpreterError::new(code, format!("{} failed", pop.name())));
        }
        Ok(())
    }

    fn execute_opcode(&mut self, pop: &ParsedOpcode) -> Result<(), InterpreterError> {
        if pop.data.len() > self.limits.max_element_size {
            return Err(InterpreterError::new(
                InterpreterErrorCode::ElementTooBig,
                format!(
                    "element size {} exceeds max allowed size {}",
                    pop.data.len(),
                    self.limits.max_element_size
                ),
            ));
        }

        if pop.opcode > OP_16 {
            self.num_ops += 1;
            if self.num_ops > self.limits.max_ops {
                return Err(InterpreterError::new(
                    InterpreterErrorCode::TooManyOperations,
                    format!("exceeded max operation limit of {}", self.limits.max_ops),
                ));
            }
        }

        if pop.always_illegal() {
            return Err(InterpreterError::new(
                InterpreterErrorCode::ReservedOpcode,
                format!("attempt to execute reserved opcode {}", pop.name()),
            ));
        }
        if pop.is_disabled() {
            return Err(InterpreterError::new(
                InterpreterErrorCode::DisabledOpcode,
                format!("attempt to execute disabled opcode {}", pop.name()),
            ));
        }

        let executing = self.is_branch_executing();
        if !executing && !pop.is_conditional() {
            return Ok(());
        }

        if pop.opcode <= OP_PUSHDATA4 && self.has_flag(ScriptFlags::VERIFY_MINIMAL_DATA) {
            pop.enforce_minimal_push()?;
        }

        self.dispatch_opcode(pop)
    }

    fn dispatch_opcode(&mut self, pop: &ParsedOpcode) -> Result<(), InterpreterError> {
        match pop.opcode {
            OP_0..=OP_PUSHDATA4 => {
                self.dstack.push(pop.data.clone());
                Ok(())
            }
            OP_1NEGATE => {
                self.dstack.push_int(&ScriptNumber::new(-1));
                Ok(())
            }
            OP_1..=OP_16 => {
                self.dstack.push(vec![pop.opcode - (OP_1 - 1)]);
                Ok(())
            }

            // Flow control
            OP_NOP | OP_NOP1 | OP_NOP4..=OP_NOP10 => Ok(()),
            OP_IF => self.op_if(false),
            OP_NOTIF => self.op_if(true),
            OP_ELSE => self.op_else(pop),
            OP_ENDIF => self.op_endif(pop),
            OP_VERIFY => self.verify_top(pop, InterpreterErrorCode::Verify),
            OP_RETURN => Err(InterpreterError::new(
                InterpreterErrorCode::EarlyReturn,
                "script returned early",
            )),
            OP_CHECKLOCKTIMEVERIFY => self.op_check_locktime_verify(),
            OP_CHECKSEQUENCEVERIFY => self.op_check_sequence_verify(),

            // Stack
            OP_TOALTSTACK => {
                let v = self.dstack.pop()?;
                self.astack.push(v);
                Ok(())
            }
            OP_FROMALTSTACK => {
                let v = self.astack.pop()?;
                self.dstack.push(v);
                Ok(())
            }
            OP_2DROP => self.dstack.drop_n(2),
            OP_2DUP => self.dstack.dup_n(2),
            OP_3DUP => self.dstack.dup_n(3),
            OP_2OVER => self.dstack.over_n(2),
            OP_2ROT => self.dstack.rot_n(2),
            OP_2SWAP => self.dstack.swap_n(2),
            OP_IFDUP => {
                if as_bool(self.dstack.peek(0)?) {
                    self.dstack.pick(0)?;
                }
                Ok(())
            }
            OP_DEPTH => {
                let depth = self.dstack.depth() as i64;
                self.dstack.push_int(&ScriptNumber::new(depth));
                Ok(())
            }
            OP_DROP => self.dstack.drop_n(1),
            OP_DUP => self.dstack.dup_n(1),
            OP_NIP => self.dstack.nip(1).map(|_| ()),
            OP_OVER => self.dstack.over_n(1),
            OP_PICK => {
                let n = self.pop_index()?;
                self.dstack.pick(n)
            }
            OP_ROLL => {
                let n = self.pop_index()?;
                self.dstack.roll(n)
            }
            OP_ROT => self.dstack.rot_n(1),
            OP_SWAP => self.dstack.swap_n(1),
            OP_TUCK => self.dstack.tuck(),

            // Splice and bitwise
            OP_CAT => self.op_cat(),
            OP_SPLIT => self.op_split(),
            OP_NUM2BIN => self.op_num2bin(),
            OP_BIN2NUM => self.op_bin2num(),
            OP_SIZE => self.op_size(),
            OP_AND => self.op_bitwise(|a, b| a & b),
            OP_OR => self.op_bitwise(|a, b| a | b),
            OP_XOR => self.op_bitwise(|a, b| a ^ b),
            OP_EQUAL => self.op_equal(),
            OP_EQUALVERIFY => {
                self.op_equal()?;
                self.verify_top(pop, InterpreterErrorCode::EqualVerify)
            }
            OP_REVERSEBYTES => {
                let mut v = self.dstack.pop()?;
                v.reverse();
                self.dstack.push(v);
                Ok(())
            }

            // Arithmetic
            OP_1ADD | OP_1SUB | OP_NEGATE | OP_ABS | OP_NOT | OP_0NOTEQUAL => {
                self.op_unary(pop.opcode)
            }
            OP_ADD | OP_SUB | OP_MUL | OP_DIV | OP_MOD | OP_BOOLAND | OP_BOOLOR | OP_NUMEQUAL
            | OP_NUMNOTEQUAL | OP_LESSTHAN | OP_GREATERTHAN | OP_LESSTHANOREQUAL
            | OP_GREATERTHANOREQUAL | OP_MIN | OP_MAX => self.op_binary(pop.opcode),
            OP_NUMEQUALVERIFY => {
                self.op_binary(OP_NUMEQUAL)?;
                self.verify_top(pop, InterpreterErrorCode::NumEqualVerify)
            }
            OP_WITHIN => self.op_within(),

            // Crypto
            OP_RIPEMD160 | OP_SHA1 | OP_SHA256 | OP_HASH160 | OP_HASH256 => self.op_hash(pop.opcode),
            OP_CODESEPARATOR => {
                self.last_code_sep = Some(self.script_off);
                Ok(())
            }
            OP_CHECKSIG => self.op_checksig(),
            OP_CHECKSIGVERIFY => {
                self.op_checksig()?;
                self.verify_top(pop, InterpreterErrorCode::CheckSigVerify)
            }
            OP_CHECKDATASIG => self.op_checkdatasig(),
            OP_CHECKDATASIGVERIFY => {
                self.op_checkdatasig()?;
                self.verify_top(pop, InterpreterErrorCode::CheckDataSigVerify)
            }
            OP_CHECKMULTISIG | OP_CHECKMULTISIGVERIFY => Err(InterpreterError::new(
                InterpreterErrorCode::UnsupportedOpcode,
                format!("{} is not supported", pop.name()),
            )),

            _ => Err(InterpreterError::new(
                InterpreterErrorCode::ReservedOpcode,
                format!("attempt to execute invalid opcode {}", pop.name()),
            )),
        }
    }
}
