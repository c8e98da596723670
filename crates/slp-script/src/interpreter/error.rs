//! Interpreter error types.

use std::fmt;

/// Reason a script failed to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpreterErrorCode {
    /// Flag combination is not allowed.
    InvalidFlags,
    /// An opcode needing a transaction context ran without one.
    InvalidParams,
    /// Stack empty at end of execution.
    EmptyStack,
    /// Top stack item false at end of execution.
    EvalFalse,
    /// Script exceeds the size limit.
    ScriptTooBig,
    /// Pushed or computed element exceeds the size limit.
    ElementTooBig,
    /// Operation count limit exceeded.
    TooManyOperations,
    /// Combined stack depth limit exceeded.
    StackOverflow,
    /// Script number too long or out of range.
    NumberTooBig,
    /// Negative or too small argument.
    NumberTooSmall,
    /// Division or modulo by zero.
    DivideByZero,
    /// `OP_VERIFY` failed.
    Verify,
    /// `OP_EQUALVERIFY` failed.
    EqualVerify,
    /// `OP_NUMEQUALVERIFY` failed.
    NumEqualVerify,
    /// `OP_CHECKSIGVERIFY` failed.
    CheckSigVerify,
    /// `OP_CHECKDATASIGVERIFY` failed.
    CheckDataSigVerify,
    /// Opcode is disabled.
    DisabledOpcode,
    /// Reserved or unassigned opcode executed.
    ReservedOpcode,
    /// Valid opcode this interpreter does not evaluate.
    UnsupportedOpcode,
    /// `OP_RETURN` executed.
    EarlyReturn,
    /// A push runs past the end of the script.
    MalformedPush,
    /// Stack index out of range or stack underflow.
    InvalidStackOperation,
    /// `IF`/`ELSE`/`ENDIF` mismatch.
    UnbalancedConditional,
    /// Operands of a bitwise op differ in length.
    InvalidInputLength,
    /// Push was not minimally encoded.
    MinimalData,
    /// Sighash type byte not allowed.
    InvalidSigHashType,
    /// Signature is not strict DER.
    SigDer,
    /// Signature has a high S value.
    SigHighS,
    /// Public key encoding rejected.
    PubKeyType,
    /// Unlocking script contains non-push opcodes.
    NotPushOnly,
    /// More than one item left on the stack.
    CleanStack,
    /// Failed signature check with a non-empty signature.
    NullFail,
    /// Lock time argument negative.
    NegativeLockTime,
    /// Lock time or sequence requirement not met.
    UnsatisfiedLockTime,
    /// Sighash type must carry the FORKID bit.
    MissingForkId,
}

impl fmt::Display for InterpreterErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A script evaluation error with an error code and description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {description}")]
pub struct InterpreterError {
    /// Machine-readable failure reason.
    pub code: InterpreterErrorCode,
    /// Human-readable detail.
    pub description: String,
}

impl InterpreterError {
    /// Create an error with the given code.
    pub fn new(code: InterpreterErrorCode, description: impl Into<String>) -> Self {
        InterpreterError { code, description: description.into() }
    }
}
