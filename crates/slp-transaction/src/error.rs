/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// The transaction structure is invalid (e.g. input index out of range).
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
    /// An error occurred during input signing (e.g. missing source output).
    #[error("signing error: {0}")]
    SigningError(String),
    /// An error occurred during binary/hex serialization or deserialization.
    #[error("serialization error: {0}")]
    SerializationError(String),
    /// The interpreter rejected an input.
    #[error("script verification failed: {0}")]
    Verification(#[from] slp_script::interpreter::InterpreterError),
    /// An underlying script error (forwarded from `slp-script`).
    #[error("script error: {0}")]
    Script(#[from] slp_script::ScriptError),
    /// An underlying primitives error (forwarded from `slp-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] slp_primitives::PrimitivesError),
}
