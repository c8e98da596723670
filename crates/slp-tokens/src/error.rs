//! Token error types.

use slp_primitives::chainhash::Hash;
use slp_primitives::PrimitivesError;
use slp_script::ScriptError;
use slp_transaction::TransactionError;

use crate::token_id::TokenId;

/// Errors that can occur during token operations.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// An SLP payload could not be decoded.
    #[error("malformed token metadata: {0}")]
    MalformedMetadata(String),

    /// An ancestor's role or quantity does not support the claim made by a
    /// descendant.
    #[error("provenance mismatch: {0}")]
    ProvenanceMismatch(String),

    /// A transaction could not be fetched. Validity is undecided and the
    /// whole validation should be retried.
    #[error("failed to fetch transaction: {0}")]
    FetchFailure(String),

    /// Inputs do not cover outputs and fee.
    #[error("insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds {
        /// Amount needed.
        needed: u64,
        /// Amount available.
        available: u64,
    },

    /// A mint needs exactly one mint-authority input for its token.
    #[error("expected exactly one mint authority for token {token_id}, found {found}")]
    MissingAuthority {
        /// The token being minted.
        token_id: TokenId,
        /// Number of matching authority inputs supplied.
        found: usize,
    },

    /// A quantity cannot be represented at the token's precision or does
    /// not fit the 8-byte field.
    #[error("precision overflow: {0}")]
    PrecisionOverflow(String),

    /// The ledger rejected a broadcast transaction. Covenant script
    /// failures surface here.
    #[error("transaction rejected ({code}): {message}")]
    CovenantRejected {
        /// Error code reported by the ledger.
        code: i64,
        /// Error message reported by the ledger, verbatim.
        message: String,
    },

    /// The metadata output (vout 0) of a token transaction was offered as
    /// an input.
    #[error("output 0 of token transaction {txid} carries metadata and cannot be spent")]
    MetadataOutputSpend {
        /// The token transaction.
        txid: Hash,
    },

    /// Caller-supplied arguments are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Unlock data does not match the covenant's stack layout.
    #[error("unlock layout error: {0}")]
    UnlockLayout(String),

    /// Transaction error.
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// Script error.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// Primitives error.
    #[error(transparent)]
    Primitives(#[from] PrimitivesError),
}
