/// SLP SDK - Transaction building, signing, and serialization.
///
/// Provides the Transaction type with inputs and outputs, the FORKID
/// signature hash and its preimage fields, P2PKH/P2SH templates, and a
/// transaction context for running the script interpreter over an input.

pub mod transaction;
pub mod input;
pub mod output;
pub mod sighash;
pub mod template;
pub mod context;

mod error;
pub use error::TransactionError;
pub use transaction::Transaction;
pub use input::TransactionInput;
pub use output::TransactionOutput;
pub use context::TxVerifyContext;

#[cfg(test)]
mod tests;
