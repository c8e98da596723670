//! SLP SDK - Script parsing, execution, and address handling.
//!
//! Provides the script type, opcode definitions, chunk parsing with minimal
//! push encoding, the CashAddr/legacy address codec, and a script
//! interpreter able to evaluate mint vault covenants.

pub mod script;
pub mod opcodes;
pub mod chunk;
pub mod address;
pub mod interpreter;

mod error;
pub use error::ScriptError;
pub use script::Script;
pub use address::{Address, AddressKind, Network};
pub use chunk::ScriptChunk;
