#![deny(missing_docs)]

//! SLP SDK - Complete SDK.
//!
//! Re-exports all SLP SDK components for convenient single-crate usage.

pub use slp_primitives as primitives;
pub use slp_script as script;
pub use slp_transaction as transaction;
pub use slp_tokens as tokens;
pub use slp_rpc as rpc;
