#![deny(missing_docs)]

//! # slp-rpc
//!
//! JSON-RPC client for a Bitcoin Cash node, used as the SDK's ledger.
//!
//! The client is async-first and also implements the synchronous
//! [`LedgerService`](slp_tokens::LedgerService) trait from `slp-tokens`, so
//! it can feed the provenance validator, the classifier and broadcast
//! directly.
//!
//! # Example
//!
//! ```no_run
//! use slp_rpc::{NodeRpcClient, RpcConfig};
//!
//! let client = NodeRpcClient::new(RpcConfig {
//!     url: "http://127.0.0.1:18443".to_string(),
//!     username: "regtest".to_string(),
//!     password: "regtest".to_string(),
//!     ..Default::default()
//! })
//! .unwrap();
//! ```

pub mod client;
pub mod error;
pub mod types;


pub use client::NodeRpcClient;
pub use error::RpcError;
pub use types::{RpcConfig, TxOutInfo, UnspentEntry};
