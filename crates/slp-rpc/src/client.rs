//! Node JSON-RPC client for fetching, listing and broadcasting transactions.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::runtime::RuntimeFlavor;
use tracing::{debug, trace};

use slp_primitives::chainhash::Hash;
use slp_primitives::ec::PrivateKey;
use slp_script::Address;
use slp_tokens::{CandidateOutput, LedgerService, TokenError, TxFetcher};

use crate::error::RpcError;
use crate::types::{RpcConfig, RpcRequest, RpcResponse, TxOutInfo, UnspentEntry};

/// JSON-RPC client for a node's wallet and mempool.
#[derive(Debug)]
pub struct NodeRpcClient {
    /// Client configuration.
    config: RpcConfig,
    /// Underlying HTTP client.
    client: reqwest::Client,
    /// Next request id.
    next_id: AtomicU64,
}

impl NodeRpcClient {
    /// Create a client with the given configuration.
    pub fn new(config: RpcConfig) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client, next_id: AtomicU64::new(1) })
    }

    /// The client's configuration.
    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    /// Fetch a serialized transaction (`getrawtransaction`).
    pub async fn get_raw_transaction(&self, txid: &Hash) -> Result<Vec<u8>, RpcError> {
        let raw: String = self.call("getrawtransaction", json!([txid.to_string(), 0])).await?;
        hex::decode(&raw).map_err(|e| RpcError::InvalidResponse(format!("raw tx hex: {}", e)))
    }

    /// Submit a serialized transaction (`sendrawtransaction`).
    ///
    /// Rejections come back as [`RpcError::Node`] with the node's code and
    /// message untouched.
    pub async fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<Hash, RpcError> {
        let txid: String = self.call("sendrawtransaction", json!([hex::encode(raw_tx)])).await?;
        let txid = Hash::from_hex(&txid)
            .map_err(|e| RpcError::InvalidResponse(format!("txid {}: {}", txid, e)))?;
        debug!(%txid, bytes = raw_tx.len(), "broadcast transaction");
        Ok(txid)
    }

    /// Wallet outputs including unconfirmed ones (`listunspent 0`).
    pub async fn list_unspent(&self) -> Result<Vec<UnspentEntry>, RpcError> {
        self.call("listunspent", json!([0])).await
    }

    /// An unspent output, `None` if spent or unknown (`gettxout`).
    pub async fn get_tx_out(
        &self,
        txid: &Hash,
        vout: u32,
        include_mempool: bool,
    ) -> Result<Option<TxOutInfo>, RpcError> {
        self.call("gettxout", json!([txid.to_string(), vout, include_mempool])).await
    }

    /// The wallet key behind a P2PKH address (`dumpprivkey`).
    pub async fn dump_priv_key(&self, address: &Address) -> Result<PrivateKey, RpcError> {
        let wif: String = self.call("dumpprivkey", json!([address.to_cash_string()])).await?;
        PrivateKey::from_wif(&wif).map_err(|e| RpcError::InvalidResponse(e.to_string()))
    }

    /// Issue one JSON-RPC call and decode its result.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        trace!(method, id, "rpc call");

        let body = RpcRequest { jsonrpc: "1.0", id, method, params };
        let mut request = self.client.post(&self.config.url).json(&body);
        if !self.config.username.is_empty() {
            request = request.basic_auth(&self.config.username, Some(&self.config.password));
        }

        let resp = request.send().await.map_err(map_transport)?;
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(map_transport)?;

        // Nodes report RPC errors with a non-2xx status and a JSON body.
        let response: RpcResponse = serde_json::from_slice(&bytes).map_err(|e| {
            if status.is_success() {
                RpcError::SerializationError(e)
            } else {
                RpcError::InvalidResponse(format!("HTTP {} from {}", status, method))
            }
        })?;
        if let Some(error) = response.error {
            return Err(RpcError::Node { code: error.code, message: error.message });
        }
        Ok(serde_json::from_value(response.result)?)
    }

    /// Run a request to completion from synchronous code.
    ///
    /// Outside a runtime a fresh one is built for the call. Inside a
    /// runtime the worker is blocked in place, which tokio only allows on
    /// the multi-thread flavor, so a current-thread runtime yields
    /// [`RpcError::Runtime`].
    fn block_on<F: Future>(&self, fut: F) -> Result<F::Output, RpcError> {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => match handle.runtime_flavor() {
                RuntimeFlavor::CurrentThread => Err(RpcError::Runtime(
                    "blocking calls need a multi-thread runtime or none at all".to_string(),
                )),
                _ => Ok(tokio::task::block_in_place(|| handle.block_on(fut))),
            },
            Err(_) => {
                let rt = tokio::runtime::Runtime::new()
                    .map_err(|e| RpcError::Runtime(e.to_string()))?;
                Ok(rt.block_on(fut))
            }
        }
    }
}

fn map_transport(e: reqwest::Error) -> RpcError {
    if e.is_timeout() {
        RpcError::Timeout
    } else {
        RpcError::HttpError(e)
    }
}

fn fetch_failure(e: RpcError) -> TokenError {
    TokenError::FetchFailure(e.to_string())
}

/// Blocking bridge over [`NodeRpcClient::get_raw_transaction`]. Call it
/// from plain threads or a multi-thread runtime.
impl TxFetcher for NodeRpcClient {
    fn fetch_raw_tx(&self, txid: &Hash) -> Result<Vec<u8>, TokenError> {
        self.block_on(self.get_raw_transaction(txid))
            .and_then(|r| r)
            .map_err(fetch_failure)
    }
}

/// Blocking bridge over the async calls, with the same runtime
/// requirements as the [`TxFetcher`] impl.
impl LedgerService for NodeRpcClient {
    fn broadcast_raw_tx(&self, raw_tx: &[u8]) -> Result<Hash, TokenError> {
        match self.block_on(self.send_raw_transaction(raw_tx)).and_then(|r| r) {
            Ok(txid) => Ok(txid),
            Err(RpcError::Node { code, message }) => {
                Err(TokenError::CovenantRejected { code, message })
            }
            Err(e) => Err(fetch_failure(e)),
        }
    }

    fn list_unspent(&self) -> Result<Vec<CandidateOutput>, TokenError> {
        let entries = self
            .block_on(NodeRpcClient::list_unspent(self))
            .and_then(|r| r)
            .map_err(fetch_failure)?;
        entries
            .iter()
            .map(|entry| entry.to_candidate().map_err(fetch_failure))
            .collect()
    }
}
