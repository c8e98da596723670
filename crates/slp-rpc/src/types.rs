//! RPC data types: configuration, JSON-RPC envelopes and node results.

use serde::{Deserialize, Serialize};

use slp_primitives::chainhash::Hash;
use slp_script::Script;
use slp_tokens::CandidateOutput;

use crate::error::RpcError;

/// Satoshis per coin.
const SATOSHIS_PER_COIN: f64 = 100_000_000.0;

/// Configuration for a [`NodeRpcClient`](crate::NodeRpcClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Node RPC endpoint (e.g. `http://127.0.0.1:18443`).
    pub url: String,
    /// Basic auth user. Empty disables authentication.
    pub username: String,
    /// Basic auth password.
    pub password: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:18443".to_string(),
            username: String::new(),
            password: String::new(),
            timeout_secs: 30,
        }
    }
}

/// A JSON-RPC 1.0 request body.
#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: serde_json::Value,
}

/// A JSON-RPC response body. `result` is kept raw so `null` results can be
/// read as `Option`.
#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse {
    #[serde(default)]
    pub result: serde_json::Value,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

/// The `error` member of a JSON-RPC response.
#[derive(Debug, Deserialize)]
pub(crate) struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// One entry of `listunspent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnspentEntry {
    /// Funding transaction id.
    pub txid: String,
    /// Output index.
    pub vout: u32,
    /// Address the output pays, if the node could decode one.
    #[serde(default)]
    pub address: Option<String>,
    /// Hex locking script.
    pub script_pub_key: String,
    /// Value in coins.
    pub amount: f64,
    /// Confirmation count, zero for mempool outputs.
    #[serde(default)]
    pub confirmations: u32,
}

impl UnspentEntry {
    /// Convert to a classifier candidate.
    pub fn to_candidate(&self) -> Result<CandidateOutput, RpcError> {
        let txid = Hash::from_hex(&self.txid)
            .map_err(|e| RpcError::InvalidResponse(format!("txid {}: {}", self.txid, e)))?;
        let script = Script::from_hex(&self.script_pub_key)
            .map_err(|e| RpcError::InvalidResponse(format!("scriptPubKey: {}", e)))?;
        Ok(CandidateOutput::new(txid, self.vout, coins_to_satoshis(self.amount)?, script))
    }
}

/// The locking script of a `gettxout` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptPubKeyInfo {
    /// Hex locking script.
    pub hex: String,
}

/// Result of `gettxout` for an unspent output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxOutInfo {
    /// Tip the answer was computed at.
    #[serde(default)]
    pub bestblock: String,
    /// Confirmation count, zero for mempool outputs.
    #[serde(default)]
    pub confirmations: u32,
    /// Value in coins.
    pub value: f64,
    /// Locking script.
    pub script_pub_key: ScriptPubKeyInfo,
}

impl TxOutInfo {
    /// Value in satoshis.
    pub fn satoshis(&self) -> Result<u64, RpcError> {
        coins_to_satoshis(self.value)
    }

    /// The locking script.
    pub fn locking_script(&self) -> Result<Script, RpcError> {
        Script::from_hex(&self.script_pub_key.hex)
            .map_err(|e| RpcError::InvalidResponse(format!("scriptPubKey: {}", e)))
    }
}

/// Convert a node coin amount to integer satoshis.
pub(crate) fn coins_to_satoshis(amount: f64) -> Result<u64, RpcError> {
    let satoshis = (amount * SATOSHIS_PER_COIN).round();
    if !satoshis.is_finite() || satoshis < 0.0 || satoshis > u64::MAX as f64 {
        return Err(RpcError::InvalidResponse(format!("invalid amount {}", amount)));
    }
    Ok(satoshis as u64)
}
