//! Common types for token operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use slp_primitives::chainhash::Hash;
use slp_script::Script;
use slp_transaction::{TransactionInput, TransactionOutput};

use crate::token_id::TokenId;

/// Default dust limit in satoshis.
pub const DUST_LIMIT: u64 = 546;

/// An unspent output offered for classification or spending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateOutput {
    /// Transaction holding the output.
    pub txid: Hash,
    /// Output index within the transaction.
    pub vout: u32,
    /// Satoshi value of the output.
    pub satoshis: u64,
    /// The output's locking script.
    pub locking_script: Script,
}

impl CandidateOutput {
    /// Create a candidate output.
    pub fn new(txid: Hash, vout: u32, satoshis: u64, locking_script: Script) -> Self {
        CandidateOutput { txid, vout, satoshis, locking_script }
    }

    /// The output as it appears in its transaction.
    pub fn source_output(&self) -> TransactionOutput {
        TransactionOutput::new(self.satoshis, self.locking_script.clone())
    }

    /// An unsigned input spending this output.
    pub fn to_input(&self) -> TransactionInput {
        TransactionInput::from_outpoint(self.txid, self.vout, self.source_output())
    }
}

/// What a token output carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenRole {
    /// A quantity of the token.
    Balance,
    /// The right to mint more of the token.
    Authority,
}

/// A candidate output recognized as carrying a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlpUtxo {
    /// The underlying output.
    pub output: CandidateOutput,
    /// Token carried.
    pub token_id: TokenId,
    /// Balance or authority.
    pub role: TokenRole,
    /// Base units held. Zero for authorities.
    pub quantity: u64,
}

/// Candidate outputs partitioned by what they carry.
///
/// Every classified output lands in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedUtxos {
    /// Outputs carrying no token, in input order.
    pub plain: Vec<CandidateOutput>,
    /// Token balances by token id, in input order.
    pub balances: BTreeMap<TokenId, Vec<SlpUtxo>>,
    /// Mint authorities by token id, in input order.
    pub authorities: BTreeMap<TokenId, Vec<SlpUtxo>>,
}

impl ClassifiedUtxos {
    /// Total number of classified outputs.
    pub fn len(&self) -> usize {
        self.plain.len()
            + self.balances.values().map(Vec::len).sum::<usize>()
            + self.authorities.values().map(Vec::len).sum::<usize>()
    }

    /// `true` if nothing was classified.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of base units held for `token_id`.
    pub fn token_balance(&self, token_id: &TokenId) -> u128 {
        self.balances
            .get(token_id)
            .map_or(0, |utxos| utxos.iter().map(|u| u128::from(u.quantity)).sum())
    }

    /// The first mint authority held for `token_id`.
    pub fn authority(&self, token_id: &TokenId) -> Option<&SlpUtxo> {
        self.authorities.get(token_id).and_then(|a| a.first())
    }

    /// Total satoshis of the plain outputs.
    pub fn plain_satoshis(&self) -> u64 {
        self.plain.iter().map(|o| o.satoshis).sum()
    }
}

/// An output a builder may spend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpendableUtxo {
    /// Output carrying no token.
    Plain(CandidateOutput),
    /// Output carrying a token balance or authority.
    Token(SlpUtxo),
}

impl SpendableUtxo {
    /// The underlying output.
    pub fn output(&self) -> &CandidateOutput {
        match self {
            SpendableUtxo::Plain(o) => o,
            SpendableUtxo::Token(t) => &t.output,
        }
    }

    /// Token details, if any.
    pub fn token(&self) -> Option<&SlpUtxo> {
        match self {
            SpendableUtxo::Plain(_) => None,
            SpendableUtxo::Token(t) => Some(t),
        }
    }
}

impl From<CandidateOutput> for SpendableUtxo {
    fn from(output: CandidateOutput) -> Self {
        SpendableUtxo::Plain(output)
    }
}

impl From<SlpUtxo> for SpendableUtxo {
    fn from(utxo: SlpUtxo) -> Self {
        SpendableUtxo::Token(utxo)
    }
}

/// Fee and dust policy for the builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeConfig {
    /// Fee rate in satoshis per estimated byte.
    pub sats_per_byte: u64,
    /// Lower bound on the fee.
    pub min_fee: u64,
    /// Satoshis placed on token outputs; change below this is folded into
    /// the fee.
    pub dust_limit: u64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        FeeConfig { sats_per_byte: 1, min_fee: 0, dust_limit: DUST_LIMIT }
    }
}

impl FeeConfig {
    /// `max(min_fee, size × sats_per_byte)`.
    pub fn fee_for_size(&self, size: usize) -> u64 {
        self.min_fee.max((size as u64).saturating_mul(self.sats_per_byte))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(vout: u32, satoshis: u64) -> CandidateOutput {
        CandidateOutput::new(Hash::new([1u8; 32]), vout, satoshis, Script::new_p2pkh(&[2u8; 20]))
    }

    #[test]
    fn test_fee_config_defaults_and_partial_json() {
        assert_eq!(
            FeeConfig::default(),
            FeeConfig { sats_per_byte: 1, min_fee: 0, dust_limit: 546 }
        );
        let cfg: FeeConfig = serde_json::from_str(r#"{"sats_per_byte": 2}"#).unwrap();
        assert_eq!(cfg.sats_per_byte, 2);
        assert_eq!(cfg.dust_limit, 546);
        assert_eq!(cfg.fee_for_size(100), 200);
        let floor = FeeConfig { min_fee: 500, ..FeeConfig::default() };
        assert_eq!(floor.fee_for_size(100), 500);
    }

    #[test]
    fn test_candidate_to_input_carries_source() {
        let c = candidate(3, 1000);
        let input = c.to_input();
        assert_eq!(input.source_tx_out_index, 3);
        assert_eq!(input.source_tx_satoshis(), Some(1000));
        assert!(input.unlocking_script.is_none());
    }

    #[test]
    fn test_classified_totals() {
        let token = TokenId::from_txid(Hash::new([7u8; 32]));
        let mut set = ClassifiedUtxos::default();
        assert!(set.is_empty());
        set.plain.push(candidate(0, 5000));
        set.balances.entry(token).or_default().extend([
            SlpUtxo { output: candidate(1, 546), token_id: token, role: TokenRole::Balance, quantity: u64::MAX },
            SlpUtxo { output: candidate(2, 546), token_id: token, role: TokenRole::Balance, quantity: 1 },
        ]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.token_balance(&token), u128::from(u64::MAX) + 1);
        assert!(set.authority(&token).is_none());
        assert_eq!(set.plain_satoshis(), 5000);
    }
}
