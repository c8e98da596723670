//! Provenance validation of token transactions.
//!
//! [`ProvenanceValidator`] decides whether a transaction is a valid SLP
//! token transaction by walking its ancestry. GENESIS records are valid on
//! their own. A MINT must spend a mint authority and a SEND must spend at
//! least as many base units as it assigns, both from valid ancestors of
//! the same token.
//!
//! The walk uses an explicit work stack with the [`ValidationCache`] as the
//! visited set, so every transaction is fetched and decoded at most once
//! per session and deep ancestries cannot overflow the call stack. Each
//! direct parent is decoded before its own history is followed, and only
//! parents of the same token are walked further. Inputs from other tokens
//! never back a claim, so their ancestry is left alone.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use slp_primitives::chainhash::{double_hash_h, Hash};
use slp_transaction::Transaction;

use crate::error::TokenError;
use crate::ledger::TxFetcher;
use crate::metadata::{carries_lokad, TokenRecord};
use crate::token_id::TokenId;

/// A valid token transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTx {
    /// Transaction id.
    pub txid: Hash,
    /// Token the transaction acts on.
    pub token_id: TokenId,
    /// Decoded output 0.
    pub record: TokenRecord,
}

/// Why a transaction claiming to be a token transaction is not valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    /// Output 0 carries the SLP lokad id but does not decode.
    Malformed(String),
    /// The ancestry does not back the record's claim.
    Mismatch(String),
}

/// Outcome of validating one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// A valid token transaction.
    Valid(TokenTx),
    /// Output 0 is not an SLP payload.
    NotToken,
    /// Claims to be a token transaction but is not valid.
    Invalid(InvalidReason),
}

impl Verdict {
    /// The token transaction, if valid.
    pub fn token_tx(&self) -> Option<&TokenTx> {
        match self {
            Verdict::Valid(t) => Some(t),
            _ => None,
        }
    }

    /// `true` for [`Verdict::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid(_))
    }
}

/// Verdicts by txid. Grows monotonically and is never invalidated.
#[derive(Debug, Clone, Default)]
pub struct ValidationCache {
    verdicts: HashMap<Hash, Verdict>,
}

impl ValidationCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached verdict for `txid`.
    pub fn get(&self, txid: &Hash) -> Option<&Verdict> {
        self.verdicts.get(txid)
    }

    /// `true` if `txid` has been decided.
    pub fn contains(&self, txid: &Hash) -> bool {
        self.verdicts.contains_key(txid)
    }

    /// Number of decided transactions.
    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    /// `true` if nothing has been decided.
    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    fn insert(&mut self, txid: Hash, verdict: Verdict) {
        self.verdicts.entry(txid).or_insert(verdict);
    }
}

/// A fetched MINT or SEND and its decoded record.
struct Pending {
    tx: Transaction,
    record: TokenRecord,
}

enum Decoded {
    Settled(Verdict),
    NeedsAncestors(TokenRecord),
}

/// Validates token transactions against their ancestry.
pub struct ProvenanceValidator<'a> {
    fetcher: &'a dyn TxFetcher,
    cache: ValidationCache,
}

impl<'a> ProvenanceValidator<'a> {
    /// Create a validator with an empty cache.
    pub fn new(fetcher: &'a dyn TxFetcher) -> Self {
        Self::with_cache(fetcher, ValidationCache::new())
    }

    /// Create a validator seeded with verdicts from earlier in the session.
    pub fn with_cache(fetcher: &'a dyn TxFetcher, cache: ValidationCache) -> Self {
        ProvenanceValidator { fetcher, cache }
    }

    /// Verdicts decided so far.
    pub fn cache(&self) -> &ValidationCache {
        &self.cache
    }

    /// Consume the validator, keeping its verdicts.
    pub fn into_cache(self) -> ValidationCache {
        self.cache
    }

    /// Decide whether `txid` is a valid token transaction.
    ///
    /// Invalid verdicts are cached and propagate to descendants. A fetch
    /// failure aborts the whole call and leaves the undecided
    /// transactions out of the cache. A MINT or SEND parent of another
    /// token is fetched once to read its record and is not validated.
    pub fn validate(&mut self, txid: &Hash) -> Result<Verdict, TokenError> {
        if let Some(verdict) = self.cache.get(txid) {
            trace!(%txid, "validation cache hit");
            return Ok(verdict.clone());
        }

        let mut stack = vec![*txid];
        // fetched MINT/SEND transactions not yet walked, by txid
        let mut fetched: HashMap<Hash, Pending> = HashMap::new();
        // transactions whose ancestors are being walked
        let mut pending: HashMap<Hash, Pending> = HashMap::new();

        while let Some(&current) = stack.last() {
            if self.cache.contains(&current) {
                stack.pop();
                continue;
            }

            if !pending.contains_key(&current) {
                if let Some(entry) = fetched.remove(&current) {
                    pending.insert(current, entry);
                } else {
                    let tx = self.fetch(&current)?;
                    match decode(&tx) {
                        Decoded::Settled(verdict) => {
                            self.settle(current, verdict);
                            stack.pop();
                            continue;
                        }
                        Decoded::NeedsAncestors(record) => {
                            pending.insert(current, Pending { tx, record });
                        }
                    }
                }
            }

            let (token_id, sources) = match pending.get(&current) {
                Some(entry) => (entry.record.token_id(&current), distinct_sources(&entry.tx)),
                None => {
                    stack.pop();
                    continue;
                }
            };

            let mut waiting = false;
            let mut cyclic = false;
            for source in sources {
                if self.cache.contains(&source) {
                    continue;
                }
                // pending entries below us on the stack are our descendants
                if pending.contains_key(&source) {
                    cyclic = true;
                    break;
                }
                if !fetched.contains_key(&source) {
                    let tx = self.fetch(&source)?;
                    match decode(&tx) {
                        Decoded::Settled(verdict) => {
                            self.settle(source, verdict);
                            continue;
                        }
                        Decoded::NeedsAncestors(record) => {
                            fetched.insert(source, Pending { tx, record });
                        }
                    }
                }
                // only parents of the same token can back this claim
                let same_token = fetched
                    .get(&source)
                    .is_some_and(|p| p.record.token_id(&source) == token_id);
                if same_token {
                    stack.push(source);
                    waiting = true;
                } else {
                    trace!(txid = %current, parent = %source, "skipping parent of another token");
                }
            }

            if cyclic {
                pending.remove(&current);
                self.settle(current, Verdict::Invalid(InvalidReason::Mismatch(
                    "ancestry contains a cycle".into(),
                )));
                stack.pop();
            } else if !waiting {
                if let Some(entry) = pending.remove(&current) {
                    let verdict = self.judge(&current, &entry.tx, entry.record);
                    self.settle(current, verdict);
                }
                stack.pop();
            }
        }

        self.cache
            .get(txid)
            .cloned()
            .ok_or_else(|| TokenError::FetchFailure(format!("validation of {} did not settle", txid)))
    }

    /// Validate `txid`, turning anything but a valid verdict into an error.
    pub fn require_valid(&mut self, txid: &Hash) -> Result<TokenTx, TokenError> {
        match self.validate(txid)? {
            Verdict::Valid(token_tx) => Ok(token_tx),
            Verdict::NotToken => Err(TokenError::InvalidInput(format!(
                "{} is not a token transaction",
                txid
            ))),
            Verdict::Invalid(InvalidReason::Malformed(msg)) => Err(TokenError::MalformedMetadata(msg)),
            Verdict::Invalid(InvalidReason::Mismatch(msg)) => Err(TokenError::ProvenanceMismatch(msg)),
        }
    }

    fn fetch(&self, txid: &Hash) -> Result<Transaction, TokenError> {
        debug!(%txid, "fetching transaction");
        let raw = self.fetcher.fetch_raw_tx(txid)?;
        let computed = double_hash_h(&raw);
        if computed != *txid {
            return Err(TokenError::FetchFailure(format!(
                "fetched bytes for {} hash to {}",
                txid, computed
            )));
        }
        Transaction::from_bytes(&raw).map_err(|e| {
            TokenError::FetchFailure(format!("transaction {} does not parse: {}", txid, e))
        })
    }

    fn settle(&mut self, txid: Hash, verdict: Verdict) {
        match &verdict {
            Verdict::Valid(t) => debug!(%txid, token_id = %t.token_id, kind = ?t.record.kind(), "valid token transaction"),
            Verdict::NotToken => debug!(%txid, "not a token transaction"),
            Verdict::Invalid(reason) => debug!(%txid, ?reason, "invalid token transaction"),
        }
        self.cache.insert(txid, verdict);
    }

    /// Decide a MINT or SEND once every input's source has a verdict.
    fn judge(&self, txid: &Hash, tx: &Transaction, record: TokenRecord) -> Verdict {
        let token_id = record.token_id(txid);

        // Inputs spending outputs of valid ancestors of this token.
        let mut backing = Vec::new();
        for input in &tx.inputs {
            match self.cache.get(&input.source_txid) {
                Some(Verdict::Valid(ancestor)) if ancestor.token_id == token_id => {
                    backing.push((ancestor, input.source_tx_out_index));
                }
                Some(Verdict::Invalid(reason)) => {
                    warn!(%txid, ancestor = %input.source_txid, ?reason, "input spends an invalid token transaction");
                }
                _ => {}
            }
        }

        let claim = match &record {
            TokenRecord::Genesis(_) => Ok(()),
            TokenRecord::Mint(_) => {
                let authorized = backing
                    .iter()
                    .any(|(ancestor, vout)| ancestor.record.authority_vout() == Some(*vout));
                if authorized {
                    Ok(())
                } else {
                    Err(format!("no input spends a mint authority of token {}", token_id))
                }
            }
            TokenRecord::Send(send) => {
                let available: u128 = backing
                    .iter()
                    .filter_map(|(ancestor, vout)| ancestor.record.quantity_at(*vout))
                    .map(u128::from)
                    .sum();
                let required: u128 = send.quantities.iter().copied().map(u128::from).sum();
                if available >= required {
                    Ok(())
                } else {
                    Err(format!(
                        "inputs carry {} base units of token {} but outputs assign {}",
                        available, token_id, required
                    ))
                }
            }
        };

        match claim {
            Ok(()) => Verdict::Valid(TokenTx { txid: *txid, token_id, record }),
            Err(msg) => Verdict::Invalid(InvalidReason::Mismatch(msg)),
        }
    }
}

/// Source txids of `tx`'s inputs, first occurrence order.
fn distinct_sources(tx: &Transaction) -> Vec<Hash> {
    let mut sources: Vec<Hash> = Vec::with_capacity(tx.inputs.len());
    for input in &tx.inputs {
        if !sources.contains(&input.source_txid) {
            sources.push(input.source_txid);
        }
    }
    sources
}

fn decode(tx: &Transaction) -> Decoded {
    let Some(first) = tx.outputs.first() else {
        return Decoded::Settled(Verdict::NotToken);
    };
    if !carries_lokad(&first.locking_script) {
        return Decoded::Settled(Verdict::NotToken);
    }
    match TokenRecord::from_script(&first.locking_script) {
        Ok(record @ TokenRecord::Genesis(_)) => {
            let txid = tx.tx_id();
            Decoded::Settled(Verdict::Valid(TokenTx {
                txid,
                token_id: TokenId::from_txid(txid),
                record,
            }))
        }
        Ok(record) => Decoded::NeedsAncestors(record),
        Err(e) => Decoded::Settled(Verdict::Invalid(InvalidReason::Malformed(e.to_string()))),
    }
}
