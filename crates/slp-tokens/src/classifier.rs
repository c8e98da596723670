//! Partitioning of candidate outputs into plain outputs, token balances and
//! mint authorities.

use tracing::debug;

use crate::error::TokenError;
use crate::ledger::LedgerService;
use crate::types::{CandidateOutput, ClassifiedUtxos, SlpUtxo, TokenRole};
use crate::validator::{ProvenanceValidator, Verdict};

/// Classify `candidates` by the verdict on the transaction holding each.
///
/// Outputs of transactions that are not valid token transactions are
/// plain. For valid ones, the record's authority vout is an authority, a
/// vout assigned a quantity is a balance and any other vout is plain.
/// On success every candidate lands in exactly one bucket. Output 0 of a
/// valid token transaction carries the metadata and has no bucket, so
/// offering it fails the whole call with
/// [`TokenError::MetadataOutputSpend`] instead of being dropped. Callers
/// listing wallet outputs never see it, since metadata outputs hold zero
/// satoshis and are unspendable.
pub fn classify(
    validator: &mut ProvenanceValidator<'_>,
    candidates: &[CandidateOutput],
) -> Result<ClassifiedUtxos, TokenError> {
    let mut classified = ClassifiedUtxos::default();

    for candidate in candidates {
        let verdict = validator.validate(&candidate.txid)?;
        let Verdict::Valid(token_tx) = verdict else {
            classified.plain.push(candidate.clone());
            continue;
        };

        if candidate.vout == 0 {
            return Err(TokenError::MetadataOutputSpend { txid: candidate.txid });
        }

        if token_tx.record.authority_vout() == Some(candidate.vout) {
            classified
                .authorities
                .entry(token_tx.token_id)
                .or_default()
                .push(SlpUtxo {
                    output: candidate.clone(),
                    token_id: token_tx.token_id,
                    role: TokenRole::Authority,
                    quantity: 0,
                });
        } else if let Some(quantity) = token_tx.record.quantity_at(candidate.vout) {
            classified
                .balances
                .entry(token_tx.token_id)
                .or_default()
                .push(SlpUtxo {
                    output: candidate.clone(),
                    token_id: token_tx.token_id,
                    role: TokenRole::Balance,
                    quantity,
                });
        } else {
            classified.plain.push(candidate.clone());
        }
    }

    debug!(
        plain = classified.plain.len(),
        balance_tokens = classified.balances.len(),
        authority_tokens = classified.authorities.len(),
        "classified candidate outputs"
    );
    Ok(classified)
}

/// List the ledger's unspent outputs and classify them.
pub fn classify_unspent(
    ledger: &dyn LedgerService,
    validator: &mut ProvenanceValidator<'_>,
) -> Result<ClassifiedUtxos, TokenError> {
    let unspent = ledger.list_unspent()?;
    debug!(count = unspent.len(), "listed unspent outputs");
    classify(validator, &unspent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::encode_send;
    use crate::tests::fixtures::*;
    use crate::token_id::TokenId;

    #[test]
    fn test_genesis_outputs_by_role() {
        let ledger = MockLedger::new();
        let f1 = ledger.add(&funding_tx(1));
        let tx = genesis_tx(f1, 1000, Some(2));
        let genesis = ledger.add(&tx);
        let token = TokenId::from_txid(genesis);

        let candidates = vec![
            candidate_of(&tx, 1),
            candidate_of(&tx, 2),
            candidate_of(&tx, 3),
        ];
        let mut validator = ProvenanceValidator::new(&ledger);
        let set = classify(&mut validator, &candidates).unwrap();

        assert_eq!(set.balances[&token].len(), 1);
        assert_eq!(set.balances[&token][0].quantity, 1000);
        assert_eq!(set.authorities[&token].len(), 1);
        assert_eq!(set.authorities[&token][0].output.vout, 2);
        assert_eq!(set.authorities[&token][0].role, TokenRole::Authority);
        // change output
        assert_eq!(set.plain.len(), 1);
        assert_eq!(set.plain[0].vout, 3);
        assert_eq!(set.len(), candidates.len());
    }

    #[test]
    fn test_metadata_output_is_rejected() {
        let ledger = MockLedger::new();
        let f1 = ledger.add(&funding_tx(1));
        let tx = genesis_tx(f1, 1000, None);
        ledger.add(&tx);
        let mut validator = ProvenanceValidator::new(&ledger);
        let result = classify(&mut validator, &[candidate_of(&tx, 1), candidate_of(&tx, 0)]);
        match result {
            Err(TokenError::MetadataOutputSpend { txid }) => assert_eq!(txid, tx.tx_id()),
            other => panic!("unexpected result {:?}", other),
        }

        // the same output of a non-token transaction is plain
        let funding = funding_tx(2);
        ledger.add(&funding);
        let set = classify(&mut validator, &[candidate_of(&funding, 0)]).unwrap();
        assert_eq!(set.plain.len(), 1);
    }

    #[test]
    fn test_invalid_and_plain_transactions_are_plain() {
        let ledger = MockLedger::new();
        let f1 = ledger.add(&funding_tx(1));
        let funding = funding_tx(2);
        ledger.add(&funding);
        let genesis = ledger.add(&genesis_tx(f1, 10, None));
        let token = TokenId::from_txid(genesis);
        let inflating = tx_with(
            &[(genesis, 1)],
            vec![data_out(encode_send(&token, &[11]).unwrap()), p2pkh_out(546)],
        );
        ledger.add(&inflating);

        let mut validator = ProvenanceValidator::new(&ledger);
        let set = classify(
            &mut validator,
            &[candidate_of(&funding, 0), candidate_of(&inflating, 1), candidate_of(&inflating, 0)],
        )
        .unwrap();
        assert_eq!(set.plain.len(), 3);
        assert!(set.balances.is_empty());
        assert!(set.authorities.is_empty());
    }

    #[test]
    fn test_classify_unspent_uses_ledger_listing() {
        let ledger = MockLedger::new();
        let f1 = ledger.add(&funding_tx(1));
        let tx = genesis_tx(f1, 1000, Some(2));
        ledger.add(&tx);
        ledger.set_unspent(vec![candidate_of(&tx, 2), candidate_of(&tx, 3)]);

        let mut validator = ProvenanceValidator::new(&ledger);
        let set = classify_unspent(&ledger, &mut validator).unwrap();
        assert_eq!(set.authorities.len(), 1);
        assert_eq!(set.plain.len(), 1);
    }
}
