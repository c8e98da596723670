use proptest::prelude::*;

use slp_primitives::chainhash::Hash;
use slp_script::Script;
use slp_transaction::sighash::{calc_preimage, calc_preimage_parts, SIGHASH_ALL_FORKID};
use slp_transaction::{Transaction, TransactionInput, TransactionOutput};

/// Strategy to generate a random transaction whose inputs carry source outputs.
fn arb_transaction() -> impl Strategy<Value = Transaction> {
    let arb_input = (
        prop::array::uniform32(any::<u8>()),
        any::<u32>(),
        prop::collection::vec(any::<u8>(), 1..64),
        any::<u32>(),
        any::<u64>(),
    )
        .prop_map(|(hash, idx, script_bytes, seq, value)| {
            let mut input = TransactionInput::from_outpoint(
                Hash::new(hash),
                idx,
                TransactionOutput::new(value, Script::new()),
            );
            input.unlocking_script = Some(Script::from_bytes(&script_bytes));
            input.sequence_number = seq;
            input
        });

    let arb_output = (any::<u64>(), prop::collection::vec(any::<u8>(), 0..64))
        .prop_map(|(satoshis, script_bytes)| {
            TransactionOutput::new(satoshis, Script::from_bytes(&script_bytes))
        });

    (
        any::<u32>(),
        prop::collection::vec(arb_input, 1..4),
        prop::collection::vec(arb_output, 1..4),
        any::<u32>(),
    )
        .prop_map(|(version, inputs, outputs, lock_time)| {
            let mut tx = Transaction::new();
            tx.version = version;
            tx.lock_time = lock_time;
            for i in inputs {
                tx.add_input(i);
            }
            for o in outputs {
                tx.add_output(o);
            }
            tx
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn transaction_serialize_deserialize_roundtrip(tx in arb_transaction()) {
        let bytes = tx.to_bytes();
        let tx2 = Transaction::from_bytes(&bytes).unwrap();
        prop_assert_eq!(tx2.to_bytes(), bytes);
        prop_assert_eq!(tx2.tx_id(), tx.tx_id());
    }

    #[test]
    fn preimage_parts_concatenate_to_preimage(
        tx in arb_transaction(),
        script in prop::collection::vec(any::<u8>(), 0..300),
        value in any::<u64>()
    ) {
        let parts = calc_preimage_parts(&tx, 0, &script, SIGHASH_ALL_FORKID, value).unwrap();
        let fields = parts.fields();
        prop_assert_eq!(fields.iter().map(|f| f.len()).sum::<usize>(), parts.to_bytes().len());
        prop_assert_eq!(
            parts.to_bytes(),
            calc_preimage(&tx, 0, &script, SIGHASH_ALL_FORKID, value).unwrap()
        );
    }
}
