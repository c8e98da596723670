//! Tests for the slp-transaction crate: wire format, txids, the FORKID
//! preimage fields, P2PKH signing and interpreter verification.

use slp_primitives::chainhash::Hash;
use slp_primitives::ec::PrivateKey;
use slp_primitives::hash::sha256d;
use slp_script::interpreter::ScriptFlags;
use slp_script::opcodes::*;
use slp_script::{Address, Network, Script};

use crate::input::TransactionInput;
use crate::output::TransactionOutput;
use crate::sighash::{self, SIGHASH_ALL_FORKID};
use crate::template::{p2pkh, p2sh, UnlockingScriptTemplate};
use crate::transaction::Transaction;
use crate::TransactionError;

/// A standard transaction: one input, an OP_RETURN-prefixed output and a P2PKH output.
const SOURCE_RAW_TX: &str = "010000000138c7c61c14ffb063c3bb2664041a3e29ea6ea0412a0c18ff725ba4e9e12afae2030000006a47304402203e9ab8e4c14addf3b4741540b556cfb0e0efb67dc1a7b5ce84c3ac56b3fd447802203c9f49f7bd893ebd7060176dfc36bcaff9d2c443d9a0dd6cd2d59b372c024d20412102798913bc057b344de675dac34faafe3dc2f312c758cd9068209f810877306d66ffffffff02dc050000000000002076a914eb0bd5edba389198e73f8efabddfc61666969ff788ac6a0568656c6c6faa0d0000000000001976a914eb0bd5edba389198e73f8efabddfc61666969ff788ac00000000";

/// Three inputs, two outputs, lock time 103.
const MULTI_INPUT_TX_HEX: &str = "0200000003a9bc457fdc6a54d99300fb137b23714d860c350a9d19ff0f571e694a419ff3a0010000006b48304502210086c83beb2b2663e4709a583d261d75be538aedcafa7766bd983e5c8db2f8b2fc02201a88b178624ab0ad1748b37c875f885930166237c88f5af78ee4e61d337f935f412103e8be830d98bb3b007a0343ee5c36daa48796ae8bb57946b1e87378ad6e8a090dfeffffff0092bb9a47e27bf64fc98f557c530c04d9ac25e2f2a8b600e92a0b1ae7c89c20010000006b483045022100f06b3db1c0a11af348401f9cebe10ae2659d6e766a9dcd9e3a04690ba10a160f02203f7fbd7dfcfc70863aface1a306fcc91bbadf6bc884c21a55ef0d32bd6b088c8412103e8be830d98bb3b007a0343ee5c36daa48796ae8bb57946b1e87378ad6e8a090dfeffffff9d0d4554fa692420a0830ca614b6c60f1bf8eaaa21afca4aa8c99fb052d9f398000000006b483045022100d920f2290548e92a6235f8b2513b7f693a64a0d3fa699f81a034f4b4608ff82f0220767d7d98025aff3c7bd5f2a66aab6a824f5990392e6489aae1e1ae3472d8dffb412103e8be830d98bb3b007a0343ee5c36daa48796ae8bb57946b1e87378ad6e8a090dfeffffff02807c814a000000001976a9143a6bf34ebfcf30e8541bbb33a7882845e5a29cb488ac76b0e60e000000001976a914bd492b67f90cb85918494767ebb23102c4f06b7088ac67000000";

/// Unsigned spend of a P2PKH output, and the same transaction signed with
/// `SIGNING_WIF` (RFC6979, ALL|FORKID).
const UNSIGNED_TX: &str = "010000000193a35408b6068499e0d5abd799d3e827d9bfe70c9b75ebe209c91d25072326510000000000ffffffff02404b4c00000000001976a91404ff367be719efa79d76e4416ffb072cd53b208888acde94a905000000001976a91404d03f746652cfcb6cb55119ab473a045137d26588ac00000000";
const SIGNED_TX: &str = "010000000193a35408b6068499e0d5abd799d3e827d9bfe70c9b75ebe209c91d2507232651000000006b483045022100c1d77036dc6cd1f3fa1214b0688391ab7f7a16cd31ea4e5a1f7a415ef167df820220751aced6d24649fa235132f1e6969e163b9400f80043a72879237dab4a1190ad412103b8b40a84123121d260f5c109bc5a46ec819c2e4002e5ba08638783bfb4e01435ffffffff02404b4c00000000001976a91404ff367be719efa79d76e4416ffb072cd53b208888acde94a905000000001976a91404d03f746652cfcb6cb55119ab473a045137d26588ac00000000";
const SIGNING_WIF: &str = "cNGwGSc7KRrTmdLUZ54fiSXWbhLNDc2Eg5zNucgQxyQCzuQ5YRDq";
const SPENT_SCRIPT: &str = "76a914c0a3c167a28cabb9fbb495affa0761e6e74ac60d88ac";

fn unsigned_with_source() -> Transaction {
    let mut tx = Transaction::from_hex(UNSIGNED_TX).unwrap();
    tx.inputs[0].set_source_output(Some(TransactionOutput::new(
        100_000_000,
        Script::from_hex(SPENT_SCRIPT).unwrap(),
    )));
    tx
}

// -----------------------------------------------------------------------
// Parsing and serialization
// -----------------------------------------------------------------------

#[test]
fn test_from_hex_roundtrip() {
    let tx = Transaction::from_hex(SOURCE_RAW_TX).unwrap();
    assert_eq!(tx.version, 1);
    assert_eq!(tx.input_count(), 1);
    assert_eq!(tx.output_count(), 2);
    assert_eq!(tx.lock_time, 0);
    assert_eq!(tx.to_hex(), SOURCE_RAW_TX);
}

#[test]
fn test_multi_input_roundtrip() {
    let tx = Transaction::from_hex(MULTI_INPUT_TX_HEX).unwrap();
    assert_eq!(tx.version, 2);
    assert_eq!(tx.input_count(), 3);
    assert_eq!(tx.output_count(), 2);
    assert_eq!(tx.lock_time, 103);
    assert_eq!(tx.inputs[0].sequence_number, 0xffff_fffe);
    assert_eq!(tx.to_hex(), MULTI_INPUT_TX_HEX);
}

#[test]
fn test_trailing_bytes_error() {
    let hex_with_trailing = format!("{}00", SOURCE_RAW_TX);
    assert!(matches!(
        Transaction::from_hex(&hex_with_trailing),
        Err(TransactionError::SerializationError(_))
    ));
}

#[test]
fn test_truncated_and_invalid_input() {
    assert!(Transaction::from_bytes(&[]).is_err());
    assert!(Transaction::from_hex("zz").is_err());
    let truncated = &SOURCE_RAW_TX[..SOURCE_RAW_TX.len() - 10];
    assert!(Transaction::from_hex(truncated).is_err());
}

#[test]
fn test_unsigned_input_reads_back_as_none() {
    let tx = Transaction::from_hex(UNSIGNED_TX).unwrap();
    assert!(tx.inputs[0].unlocking_script.is_none());
    assert!(tx.inputs[0].source_tx_output().is_none());
}

#[test]
fn test_tx_id_is_reversed_double_sha() {
    let tx = Transaction::from_hex(SOURCE_RAW_TX).unwrap();
    let raw = sha256d(&hex::decode(SOURCE_RAW_TX).unwrap());
    assert_eq!(tx.tx_id(), Hash::new(raw));
    let mut reversed = raw;
    reversed.reverse();
    assert_eq!(tx.tx_id_hex(), hex::encode(reversed));
    assert_eq!(tx.to_string(), SOURCE_RAW_TX);
}

#[test]
fn test_input_source_txid_display_order() {
    let tx = Transaction::from_hex(UNSIGNED_TX).unwrap();
    assert_eq!(
        tx.inputs[0].source_txid.to_string(),
        "51262307251dc909e2eb759b0ce7bfd927e8d399d7abd5e0998406b60854a393"
    );
}

#[test]
fn test_fee_and_totals() {
    let tx = unsigned_with_source();
    assert_eq!(tx.total_input_satoshis().unwrap(), 100_000_000);
    assert_eq!(tx.total_output_satoshis(), 5_000_000 + 94_999_774);
    assert_eq!(tx.fee().unwrap(), 226);

    let bare = Transaction::from_hex(UNSIGNED_TX).unwrap();
    assert!(bare.total_input_satoshis().is_err());
}

// -----------------------------------------------------------------------
// Sighash
// -----------------------------------------------------------------------

#[test]
fn test_preimage_parts_layout() {
    let tx = unsigned_with_source();
    let script = Script::from_hex(SPENT_SCRIPT).unwrap();
    let parts =
        sighash::calc_preimage_parts(&tx, 0, script.to_bytes(), SIGHASH_ALL_FORKID, 100_000_000)
            .unwrap();

    assert_eq!(parts.version, [1, 0, 0, 0]);
    assert_eq!(&parts.outpoint[..32], tx.inputs[0].source_txid.as_bytes());
    assert_eq!(&parts.outpoint[32..], &[0, 0, 0, 0]);
    assert_eq!(parts.script_code[0] as usize, script.len());
    assert_eq!(&parts.script_code[1..], script.to_bytes());
    assert_eq!(parts.value, 100_000_000u64.to_le_bytes());
    assert_eq!(parts.sequence, [0xff; 4]);
    assert_eq!(parts.sighash_type, [0x41, 0, 0, 0]);

    let mut outputs = Vec::new();
    for o in &tx.outputs {
        outputs.extend_from_slice(&o.to_bytes());
    }
    assert_eq!(parts.hash_outputs, sha256d(&outputs));

    let preimage = parts.to_bytes();
    assert_eq!(preimage.len(), 4 + 32 + 32 + 36 + 26 + 8 + 4 + 32 + 4 + 4);
    assert_eq!(
        preimage,
        sighash::calc_preimage(&tx, 0, script.to_bytes(), SIGHASH_ALL_FORKID, 100_000_000)
            .unwrap()
    );
    assert_eq!(
        sha256d(&preimage),
        tx.calc_input_signature_hash(0, SIGHASH_ALL_FORKID).unwrap()
    );
}

#[test]
fn test_anyonecanpay_zeroes_prevouts() {
    let tx = unsigned_with_source();
    let parts = sighash::calc_preimage_parts(
        &tx,
        0,
        &[],
        SIGHASH_ALL_FORKID | sighash::SIGHASH_ANYONECANPAY,
        1,
    )
    .unwrap();
    assert_eq!(parts.hash_prevouts, [0u8; 32]);
    assert_eq!(parts.hash_sequence, [0u8; 32]);
    assert_ne!(parts.hash_outputs, [0u8; 32]);
}

#[test]
fn test_signature_hash_out_of_range() {
    let tx = unsigned_with_source();
    assert!(sighash::signature_hash(&tx, 5, &[], SIGHASH_ALL_FORKID, 0).is_err());
    assert!(tx.calc_input_signature_hash(1, SIGHASH_ALL_FORKID).is_err());
}

// -----------------------------------------------------------------------
// P2PKH signing and verification
// -----------------------------------------------------------------------

#[test]
fn test_p2pkh_sign_exact_match() {
    let mut tx = unsigned_with_source();
    let key = PrivateKey::from_wif(SIGNING_WIF).unwrap();
    let unlocker = p2pkh::unlock(key, None);
    let unlocking = unlocker.sign(&tx, 0).unwrap();
    assert!(unlocking.len() <= unlocker.estimate_length(&tx, 0));
    tx.inputs[0].unlocking_script = Some(unlocking);
    assert_eq!(tx.to_hex(), SIGNED_TX);
}

#[test]
fn test_verify_signed_p2pkh_input() {
    let mut tx = unsigned_with_source();
    let key = PrivateKey::from_wif(SIGNING_WIF).unwrap();
    tx.inputs[0].unlocking_script = Some(p2pkh::unlock(key, None).sign(&tx, 0).unwrap());
    tx.verify_input(0, ScriptFlags::STANDARD).unwrap();

    // Changing an output invalidates the signature.
    tx.outputs[0].satoshis -= 1;
    assert!(matches!(
        tx.verify_input(0, ScriptFlags::STANDARD),
        Err(TransactionError::Verification(_))
    ));
}

#[test]
fn test_verify_unsigned_input_fails() {
    let tx = unsigned_with_source();
    assert!(tx.verify_input(0, ScriptFlags::STANDARD).is_err());
}

#[test]
fn test_p2pkh_requires_source_output() {
    let tx = Transaction::from_hex(UNSIGNED_TX).unwrap();
    let key = PrivateKey::from_wif(SIGNING_WIF).unwrap();
    assert!(matches!(
        p2pkh::unlock(key, None).sign(&tx, 0),
        Err(TransactionError::SigningError(_))
    ));
}

#[test]
fn test_p2pkh_lock_rejects_p2sh_address() {
    let key = PrivateKey::from_wif(SIGNING_WIF).unwrap();
    let addr = Address::from_public_key(&key.pub_key(), Network::Testnet);
    assert_eq!(
        p2pkh::lock(&addr).unwrap().to_hex(),
        format!("76a914{}88ac", hex::encode(key.pub_key().hash160()))
    );
    let vault = Address::from_script_hash(&[7u8; 20], Network::Testnet);
    assert!(p2pkh::lock(&vault).is_err());
    assert!(p2sh::lock(&vault).unwrap().is_p2sh());
}

// -----------------------------------------------------------------------
// P2SH
// -----------------------------------------------------------------------

/// A redeem script `<pk> OP_CHECKSIG` spent through P2SH signs with the
/// redeem script as scriptCode.
#[test]
fn test_p2sh_checksig_spend() {
    let key = PrivateKey::random();
    let mut redeem = Script::new();
    redeem
        .append_push_data(&key.pub_key().to_compressed())
        .unwrap()
        .append_opcodes(&[OP_CHECKSIG])
        .unwrap();
    let vault = Address::from_redeem_script(&redeem, Network::Regtest);

    let mut tx = Transaction::new();
    tx.add_input(TransactionInput::from_outpoint(
        Hash::new([9u8; 32]),
        2,
        TransactionOutput::new(546, p2sh::lock(&vault).unwrap()),
    ));
    tx.add_output(TransactionOutput::new(
        300,
        Address::from_public_key_hash(&[1u8; 20], Network::Regtest).locking_script(),
    ));

    let digest =
        sighash::signature_hash(&tx, 0, redeem.to_bytes(), SIGHASH_ALL_FORKID, 546).unwrap();
    let mut sig = key.sign(&digest).unwrap().to_der();
    sig.push(SIGHASH_ALL_FORKID as u8);

    tx.inputs[0].unlocking_script = Some(p2sh::unlocking_script(&[sig], &redeem).unwrap());
    tx.verify_input(0, ScriptFlags::STANDARD).unwrap();
}
