//! Version 0 vault script.
//!
//! Stack on entry, top first: signature, the ten preimage fields from
//! nVersion to the sighash type, the minted quantity, the receiver's
//! public key hash and the serialized trailing outputs.
//!
//! ```text
//! OP_DUP <pk> OP_CHECKSIGVERIFY                      sig signs this spend
//! OP_8 OP_PICK OP_TOALTSTACK                         save hashOutputs
//! OP_5 OP_PICK <n> OP_SPLIT OP_NIP OP_HASH160        hash of own redeem script
//!   OP_TOALTSTACK
//! OP_SIZE OP_1SUB OP_SPLIT OP_DROP OP_TOALTSTACK     save DER sig
//! (OP_SWAP OP_CAT) x9                                join the preimage
//! OP_DUP OP_SIZE OP_4 OP_SUB OP_SPLIT OP_NIP         sighash type is ALL|FORKID
//!   <41000000> OP_EQUALVERIFY
//! OP_SHA256 OP_FROMALTSTACK OP_SWAP <pk>             preimage is authentic
//!   OP_CHECKDATASIGVERIFY
//! OP_SIZE OP_8 OP_EQUALVERIFY <P0> OP_SWAP OP_CAT    output 0: MINT record
//! OP_SWAP OP_SIZE <20> OP_EQUALVERIFY <P1> OP_SWAP   output 1: P2PKH receiver
//!   OP_CAT <88ac> OP_CAT OP_CAT
//! <P2> OP_FROMALTSTACK OP_CAT <87> OP_CAT OP_CAT     output 2: back to the vault
//! OP_SWAP OP_CAT OP_HASH256 OP_FROMALTSTACK OP_EQUAL outputs match hashOutputs
//! ```
//!
//! `<n>` is the VarInt width of the redeem script length, the prefix of the
//! preimage's scriptCode field.

use slp_primitives::util::VarInt;
use slp_script::opcodes::*;
use slp_script::Script;
use slp_transaction::sighash::SIGHASH_ALL_FORKID;

use super::schema::UnlockSchema;
use super::{CovenantCompiler, MintVault, VaultParams};
use crate::builder::AUTHORITY_VOUT;
use crate::error::TokenError;
use crate::metadata::encode_mint;
use crate::types::DUST_LIMIT;

/// Satoshis the vault requires on the receiver and authority outputs.
pub(crate) const VAULT_OUTPUT_SATOSHIS: u64 = DUST_LIMIT;

/// Compiler for the version 0 vault script.
#[derive(Debug, Clone, Copy, Default)]
pub struct VaultCompilerV0;

impl CovenantCompiler for VaultCompilerV0 {
    fn compile(&self, params: &VaultParams) -> Result<MintVault, TokenError> {
        // the script rebuilds the authority output at index 2
        if params.authority_vout != AUTHORITY_VOUT {
            return Err(TokenError::InvalidInput(format!(
                "v0 vaults hold the authority at output {}, not {}",
                AUTHORITY_VOUT, params.authority_vout
            )));
        }
        let templates = OutputTemplates::new(params)?;
        let draft = redeem_script(params, &templates, 1)?;
        let prefix_len = VarInt::from(draft.len()).length();
        // the prefix push is a single opcode either way, so the length holds
        let script = if prefix_len == 1 {
            draft
        } else {
            redeem_script(params, &templates, prefix_len as u64)?
        };
        Ok(MintVault::from_compiled(*params, script, UnlockSchema::V0))
    }
}

/// Serialized output prefixes the script completes with pushed data.
struct OutputTemplates {
    /// value, script length and MINT record up to its quantity push.
    mint: Vec<u8>,
    /// value, script length and `OP_DUP OP_HASH160 <20>`.
    receiver: Vec<u8>,
    /// value, script length and `OP_HASH160 <20>`.
    vault: Vec<u8>,
}

impl OutputTemplates {
    fn new(params: &VaultParams) -> Result<Self, TokenError> {
        let record = encode_mint(&params.token_id, Some(params.authority_vout), 0)?;
        let record = record.to_bytes();
        // drop the zero quantity, keep its 0x08 push opcode
        let record_prefix = &record[..record.len() - 8];

        let mut mint = 0u64.to_le_bytes().to_vec();
        mint.extend_from_slice(&VarInt::from(record.len()).to_bytes());
        mint.extend_from_slice(record_prefix);

        let mut receiver = VAULT_OUTPUT_SATOSHIS.to_le_bytes().to_vec();
        receiver.extend_from_slice(&VarInt::from(25usize).to_bytes());
        receiver.extend_from_slice(&[OP_DUP, OP_HASH160, 0x14]);

        let mut vault = VAULT_OUTPUT_SATOSHIS.to_le_bytes().to_vec();
        vault.extend_from_slice(&VarInt::from(23usize).to_bytes());
        vault.extend_from_slice(&[OP_HASH160, 0x14]);

        Ok(OutputTemplates { mint, receiver, vault })
    }
}

fn redeem_script(
    params: &VaultParams,
    templates: &OutputTemplates,
    script_code_prefix: u64,
) -> Result<Script, TokenError> {
    let pk = params.authorized_key.to_compressed();
    let mut s = Script::new();

    s.append_opcodes(&[OP_DUP])?
        .append_push_data(&pk)?
        .append_opcodes(&[OP_CHECKSIGVERIFY])?;

    s.append_opcodes(&[OP_8, OP_PICK, OP_TOALTSTACK])?;

    s.append_opcodes(&[OP_5, OP_PICK])?
        .append_number(script_code_prefix)?
        .append_opcodes(&[OP_SPLIT, OP_NIP, OP_HASH160, OP_TOALTSTACK])?;

    s.append_opcodes(&[OP_SIZE, OP_1SUB, OP_SPLIT, OP_DROP, OP_TOALTSTACK])?;

    for _ in 0..9 {
        s.append_opcodes(&[OP_SWAP, OP_CAT])?;
    }

    s.append_opcodes(&[OP_DUP, OP_SIZE, OP_4, OP_SUB, OP_SPLIT, OP_NIP])?
        .append_push_data(&SIGHASH_ALL_FORKID.to_le_bytes())?
        .append_opcodes(&[OP_EQUALVERIFY])?;

    s.append_opcodes(&[OP_SHA256, OP_FROMALTSTACK, OP_SWAP])?
        .append_push_data(&pk)?
        .append_opcodes(&[OP_CHECKDATASIGVERIFY])?;

    s.append_opcodes(&[OP_SIZE, OP_8, OP_EQUALVERIFY])?
        .append_push_data(&templates.mint)?
        .append_opcodes(&[OP_SWAP, OP_CAT])?;

    s.append_opcodes(&[OP_SWAP, OP_SIZE])?
        .append_number(20)?
        .append_opcodes(&[OP_EQUALVERIFY])?
        .append_push_data(&templates.receiver)?
        .append_opcodes(&[OP_SWAP, OP_CAT])?
        .append_push_data(&[OP_EQUALVERIFY, OP_CHECKSIG])?
        .append_opcodes(&[OP_CAT, OP_CAT])?;

    s.append_push_data(&templates.vault)?
        .append_opcodes(&[OP_FROMALTSTACK, OP_CAT])?
        .append_push_data(&[OP_EQUAL])?
        .append_opcodes(&[OP_CAT, OP_CAT])?;

    s.append_opcodes(&[OP_SWAP, OP_CAT, OP_HASH256, OP_FROMALTSTACK, OP_EQUAL])?;

    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_id::TokenId;
    use slp_primitives::ec::PrivateKey;

    const TOKEN: &str = "959a6818cba5af8aba391d3f7649f5f6a5ceb6cdcd2c2a3dcb5d2fbfc4b08e98";

    fn params() -> VaultParams {
        let key = PrivateKey::from_hex(
            "0000000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        VaultParams::new(key.pub_key(), TokenId::from_hex(TOKEN).unwrap())
    }

    #[test]
    fn test_output_templates() {
        let t = OutputTemplates::new(&params()).unwrap();
        assert_eq!(
            hex::encode(&t.mint),
            format!("0000000000000000396a04534c50000101044d494e5420{}010208", TOKEN)
        );
        assert_eq!(hex::encode(&t.receiver), "22020000000000001976a914");
        assert_eq!(hex::encode(&t.vault), "220200000000000017a914");
    }

    #[test]
    fn test_redeem_script_shape() {
        let vault = VaultCompilerV0.compile(&params()).unwrap();
        let script = vault.redeem_script();
        assert_eq!(script.len(), 231);

        let asm = script.to_asm();
        let pk = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
        assert!(asm.starts_with(&format!("OP_DUP {} OP_CHECKSIGVERIFY OP_8 OP_PICK", pk)));
        assert!(asm.contains("OP_5 OP_PICK OP_1 OP_SPLIT OP_NIP OP_HASH160"));
        assert!(asm.contains(&format!("41000000 OP_EQUALVERIFY OP_SHA256 OP_FROMALTSTACK OP_SWAP {} OP_CHECKDATASIGVERIFY", pk)));
        assert!(asm.ends_with("OP_SWAP OP_CAT OP_HASH256 OP_FROMALTSTACK OP_EQUAL"));
        assert_eq!(asm.matches("OP_SWAP OP_CAT").count(), 9 + 3);
    }
}
