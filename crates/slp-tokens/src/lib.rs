#![deny(missing_docs)]

//! SLP SDK - Tokens.
//!
//! Client-side issuance and recognition of SLP type 1 tokens whose mint
//! authority lives in a covenant vault:
//! - [`metadata`]: the OP_RETURN record codec
//! - [`validator`]: provenance validation over a transaction's ancestry
//! - [`classifier`]: partitioning of unspent outputs by token role
//! - [`builder`]: GENESIS and MINT transaction builders
//! - [`covenant`]: the mint vault script, its unlock schema and unlock builder
//! - [`signer`] and [`ledger`]: keystore signing and ledger access traits

pub mod amount;
pub mod builder;
pub mod classifier;
pub mod covenant;
pub mod error;
pub mod ledger;
pub mod metadata;
pub mod signer;
pub mod token_id;
pub mod types;
pub mod validator;

pub use amount::{format_base_units, quantity_to_u64, to_base_units};
pub use builder::{build_genesis, build_mint, GenesisConfig, MintConfig};
pub use classifier::{classify, classify_unspent};
pub use covenant::{
    apply_unlocks, build_unlock, CovenantCompiler, MintVault, UnlockDescriptor, UnlockSchema,
    VaultCompilerV0, VaultParams,
};
pub use error::TokenError;
pub use ledger::{Keystore, LedgerService, MemoryKeystore, TxFetcher};
pub use metadata::{encode_genesis, encode_mint, encode_send, TokenKind, TokenRecord};
pub use signer::sign_p2pkh_inputs;
pub use token_id::TokenId;
pub use types::{
    CandidateOutput, ClassifiedUtxos, FeeConfig, SlpUtxo, SpendableUtxo, TokenRole,
};
pub use validator::{InvalidReason, ProvenanceValidator, TokenTx, ValidationCache, Verdict};
