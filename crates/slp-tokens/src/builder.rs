//! GENESIS and MINT transaction builders.
//!
//! Builders take owned configuration, never mutate caller data and return a
//! complete unsigned [`Transaction`] whose inputs carry their source
//! outputs. Sign P2PKH inputs with
//! [`sign_p2pkh_inputs`](crate::signer::sign_p2pkh_inputs) and vault inputs
//! with [`build_unlock`](crate::covenant::build_unlock).

use num_bigint::BigUint;
use tracing::{debug, warn};

use slp_script::Address;
use slp_transaction::template::p2pkh::UNLOCKING_SCRIPT_LEN;
use slp_transaction::{Transaction, TransactionOutput};

use crate::amount::{check_decimals, quantity_to_u64};
use crate::error::TokenError;
use crate::metadata::{encode_genesis, encode_mint, GenesisRecord};
use crate::token_id::TokenId;
use crate::types::{FeeConfig, SpendableUtxo, TokenRole};

/// Output receiving the mint authority in transactions built here.
pub const AUTHORITY_VOUT: u8 = 2;

/// Parameters for [`build_genesis`].
#[derive(Debug, Clone)]
pub struct GenesisConfig {
    /// Ticker symbol.
    pub ticker: String,
    /// Token name.
    pub name: String,
    /// Document URL, possibly empty.
    pub document_url: String,
    /// Optional SHA-256 of the document.
    pub document_hash: Option<[u8; 32]>,
    /// Decimal places, 0..=9.
    pub decimals: u8,
    /// Initial supply in base units.
    pub initial_quantity: BigUint,
    /// Receives the initial supply at output 1.
    pub token_receiver: Address,
    /// Receives the mint authority at output 2. `None` fixes the supply.
    pub authority_receiver: Option<Address>,
    /// Receives the change.
    pub change_address: Address,
    /// Plain outputs funding the transaction.
    pub inputs: Vec<SpendableUtxo>,
    /// Fee and dust policy.
    pub fee: FeeConfig,
}

/// Parameters for [`build_mint`].
///
/// Token outputs carry `fee.dust_limit` satoshis. A vault authority only
/// accepts the default 546.
#[derive(Debug, Clone)]
pub struct MintConfig {
    /// Token to mint.
    pub token_id: TokenId,
    /// Quantity to mint, in base units.
    pub additional_quantity: BigUint,
    /// Inputs: exactly one authority of `token_id` plus funding.
    pub inputs: Vec<SpendableUtxo>,
    /// Receives the minted quantity at output 1.
    pub balance_receiver: Address,
    /// Receives the reissued authority at output 2. `None` ends it.
    pub authority_receiver: Option<Address>,
    /// Receives the change.
    pub change_address: Address,
    /// Satoshis added to the estimated fee, e.g. for a covenant scriptSig.
    pub extra_fee: u64,
    /// Keep inputs in the given order instead of moving the authority first.
    pub preserve_input_order: bool,
    /// Fee and dust policy.
    pub fee: FeeConfig,
}

impl MintConfig {
    /// A mint with no extra fee, the authority input moved first and the
    /// default fee policy.
    pub fn new(
        token_id: TokenId,
        additional_quantity: BigUint,
        inputs: Vec<SpendableUtxo>,
        balance_receiver: Address,
        authority_receiver: Option<Address>,
        change_address: Address,
    ) -> Self {
        MintConfig {
            token_id,
            additional_quantity,
            inputs,
            balance_receiver,
            authority_receiver,
            change_address,
            extra_fee: 0,
            preserve_input_order: false,
            fee: FeeConfig::default(),
        }
    }
}

/// Build a GENESIS transaction.
///
/// Outputs: `[metadata, token receiver, authority receiver?, change?]`.
pub fn build_genesis(config: &GenesisConfig) -> Result<Transaction, TokenError> {
    check_decimals(config.decimals)?;
    let initial_quantity = quantity_to_u64(&config.initial_quantity)?;

    if let Some(token) = config.inputs.iter().find_map(SpendableUtxo::token) {
        return Err(TokenError::InvalidInput(format!(
            "genesis inputs must be plain, {}:{} carries token {}",
            token.output.txid, token.output.vout, token.token_id
        )));
    }

    let record = GenesisRecord {
        ticker: config.ticker.clone(),
        name: config.name.clone(),
        document_url: config.document_url.clone(),
        document_hash: config.document_hash,
        decimals: config.decimals,
        mint_baton_vout: config.authority_receiver.map(|_| AUTHORITY_VOUT),
        initial_quantity,
    };

    let mut tx = Transaction::new();
    for utxo in &config.inputs {
        tx.add_input(utxo.output().to_input());
    }
    tx.add_output(TransactionOutput::new(0, encode_genesis(&record)?));
    tx.add_output(TransactionOutput::new(
        config.fee.dust_limit,
        config.token_receiver.locking_script(),
    ));
    if let Some(authority) = &config.authority_receiver {
        tx.add_output(TransactionOutput::new(config.fee.dust_limit, authority.locking_script()));
    }

    let (tx, fee) = add_change(tx, &config.change_address, &config.fee, 0)?;
    debug!(
        ticker = %config.ticker,
        quantity = initial_quantity,
        inputs = tx.inputs.len(),
        outputs = tx.outputs.len(),
        fee,
        "built genesis transaction"
    );
    Ok(tx)
}

/// Build a MINT transaction.
///
/// Outputs: `[metadata, balance receiver, authority receiver?, change?]`.
/// Balance inputs are accepted and their tokens burned.
pub fn build_mint(config: &MintConfig) -> Result<Transaction, TokenError> {
    let quantity = quantity_to_u64(&config.additional_quantity)?;

    let mut authority_index = None;
    let mut found = 0usize;
    for (i, utxo) in config.inputs.iter().enumerate() {
        let Some(token) = utxo.token() else {
            continue;
        };
        match token.role {
            TokenRole::Authority if token.token_id == config.token_id => {
                found += 1;
                authority_index = Some(i);
            }
            TokenRole::Authority => {
                return Err(TokenError::InvalidInput(format!(
                    "{}:{} is the mint authority of another token {}",
                    token.output.txid, token.output.vout, token.token_id
                )));
            }
            TokenRole::Balance => {
                warn!(
                    token_id = %token.token_id,
                    quantity = token.quantity,
                    txid = %token.output.txid,
                    vout = token.output.vout,
                    "mint input burns a token balance"
                );
            }
        }
    }
    let authority_index = match (found, authority_index) {
        (1, Some(i)) => i,
        _ => {
            return Err(TokenError::MissingAuthority { token_id: config.token_id, found });
        }
    };

    let mut ordered: Vec<&SpendableUtxo> = config.inputs.iter().collect();
    if !config.preserve_input_order {
        let authority = ordered.remove(authority_index);
        ordered.insert(0, authority);
    }

    let baton_vout = config.authority_receiver.map(|_| AUTHORITY_VOUT);
    let mut tx = Transaction::new();
    for utxo in ordered {
        tx.add_input(utxo.output().to_input());
    }
    tx.add_output(TransactionOutput::new(
        0,
        encode_mint(&config.token_id, baton_vout, quantity)?,
    ));
    tx.add_output(TransactionOutput::new(
        config.fee.dust_limit,
        config.balance_receiver.locking_script(),
    ));
    if let Some(authority) = &config.authority_receiver {
        tx.add_output(TransactionOutput::new(config.fee.dust_limit, authority.locking_script()));
    }

    let (tx, fee) = add_change(tx, &config.change_address, &config.fee, config.extra_fee)?;
    debug!(
        token_id = %config.token_id,
        quantity,
        inputs = tx.inputs.len(),
        outputs = tx.outputs.len(),
        fee,
        "built mint transaction"
    );
    Ok(tx)
}

/// Estimated signed size: unsigned inputs count as P2PKH spends.
pub fn estimate_size(tx: &Transaction) -> usize {
    let unsigned = tx.inputs.iter().filter(|i| i.unlocking_script.is_none()).count();
    tx.size() + unsigned * UNLOCKING_SCRIPT_LEN
}

/// Append change when it reaches the dust limit, otherwise fold it into the
/// fee. Returns the transaction and the fee it pays.
fn add_change(
    mut tx: Transaction,
    change_address: &Address,
    fee: &FeeConfig,
    extra_fee: u64,
) -> Result<(Transaction, u64), TokenError> {
    let available = tx.total_input_satoshis()?;
    let spent = tx.total_output_satoshis();

    let fee_without_change = fee.fee_for_size(estimate_size(&tx)).saturating_add(extra_fee);
    let needed = spent.saturating_add(fee_without_change);
    if available < needed {
        return Err(TokenError::InsufficientFunds { needed, available });
    }

    tx.add_output(TransactionOutput::new(0, change_address.locking_script()));
    let fee_with_change = fee.fee_for_size(estimate_size(&tx)).saturating_add(extra_fee);
    let change = available.saturating_sub(spent.saturating_add(fee_with_change));

    if change > 0 && change >= fee.dust_limit {
        if let Some(output) = tx.outputs.last_mut() {
            output.satoshis = change;
        }
        Ok((tx, fee_with_change))
    } else {
        tx.outputs.pop();
        Ok((tx, available - spent))
    }
}
