//! SLP token type 1 metadata records.
//!
//! A token transaction carries its record in output 0:
//!
//! ```text
//! OP_RETURN <"SLP\0"> <0x01> <"GENESIS"> <ticker> <name> <url> <hash> <decimals> <baton vout> <qty>
//! OP_RETURN <"SLP\0"> <0x01> <"MINT">    <token id> <baton vout> <qty>
//! OP_RETURN <"SLP\0"> <0x01> <"SEND">    <token id> <qty 1> .. <qty n>
//! ```
//!
//! Quantities are 8-byte big-endian. Empty fields are pushed as
//! `OP_PUSHDATA1 0x00`.

use slp_primitives::chainhash::Hash;
use slp_script::opcodes::{OP_0, OP_PUSHDATA1, OP_PUSHDATA4, OP_RETURN};
use slp_script::Script;

use crate::amount::check_decimals;
use crate::error::TokenError;
use crate::token_id::TokenId;

/// Lokad id prefixing every SLP payload.
pub const LOKAD_ID: &[u8; 4] = b"SLP\0";

/// Token type 1 (fungible).
pub const TOKEN_TYPE_FUNGIBLE: u8 = 0x01;

/// Maximum decimals of a token type 1 genesis.
pub const MAX_DECIMALS: u8 = 9;

/// Maximum number of quantities a SEND can carry.
pub const MAX_SEND_OUTPUTS: usize = 19;

/// Transaction kind carried in the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Token creation.
    Genesis,
    /// Additional issuance by the mint authority holder.
    Mint,
    /// Transfer.
    Send,
}

impl TokenKind {
    /// ASCII tag pushed after the token type.
    pub fn tag(self) -> &'static [u8] {
        match self {
            TokenKind::Genesis => b"GENESIS",
            TokenKind::Mint => b"MINT",
            TokenKind::Send => b"SEND",
        }
    }
}

/// A decoded GENESIS record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenesisRecord {
    /// Ticker symbol.
    pub ticker: String,
    /// Token name.
    pub name: String,
    /// Document URL.
    pub document_url: String,
    /// Optional SHA-256 of the document.
    pub document_hash: Option<[u8; 32]>,
    /// Number of decimal places, 0..=9.
    pub decimals: u8,
    /// Output holding the mint authority, if any.
    pub mint_baton_vout: Option<u8>,
    /// Quantity created at output 1, in base units.
    pub initial_quantity: u64,
}

/// A decoded MINT record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintRecord {
    /// Token being minted.
    pub token_id: TokenId,
    /// Output receiving the reissued authority. `None` ends it.
    pub mint_baton_vout: Option<u8>,
    /// Quantity created at output 1, in base units.
    pub quantity: u64,
}

/// A decoded SEND record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRecord {
    /// Token being transferred.
    pub token_id: TokenId,
    /// Quantity for outputs 1..=n.
    pub quantities: Vec<u64>,
}

/// A decoded SLP payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenRecord {
    /// GENESIS record.
    Genesis(GenesisRecord),
    /// MINT record.
    Mint(MintRecord),
    /// SEND record.
    Send(SendRecord),
}

impl TokenRecord {
    /// The record's kind.
    pub fn kind(&self) -> TokenKind {
        match self {
            TokenRecord::Genesis(_) => TokenKind::Genesis,
            TokenRecord::Mint(_) => TokenKind::Mint,
            TokenRecord::Send(_) => TokenKind::Send,
        }
    }

    /// Token id of this record when carried by transaction `txid`.
    ///
    /// A GENESIS creates the token, so its id is the transaction's own id.
    pub fn token_id(&self, txid: &Hash) -> TokenId {
        match self {
            TokenRecord::Genesis(_) => TokenId::from_txid(*txid),
            TokenRecord::Mint(m) => m.token_id,
            TokenRecord::Send(s) => s.token_id,
        }
    }

    /// Output holding the mint authority.
    pub fn authority_vout(&self) -> Option<u32> {
        match self {
            TokenRecord::Genesis(g) => g.mint_baton_vout.map(u32::from),
            TokenRecord::Mint(m) => m.mint_baton_vout.map(u32::from),
            TokenRecord::Send(_) => None,
        }
    }

    /// Token quantity assigned to output `vout`.
    pub fn quantity_at(&self, vout: u32) -> Option<u64> {
        match self {
            TokenRecord::Genesis(g) if vout == 1 => Some(g.initial_quantity),
            TokenRecord::Mint(m) if vout == 1 => Some(m.quantity),
            TokenRecord::Send(s) if vout >= 1 => s.quantities.get(vout as usize - 1).copied(),
            _ => None,
        }
    }

    /// Encode as an OP_RETURN locking script.
    pub fn to_script(&self) -> Result<Script, TokenError> {
        match self {
            TokenRecord::Genesis(g) => encode_genesis(g),
            TokenRecord::Mint(m) => encode_mint(&m.token_id, m.mint_baton_vout, m.quantity),
            TokenRecord::Send(s) => encode_send(&s.token_id, &s.quantities),
        }
    }

    /// Decode an OP_RETURN locking script.
    ///
    /// Any deviation from the type 1 layout is `MalformedMetadata`.
    pub fn from_script(script: &Script) -> Result<Self, TokenError> {
        let chunks = script
            .chunks()
            .map_err(|e| malformed(format!("unparseable script: {}", e)))?;
        let mut chunks = chunks.into_iter();
        match chunks.next() {
            Some(c) if c.op == OP_RETURN => {}
            _ => return Err(malformed("output does not start with OP_RETURN")),
        }
        let mut fields = Vec::new();
        for chunk in chunks {
            if chunk.op == OP_0 || chunk.op > OP_PUSHDATA4 {
                return Err(malformed(format!("opcode 0x{:02x} is not a data push", chunk.op)));
            }
            fields.push(chunk.data.unwrap_or_default());
        }

        if fields.len() < 3 {
            return Err(malformed("missing lokad id, token type or kind"));
        }
        if fields[0] != LOKAD_ID {
            return Err(malformed("wrong lokad id"));
        }
        match fields[1].as_slice() {
            [TOKEN_TYPE_FUNGIBLE] | [0x00, TOKEN_TYPE_FUNGIBLE] => {}
            other => {
                return Err(malformed(format!("unsupported token type {}", hex::encode(other))))
            }
        }

        let body = &fields[3..];
        match fields[2].as_slice() {
            b"GENESIS" => decode_genesis(body),
            b"MINT" => decode_mint(body),
            b"SEND" => decode_send(body),
            other => Err(malformed(format!(
                "unknown transaction kind {}",
                String::from_utf8_lossy(other)
            ))),
        }
    }
}

/// `true` when `script` opens with `OP_RETURN <"SLP\0">`.
///
/// Such an output claims to be an SLP payload even if the rest fails to
/// decode; anything else is not a token output at all.
pub fn carries_lokad(script: &Script) -> bool {
    let bytes = script.to_bytes();
    let direct = [OP_RETURN, 0x04];
    let pushdata1 = [OP_RETURN, OP_PUSHDATA1, 0x04];
    (bytes.starts_with(&direct) && bytes[direct.len()..].starts_with(LOKAD_ID))
        || (bytes.starts_with(&pushdata1) && bytes[pushdata1.len()..].starts_with(LOKAD_ID))
}

/// Encode a GENESIS record.
pub fn encode_genesis(record: &GenesisRecord) -> Result<Script, TokenError> {
    check_decimals(record.decimals)?;
    check_baton_vout(record.mint_baton_vout)?;
    let mut script = header(TokenKind::Genesis)?;
    push_field(&mut script, record.ticker.as_bytes())?;
    push_field(&mut script, record.name.as_bytes())?;
    push_field(&mut script, record.document_url.as_bytes())?;
    push_field(&mut script, record.document_hash.as_ref().map_or(&[][..], |h| &h[..]))?;
    push_field(&mut script, &[record.decimals])?;
    push_baton(&mut script, record.mint_baton_vout)?;
    push_field(&mut script, &record.initial_quantity.to_be_bytes())?;
    Ok(script)
}

/// Encode a MINT record.
pub fn encode_mint(
    token_id: &TokenId,
    mint_baton_vout: Option<u8>,
    quantity: u64,
) -> Result<Script, TokenError> {
    check_baton_vout(mint_baton_vout)?;
    let mut script = header(TokenKind::Mint)?;
    push_field(&mut script, &token_id.to_display_bytes())?;
    push_baton(&mut script, mint_baton_vout)?;
    push_field(&mut script, &quantity.to_be_bytes())?;
    Ok(script)
}

/// Encode a SEND record.
pub fn encode_send(token_id: &TokenId, quantities: &[u64]) -> Result<Script, TokenError> {
    if quantities.is_empty() || quantities.len() > MAX_SEND_OUTPUTS {
        return Err(TokenError::InvalidInput(format!(
            "SEND needs 1 to {} quantities, got {}",
            MAX_SEND_OUTPUTS,
            quantities.len()
        )));
    }
    let mut script = header(TokenKind::Send)?;
    push_field(&mut script, &token_id.to_display_bytes())?;
    for quantity in quantities {
        push_field(&mut script, &quantity.to_be_bytes())?;
    }
    Ok(script)
}

fn header(kind: TokenKind) -> Result<Script, TokenError> {
    let mut script = Script::new();
    script.append_opcodes(&[OP_RETURN])?;
    push_field(&mut script, LOKAD_ID)?;
    push_field(&mut script, &[TOKEN_TYPE_FUNGIBLE])?;
    push_field(&mut script, kind.tag())?;
    Ok(script)
}

fn push_field(script: &mut Script, data: &[u8]) -> Result<(), TokenError> {
    if data.is_empty() {
        script.append_pushdata1(data)?;
    } else {
        script.append_push_data(data)?;
    }
    Ok(())
}

fn push_baton(script: &mut Script, vout: Option<u8>) -> Result<(), TokenError> {
    match vout {
        Some(v) => push_field(script, &[v]),
        None => push_field(script, &[]),
    }
}

fn check_baton_vout(vout: Option<u8>) -> Result<(), TokenError> {
    match vout {
        Some(v) if v < 2 => Err(TokenError::InvalidInput(format!(
            "mint authority vout must be at least 2, got {}",
            v
        ))),
        _ => Ok(()),
    }
}

fn malformed(msg: impl Into<String>) -> TokenError {
    TokenError::MalformedMetadata(msg.into())
}

fn decode_genesis(body: &[Vec<u8>]) -> Result<TokenRecord, TokenError> {
    let [ticker, name, url, hash, decimals, baton, quantity] = body else {
        return Err(malformed(format!("GENESIS expects 7 fields, got {}", body.len())));
    };
    let document_hash = match hash.len() {
        0 => None,
        32 => {
            let mut h = [0u8; 32];
            h.copy_from_slice(hash);
            Some(h)
        }
        n => return Err(malformed(format!("document hash must be 0 or 32 bytes, got {}", n))),
    };
    let decimals = match decimals.as_slice() {
        [d] if *d <= MAX_DECIMALS => *d,
        [d] => return Err(malformed(format!("decimals {} exceeds {}", d, MAX_DECIMALS))),
        _ => return Err(malformed("decimals must be 1 byte")),
    };
    Ok(TokenRecord::Genesis(GenesisRecord {
        ticker: String::from_utf8_lossy(ticker).into_owned(),
        name: String::from_utf8_lossy(name).into_owned(),
        document_url: String::from_utf8_lossy(url).into_owned(),
        document_hash,
        decimals,
        mint_baton_vout: decode_baton(baton)?,
        initial_quantity: decode_quantity(quantity)?,
    }))
}

fn decode_mint(body: &[Vec<u8>]) -> Result<TokenRecord, TokenError> {
    let [token_id, baton, quantity] = body else {
        return Err(malformed(format!("MINT expects 3 fields, got {}", body.len())));
    };
    Ok(TokenRecord::Mint(MintRecord {
        token_id: decode_token_id(token_id)?,
        mint_baton_vout: decode_baton(baton)?,
        quantity: decode_quantity(quantity)?,
    }))
}

fn decode_send(body: &[Vec<u8>]) -> Result<TokenRecord, TokenError> {
    let Some((token_id, quantities)) = body.split_first() else {
        return Err(malformed("SEND is missing its token id"));
    };
    if quantities.is_empty() || quantities.len() > MAX_SEND_OUTPUTS {
        return Err(malformed(format!(
            "SEND carries {} quantities, expected 1 to {}",
            quantities.len(),
            MAX_SEND_OUTPUTS
        )));
    }
    Ok(TokenRecord::Send(SendRecord {
        token_id: decode_token_id(token_id)?,
        quantities: quantities
            .iter()
            .map(|q| decode_quantity(q))
            .collect::<Result<_, _>>()?,
    }))
}

fn decode_token_id(bytes: &[u8]) -> Result<TokenId, TokenError> {
    if bytes.len() != 32 {
        return Err(malformed(format!("token id must be 32 bytes, got {}", bytes.len())));
    }
    TokenId::from_display_bytes(bytes)
}

fn decode_baton(bytes: &[u8]) -> Result<Option<u8>, TokenError> {
    match bytes {
        [] => Ok(None),
        [v] if *v >= 2 => Ok(Some(*v)),
        [v] => Err(malformed(format!("mint authority vout {} is below 2", v))),
        _ => Err(malformed("mint authority vout must be 0 or 1 byte")),
    }
}

fn decode_quantity(bytes: &[u8]) -> Result<u64, TokenError> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| malformed(format!("quantity must be 8 bytes, got {}", bytes.len())))?;
    Ok(u64::from_be_bytes(arr))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "959a6818cba5af8aba391d3f7649f5f6a5ceb6cdcd2c2a3dcb5d2fbfc4b08e98";

    fn token() -> TokenId {
        TokenId::from_hex(TOKEN).unwrap()
    }

    fn genesis() -> GenesisRecord {
        GenesisRecord {
            ticker: "VLT".into(),
            name: "Vault Test".into(),
            document_url: String::new(),
            document_hash: None,
            decimals: 1,
            mint_baton_vout: Some(2),
            initial_quantity: 1000,
        }
    }

    #[test]
    fn test_genesis_wire_layout() {
        let script = encode_genesis(&genesis()).unwrap();
        assert_eq!(
            script.to_hex(),
            concat!(
                "6a", "04534c5000", "0101", "0747454e45534953",
                "03564c54", "0a5661756c742054657374", "4c00", "4c00",
                "0101", "0102", "0800000000000003e8"
            )
        );
        assert_eq!(
            TokenRecord::from_script(&script).unwrap(),
            TokenRecord::Genesis(genesis())
        );
    }

    #[test]
    fn test_mint_wire_layout() {
        let script = encode_mint(&token(), Some(2), 1).unwrap();
        assert_eq!(
            script.to_hex(),
            format!("6a04534c50000101044d494e5420{}0102080000000000000001", TOKEN)
        );
        let record = TokenRecord::from_script(&script).unwrap();
        assert_eq!(record.kind(), TokenKind::Mint);
        assert_eq!(record.authority_vout(), Some(2));
        assert_eq!(record.quantity_at(1), Some(1));
        assert_eq!(record.quantity_at(2), None);
    }

    #[test]
    fn test_mint_ending_authority() {
        let script = encode_mint(&token(), None, 5).unwrap();
        let record = TokenRecord::from_script(&script).unwrap();
        assert_eq!(record.authority_vout(), None);
    }

    #[test]
    fn test_send_quantities_by_vout() {
        let script = encode_send(&token(), &[10, 20, 30]).unwrap();
        let record = TokenRecord::from_script(&script).unwrap();
        assert_eq!(record.token_id(&Hash::default()), token());
        assert_eq!(record.quantity_at(0), None);
        assert_eq!(record.quantity_at(1), Some(10));
        assert_eq!(record.quantity_at(3), Some(30));
        assert_eq!(record.quantity_at(4), None);
        assert_eq!(record.authority_vout(), None);
    }

    #[test]
    fn test_genesis_token_id_is_txid() {
        let txid = Hash::new([9u8; 32]);
        let record = TokenRecord::Genesis(genesis());
        assert_eq!(record.token_id(&txid).txid(), txid);
    }

    #[test]
    fn test_encode_rejects_bad_records() {
        let mut g = genesis();
        g.decimals = 10;
        assert!(matches!(encode_genesis(&g), Err(TokenError::PrecisionOverflow(_))));
        assert!(encode_mint(&token(), Some(1), 1).is_err());
        assert!(encode_send(&token(), &[]).is_err());
        assert!(encode_send(&token(), &[1; 20]).is_err());
        assert!(encode_send(&token(), &[1; 19]).is_ok());
    }

    fn decode_hex(h: &str) -> Result<TokenRecord, TokenError> {
        TokenRecord::from_script(&Script::from_hex(h).unwrap())
    }

    #[test]
    fn test_decode_rejections() {
        let mint_tail = format!("20{}0102080000000000000001", TOKEN);
        let cases = [
            // wrong lokad
            format!("6a04534c5001010104{}{}", hex::encode("MINT"), mint_tail),
            // token type 0x41
            format!("6a04534c5000014104{}{}", hex::encode("MINT"), mint_tail),
            // unknown kind
            format!("6a04534c5000010104{}{}", hex::encode("BURN"), mint_tail),
            // baton vout 1
            format!("6a04534c50000101044d494e5420{}0101080000000000000001", TOKEN),
            // short quantity
            format!("6a04534c50000101044d494e5420{}01020700000000000001", TOKEN),
            // trailing field
            format!("6a04534c50000101044d494e5420{}01020800000000000000010100", TOKEN),
            // non-push opcode
            format!("6a04534c50000101044d494e5420{}010208000000000000000151", TOKEN),
            // OP_0 instead of empty push
            format!("6a04534c50000101044d494e5420{}00080000000000000001", TOKEN),
            // short token id
            "6a04534c50000101044d494e541f00000000000000000000000000000000000000000000000000000000000000010208000000000000000001".to_string(),
        ];
        for case in cases {
            assert!(
                matches!(decode_hex(&case), Err(TokenError::MalformedMetadata(_))),
                "accepted {}",
                case
            );
        }
    }

    #[test]
    fn test_decode_genesis_field_checks() {
        let mut g = genesis();
        g.decimals = 9;
        let good = encode_genesis(&g).unwrap().to_hex();
        // decimals 10 patched in place
        let bad = good.replace("0109010208", "010a010208");
        assert_ne!(good, bad);
        assert!(decode_hex(&good).is_ok());
        assert!(matches!(decode_hex(&bad), Err(TokenError::MalformedMetadata(_))));
    }

    #[test]
    fn test_send_count_limits_on_decode() {
        let mut hex_script = format!("6a04534c500001010453454e4420{}", TOKEN);
        assert!(decode_hex(&hex_script).is_err());
        for _ in 0..19 {
            hex_script.push_str("080000000000000001");
        }
        assert!(decode_hex(&hex_script).is_ok());
        hex_script.push_str("080000000000000001");
        assert!(decode_hex(&hex_script).is_err());
    }

    #[test]
    fn test_carries_lokad() {
        assert!(carries_lokad(&encode_send(&token(), &[1]).unwrap()));
        assert!(carries_lokad(&Script::from_hex("6a04534c5000ff").unwrap()));
        assert!(carries_lokad(&Script::from_hex("6a4c04534c5000").unwrap()));
        assert!(!carries_lokad(&Script::from_hex("6a0461626364").unwrap()));
        assert!(!carries_lokad(&Script::new_p2pkh(&[0u8; 20])));
        assert!(!carries_lokad(&Script::new()));
    }

    #[test]
    fn test_long_fields_use_pushdata1() {
        let mut g = genesis();
        g.document_url = "x".repeat(100);
        g.document_hash = Some([0xab; 32]);
        let script = encode_genesis(&g).unwrap();
        assert!(script.to_hex().contains("4c64"));
        assert_eq!(
            TokenRecord::from_script(&script).unwrap(),
            TokenRecord::Genesis(g)
        );
    }
}
