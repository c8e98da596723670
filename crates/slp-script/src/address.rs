/// Address handling.
///
/// CashAddr (`bitcoincash:`/`simpleledger:` and their test/regtest
/// prefixes) is the primary format; legacy Base58Check is accepted on input
/// and can be produced on request. Both P2PKH and P2SH payloads are
/// supported.

use std::fmt;
use std::str::FromStr;

use slp_primitives::ec::PublicKey;
use slp_primitives::hash::{hash160, sha256d};

use crate::{Script, ScriptError};

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

const GENERATORS: [u64; 5] = [
    0x98f2bc8e61,
    0x79b76d99e2,
    0xf33e5fb3c4,
    0xae2eabe2a8,
    0x1e4f43e470,
];

/// Network an address belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Network {
    /// `bitcoincash:` / `simpleledger:`.
    Mainnet,
    /// `bchtest:` / `slptest:`.
    Testnet,
    /// `bchreg:` / `slpreg:`.
    Regtest,
}

impl Network {
    /// CashAddr prefix for plain value addresses.
    pub fn cash_prefix(self) -> &'static str {
        match self {
            Network::Mainnet => "bitcoincash",
            Network::Testnet => "bchtest",
            Network::Regtest => "bchreg",
        }
    }

    /// CashAddr prefix for token-aware (SLP) addresses.
    pub fn slp_prefix(self) -> &'static str {
        match self {
            Network::Mainnet => "simpleledger",
            Network::Testnet => "slptest",
            Network::Regtest => "slpreg",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "bitcoincash" | "simpleledger" => Some(Network::Mainnet),
            "bchtest" | "slptest" => Some(Network::Testnet),
            "bchreg" | "slpreg" => Some(Network::Regtest),
            _ => None,
        }
    }

    fn legacy_version(self, kind: AddressKind) -> u8 {
        match (self, kind) {
            (Network::Mainnet, AddressKind::P2PKH) => 0x00,
            (Network::Mainnet, AddressKind::P2SH) => 0x05,
            (_, AddressKind::P2PKH) => 0x6f,
            (_, AddressKind::P2SH) => 0xc4,
        }
    }
}

/// Payload type of an address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressKind {
    /// Pay to public key hash.
    P2PKH,
    /// Pay to script hash.
    P2SH,
}

impl AddressKind {
    fn version_byte(self) -> u8 {
        // type bits << 3, size bits 0 (160-bit hash)
        match self {
            AddressKind::P2PKH => 0x00,
            AddressKind::P2SH => 0x08,
        }
    }
}

/// A P2PKH or P2SH address on a given network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    kind: AddressKind,
    hash: [u8; 20],
    network: Network,
}

impl Address {
    /// Address paying to a public key hash.
    pub fn from_public_key_hash(hash: &[u8; 20], network: Network) -> Self {
        Address { kind: AddressKind::P2PKH, hash: *hash, network }
    }

    /// Address paying to a script hash.
    pub fn from_script_hash(hash: &[u8; 20], network: Network) -> Self {
        Address { kind: AddressKind::P2SH, hash: *hash, network }
    }

    /// P2PKH address of a public key.
    pub fn from_public_key(pub_key: &PublicKey, network: Network) -> Self {
        Self::from_public_key_hash(&pub_key.hash160(), network)
    }

    /// P2SH address of a redeem script.
    pub fn from_redeem_script(redeem_script: &Script, network: Network) -> Self {
        Self::from_script_hash(&hash160(redeem_script.to_bytes()), network)
    }

    /// Derive the address paid by a P2PKH or P2SH locking script.
    pub fn from_locking_script(script: &Script, network: Network) -> Option<Self> {
        if let Some(pkh) = script.public_key_hash() {
            return Some(Self::from_public_key_hash(&pkh, network));
        }
        script.script_hash().map(|sh| Self::from_script_hash(&sh, network))
    }

    /// Parse a CashAddr (any supported prefix, prefix optional) or legacy address.
    ///
    /// Without a prefix, the mainnet `bitcoincash` and `simpleledger`
    /// checksums are both tried.
    pub fn from_string(addr: &str) -> Result<Self, ScriptError> {
        if let Some((prefix, payload)) = addr.split_once(':') {
            let lower = prefix.to_ascii_lowercase();
            let network = Network::from_prefix(&lower)
                .ok_or_else(|| ScriptError::UnsupportedAddress(addr.to_string()))?;
            return decode_cash(&lower, payload, network);
        }

        for prefix in ["bitcoincash", "simpleledger"] {
            if let Ok(a) = decode_cash(prefix, addr, Network::Mainnet) {
                return Ok(a);
            }
        }
        decode_legacy(addr)
    }

    /// CashAddr string with the `bitcoincash`-family prefix.
    pub fn to_cash_string(&self) -> String {
        self.encode_cash(self.network.cash_prefix())
    }

    /// CashAddr string with the `simpleledger`-family prefix.
    pub fn to_slp_string(&self) -> String {
        self.encode_cash(self.network.slp_prefix())
    }

    /// Legacy Base58Check string.
    pub fn to_legacy_string(&self) -> String {
        let mut payload = Vec::with_capacity(25);
        payload.push(self.network.legacy_version(self.kind));
        payload.extend_from_slice(&self.hash);
        let checksum = sha256d(&payload);
        payload.extend_from_slice(&checksum[..4]);
        bs58::encode(payload).into_string()
    }

    /// The locking script paying this address.
    pub fn locking_script(&self) -> Script {
        match self.kind {
            AddressKind::P2PKH => Script::new_p2pkh(&self.hash),
            AddressKind::P2SH => Script::new_p2sh(&self.hash),
        }
    }

    /// The 20-byte hash payload.
    pub fn hash(&self) -> &[u8; 20] {
        &self.hash
    }

    /// The payload type.
    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    /// The network.
    pub fn network(&self) -> Network {
        self.network
    }

    fn encode_cash(&self, prefix: &str) -> String {
        let mut payload = Vec::with_capacity(21);
        payload.push(self.kind.version_byte());
        payload.extend_from_slice(&self.hash);
        let data = convert_bits(&payload, 8, 5, true).unwrap_or_default();

        let checksum = polymod(&checksum_input(prefix, &data));
        let mut out = String::with_capacity(prefix.len() + 1 + data.len() + 8);
        out.push_str(prefix);
        out.push(':');
        for d in &data {
            out.push(CHARSET[*d as usize] as char);
        }
        for i in 0..8 {
            let d = (checksum >> (5 * (7 - i))) & 0x1f;
            out.push(CHARSET[d as usize] as char);
        }
        out
    }
}

fn polymod(values: &[u8]) -> u64 {
    let mut c: u64 = 1;
    for &d in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x07_ffff_ffff) << 5) ^ d as u64;
        for (i, g) in GENERATORS.iter().enumerate() {
            if c0 & (1 << i) != 0 {
                c ^= g;
            }
        }
    }
    c ^ 1
}

fn checksum_input(prefix: &str, data: &[u8]) -> Vec<u8> {
    let mut v: Vec<u8> = prefix.bytes().map(|b| b & 0x1f).collect();
    v.push(0);
    v.extend_from_slice(data);
    v.extend_from_slice(&[0u8; 8]);
    v
}

fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let max_v: u32 = (1 << to) - 1;
    let mut out = Vec::new();
    for &value in data {
        let v = value as u32;
        if v >> from != 0 {
            return None;
        }
        acc = (acc << from) | v;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & max_v) as u8);
        }
    }
    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & max_v) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & max_v) != 0 {
        return None;
    }
    Some(out)
}

fn decode_cash(prefix: &str, payload: &str, network: Network) -> Result<Address, ScriptError> {
    let invalid = || ScriptError::InvalidAddress(format!("{}:{}", prefix, payload));

    let has_lower = payload.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = payload.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(invalid());
    }

    let mut data = Vec::with_capacity(payload.len());
    for b in payload.to_ascii_lowercase().bytes() {
        let pos = CHARSET.iter().position(|&c| c == b).ok_or_else(invalid)?;
        data.push(pos as u8);
    }
    if data.len() < 8 {
        return Err(invalid());
    }

    let mut check = prefix.bytes().map(|b| b & 0x1f).collect::<Vec<u8>>();
    check.push(0);
    check.extend_from_slice(&data);
    if polymod(&check) != 0 {
        return Err(ScriptError::ChecksumFailed);
    }

    let body = &data[..data.len() - 8];
    let bytes = convert_bits(body, 5, 8, false).ok_or_else(invalid)?;
    if bytes.len() != 21 {
        return Err(ScriptError::UnsupportedAddress(format!(
            "{}:{} (hash size)",
            prefix, payload
        )));
    }
    let kind = match bytes[0] {
        0x00 => AddressKind::P2PKH,
        0x08 => AddressKind::P2SH,
        v => {
            return Err(ScriptError::UnsupportedAddress(format!(
                "version byte 0x{:02x}",
                v
            )))
        }
    };
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&bytes[1..]);
    Ok(Address { kind, hash, network })
}

fn decode_legacy(addr: &str) -> Result<Address, ScriptError> {
    let decoded = bs58::decode(addr)
        .into_vec()
        .map_err(|_| ScriptError::InvalidAddress(addr.to_string()))?;
    if decoded.len() != 25 {
        return Err(ScriptError::InvalidAddress(addr.to_string()));
    }
    let checksum = sha256d(&decoded[..21]);
    if decoded[21..] != checksum[..4] {
        return Err(ScriptError::ChecksumFailed);
    }
    let (kind, network) = match decoded[0] {
        0x00 => (AddressKind::P2PKH, Network::Mainnet),
        0x05 => (AddressKind::P2SH, Network::Mainnet),
        0x6f => (AddressKind::P2PKH, Network::Testnet),
        0xc4 => (AddressKind::P2SH, Network::Testnet),
        _ => return Err(ScriptError::UnsupportedAddress(addr.to_string())),
    };
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&decoded[1..21]);
    Ok(Address { kind, hash, network })
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_cash_string())
    }
}

impl FromStr for Address {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_string(s)
    }
}

impl serde::Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_cash_string())
    }
}

impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_string(&s).map_err(serde::de::Error::custom)
    }
}
