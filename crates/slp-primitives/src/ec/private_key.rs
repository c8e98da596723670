//! secp256k1 private key.
//!
//! Wraps a k256 signing key and adds WIF (Wallet Import Format) encoding and
//! deterministic (RFC6979) low-S signing of 32-byte digests.

use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::ec::public_key::PublicKey;
use crate::ec::signature::Signature;
use crate::hash::sha256d;
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// Mainnet WIF prefix byte.
pub const MAINNET_WIF_PREFIX: u8 = 0x80;

/// Testnet/regtest WIF prefix byte.
pub const TESTNET_WIF_PREFIX: u8 = 0xef;

/// Compression flag byte appended to WIF for compressed public keys.
const COMPRESS_MAGIC: u8 = 0x01;

/// A secp256k1 private key.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a new random key using the OS random number generator.
    pub fn random() -> Self {
        PrivateKey {
            inner: SigningKey::random(&mut OsRng),
        }
    }

    /// Create a private key from a raw 32-byte scalar.
    ///
    /// # Returns
    /// An error if the scalar is zero or not below the curve order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTES_LEN,
                bytes.len()
            )));
        }
        let inner = SigningKey::from_slice(bytes)
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey { inner })
    }

    /// Create a private key from a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = Zeroizing::new(hex::decode(hex_str)?);
        Self::from_bytes(&bytes)
    }

    /// Decode a Base58Check WIF string (compressed or uncompressed, any network).
    pub fn from_wif(wif: &str) -> Result<Self, PrimitivesError> {
        let decoded = Zeroizing::new(
            bs58::decode(wif)
                .into_vec()
                .map_err(|e| PrimitivesError::InvalidWif(e.to_string()))?,
        );

        // prefix(1) + key(32) [+ compress flag(1)] + checksum(4)
        let payload_len = match decoded.len() {
            38 if decoded[33] == COMPRESS_MAGIC => 34,
            38 => {
                return Err(PrimitivesError::InvalidWif(
                    "invalid compression flag".to_string(),
                ))
            }
            37 => 33,
            n => {
                return Err(PrimitivesError::InvalidWif(format!("invalid length {}", n)));
            }
        };

        let checksum = sha256d(&decoded[..payload_len]);
        if checksum[..4] != decoded[payload_len..] {
            return Err(PrimitivesError::ChecksumMismatch);
        }
        if decoded[0] != MAINNET_WIF_PREFIX && decoded[0] != TESTNET_WIF_PREFIX {
            return Err(PrimitivesError::InvalidWif(format!(
                "unknown network prefix 0x{:02x}",
                decoded[0]
            )));
        }

        Self::from_bytes(&decoded[1..1 + PRIVATE_KEY_BYTES_LEN])
    }

    /// Encode as a compressed-key WIF string with the mainnet prefix.
    pub fn to_wif(&self) -> String {
        self.to_wif_prefix(MAINNET_WIF_PREFIX)
    }

    /// Encode as a compressed-key WIF string with a custom network prefix.
    pub fn to_wif_prefix(&self, prefix: u8) -> String {
        let mut payload = Zeroizing::new(Vec::with_capacity(1 + PRIVATE_KEY_BYTES_LEN + 1 + 4));
        payload.push(prefix);
        payload.extend_from_slice(&self.to_bytes()[..]);
        payload.push(COMPRESS_MAGIC);
        let checksum = sha256d(&payload);
        payload.extend_from_slice(&checksum[..4]);
        bs58::encode(payload.as_slice()).into_string()
    }

    /// Serialize the scalar as 32 big-endian bytes.
    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.inner.to_bytes().into())
    }

    /// Derive the corresponding public key.
    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_verifying_key(*self.inner.verifying_key())
    }

    /// Sign a 32-byte digest with an RFC6979 nonce.
    ///
    /// The resulting signature is normalized to low-S.
    pub fn sign(&self, digest: &[u8; 32]) -> Result<Signature, PrimitivesError> {
        let sig: k256::ecdsa::Signature = self.inner.sign_prehash(digest)?;
        Ok(Signature::from_k256(sig.normalize_s().unwrap_or(sig)))
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        *self.to_bytes() == *other.to_bytes()
    }
}

impl Eq for PrivateKey {}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrivateKey({})", self.pub_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";

    #[test]
    fn test_wif_known_vector() {
        let key = PrivateKey::from_hex(KEY_ONE).unwrap();
        assert_eq!(
            key.to_wif(),
            "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn"
        );
        let back = PrivateKey::from_wif(&key.to_wif()).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_testnet_wif_roundtrip() {
        let key = PrivateKey::random();
        let wif = key.to_wif_prefix(TESTNET_WIF_PREFIX);
        assert_eq!(PrivateKey::from_wif(&wif).unwrap(), key);
    }

    #[test]
    fn test_wif_bad_checksum() {
        let key = PrivateKey::from_hex(KEY_ONE).unwrap();
        let mut raw = bs58::decode(key.to_wif()).into_vec().unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = bs58::encode(raw).into_string();
        assert!(matches!(
            PrivateKey::from_wif(&tampered),
            Err(PrimitivesError::ChecksumMismatch)
        ));
    }

    #[test]
    fn test_rejects_zero_and_short_keys() {
        assert!(PrivateKey::from_bytes(&[0u8; 32]).is_err());
        assert!(PrivateKey::from_bytes(&[1u8; 31]).is_err());
    }

    #[test]
    fn test_sign_is_deterministic_and_verifies() {
        let key = PrivateKey::from_hex(KEY_ONE).unwrap();
        let digest = sha256d(b"mint vault");
        let a = key.sign(&digest).unwrap();
        let b = key.sign(&digest).unwrap();
        assert_eq!(a, b);
        assert!(key.pub_key().verify(&digest, &a));
        assert!(a.is_low_s());
    }
}
