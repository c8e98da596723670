//! Hash function primitives.
//!
//! SHA-256, double SHA-256 (transaction ids, sighash digests, `OP_HASH256`),
//! RIPEMD-160 and Hash160 (addresses, `OP_HASH160`, P2SH script hashes).

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Compute SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Compute double SHA-256: `SHA-256(SHA-256(data))`.
///
/// Used for transaction ids and the BIP-143 sighash digest.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute RIPEMD-160 of `data`.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(data).into()
}

/// Compute Hash160: `RIPEMD-160(SHA-256(data))`.
///
/// Public key hashes and P2SH script hashes are both Hash160 digests.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}
