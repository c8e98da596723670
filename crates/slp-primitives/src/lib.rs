/// SLP SDK - Cryptographic primitives and wire helpers.
///
/// This crate provides the foundational building blocks shared by the
/// script, transaction and token crates:
/// - Hash functions (SHA-256, SHA-256d, RIPEMD-160, Hash160)
/// - Chain hash type for transaction identification
/// - secp256k1 private/public keys and DER signatures
/// - Variable-length integers and little-endian readers/writers

pub mod hash;
pub mod chainhash;
pub mod util;
pub mod ec;

mod error;
pub use error::PrimitivesError;
