/// Elliptic curve cryptography on secp256k1.
///
/// Private keys (with WIF import/export), compressed public keys and
/// DER-encoded ECDSA signatures over pre-hashed messages.

pub mod private_key;
pub mod public_key;
pub mod signature;

pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::Signature;
