//! ECDSA signature with DER encoding.

use crate::PrimitivesError;

/// A secp256k1 ECDSA signature.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Signature {
    inner: k256::ecdsa::Signature,
}

impl Signature {
    pub(crate) fn from_k256(inner: k256::ecdsa::Signature) -> Self {
        Signature { inner }
    }

    pub(crate) fn as_k256(&self) -> &k256::ecdsa::Signature {
        &self.inner
    }

    /// Parse a strict DER signature (without a trailing sighash byte).
    pub fn from_der(der: &[u8]) -> Result<Self, PrimitivesError> {
        let inner = k256::ecdsa::Signature::from_der(der)?;
        Ok(Signature { inner })
    }

    /// Serialize in DER form.
    pub fn to_der(&self) -> Vec<u8> {
        self.inner.to_der().as_bytes().to_vec()
    }

    /// `true` if S is in the lower half of the curve order.
    pub fn is_low_s(&self) -> bool {
        self.inner.normalize_s().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ec::PrivateKey;

    #[test]
    fn test_der_roundtrip() {
        let key = PrivateKey::random();
        let sig = key.sign(&[0x11; 32]).unwrap();
        let der = sig.to_der();
        assert_eq!(der[0], 0x30);
        assert!(der.len() <= 72);
        assert_eq!(Signature::from_der(&der).unwrap(), sig);
    }

    #[test]
    fn test_from_der_rejects_garbage() {
        assert!(Signature::from_der(&[0x30, 0x01, 0x00]).is_err());
        // trailing sighash byte is not part of DER
        let key = PrivateKey::random();
        let mut der = key.sign(&[0x22; 32]).unwrap().to_der();
        der.push(0x41);
        assert!(Signature::from_der(&der).is_err());
    }
}
