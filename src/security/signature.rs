use ring::digest;
use rsa::{pkcs8::DecodePublicKey, traits::PublicKeyParts, Pkcs1v15Sign, RsaPublicKey};
use sha1::Sha1;
use std::fmt;
use std::sync::Arc;

use crate::error::SiteKeyError;

/// Decoded RSA public key, cheap to clone.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    inner: Arc<RsaPublicKey>,
}

impl PublicKey {
    /// Parses an X.509 `SubjectPublicKeyInfo` DER blob.
    pub fn from_der(der: &[u8]) -> Result<Self, SiteKeyError> {
        let key = RsaPublicKey::from_public_key_der(der)
            .map_err(|e| SiteKeyError::InvalidPublicKey(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(key),
        })
    }

    #[inline]
    pub fn bits(&self) -> usize {
        self.inner.size() * 8
    }

    #[inline]
    pub(crate) fn rsa(&self) -> &RsaPublicKey {
        &self.inner
    }
}

impl From<RsaPublicKey> for PublicKey {
    fn from(key: RsaPublicKey) -> Self {
        Self {
            inner: Arc::new(key),
        }
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey").field("bits", &self.bits()).finish()
    }
}

pub trait SignatureVerifier: Send + Sync {
    /// Never fails loudly: malformed input is simply not a valid signature.
    fn verify(&self, key: &PublicKey, data: &[u8], signature: &[u8]) -> bool;
}

/// `SHA1withRSA`: the data is hashed with SHA-1 and the signature is checked
/// as a PKCS#1 v1.5 block over the SHA-1 `DigestInfo`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RsaSha1SignatureVerifier;

impl RsaSha1SignatureVerifier {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    pub fn try_verify(&self, key: &PublicKey, data: &[u8], signature: &[u8]) -> Result<(), SiteKeyError> {
        let hashed = digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, data);
        key.rsa()
            .verify(Pkcs1v15Sign::new::<Sha1>(), hashed.as_ref(), signature)
            .map_err(|e| SiteKeyError::VerificationError(e.to_string()))
    }
}

impl SignatureVerifier for RsaSha1SignatureVerifier {
    fn verify(&self, key: &PublicKey, data: &[u8], signature: &[u8]) -> bool {
        match self.try_verify(key, data, signature) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Signature check failed: {}", e);
                false
            }
        }
    }
}

impl<T: SignatureVerifier + ?Sized> SignatureVerifier for Arc<T> {
    #[inline]
    fn verify(&self, key: &PublicKey, data: &[u8], signature: &[u8]) -> bool {
        (**self).verify(key, data, signature)
    }
}
