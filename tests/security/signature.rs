use adblock_sitekey::{PublicKey, RsaSha1SignatureVerifier, SignatureVerifier, SiteKeyError};
use std::sync::Arc;

use crate::common::{other_signing_key, public_key, public_key_der, sign, signing_key};

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &[u8] = b"/index.html\0example.com\0Mozilla/5.0";

    #[test]
    fn test_valid_signature_verifies() {
        let verifier = RsaSha1SignatureVerifier::new();
        let signature = sign(signing_key(), DATA);

        assert!(verifier.verify(&public_key(signing_key()), DATA, &signature));
    }

    #[test]
    fn test_signature_of_other_data_fails() {
        let verifier = RsaSha1SignatureVerifier::new();
        let signature = sign(signing_key(), b"/other\0example.com\0Mozilla/5.0");

        assert!(!verifier.verify(&public_key(signing_key()), DATA, &signature));
    }

    #[test]
    fn test_signature_with_other_key_fails() {
        let verifier = RsaSha1SignatureVerifier::new();
        let signature = sign(other_signing_key(), DATA);

        assert!(!verifier.verify(&public_key(signing_key()), DATA, &signature));
        assert!(matches!(
            verifier.try_verify(&public_key(signing_key()), DATA, &signature),
            Err(SiteKeyError::VerificationError(_))
        ));
    }

    #[test]
    fn test_malformed_signature_fails_quietly() {
        let verifier = RsaSha1SignatureVerifier::new();
        let key = public_key(signing_key());

        assert!(!verifier.verify(&key, DATA, &[]));
        assert!(!verifier.verify(&key, DATA, &[0u8; 7]));
        assert!(!verifier.verify(&key, DATA, &[0xff; 256]));
    }

    #[test]
    fn test_tampered_signature_fails() {
        let verifier = RsaSha1SignatureVerifier::new();
        let mut signature = sign(signing_key(), DATA);
        signature[10] ^= 0x01;

        assert!(!verifier.verify(&public_key(signing_key()), DATA, &signature));
    }

    #[test]
    fn test_public_key_from_der() {
        let key = PublicKey::from_der(&public_key_der(signing_key())).unwrap();
        assert_eq!(key.bits(), 1024);

        assert!(matches!(
            PublicKey::from_der(b"\x30\x03\x02\x01\x01"),
            Err(SiteKeyError::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn test_verifier_behind_arc() {
        let verifier: Arc<dyn SignatureVerifier> = Arc::new(RsaSha1SignatureVerifier::new());
        let shared = Arc::new(verifier.clone());
        let signature = sign(signing_key(), DATA);

        assert!(shared.verify(&public_key(signing_key()), DATA, &signature));
    }
}
