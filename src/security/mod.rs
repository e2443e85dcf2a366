pub mod encoding;
pub mod keys;
pub mod nonce;
pub mod signature;
pub mod sitekey;

pub use encoding::Base64Processor;
pub use keys::PublicKeyHolder;
pub use nonce::NonceGenerator;
pub use signature::{PublicKey, RsaSha1SignatureVerifier, SignatureVerifier};
pub use sitekey::{SiteKeyCheck, SiteKeyVerifier};
