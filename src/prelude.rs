pub use crate::core::{
    FilterEngine, HttpClient, ServerResponse, SiteKeyConfiguration, SiteKeyConfigurationBuilder, WebRequest,
    WebResponse, WebViewHost,
};
pub use crate::error::SiteKeyError;
pub use crate::extractor::{CombinedSiteKeyExtractor, SiteKeyExtractor};
pub use crate::gate::{HoldGate, HoldState};
pub use crate::interceptor::{AdblockInterceptor, BlockDecision};
pub use crate::monitoring::SiteKeyStats;
pub use crate::security::{PublicKeyHolder, RsaSha1SignatureVerifier, SignatureVerifier, SiteKeyVerifier};
