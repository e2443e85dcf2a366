pub mod constants;
pub mod core;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod interceptor;
pub mod monitoring;
pub mod prelude;
pub mod processing;
pub mod security;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::{
    ContentType, FilterEngine, FrameTree, HttpClient, HttpRequest, MatchesResult, ResourceInfo, ServerResponse,
    SiteKeyConfiguration, SiteKeyConfigurationBuilder, SiteKeySettings, WebRequest, WebResponse, WebViewHost,
};
pub use error::SiteKeyError;
pub use extractor::{CombinedSiteKeyExtractor, HttpHeaderSiteKeyExtractor, PageSiteKeyExtractor, SiteKeyExtractor};
pub use gate::{CheckVerdict, HoldGate, HoldState, PendingSiteKeyCheck};
pub use interceptor::{AdblockInterceptor, BlockDecision};
pub use monitoring::SiteKeyStats;
pub use processing::{CspRewriter, CspUpdate, ServerResponseProcessor};
pub use security::{
    Base64Processor, NonceGenerator, PublicKey, PublicKeyHolder, RsaSha1SignatureVerifier, SignatureVerifier,
    SiteKeyCheck, SiteKeyVerifier,
};
