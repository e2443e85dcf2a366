pub mod config;
pub mod engine;
pub mod frames;
pub mod host;
pub mod http;
pub mod resource;

pub use config::{SiteKeyConfiguration, SiteKeyConfigurationBuilder, SiteKeySettings};
pub use engine::{
    detect_by_extension, detect_content_type, ContentType, ContentTypeMask, FilterEngine, MatchesResult,
};
pub use frames::{FrameChain, FrameTree};
pub use host::WebViewHost;
pub use http::{HttpClient, HttpRequest, InterceptedResponse, ServerResponse, WebRequest, WebResponse};
pub use resource::ResourceInfo;
