pub mod csp;
pub mod html;
pub mod processor;

pub use csp::{CspRewriter, CspUpdate};
pub use html::{find_html_site_key, HtmlSiteKey};
pub use processor::ServerResponseProcessor;
