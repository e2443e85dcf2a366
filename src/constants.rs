use std::time::Duration;

pub(crate) const HEADER_SITEKEY: &str = "x-adblock-key";
pub(crate) const HEADER_CSP: &str = "content-security-policy";
pub(crate) const HEADER_CONTENT_TYPE: &str = "content-type";
pub(crate) const HEADER_CONTENT_LENGTH: &str = "content-length";
pub(crate) const HEADER_SET_COOKIE: &str = "set-cookie";
pub(crate) const HEADER_COOKIE: &str = "cookie";
pub(crate) const HEADER_USER_AGENT: &str = "user-agent";
pub(crate) const HEADER_REFERER: &str = "referer";
pub(crate) const HEADER_RANGE: &str = "range";
pub(crate) const HEADER_ACCEPT: &str = "accept";
pub(crate) const HEADER_REQUESTED_WITH: &str = "x-requested-with";

pub(crate) const XML_HTTP_REQUEST: &str = "XMLHttpRequest";
pub(crate) const MIME_TEXT_HTML: &str = "text/html";

pub(crate) const SCRIPT_SRC: &str = "script-src";
pub(crate) const UNSAFE_INLINE_SOURCE: &str = "'unsafe-inline'";
pub(crate) const NONCE_PREFIX: &str = "nonce-";

/// Directive markers that end the reach of a `script-src` source list when
/// scanning a raw policy value.
pub(crate) const DIRECTIVE_MARKERS: &[&str] = &[
    "-src ",
    "-src-elem ",
    "-src-attr ",
    "navigate-to ",
    "form-action ",
    "base-uri ",
];

pub(crate) const BODY_END_TAG: &str = "</body>";
pub(crate) const HTML_SITEKEY_ATTRIBUTE: &str = "data-adblockkey";

pub(crate) const SITEKEY_SEPARATOR: char = '_';
pub(crate) const PAYLOAD_SEPARATOR: u8 = 0;

pub const DEFAULT_RESPONSE_MIME: &str = "text/plain";

pub(crate) const BINARY_MIME_PREFIXES: &[&str] = &[
    "image",
    "application/octet-stream",
    "video",
    "font",
    "audio",
];

pub const DEFAULT_HOLD_TIMEOUT: Duration = Duration::from_millis(1000);
pub(crate) const DEFAULT_HOLD_TIMEOUT_MS: u64 = 1000;
pub(crate) const DEFAULT_NONCE_LENGTH: usize = 16;
pub(crate) const FRAME_CHAIN_INLINE: usize = 4;
