use actix_web::http::header::HeaderMap;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::OnceLock;
use url::Url;

use crate::constants::{HEADER_ACCEPT, HEADER_REQUESTED_WITH, MIME_TEXT_HTML, XML_HTTP_REQUEST};
use crate::utils::header_str;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ContentType {
    Other = 1,
    Script = 1 << 1,
    Image = 1 << 2,
    Stylesheet = 1 << 3,
    Object = 1 << 4,
    Subdocument = 1 << 5,
    Document = 1 << 6,
    Websocket = 1 << 7,
    Webrtc = 1 << 8,
    Ping = 1 << 9,
    XmlHttpRequest = 1 << 10,
    ObjectSubrequest = 1 << 11,
    Media = 1 << 12,
    Font = 1 << 13,
    Genericblock = 1 << 14,
    Elemhide = 1 << 15,
    Generichide = 1 << 16,
}

impl ContentType {
    #[inline]
    pub const fn mask(self) -> ContentTypeMask {
        ContentTypeMask(self as u32)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Other => "OTHER",
            Self::Script => "SCRIPT",
            Self::Image => "IMAGE",
            Self::Stylesheet => "STYLESHEET",
            Self::Object => "OBJECT",
            Self::Subdocument => "SUBDOCUMENT",
            Self::Document => "DOCUMENT",
            Self::Websocket => "WEBSOCKET",
            Self::Webrtc => "WEBRTC",
            Self::Ping => "PING",
            Self::XmlHttpRequest => "XMLHTTPREQUEST",
            Self::ObjectSubrequest => "OBJECT_SUBREQUEST",
            Self::Media => "MEDIA",
            Self::Font => "FONT",
            Self::Genericblock => "GENERICBLOCK",
            Self::Elemhide => "ELEMHIDE",
            Self::Generichide => "GENERICHIDE",
        }
    }

    /// Resources that occupy space on the page.
    #[inline]
    pub fn is_visible(self) -> bool {
        matches!(self, Self::Image | Self::Media | Self::Object | Self::Subdocument)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ContentTypeMask(pub u32);

impl ContentTypeMask {
    #[inline]
    pub fn contains(self, content_type: ContentType) -> bool {
        self.0 & content_type as u32 != 0
    }

    #[inline]
    pub fn with(self, content_type: ContentType) -> Self {
        Self(self.0 | content_type as u32)
    }
}

impl From<ContentType> for ContentTypeMask {
    fn from(content_type: ContentType) -> Self {
        content_type.mask()
    }
}

const EXTENSIONS_JS: &[&str] = &["js"];
const EXTENSIONS_CSS: &[&str] = &["css"];
const EXTENSIONS_FONT: &[&str] = &["ttf", "woff", "woff2"];
const EXTENSIONS_HTML: &[&str] = &["htm", "html"];
const EXTENSIONS_IMAGE: &[&str] = &[
    "gif", "png", "jpg", "jpe", "jpeg", "bmp", "apng", "cur", "jfif", "ico", "pjpeg", "pjp", "svg",
    "tif", "tiff", "webp",
];
const EXTENSIONS_MEDIA: &[&str] = &[
    "webm", "mkv", "flv", "vob", "ogv", "drc", "mng", "avi", "mov", "gifv", "qt", "wmv", "yuv",
    "rm", "rmvb", "asf", "amv", "mp4", "m4p", "mp2", "mpe", "mpv", "mpg", "mpeg", "m2v", "m4v",
    "svi", "3gp", "3g2", "mxf", "roq", "nsv", "8svx", "aa", "aac", "aax", "act", "aiff", "alac",
    "amr", "ape", "au", "awb", "cda", "dct", "dss", "dvf", "flac", "gsm", "iklax", "ivs", "m4a",
    "m4b", "mmf", "mogg", "mp3", "mpc", "msv", "nmf", "oga", "ogg", "opus", "ra", "raw", "rf64",
    "sln", "tta", "voc", "vox", "wav", "wma", "wv",
];

static EXTENSION_MAP: OnceLock<FxHashMap<&'static str, ContentType>> = OnceLock::new();

fn extension_map() -> &'static FxHashMap<&'static str, ContentType> {
    EXTENSION_MAP.get_or_init(|| {
        let groups: [(&[&'static str], ContentType); 6] = [
            (EXTENSIONS_JS, ContentType::Script),
            (EXTENSIONS_CSS, ContentType::Stylesheet),
            (EXTENSIONS_FONT, ContentType::Font),
            (EXTENSIONS_HTML, ContentType::Subdocument),
            (EXTENSIONS_IMAGE, ContentType::Image),
            (EXTENSIONS_MEDIA, ContentType::Media),
        ];
        let mut map = FxHashMap::default();
        for (extensions, content_type) in groups {
            for &extension in extensions {
                map.insert(extension, content_type);
            }
        }
        map
    })
}

/// Guesses the content type from the file extension of the URL path.
pub fn detect_by_extension(url: &str) -> Option<ContentType> {
    let parsed = Url::parse(url).ok()?;
    let path = parsed.path();
    let extension = &path[path.rfind('.')? + 1..];
    extension_map()
        .get(extension.to_ascii_lowercase().as_str())
        .copied()
}

/// `X-Requested-With`, then the URL extension, then `Accept`.
pub fn detect_content_type(url: &str, headers: &HeaderMap) -> ContentType {
    if header_str(headers, HEADER_REQUESTED_WITH) == Some(XML_HTTP_REQUEST) {
        return ContentType::XmlHttpRequest;
    }
    if let Some(content_type) = detect_by_extension(url) {
        return content_type;
    }
    match header_str(headers, HEADER_ACCEPT) {
        Some(accept) if accept.contains(MIME_TEXT_HTML) => ContentType::Subdocument,
        _ => ContentType::Other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchesResult {
    Blocked,
    Allowed,
    NotFound,
    NotEnabled,
}

/// The filter matching engine. Parent frame lists are ordered root first and
/// `site_key` is empty when no verified key applies.
pub trait FilterEngine: Send + Sync {
    fn is_enabled(&self) -> bool;

    fn is_acceptable_ads_enabled(&self) -> bool {
        false
    }

    fn matches(
        &self,
        url: &str,
        content_types: ContentTypeMask,
        parent_frames: &[String],
        site_key: &str,
        specific_only: bool,
    ) -> MatchesResult;

    fn is_domain_allowlisted(&self, _url: &str, _parent_frames: &[String]) -> bool {
        false
    }

    fn is_document_allowlisted(&self, url: &str, parent_frames: &[String], site_key: &str) -> bool;

    fn is_genericblock_allowlisted(&self, url: &str, parent_frames: &[String], site_key: &str) -> bool;

    fn element_hiding_selectors(
        &self,
        url: &str,
        domain: &str,
        parent_frames: &[String],
        site_key: &str,
    ) -> Vec<String>;
}
