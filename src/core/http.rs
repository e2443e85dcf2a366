use actix_web::http::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method, StatusCode,
};
use bytes::Bytes;

use crate::error::SiteKeyError;

/// Side-channel request issued on behalf of the view.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub follow_redirect: bool,
}

impl HttpRequest {
    pub fn new(url: impl Into<String>, method: Method, headers: HeaderMap) -> Self {
        Self {
            url: url.into(),
            method,
            headers,
            follow_redirect: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServerResponse {
    pub status: u16,
    pub final_url: Option<String>,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl ServerResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_final_url(mut self, url: impl Into<String>) -> Self {
        self.final_url = Some(url.into());
        self
    }
}

/// Blocking HTTP transport used for side-channel fetches.
pub trait HttpClient: Send + Sync {
    fn request(&self, request: &HttpRequest) -> Result<ServerResponse, SiteKeyError>;
}

/// A resource load as seen by the interception hook.
#[derive(Debug, Clone)]
pub struct WebRequest {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub is_main_frame: bool,
}

impl WebRequest {
    pub fn new(url: impl Into<String>, method: Method) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HeaderMap::new(),
            is_main_frame: false,
        }
    }

    #[inline]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url, Method::GET)
    }

    pub fn main_frame(mut self) -> Self {
        self.is_main_frame = true;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            self.headers.insert(name, value);
        }
        self
    }
}

/// Response body and metadata handed back to the view in place of its own load.
#[derive(Debug, Clone)]
pub struct InterceptedResponse {
    pub mime_type: Option<String>,
    pub encoding: Option<String>,
    pub status: u16,
    pub reason_phrase: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl InterceptedResponse {
    pub fn reason_phrase_for(status: u16) -> String {
        StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("OK")
            .to_owned()
    }
}

#[derive(Debug, Clone)]
pub enum WebResponse {
    /// Let the view load the resource itself.
    AllowLoad,
    /// Replace the resource with an empty response.
    BlockLoad,
    Response(InterceptedResponse),
}

impl WebResponse {
    #[inline]
    pub fn is_allow_load(&self) -> bool {
        matches!(self, Self::AllowLoad)
    }

    #[inline]
    pub fn is_block_load(&self) -> bool {
        matches!(self, Self::BlockLoad)
    }

    #[inline]
    pub fn response(&self) -> Option<&InterceptedResponse> {
        match self {
            Self::Response(response) => Some(response),
            _ => None,
        }
    }
}
