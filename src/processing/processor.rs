use actix_web::http::header::{HeaderMap, HeaderValue};
use bytes::Bytes;
use std::sync::Arc;

use crate::constants::{DEFAULT_RESPONSE_MIME, HEADER_CONTENT_LENGTH, HEADER_CONTENT_TYPE};
use crate::core::{InterceptedResponse, ResourceInfo, ServerResponse, WebResponse, WebViewHost};
use crate::monitoring::SiteKeyStats;
use crate::processing::csp::CspRewriter;
use crate::processing::html::{has_body_end, inject_before_body_end, script_tag};
use crate::utils::header_str;

/// Turns a side-channel response into the response handed to the view,
/// injecting the element hiding script into HTML documents.
#[derive(Debug, Default)]
pub struct ServerResponseProcessor {
    csp: CspRewriter,
    stats: Option<Arc<SiteKeyStats>>,
}

impl ServerResponseProcessor {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_stats(mut self, stats: Arc<SiteKeyStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    #[inline]
    pub fn csp(&self) -> &CspRewriter {
        &self.csp
    }

    pub fn process(&self, host: &dyn WebViewHost, url: &str, response: ServerResponse) -> WebResponse {
        let ServerResponse {
            status,
            headers: mut response_headers,
            body,
            ..
        } = response;

        let mut info = ResourceInfo::parse(header_str(&response_headers, HEADER_CONTENT_TYPE));
        if info.mime_type.is_some() {
            log::debug!("Removing {} to avoid Content-Type duplication", HEADER_CONTENT_TYPE);
            response_headers.remove(HEADER_CONTENT_TYPE);
        } else if let Some(length) = response_headers.get(HEADER_CONTENT_LENGTH) {
            let parsed = length
                .to_str()
                .ok()
                .and_then(|value| value.trim().parse::<u64>().ok());
            if parsed.is_none() {
                log::debug!("Setting mime type to {} for {}", DEFAULT_RESPONSE_MIME, url);
                info.set_mime_type(DEFAULT_RESPONSE_MIME);
            }
        }
        info.trim();
        log::debug!(
            "Using mime type and encoding: {:?} => {:?} (url == {})",
            info.mime_type,
            info.encoding,
            url
        );

        let mut body = body.unwrap_or_default();
        if host.js_in_frames_enabled() && info.may_be_html() {
            body = self.inject_javascript(host, url, body, &mut response_headers);
        }

        WebResponse::Response(InterceptedResponse {
            mime_type: info.mime_type,
            encoding: info.encoding,
            status,
            reason_phrase: InterceptedResponse::reason_phrase_for(status),
            headers: response_headers,
            body,
        })
    }

    /// Adds the element hiding script before `</body>` when the host has
    /// something to hide, relaxing the policy header if needed.
    pub fn inject_javascript(
        &self,
        host: &dyn WebViewHost,
        url: &str,
        body: Bytes,
        response_headers: &mut HeaderMap,
    ) -> Bytes {
        if !has_body_end(&body) || !host.generate_stylesheet_for_url(url) {
            log::debug!("Skipping script injection for `{}`", url);
            return body;
        }

        let nonce = self.csp.update_csp_header(response_headers);
        let tag = script_tag(&host.inject_js(), nonce.as_deref());
        let injected = match inject_before_body_end(&body, &tag) {
            Some(injected) => Bytes::from(injected),
            None => return body,
        };
        if nonce.is_some() {
            if let Some(stats) = &self.stats {
                stats.increment_nonces_injected();
            }
        }

        if response_headers.contains_key(HEADER_CONTENT_LENGTH) {
            response_headers.insert(
                actix_web::http::header::CONTENT_LENGTH,
                HeaderValue::from(injected.len()),
            );
        }
        log::debug!("Injected element hiding script for `{}`", url);
        injected
    }
}
