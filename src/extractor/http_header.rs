use actix_web::http::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method,
};
use std::sync::Arc;

use crate::constants::{HEADER_COOKIE, HEADER_SET_COOKIE};
use crate::core::{
    HttpRequest, ServerResponse, SiteKeyConfiguration, WebRequest, WebResponse, WebViewHost,
};
use crate::error::SiteKeyError;
use crate::extractor::{ExtractorState, SiteKeyExtractor};
use crate::processing::ServerResponseProcessor;
use crate::utils::{is_redirect_code, is_valid_code};

/// Fetches the resource on a side channel and verifies the site key found in
/// its response headers. Never holds loads.
#[derive(Default)]
pub struct HttpHeaderSiteKeyExtractor {
    state: ExtractorState,
}

impl HttpHeaderSiteKeyExtractor {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    fn send_request(
        &self,
        host: &dyn WebViewHost,
        configuration: &SiteKeyConfiguration,
        request: &WebRequest,
    ) -> Result<ServerResponse, SiteKeyError> {
        let mut headers = request.headers.clone();
        if let Some(cookies) = host.cookies_for(&request.url).filter(|c| !c.is_empty()) {
            log::debug!("Adding {} request header for url {}", HEADER_COOKIE, request.url);
            let value = HeaderValue::from_str(&cookies)
                .map_err(|e| SiteKeyError::TransportError(format!("bad cookie value: {}", e)))?;
            headers.insert(HeaderName::from_static(HEADER_COOKIE), value);
        }

        let http_request = HttpRequest::new(request.url.clone(), request.method.clone(), headers);
        configuration.http_client().request(&http_request)
    }

    /// Hands `Set-Cookie` values to the host jar and strips them from the
    /// headers passed on to the view.
    fn process_response_cookies(host: &dyn WebViewHost, url: &str, headers: &mut HeaderMap) {
        let cookies: Vec<String> = headers
            .get_all(HEADER_SET_COOKIE)
            .filter_map(|value| value.to_str().ok().map(str::to_owned))
            .collect();
        for cookie in &cookies {
            if host.can_accept_cookie(url, cookie) {
                log::debug!("Calling set_cookie({})", url);
                host.set_cookie(url, cookie);
            } else {
                log::debug!("Rejecting set_cookie({})", url);
            }
        }
        headers.remove(HEADER_SET_COOKIE);
    }
}

impl SiteKeyExtractor for HttpHeaderSiteKeyExtractor {
    fn obtain_and_check_site_key(&self, host: &dyn WebViewHost, request: &WebRequest) -> WebResponse {
        if !self.state.is_enabled() {
            return WebResponse::AllowLoad;
        }

        let configuration = match self.state.configuration() {
            Some(configuration) if request.method == Method::GET => configuration,
            _ => return WebResponse::AllowLoad,
        };

        let mut response = match self.send_request(host, &configuration, request) {
            Ok(response) => response,
            Err(e) => {
                configuration.stats().increment_fetch_failures();
                log::warn!("Side-channel request for {} failed: {}", request.url, e);
                return WebResponse::AllowLoad;
            }
        };

        if !is_valid_code(response.status) || is_redirect_code(response.status) {
            log::warn!(
                "Broken response ({}) for {}, passing control to the view",
                response.status,
                request.url
            );
            return WebResponse::AllowLoad;
        }

        let mut url = request.url.clone();
        Self::process_response_cookies(host, &url, &mut response.headers);

        if let Some(final_url) = response.final_url.take() {
            log::debug!("Updating url to {}, was ({})", final_url, url);
            url = final_url;
        }

        if response.body.is_none() {
            log::warn!("No body for {}, passing control to the view", url);
            return WebResponse::AllowLoad;
        }

        configuration
            .site_key_verifier()
            .verify_in_headers(&url, &request.headers, &response.headers);

        ServerResponseProcessor::new()
            .with_stats(configuration.stats().clone())
            .process(host, &url, response)
    }

    fn set_site_keys_configuration(&self, configuration: Option<Arc<SiteKeyConfiguration>>) {
        self.state.set_configuration(configuration);
    }

    fn set_enabled(&self, enabled: bool) {
        self.state.set_enabled(enabled);
    }

    #[inline]
    fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }

    fn start_new_page(&self, _url: &str) {}

    fn wait_for_sitekey_check(&self, _url: &str, _parent_frames: &[String], _is_main_frame: bool) -> bool {
        false
    }
}
