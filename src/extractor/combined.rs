use std::sync::Arc;

use crate::core::{SiteKeyConfiguration, WebRequest, WebResponse, WebViewHost};
use crate::extractor::{HttpHeaderSiteKeyExtractor, PageSiteKeyExtractor, SiteKeyExtractor};

/// Main frames get their key from the page itself, everything else falls back
/// to the response headers of a side-channel fetch.
#[derive(Default)]
pub struct CombinedSiteKeyExtractor {
    http: HttpHeaderSiteKeyExtractor,
    page: PageSiteKeyExtractor,
}

impl CombinedSiteKeyExtractor {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn http(&self) -> &HttpHeaderSiteKeyExtractor {
        &self.http
    }

    #[inline]
    pub fn page(&self) -> &PageSiteKeyExtractor {
        &self.page
    }
}

impl SiteKeyExtractor for CombinedSiteKeyExtractor {
    fn obtain_and_check_site_key(&self, host: &dyn WebViewHost, request: &WebRequest) -> WebResponse {
        if request.is_main_frame {
            self.page.obtain_and_check_site_key(host, request)
        } else {
            log::debug!("Falling back to header site key requests for {}", request.url);
            self.http.obtain_and_check_site_key(host, request)
        }
    }

    fn set_site_keys_configuration(&self, configuration: Option<Arc<SiteKeyConfiguration>>) {
        self.http.set_site_keys_configuration(configuration.clone());
        self.page.set_site_keys_configuration(configuration);
    }

    fn set_enabled(&self, enabled: bool) {
        self.http.set_enabled(enabled);
        self.page.set_enabled(enabled);
    }

    #[inline]
    fn is_enabled(&self) -> bool {
        self.http.is_enabled() || self.page.is_enabled()
    }

    fn start_new_page(&self, url: &str) {
        self.http.start_new_page(url);
        self.page.start_new_page(url);
    }

    fn wait_for_sitekey_check(&self, url: &str, parent_frames: &[String], is_main_frame: bool) -> bool {
        self.page.wait_for_sitekey_check(url, parent_frames, is_main_frame)
    }
}
