use std::sync::Arc;

use crate::core::{SiteKeyConfiguration, WebRequest, WebResponse, WebViewHost};
use crate::extractor::{ExtractorState, SiteKeyExtractor};
use crate::gate::{HoldGate, HoldState};
use crate::processing::{find_html_site_key, HtmlSiteKey};
use crate::utils::url_without_fragment;

/// Takes the site key from the `data-adblockkey` attribute of the page's
/// root element and holds the page's sub-resources until it is checked.
#[derive(Default)]
pub struct PageSiteKeyExtractor {
    state: ExtractorState,
    gate: HoldGate,
}

impl PageSiteKeyExtractor {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn gate(&self) -> &HoldGate {
        &self.gate
    }

    /// The page reported a site key for `url`.
    pub fn on_site_key_extracted(&self, key: &str, url: &str, user_agent: Option<&str>) {
        if !self.state.is_enabled() {
            return;
        }
        log::debug!("Received sitekey for url: {}", url);

        let outcome = if key.trim().is_empty() {
            HoldState::Absent
        } else {
            match self.state.configuration() {
                Some(configuration) => {
                    let check = configuration
                        .site_key_verifier()
                        .check(url_without_fragment(url), user_agent, key);
                    if check.is_verified() {
                        HoldState::Verified
                    } else {
                        HoldState::Failed
                    }
                }
                None => {
                    log::error!("No site key configuration, cannot verify key of {}", url);
                    HoldState::Failed
                }
            }
        };
        self.gate.release(url, outcome);
    }

    /// The document is ready and carries no site key.
    pub fn on_site_key_does_not_exist(&self, url: &str) {
        if !self.state.is_enabled() {
            return;
        }
        log::debug!("Key does not exist on url {}", url);
        self.gate.release(url, HoldState::Absent);
    }

    /// The root element is not available yet; loads stay held.
    pub fn on_dom_not_ready(&self, url: &str) {
        if !self.state.is_enabled() {
            return;
        }
        log::debug!("DOM not yet ready on url {}", url);
    }

    /// Looks for the attribute in `html` and reports what was found.
    pub fn process_document(&self, url: &str, user_agent: Option<&str>, html: &str) -> HtmlSiteKey {
        let found = find_html_site_key(html);
        match &found {
            HtmlSiteKey::Found(key) => self.on_site_key_extracted(key, url, user_agent),
            HtmlSiteKey::Missing => self.on_site_key_does_not_exist(url),
            HtmlSiteKey::Incomplete => self.on_dom_not_ready(url),
        }
        found
    }
}

impl SiteKeyExtractor for PageSiteKeyExtractor {
    /// The view loads the document itself; this only makes sure its
    /// sub-resources will be held.
    fn obtain_and_check_site_key(&self, _host: &dyn WebViewHost, request: &WebRequest) -> WebResponse {
        if self.state.is_enabled() && request.is_main_frame {
            let tracked = self
                .gate
                .current()
                .map_or(false, |check| check.is_for(&request.url));
            if !tracked {
                self.gate.start_page(&request.url);
            }
        }
        WebResponse::AllowLoad
    }

    fn set_site_keys_configuration(&self, configuration: Option<Arc<SiteKeyConfiguration>>) {
        if let Some(configuration) = &configuration {
            self.gate.set_timeout(configuration.hold_timeout());
            self.gate.set_stats(configuration.stats().clone());
        }
        self.state.set_configuration(configuration);
    }

    fn set_enabled(&self, enabled: bool) {
        let was_enabled = self.state.set_enabled(enabled);
        if was_enabled && !enabled {
            log::debug!("Disabling page site key extractor");
            self.gate.cancel();
        }
    }

    #[inline]
    fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }

    fn start_new_page(&self, url: &str) {
        if self.state.is_enabled() {
            self.gate.start_page(url);
        } else {
            self.gate.cancel();
        }
    }

    fn wait_for_sitekey_check(&self, url: &str, parent_frames: &[String], is_main_frame: bool) -> bool {
        if !self.state.is_enabled() {
            return false;
        }
        self.gate.hold(url, parent_frames, is_main_frame).is_some()
    }
}
