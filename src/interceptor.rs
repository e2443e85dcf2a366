use arc_swap::{ArcSwap, ArcSwapOption};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

use crate::constants::{HEADER_RANGE, HEADER_REFERER};
use crate::core::{
    detect_content_type, FilterEngine, FrameTree, MatchesResult, SiteKeyConfiguration, WebRequest, WebResponse,
    WebViewHost,
};
use crate::extractor::{CombinedSiteKeyExtractor, SiteKeyExtractor};
use crate::monitoring::SiteKeyStats;
use crate::security::PublicKeyHolder;
use crate::utils::{domain_of, header_str, normalize_url, origin_root, url_without_fragment};

/// Outcome of the filter decision for a single load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockDecision {
    NotEnabled,
    AllowLoad,
    BlockLoad,
}

/// Request interception for a web view: filter decisions, site key
/// extraction and the page hold, tied together.
pub struct AdblockInterceptor {
    engine: Arc<dyn FilterEngine>,
    host: Arc<dyn WebViewHost>,
    configuration: ArcSwapOption<SiteKeyConfiguration>,
    extractor: RwLock<Arc<dyn SiteKeyExtractor>>,
    frames: FrameTree,
    page: ArcSwapOption<String>,
    stats: ArcSwap<SiteKeyStats>,
}

impl AdblockInterceptor {
    pub fn new(engine: Arc<dyn FilterEngine>, host: Arc<dyn WebViewHost>) -> Self {
        let extractor: Arc<dyn SiteKeyExtractor> = Arc::new(CombinedSiteKeyExtractor::new());
        extractor.set_enabled(false);
        Self {
            engine,
            host,
            configuration: ArcSwapOption::empty(),
            extractor: RwLock::new(extractor),
            frames: FrameTree::new(),
            page: ArcSwapOption::empty(),
            stats: ArcSwap::from_pointee(SiteKeyStats::new()),
        }
    }

    pub fn set_site_keys_configuration(&self, configuration: Option<Arc<SiteKeyConfiguration>>) {
        if let Some(configuration) = &configuration {
            self.stats.store(configuration.stats().clone());
        }
        self.configuration.store(configuration.clone());
        self.site_key_extractor().set_site_keys_configuration(configuration);
        self.refresh_extractor_enabled();
    }

    #[inline]
    pub fn site_keys_configuration(&self) -> Option<Arc<SiteKeyConfiguration>> {
        self.configuration.load_full()
    }

    /// Replaces the extraction strategy. The new extractor receives the
    /// current configuration.
    pub fn set_site_key_extractor(&self, extractor: Arc<dyn SiteKeyExtractor>) {
        extractor.set_site_keys_configuration(self.site_keys_configuration());
        let previous = std::mem::replace(&mut *self.extractor.write(), extractor);
        previous.set_enabled(false);
        self.refresh_extractor_enabled();
    }

    #[inline]
    pub fn site_key_extractor(&self) -> Arc<dyn SiteKeyExtractor> {
        self.extractor.read().clone()
    }

    /// Extraction runs while Acceptable Ads is on, or when forced.
    pub fn refresh_extractor_enabled(&self) -> bool {
        let enabled = match self.site_keys_configuration() {
            Some(configuration) => self.engine.is_acceptable_ads_enabled() || configuration.force_checks(),
            None => false,
        };
        self.site_key_extractor().set_enabled(enabled);
        enabled
    }

    /// The main frame navigated to `url`.
    pub fn on_page_started(&self, url: &str) {
        log::debug!("Page started: {}", url);
        self.frames.clear();
        self.page.store(Some(Arc::new(normalize_url(url))));
        self.refresh_extractor_enabled();
        self.site_key_extractor().start_new_page(url_without_fragment(url));
    }

    /// Filter decision for `request`. Sub-resource loads may block here
    /// while the site key of their page is being checked.
    pub fn should_abp_block_request(&self, request: &WebRequest) -> BlockDecision {
        if !self.engine.is_enabled() {
            return BlockDecision::NotEnabled;
        }
        let stats = self.stats.load();
        stats.increment_requests_intercepted();

        let url = url_without_fragment(&request.url);
        let frame_key = normalize_url(url);
        if let Some(referrer) = header_str(&request.headers, HEADER_REFERER) {
            self.frames.record(&frame_key, &self.resolve_referrer(referrer));
        }

        if request.is_main_frame {
            log::debug!("Main frame request {}, allowing", url);
            return BlockDecision::AllowLoad;
        }

        let parent_frames = self.frames.parents_of(&frame_key);
        let extractor = self.site_key_extractor();
        if extractor.wait_for_sitekey_check(url, &parent_frames, false) {
            log::debug!("Site key check over for {}", url);
        }
        let site_key = self.site_key_for(&parent_frames);

        if self.engine.is_domain_allowlisted(url, &parent_frames) {
            log::debug!("Domain of {} is allowlisted", url);
            stats.increment_requests_allowlisted();
            return BlockDecision::AllowLoad;
        }
        if self.engine.is_document_allowlisted(url, &parent_frames, &site_key) {
            log::debug!("Document of {} is allowlisted", url);
            stats.increment_requests_allowlisted();
            return BlockDecision::AllowLoad;
        }

        let content_type = detect_content_type(url, &request.headers);
        let specific_only = match parent_frames.split_first() {
            Some((parent, ancestors)) => self.engine.is_genericblock_allowlisted(parent, ancestors, &site_key),
            None => false,
        };

        match self
            .engine
            .matches(url, content_type.mask(), &parent_frames, &site_key, specific_only)
        {
            MatchesResult::Blocked => {
                log::debug!("Blocked loading {} ({})", url, content_type);
                stats.increment_requests_blocked();
                BlockDecision::BlockLoad
            }
            MatchesResult::Allowed => {
                stats.increment_requests_allowlisted();
                BlockDecision::AllowLoad
            }
            MatchesResult::NotFound | MatchesResult::NotEnabled => BlockDecision::AllowLoad,
        }
    }

    /// Full interception: filter first, then site key extraction for loads
    /// that are allowed.
    pub fn should_intercept_request(&self, request: &WebRequest) -> WebResponse {
        match self.should_abp_block_request(request) {
            BlockDecision::NotEnabled => WebResponse::AllowLoad,
            BlockDecision::BlockLoad => WebResponse::BlockLoad,
            BlockDecision::AllowLoad => {
                if request.headers.contains_key(HEADER_RANGE) {
                    log::debug!("Skipping site key check for range request {}", request.url);
                    return WebResponse::AllowLoad;
                }
                self.site_key_extractor()
                    .obtain_and_check_site_key(self.host.as_ref(), request)
            }
        }
    }

    /// Element hiding selectors for the document at `url`.
    pub fn element_hiding_selectors(&self, url: &str) -> Vec<String> {
        if !self.engine.is_enabled() {
            return Vec::new();
        }
        let url = url_without_fragment(url);
        let Some(domain) = domain_of(url) else {
            log::warn!("Cannot get domain of {}", url);
            return Vec::new();
        };
        let frames = self.frames.chain_with(&normalize_url(url));
        let site_key = self.site_key_for(&frames);
        self.engine.element_hiding_selectors(url, &domain, &frames, &site_key)
    }

    #[inline]
    pub fn frames(&self) -> &FrameTree {
        &self.frames
    }

    #[inline]
    pub fn stats(&self) -> Arc<SiteKeyStats> {
        self.stats.load_full()
    }

    /// Normalized referrer, with an origin-only Referer of the current page
    /// taken as the page itself.
    fn resolve_referrer(&self, referrer: &str) -> String {
        let referrer = normalize_url(referrer);
        if let Some(page) = self.page.load().as_deref() {
            if referrer != *page && origin_root(page).as_deref() == Some(referrer.as_str()) {
                log::debug!("Referrer {} is the origin of page {}", referrer, page);
                return page.to_string();
            }
        }
        referrer
    }

    fn site_key_for(&self, frames: &[String]) -> String {
        match self.site_keys_configuration() {
            Some(configuration) => {
                let key = configuration.public_key_holder().get_any(frames, "");
                PublicKeyHolder::strip_padding(&key).to_owned()
            }
            None => String::new(),
        }
    }
}

impl fmt::Debug for AdblockInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdblockInterceptor")
            .field("configured", &self.configuration.load().is_some())
            .field("extractor_enabled", &self.site_key_extractor().is_enabled())
            .field("frames", &self.frames.len())
            .finish()
    }
}
