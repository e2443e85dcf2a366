use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::{SiteKeyConfiguration, WebRequest, WebResponse, WebViewHost};

pub mod combined;
pub mod http_header;
pub mod page;

pub use combined::CombinedSiteKeyExtractor;
pub use http_header::HttpHeaderSiteKeyExtractor;
pub use page::PageSiteKeyExtractor;

/// A strategy for obtaining and verifying the site key of a load.
pub trait SiteKeyExtractor: Send + Sync {
    /// Never fails: anything unexpected lets the view load the resource itself.
    fn obtain_and_check_site_key(&self, host: &dyn WebViewHost, request: &WebRequest) -> WebResponse;

    fn set_site_keys_configuration(&self, configuration: Option<Arc<SiteKeyConfiguration>>);

    fn set_enabled(&self, enabled: bool);

    fn is_enabled(&self) -> bool;

    /// Called when the main frame starts loading `url`.
    fn start_new_page(&self, url: &str);

    /// Blocks while the site key of the page the load belongs to is being
    /// checked. Returns whether the load was held.
    fn wait_for_sitekey_check(&self, url: &str, parent_frames: &[String], is_main_frame: bool) -> bool;
}

pub(crate) struct ExtractorState {
    configuration: ArcSwapOption<SiteKeyConfiguration>,
    enabled: AtomicBool,
}

impl ExtractorState {
    #[inline]
    pub(crate) fn configuration(&self) -> Option<Arc<SiteKeyConfiguration>> {
        self.configuration.load_full()
    }

    #[inline]
    pub(crate) fn set_configuration(&self, configuration: Option<Arc<SiteKeyConfiguration>>) {
        self.configuration.store(configuration);
    }

    #[inline]
    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_enabled(&self, enabled: bool) -> bool {
        self.enabled.swap(enabled, Ordering::Relaxed)
    }
}

impl Default for ExtractorState {
    fn default() -> Self {
        Self {
            configuration: ArcSwapOption::empty(),
            enabled: AtomicBool::new(true),
        }
    }
}
