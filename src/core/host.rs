use std::borrow::Cow;

/// What the interception layer needs from the embedding web view.
pub trait WebViewHost: Send + Sync {
    /// Whether the element hiding script is injected into frame documents.
    fn js_in_frames_enabled(&self) -> bool {
        true
    }

    /// Prepares the element hiding stylesheet for `url`; false when there is
    /// nothing to hide and injection can be skipped.
    fn generate_stylesheet_for_url(&self, url: &str) -> bool;

    fn inject_js(&self) -> Cow<'_, str>;

    fn can_accept_cookie(&self, _url: &str, _cookie: &str) -> bool {
        true
    }

    fn cookies_for(&self, _url: &str) -> Option<String> {
        None
    }

    fn set_cookie(&self, _url: &str, _cookie: &str) {}
}
