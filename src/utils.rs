use actix_web::http::header::{AsHeaderName, HeaderMap};
use url::Url;

/// Drops the `#fragment` part, if any.
#[inline]
pub fn url_without_fragment(url: &str) -> &str {
    match url.find('#') {
        Some(pos) => &url[..pos],
        None => url,
    }
}

/// Form used to compare page and frame URLs: parsed, fragment dropped and
/// serialized, so `http://host` and `http://host/#top` are the same page.
/// Values that do not parse only lose their fragment.
pub fn normalize_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.into()
        }
        Err(_) => url_without_fragment(url).to_owned(),
    }
}

/// `scheme://host[:port]/`, which is what a Referer carries under an
/// origin-only referrer policy.
pub fn origin_root(url: &str) -> Option<String> {
    let origin = Url::parse(url).ok()?.origin();
    if !origin.is_tuple() {
        return None;
    }
    Some(format!("{}/", origin.ascii_serialization()))
}

#[inline]
pub fn is_valid_code(status: u16) -> bool {
    (100..=599).contains(&status)
}

#[inline]
pub fn is_redirect_code(status: u16) -> bool {
    (300..=399).contains(&status)
}

#[inline]
pub fn header_str<K: AsHeaderName>(headers: &HeaderMap, name: K) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

pub fn domain_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_owned))
}

/// Byte offset of the first ASCII case-insensitive occurrence of `needle`
/// at or after `from`.
pub(crate) fn find_bytes_ignore_case(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() || from > haystack.len() - needle.len() {
        return None;
    }
    (from..=haystack.len() - needle.len())
        .find(|&start| haystack[start..start + needle.len()].eq_ignore_ascii_case(needle))
}

pub(crate) fn rfind_bytes_ignore_case(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (0..=haystack.len() - needle.len())
        .rev()
        .find(|&start| haystack[start..start + needle.len()].eq_ignore_ascii_case(needle))
}

#[inline]
pub(crate) fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    find_bytes_ignore_case(haystack.as_bytes(), needle.as_bytes(), 0)
}

#[inline]
pub(crate) fn find_ignore_ascii_case_from(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    find_bytes_ignore_case(haystack.as_bytes(), needle.as_bytes(), from)
}
