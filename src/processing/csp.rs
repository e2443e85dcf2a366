use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};

use crate::constants::{DIRECTIVE_MARKERS, HEADER_CSP, NONCE_PREFIX, SCRIPT_SRC, UNSAFE_INLINE_SOURCE};
use crate::security::NonceGenerator;
use crate::utils::{find_ignore_ascii_case, find_ignore_ascii_case_from};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CspUpdate {
    /// No `script-src` to relax, the policy is left alone.
    Unchanged,
    /// `script-src` already allows inline scripts.
    InlineAllowed,
    /// `script-src` carries a nonce that injected scripts can reuse.
    ExistingNonce(String),
    /// A fresh nonce was spliced into `script-src`.
    Injected { nonce: String, header: String },
}

impl CspUpdate {
    /// Nonce the injected `<script>` must carry, without the `nonce-` prefix.
    pub fn nonce(&self) -> Option<&str> {
        match self {
            Self::ExistingNonce(nonce) | Self::Injected { nonce, .. } => Some(nonce),
            Self::Unchanged | Self::InlineAllowed => None,
        }
    }
}

/// Relaxes `Content-Security-Policy` just enough for the element hiding
/// script to run. Everything outside `script-src` is kept verbatim.
#[derive(Debug, Default)]
pub struct CspRewriter {
    nonces: NonceGenerator,
}

impl CspRewriter {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_nonce_generator(nonces: NonceGenerator) -> Self {
        Self { nonces }
    }

    pub fn rewrite(&self, policy: &str) -> CspUpdate {
        let script_src = match find_script_src(policy, 0) {
            Some(pos) => pos,
            None => return CspUpdate::Unchanged,
        };

        if let Some(nonce) = find_script_src_nonce(policy) {
            log::debug!("Found nonce in CSP header with value `{}`", nonce);
            return CspUpdate::ExistingNonce(nonce.to_owned());
        }

        if contains_valid_unsafe_inline(policy, script_src) {
            log::debug!("Found `{}` in CSP header, no need for update", UNSAFE_INLINE_SOURCE);
            return CspUpdate::InlineAllowed;
        }

        let nonce = self.nonces.generate();
        let before = policy[..script_src].trim();
        let after = policy[script_src + SCRIPT_SRC.len()..].trim();
        let directive = format!("{} '{}{}'", SCRIPT_SRC, NONCE_PREFIX, nonce);

        let mut header = String::with_capacity(policy.len() + directive.len() + 2);
        for part in [before, directive.as_str(), after] {
            if part.is_empty() {
                continue;
            }
            if !header.is_empty() {
                header.push(' ');
            }
            header.push_str(part);
        }
        log::debug!("Added nonce to CSP header, new value `{}`", header);
        CspUpdate::Injected { nonce, header }
    }

    /// Applies [`rewrite`](Self::rewrite) to the first policy header and
    /// returns the nonce injected scripts must use, if any.
    pub fn update_csp_header(&self, headers: &mut HeaderMap) -> Option<String> {
        let name = HeaderName::from_static(HEADER_CSP);
        let policy = headers.get(&name)?.to_str().ok()?.to_owned();
        if policy.trim().is_empty() {
            return None;
        }
        log::debug!("Found `{}` CSP header", policy);

        match self.rewrite(&policy) {
            CspUpdate::Unchanged | CspUpdate::InlineAllowed => None,
            CspUpdate::ExistingNonce(nonce) => Some(nonce),
            CspUpdate::Injected { nonce, header } => {
                let value = match HeaderValue::from_str(&header) {
                    Ok(value) => value,
                    Err(e) => {
                        log::warn!("Rewritten CSP header is not a valid header value: {}", e);
                        return None;
                    }
                };
                let rest: Vec<HeaderValue> = headers.get_all(&name).skip(1).cloned().collect();
                headers.insert(name.clone(), value);
                for other in rest {
                    headers.append(name.clone(), other);
                }
                Some(nonce)
            }
        }
    }
}

/// Position of the next `script-src` token, skipping longer names such as
/// `script-src-elem`.
fn find_script_src(policy: &str, from: usize) -> Option<usize> {
    let bytes = policy.as_bytes();
    let mut from = from;
    while let Some(pos) = find_ignore_ascii_case_from(policy, SCRIPT_SRC, from) {
        let end = pos + SCRIPT_SRC.len();
        let starts_token = pos == 0 || !matches!(bytes[pos - 1], b'-' | b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9');
        let ends_token = end == bytes.len() || bytes[end].is_ascii_whitespace() || bytes[end] == b';';
        if starts_token && ends_token {
            return Some(pos);
        }
        from = pos + 1;
    }
    None
}

/// First `'nonce-...'` source inside any `script-src` source list.
fn find_script_src_nonce(policy: &str) -> Option<&str> {
    let quoted_prefix = format!("'{}", NONCE_PREFIX);
    let mut from = 0;
    while let Some(pos) = find_script_src(policy, from) {
        let start = pos + SCRIPT_SRC.len();
        let end = policy[start..].find(';').map_or(policy.len(), |offset| start + offset);
        let sources = &policy[start..end];
        if let Some(nonce_pos) = find_ignore_ascii_case(sources, &quoted_prefix) {
            let value_start = nonce_pos + quoted_prefix.len();
            if let Some(len) = sources[value_start..].find('\'') {
                if len > 0 {
                    return Some(&sources[value_start..value_start + len]);
                }
            }
        }
        from = pos + 1;
    }
    None
}

/// Whether `'unsafe-inline'` follows the `script-src` at `script_src`
/// without another directive in between.
fn contains_valid_unsafe_inline(policy: &str, script_src: usize) -> bool {
    let start = script_src + SCRIPT_SRC.len();
    let unsafe_inline = match find_ignore_ascii_case_from(policy, UNSAFE_INLINE_SOURCE, start) {
        Some(pos) => pos,
        None => return false,
    };
    let between = policy[start..unsafe_inline].to_ascii_lowercase();
    !DIRECTIVE_MARKERS.iter().any(|marker| between.contains(marker))
}
