use actix_web::http::header::HeaderMap;
use percent_encoding::percent_decode_str;
use std::sync::Arc;
use url::Url;

use crate::constants::{HEADER_SITEKEY, HEADER_USER_AGENT, PAYLOAD_SEPARATOR, SITEKEY_SEPARATOR};
use crate::error::SiteKeyError;
use crate::monitoring::SiteKeyStats;
use crate::security::encoding::Base64Processor;
use crate::security::keys::PublicKeyHolder;
use crate::security::signature::{PublicKey, SignatureVerifier};
use crate::utils::{header_str, url_without_fragment};

/// Outcome of looking for a site key in a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteKeyCheck {
    Absent,
    Verified { key_id: String },
    Rejected,
    Unchecked { reason: String },
    /// The header could not be parsed or decoded into a key and signature.
    Malformed { reason: String },
}

impl SiteKeyCheck {
    #[inline]
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }
}

pub struct SiteKeyVerifier {
    signature_verifier: Arc<dyn SignatureVerifier>,
    public_key_holder: Arc<PublicKeyHolder>,
    base64: Base64Processor,
    stats: Arc<SiteKeyStats>,
}

impl SiteKeyVerifier {
    pub fn new(
        signature_verifier: Arc<dyn SignatureVerifier>,
        public_key_holder: Arc<PublicKeyHolder>,
    ) -> Self {
        Self {
            signature_verifier,
            public_key_holder,
            base64: Base64Processor::new(),
            stats: Arc::new(SiteKeyStats::new()),
        }
    }

    #[inline]
    pub fn with_stats(mut self, stats: Arc<SiteKeyStats>) -> Self {
        self.stats = stats;
        self
    }

    #[inline]
    pub fn public_key_holder(&self) -> &Arc<PublicKeyHolder> {
        &self.public_key_holder
    }

    #[inline]
    pub fn stats(&self) -> &Arc<SiteKeyStats> {
        &self.stats
    }

    /// Builds `<path>[?<query>] \0 <authority> \0 <user agent>` from the URL
    /// text. Path and authority are percent-decoded, the query is kept raw and
    /// an empty path is `/`.
    pub fn build_data(url: &str, user_agent: Option<&str>) -> Result<Vec<u8>, SiteKeyError> {
        let url = url_without_fragment(url);
        let parsed = Url::parse(url)?;
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(SiteKeyError::InvalidUrl(format!("no host in `{}`", url)));
        }

        let rest = url
            .find("://")
            .map(|pos| &url[pos + 3..])
            .ok_or_else(|| SiteKeyError::InvalidUrl(format!("no authority in `{}`", url)))?;
        let authority_end = rest.find(|c| c == '/' || c == '?').unwrap_or(rest.len());
        let (authority, tail) = rest.split_at(authority_end);
        let (path, query) = match tail.find('?') {
            Some(pos) => (&tail[..pos], Some(&tail[pos + 1..])),
            None => (tail, None),
        };
        let decoded_path = percent_decode_str(path).decode_utf8_lossy();
        let path = if decoded_path.is_empty() { "/" } else { &*decoded_path };
        let authority = percent_decode_str(authority).decode_utf8_lossy();
        let user_agent = user_agent.unwrap_or("");

        let mut data = Vec::with_capacity(
            path.len() + query.map_or(0, |q| q.len() + 1) + authority.len() + user_agent.len() + 2,
        );
        data.extend_from_slice(path.as_bytes());
        if let Some(query) = query {
            data.push(b'?');
            data.extend_from_slice(query.as_bytes());
        }
        data.push(PAYLOAD_SEPARATOR);
        data.extend_from_slice(authority.as_bytes());
        data.push(PAYLOAD_SEPARATOR);
        data.extend_from_slice(user_agent.as_bytes());
        Ok(data)
    }

    /// Splits an `X-Adblock-Key` value into its key and signature parts.
    pub fn split_value(value: &str) -> Result<(&str, &str), SiteKeyError> {
        let mut parts = value.split(SITEKEY_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(signature), None) if !key.is_empty() && !signature.is_empty() => {
                Ok((key, signature))
            }
            _ => Err(SiteKeyError::InvalidFormat(format!(
                "expected publicKey{}signature, got {} part(s)",
                SITEKEY_SEPARATOR,
                value.split(SITEKEY_SEPARATOR).count()
            ))),
        }
    }

    /// Checks an encoded key/signature pair against the request. On success
    /// the key is registered, the URL is remembered as its owner and the
    /// decoded key is returned.
    pub fn try_verify_signature(
        &self,
        url: &str,
        user_agent: Option<&str>,
        key_value: &str,
        signature_value: &str,
    ) -> Result<Option<PublicKey>, SiteKeyError> {
        let key_bytes = self.base64.decode(key_value)?;
        let signature = self.base64.decode(signature_value)?;
        let data = Self::build_data(url, user_agent)?;
        let key = PublicKey::from_der(&key_bytes)?;

        if !self.signature_verifier.verify(&key, &data, &signature) {
            return Ok(None);
        }

        self.public_key_holder.register_key(key_value, key.clone());
        self.public_key_holder.put(url, key_value);
        Ok(Some(key))
    }

    /// Never fails: anything unexpected means the key is not trusted.
    pub fn verify_signature(
        &self,
        url: &str,
        user_agent: Option<&str>,
        key_value: &str,
        signature_value: &str,
    ) -> Option<PublicKey> {
        match self.try_verify_signature(url, user_agent, key_value, signature_value) {
            Ok(key) => key,
            Err(e) => {
                log::debug!("Site key for `{}` not trusted: {}", url, e);
                None
            }
        }
    }

    /// Verifies a full `X-Adblock-Key` header value.
    pub fn verify(&self, url: &str, user_agent: Option<&str>, value: &str) -> Result<bool, SiteKeyError> {
        let (key, signature) = Self::split_value(value.trim())?;
        Ok(self
            .try_verify_signature(url, user_agent, key, signature)?
            .is_some())
    }

    /// Classifies and records the result of verifying `value` for `url`.
    pub fn check(&self, url: &str, user_agent: Option<&str>, value: &str) -> SiteKeyCheck {
        let url = url_without_fragment(url);
        match self.verify(url, user_agent, value) {
            Ok(true) => {
                self.stats.increment_keys_verified();
                let key_id = Self::split_value(value.trim())
                    .map(|(key, _)| PublicKeyHolder::strip_padding(key).to_owned())
                    .unwrap_or_default();
                log::debug!("Url {} public key verified successfully", url);
                SiteKeyCheck::Verified { key_id }
            }
            Ok(false) => {
                self.stats.increment_keys_rejected();
                log::error!("Url {} public key is not verified", url);
                SiteKeyCheck::Rejected
            }
            Err(e) if e.is_unchecked() => {
                self.stats.increment_keys_unchecked();
                log::warn!("Could not check site key for {}: {}", url, e);
                SiteKeyCheck::Unchecked {
                    reason: e.to_string(),
                }
            }
            Err(e) => {
                self.stats.increment_keys_malformed();
                log::error!("Malformed site key for {}: {}", url, e);
                SiteKeyCheck::Malformed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Looks for the site key header in `response_headers` and verifies it
    /// with the user agent of the request.
    pub fn verify_in_headers(
        &self,
        url: &str,
        request_headers: &HeaderMap,
        response_headers: &HeaderMap,
    ) -> SiteKeyCheck {
        let value = match response_headers.get(HEADER_SITEKEY) {
            Some(value) => value,
            None => return SiteKeyCheck::Absent,
        };
        let value = match value.to_str() {
            Ok(value) => value,
            Err(e) => {
                self.stats.increment_keys_malformed();
                log::error!("Site key header of {} is not valid text", url);
                return SiteKeyCheck::Malformed {
                    reason: e.to_string(),
                };
            }
        };
        self.check(url, header_str(request_headers, HEADER_USER_AGENT), value)
    }
}

impl std::fmt::Debug for SiteKeyVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteKeyVerifier")
            .field("public_key_holder", &self.public_key_holder)
            .finish()
    }
}
