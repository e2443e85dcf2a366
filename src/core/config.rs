use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::constants::DEFAULT_HOLD_TIMEOUT_MS;
use crate::core::http::HttpClient;
use crate::error::SiteKeyError;
use crate::monitoring::SiteKeyStats;
use crate::security::{PublicKeyHolder, RsaSha1SignatureVerifier, SignatureVerifier, SiteKeyVerifier};

/// Everything needed to fetch, verify and remember site keys. Replaced as a
/// whole, only `force_checks` changes in place.
pub struct SiteKeyConfiguration {
    signature_verifier: Arc<dyn SignatureVerifier>,
    public_key_holder: Arc<PublicKeyHolder>,
    http_client: Arc<dyn HttpClient>,
    site_key_verifier: Arc<SiteKeyVerifier>,
    force_checks: AtomicBool,
    hold_timeout: Duration,
    stats: Arc<SiteKeyStats>,
}

impl SiteKeyConfiguration {
    #[inline]
    pub fn builder() -> SiteKeyConfigurationBuilder {
        SiteKeyConfigurationBuilder::new()
    }

    #[inline]
    pub fn signature_verifier(&self) -> &Arc<dyn SignatureVerifier> {
        &self.signature_verifier
    }

    #[inline]
    pub fn public_key_holder(&self) -> &Arc<PublicKeyHolder> {
        &self.public_key_holder
    }

    #[inline]
    pub fn http_client(&self) -> &Arc<dyn HttpClient> {
        &self.http_client
    }

    #[inline]
    pub fn site_key_verifier(&self) -> &Arc<SiteKeyVerifier> {
        &self.site_key_verifier
    }

    #[inline]
    pub fn hold_timeout(&self) -> Duration {
        self.hold_timeout
    }

    #[inline]
    pub fn stats(&self) -> &Arc<SiteKeyStats> {
        &self.stats
    }

    /// Checks run even when Acceptable Ads is off.
    #[inline]
    pub fn force_checks(&self) -> bool {
        self.force_checks.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_force_checks(&self, force: bool) {
        self.force_checks.store(force, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for SiteKeyConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteKeyConfiguration")
            .field("public_key_holder", &self.public_key_holder)
            .field("force_checks", &self.force_checks())
            .field("hold_timeout", &self.hold_timeout)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteKeySettings {
    pub hold_timeout_ms: u64,
    pub max_public_keys: Option<usize>,
    pub force_checks: bool,
}

impl Default for SiteKeySettings {
    fn default() -> Self {
        Self {
            hold_timeout_ms: DEFAULT_HOLD_TIMEOUT_MS,
            max_public_keys: None,
            force_checks: false,
        }
    }
}

impl SiteKeySettings {
    pub fn from_json(json: &str) -> Result<Self, SiteKeyError> {
        let settings: Self = serde_json::from_str(json)?;
        if settings.hold_timeout_ms == 0 {
            return Err(SiteKeyError::ConfigError(
                "hold_timeout_ms must be positive".to_owned(),
            ));
        }
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SiteKeyError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    #[inline]
    pub fn hold_timeout(&self) -> Duration {
        Duration::from_millis(self.hold_timeout_ms)
    }
}

#[derive(Default)]
pub struct SiteKeyConfigurationBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    signature_verifier: Option<Arc<dyn SignatureVerifier>>,
    public_key_holder: Option<Arc<PublicKeyHolder>>,
    hold_timeout: Option<Duration>,
    max_public_keys: Option<usize>,
    force_checks: bool,
    stats: Option<Arc<SiteKeyStats>>,
}

impl SiteKeyConfigurationBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    #[inline]
    pub fn with_signature_verifier(mut self, verifier: Arc<dyn SignatureVerifier>) -> Self {
        self.signature_verifier = Some(verifier);
        self
    }

    #[inline]
    pub fn with_public_key_holder(mut self, holder: Arc<PublicKeyHolder>) -> Self {
        self.public_key_holder = Some(holder);
        self
    }

    #[inline]
    pub fn with_hold_timeout(mut self, timeout: Duration) -> Self {
        self.hold_timeout = Some(timeout);
        self
    }

    #[inline]
    pub fn with_max_public_keys(mut self, max: usize) -> Self {
        self.max_public_keys = Some(max);
        self
    }

    #[inline]
    pub fn with_force_checks(mut self, force: bool) -> Self {
        self.force_checks = force;
        self
    }

    #[inline]
    pub fn with_stats(mut self, stats: Arc<SiteKeyStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_settings(mut self, settings: &SiteKeySettings) -> Self {
        self.hold_timeout = Some(settings.hold_timeout());
        self.max_public_keys = settings.max_public_keys;
        self.force_checks = settings.force_checks;
        self
    }

    pub fn build(self) -> Result<SiteKeyConfiguration, SiteKeyError> {
        let http_client = self
            .http_client
            .ok_or_else(|| SiteKeyError::ConfigError("an http client is required".to_owned()))?;

        let hold_timeout = self
            .hold_timeout
            .unwrap_or(Duration::from_millis(DEFAULT_HOLD_TIMEOUT_MS));
        if hold_timeout.is_zero() {
            return Err(SiteKeyError::ConfigError(
                "hold timeout must be positive".to_owned(),
            ));
        }

        let signature_verifier = self
            .signature_verifier
            .unwrap_or_else(|| Arc::new(RsaSha1SignatureVerifier::new()));

        let public_key_holder = match (self.public_key_holder, self.max_public_keys) {
            (Some(holder), _) => holder,
            (None, Some(max)) => {
                let capacity = NonZeroUsize::new(max).ok_or_else(|| {
                    SiteKeyError::ConfigError("max_public_keys must be positive".to_owned())
                })?;
                Arc::new(PublicKeyHolder::with_capacity(capacity))
            }
            (None, None) => Arc::new(PublicKeyHolder::new()),
        };

        let stats = self.stats.unwrap_or_else(|| Arc::new(SiteKeyStats::new()));

        let site_key_verifier = Arc::new(
            SiteKeyVerifier::new(signature_verifier.clone(), public_key_holder.clone())
                .with_stats(stats.clone()),
        );

        Ok(SiteKeyConfiguration {
            signature_verifier,
            public_key_holder,
            http_client,
            site_key_verifier,
            force_checks: AtomicBool::new(self.force_checks),
            hold_timeout,
            stats,
        })
    }
}
