#![allow(dead_code)]

use adblock_sitekey::core::ContentTypeMask;
use adblock_sitekey::{
    Base64Processor, FilterEngine, HttpClient, HttpRequest, MatchesResult, PublicKey, PublicKeyHolder,
    RsaSha1SignatureVerifier, ServerResponse, SignatureVerifier, SiteKeyConfiguration, SiteKeyError, SiteKeyVerifier,
    WebViewHost,
};
use mockall::mock;
use parking_lot::Mutex;
use rsa::pkcs8::EncodePublicKey;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha1::{Digest, Sha1};
use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;

pub const USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 Mobile Safari/537.36";
pub const PAGE_URL: &str = "http://page.example.com/index.html";
pub const INJECTED_JS: &str = "elemhide.apply();";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn signing_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut rand::thread_rng(), 1024).expect("key generation"))
}

pub fn other_signing_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut rand::thread_rng(), 1024).expect("key generation"))
}

pub fn public_key_der(key: &RsaPrivateKey) -> Vec<u8> {
    key.to_public_key()
        .to_public_key_der()
        .expect("public key der")
        .as_bytes()
        .to_vec()
}

pub fn encoded_public_key(key: &RsaPrivateKey) -> String {
    Base64Processor::new().encode(&public_key_der(key))
}

pub fn public_key(key: &RsaPrivateKey) -> PublicKey {
    PublicKey::from_der(&public_key_der(key)).expect("valid public key")
}

pub fn sign(key: &RsaPrivateKey, data: &[u8]) -> Vec<u8> {
    key.sign(Pkcs1v15Sign::new::<Sha1>(), &Sha1::digest(data))
        .expect("signature")
}

/// `publicKey_signature` as a site would send it for `url` and `user_agent`.
pub fn site_key_value(key: &RsaPrivateKey, url: &str, user_agent: Option<&str>) -> String {
    let data = SiteKeyVerifier::build_data(url, user_agent).expect("payload");
    let base64 = Base64Processor::new();
    format!("{}_{}", encoded_public_key(key), base64.encode(&sign(key, &data)))
}

pub fn key_id(key: &RsaPrivateKey) -> String {
    PublicKeyHolder::strip_padding(&encoded_public_key(key)).to_owned()
}

pub fn html_with_site_key(value: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\" data-adblockkey=\"{}\"><head></head><body><p>parked</p></body></html>",
        value
    )
}

mock! {
    pub Client {}

    impl HttpClient for Client {
        fn request(&self, request: &HttpRequest) -> Result<ServerResponse, SiteKeyError>;
    }
}

/// Client for setups that must never reach the network.
pub struct UnreachableClient;

impl HttpClient for UnreachableClient {
    fn request(&self, request: &HttpRequest) -> Result<ServerResponse, SiteKeyError> {
        Err(SiteKeyError::TransportError(format!("unreachable: {}", request.url)))
    }
}

/// Delays every verification, standing in for slow hardware.
pub struct SlowVerifier {
    delay: Duration,
    inner: RsaSha1SignatureVerifier,
}

impl SlowVerifier {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: RsaSha1SignatureVerifier::new(),
        }
    }
}

impl SignatureVerifier for SlowVerifier {
    fn verify(&self, key: &PublicKey, data: &[u8], signature: &[u8]) -> bool {
        thread::sleep(self.delay);
        self.inner.verify(key, data, signature)
    }
}

pub fn configuration(client: Arc<dyn HttpClient>, hold_timeout: Duration) -> Arc<SiteKeyConfiguration> {
    Arc::new(
        SiteKeyConfiguration::builder()
            .with_http_client(client)
            .with_hold_timeout(hold_timeout)
            .build()
            .expect("valid configuration"),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCall {
    pub url: String,
    pub parent_frames: Vec<String>,
    pub site_key: String,
}

/// Blocks every URL containing `blocked`, unless the document is exempted by
/// `allowlisted_site_key`.
pub struct FakeEngine {
    pub enabled: bool,
    pub acceptable_ads: bool,
    pub blocked: String,
    pub allowlisted_site_key: Option<String>,
    pub matches_calls: Mutex<Vec<EngineCall>>,
    pub document_calls: Mutex<Vec<EngineCall>>,
}

impl FakeEngine {
    pub fn new(blocked: &str) -> Self {
        Self {
            enabled: true,
            acceptable_ads: true,
            blocked: blocked.to_owned(),
            allowlisted_site_key: None,
            matches_calls: Mutex::new(Vec::new()),
            document_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn allowlisting(mut self, site_key: &str) -> Self {
        self.allowlisted_site_key = Some(site_key.to_owned());
        self
    }

    fn call(url: &str, parent_frames: &[String], site_key: &str) -> EngineCall {
        EngineCall {
            url: url.to_owned(),
            parent_frames: parent_frames.to_vec(),
            site_key: site_key.to_owned(),
        }
    }
}

impl FilterEngine for FakeEngine {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_acceptable_ads_enabled(&self) -> bool {
        self.acceptable_ads
    }

    fn matches(
        &self,
        url: &str,
        _content_types: ContentTypeMask,
        parent_frames: &[String],
        site_key: &str,
        _specific_only: bool,
    ) -> MatchesResult {
        self.matches_calls
            .lock()
            .push(Self::call(url, parent_frames, site_key));
        if url.contains(&self.blocked) {
            MatchesResult::Blocked
        } else {
            MatchesResult::NotFound
        }
    }

    fn is_document_allowlisted(&self, url: &str, parent_frames: &[String], site_key: &str) -> bool {
        self.document_calls
            .lock()
            .push(Self::call(url, parent_frames, site_key));
        !site_key.is_empty() && self.allowlisted_site_key.as_deref() == Some(site_key)
    }

    fn is_genericblock_allowlisted(&self, _url: &str, _parent_frames: &[String], _site_key: &str) -> bool {
        false
    }

    fn element_hiding_selectors(
        &self,
        _url: &str,
        domain: &str,
        _parent_frames: &[String],
        site_key: &str,
    ) -> Vec<String> {
        if self.allowlisted_site_key.as_deref() == Some(site_key) {
            Vec::new()
        } else {
            vec![format!("#ad-{}", domain)]
        }
    }
}

pub struct FakeHost {
    pub js_in_frames: bool,
    pub has_stylesheet: bool,
    pub cookies: Option<String>,
    pub accept_cookies: bool,
    pub stored_cookies: Mutex<Vec<(String, String)>>,
    pub stylesheet_requests: AtomicUsize,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self {
            js_in_frames: true,
            has_stylesheet: true,
            cookies: None,
            accept_cookies: true,
            stored_cookies: Mutex::new(Vec::new()),
            stylesheet_requests: AtomicUsize::new(0),
        }
    }
}

impl WebViewHost for FakeHost {
    fn js_in_frames_enabled(&self) -> bool {
        self.js_in_frames
    }

    fn generate_stylesheet_for_url(&self, _url: &str) -> bool {
        self.stylesheet_requests.fetch_add(1, Ordering::SeqCst);
        self.has_stylesheet
    }

    fn inject_js(&self) -> Cow<'_, str> {
        Cow::Borrowed(INJECTED_JS)
    }

    fn can_accept_cookie(&self, _url: &str, _cookie: &str) -> bool {
        self.accept_cookies
    }

    fn cookies_for(&self, _url: &str) -> Option<String> {
        self.cookies.clone()
    }

    fn set_cookie(&self, url: &str, cookie: &str) {
        self.stored_cookies
            .lock()
            .push((url.to_owned(), cookie.to_owned()));
    }
}
