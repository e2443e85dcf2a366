use dashmap::DashMap;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

use crate::security::encoding::Base64Processor;
use crate::security::signature::PublicKey;
use crate::utils::normalize_url;

enum Store {
    Unbounded {
        keys: DashMap<String, PublicKey>,
        urls: DashMap<String, String>,
    },
    Bounded {
        keys: Mutex<LruCache<String, PublicKey>>,
        urls: Mutex<LruCache<String, String>>,
    },
}

/// Verified public keys keyed by their padding-free base64 form, plus the
/// URLs that proved ownership of each key.
pub struct PublicKeyHolder {
    store: Store,
    base64: Base64Processor,
}

impl PublicKeyHolder {
    #[inline]
    pub fn new() -> Self {
        Self {
            store: Store::Unbounded {
                keys: DashMap::new(),
                urls: DashMap::new(),
            },
            base64: Base64Processor::new(),
        }
    }

    /// Evicts least recently used keys and URLs once `capacity` entries are held.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            store: Store::Bounded {
                keys: Mutex::new(LruCache::new(capacity)),
                urls: Mutex::new(LruCache::new(capacity)),
            },
            base64: Base64Processor::new(),
        }
    }

    #[inline]
    pub fn strip_padding(value: &str) -> &str {
        value.trim_end_matches('=')
    }

    #[inline]
    pub fn is_bounded(&self) -> bool {
        matches!(self.store, Store::Bounded { .. })
    }

    /// Decodes a DER public key and stores it. Returns false when the bytes
    /// are not a usable key.
    pub fn register(&self, key_id: &str, public_key_bytes: &[u8]) -> bool {
        match PublicKey::from_der(public_key_bytes) {
            Ok(key) => {
                self.register_key(key_id, key);
                true
            }
            Err(e) => {
                log::debug!("Not registering key `{}`: {}", key_id, e);
                false
            }
        }
    }

    /// Same as [`register`](Self::register) for a base64 encoded key that is
    /// also its own identifier.
    pub fn register_encoded(&self, encoded_key: &str) -> Option<PublicKey> {
        let der = match self.base64.decode(encoded_key) {
            Ok(der) => der,
            Err(e) => {
                log::debug!("Not registering key `{}`: {}", encoded_key, e);
                return None;
            }
        };
        let key = PublicKey::from_der(&der).ok()?;
        self.register_key(encoded_key, key.clone());
        Some(key)
    }

    pub fn register_key(&self, key_id: &str, key: PublicKey) {
        let id = Self::strip_padding(key_id);
        match &self.store {
            Store::Unbounded { keys, .. } => {
                keys.entry(id.to_owned()).or_insert(key);
            }
            Store::Bounded { keys, .. } => {
                let mut keys = keys.lock();
                if keys.get(id).is_none() {
                    keys.put(id.to_owned(), key);
                }
            }
        }
    }

    pub fn lookup(&self, key_id: &str) -> Option<PublicKey> {
        let id = Self::strip_padding(key_id);
        match &self.store {
            Store::Unbounded { keys, .. } => keys.get(id).map(|entry| entry.value().clone()),
            Store::Bounded { keys, .. } => keys.lock().get(id).cloned(),
        }
    }

    /// Remembers that `url` carried a valid signature for `key_id`. URLs are
    /// compared in normalized form.
    pub fn put(&self, url: &str, key_id: &str) {
        let url = normalize_url(url);
        let id = Self::strip_padding(key_id).to_owned();
        match &self.store {
            Store::Unbounded { urls, .. } => {
                urls.insert(url, id);
            }
            Store::Bounded { urls, .. } => {
                urls.lock().put(url, id);
            }
        }
    }

    pub fn get(&self, url: &str) -> Option<String> {
        let url = normalize_url(url);
        match &self.store {
            Store::Unbounded { urls, .. } => urls.get(&url).map(|entry| entry.value().clone()),
            Store::Bounded { urls, .. } => urls.lock().get(&url).cloned(),
        }
    }

    /// Key id of the first URL in `urls` that has one, else `default`.
    pub fn get_any<S: AsRef<str>>(&self, urls: &[S], default: &str) -> String {
        urls.iter()
            .find_map(|url| self.get(url.as_ref()))
            .unwrap_or_else(|| default.to_owned())
    }

    pub fn len(&self) -> usize {
        match &self.store {
            Store::Unbounded { keys, .. } => keys.len(),
            Store::Bounded { keys, .. } => keys.lock().len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        match &self.store {
            Store::Unbounded { keys, urls } => {
                keys.clear();
                urls.clear();
            }
            Store::Bounded { keys, urls } => {
                keys.lock().clear();
                urls.lock().clear();
            }
        }
    }
}

impl Default for PublicKeyHolder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PublicKeyHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKeyHolder")
            .field("keys", &self.len())
            .field("bounded", &self.is_bounded())
            .finish()
    }
}
