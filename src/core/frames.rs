use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::constants::FRAME_CHAIN_INLINE;

pub type FrameChain = SmallVec<[String; FRAME_CHAIN_INLINE]>;

/// `url -> referrer` links observed for the current page.
#[derive(Debug, Default)]
pub struct FrameTree {
    referrers: RwLock<FxHashMap<String, String>>,
}

impl FrameTree {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Self references are ignored. Returns whether the link was recorded.
    pub fn record(&self, url: &str, referrer: &str) -> bool {
        if url == referrer {
            log::warn!("Referrer of {} is the url itself, skipping", url);
            return false;
        }
        self.referrers.write().insert(url.to_owned(), referrer.to_owned());
        true
    }

    /// Ancestors of `url`, root first, not including `url` itself.
    pub fn parents_of(&self, url: &str) -> FrameChain {
        let referrers = self.referrers.read();
        let mut chain = FrameChain::new();
        let mut current = url;
        while let Some(parent) = referrers.get(current) {
            if parent == url || chain.iter().any(|seen| seen == parent) {
                log::warn!("Detected referrer loop for {}", url);
                break;
            }
            chain.push(parent.clone());
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// Ancestors of `url` followed by `url` itself.
    pub fn chain_with(&self, url: &str) -> FrameChain {
        let mut chain = self.parents_of(url);
        chain.push(url.to_owned());
        chain
    }

    #[inline]
    pub fn clear(&self) {
        self.referrers.write().clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.referrers.read().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
