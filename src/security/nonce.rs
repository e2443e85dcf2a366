use crate::constants::DEFAULT_NONCE_LENGTH;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64, Engine};
use getrandom::getrandom;
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

const BUFFER_POOL_SIZE: usize = 8;

#[derive(Debug)]
pub struct NonceGenerator {
    length: AtomicUsize,
    buffer_pool: Mutex<SmallVec<[Vec<u8>; BUFFER_POOL_SIZE]>>,
    generated: AtomicUsize,
}

impl NonceGenerator {
    #[inline]
    pub fn new(length: usize) -> Self {
        Self {
            length: AtomicUsize::new(length.max(1)),
            buffer_pool: Mutex::new(SmallVec::new()),
            generated: AtomicUsize::new(0),
        }
    }

    /// Random URL-safe token. Falls back to a v4 UUID when the OS entropy
    /// source is unavailable.
    pub fn generate(&self) -> String {
        self.generated.fetch_add(1, Ordering::Relaxed);

        let length = self.length.load(Ordering::Relaxed);
        let mut buffer = self.buffer_pool.lock().pop().unwrap_or_default();
        buffer.clear();
        buffer.resize(length, 0);

        let encoded = match getrandom(&mut buffer) {
            Ok(()) => BASE64.encode(&buffer),
            Err(e) => {
                log::warn!("Falling back to uuid nonce: {}", e);
                Uuid::new_v4().simple().to_string()
            }
        };

        let mut pool = self.buffer_pool.lock();
        if pool.len() < BUFFER_POOL_SIZE {
            pool.push(buffer);
        }

        encoded
    }

    #[inline]
    pub fn length(&self) -> usize {
        self.length.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn generated(&self) -> usize {
        self.generated.load(Ordering::Relaxed)
    }
}

impl Default for NonceGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_NONCE_LENGTH)
    }
}
