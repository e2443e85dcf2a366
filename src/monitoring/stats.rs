use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug)]
pub struct SiteKeyStats {
    requests_intercepted: AtomicUsize,
    requests_blocked: AtomicUsize,
    requests_allowlisted: AtomicUsize,
    keys_verified: AtomicUsize,
    keys_rejected: AtomicUsize,
    keys_malformed: AtomicUsize,
    keys_unchecked: AtomicUsize,
    fetch_failures: AtomicUsize,
    holds_started: AtomicUsize,
    holds_released: AtomicUsize,
    holds_timed_out: AtomicUsize,
    holds_cancelled: AtomicUsize,
    nonces_injected: AtomicUsize,
    start_time: Instant,
}

impl Default for SiteKeyStats {
    fn default() -> Self {
        Self {
            requests_intercepted: Default::default(),
            requests_blocked: Default::default(),
            requests_allowlisted: Default::default(),
            keys_verified: Default::default(),
            keys_rejected: Default::default(),
            keys_malformed: Default::default(),
            keys_unchecked: Default::default(),
            fetch_failures: Default::default(),
            holds_started: Default::default(),
            holds_released: Default::default(),
            holds_timed_out: Default::default(),
            holds_cancelled: Default::default(),
            nonces_injected: Default::default(),
            start_time: Instant::now(),
        }
    }
}

impl SiteKeyStats {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn requests_intercepted(&self) -> usize {
        self.requests_intercepted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn requests_blocked(&self) -> usize {
        self.requests_blocked.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn requests_allowlisted(&self) -> usize {
        self.requests_allowlisted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn keys_verified(&self) -> usize {
        self.keys_verified.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn keys_rejected(&self) -> usize {
        self.keys_rejected.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn keys_malformed(&self) -> usize {
        self.keys_malformed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn keys_unchecked(&self) -> usize {
        self.keys_unchecked.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn fetch_failures(&self) -> usize {
        self.fetch_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn holds_started(&self) -> usize {
        self.holds_started.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn holds_released(&self) -> usize {
        self.holds_released.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn holds_timed_out(&self) -> usize {
        self.holds_timed_out.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn holds_cancelled(&self) -> usize {
        self.holds_cancelled.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn nonces_injected(&self) -> usize {
        self.nonces_injected.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    #[inline]
    pub(crate) fn increment_requests_intercepted(&self) {
        self.requests_intercepted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_requests_blocked(&self) {
        self.requests_blocked.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_requests_allowlisted(&self) {
        self.requests_allowlisted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_keys_verified(&self) {
        self.keys_verified.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_keys_rejected(&self) {
        self.keys_rejected.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_keys_malformed(&self) {
        self.keys_malformed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_keys_unchecked(&self) {
        self.keys_unchecked.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_fetch_failures(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_holds_started(&self) {
        self.holds_started.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_holds_released(&self) {
        self.holds_released.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_holds_timed_out(&self) {
        self.holds_timed_out.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_holds_cancelled(&self) {
        self.holds_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_nonces_injected(&self) {
        self.nonces_injected.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn reset(&self) {
        self.requests_intercepted.store(0, Ordering::Relaxed);
        self.requests_blocked.store(0, Ordering::Relaxed);
        self.requests_allowlisted.store(0, Ordering::Relaxed);
        self.keys_verified.store(0, Ordering::Relaxed);
        self.keys_rejected.store(0, Ordering::Relaxed);
        self.keys_malformed.store(0, Ordering::Relaxed);
        self.keys_unchecked.store(0, Ordering::Relaxed);
        self.fetch_failures.store(0, Ordering::Relaxed);
        self.holds_started.store(0, Ordering::Relaxed);
        self.holds_released.store(0, Ordering::Relaxed);
        self.holds_timed_out.store(0, Ordering::Relaxed);
        self.holds_cancelled.store(0, Ordering::Relaxed);
        self.nonces_injected.store(0, Ordering::Relaxed);
    }
}

impl fmt::Display for SiteKeyStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Site Key Statistics:")?;
        writeln!(f, "  Uptime: {} seconds", self.uptime_secs())?;
        writeln!(f, "  Requests intercepted: {}", self.requests_intercepted())?;
        writeln!(f, "  Requests blocked: {}", self.requests_blocked())?;
        writeln!(f, "  Requests allowlisted: {}", self.requests_allowlisted())?;
        writeln!(f, "  Keys verified: {}", self.keys_verified())?;
        writeln!(f, "  Keys rejected: {}", self.keys_rejected())?;
        writeln!(f, "  Keys malformed: {}", self.keys_malformed())?;
        writeln!(f, "  Keys not checked: {}", self.keys_unchecked())?;
        writeln!(f, "  Side-channel fetch failures: {}", self.fetch_failures())?;
        writeln!(
            f,
            "  Holds started/released/timed out/cancelled: {}/{}/{}/{}",
            self.holds_started(),
            self.holds_released(),
            self.holds_timed_out(),
            self.holds_cancelled()
        )?;
        writeln!(f, "  Nonces injected: {}", self.nonces_injected())?;
        Ok(())
    }
}
