use arc_swap::{ArcSwap, ArcSwapOption};
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::constants::DEFAULT_HOLD_TIMEOUT;
use crate::monitoring::SiteKeyStats;
use crate::utils::{normalize_url, origin_root};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HoldState {
    NotStarted,
    Waiting,
    Verified,
    /// The page turned out to carry no site key.
    Absent,
    Failed,
    TimedOut,
    /// The page was navigated away from.
    Cancelled,
}

impl HoldState {
    #[inline]
    pub fn is_resolved(self) -> bool {
        !matches!(self, Self::NotStarted | Self::Waiting)
    }

    pub fn verdict(self) -> CheckVerdict {
        match self {
            Self::NotStarted | Self::Waiting => CheckVerdict::NotYetDetermined,
            Self::Verified => CheckVerdict::Allow,
            Self::Absent | Self::Failed | Self::TimedOut | Self::Cancelled => CheckVerdict::Block,
        }
    }
}

impl fmt::Display for HoldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "not started",
            Self::Waiting => "waiting",
            Self::Verified => "verified",
            Self::Absent => "absent",
            Self::Failed => "failed",
            Self::TimedOut => "timed out",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Whether held loads may rely on a site key exemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckVerdict {
    Allow,
    Block,
    NotYetDetermined,
}

/// Site key check for one page. Resolves exactly once; anything arriving
/// after that, including a late verification after a timeout, is ignored.
pub struct PendingSiteKeyCheck {
    id: Uuid,
    url: String,
    origin: Option<String>,
    timeout: Duration,
    started: Mutex<Option<Instant>>,
    state: Mutex<HoldState>,
    released: Condvar,
    stats: Arc<SiteKeyStats>,
}

impl PendingSiteKeyCheck {
    pub fn new(url: &str, timeout: Duration, stats: Arc<SiteKeyStats>) -> Self {
        let url = normalize_url(url);
        Self {
            id: Uuid::new_v4(),
            origin: origin_root(&url),
            url,
            timeout,
            started: Mutex::new(None),
            state: Mutex::new(HoldState::NotStarted),
            released: Condvar::new(),
            stats,
        }
    }

    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `NotStarted -> Waiting`; the hold bound runs from here.
    pub fn begin(&self) -> bool {
        let mut state = self.state.lock();
        if *state != HoldState::NotStarted {
            return false;
        }
        *state = HoldState::Waiting;
        *self.started.lock() = Some(Instant::now());
        self.stats.increment_holds_started();
        true
    }

    fn deadline(&self) -> Option<Instant> {
        self.started.lock().map(|started| started + self.timeout)
    }

    /// Current state, turning an overdue wait into `TimedOut`.
    pub fn state(&self) -> HoldState {
        let mut state = self.state.lock();
        if *state == HoldState::Waiting && self.deadline().map_or(false, |d| Instant::now() >= d) {
            self.expire(&mut state);
        }
        *state
    }

    #[inline]
    pub fn verdict(&self) -> CheckVerdict {
        self.state().verdict()
    }

    fn expire(&self, state: &mut HoldState) {
        *state = HoldState::TimedOut;
        self.stats.increment_holds_timed_out();
        log::warn!("Site key check for {} timed out after {:?}", self.url, self.timeout);
        self.released.notify_all();
    }

    /// Moves a waiting check to `outcome`. Returns false when it was already
    /// resolved, which leaves it untouched.
    pub fn resolve(&self, outcome: HoldState) -> bool {
        if !outcome.is_resolved() {
            return false;
        }
        let mut state = self.state.lock();
        if *state == HoldState::Waiting && self.deadline().map_or(false, |d| Instant::now() >= d) {
            self.expire(&mut state);
        }
        if state.is_resolved() {
            log::debug!(
                "Ignoring `{}` for {}, check already {}",
                outcome,
                self.url,
                *state
            );
            return false;
        }
        *state = outcome;
        match outcome {
            HoldState::Cancelled => self.stats.increment_holds_cancelled(),
            HoldState::TimedOut => self.stats.increment_holds_timed_out(),
            _ => self.stats.increment_holds_released(),
        }
        log::debug!("Site key check for {} resolved as {}", self.url, outcome);
        self.released.notify_all();
        true
    }

    #[inline]
    pub fn cancel(&self) -> bool {
        self.resolve(HoldState::Cancelled)
    }

    /// Blocks until the check resolves or its bound elapses.
    pub fn wait(&self) -> HoldState {
        let deadline = match self.deadline() {
            Some(deadline) => deadline,
            None => return *self.state.lock(),
        };
        let mut state = self.state.lock();
        while *state == HoldState::Waiting {
            if self.released.wait_until(&mut state, deadline).timed_out() {
                if *state == HoldState::Waiting {
                    self.expire(&mut state);
                }
                break;
            }
        }
        *state
    }

    /// Whether `url` names this page, in any spelling that normalizes to it.
    pub fn is_for(&self, url: &str) -> bool {
        normalize_url(url) == self.url
    }

    /// Whether a load with the given ancestry belongs to this page. A load
    /// without a Referer can only come from the current page. A Referer cut
    /// down to the page's origin counts as the page.
    pub fn covers(&self, parent_frames: &[String]) -> bool {
        if parent_frames.is_empty() {
            return true;
        }
        parent_frames.iter().any(|frame| {
            let frame = normalize_url(frame);
            frame == self.url || self.origin.as_deref() == Some(frame.as_str())
        })
    }
}

impl fmt::Debug for PendingSiteKeyCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingSiteKeyCheck")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("state", &*self.state.lock())
            .finish()
    }
}

/// Holds sub-resource loads of the current page until its site key check
/// resolves. Starting a new page cancels the previous check.
pub struct HoldGate {
    current: ArcSwapOption<PendingSiteKeyCheck>,
    timeout_ms: AtomicU64,
    stats: ArcSwap<SiteKeyStats>,
}

impl HoldGate {
    pub fn new(timeout: Duration) -> Self {
        Self {
            current: ArcSwapOption::empty(),
            timeout_ms: AtomicU64::new(timeout.as_millis().max(1) as u64),
            stats: ArcSwap::from_pointee(SiteKeyStats::new()),
        }
    }

    #[inline]
    pub fn with_stats(self, stats: Arc<SiteKeyStats>) -> Self {
        self.set_stats(stats);
        self
    }

    /// Applies to checks started from now on.
    #[inline]
    pub fn set_stats(&self, stats: Arc<SiteKeyStats>) {
        self.stats.store(stats);
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set_timeout(&self, timeout: Duration) {
        self.timeout_ms
            .store(timeout.as_millis().max(1) as u64, Ordering::Relaxed);
    }

    pub fn start_page(&self, url: &str) -> Arc<PendingSiteKeyCheck> {
        let check = Arc::new(PendingSiteKeyCheck::new(
            url,
            self.timeout(),
            self.stats.load_full(),
        ));
        check.begin();
        if let Some(previous) = self.current.swap(Some(check.clone())) {
            if previous.cancel() {
                log::debug!("Cancelled site key check for {}", previous.url());
            }
        }
        check
    }

    #[inline]
    pub fn current(&self) -> Option<Arc<PendingSiteKeyCheck>> {
        self.current.load_full()
    }

    /// Waits for the current page's check if the load belongs to it. Returns
    /// the state the wait ended in, or `None` when the load was not held.
    pub fn hold(&self, url: &str, parent_frames: &[String], is_main_frame: bool) -> Option<HoldState> {
        if is_main_frame {
            return None;
        }
        let check = self.current()?;
        if check.state().is_resolved() || !check.covers(parent_frames) {
            return None;
        }
        log::debug!("Holding {} until the site key check of {} resolves", url, check.url());
        let state = check.wait();
        log::debug!("Un-holding {} ({})", url, state);
        Some(state)
    }

    /// Resolves the current check if it belongs to `url`.
    pub fn release(&self, url: &str, outcome: HoldState) -> bool {
        match self.current() {
            Some(check) if check.is_for(url) => check.resolve(outcome),
            Some(check) => {
                log::debug!("Not releasing {}: current page is {}", url, check.url());
                false
            }
            None => false,
        }
    }

    pub fn cancel(&self) -> bool {
        self.current().map_or(false, |check| check.cancel())
    }
}

impl Default for HoldGate {
    fn default() -> Self {
        Self::new(DEFAULT_HOLD_TIMEOUT)
    }
}

impl fmt::Debug for HoldGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HoldGate")
            .field("current", &self.current())
            .field("timeout", &self.timeout())
            .finish()
    }
}
