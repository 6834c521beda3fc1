use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

pub const DEFAULT_MAX_REQUESTS: u32 = 3;
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(3_600_000);

/// Time source for the limiter. Windows are evaluated lazily against it.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    fn offset(&self) -> MutexGuard<'_, Duration> {
        self.offset.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn advance(&self, by: Duration) {
        *self.offset() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset()
    }
}

// Counter state for one key. The key itself lives in the map.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at: Instant,
}

impl RateLimitEntry {
    fn opened(now: Instant, window: Duration) -> Self {
        Self {
            count: 1,
            reset_at: now + window,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitOptions {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitOptions {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    pub fn from_millis(max_requests: u32, window_ms: u64) -> Self {
        Self::new(max_requests, Duration::from_millis(window_ms))
    }
}

impl Default for RateLimitOptions {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitResult {
    pub success: bool,
}

impl RateLimitResult {
    const ADMITTED: Self = Self { success: true };
    const REJECTED: Self = Self { success: false };
}

/// Fixed-window admission limiter keyed by an opaque string.
///
/// Each key gets `max_requests` admissions per window. The window opens on
/// the first admitted call and is only re-evaluated on the next check, so a
/// caller can burst up to twice the quota across a window boundary.
///
/// State is process-local. Entries are never dropped by `check`; call
/// [`RateLimiter::purge_expired`] to reclaim keys whose window has passed.
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    pub fn check(&self, key: &str) -> RateLimitResult {
        self.check_with(key, RateLimitOptions::default())
    }

    pub fn check_with(&self, key: &str, options: RateLimitOptions) -> RateLimitResult {
        let now = self.clock.now();

        // The entry guard holds the shard lock across the read-modify-write.
        match self.entries.entry(key.to_owned()) {
            Entry::Vacant(vacant) => {
                vacant.insert(RateLimitEntry::opened(now, options.window));
                RateLimitResult::ADMITTED
            }
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();

                if now > entry.reset_at {
                    *entry = RateLimitEntry::opened(now, options.window);
                    return RateLimitResult::ADMITTED;
                }

                if entry.count >= options.max_requests {
                    return RateLimitResult::REJECTED;
                }

                entry.count += 1;
                RateLimitResult::ADMITTED
            }
        }
    }

    /// Current state for `key`, if it has ever been checked.
    pub fn entry(&self, key: &str) -> Option<RateLimitEntry> {
        self.entries.get(key).map(|e| *e.value())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reset(&self) {
        self.entries.clear();
    }

    /// Drops entries whose window has elapsed. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let live = now <= entry.reset_at;
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
