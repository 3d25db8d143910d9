//! Fixed-window rate limiting keyed by client IP.
//!
//! Each key gets a counter and a reset time. The first hit after the reset
//! time opens a new window. A client can therefore land `max` requests just
//! before a boundary and `max` more just after it.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderMap;
use parking_lot::Mutex;

/// Source of wall-clock time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub window_ms: i64,
    pub max_requests: u32,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            window_ms: 900_000,
            max_requests: 5,
        }
    }
}

/// Outcome of a single hit against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Denied; the window resets in this many milliseconds.
    Deny { retry_after_ms: i64 },
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_time_ms: i64,
}

/// Counter storage behind the limiter.
pub trait RateLimitStore: Send + Sync {
    fn hit(&self, key: &str, now_ms: i64, policy: &RateLimitPolicy) -> Decision;

    /// Drop entries whose window has ended. Returns how many were removed.
    fn sweep(&self, now_ms: i64) -> usize;
}

/// Process-local store. Counts reset when the process restarts.
#[derive(Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, key: &str) -> Option<RateLimitEntry> {
        self.entries.lock().get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RateLimitStore for InMemoryStore {
    fn hit(&self, key: &str, now_ms: i64, policy: &RateLimitPolicy) -> Decision {
        let mut entries = self.entries.lock();

        match entries.get_mut(key) {
            Some(entry) if now_ms <= entry.reset_time_ms => {
                if entry.count >= policy.max_requests {
                    return Decision::Deny {
                        retry_after_ms: entry.reset_time_ms - now_ms,
                    };
                }
                entry.count += 1;
                Decision::Allow
            }
            _ => {
                entries.insert(
                    key.to_string(),
                    RateLimitEntry {
                        count: 1,
                        reset_time_ms: now_ms.saturating_add(policy.window_ms),
                    },
                );
                Decision::Allow
            }
        }
    }

    fn sweep(&self, now_ms: i64) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| now_ms <= entry.reset_time_ms);
        before - entries.len()
    }
}

/// Rate limiter shared by the form handlers.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
    policy: RateLimitPolicy,
}

impl RateLimiter {
    pub fn new(
        store: Arc<dyn RateLimitStore>,
        clock: Arc<dyn Clock>,
        policy: RateLimitPolicy,
    ) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    /// In-memory limiter on the system clock.
    pub fn in_memory(policy: RateLimitPolicy) -> Self {
        Self::new(Arc::new(InMemoryStore::new()), Arc::new(SystemClock), policy)
    }

    pub fn check(&self, ip: &str) -> Decision {
        self.store.hit(ip, self.clock.now_ms(), &self.policy)
    }

    pub fn allow(&self, ip: &str) -> bool {
        self.check(ip).is_allowed()
    }

    pub fn sweep(&self) -> usize {
        self.store.sweep(self.clock.now_ms())
    }
}

/// Resolve the client IP: first `x-forwarded-for` value, then the socket
/// peer address, then the shared `"unknown"` bucket.
pub fn client_ip(headers: &HeaderMap, remote: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match (forwarded, remote) {
        (Some(ip), _) => ip.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}
