//! Per-sender command cooldowns.
//!
//! Each (sender, qualified command) pair remembers the instant of its last
//! successful invocation. A dispatch reserves the slot before parsing so two
//! concurrent invocations by the same sender cannot both pass the check; the
//! reservation becomes a new window only when the handler succeeds.
//!
//! # Architecture
//!
//! Slots live in a `DashMap`; every check-and-reserve runs under that key's
//! entry lock. Time comes from a [`Clock`] so tests can move it by hand.

use crate::sender::SenderId;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Source of the current instant.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// The monotonic system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CooldownKey {
    sender: SenderId,
    command: String,
}

impl CooldownKey {
    fn new(sender: SenderId, command: &str) -> Self {
        Self {
            sender,
            command: command.to_lowercase(),
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    last: Option<Instant>,
    window: Duration,
    /// A dispatch holds a permit for this key.
    in_flight: bool,
}

impl Slot {
    fn remaining(&self, window: Duration, now: Instant) -> Duration {
        match self.last {
            Some(last) => window.saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }
}

struct Inner {
    entries: DashMap<CooldownKey, Slot>,
    clock: Arc<dyn Clock>,
}

/// Thread-safe cooldown tracker. Cloning shares the underlying state.
#[derive(Clone)]
pub struct CooldownTracker {
    inner: Arc<Inner>,
}

impl fmt::Debug for CooldownTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CooldownTracker")
            .field("entries", &self.inner.entries.len())
            .finish()
    }
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl CooldownTracker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: DashMap::new(),
                clock,
            }),
        }
    }

    fn now(&self) -> Instant {
        self.inner.clock.now()
    }

    /// Time left before `sender` may run `command` again. Zero when no
    /// invocation was recorded or the window has passed.
    pub fn remaining(&self, sender: SenderId, command: &str, window: Duration) -> Duration {
        let key = CooldownKey::new(sender, command);
        self.inner
            .entries
            .get(&key)
            .map(|slot| slot.remaining(window, self.now()))
            .unwrap_or(Duration::ZERO)
    }

    /// Check the cooldown and reserve the slot in one step.
    ///
    /// On rejection returns the time left; a slot reserved by another
    /// in-flight dispatch reports the full window.
    pub fn try_acquire(
        &self,
        sender: SenderId,
        command: &str,
        window: Duration,
    ) -> Result<CooldownPermit, Duration> {
        let key = CooldownKey::new(sender, command);
        let now = self.now();
        {
            let mut slot = self.inner.entries.entry(key.clone()).or_default();
            if slot.in_flight {
                debug!(sender = %sender, command, "cooldown slot already reserved");
                return Err(window);
            }
            let remaining = slot.remaining(window, now);
            if !remaining.is_zero() {
                debug!(sender = %sender, command, ?remaining, "cooldown active");
                return Err(remaining);
            }
            slot.in_flight = true;
            slot.window = window;
        }
        Ok(CooldownPermit {
            tracker: self.clone(),
            key: Some(key),
        })
    }

    /// Record a successful invocation now.
    pub fn record(&self, sender: SenderId, command: &str, window: Duration) {
        let key = CooldownKey::new(sender, command);
        let now = self.now();
        let mut slot = self.inner.entries.entry(key).or_default();
        slot.last = Some(slot.last.map_or(now, |last| last.max(now)));
        slot.window = window;
    }

    /// Forget the window of one sender/command pair. Returns whether a
    /// window was recorded.
    ///
    /// A slot reserved by an in-flight dispatch stays in place with its
    /// reservation; only its recorded window is dropped.
    pub fn clear(&self, sender: SenderId, command: &str) -> bool {
        let key = CooldownKey::new(sender, command);
        if let Some((_, slot)) = self.inner.entries.remove_if(&key, |_, slot| !slot.in_flight) {
            return slot.last.is_some();
        }
        self.inner
            .entries
            .get_mut(&key)
            .is_some_and(|mut slot| slot.last.take().is_some())
    }

    /// Forget every entry of a sender, e.g. when it disconnects.
    pub fn clear_sender(&self, sender: SenderId) -> usize {
        let mut removed = 0;
        self.inner.entries.retain(|key, slot| {
            let keep = key.sender != sender || slot.in_flight;
            if !keep {
                removed += 1;
            }
            keep
        });
        if removed > 0 {
            debug!(sender = %sender, removed, "cleared sender cooldowns");
        }
        removed
    }

    /// Drop entries whose window has passed.
    pub fn purge_expired(&self) -> usize {
        let now = self.now();
        let mut removed = 0;
        self.inner.entries.retain(|_, slot| {
            let keep = slot.in_flight || !slot.remaining(slot.window, now).is_zero();
            if !keep {
                removed += 1;
            }
            keep
        });
        if removed > 0 {
            debug!(removed, "purged expired cooldowns");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    fn finish(&self, key: &CooldownKey, success: bool) {
        let now = self.now();
        if success {
            if let Some(mut slot) = self.inner.entries.get_mut(key) {
                slot.in_flight = false;
                slot.last = Some(now);
            }
        } else {
            if let Some(mut slot) = self.inner.entries.get_mut(key) {
                slot.in_flight = false;
            }
            self.inner
                .entries
                .remove_if(key, |_, slot| !slot.in_flight && slot.last.is_none());
        }
    }
}

/// A reserved cooldown slot.
///
/// [`commit`](Self::commit) starts a new window; dropping the permit
/// releases the reservation and leaves the previous window untouched.
#[must_use = "dropping the permit releases the reservation"]
pub struct CooldownPermit {
    tracker: CooldownTracker,
    key: Option<CooldownKey>,
}

impl CooldownPermit {
    pub fn commit(mut self) {
        if let Some(key) = self.key.take() {
            self.tracker.finish(&key, true);
        }
    }
}

impl Drop for CooldownPermit {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.tracker.finish(&key, false);
        }
    }
}

impl fmt::Debug for CooldownPermit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CooldownPermit")
            .field("key", &self.key)
            .finish()
    }
}
