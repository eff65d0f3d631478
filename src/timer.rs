//! Timer scheduling behind a host-pluggable trait.
//!
//! The interaction layer never sleeps or spawns threads. Everything
//! periodic (inertial spin, fly motion, keyframe playback, the wheel
//! redraw pulse) is expressed against [`TimerService`]; the host maps
//! it onto its own event loop. [`ManualTimers`] is the bundled
//! deterministic implementation, driven by explicit
//! [`advance`](ManualTimers::advance) calls, and doubles as the test
//! clock.

use rustc_hash::FxHashMap;

/// Opaque handle to a scheduled timer. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Host-pluggable timer scheduling.
///
/// Cancellation is synchronous: after [`cancel`](Self::cancel) returns,
/// the handle never fires again.
pub trait TimerService {
    /// Schedule a timer that fires after `period_ms` milliseconds,
    /// then repeatedly every `period_ms` when `repeating`.
    fn schedule(&mut self, period_ms: f32, repeating: bool) -> TimerHandle;

    /// Cancel a timer. Unknown or already-fired handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    period_ms: f32,
    remaining_ms: f32,
    repeating: bool,
}

/// Deterministic [`TimerService`] driven by explicit time advances.
#[derive(Debug, Default)]
pub struct ManualTimers {
    entries: FxHashMap<TimerHandle, Entry>,
    next: u64,
}

impl ManualTimers {
    /// Empty service with no scheduled timers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the handle refers to a live timer.
    #[must_use]
    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Number of live timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no timers are scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advance time by `dt_ms` milliseconds and return the handles
    /// that fired, ordered by deadline (ties by schedule order). A
    /// repeating timer fires once per elapsed period; one-shot timers
    /// are removed after firing.
    pub fn advance(&mut self, dt_ms: f32) -> Vec<TimerHandle> {
        // (time of firing, handle) so interleaved repeats come out in
        // chronological order.
        let mut fired: Vec<(f32, TimerHandle)> = Vec::new();
        let mut done: Vec<TimerHandle> = Vec::new();

        for (&handle, entry) in &mut self.entries {
            let mut elapsed = dt_ms;
            while elapsed >= entry.remaining_ms {
                elapsed -= entry.remaining_ms;
                fired.push((dt_ms - elapsed, handle));
                if entry.repeating && entry.period_ms > 0.0 {
                    entry.remaining_ms = entry.period_ms;
                } else {
                    done.push(handle);
                    break;
                }
            }
            if !done.contains(&handle) {
                entry.remaining_ms -= elapsed;
            }
        }

        for handle in done {
            let _ = self.entries.remove(&handle);
            log::debug!("timer {handle:?} completed");
        }

        fired.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });
        fired.into_iter().map(|(_, handle)| handle).collect()
    }
}

impl TimerService for ManualTimers {
    fn schedule(&mut self, period_ms: f32, repeating: bool) -> TimerHandle {
        let handle = TimerHandle(self.next);
        self.next += 1;
        let period_ms = period_ms.max(0.0);
        let _ = self.entries.insert(
            handle,
            Entry {
                period_ms,
                remaining_ms: period_ms,
                repeating,
            },
        );
        log::debug!(
            "scheduled timer {handle:?}: {period_ms} ms, repeating={repeating}"
        );
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if self.entries.remove(&handle).is_some() {
            log::debug!("cancelled timer {handle:?}");
        }
    }
}
