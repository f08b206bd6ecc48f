// src/analysis/presence_registry.rs
//
// Presence and dwell-time bookkeeping for tracked visitors.
//
// One record per tracker identity: when the person first appeared (wall
// clock), how long they have actually been visible (monotonic deltas),
// and when they dropped out of frame. The registry owns all of this
// state; callers feed it one tick at a time and read summaries back.
//
// Dwell is integrated ONLY across ticks where the identity is present.
// On reappearance after an absence the monotonic baseline is re-anchored,
// so the absence interval is never credited as stay time. A naive
// "integrate from last update" resume would silently count every gap.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::types::{RegistryConfig, TrackKey};

/// A tick that cannot be applied. The registry is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TickError {
    #[error("monotonic tick time must be finite and non-negative, got {mono_s}")]
    InvalidMonoClock { mono_s: f64 },
    #[error("wall-clock tick time {epoch_s} cannot be represented")]
    InvalidWallClock { epoch_s: f64 },
}

/// Bookkeeping for a single tracked identity.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceRecord {
    pub key: TrackKey,
    /// Wall-clock instant of first observation. Never changes afterwards.
    pub entry_wall: DateTime<Utc>,
    /// Cumulative visible time in seconds. Never decreases.
    pub stay_s: f64,
    /// None while the identity was present in the latest applied tick.
    pub exit_wall: Option<DateTime<Utc>>,
    /// Monotonic baseline of the most recent accumulation step. Used only
    /// for delta computation, never displayed.
    last_seen_mono_s: f64,
}

impl PresenceRecord {
    fn new(key: TrackKey, wall_now: DateTime<Utc>, mono_now_s: f64) -> Self {
        Self {
            key,
            entry_wall: wall_now,
            stay_s: 0.0,
            exit_wall: None,
            last_seen_mono_s: mono_now_s,
        }
    }

    pub fn is_present(&self) -> bool {
        self.exit_wall.is_none()
    }

    /// Add the elapsed monotonic interval since the last accumulation step.
    /// Must only run for identities present in the current tick. A backwards
    /// clock reading clamps to zero so accrual stalls instead of going negative.
    fn accumulate(&mut self, mono_now_s: f64) {
        let delta = mono_now_s - self.last_seen_mono_s;
        if delta < 0.0 {
            warn!(
                "⏪ Monotonic clock went backwards for {} ({:.3}s → {:.3}s), stalling dwell",
                self.key, self.last_seen_mono_s, mono_now_s
            );
        }
        self.stay_s += delta.max(0.0);
        self.last_seen_mono_s = mono_now_s;
    }
}

/// State changes produced by one applied tick, for downstream notification.
#[derive(Debug, Clone, Default)]
pub struct TickTransitions {
    /// Identities observed for the first time this tick, in observation order.
    pub arrived: Vec<TrackKey>,
    /// Previously departed identities that came back this tick.
    pub reappeared: Vec<TrackKey>,
    /// Identities that dropped out of the frame this tick, in first-seen order.
    pub departed: Vec<TrackKey>,
    /// Departed records dropped by the retention sweep this tick.
    pub evicted: usize,
}

impl TickTransitions {
    pub fn is_quiet(&self) -> bool {
        self.arrived.is_empty() && self.reappeared.is_empty() && self.departed.is_empty()
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Identity → presence record mapping, insertion-ordered by first sighting.
pub struct PresenceRegistry {
    config: RegistryConfig,
    records: Vec<PresenceRecord>,
    total_count: u64,
}

impl PresenceRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            records: Vec::with_capacity(32),
            total_count: 0,
        }
    }

    /// Apply one tick: the set of currently visible identities plus the
    /// tick's wall-clock and monotonic instants.
    ///
    /// `present` is treated as a set: duplicate keys are processed once.
    /// An empty slice is an ordinary tick meaning "nobody visible": every
    /// present identity departs and nothing accumulates.
    pub fn observe_tick(
        &mut self,
        present: &[TrackKey],
        wall_now: DateTime<Utc>,
        mono_now_s: f64,
    ) -> Result<TickTransitions, TickError> {
        if !mono_now_s.is_finite() || mono_now_s < 0.0 {
            return Err(TickError::InvalidMonoClock { mono_s: mono_now_s });
        }

        let mut out = TickTransitions::default();
        let mut handled: HashSet<TrackKey> = HashSet::with_capacity(present.len());

        // ── Present identities: create, reappear, or accumulate ──
        for &key in present {
            if !handled.insert(key) {
                continue;
            }
            match self.records.iter().position(|r| r.key == key) {
                None => {
                    self.records
                        .push(PresenceRecord::new(key, wall_now, mono_now_s));
                    self.total_count += 1;
                    out.arrived.push(key);
                    info!(
                        "🆕 Visitor {} entered (distinct visitors so far: {})",
                        key, self.total_count
                    );
                }
                Some(idx) => {
                    let record = &mut self.records[idx];
                    if record.exit_wall.is_some() {
                        // Back in frame. Clear the exit mark and re-anchor the
                        // baseline. The absence interval is not dwell time.
                        record.exit_wall = None;
                        record.last_seen_mono_s = mono_now_s;
                        out.reappeared.push(key);
                        debug!(
                            "Visitor {} reappeared, dwell resumes at {:.1}s",
                            key, record.stay_s
                        );
                    } else {
                        record.accumulate(mono_now_s);
                    }
                }
            }
        }

        // ── Tracked identities missing from this tick: mark departure ──
        for record in &mut self.records {
            if record.exit_wall.is_none() && !handled.contains(&record.key) {
                record.exit_wall = Some(wall_now);
                out.departed.push(record.key);
                info!(
                    "🚪 Visitor {} left after {:.1}s in frame",
                    record.key, record.stay_s
                );
            }
        }

        out.evicted = self.sweep_departed(wall_now);
        Ok(out)
    }

    /// Drop departed records whose exit is older than the retention window.
    /// Runs at tick boundaries only; amortized, no background task.
    fn sweep_departed(&mut self, wall_now: DateTime<Utc>) -> usize {
        let Some(window_s) = self.config.evict_departed_after_s else {
            return 0;
        };
        let before = self.records.len();
        self.records.retain(|record| match record.exit_wall {
            None => true,
            Some(exit) => {
                let age_s = (wall_now - exit).num_milliseconds() as f64 / 1000.0;
                if age_s > window_s {
                    debug!(
                        "🗑️  Evicting visitor {} (departed {:.0}s ago, window {:.0}s)",
                        record.key, age_s, window_s
                    );
                    false
                } else {
                    true
                }
            }
        });
        before - self.records.len()
    }

    /// All surviving records, in first-seen order.
    pub fn records(&self) -> &[PresenceRecord] {
        &self.records
    }

    pub fn get(&self, key: TrackKey) -> Option<&PresenceRecord> {
        self.records.iter().find(|r| r.key == key)
    }

    /// Distinct identities ever observed. Monotonic: eviction and departure
    /// never decrement it.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Identities present in the latest applied tick.
    pub fn present_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_present()).count()
    }
}
