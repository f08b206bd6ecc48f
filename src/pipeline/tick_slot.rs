// src/pipeline/tick_slot.rs
//
// Single-slot handoff between a capture thread and the tick processor.
//
// Dwell accounting is only honest when the monotonic deltas it integrates
// track real elapsed time, so buffering stale frames is worse than losing
// them: a newer tick REPLACES an unconsumed older one. Capacity is exactly
// one; overflow drops the oldest (the stale tick) and counts the drop.
//
// The replay driver feeds the pipeline directly and does not need this;
// it exists for live camera integrations that acquire frames on one
// thread and process on another.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::pipeline::tick_context::TickContext;

#[derive(Default)]
pub struct TickSlot {
    pending: Mutex<Option<TickContext>>,
    dropped: AtomicU64,
}

impl TickSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a tick. Returns true if an unconsumed older tick was
    /// replaced (and counted as dropped).
    pub fn offer(&self, ctx: TickContext) -> bool {
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let replaced = pending.replace(ctx).is_some();
        if replaced {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        replaced
    }

    /// Consume the newest pending tick, if any.
    pub fn take(&self) -> Option<TickContext> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    /// Ticks that were overwritten before the processor got to them.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
