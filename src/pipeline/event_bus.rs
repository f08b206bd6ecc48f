// src/pipeline/event_bus.rs
//
// Decoupled event system. The registry reports transitions; downstream
// consumers (notification, rendering, announcements) read them from here
// instead of reaching into registry state.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use tracing::warn;

use crate::types::TrackKey;

#[derive(Debug, Clone)]
pub enum PresenceEvent {
    PersonArrived {
        key: TrackKey,
        at: DateTime<Utc>,
        tick_id: u64,
    },

    PersonReappeared {
        key: TrackKey,
        tick_id: u64,
    },

    PersonDeparted {
        key: TrackKey,
        at: DateTime<Utc>,
        /// Dwell accumulated up to the departure.
        stay_s: f64,
        tick_id: u64,
    },
}

pub struct EventBus {
    events: VecDeque<PresenceEvent>,
    max_pending: usize,
}

impl EventBus {
    pub fn new(max_pending: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_pending),
            max_pending,
        }
    }

    pub fn publish(&mut self, event: PresenceEvent) {
        if self.events.len() >= self.max_pending {
            warn!(
                "Event bus full ({} events), dropping oldest",
                self.max_pending
            );
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<PresenceEvent> {
        self.events.drain(..).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.events.len()
    }
}
