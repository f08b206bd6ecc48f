// src/pipeline/orchestrator.rs
//
// Per-tick wiring: registry → events → metrics → announcements, in a
// fixed order. One call to process() runs one tick to completion across
// every present and absent identity before the next tick is accepted;
// the registry assumes serialized access and does no locking of its own.

use tracing::{info, warn};

use crate::analysis::announce_gate::AnnounceGate;
use crate::analysis::presence_registry::{PresenceRegistry, TickError, TickTransitions};
use crate::pipeline::event_bus::{EventBus, PresenceEvent};
use crate::pipeline::metrics::PipelineMetrics;
use crate::pipeline::tick_context::TickContext;
use crate::types::Config;

/// Pending events kept for a slow downstream consumer before the oldest
/// are dropped.
const MAX_PENDING_EVENTS: usize = 256;

pub struct TickPipeline {
    registry: PresenceRegistry,
    bus: EventBus,
    metrics: PipelineMetrics,
    gate: Option<AnnounceGate>,
}

impl TickPipeline {
    pub fn new(config: &Config) -> Self {
        let gate = config
            .announce
            .enabled
            .then(|| AnnounceGate::new(config.announce.cooldown_s));
        Self {
            registry: PresenceRegistry::new(config.registry.clone()),
            bus: EventBus::new(MAX_PENDING_EVENTS),
            metrics: PipelineMetrics::new(),
            gate,
        }
    }

    /// Apply one tick end-to-end. A rejected tick leaves the registry
    /// untouched, is counted, and the error is handed back to the caller.
    pub fn process(&mut self, ctx: &TickContext) -> Result<TickTransitions, TickError> {
        let transitions = match self.registry.observe_tick(&ctx.present, ctx.wall, ctx.mono_s) {
            Ok(transitions) => transitions,
            Err(err) => {
                self.record_rejected(&err, ctx.tick_id);
                return Err(err);
            }
        };
        self.metrics.inc(&self.metrics.ticks_processed);

        for &key in &transitions.arrived {
            self.metrics.inc(&self.metrics.arrivals);
            self.bus.publish(PresenceEvent::PersonArrived {
                key,
                at: ctx.wall,
                tick_id: ctx.tick_id,
            });
        }
        for &key in &transitions.reappeared {
            self.metrics.inc(&self.metrics.reappearances);
            self.bus.publish(PresenceEvent::PersonReappeared {
                key,
                tick_id: ctx.tick_id,
            });
        }
        for &key in &transitions.departed {
            self.metrics.inc(&self.metrics.departures);
            let stay_s = self.registry.get(key).map(|r| r.stay_s).unwrap_or(0.0);
            self.bus.publish(PresenceEvent::PersonDeparted {
                key,
                at: ctx.wall,
                stay_s,
                tick_id: ctx.tick_id,
            });
        }
        if transitions.evicted > 0 {
            self.metrics
                .add(&self.metrics.evictions, transitions.evicted as u64);
        }

        let present_now = self.registry.present_count();
        self.metrics.note_present(present_now);

        if let Some(gate) = &mut self.gate {
            if let Some(line) = gate.offer(&transitions, present_now, ctx.mono_s) {
                info!("📢 {}", line);
            }
        }

        Ok(transitions)
    }

    /// Count a tick that never made it into the registry (either rejected
    /// there or already unrepresentable at the source boundary).
    pub fn record_rejected(&self, err: &TickError, tick_id: u64) {
        self.metrics.inc(&self.metrics.ticks_rejected);
        warn!("Tick {} rejected, registry unchanged: {}", tick_id, err);
    }

    pub fn registry(&self) -> &PresenceRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    pub fn drain_events(&mut self) -> Vec<PresenceEvent> {
        self.bus.drain()
    }
}
