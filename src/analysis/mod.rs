// src/analysis/mod.rs
//
// Occupancy analytics core.
//
// Signal flow:
//   Tracker output (per tick) → presence_registry.observe_tick ─┬→ occupancy_report (display rows)
//                                                               ├→ TickTransitions → event bus / metrics
//                                                               └→ announce_gate (cooldown-gated lines)
//
// Orchestrated per tick by pipeline::TickPipeline.

pub mod announce_gate;
pub mod occupancy_report;
pub mod presence_registry;

// Re-exports for ergonomic access from main.rs
pub use announce_gate::AnnounceGate;
pub use occupancy_report::{OccupancyReport, RecordRow};
pub use presence_registry::{
    PresenceRecord, PresenceRegistry, TickError, TickTransitions,
};
