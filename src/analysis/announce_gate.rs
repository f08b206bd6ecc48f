// src/analysis/announce_gate.rs
//
// Cooldown-gated announcement text for arrival/departure transitions.
// The cooldown is explicit per-gate state driven by the tick's monotonic
// clock, not a process-wide singleton, so two pipelines never share a
// throttle and tests need no real clock.
//
// Speech synthesis itself is a downstream collaborator; this only decides
// WHEN to say something and WHAT the line is.

use crate::analysis::presence_registry::TickTransitions;

pub struct AnnounceGate {
    cooldown_s: f64,
    last_announce_mono_s: Option<f64>,
}

impl AnnounceGate {
    pub fn new(cooldown_s: f64) -> Self {
        Self {
            cooldown_s,
            last_announce_mono_s: None,
        }
    }

    /// Offer one tick's transitions. Returns an announcement line at most
    /// once per cooldown window; quiet ticks never consume the window.
    pub fn offer(
        &mut self,
        transitions: &TickTransitions,
        present_now: usize,
        mono_now_s: f64,
    ) -> Option<String> {
        if transitions.is_quiet() {
            return None;
        }
        if let Some(last) = self.last_announce_mono_s {
            if mono_now_s - last < self.cooldown_s {
                return None;
            }
        }
        self.last_announce_mono_s = Some(mono_now_s);

        let arrived = transitions.arrived.len() + transitions.reappeared.len();
        let departed = transitions.departed.len();
        Some(format!(
            "{} in, {} out, {} visitor(s) currently in view",
            arrived, departed, present_now
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrackKey;

    fn arrivals(ids: &[i64]) -> TickTransitions {
        TickTransitions {
            arrived: ids.iter().map(|&id| TrackKey(id)).collect(),
            ..TickTransitions::default()
        }
    }

    #[test]
    fn announces_arrivals_and_current_occupancy() {
        let mut gate = AnnounceGate::new(1.0);
        let line = gate.offer(&arrivals(&[1, 2]), 2, 0.0).unwrap();
        assert_eq!(line, "2 in, 0 out, 2 visitor(s) currently in view");
    }

    #[test]
    fn suppresses_within_cooldown_and_resumes_after() {
        let mut gate = AnnounceGate::new(1.0);
        assert!(gate.offer(&arrivals(&[1]), 1, 0.0).is_some());
        assert!(gate.offer(&arrivals(&[2]), 2, 0.5).is_none());
        assert!(gate.offer(&arrivals(&[3]), 3, 0.999).is_none());
        assert!(gate.offer(&arrivals(&[4]), 4, 1.0).is_some());
    }

    #[test]
    fn quiet_ticks_produce_nothing_and_keep_the_window() {
        let mut gate = AnnounceGate::new(1.0);
        assert!(gate.offer(&arrivals(&[1]), 1, 0.0).is_some());

        // A quiet tick after the window must not reset the throttle,
        // so the next transition right after it still announces.
        assert!(gate.offer(&TickTransitions::default(), 1, 5.0).is_none());
        assert!(gate.offer(&arrivals(&[2]), 2, 5.1).is_some());
    }

    #[test]
    fn departures_alone_trigger_an_announcement() {
        let mut gate = AnnounceGate::new(1.0);
        let transitions = TickTransitions {
            departed: vec![TrackKey(1)],
            ..TickTransitions::default()
        };
        let line = gate.offer(&transitions, 0, 0.0).unwrap();
        assert_eq!(line, "0 in, 1 out, 0 visitor(s) currently in view");
    }
}
