// src/pipeline/tick_context.rs
//
// Single source of truth for one tick. Built once at the boundary and
// handed through the pipeline, so every subsystem sees the same clocks
// and the same normalized identity set.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::analysis::presence_registry::TickError;
use crate::track_log::RawTick;
use crate::types::{PersonDetection, ReplayConfig, TrackKey};

#[derive(Debug, Clone)]
pub struct TickContext {
    pub tick_id: u64,
    pub wall: DateTime<Utc>,
    pub mono_s: f64,
    /// Person-class detections that passed the confidence filter. Boxes are
    /// carried for the rendering path; presence bookkeeping reads only keys.
    pub detections: Vec<PersonDetection>,
    /// Normalized present-identity set, deduplicated, first-occurrence order.
    pub present: Vec<TrackKey>,
}

impl TickContext {
    /// Normalize one recorded tick. Rejects ticks whose timestamps cannot
    /// be represented; skips (with a warning) individual tracks whose
    /// labels are non-finite or whose class/confidence fail the filter.
    pub fn from_raw(raw: RawTick, config: &ReplayConfig) -> Result<Self, TickError> {
        if !raw.mono_s.is_finite() || raw.mono_s < 0.0 {
            return Err(TickError::InvalidMonoClock { mono_s: raw.mono_s });
        }
        let wall = wall_from_epoch(raw.epoch_s)
            .ok_or(TickError::InvalidWallClock { epoch_s: raw.epoch_s })?;

        let mut detections = Vec::with_capacity(raw.tracks.len());
        let mut present = Vec::with_capacity(raw.tracks.len());
        for track in &raw.tracks {
            if !config.person_class_ids.contains(&track.class_id) {
                continue;
            }
            if track.confidence < config.min_confidence {
                continue;
            }
            let Some(key) = TrackKey::from_label(track.id) else {
                warn!(
                    "Tick {}: dropping track with unusable label {}",
                    raw.frame_id, track.id
                );
                continue;
            };
            detections.push(PersonDetection {
                key,
                bbox: track.bbox,
                confidence: track.confidence,
            });
            if !present.contains(&key) {
                present.push(key);
            }
        }

        Ok(Self {
            tick_id: raw.frame_id,
            wall,
            mono_s: raw.mono_s,
            detections,
            present,
        })
    }
}

fn wall_from_epoch(epoch_s: f64) -> Option<DateTime<Utc>> {
    if !epoch_s.is_finite() || epoch_s < 0.0 {
        return None;
    }
    let secs = epoch_s.trunc() as i64;
    let nanos = (epoch_s.fract() * 1e9) as u32;
    DateTime::from_timestamp(secs, nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track_log::RawTrack;

    fn config() -> ReplayConfig {
        ReplayConfig {
            input_dir: "track_logs".to_string(),
            person_class_ids: vec![0],
            min_confidence: 0.25,
        }
    }

    fn track(id: f64, class_id: u32, confidence: f32) -> RawTrack {
        RawTrack {
            id,
            bbox: [10.0, 20.0, 110.0, 320.0],
            confidence,
            class_id,
        }
    }

    fn raw(tracks: Vec<RawTrack>) -> RawTick {
        RawTick {
            frame_id: 42,
            epoch_s: 1_754_286_301.5,
            mono_s: 13.733,
            tracks,
        }
    }

    #[test]
    fn normalizes_float_labels_and_dedupes() {
        let ctx = TickContext::from_raw(
            raw(vec![
                track(7.0, 0, 0.9),
                track(7.0001, 0, 0.8), // same identity after rounding
                track(3.0, 0, 0.9),
            ]),
            &config(),
        )
        .unwrap();

        assert_eq!(ctx.present, vec![TrackKey(7), TrackKey(3)]);
        assert_eq!(ctx.detections.len(), 3);
    }

    #[test]
    fn filters_non_person_classes_and_low_confidence() {
        let ctx = TickContext::from_raw(
            raw(vec![
                track(1.0, 0, 0.9),
                track(2.0, 2, 0.9),  // a car, not a person
                track(3.0, 0, 0.1),  // below threshold
            ]),
            &config(),
        )
        .unwrap();

        assert_eq!(ctx.present, vec![TrackKey(1)]);
    }

    #[test]
    fn skips_tracks_with_non_finite_labels() {
        let ctx = TickContext::from_raw(
            raw(vec![track(f64::NAN, 0, 0.9), track(2.0, 0, 0.9)]),
            &config(),
        )
        .unwrap();

        assert_eq!(ctx.present, vec![TrackKey(2)]);
    }

    #[test]
    fn rejects_non_finite_mono() {
        let mut bad = raw(vec![]);
        bad.mono_s = f64::INFINITY;
        let err = TickContext::from_raw(bad, &config());
        assert!(matches!(err, Err(TickError::InvalidMonoClock { .. })));
    }

    #[test]
    fn rejects_unrepresentable_epoch() {
        let mut bad = raw(vec![]);
        bad.epoch_s = -1.0;
        assert!(matches!(
            TickContext::from_raw(bad, &config()),
            Err(TickError::InvalidWallClock { .. })
        ));

        let mut bad = raw(vec![]);
        bad.epoch_s = f64::NAN;
        assert!(matches!(
            TickContext::from_raw(bad, &config()),
            Err(TickError::InvalidWallClock { .. })
        ));
    }

    #[test]
    fn wall_clock_keeps_subsecond_precision() {
        let ctx = TickContext::from_raw(raw(vec![]), &config()).unwrap();
        assert_eq!(ctx.wall.timestamp(), 1_754_286_301);
        assert_eq!(ctx.wall.timestamp_subsec_millis(), 500);
    }
}
