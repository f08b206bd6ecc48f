// src/analysis/occupancy_report.rs
//
// Read-only summary view over the presence registry, shaped for display:
// total distinct visitors plus the most recent records as formatted rows.
// Timezone localization happens here and only here; the registry stores
// zone-agnostic UTC instants.

use chrono::FixedOffset;

use crate::analysis::presence_registry::{PresenceRecord, PresenceRegistry};
use crate::types::TrackKey;

pub struct OccupancyReport<'a> {
    registry: &'a PresenceRegistry,
    display_offset: FixedOffset,
}

/// One display row: `ID:7 | In:14:25:01 | Out:14:26:40 | Stay:12.3s`
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRow {
    pub key: TrackKey,
    pub entry: String,
    pub exit: String,
    pub stay: String,
}

impl RecordRow {
    fn from_record(record: &PresenceRecord, offset: &FixedOffset) -> Self {
        Self {
            key: record.key,
            entry: record
                .entry_wall
                .with_timezone(offset)
                .format("%H:%M:%S")
                .to_string(),
            exit: match record.exit_wall {
                Some(exit) => exit.with_timezone(offset).format("%H:%M:%S").to_string(),
                None => "-".to_string(),
            },
            stay: format!("{:.1}s", record.stay_s),
        }
    }

    pub fn line(&self) -> String {
        format!(
            "ID:{} | In:{} | Out:{} | Stay:{}",
            self.key, self.entry, self.exit, self.stay
        )
    }
}

impl<'a> OccupancyReport<'a> {
    pub fn new(registry: &'a PresenceRegistry, utc_offset_hours: i32) -> Self {
        let display_offset = FixedOffset::east_opt(utc_offset_hours * 3600)
            .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap());
        Self {
            registry,
            display_offset,
        }
    }

    /// Distinct identities ever observed over the run.
    pub fn total_count(&self) -> u64 {
        self.registry.total_count()
    }

    /// The `n` most-recently-first-seen records, first-seen order preserved.
    pub fn recent(&self, n: usize) -> Vec<RecordRow> {
        let records = self.registry.records();
        let skip = records.len().saturating_sub(n);
        records
            .iter()
            .skip(skip)
            .map(|record| RecordRow::from_record(record, &self.display_offset))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RegistryConfig;
    use chrono::{DateTime, TimeZone, Utc};

    fn wall(offset_s: i64) -> DateTime<Utc> {
        // 2026-08-04 05:00:00 UTC == 12:00:00 at UTC+7
        Utc.timestamp_opt(1_785_819_600 + offset_s, 0).unwrap()
    }

    fn registry_with(ids: &[i64]) -> PresenceRegistry {
        let mut reg = PresenceRegistry::new(RegistryConfig {
            evict_departed_after_s: None,
        });
        for (i, &id) in ids.iter().enumerate() {
            // Stagger arrivals so first-seen order is unambiguous.
            let present: Vec<TrackKey> = ids[..=i].iter().map(|&x| TrackKey(x)).collect();
            reg.observe_tick(&present, wall(i as i64), i as f64).unwrap();
        }
        reg
    }

    #[test]
    fn recent_returns_latest_five_of_seven_in_first_seen_order() {
        let reg = registry_with(&[1, 2, 3, 4, 5, 6, 7]);
        let report = OccupancyReport::new(&reg, 7);

        let keys: Vec<TrackKey> = report.recent(5).iter().map(|row| row.key).collect();
        assert_eq!(
            keys,
            vec![TrackKey(3), TrackKey(4), TrackKey(5), TrackKey(6), TrackKey(7)]
        );
    }

    #[test]
    fn recent_with_fewer_records_than_requested_returns_all() {
        let reg = registry_with(&[1, 2]);
        let report = OccupancyReport::new(&reg, 7);
        assert_eq!(report.recent(5).len(), 2);
    }

    #[test]
    fn entry_time_is_localized_to_the_configured_offset() {
        let reg = registry_with(&[1]);
        let report = OccupancyReport::new(&reg, 7);

        let rows = report.recent(5);
        assert_eq!(rows[0].entry, "12:00:00");

        let utc_report = OccupancyReport::new(&reg, 0);
        assert_eq!(utc_report.recent(5)[0].entry, "05:00:00");
    }

    #[test]
    fn present_visitor_shows_dash_for_exit() {
        let reg = registry_with(&[1]);
        let report = OccupancyReport::new(&reg, 7);
        assert_eq!(report.recent(5)[0].exit, "-");
    }

    #[test]
    fn departed_visitor_shows_localized_exit_and_rounded_stay() {
        let mut reg = PresenceRegistry::new(RegistryConfig {
            evict_departed_after_s: None,
        });
        reg.observe_tick(&[TrackKey(9)], wall(0), 0.0).unwrap();
        reg.observe_tick(&[TrackKey(9)], wall(12), 12.34).unwrap();
        reg.observe_tick(&[], wall(15), 15.0).unwrap();

        let report = OccupancyReport::new(&reg, 7);
        let row = &report.recent(5)[0];
        assert_eq!(row.exit, "12:00:15");
        assert_eq!(row.stay, "12.3s");
        assert_eq!(row.line(), "ID:9 | In:12:00:00 | Out:12:00:15 | Stay:12.3s");
    }

    #[test]
    fn total_count_passes_through() {
        let reg = registry_with(&[1, 2, 3]);
        let report = OccupancyReport::new(&reg, 7);
        assert_eq!(report.total_count(), 3);
    }
}
