use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub replay: ReplayConfig,
    pub registry: RegistryConfig,
    pub report: ReportConfig,
    pub announce: AnnounceConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    pub input_dir: String,
    pub person_class_ids: Vec<u32>,
    pub min_confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Departed records older than this (seconds since exit) are evicted
    /// at tick boundaries. Absent/null keeps every record for the whole run.
    #[serde(default)]
    pub evict_departed_after_s: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub recent_count: usize,
    pub utc_offset_hours: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnounceConfig {
    pub enabled: bool,
    pub cooldown_s: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Stable identity key for one tracked person.
///
/// Trackers emit floating-point track labels; comparing those by float
/// equality is how identities get silently split. Labels are rounded to
/// an integer key once, at the boundary, and only the key is used after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackKey(pub i64);

impl TrackKey {
    /// Normalize a raw tracker label. Non-finite labels have no usable key.
    pub fn from_label(label: f64) -> Option<Self> {
        if label.is_finite() {
            Some(Self(label.round() as i64))
        } else {
            None
        }
    }
}

impl fmt::Display for TrackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One person detection after boundary normalization. The bbox belongs to
/// the rendering path and is never consulted by the presence bookkeeping.
#[derive(Debug, Clone)]
pub struct PersonDetection {
    pub key: TrackKey,
    pub bbox: [f32; 4], // [x1, y1, x2, y2] pixels
    pub confidence: f32,
}
