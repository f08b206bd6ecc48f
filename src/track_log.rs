// src/track_log.rs
//
// Recorded tracker-output replay. Detection and tracking live in an
// external collaborator; this repo consumes its per-frame output recorded
// as JSONL, one tick per line, carrying the frame's tracked boxes plus
// the tick's wall-clock (epoch seconds) and monotonic instants:
//
//   {"frame_id": 412, "epoch_s": 1754286301.442, "mono_s": 13.733,
//    "tracks": [{"id": 7.0, "bbox": [412.0, 180.0, 520.0, 470.0],
//                "confidence": 0.88, "class_id": 0}]}

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// One tracked box exactly as the tracker reported it, pre-normalization.
/// Track labels arrive as JSON numbers and may be floats.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTrack {
    pub id: f64,
    pub bbox: [f32; 4],
    #[serde(default = "default_confidence")]
    pub confidence: f32,
    #[serde(default)]
    pub class_id: u32,
}

fn default_confidence() -> f32 {
    1.0
}

/// One recorded tick: tracker output for one frame plus its two clocks.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTick {
    pub frame_id: u64,
    pub epoch_s: f64,
    pub mono_s: f64,
    #[serde(default)]
    pub tracks: Vec<RawTrack>,
}

pub fn find_log_files(input_dir: &str) -> Result<Vec<PathBuf>> {
    let mut logs = Vec::new();

    for entry in WalkDir::new(input_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if let Some(ext) = path.extension() {
            if matches!(ext.to_str(), Some("jsonl") | Some("JSONL")) {
                logs.push(path.to_path_buf());
            }
        }
    }

    // Deterministic replay order regardless of directory walk order.
    logs.sort();
    info!("Found {} track log file(s)", logs.len());
    Ok(logs)
}

/// Streaming reader over one track log. Malformed lines are skipped with
/// a warning and counted; I/O errors end the replay.
pub struct LogTicks<R> {
    reader: R,
    line: String,
    line_no: u64,
    skipped: u64,
}

impl LogTicks<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("opening track log {}", path.display()))?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> LogTicks<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_no: 0,
            skipped: 0,
        }
    }

    pub fn next_tick(&mut self) -> Result<Option<RawTick>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<RawTick>(trimmed) {
                Ok(tick) => return Ok(Some(tick)),
                Err(err) => {
                    self.skipped += 1;
                    warn!("Skipping malformed track-log line {}: {}", self.line_no, err);
                }
            }
        }
    }

    pub fn skipped_lines(&self) -> u64 {
        self.skipped
    }
}
