//! telemetry/snapshot.rs
//! Immutable per-request telemetry.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::process::ProcessRun;
use crate::telemetry::counters::DiffCounters;
use crate::telemetry::timers::{StageTimes, TelemetryTimer};
use crate::utils::kib_to_mib;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub chunks: u64,
    pub bytes_compared: u64,
    pub bytes_written: u64,
    pub bytes_differing: u64,
    pub throughput_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
    /// Peak resident memory of external helpers, KiB (0 if never sampled).
    pub external_peak_rss_kb: u64,
    pub external_peak_mb: f64,
    pub external_samples: u32,
    pub finished_at: DateTime<Utc>,
}

impl TelemetrySnapshot {
    pub fn from(counters: &DiffCounters, timer: &TelemetryTimer) -> Self {
        let elapsed = timer.elapsed();

        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_compared() as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            chunks: counters.chunks,
            bytes_compared: counters.bytes_compared(),
            bytes_written: counters.bytes_written,
            bytes_differing: counters.bytes_differing,
            throughput_bytes_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
            external_peak_rss_kb: 0,
            external_peak_mb: 0.0,
            external_samples: 0,
            finished_at: Utc::now(),
        }
    }

    /// Fold an external run into the snapshot; keeps the highest peak seen.
    pub fn record_external(&mut self, run: &ProcessRun) {
        self.external_peak_rss_kb = self.external_peak_rss_kb.max(run.peak_rss_kb);
        self.external_peak_mb = kib_to_mib(self.external_peak_rss_kb);
        self.external_samples += run.samples;
    }

    pub fn total_stage_time(&self) -> Duration {
        self.stage_times.total()
    }

    /// Stage times never exceed elapsed; written bytes never exceed compared bytes.
    pub fn sanity_check(&self) -> bool {
        self.total_stage_time() <= self.elapsed
            && self.bytes_written <= self.bytes_compared
            && self.bytes_differing <= self.bytes_written
    }
}
