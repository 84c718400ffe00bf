//! Lock-free counters for a CLI run
//!
//! The parsers never touch these; the CLI records after each call and
//! logs one summary line at the end of the run.
//!
//! NOTE: All atomics use Relaxed ordering. These are statistical counters
//! only and must not drive any logic.

use crate::domain::{MrzFormat, MrzRecord, StayResolution};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Parse latency bucket boundaries (microseconds)
/// Buckets: ≤10, ≤20, ≤50, ≤100, ≤200, ≤500, ≤1000, >1000
const BUCKET_BOUNDS: [u64; 7] = [10, 20, 50, 100, 200, 500, 1000];
const NUM_BUCKETS: usize = 8;

/// Upper bounds used when reading percentiles (last bucket doubles the previous bound)
const BUCKET_UPPER_BOUNDS: [u64; NUM_BUCKETS] = [10, 20, 50, 100, 200, 500, 1000, 2000];

#[inline]
fn bucket_index(latency_us: u64) -> usize {
    BUCKET_BOUNDS.partition_point(|&bound| bound < latency_us)
}

#[inline]
fn swap_buckets(buckets: &[AtomicU64; NUM_BUCKETS]) -> [u64; NUM_BUCKETS] {
    let mut result = [0u64; NUM_BUCKETS];
    for (i, bucket) in buckets.iter().enumerate() {
        result[i] = bucket.swap(0, Ordering::Relaxed);
    }
    result
}

/// Upper bound of the bucket holding the percentile
fn percentile_from_buckets(buckets: &[u64; NUM_BUCKETS], percentile: f64) -> u64 {
    let total: u64 = buckets.iter().sum();
    if total == 0 {
        return 0;
    }

    let target = (total as f64 * percentile).ceil() as u64;
    let mut cumulative = 0u64;
    for (i, &count) in buckets.iter().enumerate() {
        cumulative += count;
        if cumulative >= target {
            return BUCKET_UPPER_BOUNDS[i];
        }
    }
    BUCKET_UPPER_BOUNDS[NUM_BUCKETS - 1]
}

#[derive(Default)]
pub struct Metrics {
    resolutions_total: AtomicU64,
    /// Resolutions that produced an empty stay id
    empty_stay_ids: AtomicU64,
    mrz_parsed_total: AtomicU64,
    mrz_td1: AtomicU64,
    mrz_td3: AtomicU64,
    /// Blank input or no recognisable layout
    mrz_unrecognized: AtomicU64,
    /// Recognised layout but lines too short or missing
    mrz_structural: AtomicU64,
    viz_total: AtomicU64,
    viz_without_name: AtomicU64,
    guest_rows: AtomicU64,
    guest_rows_rejected: AtomicU64,
    parse_latency_buckets: [AtomicU64; NUM_BUCKETS],
    parse_latency_max_us: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_resolution(&self, resolution: &StayResolution) {
        self.resolutions_total.fetch_add(1, Ordering::Relaxed);
        if resolution.is_empty() {
            self.empty_stay_ids.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_mrz(&self, record: &MrzRecord, latency_us: u64) {
        self.mrz_parsed_total.fetch_add(1, Ordering::Relaxed);
        if record.valid {
            match record.format {
                MrzFormat::TD1 => self.mrz_td1.fetch_add(1, Ordering::Relaxed),
                _ => self.mrz_td3.fetch_add(1, Ordering::Relaxed),
            };
        } else if record.format == MrzFormat::Unknown {
            self.mrz_unrecognized.fetch_add(1, Ordering::Relaxed);
        } else {
            self.mrz_structural.fetch_add(1, Ordering::Relaxed);
        }
        self.record_parse_latency(latency_us);
    }

    pub fn record_viz(&self, has_name: bool, latency_us: u64) {
        self.viz_total.fetch_add(1, Ordering::Relaxed);
        if !has_name {
            self.viz_without_name.fetch_add(1, Ordering::Relaxed);
        }
        self.record_parse_latency(latency_us);
    }

    pub fn record_guest_row(&self, accepted: bool) {
        if accepted {
            self.guest_rows.fetch_add(1, Ordering::Relaxed);
        } else {
            self.guest_rows_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_parse_latency(&self, latency_us: u64) {
        self.parse_latency_buckets[bucket_index(latency_us)].fetch_add(1, Ordering::Relaxed);
        self.parse_latency_max_us.fetch_max(latency_us, Ordering::Relaxed);
    }

    pub fn resolutions_total(&self) -> u64 {
        self.resolutions_total.load(Ordering::Relaxed)
    }

    pub fn mrz_failures(&self) -> u64 {
        self.mrz_unrecognized.load(Ordering::Relaxed) + self.mrz_structural.load(Ordering::Relaxed)
    }

    /// Snapshot counters; latency buckets and max are reset
    pub fn report(&self) -> MetricsSummary {
        let latency_buckets = swap_buckets(&self.parse_latency_buckets);
        MetricsSummary {
            resolutions_total: self.resolutions_total.load(Ordering::Relaxed),
            empty_stay_ids: self.empty_stay_ids.load(Ordering::Relaxed),
            mrz_parsed_total: self.mrz_parsed_total.load(Ordering::Relaxed),
            mrz_td1: self.mrz_td1.load(Ordering::Relaxed),
            mrz_td3: self.mrz_td3.load(Ordering::Relaxed),
            mrz_unrecognized: self.mrz_unrecognized.load(Ordering::Relaxed),
            mrz_structural: self.mrz_structural.load(Ordering::Relaxed),
            viz_total: self.viz_total.load(Ordering::Relaxed),
            viz_without_name: self.viz_without_name.load(Ordering::Relaxed),
            guest_rows: self.guest_rows.load(Ordering::Relaxed),
            guest_rows_rejected: self.guest_rows_rejected.load(Ordering::Relaxed),
            parse_p50_us: percentile_from_buckets(&latency_buckets, 0.50),
            parse_p99_us: percentile_from_buckets(&latency_buckets, 0.99),
            parse_max_us: self.parse_latency_max_us.swap(0, Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSummary {
    pub resolutions_total: u64,
    pub empty_stay_ids: u64,
    pub mrz_parsed_total: u64,
    pub mrz_td1: u64,
    pub mrz_td3: u64,
    pub mrz_unrecognized: u64,
    pub mrz_structural: u64,
    pub viz_total: u64,
    pub viz_without_name: u64,
    pub guest_rows: u64,
    pub guest_rows_rejected: u64,
    pub parse_p50_us: u64,
    pub parse_p99_us: u64,
    pub parse_max_us: u64,
}

impl MetricsSummary {
    pub fn log(&self) {
        info!(
            resolutions = %self.resolutions_total,
            empty_stay_ids = %self.empty_stay_ids,
            mrz_parsed = %self.mrz_parsed_total,
            mrz_td1 = %self.mrz_td1,
            mrz_td3 = %self.mrz_td3,
            mrz_unrecognized = %self.mrz_unrecognized,
            mrz_structural = %self.mrz_structural,
            viz = %self.viz_total,
            viz_without_name = %self.viz_without_name,
            guest_rows = %self.guest_rows,
            guest_rows_rejected = %self.guest_rows_rejected,
            parse_p50_us = %self.parse_p50_us,
            parse_p99_us = %self.parse_p99_us,
            parse_max_us = %self.parse_max_us,
            "metrics"
        );
    }
}
