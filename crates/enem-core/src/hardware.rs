//! Hardware profile resolution
//!
//! Every downstream stage sizes its batches from this profile, so the
//! derivation is deliberately conservative: when memory introspection is
//! unavailable (containers, stripped-down hosts) it assumes a 20 GB machine
//! with 80% of it free rather than guessing high.

use sysinfo::{MemoryRefreshKind, System};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Assumed total RAM when introspection reports nothing usable.
const FALLBACK_RAM_GB: f64 = 20.0;

/// Hardware profile used to tune memory ceilings across the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct HardwareProfile {
    pub logical_cores: usize,
    pub ram_total_gb: f64,
    pub ram_available_gb: f64,
    /// Hard ceiling a single pipeline run is allowed to occupy
    pub max_ram_for_pipeline_gb: f64,
    /// Rows per CSV chunk, clamped to [150_000, 1_500_000]
    pub csv_chunk_rows: usize,
    /// Files at or above this size are processed in streaming mode
    pub streaming_threshold_gb: f64,
}

impl HardwareProfile {
    /// Whether a file of the given size must be processed in bounded-memory
    /// streaming mode instead of a single pass.
    pub fn requires_streaming(&self, file_size_gb: f64) -> bool {
        file_size_gb >= self.streaming_threshold_gb
    }
}

/// Resolve the profile from host introspection plus environment overrides.
///
/// Pure with respect to the filesystem; reads only the environment and the
/// memory/CPU counters.
pub fn resolve_profile() -> HardwareProfile {
    let logical_cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);

    let ram_total = detect_ram_total_gb();
    let ram_available = detect_ram_available_gb(ram_total);
    let max_ram_pipeline = resolve_max_ram_pipeline(ram_total);
    let csv_chunk_rows = calculate_chunk_rows(max_ram_pipeline);
    let streaming_threshold = resolve_streaming_threshold(ram_total, ram_available, max_ram_pipeline);

    HardwareProfile {
        logical_cores,
        ram_total_gb: ram_total,
        ram_available_gb: ram_available,
        max_ram_for_pipeline_gb: max_ram_pipeline,
        csv_chunk_rows,
        streaming_threshold_gb: streaming_threshold,
    }
}

fn detect_ram_total_gb() -> f64 {
    let mut sys = System::new();
    sys.refresh_memory_specifics(MemoryRefreshKind::everything());
    let total = sys.total_memory();
    if total == 0 {
        log::warn!("could not detect system memory, assuming {FALLBACK_RAM_GB} GB");
        return FALLBACK_RAM_GB;
    }
    total as f64 / GIB
}

fn detect_ram_available_gb(total: f64) -> f64 {
    let mut sys = System::new();
    sys.refresh_memory_specifics(MemoryRefreshKind::everything());
    let available = sys.available_memory();
    if available == 0 {
        return total * 0.8;
    }
    available as f64 / GIB
}

fn env_f64(name: &str) -> Option<f64> {
    std::env::var(name).ok().and_then(|raw| raw.parse().ok())
}

fn resolve_max_ram_pipeline(ram_total: f64) -> f64 {
    if let Some(over) = env_f64("ENEM_MAX_RAM_GB") {
        return over.min(ram_total * 0.9);
    }
    12.0_f64.min(ram_total * 0.6)
}

fn calculate_chunk_rows(max_ram_pipeline: f64) -> usize {
    if let Ok(raw) = std::env::var("ENEM_CSV_CHUNK_ROWS") {
        if let Ok(value) = raw.parse::<usize>() {
            if value > 0 {
                return value;
            }
        }
    }

    // A quarter of the pipeline budget divided by an estimated per-row cost.
    let bytes_budget = max_ram_pipeline * GIB * 0.25;
    let estimated_row_bytes = std::env::var("ENEM_ESTIMATED_ROW_BYTES")
        .ok()
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(450)
        .max(200);
    let chunk_rows = (bytes_budget / estimated_row_bytes as f64) as usize;
    chunk_rows.clamp(150_000, 1_500_000)
}

fn resolve_streaming_threshold(ram_total: f64, ram_available: f64, max_ram_pipeline: f64) -> f64 {
    if let Some(over) = env_f64("ENEM_STREAMING_THRESHOLD_GB") {
        if over > 0.0 {
            return over;
        }
    }

    let base = (max_ram_pipeline * 0.45)
        .min(ram_total * 0.35)
        .min(ram_available * 0.55);
    base.max(1.5)
}

#[cfg(test)]
#[path = "hardware_test.rs"]
mod tests;
