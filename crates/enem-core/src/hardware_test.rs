use super::*;

fn profile_for(total: f64, available: f64, max_pipeline: f64) -> HardwareProfile {
    HardwareProfile {
        logical_cores: 4,
        ram_total_gb: total,
        ram_available_gb: available,
        max_ram_for_pipeline_gb: max_pipeline,
        csv_chunk_rows: 150_000,
        streaming_threshold_gb: resolve_streaming_threshold(total, available, max_pipeline),
    }
}

#[test]
fn resolved_profile_is_sane() {
    let profile = resolve_profile();
    assert!(profile.logical_cores >= 1);
    assert!(profile.ram_total_gb > 0.0);
    assert!(profile.ram_available_gb > 0.0);
    assert!(profile.max_ram_for_pipeline_gb <= profile.ram_total_gb * 0.9 + f64::EPSILON);
    assert!((150_000..=1_500_000).contains(&profile.csv_chunk_rows));
    assert!(profile.streaming_threshold_gb >= 1.5);
}

#[test]
fn chunk_rows_clamped_to_bounds() {
    // Tiny budget floors at 150k rows, huge budget caps at 1.5M.
    assert_eq!(calculate_chunk_rows(0.01), 150_000);
    assert_eq!(calculate_chunk_rows(1024.0), 1_500_000);
}

#[test]
fn streaming_threshold_floors_at_one_point_five() {
    let profile = profile_for(2.0, 1.0, 1.0);
    assert_eq!(profile.streaming_threshold_gb, 1.5);
}

#[test]
fn streaming_threshold_tracks_smallest_budget_fraction() {
    // available RAM is the binding constraint here: 10 * 0.55 = 5.5
    let profile = profile_for(40.0, 10.0, 20.0);
    assert!((profile.streaming_threshold_gb - 5.5).abs() < 1e-9);
}

#[test]
fn requires_streaming_is_inclusive_at_threshold() {
    let profile = profile_for(2.0, 1.0, 1.0);
    assert!(profile.requires_streaming(1.5));
    assert!(profile.requires_streaming(8.0));
    assert!(!profile.requires_streaming(1.49));
}

#[test]
fn max_ram_pipeline_default_caps_at_twelve() {
    assert_eq!(resolve_max_ram_pipeline(64.0), 12.0);
    assert!((resolve_max_ram_pipeline(10.0) - 6.0).abs() < 1e-9);
}
