use super::*;
use arrow::array::Int64Array;
use arrow::datatypes::{DataType, Field, Schema};
use enem_frame::{read_all_batches, write_batch, write_empty};
use std::sync::Arc;

fn nums_batch(values: Vec<i64>) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![Field::new("N", DataType::Int64, false)]));
    RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(values))]).unwrap()
}

fn double_stage(batch: RecordBatch) -> EtlResult<RecordBatch> {
    let col = batch
        .column(0)
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap();
    let doubled: Int64Array = col.iter().map(|v| v.map(|x| x * 2)).collect();
    Ok(RecordBatch::try_new(batch.schema(), vec![Arc::new(doubled)]).unwrap())
}

fn collect_values(path: &std::path::Path) -> Vec<i64> {
    let mut out = Vec::new();
    for batch in read_all_batches(path).unwrap() {
        let col = batch
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        out.extend(col.iter().map(|v| v.unwrap()));
    }
    out
}

fn test_profile(chunk_rows: usize) -> enem_core::HardwareProfile {
    enem_core::HardwareProfile {
        logical_cores: 4,
        ram_total_gb: 20.0,
        ram_available_gb: 16.0,
        max_ram_for_pipeline_gb: 12.0,
        csv_chunk_rows: chunk_rows,
        streaming_threshold_gb: 1.5,
    }
}

#[test]
fn streaming_output_equals_single_pass() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("input.parquet");
    let streamed = tmp.path().join("streamed.parquet");
    let single = tmp.path().join("single.parquet");

    let values: Vec<i64> = (0..1000).collect();
    write_batch(&nums_batch(values.clone()), &input).unwrap();

    // N arbitrary-sized batches vs one pass over the full input
    let rows_streamed = stream_process(&input, &streamed, double_stage, 7).unwrap();
    let rows_single = stream_process(&input, &single, double_stage, 1_000_000).unwrap();

    assert_eq!(rows_streamed, 1000);
    assert_eq!(rows_single, 1000);
    assert_eq!(collect_values(&streamed), collect_values(&single));
}

#[test]
fn empty_input_produces_empty_artifact_with_schema() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("input.parquet");
    let output = tmp.path().join("output.parquet");

    write_empty(&nums_batch(vec![]).schema(), &input).unwrap();

    let rows = stream_process(&input, &output, double_stage, 100).unwrap();
    assert_eq!(rows, 0);
    assert!(output.exists());
    assert_eq!(
        enem_frame::parquet_schema(&output).unwrap().field(0).name(),
        "N"
    );
}

#[test]
fn stage_schema_drift_aborts_stream() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("input.parquet");
    let output = tmp.path().join("output.parquet");
    write_batch(&nums_batch((0..10).collect()), &input).unwrap();

    let mut calls = 0;
    let result = stream_process(
        &input,
        &output,
        move |batch| {
            calls += 1;
            if calls == 1 {
                Ok(batch)
            } else {
                // rename the column mid-stream
                let schema = Arc::new(Schema::new(vec![Field::new("M", DataType::Int64, false)]));
                Ok(RecordBatch::try_new(schema, batch.columns().to_vec()).unwrap())
            }
        },
        4,
    );
    assert!(result.is_err());
}

#[test]
fn should_stream_honors_row_count_and_force() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("input.parquet");
    write_batch(&nums_batch((0..100).collect()), &input).unwrap();

    let profile = test_profile(150_000);
    assert!(!should_stream(&input, &profile, false).unwrap());
    assert!(should_stream(&input, &profile, true).unwrap());

    let tiny_chunks = test_profile(10);
    assert!(should_stream(&input, &tiny_chunks, false).unwrap());
}

#[test]
fn should_stream_missing_input_is_structural() {
    let profile = test_profile(100);
    let err = should_stream(std::path::Path::new("/nonexistent.parquet"), &profile, false)
        .unwrap_err();
    assert!(matches!(err, EtlError::ArtifactMissing { .. }));
}
