use super::*;
use crate::candidate::tests::sample_frame;
use arrow::array::Int32Array;
use arrow::datatypes::{DataType, Field, Schema};
use std::sync::Arc;

fn int_batch(name: &str, values: Vec<i32>) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![Field::new(name, DataType::Int32, false)]));
    RecordBatch::try_new(schema, vec![Arc::new(Int32Array::from(values))]).unwrap()
}

#[test]
fn frame_roundtrip_through_parquet() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("frame.parquet");

    let frame = sample_frame();
    write_frame(&frame, &path).unwrap();

    let back = read_frame(&path).unwrap();
    assert_eq!(back, frame);
    assert_eq!(parquet_num_rows(&path).unwrap(), 3);
}

#[test]
fn batch_reader_honors_batch_size() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nums.parquet");
    write_batch(&int_batch("N", (0..10).collect()), &path).unwrap();

    let (schema, reader) = open_batch_reader(&path, 3).unwrap();
    assert_eq!(schema.field(0).name(), "N");
    let sizes: Vec<usize> = reader.map(|b| b.unwrap().num_rows()).collect();
    assert_eq!(sizes.iter().sum::<usize>(), 10);
    assert!(sizes.iter().all(|&s| s <= 3));
}

#[test]
fn incremental_writer_appends_batches() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("incremental.parquet");

    let mut writer = IncrementalParquetWriter::create(&path).unwrap();
    writer.write(&int_batch("N", vec![1, 2])).unwrap();
    writer.write(&int_batch("N", vec![3])).unwrap();
    let schema = int_batch("N", vec![]).schema();
    let rows = writer.finish(&schema).unwrap();

    assert_eq!(rows, 3);
    assert_eq!(parquet_num_rows(&path).unwrap(), 3);
}

#[test]
fn incremental_writer_rejects_schema_drift() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("drift.parquet");

    let mut writer = IncrementalParquetWriter::create(&path).unwrap();
    writer.write(&int_batch("N", vec![1])).unwrap();
    let err = writer.write(&int_batch("M", vec![2])).unwrap_err();
    assert!(matches!(err, FrameError::SchemaMismatch { .. }));
}

#[test]
fn finish_without_batches_writes_empty_artifact() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("empty.parquet");

    let writer = IncrementalParquetWriter::create(&path).unwrap();
    let rows = writer.finish(&CandidateFrame::schema()).unwrap();

    assert_eq!(rows, 0);
    assert!(path.exists());
    assert_eq!(parquet_num_rows(&path).unwrap(), 0);
    let schema = parquet_schema(&path).unwrap();
    assert!(schema.column_with_name("NOTA_MATEMATICA").is_some());
}

#[test]
fn missing_file_is_io_error_with_path() {
    let err = read_frame(std::path::Path::new("/nonexistent/file.parquet")).unwrap_err();
    assert!(matches!(err, FrameError::IoWithPath { .. }));
}
