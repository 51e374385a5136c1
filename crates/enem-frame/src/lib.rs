//! enem-frame - Columnar data layer for the ENEM aggregation engine
//!
//! Provides the strongly-typed in-memory candidate frame, its Arrow
//! conversions, Parquet read/write helpers (including the incremental
//! batch writer used by every streaming stage), and the fixed column sets
//! of the gold artifacts consumed by the dashboard API.

pub mod candidate;
pub mod error;
pub mod gold;
pub mod io;

pub use candidate::CandidateFrame;
pub use error::{FrameError, FrameResult};
pub use io::{
    open_batch_reader, parquet_num_rows, parquet_schema, read_all_batches, read_frame,
    write_batch, write_empty, write_frame, IncrementalParquetWriter,
};
