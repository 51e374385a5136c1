//! Profile command implementation

use anyhow::Result;
use enem_core::resolve_profile;

pub fn execute() -> Result<()> {
    let profile = resolve_profile();
    println!("logical cores:        {}", profile.logical_cores);
    println!("RAM total:            {:.1} GB", profile.ram_total_gb);
    println!("RAM available:        {:.1} GB", profile.ram_available_gb);
    println!(
        "pipeline RAM ceiling: {:.1} GB",
        profile.max_ram_for_pipeline_gb
    );
    println!("CSV chunk rows:       {}", profile.csv_chunk_rows);
    println!(
        "streaming threshold:  {:.2} GB",
        profile.streaming_threshold_gb
    );
    Ok(())
}
