//! Gold command implementation

use crate::cli::{GlobalArgs, GoldArgs};
use crate::commands::common::load_environment;
use anyhow::{Context, Result};
use enem_core::load_brackets;
use enem_etl::gold::build_all_gold;

pub fn execute(args: &GoldArgs, global: &GlobalArgs) -> Result<()> {
    let (settings, paths) = load_environment(global);
    let years = args.years.resolve(&settings);
    let brackets =
        load_brackets(&args.brackets_config).context("failed to load bracket config")?;

    let summary = build_all_gold(&years, &paths, &brackets)
        .context("gold build failed")?;

    println!(
        "gold build complete: tb_notas={} tb_notas_stats={} tb_notas_geo={} \
         tb_notas_geo_uf={} tb_notas_race={} tb_notas_histogram={} \
         tb_socio_economico={} tb_media_uf={} dim_municipio={}",
        summary.notas_rows,
        summary.stats_rows,
        summary.geo_rows,
        summary.geo_uf_rows,
        summary.race_rows,
        summary.histogram_rows,
        summary.socio_rows,
        summary.media_uf_rows,
        summary.municipality_rows,
    );
    Ok(())
}
