//! View registrar
//!
//! One logical view per columnar artifact, pointed at the artifact's
//! location. Per-year layers use wildcard patterns so a view spans every
//! produced year. Views over artifacts that do not exist yet are skipped
//! with a warning rather than failing registration — a fresh lake has no
//! gold tables until the first build.

use crate::backend::DuckDbBackend;
use crate::error::DbResult;
use enem_core::DataPaths;
use std::path::Path;

fn select_parquet(path: &Path) -> String {
    format!(
        "SELECT * FROM read_parquet('{}')",
        path.to_string_lossy().replace('\'', "''")
    )
}

/// Whether any file matches `dir/*` with the given prefix and suffix
/// (cheap stand-in for glob expansion when probing wildcard views).
fn wildcard_has_match(dir: &Path, prefix: &str, suffix: &str) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    entries.flatten().any(|e| {
        e.file_name()
            .to_str()
            .is_some_and(|n| n.starts_with(prefix) && n.ends_with(suffix))
    })
}

/// Register every known view, returning the names actually registered.
pub fn register_parquet_views(db: &DuckDbBackend, paths: &DataPaths) -> DbResult<Vec<String>> {
    let mut registered = Vec::new();

    let wildcards = [
        (
            "silver_microdados",
            paths.silver_wildcard(),
            paths.silver_dir(),
            "microdados_enem_",
            ".parquet",
        ),
        (
            "gold_cleaned",
            paths.cleaned_wildcard(),
            paths.cleaned_dir(),
            "microdados_enem_",
            "_clean.parquet",
        ),
        (
            "gold_classes",
            paths.classes_wildcard(),
            paths.classes_dir(),
            "classes_enem_",
            ".parquet",
        ),
    ];
    for (name, pattern, dir, prefix, suffix) in wildcards {
        if wildcard_has_match(&dir, prefix, suffix) {
            db.create_view_as(name, &select_parquet(&pattern))?;
            registered.push(name.to_string());
        } else {
            log::warn!("view {name} skipped: no files match {}", pattern.display());
        }
    }

    let tables = [
        "tb_notas",
        "tb_notas_stats",
        "tb_notas_geo",
        "tb_notas_geo_uf",
        "tb_notas_race",
        "tb_notas_histogram",
        "tb_socio_economico",
        "tb_media_uf",
    ];
    for table in tables {
        let path = paths.gold_table(table);
        if path.exists() {
            let view = format!("gold_{table}");
            db.create_view_as(&view, &select_parquet(&path))?;
            registered.push(view);
        } else {
            log::warn!("view gold_{table} skipped: {} missing", path.display());
        }
    }

    let dim_path = paths.gold_table("dim_municipio");
    if dim_path.exists() {
        db.create_view_as("dim_municipio", &select_parquet(&dim_path))?;
        registered.push("dim_municipio".to_string());
    }

    log::info!("registered {} parquet views", registered.len());
    Ok(registered)
}
