//! Data-layer path conventions
//!
//! The lake is laid out as `00_raw` / `01_silver` / `02_gold` under the
//! configured data directory, with the DuckDB file next to the gold layer.

use crate::settings::Settings;
use std::path::{Path, PathBuf};

/// Resolves every file location the pipeline reads or writes.
#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(settings: &Settings) -> Self {
        Self {
            root: settings.data_dir.clone(),
        }
    }

    pub fn from_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.root.join("00_raw")
    }

    pub fn silver_dir(&self) -> PathBuf {
        self.root.join("01_silver")
    }

    pub fn gold_dir(&self) -> PathBuf {
        self.root.join("02_gold")
    }

    /// Raw CSV for one year:
    /// `00_raw/microdados_enem_{year}/DADOS/MICRODADOS_ENEM_{year}.csv`.
    ///
    /// Some archive dumps use `Dados`/`dados` for the folder, or lowercase
    /// the file name; this probes the known variants and finally falls back
    /// to a case-insensitive scan of the year directory before returning the
    /// default location (letting the caller surface the not-found error).
    pub fn raw_data_path(&self, year: i32) -> PathBuf {
        let base = self.raw_dir().join(format!("microdados_enem_{year}"));
        let file_name = format!("MICRODADOS_ENEM_{year}.csv");

        for folder in ["DADOS", "Dados", "dados"] {
            let candidate = base.join(folder).join(&file_name);
            if candidate.exists() {
                return candidate;
            }
        }

        if let Some(found) = find_csv_case_insensitive(&base, &file_name.to_lowercase()) {
            return found;
        }

        base.join("DADOS").join(file_name)
    }

    pub fn silver_path(&self, year: i32) -> PathBuf {
        self.silver_dir()
            .join(format!("microdados_enem_{year}.parquet"))
    }

    pub fn cleaned_dir(&self) -> PathBuf {
        self.gold_dir().join("cleaned")
    }

    pub fn cleaned_path(&self, year: i32) -> PathBuf {
        self.cleaned_dir()
            .join(format!("microdados_enem_{year}_clean.parquet"))
    }

    /// Cleaning report kept next to the cleaned artifact for audit.
    pub fn cleaning_report_path(&self, year: i32) -> PathBuf {
        self.cleaned_dir()
            .join(format!("cleaning_report_{year}.parquet"))
    }

    pub fn classes_dir(&self) -> PathBuf {
        self.gold_dir().join("classes")
    }

    pub fn classes_path(&self, year: i32) -> PathBuf {
        self.classes_dir()
            .join(format!("classes_enem_{year}.parquet"))
    }

    /// Gold artifact by table name, e.g. `tb_notas` -> `02_gold/tb_notas.parquet`.
    pub fn gold_table(&self, name: &str) -> PathBuf {
        self.gold_dir().join(format!("{name}.parquet"))
    }

    /// Wildcard pattern over per-year cleaned files, for DuckDB `read_parquet`.
    pub fn cleaned_wildcard(&self) -> PathBuf {
        self.cleaned_dir().join("microdados_enem_*_clean.parquet")
    }

    /// Wildcard pattern over per-year silver files.
    pub fn silver_wildcard(&self) -> PathBuf {
        self.silver_dir().join("microdados_enem_*.parquet")
    }

    /// Wildcard pattern over per-year class files.
    pub fn classes_wildcard(&self) -> PathBuf {
        self.classes_dir().join("classes_enem_*.parquet")
    }

    /// The embedded analytical database lives next to the data layers so the
    /// whole lake can be moved as one directory.
    pub fn db_path(&self) -> PathBuf {
        self.root.join("enem.duckdb")
    }

    pub fn audit_report_path(&self) -> PathBuf {
        self.gold_dir().join("audit_report.yml")
    }

    /// Reference metadata table (optional; cleaning falls back to the
    /// hardcoded numeric rules without it).
    pub fn metadata_path(&self) -> PathBuf {
        self.gold_dir().join("variaveis_meta.yml")
    }
}

fn find_csv_case_insensitive(base: &Path, lower_name: &str) -> Option<PathBuf> {
    let entries = std::fs::read_dir(base).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if let Some(found) = find_csv_case_insensitive(&path, lower_name) {
                return Some(found);
            }
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.to_lowercase() == lower_name)
        {
            return Some(path);
        }
    }
    None
}
