//! Reference metadata contract
//!
//! An external table describes, per year, each canonical column's declared
//! type and (for low-cardinality columns) its finite value domain. The
//! cleaning stage uses the domains to replace out-of-domain values with an
//! explicit UNKNOWN/null sentinel. The table is optional: with no metadata
//! only the hardcoded numeric ranges apply.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Declared shape of one canonical column for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub ano: i32,
    pub nome_padrao: String,
    #[serde(default)]
    pub tipo_padrao: Option<String>,
    /// Explicit value domain; `None` means unconstrained
    #[serde(default)]
    pub dominio_valores: Option<Vec<String>>,
}

impl ColumnMeta {
    /// Whether the declared type is numeric (drives the out-of-domain
    /// replacement sentinel: null for numeric, "UNKNOWN" for text).
    pub fn is_numeric(&self) -> bool {
        matches!(
            self.tipo_padrao.as_deref().map(str::to_lowercase).as_deref(),
            Some("int" | "int32" | "int64" | "float" | "float32" | "float64")
        )
    }
}

/// The loaded reference metadata table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceMetadata {
    #[serde(default)]
    pub colunas: Vec<ColumnMeta>,
}

impl ReferenceMetadata {
    /// Load from a YAML file. A missing file yields the empty table (the
    /// cleaning stage then applies numeric rules only); a malformed file is
    /// a config error.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            log::warn!(
                "reference metadata not found at {}; domain rules disabled",
                path.display()
            );
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let meta: ReferenceMetadata = serde_yaml::from_str(&content)?;
        Ok(meta)
    }

    pub fn is_empty(&self) -> bool {
        self.colunas.is_empty()
    }

    /// Columns declared for one year.
    pub fn for_year(&self, year: i32) -> Vec<&ColumnMeta> {
        self.colunas.iter().filter(|c| c.ano == year).collect()
    }
}

#[cfg(test)]
#[path = "metadata_test.rs"]
mod tests;
