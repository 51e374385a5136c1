//! Score-bracket configuration
//!
//! Brackets bucket five-subject averages for distribution reporting. They
//! are loaded from a YAML file when present, with a hardcoded fallback so
//! the pipeline keeps working on a bare checkout.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One labeled score range. Intervals are `[min, max)` except the last,
/// which is closed at the score ceiling so a perfect 1000 still classifies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBracket {
    pub id: i32,
    pub min: f64,
    pub max: f64,
    pub descricao: String,
}

#[derive(Debug, Deserialize)]
struct BracketFile {
    faixas: Vec<ScoreBracket>,
}

/// Default brackets used when no config file is available.
pub fn default_brackets() -> Vec<ScoreBracket> {
    vec![
        ScoreBracket {
            id: 1,
            min: 0.0,
            max: 400.0,
            descricao: "Abaixo de 400".to_string(),
        },
        ScoreBracket {
            id: 2,
            min: 400.0,
            max: 600.0,
            descricao: "Intermediário baixo".to_string(),
        },
        ScoreBracket {
            id: 3,
            min: 600.0,
            max: 800.0,
            descricao: "Intermediário alto".to_string(),
        },
        ScoreBracket {
            id: 4,
            min: 800.0,
            max: 1000.0,
            descricao: "Alto desempenho".to_string(),
        },
    ]
}

/// Load brackets from `path`, falling back to [`default_brackets`] when the
/// file does not exist. A file that exists but fails to parse is a config
/// error, not a silent fallback.
pub fn load_brackets(path: &Path) -> CoreResult<Vec<ScoreBracket>> {
    if !path.exists() {
        log::warn!(
            "bracket config not found at {}; using built-in brackets",
            path.display()
        );
        return Ok(default_brackets());
    }

    let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })?;
    let file: BracketFile = serde_yaml::from_str(&content)?;
    if file.faixas.is_empty() {
        return Err(CoreError::ConfigInvalid {
            message: format!("bracket config {} declares no brackets", path.display()),
        });
    }
    Ok(file.faixas)
}

/// Classify an average into a bracket, returning `(id, label)`.
///
/// Falls back to the first bracket when nothing matches (defensive against
/// misconfigured bounds; averages are already range-checked upstream).
pub fn classify(media: f64, brackets: &[ScoreBracket]) -> (i32, String) {
    for bracket in brackets {
        let in_bracket = if (bracket.max - 1000.0).abs() < f64::EPSILON {
            media >= bracket.min && media <= bracket.max
        } else {
            media >= bracket.min && media < bracket.max
        };
        if in_bracket {
            return (bracket.id, bracket.descricao.clone());
        }
    }
    let first = &brackets[0];
    (first.id, first.descricao.clone())
}

#[cfg(test)]
#[path = "brackets_test.rs"]
mod tests;
