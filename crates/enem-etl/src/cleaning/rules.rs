//! Cleaning rules
//!
//! The hardcoded numeric ranges always apply; domain rules come from the
//! reference metadata and are therefore optional.

use enem_core::schema::{AGE_RANGE, SCORE_RANGE};
use enem_core::Subject;
use enem_frame::CandidateFrame;

/// A numeric validity range for one canonical column. A row violates the
/// rule only when its value is non-null and outside the range; nulls are
/// legitimate historical gaps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRule {
    pub column: &'static str,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumericRule {
    pub fn violates(&self, value: f64) -> bool {
        self.min.is_some_and(|m| value < m) || self.max.is_some_and(|m| value > m)
    }
}

/// Always-on numeric ranges: ages in [8, 120], scores in [0, 1000].
pub const DEFAULT_NUMERIC_RULES: &[NumericRule] = &[
    NumericRule {
        column: "NU_IDADE",
        min: Some(AGE_RANGE.0),
        max: Some(AGE_RANGE.1),
    },
    NumericRule {
        column: "NOTA_CIENCIAS_NATUREZA",
        min: Some(SCORE_RANGE.0),
        max: Some(SCORE_RANGE.1),
    },
    NumericRule {
        column: "NOTA_CIENCIAS_HUMANAS",
        min: Some(SCORE_RANGE.0),
        max: Some(SCORE_RANGE.1),
    },
    NumericRule {
        column: "NOTA_LINGUAGENS_CODIGOS",
        min: Some(SCORE_RANGE.0),
        max: Some(SCORE_RANGE.1),
    },
    NumericRule {
        column: "NOTA_MATEMATICA",
        min: Some(SCORE_RANGE.0),
        max: Some(SCORE_RANGE.1),
    },
    NumericRule {
        column: "NOTA_REDACAO",
        min: Some(SCORE_RANGE.0),
        max: Some(SCORE_RANGE.1),
    },
];

/// Numeric value of a rule's column at one row, or `None` when null.
///
/// Rules referencing a column the frame does not model are skipped silently
/// (schemas evolved across years).
pub(crate) fn rule_value(frame: &CandidateFrame, column: &str, row: usize) -> Option<f64> {
    match column {
        "NU_IDADE" => frame.idade[row].map(f64::from),
        _ => Subject::ALL
            .iter()
            .find(|s| s.score_column() == column)
            .and_then(|s| frame.notas[s.index()][row].map(f64::from)),
    }
}
