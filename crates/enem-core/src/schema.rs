//! Canonical candidate schema and raw-column alias table
//!
//! Twenty-six years of microdata renamed columns repeatedly. Instead of
//! per-year branching, each canonical column declares an ordered list of
//! historical aliases; the normalizer picks the first alias present in a
//! given source batch. Adding a future year means adding an alias here,
//! not a code path.

/// Value kind of a canonical column, driving coercion in the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Free text, trimmed; empty becomes null
    String,
    /// Trimmed and uppercased; empty becomes null
    UpperString,
    /// Integer; non-numeric cells become null
    Integer,
    /// Floating point; accepts comma as the decimal separator
    Numeric,
}

/// Declaration of one canonical column.
#[derive(Debug, Clone, Copy)]
pub struct CanonicalColumn {
    /// Target name in the silver/cleaned layers
    pub name: &'static str,
    /// Source aliases in priority order (first match wins)
    pub aliases: &'static [&'static str],
    pub kind: ColumnKind,
}

/// Inclusive validity range for subject scores.
pub const SCORE_RANGE: (f64, f64) = (0.0, 1000.0);

/// Inclusive validity range for candidate ages.
pub const AGE_RANGE: (f64, f64) = (8.0, 120.0);

/// The full canonical schema, in artifact column order.
pub const CANONICAL_COLUMNS: &[CanonicalColumn] = &[
    CanonicalColumn {
        name: "ANO",
        aliases: &["NU_ANO", "ANO", "NU_ANO_PROVA"],
        kind: ColumnKind::Integer,
    },
    CanonicalColumn {
        name: "ID_INSCRICAO",
        aliases: &["NU_INSCRICAO", "NR_INSCRICAO", "ID_INSCRICAO"],
        kind: ColumnKind::String,
    },
    CanonicalColumn {
        name: "NU_IDADE",
        aliases: &["NU_IDADE", "IDADE"],
        kind: ColumnKind::Integer,
    },
    CanonicalColumn {
        name: "TP_SEXO",
        aliases: &["TP_SEXO", "SEXO"],
        kind: ColumnKind::UpperString,
    },
    CanonicalColumn {
        name: "TP_COR_RACA",
        aliases: &["TP_COR_RACA", "TP_RACA_COR", "COR_RACA"],
        kind: ColumnKind::Integer,
    },
    CanonicalColumn {
        name: "SG_UF_PROVA",
        aliases: &["SG_UF_PROVA", "UF_PROVA", "SG_UF_ESC"],
        kind: ColumnKind::UpperString,
    },
    CanonicalColumn {
        name: "CO_MUNICIPIO_PROVA",
        aliases: &["CO_MUNICIPIO_PROVA", "COD_MUNICIPIO_PROVA", "CO_MUNICIPIO_INSC"],
        kind: ColumnKind::Integer,
    },
    CanonicalColumn {
        name: "NO_MUNICIPIO_PROVA",
        aliases: &["NO_MUNICIPIO_PROVA", "NOME_MUNICIPIO_PROVA", "NO_MUNICIPIO_INSC"],
        kind: ColumnKind::String,
    },
    CanonicalColumn {
        name: "RENDA_FAMILIAR",
        aliases: &["Q006", "Q06", "RENDA_FAMILIAR"],
        kind: ColumnKind::UpperString,
    },
    CanonicalColumn {
        name: "TP_PRESENCA_CN",
        aliases: &["TP_PRESENCA_CN", "IN_PRESENCA_CN"],
        kind: ColumnKind::Integer,
    },
    CanonicalColumn {
        name: "TP_PRESENCA_CH",
        aliases: &["TP_PRESENCA_CH", "IN_PRESENCA_CH"],
        kind: ColumnKind::Integer,
    },
    CanonicalColumn {
        name: "TP_PRESENCA_LC",
        aliases: &["TP_PRESENCA_LC", "IN_PRESENCA_LC"],
        kind: ColumnKind::Integer,
    },
    CanonicalColumn {
        name: "TP_PRESENCA_MT",
        aliases: &["TP_PRESENCA_MT", "IN_PRESENCA_MT"],
        kind: ColumnKind::Integer,
    },
    CanonicalColumn {
        name: "TP_STATUS_REDACAO",
        aliases: &["TP_STATUS_REDACAO", "IN_STATUS_REDACAO"],
        kind: ColumnKind::Integer,
    },
    CanonicalColumn {
        name: "NOTA_CIENCIAS_NATUREZA",
        aliases: &["NU_NOTA_CN", "NOTA_CN", "NOTA_CIENCIAS_NATUREZA"],
        kind: ColumnKind::Numeric,
    },
    CanonicalColumn {
        name: "NOTA_CIENCIAS_HUMANAS",
        aliases: &["NU_NOTA_CH", "NOTA_CH", "NOTA_CIENCIAS_HUMANAS"],
        kind: ColumnKind::Numeric,
    },
    CanonicalColumn {
        name: "NOTA_LINGUAGENS_CODIGOS",
        aliases: &["NU_NOTA_LC", "NOTA_LC", "NOTA_LINGUAGENS_CODIGOS"],
        kind: ColumnKind::Numeric,
    },
    CanonicalColumn {
        name: "NOTA_MATEMATICA",
        aliases: &["NU_NOTA_MT", "NOTA_MT", "NOTA_MATEMATICA"],
        kind: ColumnKind::Numeric,
    },
    CanonicalColumn {
        name: "NOTA_REDACAO",
        aliases: &["NU_NOTA_REDACAO", "NOTA_REDACAO", "NU_NT_REDACAO"],
        kind: ColumnKind::Numeric,
    },
];

/// Look up a canonical column declaration by target name.
pub fn canonical_column(name: &str) -> Option<&'static CanonicalColumn> {
    CANONICAL_COLUMNS.iter().find(|c| c.name == name)
}

/// Parse a numeric cell, accepting Brazilian comma-decimal input.
///
/// Returns `None` for empty or non-numeric cells ("discard, don't guess").
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(v) = trimmed.parse::<f64>() {
        return v.is_finite().then_some(v);
    }
    if trimmed.contains(',') {
        let dotted = trimmed.replace(',', ".");
        if let Ok(v) = dotted.parse::<f64>() {
            return v.is_finite().then_some(v);
        }
    }
    None
}

/// Parse an integer cell; tolerates a numeric with a fractional part of zero
/// (some years export codes as `12.0`).
pub fn parse_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(v) = trimmed.parse::<i64>() {
        return Some(v);
    }
    match parse_numeric(trimmed) {
        Some(v) if v.fract() == 0.0 => Some(v as i64),
        _ => None,
    }
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;
