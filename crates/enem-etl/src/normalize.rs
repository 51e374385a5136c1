//! Schema normalizer
//!
//! Maps one raw chunk onto the canonical candidate schema. For each
//! canonical column the first matching source alias wins; a column with no
//! matching alias is populated entirely with nulls. Malformed cells become
//! nulls ("discard, don't clip"); the stage never fails for data reasons.

use crate::ingest::RawChunk;
use enem_core::schema::{self, ColumnKind, AGE_RANGE, SCORE_RANGE};
use enem_core::Subject;
use enem_frame::CandidateFrame;

/// Resolved source position of each canonical column for one file.
struct AliasIndex {
    id_inscricao: Option<usize>,
    ano: Option<usize>,
    idade: Option<usize>,
    sexo: Option<usize>,
    cor_raca: Option<usize>,
    uf_prova: Option<usize>,
    municipio_codigo: Option<usize>,
    municipio_nome: Option<usize>,
    renda_familiar: Option<usize>,
    presenca: [Option<usize>; 4],
    status_redacao: Option<usize>,
    notas: [Option<usize>; 5],
}

fn find_column(headers: &[String], canonical_name: &str) -> Option<usize> {
    let decl = schema::canonical_column(canonical_name)?;
    for alias in decl.aliases {
        if let Some(pos) = headers.iter().position(|h| h.eq_ignore_ascii_case(alias)) {
            return Some(pos);
        }
    }
    None
}

impl AliasIndex {
    fn resolve(headers: &[String]) -> Self {
        Self {
            id_inscricao: find_column(headers, "ID_INSCRICAO"),
            ano: find_column(headers, "ANO"),
            idade: find_column(headers, "NU_IDADE"),
            sexo: find_column(headers, "TP_SEXO"),
            cor_raca: find_column(headers, "TP_COR_RACA"),
            uf_prova: find_column(headers, "SG_UF_PROVA"),
            municipio_codigo: find_column(headers, "CO_MUNICIPIO_PROVA"),
            municipio_nome: find_column(headers, "NO_MUNICIPIO_PROVA"),
            renda_familiar: find_column(headers, "RENDA_FAMILIAR"),
            presenca: [
                find_column(headers, "TP_PRESENCA_CN"),
                find_column(headers, "TP_PRESENCA_CH"),
                find_column(headers, "TP_PRESENCA_LC"),
                find_column(headers, "TP_PRESENCA_MT"),
            ],
            status_redacao: find_column(headers, "TP_STATUS_REDACAO"),
            notas: [
                find_column(headers, Subject::CienciasNatureza.score_column()),
                find_column(headers, Subject::CienciasHumanas.score_column()),
                find_column(headers, Subject::LinguagensCodigos.score_column()),
                find_column(headers, Subject::Matematica.score_column()),
                find_column(headers, Subject::Redacao.score_column()),
            ],
        }
    }
}

fn cell<'a>(row: &'a [Option<String>], idx: Option<usize>) -> Option<&'a str> {
    idx.and_then(|i| row.get(i)).and_then(|c| c.as_deref())
}

fn string_cell(row: &[Option<String>], idx: Option<usize>, kind: ColumnKind) -> Option<String> {
    let raw = cell(row, idx)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match kind {
        ColumnKind::UpperString => Some(trimmed.to_uppercase()),
        _ => Some(trimmed.to_string()),
    }
}

fn integer_cell(row: &[Option<String>], idx: Option<usize>) -> Option<i64> {
    schema::parse_integer(cell(row, idx)?)
}

fn numeric_cell(row: &[Option<String>], idx: Option<usize>) -> Option<f64> {
    schema::parse_numeric(cell(row, idx)?)
}

/// Normalize one raw chunk into the canonical frame for `year`.
///
/// `ANO` is forced to the processing year whenever the raw value is missing
/// or non-numeric, so every row stays groupable by year even from malformed
/// sources. Out-of-range scores and ages are discarded to null here, before
/// the cleaning stage ever sees them.
pub fn normalize_chunk(chunk: &RawChunk, year: i32) -> CandidateFrame {
    let index = AliasIndex::resolve(&chunk.headers);
    let mut frame = CandidateFrame::with_capacity(chunk.len());
    let mut discarded_scores = 0usize;
    let mut discarded_ages = 0usize;

    for row in &chunk.rows {
        let ano = integer_cell(row, index.ano)
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(year);
        frame.ano.push(ano);

        frame
            .id_inscricao
            .push(string_cell(row, index.id_inscricao, ColumnKind::String));

        let idade = integer_cell(row, index.idade).and_then(|v| {
            if (AGE_RANGE.0..=AGE_RANGE.1).contains(&(v as f64)) {
                i16::try_from(v).ok()
            } else {
                discarded_ages += 1;
                None
            }
        });
        frame.idade.push(idade);

        frame
            .sexo
            .push(string_cell(row, index.sexo, ColumnKind::UpperString));
        frame
            .cor_raca
            .push(integer_cell(row, index.cor_raca).and_then(|v| i16::try_from(v).ok()));
        frame
            .uf_prova
            .push(string_cell(row, index.uf_prova, ColumnKind::UpperString));
        frame
            .municipio_codigo
            .push(integer_cell(row, index.municipio_codigo).and_then(|v| i32::try_from(v).ok()));
        frame
            .municipio_nome
            .push(string_cell(row, index.municipio_nome, ColumnKind::String));
        frame
            .renda_familiar
            .push(string_cell(row, index.renda_familiar, ColumnKind::UpperString));

        for (slot, idx) in frame.presenca.iter_mut().zip(index.presenca) {
            slot.push(integer_cell(row, idx).and_then(|v| i8::try_from(v).ok()));
        }
        frame
            .status_redacao
            .push(integer_cell(row, index.status_redacao).and_then(|v| i8::try_from(v).ok()));

        for (slot, idx) in frame.notas.iter_mut().zip(index.notas) {
            let nota = numeric_cell(row, idx).and_then(|v| {
                if (SCORE_RANGE.0..=SCORE_RANGE.1).contains(&v) {
                    Some(v as f32)
                } else {
                    discarded_scores += 1;
                    None
                }
            });
            slot.push(nota);
        }
    }

    if discarded_scores > 0 {
        log::warn!("year {year}: discarded {discarded_scores} scores outside [0, 1000]");
    }
    if discarded_ages > 0 {
        log::warn!("year {year}: discarded {discarded_ages} ages outside [8, 120]");
    }

    frame
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
