//! Gold-table row types and their fixed column sets
//!
//! These column names are the compatibility contract with the dashboard
//! API: consumers read artifacts by exact name. Every table here knows its
//! Arrow schema and how to turn a slice of rows into one record batch.

use crate::candidate::CandidateFrame;
use crate::error::FrameResult;
use arrow::array::{ArrayRef, Float64Array, Int16Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use enem_core::Subject;
use std::sync::Arc;

/// Count/mean pair for one subject inside a grouped aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SubjectCountMean {
    pub count: i64,
    pub mean: Option<f64>,
}

/// Full descriptive statistics for one subject at the national granularity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SubjectStats {
    pub count: i64,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

/// One row of `tb_notas_stats` (per year).
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualStatsRow {
    pub ano: i32,
    pub total_inscritos: i64,
    pub idade_mean: Option<f64>,
    pub idade_std: Option<f64>,
    pub idade_min: Option<f64>,
    pub idade_median: Option<f64>,
    pub idade_max: Option<f64>,
    /// Indexed by [`Subject::ALL`]
    pub subjects: [SubjectStats; 5],
}

impl AnnualStatsRow {
    pub fn schema() -> SchemaRef {
        let mut fields = vec![
            Field::new("ANO", DataType::Int32, false),
            Field::new("TOTAL_INSCRITOS", DataType::Int64, false),
        ];
        for suffix in ["mean", "std", "min", "median", "max"] {
            fields.push(Field::new(format!("IDADE_{suffix}"), DataType::Float64, true));
        }
        for subject in Subject::ALL {
            let col = subject.score_column();
            fields.push(Field::new(format!("{col}_count"), DataType::Int64, false));
            for suffix in ["mean", "std", "min", "median", "max"] {
                fields.push(Field::new(format!("{col}_{suffix}"), DataType::Float64, true));
            }
        }
        Arc::new(Schema::new(fields))
    }

    pub fn to_record_batch(rows: &[AnnualStatsRow]) -> FrameResult<RecordBatch> {
        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(rows.iter().map(|r| r.ano).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.total_inscritos).collect::<Vec<_>>(),
            )),
        ];
        let age_picks: [fn(&AnnualStatsRow) -> Option<f64>; 5] = [
            |r| r.idade_mean,
            |r| r.idade_std,
            |r| r.idade_min,
            |r| r.idade_median,
            |r| r.idade_max,
        ];
        for pick in age_picks {
            columns.push(Arc::new(Float64Array::from(
                rows.iter().map(pick).collect::<Vec<_>>(),
            )));
        }
        for subject in Subject::ALL {
            let i = subject.index();
            columns.push(Arc::new(Int64Array::from(
                rows.iter().map(|r| r.subjects[i].count).collect::<Vec<_>>(),
            )));
            let stat_picks: [fn(&SubjectStats) -> f64; 5] =
                [|s| s.mean, |s| s.std, |s| s.min, |s| s.median, |s| s.max];
            for pick in stat_picks {
                columns.push(Arc::new(Float64Array::from(
                    rows.iter()
                        .map(|r| Some(pick(&r.subjects[i])))
                        .collect::<Vec<_>>(),
                )));
            }
        }
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

/// One row of `tb_notas_geo` (per year, state, municipality).
#[derive(Debug, Clone, PartialEq)]
pub struct GeoRow {
    pub ano: i32,
    pub uf: String,
    pub municipio_codigo: i32,
    pub municipio_nome: String,
    pub inscritos: i64,
    pub subjects: [SubjectCountMean; 5],
}

impl GeoRow {
    pub fn schema() -> SchemaRef {
        let mut fields = vec![
            Field::new("ANO", DataType::Int32, false),
            Field::new("SG_UF_PROVA", DataType::Utf8, false),
            Field::new("CO_MUNICIPIO_PROVA", DataType::Int32, false),
            Field::new("NO_MUNICIPIO_PROVA", DataType::Utf8, false),
            Field::new("INSCRITOS", DataType::Int64, false),
        ];
        push_count_mean_fields(&mut fields);
        Arc::new(Schema::new(fields))
    }

    pub fn to_record_batch(rows: &[GeoRow]) -> FrameResult<RecordBatch> {
        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(rows.iter().map(|r| r.ano).collect::<Vec<_>>())),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.uf.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Int32Array::from(
                rows.iter().map(|r| r.municipio_codigo).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.municipio_nome.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.inscritos).collect::<Vec<_>>(),
            )),
        ];
        push_count_mean_columns(&mut columns, rows.iter().map(|r| &r.subjects));
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

/// One row of `tb_notas_geo_uf` (per year, state).
#[derive(Debug, Clone, PartialEq)]
pub struct GeoUfRow {
    pub ano: i32,
    pub uf: String,
    pub inscritos: i64,
    pub subjects: [SubjectCountMean; 5],
}

impl GeoUfRow {
    pub fn schema() -> SchemaRef {
        let mut fields = vec![
            Field::new("ANO", DataType::Int32, false),
            Field::new("SG_UF_PROVA", DataType::Utf8, false),
            Field::new("INSCRITOS", DataType::Int64, false),
        ];
        push_count_mean_fields(&mut fields);
        Arc::new(Schema::new(fields))
    }

    pub fn to_record_batch(rows: &[GeoUfRow]) -> FrameResult<RecordBatch> {
        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(rows.iter().map(|r| r.ano).collect::<Vec<_>>())),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.uf.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.inscritos).collect::<Vec<_>>(),
            )),
        ];
        push_count_mean_columns(&mut columns, rows.iter().map(|r| &r.subjects));
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

/// One row of `tb_notas_race` (per year, self-declared race/color code).
#[derive(Debug, Clone, PartialEq)]
pub struct RaceRow {
    pub ano: i32,
    pub cor_raca: i16,
    pub inscritos: i64,
    pub subjects: [SubjectCountMean; 5],
}

impl RaceRow {
    pub fn schema() -> SchemaRef {
        let mut fields = vec![
            Field::new("ANO", DataType::Int32, false),
            Field::new("TP_COR_RACA", DataType::Int16, false),
            Field::new("INSCRITOS", DataType::Int64, false),
        ];
        push_count_mean_fields(&mut fields);
        Arc::new(Schema::new(fields))
    }

    pub fn to_record_batch(rows: &[RaceRow]) -> FrameResult<RecordBatch> {
        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(rows.iter().map(|r| r.ano).collect::<Vec<_>>())),
            Arc::new(Int16Array::from(
                rows.iter().map(|r| r.cor_raca).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.inscritos).collect::<Vec<_>>(),
            )),
        ];
        push_count_mean_columns(&mut columns, rows.iter().map(|r| &r.subjects));
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

/// One row of `tb_notas_histogram`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramRow {
    pub ano: i32,
    pub disciplina: String,
    pub bin_start: f64,
    pub bin_end: f64,
    pub contagem: i64,
}

impl HistogramRow {
    pub fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("ANO", DataType::Int32, false),
            Field::new("DISCIPLINA", DataType::Utf8, false),
            Field::new("BIN_START", DataType::Float64, false),
            Field::new("BIN_END", DataType::Float64, false),
            Field::new("CONTAGEM", DataType::Int64, false),
        ]))
    }

    pub fn to_record_batch(rows: &[HistogramRow]) -> FrameResult<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(rows.iter().map(|r| r.ano).collect::<Vec<_>>())),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.disciplina.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.bin_start).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.bin_end).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.contagem).collect::<Vec<_>>(),
            )),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

/// One row of `tb_socio_economico` (income class x overall score, per year).
#[derive(Debug, Clone, PartialEq)]
pub struct SocioRow {
    pub classe: String,
    pub low: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub high: f64,
    pub count: i64,
    pub ano: i32,
}

impl SocioRow {
    pub fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("CLASSE", DataType::Utf8, false),
            Field::new("LOW", DataType::Float64, false),
            Field::new("Q1", DataType::Float64, false),
            Field::new("MEDIAN", DataType::Float64, false),
            Field::new("Q3", DataType::Float64, false),
            Field::new("HIGH", DataType::Float64, false),
            Field::new("COUNT", DataType::Int64, false),
            Field::new("ANO", DataType::Int32, false),
        ]))
    }

    pub fn to_record_batch(rows: &[SocioRow]) -> FrameResult<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.classe.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.low).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.q1).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.median).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.q3).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.high).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.count).collect::<Vec<_>>())),
            Arc::new(Int32Array::from(rows.iter().map(|r| r.ano).collect::<Vec<_>>())),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

/// One row of `tb_media_uf` (bracketed five-subject averages per state).
#[derive(Debug, Clone, PartialEq)]
pub struct MediaUfRow {
    pub ano: i32,
    pub uf: String,
    pub id_faixa: i32,
    pub descricao_faixa: String,
    pub qtd_alunos: i64,
}

impl MediaUfRow {
    pub fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("ANO", DataType::Int32, false),
            Field::new("SG_UF_PROVA", DataType::Utf8, false),
            Field::new("ID_FAIXA", DataType::Int32, false),
            Field::new("DESCRICAO_FAIXA", DataType::Utf8, false),
            Field::new("QTD_ALUNOS", DataType::Int64, false),
        ]))
    }

    pub fn to_record_batch(rows: &[MediaUfRow]) -> FrameResult<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(rows.iter().map(|r| r.ano).collect::<Vec<_>>())),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.uf.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Int32Array::from(
                rows.iter().map(|r| r.id_faixa).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.descricao_faixa.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.qtd_alunos).collect::<Vec<_>>(),
            )),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

/// One row of `dim_municipio`.
#[derive(Debug, Clone, PartialEq)]
pub struct MunicipalityRow {
    pub codigo: i32,
    pub nome: String,
    pub uf: String,
}

impl MunicipalityRow {
    pub fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("CO_MUNICIPIO_PROVA", DataType::Int32, false),
            Field::new("NO_MUNICIPIO_PROVA", DataType::Utf8, false),
            Field::new("SG_UF_PROVA", DataType::Utf8, false),
        ]))
    }

    pub fn to_record_batch(rows: &[MunicipalityRow]) -> FrameResult<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(rows.iter().map(|r| r.codigo).collect::<Vec<_>>())),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.nome.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.uf.as_str()).collect::<Vec<_>>(),
            )),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

/// One row of a class-engineering summary (value frequencies per class).
#[derive(Debug, Clone, PartialEq)]
pub struct ClassSummaryRow {
    pub class_name: String,
    pub class_value: String,
    pub total: i64,
}

impl ClassSummaryRow {
    pub fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("class_name", DataType::Utf8, false),
            Field::new("class_value", DataType::Utf8, false),
            Field::new("total", DataType::Int64, false),
        ]))
    }

    pub fn to_record_batch(rows: &[ClassSummaryRow]) -> FrameResult<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.class_name.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.class_value.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.total).collect::<Vec<_>>())),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

/// One row of a cleaning report (rule class x affected rows).
#[derive(Debug, Clone, PartialEq)]
pub struct CleaningReportRow {
    pub rule: String,
    pub affected_rows: i64,
}

impl CleaningReportRow {
    pub fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("rule", DataType::Utf8, false),
            Field::new("affected_rows", DataType::Int64, false),
        ]))
    }

    pub fn to_record_batch(rows: &[CleaningReportRow]) -> FrameResult<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.rule.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.affected_rows).collect::<Vec<_>>(),
            )),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

/// Column set of the row-level `tb_notas` union table.
pub fn notas_schema() -> SchemaRef {
    let mut fields = vec![
        Field::new("ANO", DataType::Int32, false),
        Field::new("ID_INSCRICAO", DataType::Utf8, true),
        Field::new("TP_SEXO", DataType::Utf8, true),
        Field::new("TP_COR_RACA", DataType::Int16, true),
        Field::new("NU_IDADE", DataType::Int16, true),
    ];
    for subject in Subject::ALL {
        fields.push(Field::new(subject.score_column(), DataType::Float32, true));
    }
    Arc::new(Schema::new(fields))
}

/// Project a candidate frame onto the `tb_notas` column set.
pub fn notas_batch_from_frame(frame: &CandidateFrame) -> FrameResult<RecordBatch> {
    use arrow::array::Float32Array;
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from(frame.ano.clone())),
        Arc::new(
            frame
                .id_inscricao
                .iter()
                .map(|o| o.as_deref())
                .collect::<StringArray>(),
        ),
        Arc::new(
            frame
                .sexo
                .iter()
                .map(|o| o.as_deref())
                .collect::<StringArray>(),
        ),
        Arc::new(Int16Array::from(frame.cor_raca.clone())),
        Arc::new(Int16Array::from(frame.idade.clone())),
    ];
    for nota in &frame.notas {
        columns.push(Arc::new(Float32Array::from(nota.clone())));
    }
    Ok(RecordBatch::try_new(notas_schema(), columns)?)
}

fn push_count_mean_fields(fields: &mut Vec<Field>) {
    for subject in Subject::ALL {
        let col = subject.score_column();
        fields.push(Field::new(format!("{col}_count"), DataType::Int64, false));
        fields.push(Field::new(format!("{col}_mean"), DataType::Float64, true));
    }
}

fn push_count_mean_columns<'a>(
    columns: &mut Vec<ArrayRef>,
    rows: impl Iterator<Item = &'a [SubjectCountMean; 5]> + Clone,
) {
    for subject in Subject::ALL {
        let i = subject.index();
        columns.push(Arc::new(Int64Array::from(
            rows.clone().map(|s| s[i].count).collect::<Vec<_>>(),
        )));
        columns.push(Arc::new(Float64Array::from(
            rows.clone().map(|s| s[i].mean).collect::<Vec<_>>(),
        )));
    }
}

#[cfg(test)]
#[path = "gold_test.rs"]
mod tests;
