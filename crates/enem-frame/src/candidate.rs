//! The in-memory candidate frame
//!
//! Column-oriented storage for one batch of candidate records in the
//! canonical schema. Scores and presence flags are indexed by
//! [`Subject`] so aggregation code never touches column names directly.

use crate::error::{FrameError, FrameResult};
use arrow::array::{
    Array, ArrayRef, Float32Array, Int16Array, Int32Array, Int8Array, StringArray,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use enem_core::Subject;
use std::sync::Arc;

/// Column-oriented batch of candidate records.
///
/// All vectors have the same length; `ANO` is the only non-nullable column
/// (the normalizer forces it to the processing year).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateFrame {
    pub ano: Vec<i32>,
    pub id_inscricao: Vec<Option<String>>,
    pub idade: Vec<Option<i16>>,
    pub sexo: Vec<Option<String>>,
    pub cor_raca: Vec<Option<i16>>,
    pub uf_prova: Vec<Option<String>>,
    pub municipio_codigo: Vec<Option<i32>>,
    pub municipio_nome: Vec<Option<String>>,
    pub renda_familiar: Vec<Option<String>>,
    /// Presence flags in CN, CH, LC, MT order (see [`Subject::presence_index`])
    pub presenca: [Vec<Option<i8>>; 4],
    pub status_redacao: Vec<Option<i8>>,
    /// Subject scores in [`Subject::ALL`] order
    pub notas: [Vec<Option<f32>>; 5],
}

const PRESENCE_COLUMNS: [&str; 4] = [
    "TP_PRESENCA_CN",
    "TP_PRESENCA_CH",
    "TP_PRESENCA_LC",
    "TP_PRESENCA_MT",
];

impl CandidateFrame {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ano: Vec::with_capacity(capacity),
            id_inscricao: Vec::with_capacity(capacity),
            idade: Vec::with_capacity(capacity),
            sexo: Vec::with_capacity(capacity),
            cor_raca: Vec::with_capacity(capacity),
            uf_prova: Vec::with_capacity(capacity),
            municipio_codigo: Vec::with_capacity(capacity),
            municipio_nome: Vec::with_capacity(capacity),
            renda_familiar: Vec::with_capacity(capacity),
            presenca: std::array::from_fn(|_| Vec::with_capacity(capacity)),
            status_redacao: Vec::with_capacity(capacity),
            notas: std::array::from_fn(|_| Vec::with_capacity(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.ano.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ano.is_empty()
    }

    /// Score for a subject at a row, without any validity masking.
    pub fn nota(&self, subject: Subject, row: usize) -> Option<f32> {
        self.notas[subject.index()][row]
    }

    /// Presence flag guarding a subject's score at a row.
    pub fn presenca_for(&self, subject: Subject, row: usize) -> Option<i8> {
        self.presenca[subject.presence_index()][row]
    }

    /// Arrow schema of the canonical layer.
    pub fn schema() -> SchemaRef {
        let mut fields = vec![
            Field::new("ANO", DataType::Int32, false),
            Field::new("ID_INSCRICAO", DataType::Utf8, true),
            Field::new("NU_IDADE", DataType::Int16, true),
            Field::new("TP_SEXO", DataType::Utf8, true),
            Field::new("TP_COR_RACA", DataType::Int16, true),
            Field::new("SG_UF_PROVA", DataType::Utf8, true),
            Field::new("CO_MUNICIPIO_PROVA", DataType::Int32, true),
            Field::new("NO_MUNICIPIO_PROVA", DataType::Utf8, true),
            Field::new("RENDA_FAMILIAR", DataType::Utf8, true),
        ];
        for name in PRESENCE_COLUMNS {
            fields.push(Field::new(name, DataType::Int8, true));
        }
        fields.push(Field::new("TP_STATUS_REDACAO", DataType::Int8, true));
        for subject in Subject::ALL {
            fields.push(Field::new(subject.score_column(), DataType::Float32, true));
        }
        Arc::new(Schema::new(fields))
    }

    /// Convert to an Arrow record batch in canonical column order.
    pub fn to_record_batch(&self) -> FrameResult<RecordBatch> {
        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(self.ano.clone())),
            Arc::new(opt_string_array(&self.id_inscricao)),
            Arc::new(Int16Array::from(self.idade.clone())),
            Arc::new(opt_string_array(&self.sexo)),
            Arc::new(Int16Array::from(self.cor_raca.clone())),
            Arc::new(opt_string_array(&self.uf_prova)),
            Arc::new(Int32Array::from(self.municipio_codigo.clone())),
            Arc::new(opt_string_array(&self.municipio_nome)),
            Arc::new(opt_string_array(&self.renda_familiar)),
        ];
        for presence in &self.presenca {
            columns.push(Arc::new(Int8Array::from(presence.clone())));
        }
        columns.push(Arc::new(Int8Array::from(self.status_redacao.clone())));
        for nota in &self.notas {
            columns.push(Arc::new(Float32Array::from(nota.clone())));
        }
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }

    /// Build a frame from a record batch.
    ///
    /// Columns absent from the batch are filled with nulls (schema gaps in
    /// historical artifacts); a column that exists with an unexpected type
    /// is a structural error. `ANO` is required and must be non-null.
    pub fn from_record_batch(batch: &RecordBatch) -> FrameResult<Self> {
        let rows = batch.num_rows();

        let ano_col = batch
            .column_by_name("ANO")
            .ok_or_else(|| FrameError::ColumnUnavailable {
                column: "ANO".to_string(),
                detail: "missing from batch".to_string(),
            })?;
        let ano_arr = downcast::<Int32Array>(ano_col, "ANO")?;
        let mut ano = Vec::with_capacity(rows);
        for i in 0..rows {
            if ano_arr.is_null(i) {
                return Err(FrameError::ColumnUnavailable {
                    column: "ANO".to_string(),
                    detail: format!("null year at row {i}"),
                });
            }
            ano.push(ano_arr.value(i));
        }

        let mut presenca: [Vec<Option<i8>>; 4] = Default::default();
        for (slot, name) in presenca.iter_mut().zip(PRESENCE_COLUMNS) {
            *slot = read_opt_i8(batch, name, rows)?;
        }

        let mut notas: [Vec<Option<f32>>; 5] = Default::default();
        for (slot, subject) in notas.iter_mut().zip(Subject::ALL) {
            *slot = read_opt_f32(batch, subject.score_column(), rows)?;
        }

        Ok(Self {
            ano,
            id_inscricao: read_opt_string(batch, "ID_INSCRICAO", rows)?,
            idade: read_opt_i16(batch, "NU_IDADE", rows)?,
            sexo: read_opt_string(batch, "TP_SEXO", rows)?,
            cor_raca: read_opt_i16(batch, "TP_COR_RACA", rows)?,
            uf_prova: read_opt_string(batch, "SG_UF_PROVA", rows)?,
            municipio_codigo: read_opt_i32(batch, "CO_MUNICIPIO_PROVA", rows)?,
            municipio_nome: read_opt_string(batch, "NO_MUNICIPIO_PROVA", rows)?,
            renda_familiar: read_opt_string(batch, "RENDA_FAMILIAR", rows)?,
            presenca,
            status_redacao: read_opt_i8(batch, "TP_STATUS_REDACAO", rows)?,
            notas,
        })
    }

    /// Rows selected by index, in the given order.
    pub fn take(&self, indices: &[usize]) -> Self {
        let mut out = Self::with_capacity(indices.len());
        for &i in indices {
            out.ano.push(self.ano[i]);
            out.id_inscricao.push(self.id_inscricao[i].clone());
            out.idade.push(self.idade[i]);
            out.sexo.push(self.sexo[i].clone());
            out.cor_raca.push(self.cor_raca[i]);
            out.uf_prova.push(self.uf_prova[i].clone());
            out.municipio_codigo.push(self.municipio_codigo[i]);
            out.municipio_nome.push(self.municipio_nome[i].clone());
            out.renda_familiar.push(self.renda_familiar[i].clone());
            for (dst, src) in out.presenca.iter_mut().zip(&self.presenca) {
                dst.push(src[i]);
            }
            out.status_redacao.push(self.status_redacao[i]);
            for (dst, src) in out.notas.iter_mut().zip(&self.notas) {
                dst.push(src[i]);
            }
        }
        out
    }

    /// Rows where `mask` is true, preserving order.
    pub fn filter(&self, mask: &[bool]) -> Self {
        let indices: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect();
        self.take(&indices)
    }

    /// Append all rows of `other`.
    pub fn append(&mut self, other: &CandidateFrame) {
        self.ano.extend_from_slice(&other.ano);
        self.id_inscricao.extend(other.id_inscricao.iter().cloned());
        self.idade.extend_from_slice(&other.idade);
        self.sexo.extend(other.sexo.iter().cloned());
        self.cor_raca.extend_from_slice(&other.cor_raca);
        self.uf_prova.extend(other.uf_prova.iter().cloned());
        self.municipio_codigo
            .extend_from_slice(&other.municipio_codigo);
        self.municipio_nome.extend(other.municipio_nome.iter().cloned());
        self.renda_familiar.extend(other.renda_familiar.iter().cloned());
        for (dst, src) in self.presenca.iter_mut().zip(&other.presenca) {
            dst.extend_from_slice(src);
        }
        self.status_redacao.extend_from_slice(&other.status_redacao);
        for (dst, src) in self.notas.iter_mut().zip(&other.notas) {
            dst.extend_from_slice(src);
        }
    }

    /// Sort rows by candidate identifier (stable key for equivalence tests).
    pub fn sort_by_id(&mut self) {
        let mut indices: Vec<usize> = (0..self.len()).collect();
        indices.sort_by(|&a, &b| self.id_inscricao[a].cmp(&self.id_inscricao[b]));
        *self = self.take(&indices);
    }
}

fn opt_string_array(values: &[Option<String>]) -> StringArray {
    values.iter().map(|o| o.as_deref()).collect()
}

fn downcast<'a, T: 'static>(col: &'a ArrayRef, name: &str) -> FrameResult<&'a T> {
    col.as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| FrameError::ColumnUnavailable {
            column: name.to_string(),
            detail: format!("unexpected type {:?}", col.data_type()),
        })
}

macro_rules! read_opt_primitive {
    ($fn_name:ident, $array:ty, $native:ty) => {
        fn $fn_name(
            batch: &RecordBatch,
            name: &str,
            rows: usize,
        ) -> FrameResult<Vec<Option<$native>>> {
            match batch.column_by_name(name) {
                None => Ok(vec![None; rows]),
                Some(col) => {
                    let arr = downcast::<$array>(col, name)?;
                    Ok((0..rows)
                        .map(|i| (!arr.is_null(i)).then(|| arr.value(i)))
                        .collect())
                }
            }
        }
    };
}

read_opt_primitive!(read_opt_i8, Int8Array, i8);
read_opt_primitive!(read_opt_i16, Int16Array, i16);
read_opt_primitive!(read_opt_i32, Int32Array, i32);
read_opt_primitive!(read_opt_f32, Float32Array, f32);

fn read_opt_string(batch: &RecordBatch, name: &str, rows: usize) -> FrameResult<Vec<Option<String>>> {
    match batch.column_by_name(name) {
        None => Ok(vec![None; rows]),
        Some(col) => {
            let arr = downcast::<StringArray>(col, name)?;
            Ok((0..rows)
                .map(|i| (!arr.is_null(i)).then(|| arr.value(i).to_string()))
                .collect())
        }
    }
}

#[cfg(test)]
#[path = "candidate_test.rs"]
pub(crate) mod tests;
