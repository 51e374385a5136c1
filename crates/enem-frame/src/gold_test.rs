use super::*;
use crate::candidate::tests::sample_frame;
use arrow::array::{Array, Float64Array, Int64Array};

fn count_mean(count: i64, mean: Option<f64>) -> SubjectCountMean {
    SubjectCountMean { count, mean }
}

#[test]
fn annual_stats_schema_carries_all_subject_columns() {
    let schema = AnnualStatsRow::schema();
    // ANO + TOTAL_INSCRITOS + 5 age columns + 5 subjects x 6 stats
    assert_eq!(schema.fields().len(), 2 + 5 + 5 * 6);
    assert!(schema.column_with_name("NOTA_MATEMATICA_median").is_some());
    assert!(schema.column_with_name("IDADE_std").is_some());
}

#[test]
fn annual_stats_batch_matches_rows() {
    let row = AnnualStatsRow {
        ano: 2020,
        total_inscritos: 10,
        idade_mean: Some(18.5),
        idade_std: None,
        idade_min: Some(15.0),
        idade_median: Some(18.0),
        idade_max: Some(40.0),
        subjects: [SubjectStats {
            count: 8,
            mean: 612.0,
            std: 30.0,
            min: 400.0,
            median: 600.0,
            max: 900.0,
        }; 5],
    };
    let batch = AnnualStatsRow::to_record_batch(&[row]).unwrap();
    assert_eq!(batch.num_rows(), 1);

    let idx = batch.schema().index_of("NOTA_REDACAO_mean").unwrap();
    let mean = batch
        .column(idx)
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert_eq!(mean.value(0), 612.0);
}

#[test]
fn geo_batch_has_nullable_means() {
    let row = GeoRow {
        ano: 2020,
        uf: "SP".to_string(),
        municipio_codigo: 3550308,
        municipio_nome: "São Paulo".to_string(),
        inscritos: 3,
        subjects: [
            count_mean(2, Some(650.0)),
            count_mean(0, None),
            count_mean(0, None),
            count_mean(0, None),
            count_mean(0, None),
        ],
    };
    let batch = GeoRow::to_record_batch(&[row]).unwrap();
    let idx = batch
        .schema()
        .index_of("NOTA_CIENCIAS_HUMANAS_mean")
        .unwrap();
    let mean = batch
        .column(idx)
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert!(mean.is_null(0));

    let count_idx = batch
        .schema()
        .index_of("NOTA_CIENCIAS_NATUREZA_count")
        .unwrap();
    let count = batch
        .column(count_idx)
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap();
    assert_eq!(count.value(0), 2);
}

#[test]
fn notas_projection_keeps_contract_columns() {
    let frame = sample_frame();
    let batch = notas_batch_from_frame(&frame).unwrap();
    assert_eq!(batch.num_rows(), frame.len());
    assert_eq!(batch.num_columns(), 10);
    let names: Vec<&str> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().as_str())
        .collect();
    assert_eq!(
        &names[..5],
        &["ANO", "ID_INSCRICAO", "TP_SEXO", "TP_COR_RACA", "NU_IDADE"]
    );
    assert!(names.contains(&"NOTA_REDACAO"));
}

#[test]
fn histogram_and_media_uf_batches() {
    let hist = HistogramRow {
        ano: 2020,
        disciplina: "NOTA_MATEMATICA".to_string(),
        bin_start: 0.0,
        bin_end: 20.0,
        contagem: 7,
    };
    let batch = HistogramRow::to_record_batch(&[hist]).unwrap();
    assert_eq!(batch.num_columns(), 5);

    let media = MediaUfRow {
        ano: 2020,
        uf: "XX".to_string(),
        id_faixa: 1,
        descricao_faixa: "Abaixo de 400".to_string(),
        qtd_alunos: 12,
    };
    let batch = MediaUfRow::to_record_batch(&[media]).unwrap();
    assert_eq!(batch.num_rows(), 1);
}
