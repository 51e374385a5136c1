use super::*;
use enem_core::Settings;

fn metadata_with_renda_domain(year: i32) -> ReferenceMetadata {
    ReferenceMetadata {
        colunas: vec![
            ColumnMeta {
                ano: year,
                nome_padrao: "RENDA_FAMILIAR".to_string(),
                tipo_padrao: Some("string".to_string()),
                dominio_valores: Some(vec!["A".to_string(), "B".to_string(), "C".to_string()]),
            },
            ColumnMeta {
                ano: year,
                nome_padrao: "TP_PRESENCA_CN".to_string(),
                tipo_padrao: Some("int".to_string()),
                dominio_valores: Some(vec!["0".to_string(), "1".to_string(), "2".to_string()]),
            },
            // references a column the frame does not model; must be skipped
            ColumnMeta {
                ano: year,
                nome_padrao: "TP_ESCOLA".to_string(),
                tipo_padrao: Some("int".to_string()),
                dominio_valores: Some(vec!["1".to_string()]),
            },
        ],
    }
}

fn frame_with_issues() -> CandidateFrame {
    let mut frame = CandidateFrame::default();
    // id "1" duplicated, id "4" with out-of-range age, "Z" out of renda domain
    frame.ano = vec![2016; 5];
    frame.id_inscricao = vec![
        Some("1".to_string()),
        Some("1".to_string()),
        Some("2".to_string()),
        Some("3".to_string()),
        Some("4".to_string()),
    ];
    frame.idade = vec![Some(16), Some(16), Some(17), Some(18), None];
    frame.sexo = vec![None; 5];
    frame.cor_raca = vec![None; 5];
    frame.uf_prova = vec![None; 5];
    frame.municipio_codigo = vec![None; 5];
    frame.municipio_nome = vec![None; 5];
    frame.renda_familiar = vec![
        Some("A".to_string()),
        Some("A".to_string()),
        Some("Z".to_string()),
        Some("C".to_string()),
        Some("B".to_string()),
    ];
    frame.presenca = std::array::from_fn(|_| vec![Some(1); 5]);
    frame.status_redacao = vec![Some(1); 5];
    frame.notas = std::array::from_fn(|_| {
        vec![Some(500.0), Some(500.0), Some(600.0), Some(650.0), Some(700.0)]
    });
    // row 4 violates the math range
    frame.notas[3][4] = Some(1200.0);
    frame
}

#[test]
fn pipeline_filters_invalid_and_duplicates_and_sanitizes_domains() {
    let artifacts = run_cleaning_pipeline(&frame_with_issues(), 2016, &metadata_with_renda_domain(2016));

    assert_eq!(artifacts.cleaned.len(), 3);
    assert_eq!(artifacts.invalid_rows.len(), 1);
    assert_eq!(artifacts.duplicates.len(), 1);
    assert!(artifacts
        .cleaned
        .renda_familiar
        .contains(&Some("UNKNOWN".to_string())));
    assert!(!artifacts.report.is_empty());

    let rules: Vec<&str> = artifacts.report.iter().map(|r| r.rule.as_str()).collect();
    assert!(rules.contains(&"invalid_rows"));
    assert!(rules.contains(&"duplicates"));
    assert!(rules.contains(&"domain:RENDA_FAMILIAR"));
    assert!(!rules.iter().any(|r| r.contains("TP_ESCOLA")));
}

#[test]
fn null_values_never_count_as_violations() {
    let mut frame = CandidateFrame::default();
    frame.ano = vec![2016];
    frame.id_inscricao = vec![Some("1".to_string())];
    frame.idade = vec![None];
    frame.sexo = vec![None];
    frame.cor_raca = vec![None];
    frame.uf_prova = vec![None];
    frame.municipio_codigo = vec![None];
    frame.municipio_nome = vec![None];
    frame.renda_familiar = vec![None];
    frame.presenca = std::array::from_fn(|_| vec![None]);
    frame.status_redacao = vec![None];
    frame.notas = std::array::from_fn(|_| vec![None]);

    let artifacts = run_cleaning_pipeline(&frame, 2016, &ReferenceMetadata::default());
    assert_eq!(artifacts.cleaned.len(), 1);
    assert!(artifacts.invalid_rows.is_empty());
    assert!(artifacts.report.is_empty());
}

#[test]
fn duplicate_quarantine_size_matches_distinct_count() {
    // cleaning twice: second pass sees no duplicates left
    let artifacts = run_cleaning_pipeline(&frame_with_issues(), 2016, &ReferenceMetadata::default());
    let distinct: std::collections::HashSet<_> = artifacts
        .cleaned
        .id_inscricao
        .iter()
        .flatten()
        .cloned()
        .collect();
    assert_eq!(distinct.len(), artifacts.cleaned.len());

    let again = run_cleaning_pipeline(&artifacts.cleaned, 2016, &ReferenceMetadata::default());
    assert!(again.duplicates.is_empty());
    assert_eq!(again.cleaned.len(), artifacts.cleaned.len());
}

#[test]
fn empty_rule_set_applies_numeric_ranges_only() {
    let artifacts = run_cleaning_pipeline(&frame_with_issues(), 2016, &ReferenceMetadata::default());
    // the out-of-domain "Z" stays untouched without metadata
    assert!(artifacts
        .cleaned
        .renda_familiar
        .contains(&Some("Z".to_string())));
    assert_eq!(artifacts.invalid_rows.len(), 1);
}

#[test]
fn clean_year_writes_cleaned_artifact_and_report() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(&Settings::with_data_dir(tmp.path().to_path_buf()));
    let profile = HardwareProfile {
        logical_cores: 4,
        ram_total_gb: 20.0,
        ram_available_gb: 16.0,
        max_ram_for_pipeline_gb: 12.0,
        csv_chunk_rows: 150_000,
        streaming_threshold_gb: 1.5,
    };

    enem_frame::write_frame(&frame_with_issues(), &paths.silver_path(2016)).unwrap();

    let result = clean_year(2016, &paths, &profile, &ReferenceMetadata::default(), false).unwrap();
    assert_eq!(result.row_count, 3);
    assert_eq!(result.invalid_count, 1);
    assert_eq!(result.duplicate_count, 1);
    assert!(!result.streamed);
    assert!(result.cleaned_path.exists());
    assert!(paths.cleaning_report_path(2016).exists());

    let cleaned = read_frame(&result.cleaned_path).unwrap();
    assert_eq!(cleaned.len(), 3);
}

#[test]
fn clean_year_missing_silver_is_structural() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(&Settings::with_data_dir(tmp.path().to_path_buf()));
    let profile = HardwareProfile {
        logical_cores: 4,
        ram_total_gb: 20.0,
        ram_available_gb: 16.0,
        max_ram_for_pipeline_gb: 12.0,
        csv_chunk_rows: 150_000,
        streaming_threshold_gb: 1.5,
    };
    let err = clean_year(1998, &paths, &profile, &ReferenceMetadata::default(), false).unwrap_err();
    assert!(matches!(err, EtlError::ArtifactMissing { .. }));
}
