use super::*;
use enem_core::Settings;
use enem_frame::read_frame;

fn test_profile() -> HardwareProfile {
    HardwareProfile {
        logical_cores: 4,
        ram_total_gb: 20.0,
        ram_available_gb: 16.0,
        max_ram_for_pipeline_gb: 12.0,
        csv_chunk_rows: 150_000,
        streaming_threshold_gb: 1.5,
    }
}

fn setup_raw(tmp: &tempfile::TempDir, year: i32, content: &str) -> DataPaths {
    let paths = DataPaths::new(&Settings::with_data_dir(tmp.path().to_path_buf()));
    let dados = tmp
        .path()
        .join(format!("00_raw/microdados_enem_{year}/DADOS"));
    std::fs::create_dir_all(&dados).unwrap();
    std::fs::write(
        dados.join(format!("MICRODADOS_ENEM_{year}.csv")),
        content,
    )
    .unwrap();
    paths
}

#[test]
fn raw_csv_lands_in_silver_with_canonical_schema() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = setup_raw(
        &tmp,
        2020,
        "NU_INSCRICAO;NU_NOTA_MT;TP_PRESENCA_MT;SG_UF_PROVA\n1;650.0;1;sp\n2;700,5;0;ba\n",
    );

    let result = build_silver_for_year(2020, &paths, &test_profile()).unwrap();
    assert_eq!(result.row_count, 2);
    assert!(!result.streamed);

    let frame = read_frame(&result.path).unwrap();
    assert_eq!(frame.ano, vec![2020, 2020]);
    assert_eq!(frame.notas[3], vec![Some(650.0), Some(700.5)]);
    assert_eq!(frame.uf_prova[0], Some("SP".to_string()));
}

#[test]
fn missing_raw_file_is_structural_for_that_year() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(&Settings::with_data_dir(tmp.path().to_path_buf()));
    let err = build_silver_for_year(1998, &paths, &test_profile()).unwrap_err();
    assert!(matches!(err, EtlError::RawInputMissing { year: 1998, .. }));
}

#[test]
fn header_only_raw_file_yields_empty_silver_artifact() {
    let tmp = tempfile::tempdir().unwrap();
    let paths = setup_raw(&tmp, 2001, "NU_INSCRICAO;NU_NOTA_MT\n");

    let result = build_silver_for_year(2001, &paths, &test_profile()).unwrap();
    assert_eq!(result.row_count, 0);
    assert!(result.path.exists());

    let frame = read_frame(&result.path).unwrap();
    assert!(frame.is_empty());
}
