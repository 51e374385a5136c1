use super::*;

#[test]
fn missing_file_yields_empty_table() {
    let meta = ReferenceMetadata::load(std::path::Path::new("/nonexistent/meta.yml")).unwrap();
    assert!(meta.is_empty());
    assert!(meta.for_year(2016).is_empty());
}

#[test]
fn load_and_filter_by_year() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("variaveis_meta.yml");
    std::fs::write(
        &path,
        r#"
colunas:
  - ano: 2016
    nome_padrao: RENDA_FAMILIAR
    tipo_padrao: string
    dominio_valores: ["A", "B", "C"]
  - ano: 2016
    nome_padrao: NU_IDADE
    tipo_padrao: int
  - ano: 2020
    nome_padrao: RENDA_FAMILIAR
    tipo_padrao: string
    dominio_valores: ["A", "B", "C", "D"]
"#,
    )
    .unwrap();

    let meta = ReferenceMetadata::load(&path).unwrap();
    let for_2016 = meta.for_year(2016);
    assert_eq!(for_2016.len(), 2);
    assert_eq!(
        for_2016[0].dominio_valores.as_deref(),
        Some(["A".to_string(), "B".to_string(), "C".to_string()].as_slice())
    );
    assert!(meta.for_year(1999).is_empty());
}

#[test]
fn numeric_type_detection() {
    let meta = ColumnMeta {
        ano: 2016,
        nome_padrao: "NU_IDADE".to_string(),
        tipo_padrao: Some("Int64".to_string()),
        dominio_valores: None,
    };
    assert!(meta.is_numeric());

    let text = ColumnMeta {
        ano: 2016,
        nome_padrao: "TP_SEXO".to_string(),
        tipo_padrao: Some("string".to_string()),
        dominio_valores: None,
    };
    assert!(!text.is_numeric());
}
