use super::*;

#[test]
fn intervals_are_half_open_except_last() {
    let brackets = default_brackets();
    assert_eq!(classify(399.99, &brackets).0, 1);
    assert_eq!(classify(400.0, &brackets).0, 2);
    assert_eq!(classify(600.0, &brackets).0, 3);
    assert_eq!(classify(800.0, &brackets).0, 4);
    // last bracket is closed at the ceiling
    assert_eq!(classify(1000.0, &brackets).0, 4);
}

#[test]
fn classify_returns_label() {
    let brackets = default_brackets();
    let (id, label) = classify(250.0, &brackets);
    assert_eq!(id, 1);
    assert_eq!(label, "Abaixo de 400");
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let brackets = load_brackets(std::path::Path::new("/nonexistent/faixas.yml")).unwrap();
    assert_eq!(brackets, default_brackets());
}

#[test]
fn load_from_yaml_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("faixas_media.yml");
    std::fs::write(
        &path,
        r#"
faixas:
  - id: 1
    min: 0
    max: 500
    descricao: "Baixo"
  - id: 2
    min: 500
    max: 1000
    descricao: "Alto"
"#,
    )
    .unwrap();

    let brackets = load_brackets(&path).unwrap();
    assert_eq!(brackets.len(), 2);
    assert_eq!(classify(500.0, &brackets), (2, "Alto".to_string()));
    assert_eq!(classify(1000.0, &brackets).0, 2);
}

#[test]
fn empty_bracket_file_is_a_config_error() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("faixas_media.yml");
    std::fs::write(&path, "faixas: []\n").unwrap();
    assert!(load_brackets(&path).is_err());
}
