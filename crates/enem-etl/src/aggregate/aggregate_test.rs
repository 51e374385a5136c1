use super::*;
use enem_core::brackets::default_brackets;
use enem_frame::write_frame;

fn empty_row(frame: &mut CandidateFrame, ano: i32, id: &str) {
    frame.ano.push(ano);
    frame.id_inscricao.push(Some(id.to_string()));
    frame.idade.push(None);
    frame.sexo.push(None);
    frame.cor_raca.push(None);
    frame.uf_prova.push(None);
    frame.municipio_codigo.push(None);
    frame.municipio_nome.push(None);
    frame.renda_familiar.push(None);
    for slot in frame.presenca.iter_mut() {
        slot.push(None);
    }
    frame.status_redacao.push(None);
    for slot in frame.notas.iter_mut() {
        slot.push(None);
    }
}

fn set_subject(frame: &mut CandidateFrame, row: usize, subject: enem_core::Subject, nota: f32, presenca: i8) {
    frame.notas[subject.index()][row] = Some(nota);
    frame.presenca[subject.presence_index()][row] = Some(presenca);
}

fn geo_row(frame: &mut CandidateFrame, row: usize, uf: &str, codigo: i32, nome: &str) {
    frame.uf_prova[row] = Some(uf.to_string());
    frame.municipio_codigo[row] = Some(codigo);
    frame.municipio_nome[row] = Some(nome.to_string());
}

#[test]
fn presence_masks_scores_before_averaging() {
    use enem_core::Subject::Matematica;
    let mut frame = CandidateFrame::default();
    empty_row(&mut frame, 2020, "1");
    empty_row(&mut frame, 2020, "2");
    empty_row(&mut frame, 2020, "3");
    set_subject(&mut frame, 0, Matematica, 650.0, 1);
    // out of range, flagged present
    frame.notas[Matematica.index()][1] = Some(1200.0);
    frame.presenca[Matematica.presence_index()][1] = Some(1);
    // in range but absent: the flag wins over the stray value
    set_subject(&mut frame, 2, Matematica, 700.0, 0);

    let stats = InMemoryEngine.annual_stats(&frame);
    assert_eq!(stats.len(), 1);
    let math = &stats[0].subjects[Matematica.index()];
    assert_eq!(math.count, 1);
    assert_eq!(math.mean, 650.0);
    assert_eq!(stats[0].total_inscritos, 3);
}

#[test]
fn unavailable_presence_column_falls_back_to_range_check() {
    use enem_core::Subject::Redacao;
    let mut frame = CandidateFrame::default();
    empty_row(&mut frame, 2001, "1");
    empty_row(&mut frame, 2001, "2");
    // 2001 has no presence data at all; scores count by range alone
    frame.notas[Redacao.index()][0] = Some(800.0);
    frame.notas[Redacao.index()][1] = Some(500.0);

    let stats = InMemoryEngine.annual_stats(&frame);
    let redacao = &stats[0].subjects[Redacao.index()];
    assert_eq!(redacao.count, 2);
    assert_eq!(redacao.mean, 650.0);
}

#[test]
fn partial_presence_keeps_attended_subjects_only() {
    use enem_core::Subject::{CienciasHumanas, CienciasNatureza, Matematica};
    let mut frame = CandidateFrame::default();
    empty_row(&mut frame, 2020, "1");
    set_subject(&mut frame, 0, CienciasNatureza, 600.0, 1);
    set_subject(&mut frame, 0, CienciasHumanas, 620.0, 1);
    // absent on the math day, score is a data-entry artifact
    set_subject(&mut frame, 0, Matematica, 999.0, 0);

    let stats = InMemoryEngine.annual_stats(&frame);
    let row = &stats[0];
    assert_eq!(row.subjects[CienciasNatureza.index()].count, 1);
    assert_eq!(row.subjects[CienciasHumanas.index()].count, 1);
    assert_eq!(row.subjects[Matematica.index()].count, 0);
    assert_eq!(row.subjects[Matematica.index()].mean, 0.0);
}

#[test]
fn subject_counts_never_exceed_enrollment() {
    let mut frame = CandidateFrame::default();
    for i in 0..20 {
        empty_row(&mut frame, 2020, &format!("{i}"));
        geo_row(&mut frame, i, "SP", 3550308, "São Paulo");
        // a quarter of the group skipped the math day
        set_subject(
            &mut frame,
            i,
            enem_core::Subject::Matematica,
            500.0,
            (i % 4 != 0) as i8,
        );
    }

    let rows = InMemoryEngine.grouped_geo(&frame);
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.inscritos, 20);
    assert_eq!(row.subjects[enem_core::Subject::Matematica.index()].count, 15);
    for subject in &row.subjects {
        assert!(subject.count <= row.inscritos);
    }
}

#[test]
fn geography_aggregates_drop_null_keyed_rows_but_annual_keeps_them() {
    let mut frame = CandidateFrame::default();
    empty_row(&mut frame, 2020, "1");
    empty_row(&mut frame, 2020, "2");
    geo_row(&mut frame, 0, "BA", 2927408, "Salvador");
    // row 1 has no geography at all
    set_subject(&mut frame, 0, enem_core::Subject::Redacao, 700.0, 1);
    set_subject(&mut frame, 1, enem_core::Subject::Redacao, 900.0, 1);

    let geo = InMemoryEngine.grouped_geo(&frame);
    assert_eq!(geo.len(), 1);
    assert_eq!(geo[0].inscritos, 1);

    let annual = InMemoryEngine.annual_stats(&frame);
    assert_eq!(annual[0].total_inscritos, 2);
    assert_eq!(annual[0].subjects[enem_core::Subject::Redacao.index()].count, 2);
}

#[test]
fn duckdb_and_memory_engines_agree() {
    let tmp = tempfile::tempdir().unwrap();
    let cleaned = tmp.path().join("cleaned.parquet");

    let mut frame = CandidateFrame::default();
    for i in 0..30 {
        empty_row(&mut frame, 2020, &format!("{i}"));
        let (uf, codigo, nome) = if i % 2 == 0 {
            ("SP", 3550308, "São Paulo")
        } else {
            ("BA", 2927408, "Salvador")
        };
        geo_row(&mut frame, i, uf, codigo, nome);
        for subject in enem_core::Subject::ALL {
            set_subject(
                &mut frame,
                i,
                subject,
                300.0 + (i as f32 * 23.0) % 700.0,
                (i % 5 != 0) as i8,
            );
        }
    }
    // a couple of rows with no geography must be invisible to both engines
    empty_row(&mut frame, 2020, "x");
    write_frame(&frame, &cleaned).unwrap();

    let from_duck = DuckDbEngine.municipality_year(&cleaned, 2020).unwrap();
    let from_memory = InMemoryEngine.municipality_year(&cleaned, 2020).unwrap();
    assert_eq!(from_duck.len(), from_memory.len());
    for (d, m) in from_duck.iter().zip(&from_memory) {
        assert_eq!((d.ano, &d.uf, d.municipio_codigo), (m.ano, &m.uf, m.municipio_codigo));
        assert_eq!(d.inscritos, m.inscritos);
        for (ds, ms) in d.subjects.iter().zip(&m.subjects) {
            assert_eq!(ds.count, ms.count);
            match (ds.mean, ms.mean) {
                (Some(a), Some(b)) => assert!((a - b).abs() < 1e-6, "{a} vs {b}"),
                (a, b) => assert_eq!(a, b),
            }
        }
    }

    let uf_duck = DuckDbEngine.state_year(&cleaned, 2020).unwrap();
    let uf_memory = InMemoryEngine.state_year(&cleaned, 2020).unwrap();
    assert_eq!(uf_duck.len(), uf_memory.len());
    for (d, m) in uf_duck.iter().zip(&uf_memory) {
        assert_eq!((d.ano, &d.uf, d.inscritos), (m.ano, &m.uf, m.inscritos));
    }
}

#[test]
fn socio_requires_full_presence_and_regular_essay() {
    let mut frame = CandidateFrame::default();
    for i in 0..4 {
        empty_row(&mut frame, 2020, &format!("{i}"));
        frame.renda_familiar[i] = Some("M".to_string());
        for slot in frame.presenca.iter_mut() {
            slot[i] = Some(1);
        }
        frame.status_redacao[i] = Some(1);
        for slot in frame.notas.iter_mut() {
            slot[i] = Some(600.0 + i as f32 * 10.0);
        }
    }
    // absent on one component: excluded from the socioeconomic table
    frame.presenca[0][3] = Some(0);

    let rows = InMemoryEngine.socio_economico(&frame);
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.classe, "Classe A (> 20 SM)");
    assert_eq!(row.count, 3);
    assert_eq!(row.low, 600.0);
    assert_eq!(row.high, 620.0);
    assert_eq!(row.median, 610.0);
}

#[test]
fn socio_rows_follow_class_display_order() {
    let mut frame = CandidateFrame::default();
    for (i, letter) in ["A", "M", "F"].iter().enumerate() {
        empty_row(&mut frame, 2020, &format!("{i}"));
        frame.renda_familiar[i] = Some(letter.to_string());
        for slot in frame.presenca.iter_mut() {
            slot[i] = Some(1);
        }
        frame.status_redacao[i] = Some(1);
        for slot in frame.notas.iter_mut() {
            slot[i] = Some(500.0);
        }
    }

    let rows = InMemoryEngine.socio_economico(&frame);
    let classes: Vec<&str> = rows.iter().map(|r| r.classe.as_str()).collect();
    assert_eq!(
        classes,
        vec!["Classe A (> 20 SM)", "Classe C (4-10 SM)", "Sem Renda"]
    );
}

#[test]
fn media_uf_requires_all_five_scores_and_buckets_them() {
    let mut frame = CandidateFrame::default();
    // complete candidate averaging 650 → third bracket
    empty_row(&mut frame, 2020, "1");
    frame.uf_prova[0] = Some("RJ".to_string());
    for subject in enem_core::Subject::ALL {
        set_subject(&mut frame, 0, subject, 650.0, 1);
    }
    // missing one subject → dropped
    empty_row(&mut frame, 2020, "2");
    frame.uf_prova[1] = Some("RJ".to_string());
    for subject in &enem_core::Subject::ALL[..4] {
        set_subject(&mut frame, 1, *subject, 650.0, 1);
    }
    // complete but null state → XX sentinel
    empty_row(&mut frame, 2020, "3");
    for subject in enem_core::Subject::ALL {
        set_subject(&mut frame, 2, subject, 1000.0, 1);
    }

    let rows = InMemoryEngine.media_uf(&frame, &default_brackets());
    assert_eq!(rows.len(), 2);

    let rj = rows.iter().find(|r| r.uf == "RJ").unwrap();
    assert_eq!(rj.id_faixa, 3);
    assert_eq!(rj.qtd_alunos, 1);

    let unknown = rows.iter().find(|r| r.uf == "XX").unwrap();
    // a perfect 1000 average lands in the top (closed) bracket
    assert_eq!(unknown.id_faixa, 4);
}

#[test]
fn histogram_uses_fifty_right_closed_bins() {
    use enem_core::Subject::Matematica;
    let mut frame = CandidateFrame::default();
    for (i, nota) in [0.0f32, 19.9, 20.0, 1000.0].iter().enumerate() {
        empty_row(&mut frame, 2020, &format!("{i}"));
        set_subject(&mut frame, i, Matematica, *nota, 1);
    }

    let rows = InMemoryEngine.histogram(&frame, 50);
    // only math has data: exactly 50 bins for one year
    assert_eq!(rows.len(), 50);
    assert!(rows.iter().all(|r| r.disciplina == "NOTA_MATEMATICA"));

    let first = &rows[0];
    assert_eq!((first.bin_start, first.bin_end), (0.0, 20.0));
    assert_eq!(first.contagem, 2); // 0.0 and 19.9

    let second = &rows[1];
    assert_eq!(second.contagem, 1); // 20.0 belongs to [20, 40)

    let last = &rows[49];
    assert_eq!(last.contagem, 1); // 1000.0 lands in the closed last bin
    assert_eq!(last.bin_end, 1000.0);
}

#[test]
fn race_aggregate_skips_null_codes() {
    let mut frame = CandidateFrame::default();
    empty_row(&mut frame, 2020, "1");
    empty_row(&mut frame, 2020, "2");
    frame.cor_raca[0] = Some(3);
    set_subject(&mut frame, 0, enem_core::Subject::CienciasHumanas, 580.0, 1);
    set_subject(&mut frame, 1, enem_core::Subject::CienciasHumanas, 580.0, 1);

    let rows = InMemoryEngine.race_year(&frame);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].cor_raca, 3);
    assert_eq!(rows[0].inscritos, 1);
}

#[test]
fn annual_stats_with_no_ages_keeps_age_columns_null() {
    let mut frame = CandidateFrame::default();
    empty_row(&mut frame, 2020, "1");
    set_subject(&mut frame, 0, enem_core::Subject::Matematica, 700.0, 1);

    let stats = InMemoryEngine.annual_stats(&frame);
    assert_eq!(stats[0].idade_mean, None);
    assert_eq!(stats[0].idade_max, None);
    // nota columns fill with zeros instead, matching the artifact contract
    assert_eq!(stats[0].subjects[0].mean, 0.0);
}

#[test]
fn quantiles_interpolate_linearly() {
    let values = [1.0, 2.0, 3.0, 4.0];
    assert_eq!(quantile_linear(&values, 0.5), 2.5);
    assert_eq!(quantile_linear(&values, 0.25), 1.75);
    assert_eq!(quantile_linear(&values, 0.0), 1.0);
    assert_eq!(quantile_linear(&values, 1.0), 4.0);
    assert_eq!(median(&[5.0]), 5.0);
}
