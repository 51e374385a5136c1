//! Pure in-memory aggregation engine
//!
//! Reference implementation of every aggregate shape. Deterministic
//! (grouping via ordered maps) and presence-correct by construction; the
//! DuckDB engine is checked against it.

use crate::aggregate::{
    masked_score, mean, median, presence_availability, quantile_linear, sample_std,
    AggregateEngine,
};
use crate::error::EtlResult;
use enem_core::brackets::{classify, ScoreBracket};
use enem_core::schema::AGE_RANGE;
use enem_core::Subject;
use enem_frame::gold::{
    AnnualStatsRow, GeoRow, GeoUfRow, HistogramRow, MediaUfRow, RaceRow, SocioRow,
    SubjectCountMean, SubjectStats,
};
use enem_frame::{read_frame, CandidateFrame};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Income bracket letter (Q006 vintage) to socioeconomic class label.
pub const INCOME_CLASS_MAP: &[(&str, &str)] = &[
    ("A", "Sem Renda"),
    ("B", "Classe E (< 2 SM)"),
    ("C", "Classe E (< 2 SM)"),
    ("D", "Classe D (2-4 SM)"),
    ("E", "Classe D (2-4 SM)"),
    ("F", "Classe C (4-10 SM)"),
    ("G", "Classe C (4-10 SM)"),
    ("H", "Classe B (10-20 SM)"),
    ("I", "Classe B (10-20 SM)"),
    ("J", "Classe B (10-20 SM)"),
    ("K", "Classe B (10-20 SM)"),
    ("L", "Classe B (10-20 SM)"),
    ("M", "Classe A (> 20 SM)"),
    ("N", "Classe A (> 20 SM)"),
    ("O", "Classe A (> 20 SM)"),
    ("P", "Classe A (> 20 SM)"),
    ("Q", "Classe A (> 20 SM)"),
];

/// Display order of socioeconomic classes.
pub const INCOME_CLASS_ORDER: [&str; 6] = [
    "Classe A (> 20 SM)",
    "Classe B (10-20 SM)",
    "Classe C (4-10 SM)",
    "Classe D (2-4 SM)",
    "Classe E (< 2 SM)",
    "Sem Renda",
];

fn income_class(letter: &str) -> Option<&'static str> {
    INCOME_CLASS_MAP
        .iter()
        .find(|(k, _)| *k == letter)
        .map(|(_, v)| *v)
}

/// Count/mean accumulator for count-and-mean shaped groups.
#[derive(Default)]
struct GroupAcc {
    rows: i64,
    ids: HashSet<String>,
    count: [i64; 5],
    sum: [f64; 5],
}

impl GroupAcc {
    fn push(&mut self, frame: &CandidateFrame, availability: &[bool; 4], row: usize) {
        self.rows += 1;
        if let Some(id) = &frame.id_inscricao[row] {
            self.ids.insert(id.clone());
        }
        for subject in Subject::ALL {
            if let Some(value) = masked_score(frame, availability, subject, row) {
                self.count[subject.index()] += 1;
                self.sum[subject.index()] += value;
            }
        }
    }

    /// Enrollment is registration, not attendance: distinct identifiers,
    /// falling back to the group size when no identifiers exist at all.
    fn inscritos(&self) -> i64 {
        if self.ids.is_empty() {
            self.rows
        } else {
            self.ids.len() as i64
        }
    }

    fn subjects(&self) -> [SubjectCountMean; 5] {
        std::array::from_fn(|i| SubjectCountMean {
            count: self.count[i],
            mean: (self.count[i] > 0).then(|| self.sum[i] / self.count[i] as f64),
        })
    }
}

/// In-memory aggregation strategy.
#[derive(Debug, Default, Clone, Copy)]
pub struct InMemoryEngine;

impl InMemoryEngine {
    /// Per-year national statistics (full descriptive stats per subject).
    pub fn annual_stats(&self, frame: &CandidateFrame) -> Vec<AnnualStatsRow> {
        struct YearAcc {
            rows: i64,
            ids: HashSet<String>,
            ages: Vec<f64>,
            scores: [Vec<f64>; 5],
        }

        let availability = presence_availability(frame);
        let mut groups: BTreeMap<i32, YearAcc> = BTreeMap::new();

        for row in 0..frame.len() {
            let acc = groups.entry(frame.ano[row]).or_insert_with(|| YearAcc {
                rows: 0,
                ids: HashSet::new(),
                ages: Vec::new(),
                scores: Default::default(),
            });
            acc.rows += 1;
            if let Some(id) = &frame.id_inscricao[row] {
                acc.ids.insert(id.clone());
            }
            if let Some(age) = frame.idade[row] {
                let age = f64::from(age);
                if (AGE_RANGE.0..=AGE_RANGE.1).contains(&age) {
                    acc.ages.push(age);
                }
            }
            for subject in Subject::ALL {
                if let Some(value) = masked_score(frame, &availability, subject, row) {
                    acc.scores[subject.index()].push(value);
                }
            }
        }

        groups
            .into_iter()
            .map(|(ano, mut acc)| {
                acc.ages.sort_by(f64::total_cmp);
                let idade = if acc.ages.is_empty() {
                    // Null, not zero: a zero age would trip the data checks.
                    (None, None, None, None, None)
                } else {
                    (
                        mean(&acc.ages),
                        sample_std(&acc.ages),
                        acc.ages.first().copied(),
                        Some(median(&acc.ages)),
                        acc.ages.last().copied(),
                    )
                };

                let subjects = std::array::from_fn(|i| {
                    let values = &mut acc.scores[i];
                    values.sort_by(f64::total_cmp);
                    if values.is_empty() {
                        SubjectStats::default()
                    } else {
                        SubjectStats {
                            count: values.len() as i64,
                            mean: mean(values).unwrap_or(0.0),
                            std: sample_std(values).unwrap_or(0.0),
                            min: values[0],
                            median: median(values),
                            max: values[values.len() - 1],
                        }
                    }
                });

                AnnualStatsRow {
                    ano,
                    total_inscritos: if acc.ids.is_empty() {
                        acc.rows
                    } else {
                        acc.ids.len() as i64
                    },
                    idade_mean: idade.0,
                    idade_std: idade.1,
                    idade_min: idade.2,
                    idade_median: idade.3,
                    idade_max: idade.4,
                    subjects,
                }
            })
            .collect()
    }

    /// Per-year, per-race aggregate; rows with a null race code stay out.
    pub fn race_year(&self, frame: &CandidateFrame) -> Vec<RaceRow> {
        let availability = presence_availability(frame);
        let mut groups: BTreeMap<(i32, i16), GroupAcc> = BTreeMap::new();
        for row in 0..frame.len() {
            let Some(cor_raca) = frame.cor_raca[row] else {
                continue;
            };
            groups
                .entry((frame.ano[row], cor_raca))
                .or_default()
                .push(frame, &availability, row);
        }
        groups
            .into_iter()
            .map(|((ano, cor_raca), acc)| RaceRow {
                ano,
                cor_raca,
                inscritos: acc.inscritos(),
                subjects: acc.subjects(),
            })
            .collect()
    }

    /// Score histograms: `bins` uniform buckets over the score range, the
    /// last bucket right-closed. Subjects with no valid scores are omitted.
    pub fn histogram(&self, frame: &CandidateFrame, bins: usize) -> Vec<HistogramRow> {
        let availability = presence_availability(frame);
        let (range_min, range_max) = (0.0f64, 1000.0f64);
        let width = (range_max - range_min) / bins as f64;
        let mut years: BTreeMap<i32, [Vec<i64>; 5]> = BTreeMap::new();

        for row in 0..frame.len() {
            for subject in Subject::ALL {
                if let Some(value) = masked_score(frame, &availability, subject, row) {
                    let counts = years
                        .entry(frame.ano[row])
                        .or_insert_with(|| std::array::from_fn(|_| vec![0; bins]));
                    let mut bin = ((value - range_min) / width) as usize;
                    if bin >= bins {
                        bin = bins - 1;
                    }
                    counts[subject.index()][bin] += 1;
                }
            }
        }

        let mut rows = Vec::new();
        for (ano, per_subject) in years {
            for subject in Subject::ALL {
                let counts = &per_subject[subject.index()];
                if counts.iter().all(|&c| c == 0) {
                    continue;
                }
                for (bin, &contagem) in counts.iter().enumerate() {
                    rows.push(HistogramRow {
                        ano,
                        disciplina: subject.score_column().to_string(),
                        bin_start: range_min + width * bin as f64,
                        bin_end: range_min + width * (bin + 1) as f64,
                        contagem,
                    });
                }
            }
        }
        rows
    }

    /// Income-class distribution of the overall score, restricted to
    /// candidates present in every component with a regular essay.
    pub fn socio_economico(&self, frame: &CandidateFrame) -> Vec<SocioRow> {
        let mut groups: BTreeMap<(i32, &'static str), Vec<f64>> = BTreeMap::new();

        for row in 0..frame.len() {
            let fully_present = frame.presenca.iter().all(|p| p[row] == Some(1))
                && frame.status_redacao[row] == Some(1);
            if !fully_present {
                continue;
            }
            let Some(classe) = frame.renda_familiar[row]
                .as_deref()
                .and_then(income_class)
            else {
                continue;
            };

            let scores: Vec<f64> = Subject::ALL
                .iter()
                .filter_map(|s| frame.nota(*s, row).map(f64::from))
                .collect();
            let Some(overall) = mean(&scores) else {
                continue;
            };
            groups.entry((frame.ano[row], classe)).or_default().push(overall);
        }

        let mut rows: Vec<SocioRow> = groups
            .into_iter()
            .map(|((ano, classe), mut values)| {
                values.sort_by(f64::total_cmp);
                SocioRow {
                    classe: classe.to_string(),
                    low: values[0],
                    q1: quantile_linear(&values, 0.25),
                    median: median(&values),
                    q3: quantile_linear(&values, 0.75),
                    high: values[values.len() - 1],
                    count: values.len() as i64,
                    ano,
                }
            })
            .collect();

        rows.sort_by_key(|r| {
            INCOME_CLASS_ORDER
                .iter()
                .position(|c| *c == r.classe)
                .unwrap_or(INCOME_CLASS_ORDER.len())
        });
        rows
    }

    /// Five-subject average bucketed into configured brackets, per state.
    /// Candidates missing any of the five valid scores are excluded; a null
    /// state is reported under the `XX` sentinel.
    pub fn media_uf(&self, frame: &CandidateFrame, brackets: &[ScoreBracket]) -> Vec<MediaUfRow> {
        let availability = presence_availability(frame);
        let mut groups: BTreeMap<(i32, String, i32, String), i64> = BTreeMap::new();
        let mut incomplete = 0usize;

        for row in 0..frame.len() {
            let scores: Vec<f64> = Subject::ALL
                .iter()
                .filter_map(|s| masked_score(frame, &availability, *s, row))
                .collect();
            if scores.len() < Subject::ALL.len() {
                incomplete += 1;
                continue;
            }
            let media = (scores.iter().sum::<f64>() / scores.len() as f64 * 100.0).round() / 100.0;
            let (id_faixa, descricao) = classify(media, brackets);
            let uf = frame.uf_prova[row].clone().unwrap_or_else(|| "XX".to_string());
            *groups
                .entry((frame.ano[row], uf, id_faixa, descricao))
                .or_insert(0) += 1;
        }

        if incomplete > 0 {
            log::info!("media_uf: {incomplete} candidates dropped for incomplete scores");
        }

        groups
            .into_iter()
            .map(|((ano, uf, id_faixa, descricao_faixa), qtd_alunos)| MediaUfRow {
                ano,
                uf,
                id_faixa,
                descricao_faixa,
                qtd_alunos,
            })
            .collect()
    }

    /// (year, state, municipality) aggregate over an in-memory frame.
    pub fn grouped_geo(&self, frame: &CandidateFrame) -> Vec<GeoRow> {
        let availability = presence_availability(frame);
        let mut groups: BTreeMap<(i32, String, i32, String), GroupAcc> = BTreeMap::new();
        for row in 0..frame.len() {
            // Null-group policy: geography-keyed aggregates drop unmapped rows.
            let (Some(uf), Some(codigo), Some(nome)) = (
                frame.uf_prova[row].as_ref(),
                frame.municipio_codigo[row],
                frame.municipio_nome[row].as_ref(),
            ) else {
                continue;
            };
            groups
                .entry((frame.ano[row], uf.clone(), codigo, nome.clone()))
                .or_default()
                .push(frame, &availability, row);
        }
        groups
            .into_iter()
            .map(|((ano, uf, municipio_codigo, municipio_nome), acc)| GeoRow {
                ano,
                uf,
                municipio_codigo,
                municipio_nome,
                inscritos: acc.inscritos(),
                subjects: acc.subjects(),
            })
            .collect()
    }

    /// (year, state) aggregate over an in-memory frame.
    pub fn grouped_geo_uf(&self, frame: &CandidateFrame) -> Vec<GeoUfRow> {
        let availability = presence_availability(frame);
        let mut groups: BTreeMap<(i32, String), GroupAcc> = BTreeMap::new();
        for row in 0..frame.len() {
            let Some(uf) = frame.uf_prova[row].as_ref() else {
                continue;
            };
            groups
                .entry((frame.ano[row], uf.clone()))
                .or_default()
                .push(frame, &availability, row);
        }
        groups
            .into_iter()
            .map(|((ano, uf), acc)| GeoUfRow {
                ano,
                uf,
                inscritos: acc.inscritos(),
                subjects: acc.subjects(),
            })
            .collect()
    }
}

impl AggregateEngine for InMemoryEngine {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    fn municipality_year(&self, cleaned: &Path, _year: i32) -> EtlResult<Vec<GeoRow>> {
        Ok(self.grouped_geo(&read_frame(cleaned)?))
    }

    fn state_year(&self, cleaned: &Path, _year: i32) -> EtlResult<Vec<GeoUfRow>> {
        Ok(self.grouped_geo_uf(&read_frame(cleaned)?))
    }
}
