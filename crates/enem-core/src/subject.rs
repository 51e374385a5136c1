//! Exam subject vocabulary
//!
//! The five ENEM components and their column-name mapping. The essay is
//! applied on the language-exam day, so its presence check is keyed to the
//! `LC` flag.

/// One of the five scored exam components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    CienciasNatureza,
    CienciasHumanas,
    LinguagensCodigos,
    Matematica,
    Redacao,
}

impl Subject {
    pub const ALL: [Subject; 5] = [
        Subject::CienciasNatureza,
        Subject::CienciasHumanas,
        Subject::LinguagensCodigos,
        Subject::Matematica,
        Subject::Redacao,
    ];

    /// Position of this subject in score arrays (stable, matches `ALL`).
    pub fn index(self) -> usize {
        match self {
            Subject::CienciasNatureza => 0,
            Subject::CienciasHumanas => 1,
            Subject::LinguagensCodigos => 2,
            Subject::Matematica => 3,
            Subject::Redacao => 4,
        }
    }

    /// Canonical score column name.
    pub fn score_column(self) -> &'static str {
        match self {
            Subject::CienciasNatureza => "NOTA_CIENCIAS_NATUREZA",
            Subject::CienciasHumanas => "NOTA_CIENCIAS_HUMANAS",
            Subject::LinguagensCodigos => "NOTA_LINGUAGENS_CODIGOS",
            Subject::Matematica => "NOTA_MATEMATICA",
            Subject::Redacao => "NOTA_REDACAO",
        }
    }

    /// Canonical presence column guarding this subject's score.
    pub fn presence_column(self) -> &'static str {
        match self {
            Subject::CienciasNatureza => "TP_PRESENCA_CN",
            Subject::CienciasHumanas => "TP_PRESENCA_CH",
            // The essay is graded from the language-exam day sitting.
            Subject::LinguagensCodigos | Subject::Redacao => "TP_PRESENCA_LC",
            Subject::Matematica => "TP_PRESENCA_MT",
        }
    }

    /// Index into the four physical presence columns (CN, CH, LC, MT).
    pub fn presence_index(self) -> usize {
        match self {
            Subject::CienciasNatureza => 0,
            Subject::CienciasHumanas => 1,
            Subject::LinguagensCodigos | Subject::Redacao => 2,
            Subject::Matematica => 3,
        }
    }
}
