use crate::collection::QuestionKey;
use crate::draft::TestDraft;
use crate::question::{Question, QuestionKind, TaskPayload};
use indexmap::IndexMap;
use std::collections::HashMap;
use thiserror::Error;

pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 500;
pub const TEXT_MAX: usize = 128;
pub const OPTION_MAX: usize = 30;
pub const PAIR_SIDE_MAX: usize = 100;
pub const FILL_ANSWER_MAX: usize = 100;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    #[error("this field is required")]
    Required,
    #[error("must be at most {max} characters")]
    TooLong { max: usize },
    #[error("duplicate value")]
    Duplicate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairErrors {
    pub term: Option<FieldError>,
    pub definition: Option<FieldError>,
}

impl PairErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.term.is_none() && self.definition.is_none()
    }
}

/// Per-question error set. `options` and `pairs` are index-aligned with the
/// payload vectors so the offending entry can be highlighted directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionErrors {
    pub text: Option<FieldError>,
    pub options: Vec<Option<FieldError>>,
    pub pairs: Vec<PairErrors>,
    pub answer: Option<FieldError>,
}

impl QuestionErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.answer.is_none()
            && self.options.iter().all(Option::is_none)
            && self.pairs.iter().all(PairErrors::is_empty)
    }
}

/// Whole-draft error set, the sole submission gate. Only questions with a
/// non-empty error set appear in `questions`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftErrors {
    pub title: Option<FieldError>,
    pub description: Option<FieldError>,
    pub questions: IndexMap<QuestionKey, QuestionErrors>,
}

impl DraftErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.questions.is_empty()
    }

    #[must_use]
    pub fn invalid_questions(&self) -> usize {
        self.questions.len()
    }
}

fn check_required(value: &str, max: usize) -> Option<FieldError> {
    if value.trim().is_empty() {
        Some(FieldError::Required)
    } else if value.chars().count() > max {
        Some(FieldError::TooLong { max })
    } else {
        None
    }
}

/// Duplicate detection compares trimmed, case-folded values.
fn fold(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Pure and stateless; calling it twice on the same question yields the same
/// error set.
#[must_use]
pub fn validate_question(question: &Question) -> QuestionErrors {
    let mut errors = QuestionErrors::default();

    // Matching questions have no unified prompt; every other kind requires one.
    if question.kind != QuestionKind::Matching {
        errors.text = check_required(&question.text, TEXT_MAX);
    }

    match &question.task {
        TaskPayload::Choice(task) => {
            errors.options = task
                .options
                .iter()
                .map(|option| check_required(option, OPTION_MAX))
                .collect();
        }
        TaskPayload::Matching(task) => {
            let mut frequency: HashMap<String, usize> = HashMap::new();
            for pair in &task.answer {
                for side in [&pair.term, &pair.definition] {
                    let folded = fold(side);
                    if !folded.is_empty() {
                        *frequency.entry(folded).or_default() += 1;
                    }
                }
            }
            // Every occurrence of a repeated value is flagged, on whichever
            // side and in whichever row it appears.
            let check_side = |side: &str| {
                check_required(side, PAIR_SIDE_MAX).or_else(|| {
                    (frequency.get(&fold(side)).copied().unwrap_or_default() > 1).then_some(FieldError::Duplicate)
                })
            };
            errors.pairs = task
                .answer
                .iter()
                .map(|pair| PairErrors {
                    term: check_side(&pair.term),
                    definition: check_side(&pair.definition),
                })
                .collect();
        }
        TaskPayload::Fill(task) => {
            errors.answer = check_required(&task.answer, FILL_ANSWER_MAX);
        }
    }

    errors
}

/// Runs `validate_question` over every entry plus the draft-level fields.
#[must_use]
pub fn validate_draft(draft: &TestDraft) -> DraftErrors {
    let mut errors = DraftErrors {
        title: check_required(&draft.title, TITLE_MAX),
        ..DraftErrors::default()
    };
    if let Some(description) = &draft.description
        && description.chars().count() > DESCRIPTION_MAX
    {
        errors.description = Some(FieldError::TooLong { max: DESCRIPTION_MAX });
    }
    for (key, question) in draft.questions().iter() {
        let question_errors = validate_question(question);
        if !question_errors.is_empty() {
            errors.questions.insert(key, question_errors);
        }
    }
    errors
}
