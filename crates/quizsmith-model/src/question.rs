use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use thiserror::Error;
use utoipa::ToSchema;

/// Answer options an author can attach to a choice question.
pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 4;

/// Term/definition rows in a matching question.
pub const MIN_PAIRS: usize = 2;
pub const MAX_PAIRS: usize = 5;

#[derive(Serialize, Deserialize, ToSchema, IntoStaticStr, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuestionKind {
    SingleChoice,
    MultipleChoice,
    Matching,
    FillInBlank,
}

impl QuestionKind {
    /// Integer code used on the wire.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::SingleChoice => 0,
            Self::MultipleChoice => 1,
            Self::Matching => 2,
            Self::FillInBlank => 3,
        }
    }

    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::SingleChoice),
            1 => Some(Self::MultipleChoice),
            2 => Some(Self::Matching),
            3 => Some(Self::FillInBlank),
            _ => None,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TaskError {
    #[error("operation applies to {expected} questions, this one is {actual}")]
    KindMismatch { expected: &'static str, actual: &'static str },

    #[error("index {index} is out of range")]
    OutOfRange { index: usize },
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MatchingPair {
    pub term: String,
    pub definition: String,
}

impl MatchingPair {
    #[must_use]
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
        }
    }

    fn empty() -> Self {
        Self::new("", "")
    }
}

/// `options` and `answer` are index-parallel; `answer[i]` marks `options[i]`
/// as correct.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct ChoiceTask {
    pub options: Vec<String>,
    pub answer: Vec<bool>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct MatchingTask {
    pub answer: Vec<MatchingPair>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct FillTask {
    pub answer: String,
}

/// Type-specific payload of a question. Serialized without a tag: the kind
/// travels separately as an integer code, and the persistence collaborator
/// stores the payload as an opaque blob.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum TaskPayload {
    Choice(ChoiceTask),
    Matching(MatchingTask),
    Fill(FillTask),
}

impl TaskPayload {
    /// The payload a question of `kind` starts with. Defaults already satisfy
    /// the structural invariants (two slots, one correct mark).
    #[must_use]
    pub fn default_for(kind: QuestionKind) -> Self {
        match kind {
            QuestionKind::SingleChoice | QuestionKind::MultipleChoice => Self::Choice(ChoiceTask {
                options: vec![String::new(), String::new()],
                answer: vec![true, false],
            }),
            QuestionKind::Matching => Self::Matching(MatchingTask {
                answer: vec![MatchingPair::empty(), MatchingPair::empty()],
            }),
            QuestionKind::FillInBlank => Self::Fill(FillTask { answer: String::new() }),
        }
    }

    pub fn to_task_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decodes a stored blob back into the concrete shape for `kind`.
    pub fn from_task_json(kind: QuestionKind, raw: &str) -> serde_json::Result<Self> {
        Ok(match kind {
            QuestionKind::SingleChoice | QuestionKind::MultipleChoice => Self::Choice(serde_json::from_str(raw)?),
            QuestionKind::Matching => Self::Matching(serde_json::from_str(raw)?),
            QuestionKind::FillInBlank => Self::Fill(serde_json::from_str(raw)?),
        })
    }
}

/// Partial task update; `None` fields leave the current value untouched.
/// Applying a patch of the wrong shape is an error, it never changes the kind.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "snake_case")]
pub enum TaskPatch {
    Choice {
        options: Option<Vec<String>>,
        answer: Option<Vec<bool>>,
    },
    Matching {
        answer: Option<Vec<MatchingPair>>,
    },
    Fill {
        answer: Option<String>,
    },
}

/// Reference to the image attached to a question. `Local` is a transient
/// client-side blob handle; it is exchanged for the uploaded URL at submit
/// time.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImageRef {
    Local(String),
    Remote(String),
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Server identity, 0 until the draft has been persisted.
    #[serde(default)]
    pub server_id: i64,
    pub kind: QuestionKind,
    /// Prompt shown to the learner. Matching questions leave it empty, they
    /// have no unified prompt.
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    pub task: TaskPayload,
}

impl Question {
    #[must_use]
    pub fn new(kind: QuestionKind) -> Self {
        Self {
            server_id: 0,
            kind,
            text: String::new(),
            image: None,
            task: TaskPayload::default_for(kind),
        }
    }

    fn kind_mismatch(actual: QuestionKind, expected: QuestionKind) -> TaskError {
        TaskError::KindMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    fn choice_mut(&mut self, expected: QuestionKind) -> Result<&mut ChoiceTask, TaskError> {
        let actual = self.kind;
        if actual != expected {
            return Err(Self::kind_mismatch(actual, expected));
        }
        match &mut self.task {
            TaskPayload::Choice(task) => Ok(task),
            _ => Err(Self::kind_mismatch(actual, expected)),
        }
    }

    fn any_choice_mut(&mut self) -> Result<&mut ChoiceTask, TaskError> {
        let actual = self.kind;
        match actual {
            QuestionKind::SingleChoice | QuestionKind::MultipleChoice => {}
            _ => return Err(Self::kind_mismatch(actual, QuestionKind::SingleChoice)),
        }
        match &mut self.task {
            TaskPayload::Choice(task) => Ok(task),
            _ => Err(Self::kind_mismatch(actual, QuestionKind::SingleChoice)),
        }
    }

    fn matching_mut(&mut self) -> Result<&mut MatchingTask, TaskError> {
        let actual = self.kind;
        match &mut self.task {
            TaskPayload::Matching(task) if actual == QuestionKind::Matching => Ok(task),
            _ => Err(Self::kind_mismatch(actual, QuestionKind::Matching)),
        }
    }

    /// Marks option `index` as the single correct one. Select semantics: the
    /// exactly-one-true invariant can never be broken through this call.
    pub fn mark_correct(&mut self, index: usize) -> Result<(), TaskError> {
        let task = self.choice_mut(QuestionKind::SingleChoice)?;
        if index >= task.answer.len() {
            return Err(TaskError::OutOfRange { index });
        }
        task.answer.fill(false);
        task.answer[index] = true;
        Ok(())
    }

    /// Toggles option `index` in a multiple-choice answer key. Clearing the
    /// last remaining mark is silently refused so the key keeps at least one
    /// correct option.
    pub fn toggle_correct(&mut self, index: usize) -> Result<(), TaskError> {
        let task = self.choice_mut(QuestionKind::MultipleChoice)?;
        if index >= task.answer.len() {
            return Err(TaskError::OutOfRange { index });
        }
        let marked = task.answer.iter().filter(|set| **set).count();
        if task.answer[index] && marked == 1 {
            return Ok(());
        }
        task.answer[index] = !task.answer[index];
        Ok(())
    }

    /// Appends an empty option slot. Silent no-op at the upper bound.
    pub fn push_option(&mut self) -> Result<(), TaskError> {
        let task = self.any_choice_mut()?;
        if task.options.len() < MAX_OPTIONS {
            task.options.push(String::new());
            task.answer.push(false);
        }
        Ok(())
    }

    /// Removes option slot `index`. Silent no-op at the lower bound. If the
    /// removed slot held the last correct mark, the mark moves to the first
    /// option.
    pub fn remove_option(&mut self, index: usize) -> Result<(), TaskError> {
        let task = self.any_choice_mut()?;
        if index >= task.options.len() {
            return Err(TaskError::OutOfRange { index });
        }
        if task.options.len() > MIN_OPTIONS {
            task.options.remove(index);
            task.answer.remove(index);
            if !task.answer.contains(&true) {
                task.answer[0] = true;
            }
        }
        Ok(())
    }

    pub fn set_option_text(&mut self, index: usize, text: impl Into<String>) -> Result<(), TaskError> {
        let task = self.any_choice_mut()?;
        let slot = task.options.get_mut(index).ok_or(TaskError::OutOfRange { index })?;
        *slot = text.into();
        Ok(())
    }

    /// Appends an empty term/definition row. Silent no-op at the upper bound.
    pub fn push_pair(&mut self) -> Result<(), TaskError> {
        let task = self.matching_mut()?;
        if task.answer.len() < MAX_PAIRS {
            task.answer.push(MatchingPair::empty());
        }
        Ok(())
    }

    /// Removes row `index`. Silent no-op at the lower bound.
    pub fn remove_pair(&mut self, index: usize) -> Result<(), TaskError> {
        let task = self.matching_mut()?;
        if index >= task.answer.len() {
            return Err(TaskError::OutOfRange { index });
        }
        if task.answer.len() > MIN_PAIRS {
            task.answer.remove(index);
        }
        Ok(())
    }

    pub fn set_pair_term(&mut self, index: usize, term: impl Into<String>) -> Result<(), TaskError> {
        let task = self.matching_mut()?;
        let pair = task.answer.get_mut(index).ok_or(TaskError::OutOfRange { index })?;
        pair.term = term.into();
        Ok(())
    }

    pub fn set_pair_definition(&mut self, index: usize, definition: impl Into<String>) -> Result<(), TaskError> {
        let task = self.matching_mut()?;
        let pair = task.answer.get_mut(index).ok_or(TaskError::OutOfRange { index })?;
        pair.definition = definition.into();
        Ok(())
    }

    pub fn set_answer_text(&mut self, answer: impl Into<String>) -> Result<(), TaskError> {
        let actual = self.kind;
        match &mut self.task {
            TaskPayload::Fill(task) if actual == QuestionKind::FillInBlank => {
                task.answer = answer.into();
                Ok(())
            }
            _ => Err(Self::kind_mismatch(actual, QuestionKind::FillInBlank)),
        }
    }

    /// Shallow-merges `patch` into the payload; present fields replace, absent
    /// fields keep the current value.
    pub fn apply_patch(&mut self, patch: TaskPatch) -> Result<(), TaskError> {
        let actual = self.kind;
        match (patch, &mut self.task) {
            (TaskPatch::Choice { options, answer }, TaskPayload::Choice(task)) => {
                if let Some(options) = options {
                    task.options = options;
                }
                if let Some(answer) = answer {
                    task.answer = answer;
                }
                Ok(())
            }
            (TaskPatch::Matching { answer }, TaskPayload::Matching(task)) => {
                if let Some(answer) = answer {
                    task.answer = answer;
                }
                Ok(())
            }
            (TaskPatch::Fill { answer }, TaskPayload::Fill(task)) => {
                if let Some(answer) = answer {
                    task.answer = answer;
                }
                Ok(())
            }
            (TaskPatch::Choice { .. }, _) => Err(Self::kind_mismatch(actual, QuestionKind::SingleChoice)),
            (TaskPatch::Matching { .. }, _) => Err(Self::kind_mismatch(actual, QuestionKind::Matching)),
            (TaskPatch::Fill { .. }, _) => Err(Self::kind_mismatch(actual, QuestionKind::FillInBlank)),
        }
    }
}
