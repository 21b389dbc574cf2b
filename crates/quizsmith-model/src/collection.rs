use crate::question::{ImageRef, Question, QuestionKind, TaskError, TaskPatch, TaskPayload};
use indexmap::IndexMap;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// A draft always holds at least one question; the editor caps out at fifty.
pub const MIN_QUESTIONS: usize = 1;
pub const MAX_QUESTIONS: usize = 50;

/// Ephemeral client-side identity of a question, stable only for the lifetime
/// of the authoring session. Never equal to the server id.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct QuestionKey(Uuid);

impl QuestionKey {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for QuestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.as_hyphenated().fmt(f)
    }
}

/// Insertion-ordered keyed container of questions. The map order is the
/// authoritative display and serialization order; `index` on the wire is
/// recomputed from it at submit time.
#[derive(Debug, Clone)]
pub struct QuestionCollection {
    entries: IndexMap<QuestionKey, Question>,
    active: QuestionKey,
    dirty: bool,
}

impl QuestionCollection {
    /// A fresh collection holding one default single-choice question.
    #[must_use]
    pub fn new() -> Self {
        let key = QuestionKey::fresh();
        let mut entries = IndexMap::new();
        entries.insert(key, Question::new(QuestionKind::SingleChoice));
        Self {
            entries,
            active: key,
            dirty: false,
        }
    }

    /// Rebuilds a collection from fetched questions, assigning fresh client
    /// keys. `None` when `questions` is empty or over capacity.
    #[must_use]
    pub fn from_questions(questions: Vec<Question>) -> Option<Self> {
        if questions.is_empty() || questions.len() > MAX_QUESTIONS {
            return None;
        }
        let entries: IndexMap<_, _> = questions
            .into_iter()
            .map(|question| (QuestionKey::fresh(), question))
            .collect();
        let active = *entries.keys().next()?;
        Some(Self {
            entries,
            active,
            dirty: false,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// A collection is never empty; kept for the conventional pairing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn active(&self) -> QuestionKey {
        self.active
    }

    #[must_use]
    pub fn active_question(&self) -> Option<&Question> {
        self.entries.get(&self.active)
    }

    #[must_use]
    pub fn get(&self, key: QuestionKey) -> Option<&Question> {
        self.entries.get(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = QuestionKey> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionKey, &Question)> {
        self.entries.iter().map(|(key, question)| (*key, question))
    }

    /// Moves the editing focus. Not a content mutation, so the dirty flag is
    /// left alone.
    pub fn set_active(&mut self, key: QuestionKey) -> bool {
        if self.entries.contains_key(&key) {
            self.active = key;
            true
        } else {
            false
        }
    }

    /// Appends a default single-choice question and focuses it. Silent no-op
    /// at capacity.
    pub fn add(&mut self) -> Option<QuestionKey> {
        if self.entries.len() >= MAX_QUESTIONS {
            tracing::debug!(len = self.entries.len(), "add ignored, collection at capacity");
            return None;
        }
        let key = QuestionKey::fresh();
        self.entries.insert(key, Question::new(QuestionKind::SingleChoice));
        self.active = key;
        self.dirty = true;
        Some(key)
    }

    /// Removes `key` and refocuses the first remaining question. Silent no-op
    /// at the floor or for an unknown key.
    pub fn remove(&mut self, key: QuestionKey) -> bool {
        if self.entries.len() <= MIN_QUESTIONS {
            tracing::debug!(%key, "remove ignored, collection at the floor");
            return false;
        }
        if self.entries.shift_remove(&key).is_none() {
            return false;
        }
        if let Some(first) = self.entries.keys().next() {
            self.active = *first;
        }
        self.dirty = true;
        true
    }

    /// Drops `moved` at `target`'s position, shifting everything in between;
    /// the relative order of all other entries is preserved. A no-op when
    /// either key is unknown. The dragged question is focused whenever both
    /// keys exist, even for a degenerate drop onto itself.
    pub fn reorder(&mut self, moved: QuestionKey, target: QuestionKey) {
        let Some(from) = self.entries.get_index_of(&moved) else {
            return;
        };
        let Some(to) = self.entries.get_index_of(&target) else {
            return;
        };
        self.active = moved;
        if from == to {
            return;
        }
        let Some((key, question)) = self.entries.shift_remove_index(from) else {
            return;
        };
        self.entries.shift_insert(to, key, question);
        self.dirty = true;
        tracing::debug!(%moved, from, to, "question reordered");
    }

    /// Switches `key` to `kind`, installing that kind's default payload. This
    /// is the only operation that discards author-entered task content, so it
    /// is gated on the kind actually changing: re-selecting the current kind
    /// leaves the payload untouched.
    pub fn set_kind(&mut self, key: QuestionKey, kind: QuestionKind) -> bool {
        let Some(question) = self.entries.get_mut(&key) else {
            return false;
        };
        if question.kind == kind {
            return false;
        }
        question.kind = kind;
        question.task = TaskPayload::default_for(kind);
        self.dirty = true;
        tracing::debug!(%key, kind = <&'static str>::from(kind), "question kind changed");
        true
    }

    /// Shallow-merges a partial payload into `key`'s task. Unknown keys are
    /// ignored; a patch of the wrong shape is rejected by the question.
    pub fn patch_task(&mut self, key: QuestionKey, patch: TaskPatch) -> Result<(), TaskError> {
        let Some(question) = self.entries.get_mut(&key) else {
            tracing::debug!(%key, "patch ignored, unknown key");
            return Ok(());
        };
        question.apply_patch(patch)?;
        self.dirty = true;
        Ok(())
    }

    pub fn set_text(&mut self, key: QuestionKey, text: impl Into<String>) -> bool {
        let Some(question) = self.entries.get_mut(&key) else {
            return false;
        };
        question.text = text.into();
        self.dirty = true;
        true
    }

    pub fn set_image(&mut self, key: QuestionKey, image: Option<ImageRef>) -> bool {
        let Some(question) = self.entries.get_mut(&key) else {
            return false;
        };
        question.image = image;
        self.dirty = true;
        true
    }

    /// Runs an arbitrary edit against `key`'s question, marking the draft
    /// dirty. The per-question payload operations stay available this way
    /// without handing out a raw `&mut` that would bypass dirty tracking.
    pub fn edit<R>(&mut self, key: QuestionKey, edit: impl FnOnce(&mut Question) -> R) -> Option<R> {
        let question = self.entries.get_mut(&key)?;
        let result = edit(question);
        self.dirty = true;
        Some(result)
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

impl Default for QuestionCollection {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialized as a plain array in insertion order; the ephemeral keys never
/// leave the client.
impl Serialize for QuestionCollection {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.entries.values())
    }
}

impl<'de> Deserialize<'de> for QuestionCollection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let questions = Vec::<Question>::deserialize(deserializer)?;
        let len = questions.len();
        Self::from_questions(questions).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "a test holds between {MIN_QUESTIONS} and {MAX_QUESTIONS} questions, got {len}"
            ))
        })
    }
}
