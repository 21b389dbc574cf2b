use crate::collection::QuestionCollection;
use crate::error::SubmitError;
use crate::question::ImageRef;
use crate::validate::validate_draft;
use crate::wire::{QuestionSubmission, TestSubmission};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The in-memory test being authored. Owned exclusively by one session; the
/// persistence collaborator takes over on submit.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TestDraft {
    /// Server identity of the test, 0 until persisted.
    #[serde(default)]
    pub server_id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    questions: QuestionCollection,
    #[serde(skip)]
    dirty: bool,
}

impl TestDraft {
    /// A new draft starts with one default single-choice question.
    #[must_use]
    pub fn new() -> Self {
        Self {
            server_id: 0,
            title: String::new(),
            description: None,
            questions: QuestionCollection::new(),
            dirty: false,
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.dirty = true;
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.dirty = true;
    }

    #[must_use]
    pub fn questions(&self) -> &QuestionCollection {
        &self.questions
    }

    pub fn questions_mut(&mut self) -> &mut QuestionCollection {
        &mut self.questions
    }

    /// Navigation-guard capability: the router collaborator checks this flag
    /// and runs its own confirm-to-discard prompt. Declining simply leaves
    /// the draft as it is, there is no rollback.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty || self.questions.is_dirty()
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
        self.questions.mark_clean();
    }

    /// Local image references still held by the draft, in question order.
    /// These are the only uploads worth performing; references the author
    /// removed before submit are simply dropped.
    #[must_use]
    pub fn pending_uploads(&self) -> Vec<&str> {
        self.questions
            .iter()
            .filter_map(|(_, question)| match &question.image {
                Some(ImageRef::Local(reference)) => Some(reference.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Assembles the wire payload: validates the whole draft, recomputes each
    /// question's index from collection order, serializes every task to its
    /// opaque blob, and swaps local image references for the URLs in
    /// `resolved`. A local reference absent from `resolved` aborts the whole
    /// submission.
    pub fn to_submission(&self, resolved: &HashMap<String, String>) -> Result<TestSubmission, SubmitError> {
        let errors = validate_draft(self);
        if !errors.is_empty() {
            tracing::debug!(invalid = errors.invalid_questions(), "submission blocked by validation");
            return Err(SubmitError::Invalid { errors });
        }

        let mut questions = Vec::with_capacity(self.questions.len());
        for (index, (_, question)) in self.questions.iter().enumerate() {
            let image_url = match &question.image {
                None => None,
                Some(ImageRef::Remote(url)) => Some(url.clone()),
                Some(ImageRef::Local(reference)) => {
                    let url = resolved.get(reference).ok_or_else(|| SubmitError::ImageMissing {
                        reference: reference.clone(),
                    })?;
                    Some(url.clone())
                }
            };
            questions.push(QuestionSubmission {
                id: question.server_id,
                test_id: self.server_id,
                index: index as i32,
                kind: question.kind.code(),
                text: (!question.text.is_empty()).then(|| question.text.clone()),
                task_json: question.task.to_task_json()?,
                image_url,
            });
        }

        tracing::debug!(questions = questions.len(), "submission assembled");
        Ok(TestSubmission {
            title: self.title.clone(),
            description: self.description.clone(),
            questions,
        })
    }
}

impl Default for TestDraft {
    fn default() -> Self {
        Self::new()
    }
}
