use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("an assessment needs at least one question")]
    Empty,

    #[error("the attempt is already finished")]
    Finished,

    #[error("answer shape mismatch: expected {expected}, got {actual}")]
    AnswerKind {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("index {index} is out of range")]
    OutOfRange { index: usize },

    /// Finishing with unanswered questions is permitted, but only once the
    /// confirmation collaborator has signed off.
    #[error("{unanswered} questions have no answer yet")]
    ConfirmationRequired { unanswered: usize },

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}
