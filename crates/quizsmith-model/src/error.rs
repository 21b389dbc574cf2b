use crate::validate::DraftErrors;
use thiserror::Error;

/// Boundary classification for failures reported by the persistence and
/// grading collaborators. Rejections carry the collaborator's own message and
/// are surfaced verbatim; everything else gets a generic, retryable wording.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("{0}")]
    Rejected(String),

    #[error("server is not responding, try again later")]
    NoResponse,

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

/// Failure modes of assembling and handing off a draft submission. All of
/// them are recoverable by retrying the user action.
#[derive(Error, Debug)]
pub enum SubmitError {
    /// The whole-draft validation pass found at least one error; the field
    /// detail lives in `errors`.
    #[error("draft failed validation ({} invalid questions)", .errors.invalid_questions())]
    Invalid { errors: DraftErrors },

    /// A question still references a local image the upload collaborator
    /// never resolved. Aborts the whole submission; images resolved earlier
    /// in the same attempt are not rolled back.
    #[error("image file not found: {reference}")]
    ImageMissing { reference: String },

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
