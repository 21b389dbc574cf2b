use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Author → persistence collaborator payload. `task_json` is an opaque blob:
/// the collaborator stores and returns it unchanged, only the grading service
/// ever looks inside.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestSubmission {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub questions: Vec<QuestionSubmission>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSubmission {
    pub id: i64,
    pub test_id: i64,
    /// Position recomputed from collection order at submit time.
    pub index: i32,
    /// Wire code of the question kind, see [`crate::question::QuestionKind::code`].
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub task_json: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Learner → grading collaborator payload, one per question of the finished
/// attempt. The answer blob mirrors the shape of the question's task answer.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResultSubmission {
    pub question_id: i64,
    #[serde(rename = "type")]
    pub kind: u8,
    pub user_answer_json: String,
}
