use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Graded outcome of one question within an attempt. Owned by the grading
/// collaborator; read here only for aggregation.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResult {
    pub question_id: i64,
    pub correct: bool,
}

/// One attempt at a test. `ended_at` stays unset while the attempt is in
/// progress.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub test_id: i64,
    pub user_id: Uuid,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub score: u32,
    pub answer_results: Vec<AnswerResult>,
}

impl TestResult {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.ended_at.is_some()
    }
}

/// Display aggregate over already-graded attempts of one test. Not a grading
/// step.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultStats {
    pub completed: usize,
    pub in_progress: usize,
    /// Percentage over completed attempts, `None` when there is nothing to
    /// average.
    pub average: Option<f64>,
}

impl ResultStats {
    /// Two-decimal rendering, or an em dash when no attempt has finished.
    #[must_use]
    pub fn average_label(&self) -> String {
        match self.average {
            Some(average) => format!("{average:.2}%"),
            None => "—".to_owned(),
        }
    }
}

/// Pure projection over a result set already filtered to one test. The
/// denominator follows per-attempt answer counts, so attempts taken against
/// different revisions of the test weigh by their own length.
#[must_use]
pub fn project(results: &[TestResult]) -> ResultStats {
    let completed: Vec<&TestResult> = results.iter().filter(|result| result.is_completed()).collect();
    let in_progress = results.len() - completed.len();

    let answered: usize = completed.iter().map(|result| result.answer_results.len()).sum();
    let average = (answered > 0).then(|| {
        let total: u32 = completed.iter().map(|result| result.score).sum();
        f64::from(total) / answered as f64 * 100.0
    });

    ResultStats {
        completed: completed.len(),
        in_progress,
        average,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn attempt(score: u32, answers: usize, completed: bool) -> TestResult {
        let started_at = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();
        TestResult {
            test_id: 1,
            user_id: Uuid::nil(),
            started_at,
            ended_at: completed.then(|| started_at + chrono::Duration::minutes(11)),
            score,
            answer_results: (0..answers)
                .map(|index| AnswerResult {
                    question_id: index as i64,
                    correct: index % 2 == 0,
                })
                .collect(),
        }
    }

    #[test]
    fn averages_over_completed_attempts() {
        let stats = project(&[attempt(1, 2, true), attempt(2, 2, true)]);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.in_progress, 0);
        assert_eq!(stats.average, Some(75.0));
        assert_eq!(stats.average_label(), "75.00%");
    }

    #[test]
    fn in_progress_attempts_are_counted_but_never_averaged() {
        let stats = project(&[attempt(2, 2, true), attempt(0, 2, false)]);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.average, Some(100.0));
    }

    #[test]
    fn empty_denominator_renders_a_dash() {
        assert_eq!(project(&[]).average_label(), "—");
        let stats = project(&[attempt(0, 3, false)]);
        assert_eq!(stats.average, None);
        assert_eq!(stats.average_label(), "—");
    }

    #[test]
    fn attempts_of_different_lengths_weigh_by_their_own_answers() {
        let stats = project(&[attempt(1, 2, true), attempt(3, 4, true)]);
        // (1 + 3) / (2 + 4) * 100
        assert_eq!(stats.average_label(), "66.67%");
    }
}
