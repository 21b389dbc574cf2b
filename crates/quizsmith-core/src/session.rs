use crate::error::SessionError;
use crate::matching::{ClickOutcome, MatchingBoard};
use quizsmith_model::question::{MatchingPair, Question, QuestionKind, TaskPayload};
use quizsmith_model::wire::AnswerResultSubmission;
use rand::seq::SliceRandom;
use serde::Serialize;

/// A learner's answer, shaped like the question's task answer so the grading
/// collaborator can interpret it without re-deriving the kind.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum UserAnswer {
    Choice(Vec<bool>),
    Matching(Vec<MatchingPair>),
    Fill(String),
}

impl UserAnswer {
    /// Whether the learner has committed anything. A matching arrangement is
    /// always an answer: the learner's permutation may legitimately equal the
    /// initial shuffle.
    #[must_use]
    pub fn is_answered(&self) -> bool {
        match self {
            Self::Choice(flags) => flags.contains(&true),
            Self::Matching(_) => true,
            Self::Fill(text) => !text.trim().is_empty(),
        }
    }

    fn seed(question: &Question) -> Self {
        match &question.task {
            TaskPayload::Choice(task) => Self::Choice(vec![false; task.options.len()]),
            TaskPayload::Matching(task) => {
                // The learner declares their own correspondence by permuting a
                // shuffled definition column; terms stay in authored order.
                let mut definitions: Vec<String> = task.answer.iter().map(|pair| pair.definition.clone()).collect();
                definitions.shuffle(&mut rand::rng());
                Self::Matching(
                    task.answer
                        .iter()
                        .zip(definitions)
                        .map(|(pair, definition)| MatchingPair::new(pair.term.clone(), definition))
                        .collect(),
                )
            }
            TaskPayload::Fill(_) => Self::Fill(String::new()),
        }
    }
}

/// Sequential navigation over a fixed, already-fetched question list,
/// capturing one answer per question as the learner interacts. Terminal once
/// finished.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    questions: Vec<Question>,
    answers: Vec<UserAnswer>,
    cursor: usize,
    board: MatchingBoard,
    finished: bool,
}

impl AssessmentSession {
    pub fn new(questions: Vec<Question>) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }
        let answers = questions.iter().map(UserAnswer::seed).collect();
        Ok(Self {
            questions,
            answers,
            cursor: 0,
            board: MatchingBoard::new(),
            finished: false,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.cursor + 1 < self.questions.len()
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.cursor]
    }

    #[must_use]
    pub fn current_answer(&self) -> &UserAnswer {
        &self.answers[self.cursor]
    }

    #[must_use]
    pub fn board(&self) -> &MatchingBoard {
        &self.board
    }

    /// Steps back one question; floored at the first. Reports whether the
    /// cursor moved. Moving always resets the matching selection.
    pub fn prev(&mut self) -> bool {
        if self.finished || !self.has_prev() {
            return false;
        }
        self.cursor -= 1;
        self.board.reset();
        true
    }

    /// Steps forward one question; capped at the last.
    pub fn next(&mut self) -> bool {
        if self.finished || !self.has_next() {
            return false;
        }
        self.cursor += 1;
        self.board.reset();
        true
    }

    fn guard_kind(&self, expected: QuestionKind) -> Result<(), SessionError> {
        if self.finished {
            return Err(SessionError::Finished);
        }
        let actual = self.questions[self.cursor].kind;
        if actual == expected {
            Ok(())
        } else {
            Err(SessionError::AnswerKind {
                expected: expected.into(),
                actual: actual.into(),
            })
        }
    }

    /// Single choice: commits the chosen index as the only `true` flag.
    pub fn select_option(&mut self, index: usize) -> Result<(), SessionError> {
        self.guard_kind(QuestionKind::SingleChoice)?;
        let UserAnswer::Choice(flags) = &mut self.answers[self.cursor] else {
            return Err(SessionError::AnswerKind {
                expected: QuestionKind::SingleChoice.into(),
                actual: "corrupt answer",
            });
        };
        if index >= flags.len() {
            return Err(SessionError::OutOfRange { index });
        }
        flags.fill(false);
        flags[index] = true;
        Ok(())
    }

    /// Multiple choice: toggles freely; the learner may clear every flag,
    /// which simply leaves the question unanswered.
    pub fn toggle_option(&mut self, index: usize) -> Result<(), SessionError> {
        self.guard_kind(QuestionKind::MultipleChoice)?;
        let UserAnswer::Choice(flags) = &mut self.answers[self.cursor] else {
            return Err(SessionError::AnswerKind {
                expected: QuestionKind::MultipleChoice.into(),
                actual: "corrupt answer",
            });
        };
        if index >= flags.len() {
            return Err(SessionError::OutOfRange { index });
        }
        flags[index] = !flags[index];
        Ok(())
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        self.guard_kind(QuestionKind::FillInBlank)?;
        let UserAnswer::Fill(answer) = &mut self.answers[self.cursor] else {
            return Err(SessionError::AnswerKind {
                expected: QuestionKind::FillInBlank.into(),
                actual: "corrupt answer",
            });
        };
        *answer = text.into();
        Ok(())
    }

    pub fn click_term(&mut self, index: usize) -> Result<ClickOutcome, SessionError> {
        self.guard_kind(QuestionKind::Matching)?;
        let UserAnswer::Matching(pairs) = &mut self.answers[self.cursor] else {
            return Err(SessionError::AnswerKind {
                expected: QuestionKind::Matching.into(),
                actual: "corrupt answer",
            });
        };
        Ok(self.board.click_term(index, pairs))
    }

    pub fn click_definition(&mut self, index: usize) -> Result<ClickOutcome, SessionError> {
        self.guard_kind(QuestionKind::Matching)?;
        let UserAnswer::Matching(pairs) = &mut self.answers[self.cursor] else {
            return Err(SessionError::AnswerKind {
                expected: QuestionKind::Matching.into(),
                actual: "corrupt answer",
            });
        };
        Ok(self.board.click_definition(index, pairs))
    }

    #[must_use]
    pub fn unanswered(&self) -> usize {
        self.answers.iter().filter(|answer| !answer.is_answered()).count()
    }

    /// Finishes the attempt from any position and emits one submission per
    /// question in order. Finishing with unanswered questions is a guarded
    /// transition: it goes through only once the confirmation collaborator
    /// has signed off (`confirmed`).
    pub fn finish(&mut self, confirmed: bool) -> Result<Vec<AnswerResultSubmission>, SessionError> {
        if self.finished {
            return Err(SessionError::Finished);
        }
        let unanswered = self.unanswered();
        if unanswered > 0 && !confirmed {
            return Err(SessionError::ConfirmationRequired { unanswered });
        }

        let mut submissions = Vec::with_capacity(self.questions.len());
        for (question, answer) in self.questions.iter().zip(&self.answers) {
            submissions.push(AnswerResultSubmission {
                question_id: question.server_id,
                kind: question.kind.code(),
                user_answer_json: serde_json::to_string(answer)?,
            });
        }
        self.finished = true;
        tracing::debug!(total = submissions.len(), unanswered, "attempt finished");
        Ok(submissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizsmith_model::question::{ChoiceTask, FillTask, MatchingTask};

    fn single(id: i64) -> Question {
        let mut question = Question::new(QuestionKind::SingleChoice);
        question.server_id = id;
        question.task = TaskPayload::Choice(ChoiceTask {
            options: vec!["a".into(), "b".into(), "c".into()],
            answer: vec![true, false, false],
        });
        question
    }

    fn matching(id: i64) -> Question {
        let mut question = Question::new(QuestionKind::Matching);
        question.server_id = id;
        question.task = TaskPayload::Matching(MatchingTask {
            answer: vec![
                MatchingPair::new("one", "uno"),
                MatchingPair::new("two", "dos"),
                MatchingPair::new("three", "tres"),
            ],
        });
        question
    }

    fn fill(id: i64) -> Question {
        let mut question = Question::new(QuestionKind::FillInBlank);
        question.server_id = id;
        question.task = TaskPayload::Fill(FillTask { answer: "ergo".into() });
        question
    }

    #[test]
    fn rejects_an_empty_question_list() {
        assert!(matches!(AssessmentSession::new(Vec::new()), Err(SessionError::Empty)));
    }

    #[test]
    fn navigation_clamps_at_both_ends() {
        let mut session = AssessmentSession::new(vec![single(1), fill(2), matching(3)]).unwrap();
        assert!(!session.prev());
        assert_eq!(session.position(), 0);
        assert!(session.next());
        assert!(session.next());
        assert!(!session.next());
        assert_eq!(session.position(), 2);
        assert!(session.prev());
        assert_eq!(session.position(), 1);
    }

    #[test]
    fn moving_resets_the_matching_selection() {
        let mut session = AssessmentSession::new(vec![matching(1), fill(2)]).unwrap();
        session.click_term(0).unwrap();
        assert_eq!(session.board().selected_term(), Some(0));
        session.next();
        assert_eq!(session.board().selected_term(), None);
    }

    #[test]
    fn single_choice_commits_exactly_one_flag() {
        let mut session = AssessmentSession::new(vec![single(1)]).unwrap();
        assert_eq!(session.unanswered(), 1);
        session.select_option(2).unwrap();
        session.select_option(0).unwrap();
        assert_eq!(session.current_answer(), &UserAnswer::Choice(vec![true, false, false]));
        assert_eq!(session.unanswered(), 0);
    }

    #[test]
    fn capture_ops_check_the_question_kind() {
        let mut session = AssessmentSession::new(vec![single(1)]).unwrap();
        let err = session.set_text("nope").unwrap_err();
        assert!(matches!(
            err,
            SessionError::AnswerKind {
                expected: "fill_in_blank",
                actual: "single_choice",
            }
        ));
        assert!(matches!(session.toggle_option(0), Err(SessionError::AnswerKind { .. })));
        assert!(matches!(session.select_option(9), Err(SessionError::OutOfRange { index: 9 })));
    }

    #[test]
    fn matching_answer_starts_as_a_permutation_of_the_definitions() {
        let session = AssessmentSession::new(vec![matching(1)]).unwrap();
        let UserAnswer::Matching(pairs) = session.current_answer() else {
            panic!("expected a matching answer");
        };
        let terms: Vec<_> = pairs.iter().map(|pair| pair.term.as_str()).collect();
        assert_eq!(terms, vec!["one", "two", "three"]);
        let mut definitions: Vec<_> = pairs.iter().map(|pair| pair.definition.as_str()).collect();
        definitions.sort_unstable();
        assert_eq!(definitions, vec!["dos", "tres", "uno"]);
    }

    #[test]
    fn finish_is_guarded_until_confirmed() {
        let mut session = AssessmentSession::new(vec![single(1), fill(2)]).unwrap();
        session.select_option(1).unwrap();
        let err = session.finish(false).unwrap_err();
        assert!(matches!(err, SessionError::ConfirmationRequired { unanswered: 1 }));
        assert!(!session.is_finished());

        let submissions = session.finish(true).unwrap();
        assert!(session.is_finished());
        assert_eq!(submissions.len(), 2);
        assert_eq!(submissions[0].question_id, 1);
        assert_eq!(submissions[0].kind, QuestionKind::SingleChoice.code());
        assert_eq!(submissions[0].user_answer_json, "[false,true,false]");
        assert_eq!(submissions[1].user_answer_json, "\"\"");
    }

    #[test]
    fn finish_without_gaps_needs_no_confirmation() {
        let mut session = AssessmentSession::new(vec![single(1), matching(2)]).unwrap();
        session.select_option(0).unwrap();
        session.next();
        // The shuffled arrangement already counts as an answer.
        assert_eq!(session.unanswered(), 0);
        assert!(session.finish(false).is_ok());
    }

    #[test]
    fn a_finished_attempt_is_terminal() {
        let mut session = AssessmentSession::new(vec![single(1)]).unwrap();
        session.select_option(0).unwrap();
        session.finish(false).unwrap();
        assert!(matches!(session.finish(true), Err(SessionError::Finished)));
        assert!(matches!(session.select_option(0), Err(SessionError::Finished)));
        assert!(!session.next());
        assert!(!session.prev());
    }

    #[test]
    fn matching_clicks_permute_the_learner_answer() {
        let mut session = AssessmentSession::new(vec![matching(1)]).unwrap();
        let UserAnswer::Matching(before) = session.current_answer().clone() else {
            panic!("expected a matching answer");
        };
        session.click_term(0).unwrap();
        let outcome = session.click_definition(2).unwrap();
        assert!(matches!(outcome, ClickOutcome::Swapped { a: 0, b: 2 }));
        let UserAnswer::Matching(after) = session.current_answer() else {
            panic!("expected a matching answer");
        };
        assert_eq!(after[0].definition, before[2].definition);
        assert_eq!(after[2].definition, before[0].definition);
        assert_eq!(after[1], before[1]);
    }
}
