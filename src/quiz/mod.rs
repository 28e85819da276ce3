pub mod ai_helper;
pub mod placeholder;

use std::fmt;

use log::debug;

use crate::error::QuizError;
use crate::history::{AttemptLog, NewAttempt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Subject {
    Math,
    Science,
    English,
}

impl Subject {
    pub const ALL: [Subject; 3] = [Subject::Math, Subject::Science, Subject::English];

    pub fn name(&self) -> &'static str {
        match self {
            Subject::Math => "Math",
            Subject::Science => "Science",
            Subject::English => "English",
        }
    }

    /// Matches a subject by name, ignoring case and surrounding whitespace.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL
            .into_iter()
            .find(|subject| subject.name().eq_ignore_ascii_case(text))
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Quiz fields of a session.
///
/// An empty `questions` list means no round is in progress. While a round is
/// active `current_question` always points at an existing question and
/// `score` never exceeds `current_question + 1`.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Quiz {
    pub subject: Option<Subject>,
    pub questions: Vec<Question>,
    pub current_question: usize,
    pub score: usize,
}

/// Result of answering the current question.
#[derive(Debug, Clone)]
pub struct Submission {
    pub question: Question,
    pub selected: String,
    pub is_correct: bool,
    pub is_last: bool,
}

impl Quiz {
    /// Starts a fresh round for `subject`, discarding any round in progress.
    pub fn generate(subject: Subject) -> Self {
        Self {
            subject: Some(subject),
            questions: placeholder::round(),
            current_question: 0,
            score: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.questions.is_empty()
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.current_question)
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Folds a completed round back to idle. The subject is kept so the
    /// next round can default to it.
    pub fn reset(&mut self) {
        self.questions.clear();
        self.current_question = 0;
        self.score = 0;
    }

    /// Answers the current question.
    ///
    /// The attempt is written to `log` before the score or position change,
    /// so a storage failure leaves the round untouched.
    pub async fn submit(
        &mut self,
        user_id: &str,
        log: &dyn AttemptLog,
        selected: &str,
    ) -> Result<Submission, QuizError> {
        let question = self.current().cloned().ok_or(QuizError::NoActiveQuiz)?;
        let is_correct = question.is_correct(selected);

        log.record(&NewAttempt {
            user_id: user_id.to_string(),
            subject: self
                .subject
                .map(|s| s.name().to_string())
                .unwrap_or_else(|| "General".to_string()),
            question: question.text.clone(),
            selected_option: selected.to_string(),
            correct_option: question.correct_answer.clone(),
            is_correct,
        })
        .await?;

        if is_correct {
            self.score += 1;
        }

        let number = self.current_question + 1;
        let is_last = number >= self.questions.len();
        if !is_last {
            self.current_question += 1;
        }
        debug!(
            "{} answered question {}/{} ({}), score {}",
            user_id,
            number,
            self.questions.len(),
            if is_correct { "correct" } else { "wrong" },
            self.score
        );

        Ok(Submission {
            question,
            selected: selected.to_string(),
            is_correct,
            is_last,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Question {
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl Question {
    pub fn new(text: String, options: Vec<String>, correct_answer: String) -> Self {
        Self {
            text,
            options,
            correct_answer,
        }
    }

    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }

    pub fn has_option(&self, answer: &str) -> bool {
        self.options.iter().any(|o| o == answer)
    }
}
