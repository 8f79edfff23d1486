//! crates/trivia_core/src/domain.rs
//!
//! Defines the pure, core data structures for the trivia content pipeline.
//! These structs are independent of any database or serialization format.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Number of answers the authoring surface requires on every question.
pub const ANSWERS_PER_QUESTION: usize = 4;

/// A trivia category as stored in the content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    /// Display label. Also the grouping key of the exported question mapping.
    pub name: String,
    /// Opaque display hint, e.g. `#ff8800`.
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: Uuid,
    /// Reference to a `Category`; the store owns the relationship.
    pub category_id: Uuid,
    pub question: String,
    pub answers: Vec<String>,
    pub correct_answer: String,
    pub created_at: DateTime<Utc>,
}

/// The name and color of a category, as resolved by the store-side join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLabel {
    pub name: String,
    pub color: String,
}

/// A question together with the label of the category it points at.
/// `category` is `None` when the reference did not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorizedQuestion {
    pub question: Question,
    pub category: Option<CategoryLabel>,
}

/// The trimmed form of a question written into the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionProjection {
    pub question: String,
    pub answers: Vec<String>,
    pub correct_answer: String,
}

impl From<Question> for QuestionProjection {
    fn from(q: Question) -> Self {
        Self {
            question: q.question,
            answers: q.answers,
            correct_answer: q.correct_answer,
        }
    }
}

/// Question projections keyed by category name.
pub type QuestionsByCategory = BTreeMap<String, Vec<QuestionProjection>>;

/// The pair of documents produced by one export run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub categories: Vec<Category>,
    pub questions_by_category: QuestionsByCategory,
}

//=========================================================================================
// Drafts (input to create/update) and their validation
//=========================================================================================

/// Why a draft was refused before reaching the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Blank(&'static str),
    #[error("A question needs exactly {expected} answers, got {actual}")]
    AnswerCount { expected: usize, actual: usize },
    #[error("Answer {0} must not be empty")]
    BlankAnswer(usize),
    #[error("The correct answer '{0}' is not one of the answers")]
    CorrectAnswerNotListed(String),
}

/// Fields of a category supplied by an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub color: String,
}

impl CategoryDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Blank("Category name"));
        }
        if self.color.trim().is_empty() {
            return Err(ValidationError::Blank("Category color"));
        }
        Ok(())
    }
}

/// Fields of a question supplied by an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub category_id: Uuid,
    pub question: String,
    pub answers: Vec<String>,
    pub correct_answer: String,
}

impl QuestionDraft {
    /// Checks the draft against the authoring rules: non-blank text, exactly
    /// `ANSWERS_PER_QUESTION` non-blank answers, and a correct answer that is
    /// one of them.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.question.trim().is_empty() {
            return Err(ValidationError::Blank("Question text"));
        }
        if self.answers.len() != ANSWERS_PER_QUESTION {
            return Err(ValidationError::AnswerCount {
                expected: ANSWERS_PER_QUESTION,
                actual: self.answers.len(),
            });
        }
        if let Some(idx) = self.answers.iter().position(|a| a.trim().is_empty()) {
            return Err(ValidationError::BlankAnswer(idx + 1));
        }
        if self.correct_answer.trim().is_empty() {
            return Err(ValidationError::Blank("Correct answer"));
        }
        if !self.answers.contains(&self.correct_answer) {
            return Err(ValidationError::CorrectAnswerNotListed(
                self.correct_answer.clone(),
            ));
        }
        Ok(())
    }
}
