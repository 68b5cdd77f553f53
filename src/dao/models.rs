//! Persistence-facing models for the question bank.

use std::time::SystemTime;

use uuid::Uuid;

use crate::state::room::{Question, QuestionOption};

/// Input for creating a question in the bank.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    /// Prompt text.
    pub text: String,
    /// Exactly four labeled options.
    pub options: Vec<QuestionOption>,
    /// Id of the correct option.
    pub correct_id: String,
    /// Whether the question is immediately eligible for rounds.
    pub is_active: bool,
}

/// A question as stored in the bank.
#[derive(Debug, Clone)]
pub struct QuestionRecord {
    /// Bank-assigned identifier.
    pub id: Uuid,
    /// Prompt text.
    pub text: String,
    /// The four options.
    pub options: Vec<QuestionOption>,
    /// Id of the correct option.
    pub correct_id: String,
    /// Whether the question is eligible for rounds.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

impl QuestionRecord {
    /// Project the record into the round-facing question shape.
    pub fn to_question(&self) -> Question {
        Question {
            text: self.text.clone(),
            options: self.options.clone(),
            correct_id: self.correct_id.clone(),
        }
    }
}
