//! DTO definitions used by the admin question CRUD API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dao::QuestionRecord;
use crate::dto::format_system_time;
use crate::state::room::QuestionOption;

/// Payload for creating a question in the bank.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = crate::dto::validation::validate_question_payload))]
pub struct CreateQuestionRequest {
    /// Prompt text.
    pub text: String,
    /// Exactly four labeled options.
    pub options: Vec<QuestionOption>,
    /// Id of the correct option; must be one of `options`.
    pub correct_id: String,
    /// Whether the question is immediately eligible for rounds.
    #[serde(default)]
    pub is_active: bool,
}

/// Request to toggle a question's active flag.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveRequest {
    /// New active flag.
    pub is_active: bool,
}

/// Filter parameters for listing questions.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ListQuestionsQuery {
    /// Pass `all=1` to include inactive questions.
    pub all: Option<String>,
}

impl ListQuestionsQuery {
    /// Whether inactive questions should be included.
    pub fn include_inactive(&self) -> bool {
        self.all.as_deref() == Some("1")
    }
}

/// A question as exposed to administrators, correct answer included.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
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
    /// Creation timestamp, RFC 3339.
    pub created_at: String,
}

impl From<QuestionRecord> for QuestionResponse {
    fn from(record: QuestionRecord) -> Self {
        Self {
            id: record.id,
            text: record.text,
            options: record.options,
            correct_id: record.correct_id,
            is_active: record.is_active,
            created_at: format_system_time(record.created_at),
        }
    }
}
