//! Business logic powering the admin question CRUD routes.

use uuid::Uuid;
use validator::Validate;

use crate::dao::NewQuestion;
use crate::dto::admin::{CreateQuestionRequest, QuestionResponse};
use crate::error::ServiceError;
use crate::state::SharedState;

/// Validate and store a new question.
pub async fn create_question(
    state: &SharedState,
    request: CreateQuestionRequest,
) -> Result<QuestionResponse, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))?;

    let record = state
        .questions()
        .create(NewQuestion {
            text: request.text.trim().to_string(),
            options: request.options,
            correct_id: request.correct_id.trim().to_string(),
            is_active: request.is_active,
        })
        .await?;

    Ok(record.into())
}

/// List questions, optionally including inactive ones.
pub async fn list_questions(
    state: &SharedState,
    include_inactive: bool,
) -> Result<Vec<QuestionResponse>, ServiceError> {
    let records = state.questions().list(include_inactive).await?;
    Ok(records.into_iter().map(Into::into).collect())
}

/// Toggle a question's active flag.
pub async fn set_question_active(
    state: &SharedState,
    id: Uuid,
    active: bool,
) -> Result<QuestionResponse, ServiceError> {
    state
        .questions()
        .set_active(id, active)
        .await?
        .map(Into::into)
        .ok_or_else(|| ServiceError::NotFound(format!("question `{id}` not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::state::AppState;
    use crate::state::room::QuestionOption;

    fn request(text: &str) -> CreateQuestionRequest {
        CreateQuestionRequest {
            text: text.into(),
            options: ["A", "B", "C", "D"]
                .iter()
                .map(|id| QuestionOption {
                    id: (*id).into(),
                    text: (*id).into(),
                })
                .collect(),
            correct_id: "A".into(),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn create_question_trims_and_stores() {
        let state = AppState::new(AppConfig::default());
        let created = create_question(&state, request("  What?  ")).await.unwrap();
        assert_eq!(created.text, "What?");
        assert!(created.is_active);

        let listed = list_questions(&state, false).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn create_question_rejects_malformed_payloads() {
        let state = AppState::new(AppConfig::default());

        let mut missing_correct = request("What?");
        missing_correct.correct_id = "Z".into();
        let err = create_question(&state, missing_correct).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn set_question_active_round_trips_and_reports_missing() {
        let state = AppState::new(AppConfig::default());
        let created = create_question(&state, request("What?")).await.unwrap();

        let updated = set_question_active(&state, created.id, false).await.unwrap();
        assert!(!updated.is_active);
        assert!(list_questions(&state, false).await.unwrap().is_empty());

        let err = set_question_active(&state, Uuid::new_v4(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
