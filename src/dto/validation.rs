//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::dto::admin::CreateQuestionRequest;
use crate::state::room::OPTIONS_PER_QUESTION;

/// Validates the shape of a question payload: non-empty prompt, exactly four
/// options with non-empty ids, and a correct id that names one of them.
pub fn validate_question_payload(request: &CreateQuestionRequest) -> Result<(), ValidationError> {
    if request.text.trim().is_empty() {
        let mut err = ValidationError::new("question_text");
        err.message = Some("question text must not be empty".into());
        return Err(err);
    }

    if request.options.len() != OPTIONS_PER_QUESTION {
        let mut err = ValidationError::new("question_options");
        err.message = Some(
            format!(
                "question must have exactly {OPTIONS_PER_QUESTION} options (got {})",
                request.options.len()
            )
            .into(),
        );
        return Err(err);
    }

    if request
        .options
        .iter()
        .any(|option| option.id.trim().is_empty())
    {
        let mut err = ValidationError::new("question_option_id");
        err.message = Some("option ids must not be empty".into());
        return Err(err);
    }

    let correct_id = request.correct_id.trim();
    if correct_id.is_empty() || !request.options.iter().any(|option| option.id == correct_id) {
        let mut err = ValidationError::new("question_correct_id");
        err.message = Some("correct id must name one of the options".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::room::QuestionOption;

    fn request() -> CreateQuestionRequest {
        CreateQuestionRequest {
            text: "Capital of France?".into(),
            options: ["paris", "lyon", "nice", "lille"]
                .iter()
                .map(|id| QuestionOption {
                    id: (*id).into(),
                    text: (*id).into(),
                })
                .collect(),
            correct_id: "paris".into(),
            is_active: true,
        }
    }

    #[test]
    fn accepts_a_well_formed_question() {
        assert!(validate_question_payload(&request()).is_ok());
    }

    #[test]
    fn rejects_blank_text() {
        let mut bad = request();
        bad.text = "   ".into();
        assert!(validate_question_payload(&bad).is_err());
    }

    #[test]
    fn rejects_wrong_option_counts() {
        let mut three = request();
        three.options.truncate(3);
        assert!(validate_question_payload(&three).is_err());

        let mut five = request();
        five.options.push(QuestionOption {
            id: "extra".into(),
            text: "extra".into(),
        });
        assert!(validate_question_payload(&five).is_err());
    }

    #[test]
    fn rejects_a_correct_id_outside_the_options() {
        let mut bad = request();
        bad.correct_id = "marseille".into();
        assert!(validate_question_payload(&bad).is_err());

        bad.correct_id = "  ".into();
        assert!(validate_question_payload(&bad).is_err());
    }
}
