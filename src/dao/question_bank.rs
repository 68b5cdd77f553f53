//! Abstraction over the question bank backend.

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{NewQuestion, QuestionRecord};
use crate::dao::storage::StorageResult;
use crate::state::room::Question;

/// Supplies questions for rounds and backs the admin CRUD surface.
///
/// The distinguished "no questions available" condition surfaces as
/// `Ok(None)` from [`QuestionBank::random_active`].
pub trait QuestionBank: Send + Sync {
    /// Pick one active question uniformly at random.
    fn random_active(&self) -> BoxFuture<'static, StorageResult<Option<Question>>>;
    /// Store a new question.
    fn create(&self, input: NewQuestion) -> BoxFuture<'static, StorageResult<QuestionRecord>>;
    /// List questions, optionally including inactive ones.
    fn list(&self, include_inactive: bool)
    -> BoxFuture<'static, StorageResult<Vec<QuestionRecord>>>;
    /// Toggle a question's active flag; `None` when the id is unknown.
    fn set_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionRecord>>>;
}
