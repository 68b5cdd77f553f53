//! In-memory question bank backend.
//!
//! Question persistence is an external concern; this backend carries the
//! storage seam for a single process with no durability.

use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use futures::FutureExt;
use futures::future::BoxFuture;
use rand::seq::IndexedRandom;
use uuid::Uuid;

use crate::dao::models::{NewQuestion, QuestionRecord};
use crate::dao::question_bank::QuestionBank;
use crate::dao::storage::StorageResult;
use crate::state::room::Question;

/// Process-local question bank with no persistence.
#[derive(Debug, Default)]
pub struct MemoryQuestionBank {
    records: Mutex<Vec<QuestionRecord>>,
}

impl MemoryQuestionBank {
    /// Create an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_records<T>(&self, f: impl FnOnce(&mut Vec<QuestionRecord>) -> T) -> T {
        let mut records = self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut records)
    }
}

impl QuestionBank for MemoryQuestionBank {
    fn random_active(&self) -> BoxFuture<'static, StorageResult<Option<Question>>> {
        let question = self.with_records(|records| {
            let active: Vec<&QuestionRecord> =
                records.iter().filter(|record| record.is_active).collect();
            active
                .choose(&mut rand::rng())
                .map(|record| record.to_question())
        });
        futures::future::ready(Ok(question)).boxed()
    }

    fn create(&self, input: NewQuestion) -> BoxFuture<'static, StorageResult<QuestionRecord>> {
        let record = QuestionRecord {
            id: Uuid::new_v4(),
            text: input.text,
            options: input.options,
            correct_id: input.correct_id,
            is_active: input.is_active,
            created_at: SystemTime::now(),
        };
        self.with_records(|records| records.push(record.clone()));
        futures::future::ready(Ok(record)).boxed()
    }

    fn list(
        &self,
        include_inactive: bool,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionRecord>>> {
        let listed = self.with_records(|records| {
            records
                .iter()
                .filter(|record| include_inactive || record.is_active)
                .cloned()
                .collect()
        });
        futures::future::ready(Ok(listed)).boxed()
    }

    fn set_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> BoxFuture<'static, StorageResult<Option<QuestionRecord>>> {
        let updated = self.with_records(|records| {
            records.iter_mut().find(|record| record.id == id).map(
                |record| {
                    record.is_active = active;
                    record.clone()
                },
            )
        });
        futures::future::ready(Ok(updated)).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::room::QuestionOption;

    fn new_question(text: &str, is_active: bool) -> NewQuestion {
        NewQuestion {
            text: text.into(),
            options: ["A", "B", "C", "D"]
                .iter()
                .map(|id| QuestionOption {
                    id: (*id).into(),
                    text: (*id).into(),
                })
                .collect(),
            correct_id: "A".into(),
            is_active,
        }
    }

    #[tokio::test]
    async fn random_active_on_an_empty_bank_is_none() {
        let bank = MemoryQuestionBank::new();
        assert!(bank.random_active().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn random_active_never_serves_inactive_questions() {
        let bank = MemoryQuestionBank::new();
        bank.create(new_question("inactive", false)).await.unwrap();
        assert!(bank.random_active().await.unwrap().is_none());

        bank.create(new_question("active", true)).await.unwrap();
        for _ in 0..20 {
            let question = bank.random_active().await.unwrap().unwrap();
            assert_eq!(question.text, "active");
        }
    }

    #[tokio::test]
    async fn list_filters_by_active_flag() {
        let bank = MemoryQuestionBank::new();
        bank.create(new_question("one", true)).await.unwrap();
        bank.create(new_question("two", false)).await.unwrap();

        assert_eq!(bank.list(false).await.unwrap().len(), 1);
        assert_eq!(bank.list(true).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn set_active_toggles_and_reports_unknown_ids() {
        let bank = MemoryQuestionBank::new();
        let record = bank.create(new_question("one", false)).await.unwrap();

        let updated = bank.set_active(record.id, true).await.unwrap().unwrap();
        assert!(updated.is_active);
        assert_eq!(bank.list(false).await.unwrap().len(), 1);

        assert!(
            bank.set_active(Uuid::new_v4(), true)
                .await
                .unwrap()
                .is_none()
        );
    }
}
