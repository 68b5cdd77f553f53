//! Data-access layer for the question bank collaborator.

pub mod memory;
pub mod models;
pub mod question_bank;
pub mod storage;

pub use self::memory::MemoryQuestionBank;
pub use self::models::{NewQuestion, QuestionRecord};
pub use self::question_bank::QuestionBank;
pub use self::storage::{StorageError, StorageResult};
