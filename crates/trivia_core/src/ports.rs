//! crates/trivia_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the pipeline's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the hosted database and of the file system.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    CategorizedQuestion, Category, CategoryDraft, Question, QuestionDraft, Snapshot,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// Carries the backend's own message text, untranslated.
    #[error("{0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The remote content store holding the authoritative category and question rows.
#[async_trait]
pub trait ContentStore: Send + Sync {
    // --- Categories ---
    async fn list_categories(&self) -> PortResult<Vec<Category>>;

    async fn create_category(&self, draft: CategoryDraft) -> PortResult<Category>;

    async fn update_category(&self, id: Uuid, draft: CategoryDraft) -> PortResult<Category>;

    /// Removes the category row only. Questions pointing at it are left in place.
    async fn delete_category(&self, id: Uuid) -> PortResult<()>;

    // --- Questions ---
    /// Every question, each joined with the label of the category it references.
    async fn list_questions(&self) -> PortResult<Vec<CategorizedQuestion>>;

    async fn create_question(&self, draft: QuestionDraft) -> PortResult<Question>;

    async fn update_question(&self, id: Uuid, draft: QuestionDraft) -> PortResult<Question>;

    async fn delete_question(&self, id: Uuid) -> PortResult<()>;
}

/// Persists an exported snapshot, replacing whatever was there before.
#[async_trait]
pub trait SnapshotWriter: Send + Sync {
    async fn write_snapshot(&self, snapshot: &Snapshot) -> PortResult<()>;
}
