//! crates/trivia_core/src/export.rs
//!
//! The content export operation: read everything from the content store,
//! regroup questions by category name and hand the result to a snapshot writer.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{CategorizedQuestion, Category, QuestionsByCategory, Snapshot};
use crate::ports::{ContentStore, PortError, SnapshotWriter};

/// Failure of one export run. Nothing is written unless both fetches succeed.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Error fetching categories: {0}")]
    FetchCategories(#[source] PortError),
    #[error("Error fetching questions: {0}")]
    FetchQuestions(#[source] PortError),
    #[error("{0}")]
    Write(#[source] PortError),
}

/// What a successful export produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub categories: usize,
    pub questions: usize,
    pub buckets: usize,
    /// Questions left out because their `category_id` matched no fetched category.
    pub orphaned: Vec<Uuid>,
}

/// Groups questions under the name of their category.
///
/// A question is resolved against `categories`, not against its joined label,
/// so the keys are always names from the fetched category set. Unresolved
/// question ids are returned alongside the mapping. Store order is kept
/// inside each bucket; categories sharing a name share a bucket.
pub fn group_by_category(
    categories: &[Category],
    questions: Vec<CategorizedQuestion>,
) -> (QuestionsByCategory, Vec<Uuid>) {
    let names: HashMap<Uuid, &str> = categories
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();

    let mut grouped = QuestionsByCategory::new();
    let mut orphaned = Vec::new();

    for CategorizedQuestion { question, .. } in questions {
        match names.get(&question.category_id) {
            Some(name) => grouped
                .entry((*name).to_string())
                .or_default()
                .push(question.into()),
            None => orphaned.push(question.id),
        }
    }

    (grouped, orphaned)
}

/// Runs exports against an explicitly supplied store and writer.
#[derive(Clone)]
pub struct ContentExporter {
    store: Arc<dyn ContentStore>,
    writer: Arc<dyn SnapshotWriter>,
}

impl ContentExporter {
    pub fn new(store: Arc<dyn ContentStore>, writer: Arc<dyn SnapshotWriter>) -> Self {
        Self { store, writer }
    }

    /// Fetches categories, then questions, regroups them and writes the snapshot.
    pub async fn export(&self) -> Result<ExportReport, ExportError> {
        let categories = self
            .store
            .list_categories()
            .await
            .map_err(ExportError::FetchCategories)?;
        let questions = self
            .store
            .list_questions()
            .await
            .map_err(ExportError::FetchQuestions)?;

        let question_count = questions.len();
        let (questions_by_category, orphaned) = group_by_category(&categories, questions);

        let snapshot = Snapshot {
            categories,
            questions_by_category,
        };
        self.writer
            .write_snapshot(&snapshot)
            .await
            .map_err(ExportError::Write)?;

        Ok(ExportReport {
            categories: snapshot.categories.len(),
            questions: question_count - orphaned.len(),
            buckets: snapshot.questions_by_category.len(),
            orphaned,
        })
    }
}
