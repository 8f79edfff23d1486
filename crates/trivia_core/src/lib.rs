pub mod domain;
pub mod export;
pub mod ports;

pub use domain::{
    CategorizedQuestion, Category, CategoryDraft, CategoryLabel, Question, QuestionDraft,
    QuestionProjection, QuestionsByCategory, Snapshot, ValidationError, ANSWERS_PER_QUESTION,
};
pub use export::{group_by_category, ContentExporter, ExportError, ExportReport};
pub use ports::{ContentStore, PortError, PortResult, SnapshotWriter};
