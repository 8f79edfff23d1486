//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `ContentStore` port from the `core` crate. It talks to the hosted
//! Postgres content store using `sqlx`.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{FromRow, PgPool};
use trivia_core::domain::{
    CategorizedQuestion, Category, CategoryDraft, CategoryLabel, Question, QuestionDraft,
};
use trivia_core::ports::{ContentStore, PortError, PortResult};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ContentStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a lazily connecting pool for `database_url`. A non-empty
    /// `access_key` replaces whatever password the URL carries.
    pub fn connect_lazy(
        database_url: &str,
        access_key: Option<&str>,
        max_connections: u32,
    ) -> Result<Self, sqlx::Error> {
        let mut options = PgConnectOptions::from_str(database_url)?;
        if let Some(key) = access_key {
            options = options.password(key);
        }
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy_with(options);
        Ok(Self::new(pool))
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const CATEGORY_COLUMNS: &str = "id, name, color, created_at";
const QUESTION_COLUMNS: &str = "id, category_id, question, answers, correct_answer, created_at";

#[derive(FromRow)]
struct CategoryRecord {
    id: Uuid,
    name: String,
    color: String,
    created_at: DateTime<Utc>,
}
impl CategoryRecord {
    fn to_domain(self) -> Category {
        Category {
            id: self.id,
            name: self.name,
            color: self.color,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct QuestionRecord {
    id: Uuid,
    category_id: Uuid,
    question: String,
    answers: Vec<String>,
    correct_answer: String,
    created_at: DateTime<Utc>,
}
impl QuestionRecord {
    fn to_domain(self) -> Question {
        Question {
            id: self.id,
            category_id: self.category_id,
            question: self.question,
            answers: self.answers,
            correct_answer: self.correct_answer,
            created_at: self.created_at,
        }
    }
}

/// A question row left-joined with its category.
#[derive(FromRow)]
struct CategorizedQuestionRecord {
    #[sqlx(flatten)]
    question: QuestionRecord,
    category_name: Option<String>,
    category_color: Option<String>,
}
impl CategorizedQuestionRecord {
    fn to_domain(self) -> CategorizedQuestion {
        let category = match (self.category_name, self.category_color) {
            (Some(name), Some(color)) => Some(CategoryLabel { name, color }),
            _ => None,
        };
        CategorizedQuestion {
            question: self.question.to_domain(),
            category,
        }
    }
}

fn not_found_or_unexpected(what: &str, id: Uuid) -> impl FnOnce(sqlx::Error) -> PortError + '_ {
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(format!("{} {} not found", what, id)),
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// `ContentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ContentStore for DbAdapter {
    async fn list_categories(&self) -> PortResult<Vec<Category>> {
        let records = sqlx::query_as::<_, CategoryRecord>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_category(&self, draft: CategoryDraft) -> PortResult<Category> {
        let record = sqlx::query_as::<_, CategoryRecord>(&format!(
            "INSERT INTO categories (name, color) VALUES ($1, $2) RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(draft.name)
        .bind(draft.color)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.to_domain())
    }

    async fn update_category(&self, id: Uuid, draft: CategoryDraft) -> PortResult<Category> {
        let record = sqlx::query_as::<_, CategoryRecord>(&format!(
            "UPDATE categories SET name = $1, color = $2 WHERE id = $3 RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(draft.name)
        .bind(draft.color)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or_unexpected("Category", id))?;
        Ok(record.to_domain())
    }

    async fn delete_category(&self, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Category {} not found", id)));
        }
        Ok(())
    }

    async fn list_questions(&self) -> PortResult<Vec<CategorizedQuestion>> {
        // No ORDER BY: bucket order in the snapshot is whatever the store returns.
        let records = sqlx::query_as::<_, CategorizedQuestionRecord>(
            "SELECT q.id, q.category_id, q.question, q.answers, q.correct_answer, q.created_at, \
                    c.name AS category_name, c.color AS category_color \
             FROM questions q LEFT JOIN categories c ON c.id = q.category_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_question(&self, draft: QuestionDraft) -> PortResult<Question> {
        let record = sqlx::query_as::<_, QuestionRecord>(&format!(
            "INSERT INTO questions (category_id, question, answers, correct_answer) \
             VALUES ($1, $2, $3, $4) RETURNING {QUESTION_COLUMNS}"
        ))
        .bind(draft.category_id)
        .bind(draft.question)
        .bind(draft.answers)
        .bind(draft.correct_answer)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.to_domain())
    }

    async fn update_question(&self, id: Uuid, draft: QuestionDraft) -> PortResult<Question> {
        let record = sqlx::query_as::<_, QuestionRecord>(&format!(
            "UPDATE questions SET category_id = $1, question = $2, answers = $3, correct_answer = $4 \
             WHERE id = $5 RETURNING {QUESTION_COLUMNS}"
        ))
        .bind(draft.category_id)
        .bind(draft.question)
        .bind(draft.answers)
        .bind(draft.correct_answer)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or_unexpected("Question", id))?;
        Ok(record.to_domain())
    }

    async fn delete_question(&self, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Question {} not found", id)));
        }
        Ok(())
    }
}
