//! services/api/src/web/content.rs
//!
//! Management endpoints for categories and questions. Every write is validated
//! before it reaches the store; the store applies last write wins.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use trivia_core::domain::{CategorizedQuestion, Category, CategoryDraft, Question, QuestionDraft};
use trivia_core::ports::PortError;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::extract::{ApiJson, ApiPath, ApiQuery};
use crate::web::rest::{json_error, ErrorBody, JsonError};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CategoryPayload {
    pub name: String,
    pub color: String,
}

impl From<CategoryPayload> for CategoryDraft {
    fn from(p: CategoryPayload) -> Self {
        Self {
            name: p.name,
            color: p.color,
        }
    }
}

#[derive(Deserialize, Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            color: c.color,
            created_at: c.created_at,
        }
    }
}

#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    pub category_id: Uuid,
    pub question: String,
    pub answers: Vec<String>,
    pub correct_answer: String,
}

impl From<QuestionPayload> for QuestionDraft {
    fn from(p: QuestionPayload) -> Self {
        Self {
            category_id: p.category_id,
            question: p.question,
            answers: p.answers,
            correct_answer: p.correct_answer,
        }
    }
}

#[derive(Deserialize, Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: Uuid,
    pub category_id: Uuid,
    pub question: String,
    pub answers: Vec<String>,
    pub correct_answer: String,
    pub created_at: DateTime<Utc>,
    /// Absent when the referenced category no longer exists.
    pub category_name: Option<String>,
    pub category_color: Option<String>,
}

impl From<CategorizedQuestion> for QuestionResponse {
    fn from(cq: CategorizedQuestion) -> Self {
        let (category_name, category_color) = match cq.category {
            Some(label) => (Some(label.name), Some(label.color)),
            None => (None, None),
        };
        Self {
            category_name,
            category_color,
            ..Self::from(cq.question)
        }
    }
}

impl From<Question> for QuestionResponse {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            category_id: q.category_id,
            question: q.question,
            answers: q.answers,
            correct_answer: q.correct_answer,
            created_at: q.created_at,
            category_name: None,
            category_color: None,
        }
    }
}

/// Query string accepted by `GET /questions`.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuestionFilter {
    pub category_id: Option<Uuid>,
}

fn port_failure(action: &str, e: PortError) -> JsonError {
    match e {
        PortError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, msg),
        PortError::Unexpected(msg) => {
            error!("Error {}: {}", action, msg);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, msg)
        }
    }
}

//=========================================================================================
// Category Handlers
//=========================================================================================

/// GET /categories - List every category
#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "All categories, oldest first", body = [CategoryResponse]),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn list_categories_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CategoryResponse>>, JsonError> {
    let categories = state
        .store
        .list_categories()
        .await
        .map_err(|e| port_failure("loading categories", e))?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// POST /categories - Add a category
#[utoipa::path(
    post,
    path = "/categories",
    request_body = CategoryPayload,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Malformed body or blank name or color", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn create_category_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CategoryPayload>,
) -> Result<impl IntoResponse, JsonError> {
    let draft = CategoryDraft::from(payload);
    draft
        .validate()
        .map_err(|e| json_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let category = state
        .store
        .create_category(draft)
        .await
        .map_err(|e| port_failure("adding category", e))?;
    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

/// PUT /categories/{id} - Replace a category's name and color
#[utoipa::path(
    put,
    path = "/categories/{id}",
    request_body = CategoryPayload,
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Malformed body or blank name or color", body = ErrorBody),
        (status = 404, description = "Unknown category", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn update_category_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CategoryPayload>,
) -> Result<Json<CategoryResponse>, JsonError> {
    let draft = CategoryDraft::from(payload);
    draft
        .validate()
        .map_err(|e| json_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let category = state
        .store
        .update_category(id, draft)
        .await
        .map_err(|e| port_failure("updating category", e))?;
    Ok(Json(category.into()))
}

/// DELETE /categories/{id} - Delete a category; its questions are kept
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "Unknown category", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn delete_category_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, JsonError> {
    state
        .store
        .delete_category(id)
        .await
        .map_err(|e| port_failure("deleting category", e))?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Question Handlers
//=========================================================================================

/// GET /questions - List questions with their category label
///
/// With `categoryId`, only the questions of that category are returned.
#[utoipa::path(
    get,
    path = "/questions",
    params(("categoryId" = Option<Uuid>, Query, description = "Only list questions of this category")),
    responses(
        (status = 200, description = "Matching questions", body = [QuestionResponse]),
        (status = 400, description = "Malformed category id", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn list_questions_handler(
    State(state): State<Arc<AppState>>,
    ApiQuery(filter): ApiQuery<QuestionFilter>,
) -> Result<Json<Vec<QuestionResponse>>, JsonError> {
    let questions = state
        .store
        .list_questions()
        .await
        .map_err(|e| port_failure("loading questions", e))?;
    Ok(Json(
        questions
            .into_iter()
            .filter(|q| filter.category_id.map_or(true, |id| q.question.category_id == id))
            .map(Into::into)
            .collect(),
    ))
}

/// POST /questions - Add a question
#[utoipa::path(
    post,
    path = "/questions",
    request_body = QuestionPayload,
    responses(
        (status = 201, description = "Question created", body = QuestionResponse),
        (status = 400, description = "Malformed body, incomplete question or unlisted correct answer", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn create_question_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<QuestionPayload>,
) -> Result<impl IntoResponse, JsonError> {
    let draft = QuestionDraft::from(payload);
    draft
        .validate()
        .map_err(|e| json_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let question = state
        .store
        .create_question(draft)
        .await
        .map_err(|e| port_failure("adding question", e))?;
    Ok((StatusCode::CREATED, Json(QuestionResponse::from(question))))
}

/// PUT /questions/{id} - Replace a question
#[utoipa::path(
    put,
    path = "/questions/{id}",
    request_body = QuestionPayload,
    params(("id" = Uuid, Path, description = "Question id")),
    responses(
        (status = 200, description = "Question updated", body = QuestionResponse),
        (status = 400, description = "Malformed body, incomplete question or unlisted correct answer", body = ErrorBody),
        (status = 404, description = "Unknown question", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn update_question_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<QuestionPayload>,
) -> Result<Json<QuestionResponse>, JsonError> {
    let draft = QuestionDraft::from(payload);
    draft
        .validate()
        .map_err(|e| json_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let question = state
        .store
        .update_question(id, draft)
        .await
        .map_err(|e| port_failure("updating question", e))?;
    Ok(Json(question.into()))
}

/// DELETE /questions/{id} - Delete a question
#[utoipa::path(
    delete,
    path = "/questions/{id}",
    params(("id" = Uuid, Path, description = "Question id")),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "Unknown question", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn delete_question_handler(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, JsonError> {
    state
        .store
        .delete_question(id)
        .await
        .map_err(|e| port_failure("deleting question", e))?;
    Ok(StatusCode::NO_CONTENT)
}
