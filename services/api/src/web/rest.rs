//! services/api/src/web/rest.rs
//!
//! Contains the snapshot export endpoint, the shared JSON error body and the
//! master definition for the OpenAPI specification.

use crate::web::content::{self, CategoryPayload, CategoryResponse, QuestionPayload, QuestionResponse};
use crate::web::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        update_data_handler,
        content::list_categories_handler,
        content::create_category_handler,
        content::update_category_handler,
        content::delete_category_handler,
        content::list_questions_handler,
        content::create_question_handler,
        content::update_question_handler,
        content::delete_question_handler,
    ),
    components(
        schemas(
            MessageResponse,
            ErrorBody,
            CategoryPayload,
            CategoryResponse,
            QuestionPayload,
            QuestionResponse,
        )
    ),
    tags(
        (name = "Trivia Content API", description = "Manage trivia content and export it as static JSON.")
    )
)]
pub struct ApiDoc;

/// Renders the OpenAPI document as pretty-printed JSON.
pub fn openapi_json() -> Result<String, serde_json::Error> {
    ApiDoc::openapi().to_pretty_json()
}

//=========================================================================================
// API Response Structs
//=========================================================================================

pub const EXPORT_SUCCESS_MESSAGE: &str = "Data updated successfully";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Only POST requests allowed";

/// A plain success payload.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// The body returned with every error status.
#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub message: String,
    pub status_code: u16,
}

/// An error status paired with its JSON body.
pub type JsonError = (StatusCode, Json<ErrorBody>);

pub fn json_error(status: StatusCode, message: impl Into<String>) -> JsonError {
    (
        status,
        Json(ErrorBody {
            message: message.into(),
            status_code: status.as_u16(),
        }),
    )
}

//=========================================================================================
// Export Handlers
//=========================================================================================

/// Rebuild the static snapshot from the content store.
///
/// Reads every category and question, groups questions by category name and
/// overwrites `categories.json` and `questions.json`.
#[utoipa::path(
    post,
    path = "/api/update-data",
    responses(
        (status = 200, description = "Snapshot rewritten", body = MessageResponse),
        (status = 405, description = "Any method other than POST", body = ErrorBody),
        (status = 500, description = "A fetch or a write failed", body = ErrorBody)
    )
)]
pub async fn update_data_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, JsonError> {
    match app_state.exporter.export().await {
        Ok(report) => {
            if !report.orphaned.is_empty() {
                warn!(
                    "Dropped {} question(s) whose category is missing: {:?}",
                    report.orphaned.len(),
                    report.orphaned
                );
            }
            info!(
                "Snapshot exported: {} categories, {} questions in {} buckets",
                report.categories, report.questions, report.buckets
            );
            Ok(Json(MessageResponse {
                message: EXPORT_SUCCESS_MESSAGE.to_string(),
            }))
        }
        Err(e) => {
            error!("Snapshot export failed: {:?}", e);
            Err(json_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// Answers every non-POST request on the export route.
pub async fn method_not_allowed_handler() -> Response {
    json_error(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_MESSAGE).into_response()
}
