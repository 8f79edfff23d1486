//! services/api/src/lib.rs
//!
//! The trivia content service: management routes, the snapshot export
//! endpoint and the client that triggers it.

pub mod adapters;
pub mod config;
pub mod error;
pub mod trigger;
pub mod web;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use web::state::AppState;

/// Path of the snapshot export endpoint.
pub const EXPORT_PATH: &str = "/api/update-data";

/// Builds the application router without transport layers (CORS, docs).
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            EXPORT_PATH,
            post(web::update_data_handler).fallback(web::method_not_allowed_handler),
        )
        .route(
            "/categories",
            get(web::list_categories_handler).post(web::create_category_handler),
        )
        .route(
            "/categories/{id}",
            put(web::update_category_handler).delete(web::delete_category_handler),
        )
        .route(
            "/questions",
            get(web::list_questions_handler).post(web::create_question_handler),
        )
        .route(
            "/questions/{id}",
            put(web::update_question_handler).delete(web::delete_question_handler),
        )
        .with_state(app_state)
}
