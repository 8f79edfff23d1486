#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use api_lib::adapters::JsonFileSnapshotWriter;
use api_lib::router;
use api_lib::web::state::AppState;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;
use trivia_core::domain::{
    CategorizedQuestion, Category, CategoryDraft, CategoryLabel, Question, QuestionDraft,
};
use trivia_core::ports::{ContentStore, PortError, PortResult};
use uuid::Uuid;

/// A content store held in memory, returning rows in insertion order.
#[derive(Default)]
pub struct InMemoryStore {
    pub categories: Mutex<Vec<Category>>,
    pub questions: Mutex<Vec<Question>>,
    pub fail_categories: AtomicBool,
    pub fail_questions: AtomicBool,
    pub question_fetches: AtomicUsize,
}

impl InMemoryStore {
    pub fn add_category(&self, name: &str, color: &str) -> Category {
        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            color: color.to_string(),
            created_at: Utc::now(),
        };
        self.categories.lock().unwrap().push(category.clone());
        category
    }

    pub fn add_question(&self, category_id: Uuid, text: &str, correct: &str) -> Question {
        let question = Question {
            id: Uuid::new_v4(),
            category_id,
            question: text.to_string(),
            answers: four_answers(correct),
            correct_answer: correct.to_string(),
            created_at: Utc::now(),
        };
        self.questions.lock().unwrap().push(question.clone());
        question
    }
}

pub fn four_answers(correct: &str) -> Vec<String> {
    vec![
        correct.to_string(),
        "wrong 1".to_string(),
        "wrong 2".to_string(),
        "wrong 3".to_string(),
    ]
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn list_categories(&self) -> PortResult<Vec<Category>> {
        if self.fail_categories.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("connection refused".to_string()));
        }
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn create_category(&self, draft: CategoryDraft) -> PortResult<Category> {
        Ok(self.add_category(&draft.name, &draft.color))
    }

    async fn update_category(&self, id: Uuid, draft: CategoryDraft) -> PortResult<Category> {
        let mut categories = self.categories.lock().unwrap();
        let category = categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Category {} not found", id)))?;
        category.name = draft.name;
        category.color = draft.color;
        Ok(category.clone())
    }

    async fn delete_category(&self, id: Uuid) -> PortResult<()> {
        let mut categories = self.categories.lock().unwrap();
        let before = categories.len();
        categories.retain(|c| c.id != id);
        if categories.len() == before {
            return Err(PortError::NotFound(format!("Category {} not found", id)));
        }
        Ok(())
    }

    async fn list_questions(&self) -> PortResult<Vec<CategorizedQuestion>> {
        self.question_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_questions.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("permission denied for table questions".to_string()));
        }
        let categories = self.categories.lock().unwrap();
        let questions = self.questions.lock().unwrap();
        Ok(questions
            .iter()
            .map(|q| CategorizedQuestion {
                question: q.clone(),
                category: categories
                    .iter()
                    .find(|c| c.id == q.category_id)
                    .map(|c| CategoryLabel {
                        name: c.name.clone(),
                        color: c.color.clone(),
                    }),
            })
            .collect())
    }

    async fn create_question(&self, draft: QuestionDraft) -> PortResult<Question> {
        let question = Question {
            id: Uuid::new_v4(),
            category_id: draft.category_id,
            question: draft.question,
            answers: draft.answers,
            correct_answer: draft.correct_answer,
            created_at: Utc::now(),
        };
        self.questions.lock().unwrap().push(question.clone());
        Ok(question)
    }

    async fn update_question(&self, id: Uuid, draft: QuestionDraft) -> PortResult<Question> {
        let mut questions = self.questions.lock().unwrap();
        let question = questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Question {} not found", id)))?;
        question.category_id = draft.category_id;
        question.question = draft.question;
        question.answers = draft.answers;
        question.correct_answer = draft.correct_answer;
        Ok(question.clone())
    }

    async fn delete_question(&self, id: Uuid) -> PortResult<()> {
        let mut questions = self.questions.lock().unwrap();
        let before = questions.len();
        questions.retain(|q| q.id != id);
        if questions.len() == before {
            return Err(PortError::NotFound(format!("Question {} not found", id)));
        }
        Ok(())
    }
}

/// A router over an in-memory store writing snapshots into `dir`.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub categories_path: PathBuf,
    pub questions_path: PathBuf,
}

pub fn test_app(dir: &std::path::Path) -> TestApp {
    let store = Arc::new(InMemoryStore::default());
    let categories_path = dir.join("assets/categories.json");
    let questions_path = dir.join("assets/questions.json");
    let writer = Arc::new(JsonFileSnapshotWriter::new(
        categories_path.clone(),
        questions_path.clone(),
    ));
    let state = Arc::new(AppState::new(store.clone(), writer));
    TestApp {
        router: router(state),
        store,
        categories_path,
        questions_path,
    }
}

/// Sends one request and returns the status with the body parsed as JSON
/// (`Value::Null` for an empty body).
pub async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    match body {
        Some(json) => send_raw(router, method, uri, Some(json.to_string())).await,
        None => send_raw(router, method, uri, None).await,
    }
}

/// Like `send`, but with the body passed through untouched as JSON-typed text.
pub async fn send_raw(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(text) => {
            req = req.header("content-type", "application/json");
            Body::from(text)
        }
        None => Body::empty(),
    };
    let resp = router
        .clone()
        .oneshot(req.body(body).expect("request build should succeed"))
        .await
        .expect("router should respond");

    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, json)
}
