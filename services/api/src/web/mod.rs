pub mod content;
pub mod extract;
pub mod rest;
pub mod state;

// Re-export the handlers the router is assembled from.
pub use content::{
    create_category_handler, create_question_handler, delete_category_handler,
    delete_question_handler, list_categories_handler, list_questions_handler,
    update_category_handler, update_question_handler,
};
pub use rest::{method_not_allowed_handler, update_data_handler};
