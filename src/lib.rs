pub mod auth;
pub mod settings;
pub mod detail;
pub mod error;
pub mod models;
pub mod openapi;
pub mod repo;
pub mod routes;
pub mod service;
pub mod validation;

// Re-export commonly used items for tests / external users
pub use detail::get_thread_detail;
pub use routes::{config, AppState};
