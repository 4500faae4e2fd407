pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod image_io;
pub mod llm;
pub mod logging;
pub mod models;
pub mod prompt;
pub mod repo;
pub mod routes;

pub use app::build_app;
