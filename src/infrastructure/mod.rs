// src/infrastructure/mod.rs
pub mod config;
pub mod json_store;
pub mod markdown;
pub mod page_viewer;

pub use config::Config;
pub use json_store::JsonFileStore;
pub use page_viewer::PageViewer;
