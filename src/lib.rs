//! Versioned configuration store library.

pub mod config;
pub mod document;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod service;
pub mod store;
pub mod versioning;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use service::ConfigService;
pub use store::{ConfigStore, FileStore, MemoryStore};
