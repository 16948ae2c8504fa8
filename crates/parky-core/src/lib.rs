//! Parky Core - Domain models, storage traits, and shared types
//!
//! This crate defines the abstractions used throughout Parky:
//! - National park and trail models
//! - DTOs and the explicit conversions between them and the models
//! - The park/trail repository trait with PostgreSQL and in-memory stores
//! - Common error types
//! - Configuration management

pub mod config;
pub mod dto;
pub mod models;
pub mod store;

pub use config::{
    AppConfig, AuthConfig, BootstrapAdmin, ConfigError, DatabaseConfig, LoggingConfig,
    ServerConfig, StorageBackend,
};
pub use dto::{NationalParkDto, TrailCreateDto, TrailDto, TrailUpdateDto};
pub use models::{
    Difficulty, NationalPark, NationalParkDraft, ParkId, Trail, TrailDraft, TrailId,
};
pub use store::{MemoryStore, ParkRepository, PgStore};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for Parky operations
#[derive(Error, Debug)]
pub enum ParkyError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ParkyError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ParkyError::Validation(errors.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ParkyError>;
