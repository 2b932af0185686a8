//! # Reelgraph Core
//!
//! Data tables and shared infrastructure for the Reelgraph movie recommender.
//!
//! ## Modules
//!
//! - `types`: Rating and movie records, genre vocabulary
//! - `dataset`: Immutable in-memory ratings and metadata tables
//! - `loader`: MovieLens-100k file parsing
//! - `filter`: Analytics filtering over ratings joined with metadata
//! - `error`: Error types and handling
//! - `config`: Configuration loading and validation
//! - `observability`: Structured logging setup
//! - `pagination`: Page/limit helpers for API responses

pub mod config;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod loader;
pub mod observability;
pub mod pagination;
pub mod types;

pub use config::{load_dotenv, ConfigLoader, EngineConfig, ServiceConfig};
pub use dataset::Dataset;
pub use error::RecommenderError;
pub use filter::{filter_movies, FilteredRating, MovieFilter};
pub use loader::{load_dataset, load_movies_from_reader, load_ratings_from_reader};
pub use observability::{init_logging, LogConfig, LogFormat, ObservabilityError};
pub use pagination::{PaginatedResponse, PaginationParams, DEFAULT_LIMIT, MAX_LIMIT};
pub use types::*;

/// Result type alias for Reelgraph operations
pub type Result<T> = std::result::Result<T, RecommenderError>;
