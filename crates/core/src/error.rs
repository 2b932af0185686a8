//! Error types shared by every Reelgraph crate.

use thiserror::Error;

/// Top-level error for dataset handling, configuration and recommendation requests.
///
/// Per-request lookup failures (`SeedNotFound`) are caught by the recommenders and
/// turned into empty results. `ValidationError` reaches the caller as a rejected
/// request, and `ConfigurationError` aborts startup.
#[derive(Debug, Error)]
pub enum RecommenderError {
    /// The seed movie id or title is absent from the index being queried
    #[error("Seed not found: {0}")]
    SeedNotFound(String),

    /// Malformed request input
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Invalid configuration, including latent dimensions incompatible with the matrix
    #[error("Configuration error: {message}")]
    ConfigurationError {
        message: String,
        key: Option<String>,
    },

    /// Dataset rows that could not be parsed or violate a table invariant
    #[error("Data load error: {0}")]
    DataLoad(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for RecommenderError {
    fn from(err: csv::Error) -> Self {
        match err.into_kind() {
            csv::ErrorKind::Io(e) => RecommenderError::Io(e),
            other => RecommenderError::DataLoad(format!("{:?}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let err = RecommenderError::ConfigurationError {
            message: "latent_factors must be positive".to_string(),
            key: Some("REELGRAPH_LATENT_FACTORS".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Configuration error: latent_factors must be positive"
        );
    }
}
