use thiserror::Error;

/// Errors raised by the persistence layer.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("database is not connected")]
    Disconnected,

    #[error("no database connection string configured")]
    MissingUrl,

    #[error("unsupported database url scheme '{0}'; expected sqlite:")]
    UnsupportedUrl(String),

    #[error("invalid object id '{0}'")]
    InvalidId(String),

    #[error("stored document is malformed: {0}")]
    Corrupt(String),

    #[error("migration {module}/{id} failed: {source}")]
    Migration {
        module: String,
        id: String,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl DbError {
    /// True when the error comes from a malformed identifier rather than from storage.
    pub fn is_invalid_id(&self) -> bool {
        matches!(self, DbError::InvalidId(_))
    }
}
