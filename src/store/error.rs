/// Failures raised by a tag persistence backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("failed to create {entity}: {message}")]
    Create {
        entity: &'static str,
        message: String,
    },

    #[error("tag {0} does not exist")]
    TagNotFound(i32),

    #[error("unreadable stored value: {0}")]
    Decode(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
