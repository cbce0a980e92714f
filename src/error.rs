use thiserror::Error;

/// Failures of the user store.
///
/// The first four are domain errors and map to 4xx responses; the rest are
/// infrastructure failures surfaced as 500s.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Email already exists")]
    DuplicateEmail,

    #[error("User not found")]
    NotFound,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("No favorites to remove")]
    EmptyFavorites,

    #[error("database file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database file is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("{0}")]
    Hash(String),
}

/// Failures of the external meal-planner process.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("failed to spawn meal planner: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("meal planner exited with code {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("meal planner produced unparseable output")]
    Unparseable { raw: String },
}
