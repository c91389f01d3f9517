use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("Lookup unavailable: {0}")]
    Unavailable(String),
    #[error("IO error: {message}: {cause}")]
    IO { message: String, cause: io::Error },
    #[error("Serde JSON error: {0}")]
    JSON(#[from] serde_json::Error),
}
