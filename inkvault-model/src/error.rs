use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    /// The plaintext is not a valid block tree.
    #[error("invalid document body: {0}")]
    InvalidBody(#[from] serde_json::Error),
}
