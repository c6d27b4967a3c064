use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("message codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

pub type ProtoResult<T> = Result<T, ProtoError>;
