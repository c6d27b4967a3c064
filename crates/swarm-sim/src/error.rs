use swarm_proto::ProtoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("protocol error: {0}")]
    Proto(#[from] ProtoError),
}

pub type SimResult<T> = Result<T, SimError>;
