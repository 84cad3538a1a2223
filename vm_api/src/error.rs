use fil_actors_runtime::ErrorKind;
use thiserror::Error;

/// A failure of the VM itself, as opposed to a failed message.
#[derive(Error, Debug)]
pub enum VMError {
    #[error("state store: {0}")]
    Store(#[from] anyhow::Error),
    #[error("{0}")]
    Invalid(String),
}

pub fn vm_err(msg: &str) -> VMError {
    VMError::Invalid(msg.to_string())
}

/// The structured error carried by a failed receipt.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ExecutionError {
    pub kind: ErrorKind,
    pub message: String,
}
