use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KVError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("corrupt entry for key {0}")]
    Corrupt(String),

    #[error("store is busy: {0}")]
    Busy(String),
}
