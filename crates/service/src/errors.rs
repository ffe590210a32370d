use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("record {0} already exists")]
    Conflict(i64),
    #[error("record {0} not found")]
    NotFound(i64),
}
