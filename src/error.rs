use thiserror::Error;

#[derive(Error, Debug)]
pub enum DotgenError {
    #[error("unsupported data type: {0:?}")]
    UnsupportedType(String),

    #[error("length mismatch: a has {a} elements, x has {x}")]
    LengthMismatch { a: usize, x: usize },

    #[error("value {value} outside the {dtype} domain")]
    DomainViolation { dtype: &'static str, value: String },

    #[error("invalid sampling domain: {0}")]
    InvalidDomain(String),

    #[error("invalid hex input: {0}")]
    InvalidHex(String),

    #[error("thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DotgenError>;
