use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("plant state lock poisoned")]
    Poisoned,
    #[error("command {0} outside [-1, 1]")]
    CommandRange(f64),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
