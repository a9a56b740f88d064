use thiserror::Error;

/// Errors surfaced by the crate.
///
/// Generation itself never fails: missing coverage, unreachable positions and
/// empty seed lists all degrade to gaps. Only the I/O boundary, model decoding
/// and configuration validation produce errors.
#[derive(Debug, Error)]
pub enum FibError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("model codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("incompatible model format version {found} (expected {expected})")]
    IncompatibleModel { found: u32, expected: u32 },

    #[error("corrupt model: {0}")]
    CorruptModel(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("token vocabulary exceeded TokenId capacity (u32)")]
    VocabularyOverflow,
}

pub type FibResult<T> = Result<T, FibError>;
