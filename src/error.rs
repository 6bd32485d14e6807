use thiserror::Error;

/// Failures of the bit-level reader and writer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BitstreamError {
    #[error("unexpected end of bit stream: requested {requested} bits, {available} available")]
    UnexpectedEof { requested: usize, available: usize },

    #[error("cannot move {0} bits through a single integer field")]
    FieldTooWide(u64),
}

/// Every way a compress or decompress call can fail.
///
/// None of these are retried internally: they abort the current call and
/// surface to whoever drives the codec.
#[derive(Debug, Error)]
pub enum HuffError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    #[error("not a huffman file: {0}")]
    NotAHuffmanFile(String),

    #[error("corrupt format: {0}")]
    CorruptFormat(String),

    #[error("truncated stream while reading {0}")]
    TruncatedStream(&'static str),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HuffError>;
