use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Buffer errors
    #[error("Buffer overflow: {length} buffered + {incoming} incoming exceeds {capacity}")]
    BufferOverflow {
        length: usize,
        incoming: usize,
        capacity: usize,
    },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing configuration stanza: {0}")]
    MissingConfig(String),

    // IO errors (transport-level; fatal to the caller, never produced by the
    // decoder core itself)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
