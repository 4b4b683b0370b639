use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Launch failure: {0}")]
    Launch(String),

    #[error("{fixture}: initial response differs - expected {expected:?}, got {actual:?}")]
    GreetingMismatch {
        fixture: String,
        expected: String,
        actual: String,
    },

    #[error(
        "{fixture}: response to exchange {exchange} ({actual:?}) differs from expected response ({expected:?})"
    )]
    ExchangeMismatch {
        fixture: String,
        exchange: usize,
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("{fixture}: no reply from server within {after:?}")]
    ReadTimeout { fixture: String, after: Duration },

    #[error("Fixture {}: {source}", .path.display())]
    Fixture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    /// True when the server answered, but not with what the fixture expects.
    pub fn is_mismatch(&self) -> bool {
        matches!(
            self,
            HarnessError::GreetingMismatch { .. } | HarnessError::ExchangeMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
