use thiserror::Error;

#[derive(Error, Debug)]
pub enum TributaryError {
    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("user does not exist: {0}")]
    NoSuchUser(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("feed parse error: {0}")]
    Parse(String),

    #[error("no matching layout for: {0}")]
    NoMatchingLayout(String),

    #[error("database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TributaryError>;
