use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Selector timed out: {selector}")]
    SelectorTimeout { selector: String },

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Script evaluation failed: {0}")]
    Evaluate(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl CrawlError {
    /// Run-fatal errors abort the whole crawl; everything else is contained
    /// at the category boundary.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CrawlError::Io(_) | CrawlError::Serialization(_))
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CrawlError>;
