use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalcError {
    #[error("Config directory not found at {0}. Run 'invoice-calc init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to parse document {path}: {source}")]
    DocumentParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Id '{id}' does not end with a numeric index after prefix '{prefix}'")]
    InvalidIndex { prefix: String, id: String },

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD (e.g., 2012-12-25)")]
    InvalidDate(String),

    #[error("Unknown tax rate {0}. Use 'invoice-calc rates' to see configured rates.")]
    UnknownTaxRate(u32),

    #[error("Invalid {field} '{value}': must not be negative")]
    NegativeValue { field: &'static str, value: String },

    #[error("Amount too large to compute")]
    AmountOverflow,

    #[error("Invalid deposit {0}%. Use 0, 5 or a multiple of 10 up to 100.")]
    InvalidDeposit(u32),

    #[error("Invalid payment times {0}: use 1 to 11 payments")]
    InvalidPaymentTimes(u32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CalcError>;
