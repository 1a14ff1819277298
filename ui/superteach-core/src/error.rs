//! Error type shared by every flow.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Wallet provider is not available")]
    ProviderUnavailable,

    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Insufficient balance: requested {requested} SOL, available {available} SOL")]
    InsufficientBalance { requested: f64, available: f64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Transaction confirmation timed out: {0}")]
    ConfirmationTimeout(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WalletError>;
