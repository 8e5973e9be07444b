use thiserror::Error;

/// Errors surfaced by the menu pipeline and its delivery layers.
///
/// Page- and row-level parse problems are not represented here; those are
/// logged and skipped so a partially damaged document still produces a menu.
#[derive(Debug, Error)]
pub enum MenuError {
    #[error("failed to download menu document: {0}")]
    Download(#[from] reqwest::Error),

    #[error("failed to decode menu document: {0}")]
    Decode(String),

    #[error("page {page} contains no recognizable table structure")]
    NoTable { page: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid mail address: {0}")]
    BadAddress(#[from] lettre::address::AddressError),

    #[error("failed to build mail message: {0}")]
    MailMessage(#[from] lettre::error::Error),

    #[error("failed to send mail: {0}")]
    Mail(#[from] lettre::transport::smtp::Error),
}
