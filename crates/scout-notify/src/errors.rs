use scout_core::errors::TransportErrorKind;

/// Errors surfaced by either notification transport. Like `ForgeError`,
/// every variant classifies itself so the dispatcher can decide whether a
/// failed send is worth retrying (spec §7).
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("smtp is not configured (smtp_host/smtp_from/smtp_to missing)")]
    SmtpNotConfigured,
    #[error("smtp send failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("email message build failed: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("desktop notifications are disabled in config")]
    DesktopDisabled,
    #[error("desktop notification failed: {0}")]
    Desktop(String),
}

impl NotifyError {
    pub fn kind(&self) -> TransportErrorKind {
        match self {
            NotifyError::SmtpNotConfigured | NotifyError::DesktopDisabled | NotifyError::Address(_) => {
                TransportErrorKind::Permanent
            }
            NotifyError::Message(_) => TransportErrorKind::Permanent,
            NotifyError::Smtp(_) | NotifyError::Desktop(_) => TransportErrorKind::Transient,
        }
    }
}

pub type Result<T> = std::result::Result<T, NotifyError>;
