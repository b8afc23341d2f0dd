use scout_core::errors::TransportErrorKind;

/// Errors surfaced by the forge gateway. Every variant carries a
/// `TransportErrorKind` classification so the dispatcher (C11) can decide
/// whether a failed action should be retried later or recorded as
/// permanently failed (spec §7).
#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    #[error("forge api error: {0}")]
    Api(#[from] octocrab::Error),
    #[error("missing forge token — set GITHUB_TOKEN or configure forge.token")]
    MissingToken,
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    #[error("retry budget exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },
    #[error("unexpected response shape: {0}")]
    UnexpectedResponse(String),
}

impl ForgeError {
    pub fn kind(&self) -> TransportErrorKind {
        match self {
            ForgeError::MissingToken => TransportErrorKind::Permanent,
            ForgeError::RateLimited { .. } => TransportErrorKind::Transient,
            ForgeError::RetriesExhausted { .. } => TransportErrorKind::Transient,
            ForgeError::UnexpectedResponse(_) => TransportErrorKind::Permanent,
            ForgeError::Api(err) => classify_octocrab_error(err),
        }
    }
}

/// GitHub's 4xx (other than rate-limit/secondary-limit) are permanent —
/// retrying an auth failure or a bad request never helps. 5xx and
/// connection-level failures are transient (spec §7).
fn classify_octocrab_error(err: &octocrab::Error) -> TransportErrorKind {
    match err {
        octocrab::Error::GitHub { source, .. } => {
            let status = source.status_code.as_u16();
            if status == 429 || (500..600).contains(&status) {
                TransportErrorKind::Transient
            } else {
                TransportErrorKind::Permanent
            }
        }
        octocrab::Error::Http { .. } | octocrab::Error::Hyper { .. } => TransportErrorKind::Transient,
        _ => TransportErrorKind::Permanent,
    }
}

pub type Result<T> = std::result::Result<T, ForgeError>;
