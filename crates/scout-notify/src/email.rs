use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use scout_core::config::NotifyConfig;

use crate::errors::{NotifyError, Result};

/// Sends a single plain-text email via SMTP (spec §4 C13 "e-mail
/// transport"). Built fresh per send rather than held open, matching the
/// low message volume a single contributor's digests/alerts produce —
/// connection pooling would be premature here.
pub fn send_email(config: &NotifyConfig, subject: &str, body: &str) -> Result<()> {
    let host = config.smtp_host.as_deref().ok_or(NotifyError::SmtpNotConfigured)?;
    let from = config.smtp_from.as_deref().ok_or(NotifyError::SmtpNotConfigured)?;
    let to = config.smtp_to.as_deref().ok_or(NotifyError::SmtpNotConfigured)?;

    let message = Message::builder()
        .from(from.parse::<Mailbox>()?)
        .to(to.parse::<Mailbox>()?)
        .subject(subject)
        .body(body.to_string())?;

    let mut builder = SmtpTransport::relay(host).map_err(NotifyError::Smtp)?;
    if let (Some(user), Some(password)) = (&config.smtp_user, &config.smtp_password) {
        builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
    }
    if let Some(port) = config.smtp_port {
        builder = builder.port(port);
    }

    builder.build().send(&message).map_err(NotifyError::Smtp)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> NotifyConfig {
        NotifyConfig {
            smtp_host: None,
            smtp_port: None,
            smtp_user: None,
            smtp_password: None,
            smtp_from: None,
            smtp_to: None,
            desktop_enabled: true,
        }
    }

    #[test]
    fn missing_smtp_host_is_a_permanent_error() {
        let err = send_email(&config(), "subject", "body").unwrap_err();
        assert!(matches!(err, NotifyError::SmtpNotConfigured));
    }
}
