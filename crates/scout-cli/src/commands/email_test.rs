//! `email-test`: sends a canned message through the configured SMTP
//! transport so a contributor can confirm their `SMTP_*` settings before
//! relying on them for real notifications.

use scout_core::config::Config;
use scout_notify::Notifier;

pub async fn run(config: Config) -> anyhow::Result<()> {
    let notifier = Notifier::new(config.notify.clone());
    notifier.send_raw_email(
        "issue-scout: test email",
        "This is a test message from issue-scout's `email-test` command. If you received this, your SMTP configuration works.",
    )?;
    println!("test email sent");
    Ok(())
}
