use notify_rust::Notification;
use scout_core::config::NotifyConfig;

use crate::errors::{NotifyError, Result};

/// Shows a local desktop notification (spec §4 C13 "local desktop
/// transport"). Disabled outright when `desktop_enabled = false` — a
/// headless daemon run has no session bus to post to.
pub fn notify_local(config: &NotifyConfig, summary: &str, body: &str) -> Result<()> {
    if !config.desktop_enabled {
        return Err(NotifyError::DesktopDisabled);
    }

    Notification::new()
        .summary(summary)
        .body(body)
        .appname("issue-scout")
        .show()
        .map_err(|e| NotifyError::Desktop(e.to_string()))?;
    Ok(())
}
