//! Notifier (C13): local desktop + e-mail transports (spec §4 C13, §6:
//! `send_new_issue`, `send_digest`, `send_assignment_confirmation`,
//! `send_assignment_request`, `notify_local`). Out of scope for detailed
//! design in the spec, but still a real collaborator the dispatcher (C11)
//! calls — each transport enforces no rate limit of its own beyond what
//! C8 already gates, since duplicating that bookkeeping here would only
//! invite the two to drift.

pub mod desktop;
pub mod email;
pub mod errors;
pub mod templates;

use scout_core::config::NotifyConfig;
use scout_core::types::{Candidate, Issue, ScoreBreakdown};

pub use errors::{NotifyError, Result};

pub struct Notifier {
    config: NotifyConfig,
}

impl Notifier {
    pub fn new(config: NotifyConfig) -> Self {
        Self { config }
    }

    pub fn send_new_issue(&self, candidate: &Candidate, breakdown: &ScoreBreakdown) -> Result<()> {
        email::send_email(
            &self.config,
            &templates::new_issue_subject(&candidate.issue),
            &templates::new_issue_body(candidate, breakdown),
        )
    }

    pub fn send_digest(&self, issues: &[(Candidate, ScoreBreakdown)]) -> Result<()> {
        email::send_email(&self.config, &templates::digest_subject(issues.len()), &templates::digest_body(issues))
    }

    pub fn send_assignment_confirmation(&self, issue: &Issue) -> Result<()> {
        email::send_email(
            &self.config,
            &templates::assignment_confirmation_subject(issue),
            &templates::assignment_confirmation_body(issue),
        )
    }

    pub fn send_assignment_request(&self, issue: &Issue) -> Result<()> {
        email::send_email(
            &self.config,
            &templates::assignment_request_subject(issue),
            &templates::assignment_request_body(issue),
        )
    }

    pub fn notify_local(&self, summary: &str, body: &str) -> Result<()> {
        desktop::notify_local(&self.config, summary, body)
    }

    /// Sends an arbitrary subject/body pair over SMTP, bypassing the
    /// templated `send_*` helpers above. Used by the dispatcher (C11) to
    /// deliver an `ActionKind::NotifyEmail` action's pre-rendered
    /// `rationale`/`body` without re-deriving a template from a
    /// `Candidate` it may no longer have on hand.
    pub fn send_raw_email(&self, subject: &str, body: &str) -> Result<()> {
        email::send_email(&self.config, subject, body)
    }
}
