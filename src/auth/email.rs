//! Outbound email for the verification flow

use std::sync::{Mutex, PoisonError};

/// A rendered outbound email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Trait for outbound email delivery
///
/// The user pool only needs fire-and-forget delivery; transport failures are
/// the implementation's problem to log and retry.
pub trait Mailer: Send + Sync {
    fn send(&self, message: EmailMessage);
}

/// In-process mailer that records every message it is asked to send
///
/// Used in development and tests; the recorded outbox is how tests read the
/// verification code back out of the sign-up flow.
#[derive(Default)]
pub struct InboxMailer {
    outbox: Mutex<Vec<EmailMessage>>,
}

impl InboxMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages sent so far, oldest first
    pub fn outbox(&self) -> Vec<EmailMessage> {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent message addressed to `recipient`
    pub fn last_for(&self, recipient: &str) -> Option<EmailMessage> {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find(|m| m.to == recipient)
            .cloned()
    }
}

impl Mailer for InboxMailer {
    fn send(&self, message: EmailMessage) {
        tracing::info!(to = %message.to, subject = %message.subject, "email sent");
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }
}
