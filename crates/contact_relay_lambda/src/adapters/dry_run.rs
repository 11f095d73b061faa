use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::info;

use crate::adapters::mail::MailService;
use crate::runtime::compose::OutgoingEmail;

/// Mail service that logs composed emails instead of delivering them.
#[derive(Debug, Default)]
pub struct DryRunMailService {
    sent: AtomicUsize,
    verified_identities: Vec<String>,
}

impl DryRunMailService {
    pub fn new(verified_identities: Vec<String>) -> Self {
        Self {
            sent: AtomicUsize::new(0),
            verified_identities,
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::Relaxed)
    }
}

impl MailService for DryRunMailService {
    fn send_email(&self, email: &OutgoingEmail) -> Result<String, String> {
        let sequence = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            source = %email.source,
            destination = %email.destination,
            subject = %email.subject,
            text_body = %email.text_body,
            html_body = %email.html_body,
            "dry run: email not delivered"
        );
        Ok(format!("dry-run-{sequence}"))
    }

    fn list_verified_identities(&self) -> Result<Vec<String>, String> {
        Ok(self.verified_identities.clone())
    }
}
