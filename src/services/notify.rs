//! Digest notification service.
//!
//! Builds one plain-text mail message listing every listing accepted in a
//! run and hands it to a sendmail-compatible transport.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use unicode_normalization::UnicodeNormalization;

use crate::error::{AppError, Result};
use crate::models::{Listing, NotifyConfig};

/// Outbound message transport.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a fully rendered message to `recipient`.
    async fn send(&self, recipient: &str, message: &str) -> Result<()>;
}

/// Composes the digest message for a run.
#[derive(Debug, Clone)]
pub struct NotificationComposer {
    from: String,
    subject: String,
    intro: String,
}

impl NotificationComposer {
    pub fn new(config: &NotifyConfig) -> Self {
        Self {
            from: config.from.clone(),
            subject: config.subject.clone(),
            intro: config.intro.clone(),
        }
    }

    /// Render the digest, already reduced to ASCII.
    pub fn compose(&self, recipient: &str, listings: &[Listing]) -> String {
        let subject = self.subject.replace("{count}", &listings.len().to_string());

        let mut message = format!(
            "From: {}\nTo: {}\nSubject: {}\n\n{}\n",
            self.from, recipient, subject, self.intro
        );
        for listing in listings {
            message.push_str(&listing.title);
            message.push('\t');
            message.push_str(&listing.url);
            message.push('\n');
        }

        to_ascii(&message)
    }
}

impl Default for NotificationComposer {
    fn default() -> Self {
        Self::new(&NotifyConfig::default())
    }
}

/// Decompose to NFKD and drop everything outside ASCII.
pub fn to_ascii(text: &str) -> String {
    text.nfkd().filter(char::is_ascii).collect()
}

/// [`Notifier`] that pipes the message into `sendmail -t`.
#[derive(Debug, Clone)]
pub struct SendmailNotifier {
    command: String,
}

impl SendmailNotifier {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn from_config(config: &NotifyConfig) -> Self {
        Self::new(config.sendmail.clone())
    }
}

#[async_trait]
impl Notifier for SendmailNotifier {
    async fn send(&self, recipient: &str, message: &str) -> Result<()> {
        let mut child = Command::new(&self.command)
            .arg("-t")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AppError::notify(format!("failed to start {}: {e}", self.command)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AppError::notify("sendmail stdin unavailable"))?;
        stdin
            .write_all(message.as_bytes())
            .await
            .map_err(AppError::notify)?;
        drop(stdin);

        let output = child.wait_with_output().await.map_err(AppError::notify)?;
        if !output.status.success() {
            return Err(AppError::notify(format!(
                "{} exited with {} while sending to {}: {}",
                self.command,
                output.status,
                recipient,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        log::debug!("Message handed to {} for {}", self.command, recipient);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::{Candidate, Digest};

    fn listing(title: &str, url: &str) -> Listing {
        Listing::new(
            Candidate::new(title, url),
            Digest::of(title.as_bytes()),
            NaiveDate::from_ymd_opt(2026, 10, 14).unwrap(),
        )
    }

    #[test]
    fn test_compose_layout() {
        let composer = NotificationComposer::default();
        let message = composer.compose(
            "me@example.com",
            &[
                listing("Free couch", "https://example.com/1.html"),
                listing("Moving boxes", "https://example.com/2.html"),
            ],
        );

        assert_eq!(
            message,
            "From: craigwatch@localhost\n\
             To: me@example.com\n\
             Subject: 2 new listings\n\
             \n\
             New listings found:\n\
             Free couch\thttps://example.com/1.html\n\
             Moving boxes\thttps://example.com/2.html\n"
        );
    }

    #[test]
    fn test_compose_strips_non_ascii() {
        let composer = NotificationComposer::default();
        let message = composer.compose(
            "me@example.com",
            &[listing("Café table ☕ – free", "https://example.com/3.html")],
        );

        assert!(message.is_ascii());
        assert!(message.contains("Cafe table"));
        assert!(message.ends_with(" free\thttps://example.com/3.html\n"));
    }

    #[test]
    fn test_to_ascii_decomposes_compatibility_forms() {
        assert_eq!(to_ascii("ﬁne Ｓofa"), "fine Sofa");
        assert_eq!(to_ascii("naïve"), "naive");
    }

    #[tokio::test]
    async fn test_missing_sendmail_binary_is_notify_error() {
        let notifier = SendmailNotifier::new("/nonexistent/sendmail");
        let err = notifier
            .send("me@example.com", "Subject: hi\n\nbody\n")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Notify(_)));
    }
}
