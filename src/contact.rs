//! Boundary of the contact form: the message it sends, the delivery service it
//! hands the message to, and the small state machine around a submission.

use crate::foundation::error::{RevealError, RevealResult};

/// Subject sent when the visitor left it blank.
pub const DEFAULT_SUBJECT: &str = "(no subject)";

/// Structured fields of one contact message.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContactMessage {
    /// Sender name.
    pub name: String,
    /// Sender reply address.
    pub email: String,
    /// Optional subject line.
    #[serde(default)]
    pub subject: String,
    /// Message body.
    pub message: String,
}

impl ContactMessage {
    /// Check required fields and fill in the default subject.
    pub fn normalized(&self) -> RevealResult<Self> {
        let name = self.name.trim();
        let email = self.email.trim();
        let message = self.message.trim();
        if name.is_empty() {
            return Err(RevealError::validation("name is required"));
        }
        if email.is_empty() {
            return Err(RevealError::validation("email is required"));
        }
        match email.split_once('@') {
            Some((user, domain)) if !user.is_empty() && !domain.is_empty() => {}
            _ => {
                return Err(RevealError::validation(format!(
                    "'{email}' is not an email address"
                )));
            }
        }
        if message.is_empty() {
            return Err(RevealError::validation("message is required"));
        }
        let subject = match self.subject.trim() {
            "" => DEFAULT_SUBJECT.to_string(),
            s => s.to_string(),
        };
        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
            subject,
            message: message.to_string(),
        })
    }
}

/// Failure reported by the delivery service.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("delivery failed: {reason}")]
pub struct DeliveryError {
    /// Provider-supplied reason.
    pub reason: String,
}

impl DeliveryError {
    /// Build a failure with a reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// External transactional-email provider.
pub trait DeliveryService {
    /// Send one message.
    fn submit(&self, message: &ContactMessage) -> Result<(), DeliveryError>;
}

/// Result of the last submission, as shown to the visitor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Sent; the form was cleared.
    Sent,
    /// Rejected before sending.
    Invalid(String),
    /// The provider failed; fields were kept.
    Failed(String),
}

/// Form fields plus an in-flight guard.
#[derive(Debug, Default)]
pub struct ContactForm {
    fields: ContactMessage,
    sending: bool,
}

impl ContactForm {
    /// Empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current fields.
    pub fn fields(&self) -> &ContactMessage {
        &self.fields
    }

    /// Mutable fields, for input handlers.
    pub fn fields_mut(&mut self) -> &mut ContactMessage {
        &mut self.fields
    }

    /// Whether a submission is in flight.
    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Validate and mark the form as sending. Returns `None` while another
    /// submission is in flight.
    pub fn begin_submit(&mut self) -> Option<RevealResult<ContactMessage>> {
        if self.sending {
            return None;
        }
        let msg = self.fields.normalized();
        if msg.is_ok() {
            self.sending = true;
        }
        Some(msg)
    }

    /// Record the provider's answer for the in-flight submission.
    pub fn finish_submit(&mut self, result: Result<(), DeliveryError>) -> SubmitOutcome {
        self.sending = false;
        match result {
            Ok(()) => {
                self.fields = ContactMessage::default();
                SubmitOutcome::Sent
            }
            Err(err) => {
                tracing::warn!(reason = %err.reason, "contact message not delivered");
                SubmitOutcome::Failed(err.reason)
            }
        }
    }

    /// Validate, send through `service`, and record the answer.
    pub fn submit_with(&mut self, service: &dyn DeliveryService) -> Option<SubmitOutcome> {
        let msg = match self.begin_submit()? {
            Ok(msg) => msg,
            Err(err) => return Some(SubmitOutcome::Invalid(err.to_string())),
        };
        let result = service.submit(&msg);
        Some(self.finish_submit(result))
    }
}

#[cfg(test)]
#[path = "../tests/unit/contact/contact.rs"]
mod tests;
