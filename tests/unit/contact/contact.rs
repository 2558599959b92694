use super::*;
use std::cell::RefCell;

#[derive(Default)]
struct Outbox {
    sent: RefCell<Vec<ContactMessage>>,
    fail_with: Option<String>,
}

impl DeliveryService for Outbox {
    fn submit(&self, message: &ContactMessage) -> Result<(), DeliveryError> {
        if let Some(reason) = &self.fail_with {
            return Err(DeliveryError::new(reason.clone()));
        }
        self.sent.borrow_mut().push(message.clone());
        Ok(())
    }
}

fn filled() -> ContactForm {
    let mut form = ContactForm::new();
    let f = form.fields_mut();
    f.name = "Ada".to_string();
    f.email = " ada@example.com ".to_string();
    f.message = "Hello there".to_string();
    form
}

#[test]
fn blank_subject_gets_default() {
    let msg = filled().fields().normalized().unwrap();
    assert_eq!(msg.subject, DEFAULT_SUBJECT);
    assert_eq!(msg.email, "ada@example.com");
}

#[test]
fn required_fields_are_checked() {
    let mut m = filled().fields().clone();
    m.name.clear();
    assert!(m.normalized().is_err());

    let mut m = filled().fields().clone();
    m.email = "not-an-address".to_string();
    assert!(m.normalized().unwrap_err().to_string().contains("not an email"));

    let mut m = filled().fields().clone();
    m.message = "   ".to_string();
    assert!(m.normalized().is_err());
}

#[test]
fn success_clears_the_form() {
    let outbox = Outbox::default();
    let mut form = filled();
    assert_eq!(form.submit_with(&outbox), Some(SubmitOutcome::Sent));
    assert_eq!(outbox.sent.borrow().len(), 1);
    assert_eq!(form.fields(), &ContactMessage::default());
    assert!(!form.is_sending());
}

#[test]
fn failure_keeps_fields_and_reports_reason() {
    let outbox = Outbox {
        fail_with: Some("quota exceeded".to_string()),
        ..Outbox::default()
    };
    let mut form = filled();
    assert_eq!(
        form.submit_with(&outbox),
        Some(SubmitOutcome::Failed("quota exceeded".to_string()))
    );
    assert_eq!(form.fields().name, "Ada");
}

#[test]
fn second_submit_while_sending_is_ignored() {
    let mut form = filled();
    assert!(matches!(form.begin_submit(), Some(Ok(_))));
    assert!(form.is_sending());
    assert!(form.begin_submit().is_none());
    assert_eq!(form.finish_submit(Ok(())), SubmitOutcome::Sent);
    assert!(!form.is_sending());
}

#[test]
fn invalid_form_does_not_lock() {
    let outbox = Outbox::default();
    let mut form = ContactForm::new();
    assert!(matches!(
        form.submit_with(&outbox),
        Some(SubmitOutcome::Invalid(_))
    ));
    assert!(!form.is_sending());
    assert!(outbox.sent.borrow().is_empty());
}
