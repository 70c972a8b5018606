use super::{CaptureContext, FormRecord};
use crate::capture::gate::Category;
use crate::dispatch::{EventDispatcher, Mailbox, Subscription};
use crate::dom::{DomEvent, DomEventKind, FormSnapshot};
use std::collections::HashSet;

/// Captures form submissions.
///
/// While forms are being recorded the native submission is suppressed; when
/// they are not, the event is left untouched.
pub struct FormObserver {
    mailbox: Mailbox<FormRecord>,
    _listener: Subscription,
}

impl FormObserver {
    /// Subscribe to submit events.
    pub fn attach(dispatcher: &EventDispatcher, context: CaptureContext) -> Self {
        let mailbox = Mailbox::new();
        let sink = mailbox.clone();

        let listener = dispatcher.subscribe(DomEventKind::Submit, move |event| {
            let DomEvent::Submit(submit) = event else {
                return;
            };
            if !context.gate.allows(Category::Forms) {
                return;
            }

            submit.prevent_default();
            let record = form_record(&submit.form);
            tracing::trace!("Form submitted with {} recorded fields", record.fields.len());
            sink.put(record);
        });

        Self {
            mailbox,
            _listener: listener,
        }
    }

    /// Latest unconsumed record.
    pub fn record(&self) -> Option<FormRecord> {
        self.mailbox.peek()
    }

    /// Drop the pending record once it has been consumed.
    pub fn clear(&self) {
        self.mailbox.clear();
    }

    /// Slot the coordinator listens on for new form records.
    pub fn mailbox(&self) -> &Mailbox<FormRecord> {
        &self.mailbox
    }
}

/// Named field values with every password-typed name removed. Repeated
/// names keep the last value.
pub fn form_record(form: &FormSnapshot) -> FormRecord {
    let passwords: HashSet<&str> = form
        .fields
        .iter()
        .filter(|field| field.is_password())
        .filter_map(|field| field.name.as_deref())
        .collect();

    let mut record = FormRecord::default();
    for field in &form.fields {
        let Some(name) = field.name.as_deref() else {
            continue;
        };
        if passwords.contains(name) {
            continue;
        }
        record.fields.insert(name.to_string(), field.value.clone());
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::input::fixtures::{context, page};
    use crate::dom::{FormField, SubmitEvent};

    fn login_form() -> FormSnapshot {
        FormSnapshot {
            fields: vec![
                FormField::new("email", "ada@example.com", "email"),
                FormField::new("pin", "1234", "PASSWORD"),
                FormField::new("remember", "on", "checkbox"),
                FormField {
                    name: None,
                    value: "ignored".to_string(),
                    input_type: "text".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_passwords_stripped_whatever_the_name() {
        let record = form_record(&login_form());
        assert_eq!(record.fields.len(), 2);
        assert_eq!(record.fields["email"], "ada@example.com");
        assert_eq!(record.fields["remember"], "on");
        assert!(!record.fields.contains_key("pin"));
    }

    #[test]
    fn test_repeated_names_keep_last_value() {
        let form = FormSnapshot {
            fields: vec![
                FormField::new("tag", "red", "checkbox"),
                FormField::new("tag", "blue", "checkbox"),
            ],
        };
        assert_eq!(form_record(&form).fields["tag"], "blue");
    }

    #[test]
    fn test_submission_recorded_and_default_prevented() {
        let page = page();
        let dispatcher = EventDispatcher::new();
        let observer = FormObserver::attach(&dispatcher, context(&page, &[Category::Forms]));

        let event = DomEvent::Submit(SubmitEvent::new(login_form()));
        dispatcher.dispatch(&event);

        let DomEvent::Submit(submit) = &event else {
            unreachable!()
        };
        assert!(submit.default_prevented());
        assert_eq!(observer.record().unwrap().fields.len(), 2);
    }

    #[test]
    fn test_not_recording_leaves_submission_alone() {
        let page = page();
        let dispatcher = EventDispatcher::new();
        let observer = FormObserver::attach(&dispatcher, context(&page, &[Category::Clicks]));

        let event = DomEvent::Submit(SubmitEvent::new(login_form()));
        dispatcher.dispatch(&event);

        let DomEvent::Submit(submit) = &event else {
            unreachable!()
        };
        assert!(!submit.default_prevented());
        assert!(observer.record().is_none());
    }
}
