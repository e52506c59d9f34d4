//! Email records delivered by the mailbox collaborator

use serde::{Deserialize, Deserializer, Serialize};

/// One email as fetched from the mailbox.
///
/// Immutable once fetched. The `uid` is the durable key used to make
/// extraction idempotent across runs; it is not a task-level identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRecord {
    /// Mailbox UID (IMAP UIDs arrive as integers, other sources as strings)
    #[serde(deserialize_with = "uid_from_string_or_number")]
    pub uid: String,

    /// Decoded subject line
    #[serde(default)]
    pub subject: String,

    /// Plain-text body
    #[serde(default)]
    pub body: String,
}

impl EmailRecord {
    /// Create a new email record
    pub fn new(
        uid: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Render the email as the user message sent alongside the instruction
    pub fn to_message(&self) -> String {
        format!(
            "EMAIL UID: {}\nSubject: {}\nBody:\n{}",
            self.uid, self.subject, self.body
        )
    }
}

fn uid_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Uid {
        Text(String),
        Number(u64),
    }

    Ok(match Uid::deserialize(deserializer)? {
        Uid::Text(s) => s,
        Uid::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_uid_is_stringified() {
        let json = r#"{"uid": 42, "subject": "Hi", "body": "there"}"#;
        let email: EmailRecord = serde_json::from_str(json).unwrap();
        assert_eq!(email.uid, "42");
    }

    #[test]
    fn test_missing_body_defaults_to_empty() {
        let json = r#"{"uid": "u1", "subject": "Hi"}"#;
        let email: EmailRecord = serde_json::from_str(json).unwrap();
        assert_eq!(email.body, "");
    }

    #[test]
    fn test_message_layout() {
        let email = EmailRecord::new("u1", "Return broken kettle", "Please return it");
        assert_eq!(
            email.to_message(),
            "EMAIL UID: u1\nSubject: Return broken kettle\nBody:\nPlease return it"
        );
    }
}
