//! Feedback payload validation.
use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use super::errors::FeedbackError;

pub const MAX_SUGGESTION_CHARS: usize = 2000;

/// Body of a feedback submission as sent by the feedback form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSubmission {
    pub suggestion: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub submitted_at: Option<String>,
}

/// One line of the feedback log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    pub suggestion: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
    pub received_at: String,
    pub ip: Option<String>,
}

impl FeedbackSubmission {
    /// Parses a JSON body. A body that is not a JSON object is a rejection, not a storage failure.
    pub fn from_json(body: &str) -> Result<Self, Vec<String>> {
        serde_json::from_str(body).map_err(|err| vec![format!("invalid JSON body: {err}")])
    }

    /// Checks every field and collects all problems rather than stopping at the first.
    pub fn validate(
        self,
        received_at: OffsetDateTime,
        ip: Option<String>,
    ) -> Result<FeedbackEntry, Vec<String>> {
        let mut errors = Vec::new();

        let suggestion = match self.suggestion.as_deref().map(str::trim) {
            None => {
                errors.push("\"suggestion\" is required".to_string());
                String::new()
            }
            Some("") => {
                errors.push("\"suggestion\" is not allowed to be empty".to_string());
                String::new()
            }
            Some(text) if text.chars().count() > MAX_SUGGESTION_CHARS => {
                errors.push(format!(
                    "\"suggestion\" length must be less than or equal to {MAX_SUGGESTION_CHARS} characters long"
                ));
                String::new()
            }
            Some(text) => text.to_string(),
        };

        let email = match self.email {
            None => {
                errors.push("\"email\" is required".to_string());
                String::new()
            }
            Some(email) if !is_valid_email(&email) => {
                errors.push("\"email\" must be a valid email".to_string());
                String::new()
            }
            Some(email) => email,
        };

        if let Some(submitted) = &self.submitted_at {
            if OffsetDateTime::parse(submitted, &Rfc3339).is_err() {
                errors.push("\"submittedAt\" must be in ISO 8601 date format".to_string());
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let received_at = received_at
            .format(&Rfc3339)
            .map_err(|err| vec![FeedbackError::from(err).to_string()])?;

        Ok(FeedbackEntry {
            suggestion,
            kind: self.kind,
            location: self.location,
            email,
            submitted_at: self.submitted_at,
            received_at,
            ip,
        })
    }
}

/// `local@domain.tld` with no whitespace and at least two domain labels.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn received() -> OffsetDateTime {
        datetime!(2024-05-02 10:15:00 UTC)
    }

    #[test]
    fn valid_submission_becomes_entry() {
        let submission = FeedbackSubmission::from_json(
            r#"{"suggestion":"  More benches near the library  ","type":"idea","email":"a.student@uni.example","submittedAt":"2024-05-02T10:14:58.120Z"}"#,
        )
        .unwrap();

        let entry = submission
            .validate(received(), Some("10.0.0.7".into()))
            .unwrap();
        assert_eq!(entry.suggestion, "More benches near the library");
        assert_eq!(entry.kind.as_deref(), Some("idea"));
        assert_eq!(entry.received_at, "2024-05-02T10:15:00Z");

        let line = serde_json::to_value(&entry).unwrap();
        assert_eq!(line["type"], "idea");
        assert_eq!(line["receivedAt"], "2024-05-02T10:15:00Z");
        assert_eq!(line["ip"], "10.0.0.7");
        assert!(line.get("location").is_none());
    }

    #[test]
    fn all_problems_are_reported() {
        let submission = FeedbackSubmission {
            suggestion: Some("   ".into()),
            email: Some("not-an-email".into()),
            submitted_at: Some("yesterday".into()),
            ..Default::default()
        };
        let errors = submission.validate(received(), None).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("suggestion"));
        assert!(errors[1].contains("email"));
        assert!(errors[2].contains("submittedAt"));
    }

    #[test]
    fn missing_fields_and_long_suggestions_are_rejected() {
        let errors = FeedbackSubmission::default()
            .validate(received(), None)
            .unwrap_err();
        assert_eq!(
            errors,
            vec!["\"suggestion\" is required", "\"email\" is required"]
        );

        let long = FeedbackSubmission {
            suggestion: Some("x".repeat(MAX_SUGGESTION_CHARS + 1)),
            email: Some("a@b.cd".into()),
            ..Default::default()
        };
        assert_eq!(long.validate(received(), None).unwrap_err().len(), 1);
    }

    #[test]
    fn malformed_json_is_a_rejection() {
        assert!(FeedbackSubmission::from_json("{\"suggestion\":").is_err());
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("first.last@campus.example.org"));
        assert!(!is_valid_email("@campus.example"));
        assert!(!is_valid_email("someone@localhost"));
        assert!(!is_valid_email("a b@campus.example"));
        assert!(!is_valid_email("a@@campus.example"));
        assert!(!is_valid_email("a@campus..example"));
    }
}
