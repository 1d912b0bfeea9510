#![forbid(unsafe_code)]

//! Contact form validation and transient feedback.
//!
//! Submission is simulated: once the fields validate, the values are logged
//! and a success message is shown. At most one feedback message is attached to
//! the form at any time; every attempt replaces the previous one.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::config::FormConfig;

/// Error code for the missing-fields outcome.
pub const ERROR_CODE_REQUIRED: &str = "required";
/// Error code for the malformed-email outcome.
pub const ERROR_CODE_EMAIL: &str = "email";

/// Why a submission was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationError {
    MissingFields,
    InvalidEmail,
}

impl ValidationError {
    /// Stable identifier for programmatic handling.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MissingFields => ERROR_CODE_REQUIRED,
            Self::InvalidEmail => ERROR_CODE_EMAIL,
        }
    }

    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::MissingFields => "Please fill in all fields",
            Self::InvalidEmail => "Please enter a valid email address",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_message())
    }
}

impl std::error::Error for ValidationError {}

/// The ECMAScript `\s` class: `WhiteSpace` plus `LineTerminator`.
///
/// Differs from [`char::is_whitespace`]: includes U+FEFF, excludes U+0085.
fn is_ecma_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{0B}'
            | '\u{0C}'
            | '\r'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// Permissive `local@domain.tld` check.
///
/// Accepts exactly what the browser regex `^[^\s@]+@[^\s@]+\.[^\s@]+$`
/// accepts: no ECMAScript whitespace, exactly one `@` with text before it, and
/// a domain with a `.` that has text on both sides.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(is_ecma_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // Some dot must have at least one character on each side.
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Field values read once per submission attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactSubmission {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    /// Presence first, then email format. Values are not trimmed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() || self.email.is_empty() || self.message.is_empty() {
            return Err(ValidationError::MissingFields);
        }
        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }
}

/// Feedback kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Success,
    Error,
}

impl FeedbackKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    const fn accent(self) -> (&'static str, &'static str) {
        match self {
            Self::Success => ("rgba(39, 201, 63, 0.1)", "#27c93f"),
            Self::Error => ("rgba(255, 45, 85, 0.1)", "#ff2d55"),
        }
    }
}

/// Identity of one attached feedback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(u64);

impl MessageId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A feedback message attached to the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackMessage {
    pub id: MessageId,
    pub kind: FeedbackKind,
    pub text: String,
}

impl FeedbackMessage {
    /// `class` attribute value.
    #[must_use]
    pub fn class_name(&self) -> String {
        format!("form-message form-message-{}", self.kind.as_str())
    }

    /// Inline `style` attribute value.
    #[must_use]
    pub fn inline_style(&self) -> String {
        let (background, accent) = self.kind.accent();
        format!(
            "padding: 1rem; border-radius: 8px; margin-top: 1rem; \
             animation: fadeInUp 0.3s ease-out; background-color: {background}; \
             border: 1px solid {accent}; color: {accent};"
        )
    }
}

/// Everything one submission attempt changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// Message detached before the new one was attached.
    pub replaced: Option<MessageId>,
    /// Message now attached.
    pub shown: FeedbackMessage,
    /// Accepted values, or the validation failure.
    pub result: Result<ContactSubmission, ValidationError>,
}

impl SubmitOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Contact form state: the single attached feedback message.
#[derive(Debug, Clone)]
pub struct ContactForm {
    feedback: Option<FeedbackMessage>,
    next_id: u64,
    missing_fields_text: String,
    invalid_email_text: String,
    success_text: String,
}

impl ContactForm {
    #[must_use]
    pub fn new(config: &FormConfig) -> Self {
        Self {
            feedback: None,
            next_id: 0,
            missing_fields_text: config.missing_fields_text.clone(),
            invalid_email_text: config.invalid_email_text.clone(),
            success_text: config.success_text.clone(),
        }
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&FeedbackMessage> {
        self.feedback.as_ref()
    }

    /// Handle one submission attempt.
    pub fn submit(&mut self, submission: ContactSubmission) -> SubmitOutcome {
        let replaced = self.feedback.take().map(|m| m.id);
        let (kind, text, result) = match submission.validate() {
            Ok(()) => {
                tracing::info!(
                    sender = %submission.name,
                    email = %submission.email,
                    body = %submission.message,
                    "form submitted"
                );
                (FeedbackKind::Success, self.success_text.clone(), Ok(submission))
            }
            Err(err) => {
                tracing::debug!(code = err.code(), "form rejected");
                let text = match err {
                    ValidationError::MissingFields => self.missing_fields_text.clone(),
                    ValidationError::InvalidEmail => self.invalid_email_text.clone(),
                };
                (FeedbackKind::Error, text, Err(err))
            }
        };
        let shown = FeedbackMessage {
            id: self.allocate_id(),
            kind,
            text,
        };
        self.feedback = Some(shown.clone());
        SubmitOutcome {
            replaced,
            shown,
            result,
        }
    }

    /// Detach message `id` if it is still the attached one.
    ///
    /// Returns `false` when it was already replaced or removed, which makes
    /// late timer callbacks harmless.
    pub fn dismiss(&mut self, id: MessageId) -> bool {
        if self.feedback.as_ref().is_some_and(|m| m.id == id) {
            self.feedback = None;
            true
        } else {
            false
        }
    }

    fn allocate_id(&mut self) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }
}
