use crate::config::ValidationConfig;
use crate::domain::submission::{AttachmentMeta, SubmissionRequest};

/// Mime types accepted for contact-form attachments.
const ALLOWED_ATTACHMENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "image/jpeg",
    "image/png",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Outcome of validating one submission. Errors are kept in check order so
/// the first one determines the client-facing response.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn into_first_error(mut self) -> Option<FieldError> {
        if self.errors.is_empty() { None } else { Some(self.errors.remove(0)) }
    }

    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError { field, message: message.into() });
    }
}

/// Minimal shape check: one `@` with non-empty, whitespace-free text on both
/// sides and a dot somewhere in the domain. Deliberately not RFC 5322.
#[must_use]
pub fn validate_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Valid iff the string carries 10 to 15 digits, ignoring separators and a
/// leading `+`.
#[must_use]
pub fn validate_phone(phone: &str) -> bool {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    (10..=15).contains(&digits)
}

fn validate_attachment(attachment: &AttachmentMeta, limits: &ValidationConfig, result: &mut ValidationResult) {
    if attachment.size > limits.attachment_max_size_bytes {
        result.push(
            "attachment",
            format!("Attachment must be no larger than {} bytes", limits.attachment_max_size_bytes),
        );
    }
    if !ALLOWED_ATTACHMENT_TYPES.contains(&attachment.mime_type.as_str()) {
        result.push("attachment", "Attachment type is not supported");
    }
}

/// Applies every field check to a submission. Pure and synchronous; collects
/// errors instead of failing fast so callers can report whichever policy
/// they need.
#[must_use]
pub fn validate(request: &SubmissionRequest, limits: &ValidationConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    if request.contact_type.is_empty() {
        result.push("contactType", "Contact type is required");
    }
    if request.name.trim().is_empty() {
        result.push("name", "Name is required");
    }
    if request.email.trim().is_empty() {
        result.push("email", "Email is required");
    } else if !validate_email(&request.email) {
        result.push("email", "Invalid email address");
    }
    if let Some(phone) = request.phone.as_deref()
        && !validate_phone(phone)
    {
        result.push("phone", "Invalid phone number");
    }
    if request.message.trim().is_empty() {
        result.push("message", "Message is required");
    } else {
        let len = request.message.chars().count();
        if len < limits.message_min_length || len > limits.message_max_length {
            result.push(
                "message",
                format!(
                    "Message must be between {} and {} characters",
                    limits.message_min_length, limits.message_max_length
                ),
            );
        }
    }
    if let Some(attachment) = &request.attachment {
        validate_attachment(attachment, limits, &mut result);
    }

    result
}
