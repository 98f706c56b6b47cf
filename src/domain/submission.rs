use crate::services::sanitize::sanitize;
use std::fmt;

/// Category selected on the contact form. Unknown wire values are preserved
/// as free-form text rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactType {
    Sales,
    Support,
    Partnership,
    General,
    Other(String),
}

impl ContactType {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sales" => Self::Sales,
            "support" => Self::Support,
            "partnership" => Self::Partnership,
            "general" => Self::General,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Other(s) if s.is_empty())
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Sales => "sales",
            Self::Support => "support",
            Self::Partnership => "partnership",
            Self::General => "general",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for ContactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Metadata for an uploaded attachment. Only the metadata participates in
/// validation and notification; the bytes themselves are never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentMeta {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

/// The normalized representation of one contact-form POST, regardless of
/// whether it arrived as JSON or multipart form data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub contact_type: ContactType,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub attachment: Option<AttachmentMeta>,
}

impl SubmissionRequest {
    /// Returns a copy with every field that can reach an HTML email body
    /// escaped: name, email, phone, message, attachment file name, and a
    /// free-form contact type. The shape checks accept markup-bearing
    /// values (a phone keeps its digit count, an email its `@` and dot),
    /// so escaping here is the only line of defense.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        Self {
            contact_type: match &self.contact_type {
                ContactType::Other(s) => ContactType::Other(sanitize(s)),
                other => other.clone(),
            },
            name: sanitize(&self.name),
            email: sanitize(&self.email),
            phone: self.phone.as_deref().map(sanitize),
            message: sanitize(&self.message),
            attachment: self.attachment.as_ref().map(|a| AttachmentMeta {
                name: sanitize(&a.name),
                size: a.size,
                mime_type: a.mime_type.clone(),
            }),
        }
    }
}
