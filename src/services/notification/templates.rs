use crate::domain::submission::SubmissionRequest;
use time::OffsetDateTime;
use time::macros::format_description;

/// One email ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

fn submitted_at() -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute] UTC");
    OffsetDateTime::now_utc().format(&format).unwrap_or_else(|_| "unknown".to_string())
}

/// Builds the notification sent to staff. The submission must already be
/// sanitized; this function interpolates fields into HTML verbatim.
#[must_use]
pub fn internal_notification(submission: &SubmissionRequest, reference_id: &str, staff_address: &str) -> OutgoingEmail {
    let phone_row = submission
        .phone
        .as_deref()
        .map_or_else(String::new, |phone| format!("<p><strong>Phone:</strong> {phone}</p>\n"));

    let attachment_row = submission.attachment.as_ref().map_or_else(String::new, |a| {
        format!("<p><strong>Attachment:</strong> {} ({} bytes, {})</p>\n", a.name, a.size, a.mime_type)
    });

    let html = format!(
        "<h2>New contact enquiry</h2>\n\
         <p><strong>Reference:</strong> {reference_id}</p>\n\
         <p><strong>Received:</strong> {received}</p>\n\
         <p><strong>Type:</strong> {contact_type}</p>\n\
         <p><strong>Name:</strong> {name}</p>\n\
         <p><strong>Email:</strong> {email}</p>\n\
         {phone_row}{attachment_row}\
         <h3>Message</h3>\n\
         <p>{message}</p>\n",
        received = submitted_at(),
        contact_type = submission.contact_type,
        name = submission.name,
        email = submission.email,
        message = submission.message,
    );

    OutgoingEmail {
        to: staff_address.to_string(),
        subject: format!("New {} enquiry from {}", submission.contact_type, submission.name),
        html,
    }
}

/// Builds the acknowledgment sent back to the submitter.
#[must_use]
pub fn auto_response(submission: &SubmissionRequest, reference_id: &str) -> OutgoingEmail {
    let html = format!(
        "<h2>Thank you for contacting Aero Drone Solutions</h2>\n\
         <p>Hi {name},</p>\n\
         <p>We have received your {contact_type} enquiry and will get back to you \
         within one business day.</p>\n\
         <p>Your reference number is <strong>{reference_id}</strong>.</p>\n\
         <p>&mdash; The Aero Drone Solutions team</p>\n",
        name = submission.name,
        contact_type = submission.contact_type,
    );

    OutgoingEmail {
        to: submission.email.clone(),
        subject: "Thank you for contacting Aero Drone Solutions".to_string(),
        html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::submission::{AttachmentMeta, ContactType};

    fn submission() -> SubmissionRequest {
        SubmissionRequest {
            contact_type: ContactType::Sales,
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: Some("+1 (555) 123-4567".to_string()),
            message: "Interested in your drainage inspection service".to_string(),
            attachment: Some(AttachmentMeta {
                name: "site-plan.pdf".to_string(),
                size: 1024,
                mime_type: "application/pdf".to_string(),
            }),
        }
    }

    #[test]
    fn test_internal_notification_carries_every_field() {
        let email = internal_notification(&submission(), "ADS-1700000000000", "info@aerodronesolutions.com");

        assert_eq!(email.to, "info@aerodronesolutions.com");
        assert_eq!(email.subject, "New sales enquiry from Jane Doe");
        for needle in [
            "ADS-1700000000000",
            "Jane Doe",
            "jane@example.com",
            "+1 (555) 123-4567",
            "site-plan.pdf",
            "Interested in your drainage inspection service",
        ] {
            assert!(email.html.contains(needle), "missing {needle} in {}", email.html);
        }
    }

    #[test]
    fn test_internal_notification_omits_absent_optionals() {
        let mut sub = submission();
        sub.phone = None;
        sub.attachment = None;
        let email = internal_notification(&sub, "ADS-1", "info@aerodronesolutions.com");
        assert!(!email.html.contains("Phone:"));
        assert!(!email.html.contains("Attachment:"));
    }

    #[test]
    fn test_auto_response_addresses_the_submitter() {
        let email = auto_response(&submission(), "ADS-42");
        assert_eq!(email.to, "jane@example.com");
        assert!(email.html.contains("Hi Jane Doe,"));
        assert!(email.html.contains("ADS-42"));
    }

    #[test]
    fn test_sanitized_input_yields_no_raw_markup_from_user_fields() {
        let mut sub = submission();
        sub.name = "Mallory <script>".to_string();
        sub.message = "a/b \"c\"".to_string();
        let sub = sub.sanitized();

        let email = internal_notification(&sub, "ADS-7", "info@aerodronesolutions.com");
        assert!(!email.html.contains("<script>"));
        assert!(email.html.contains("Mallory &lt;script&gt;"));
        assert!(email.html.contains("a&#x2F;b &quot;c&quot;"));
    }

    #[test]
    fn test_markup_bearing_phone_and_email_never_reach_html_raw() {
        use crate::services::validation::{validate_email, validate_phone};

        let mut sub = submission();
        sub.phone = Some("123<script>4567890".to_string());
        sub.email = "<script@evil.com".to_string();

        // both values pass the shape checks (ten digits; non-whitespace
        // local part with a dotted domain), so escaping is all that stands
        // between them and the email body
        assert!(validate_phone(sub.phone.as_deref().unwrap_or_default()));
        assert!(validate_email(&sub.email));

        let sub = sub.sanitized();
        let email = internal_notification(&sub, "ADS-9", "info@aerodronesolutions.com");
        assert!(!email.html.contains("<script"));
        assert!(email.html.contains("123&lt;script&gt;4567890"));
        assert!(email.html.contains("&lt;script@evil.com"));
    }
}
