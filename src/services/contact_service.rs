use crate::config::{MailConfig, ValidationConfig};
use crate::domain::submission::SubmissionRequest;
use crate::error::{AppError, Result};
use crate::services::notification::{EmailSender, templates};
use crate::services::rate_limit_service::SlidingWindowLimiter;
use crate::services::validation;
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use time::OffsetDateTime;

#[derive(Clone, Debug)]
struct ContactMetrics {
    submissions_total: Counter<u64>,
    rejections_total: Counter<u64>,
}

impl ContactMetrics {
    fn new() -> Self {
        let meter = global::meter("ads-contact-server");
        Self {
            submissions_total: meter
                .u64_counter("contact_submissions_total")
                .with_description("Total number of accepted contact submissions")
                .build(),
            rejections_total: meter
                .u64_counter("contact_rejections_total")
                .with_description("Rejected contact submissions by reason")
                .build(),
        }
    }
}

/// Issues `ADS-<millis>` reference ids that are unique and strictly
/// increasing even when the clock reads the same millisecond twice or steps
/// backwards.
#[derive(Debug, Default)]
pub struct ReferenceIdGenerator {
    last_issued: AtomicI64,
}

impl ReferenceIdGenerator {
    fn unix_millis() -> i64 {
        #[allow(clippy::cast_possible_truncation)]
        {
            (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
        }
    }

    pub fn next(&self) -> String {
        let now = Self::unix_millis();
        let previous = self
            .last_issued
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
            .unwrap_or(now);
        format!("ADS-{}", now.max(previous + 1))
    }
}

/// Acknowledgment returned to the caller after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub reference_id: String,
}

/// Runs the contact pipeline for one request: validate, sanitize, rate
/// limit, then dispatch both notification emails.
#[derive(Clone, Debug)]
pub struct ContactService {
    limits: ValidationConfig,
    mail: MailConfig,
    limiter: Arc<SlidingWindowLimiter>,
    sender: Arc<dyn EmailSender>,
    reference_ids: Arc<ReferenceIdGenerator>,
    expose_errors: bool,
    metrics: ContactMetrics,
}

impl ContactService {
    #[must_use]
    pub fn new(
        limits: ValidationConfig,
        mail: MailConfig,
        limiter: Arc<SlidingWindowLimiter>,
        sender: Arc<dyn EmailSender>,
        expose_errors: bool,
    ) -> Self {
        Self {
            limits,
            mail,
            limiter,
            sender,
            reference_ids: Arc::new(ReferenceIdGenerator::default()),
            expose_errors,
            metrics: ContactMetrics::new(),
        }
    }

    /// # Errors
    /// `AppError::Validation` for the first failing field check,
    /// `AppError::RateLimited` when the client exceeded its window, and
    /// `AppError::Dispatch` when the internal notification is not accepted
    /// by the transport.
    #[tracing::instrument(
        skip(self, request),
        fields(contact_type = %request.contact_type, client_ip = %client_ip),
        err(level = "warn")
    )]
    pub async fn submit(&self, request: SubmissionRequest, client_ip: IpAddr) -> Result<SubmissionReceipt> {
        if let Some(error) = validation::validate(&request, &self.limits).into_first_error() {
            self.metrics.rejections_total.add(1, &[KeyValue::new("reason", "validation")]);
            return Err(AppError::Validation { field: error.field, message: error.message });
        }

        // Everything that can reach an email body is escaped from here on.
        let request = request.sanitized();

        if !self.limiter.check(&client_ip.to_string()) {
            self.metrics.rejections_total.add(1, &[KeyValue::new("reason", "rate_limit")]);
            return Err(AppError::RateLimited);
        }

        let reference_id = self.reference_ids.next();

        let internal = templates::internal_notification(&request, &reference_id, &self.mail.staff_address);
        if !self.sender.send(&internal.to, &internal.subject, &internal.html).await {
            self.metrics.rejections_total.add(1, &[KeyValue::new("reason", "dispatch")]);
            return Err(AppError::Dispatch {
                detail: self
                    .expose_errors
                    .then(|| format!("internal notification to {} was not accepted by the transport", internal.to)),
            });
        }

        // Best effort; the submission already succeeded from the caller's
        // point of view.
        let ack = templates::auto_response(&request, &reference_id);
        if !self.sender.send(&ack.to, &ack.subject, &ack.html).await {
            tracing::warn!(to = %ack.to, "Auto-response was not accepted by the transport");
        }

        tracing::info!(reference_id = %reference_id, "Contact submission accepted");
        self.metrics.submissions_total.add(1, &[]);

        Ok(SubmissionReceipt { reference_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_reference_ids_are_unique_and_increasing() {
        let generator = ReferenceIdGenerator::default();
        let mut seen = HashSet::new();
        let mut previous = 0_i64;

        for _ in 0..1000 {
            let id = generator.next();
            let millis: i64 = id.strip_prefix("ADS-").expect("ADS- prefix").parse().expect("numeric suffix");
            assert!(millis > previous, "{millis} not greater than {previous}");
            previous = millis;
            assert!(seen.insert(id));
        }
    }

    #[test]
    fn test_reference_id_shape() {
        let id = ReferenceIdGenerator::default().next();
        assert!(id.starts_with("ADS-"));
        assert!(id[4..].chars().all(|c| c.is_ascii_digit()));
    }
}
