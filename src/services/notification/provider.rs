use async_trait::async_trait;

#[async_trait]
pub trait EmailSender: Send + Sync + std::fmt::Debug {
    /// Hands one email to the transport. Returns whether the transport
    /// accepted it; callers decide what a `false` means for them.
    async fn send(&self, to: &str, subject: &str, html: &str) -> bool;
}

/// Stand-in transport: logs the email and reports success. Deployments wire
/// a real provider behind the same trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEmailSender;

#[async_trait]
impl EmailSender for LoggingEmailSender {
    async fn send(&self, to: &str, subject: &str, html: &str) -> bool {
        tracing::info!(
            to = %to,
            subject = %subject,
            body_bytes = html.len(),
            "Email dispatched (logging transport)"
        );
        true
    }
}
