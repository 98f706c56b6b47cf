use crate::config::Config;
use crate::services::contact_service::ContactService;
use crate::services::notification::EmailSender;
use crate::services::rate_limit_service::{ClientIpResolver, SlidingWindowLimiter};
use axum::body::Body;
use axum::http::Request;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod contact;
pub mod middleware;
pub mod schemas;

/// Transport-level cap; large enough that the 5 MiB attachment rule is
/// enforced by the validator, not the body reader.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct AppState {
    pub contact_service: ContactService,
    pub email_check_limiter: Arc<SlidingWindowLimiter>,
    pub ip_resolver: ClientIpResolver,
}

#[derive(Debug)]
pub struct ServiceContainer {
    pub contact_service: ContactService,
    pub contact_limiter: Arc<SlidingWindowLimiter>,
    pub email_check_limiter: Arc<SlidingWindowLimiter>,
    pub ip_resolver: ClientIpResolver,
}

impl ServiceContainer {
    #[must_use]
    pub fn build(config: &Config, sender: Arc<dyn EmailSender>) -> Self {
        let contact_limiter = Arc::new(SlidingWindowLimiter::new(
            "contact",
            config.rate_limit.contact_max_attempts,
            Duration::from_secs(config.rate_limit.contact_window_minutes * 60),
        ));
        let email_check_limiter = Arc::new(SlidingWindowLimiter::new(
            "email_check",
            config.rate_limit.email_check_max_attempts,
            Duration::from_secs(config.rate_limit.email_check_window_minutes * 60),
        ));

        let contact_service = ContactService::new(
            config.validation.clone(),
            config.mail.clone(),
            Arc::clone(&contact_limiter),
            sender,
            !config.server.environment.is_production(),
        );

        Self {
            contact_service,
            contact_limiter,
            email_check_limiter,
            ip_resolver: ClientIpResolver::new(config.server.trusted_proxies.clone()),
        }
    }
}

/// Configures and returns the application router.
pub fn app_router(services: ServiceContainer) -> Router {
    let state = AppState {
        contact_service: services.contact_service,
        email_check_limiter: services.email_check_limiter,
        ip_resolver: services.ip_resolver,
    };

    Router::new()
        .route("/v1/contact", post(contact::submit_contact))
        .route("/v1/contact/health", get(contact::health))
        .route("/v1/contact/validate-email", post(contact::check_email))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(PropagateRequestIdLayer::new(axum::http::HeaderName::from_static("x-request-id")))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(move |request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<tower_http::request_id::RequestId>()
                        .map(|id| id.header_value().to_str().unwrap_or_default())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                        let status = response.status();
                        tracing::Span::current().record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(
            axum::http::HeaderName::from_static("x-request-id"),
            middleware::MakeRequestUuidOrHeader,
        ))
        .with_state(state)
}
