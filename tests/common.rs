#![allow(dead_code, clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, clippy::must_use_candidate, missing_debug_implementations, unreachable_pub)]

use ads_contact_server::api::{self, ServiceContainer};
use ads_contact_server::config::{
    Config, Environment, LogFormat, MailConfig, RateLimitConfig, ServerConfig, TelemetryConfig, ValidationConfig,
};
use ads_contact_server::services::notification::EmailSender;
use async_trait::async_trait;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, Once};

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("ads_contact_server=debug".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Test transport: records everything it accepts, and refuses delivery to a
/// configurable address so dispatch failures can be exercised.
#[derive(Debug, Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<SentEmail>>,
    reject_to: Option<String>,
}

impl RecordingEmailSender {
    pub fn rejecting(address: &str) -> Self {
        Self { sent: Mutex::new(Vec::new()), reject_to: Some(address.to_string()) }
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, to: &str, subject: &str, html: &str) -> bool {
        if self.reject_to.as_deref() == Some(to) {
            return false;
        }
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        true
    }
}

pub fn get_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            trusted_proxies: vec!["10.0.0.0/8".parse().unwrap()],
            environment: Environment::Production,
            shutdown_timeout_secs: 5,
        },
        mail: MailConfig {
            staff_address: "info@aerodronesolutions.com".to_string(),
            from_address: "noreply@aerodronesolutions.com".to_string(),
        },
        rate_limit: RateLimitConfig {
            contact_max_attempts: 5,
            contact_window_minutes: 60,
            email_check_max_attempts: 3,
            email_check_window_minutes: 60,
            cleanup_interval_secs: 300,
        },
        validation: ValidationConfig {
            message_min_length: 10,
            message_max_length: 1000,
            attachment_max_size_bytes: 5_242_880,
        },
        telemetry: TelemetryConfig { otlp_endpoint: None, log_format: LogFormat::Text },
    }
}

pub struct TestApp {
    pub url: String,
    pub client: reqwest::Client,
    pub sender: Arc<RecordingEmailSender>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(get_test_config(), RecordingEmailSender::default()).await
    }

    pub async fn spawn_with(config: Config, sender: RecordingEmailSender) -> Self {
        setup_tracing();

        let sender = Arc::new(sender);
        let services = ServiceContainer::build(&config, Arc::clone(&sender) as Arc<dyn EmailSender>);
        let router = api::app_router(services);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>()).await.unwrap();
        });

        Self { url: format!("http://{addr}"), client: reqwest::Client::new(), sender }
    }

    pub async fn post_contact(&self, body: &serde_json::Value) -> reqwest::Response {
        self.client.post(format!("{}/v1/contact", self.url)).json(body).send().await.unwrap()
    }

    pub async fn check_email(&self, email: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/v1/contact/validate-email", self.url))
            .json(&json!({ "email": email }))
            .send()
            .await
            .unwrap()
    }
}

/// A submission that passes every validator check.
pub fn valid_submission() -> serde_json::Value {
    json!({
        "contactType": "sales",
        "name": "Jane Doe",
        "email": "jane@example.com",
        "message": "Interested in your drainage inspection service please contact me soon"
    })
}
