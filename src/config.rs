use clap::{Args, Parser, ValueEnum};
use ipnetwork::IpNetwork;

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub mail: MailConfig,

    #[command(flatten)]
    pub rate_limit: RateLimitConfig,

    #[command(flatten)]
    pub validation: ValidationConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "ADS_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "ADS_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Comma-separated list of CIDRs to trust for X-Forwarded-For IP extraction
    #[arg(
        long,
        env = "ADS_TRUSTED_PROXIES",
        default_value = "10.0.0.0/8,172.16.0.0/12,192.168.0.0/16,127.0.0.1/32",
        value_delimiter = ','
    )]
    pub trusted_proxies: Vec<IpNetwork>,

    /// Deployment environment; error details are only exposed outside production
    #[arg(long, env = "ADS_ENVIRONMENT", value_enum, default_value = "production")]
    pub environment: Environment,

    /// How long to wait for background tasks during shutdown
    #[arg(long, env = "ADS_SHUTDOWN_TIMEOUT_SECS", default_value_t = 10)]
    pub shutdown_timeout_secs: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

#[derive(Clone, Debug, Args)]
pub struct MailConfig {
    /// Address that receives internal contact notifications
    #[arg(long, env = "ADS_STAFF_EMAIL", default_value = "info@aerodronesolutions.com")]
    pub staff_address: String,

    /// From-address used for outgoing mail
    #[arg(long, env = "ADS_FROM_EMAIL", default_value = "noreply@aerodronesolutions.com")]
    pub from_address: String,
}

#[derive(Clone, Debug, Args)]
pub struct RateLimitConfig {
    /// Maximum contact submissions per client within the window
    #[arg(long, env = "ADS_CONTACT_MAX_ATTEMPTS", default_value_t = 5)]
    pub contact_max_attempts: u32,

    /// Sliding window for contact submissions, in minutes
    #[arg(long, env = "ADS_CONTACT_WINDOW_MINUTES", default_value_t = 60)]
    pub contact_window_minutes: u64,

    /// Maximum email pre-validation calls per client within the window
    #[arg(long, env = "ADS_EMAIL_CHECK_MAX_ATTEMPTS", default_value_t = 3)]
    pub email_check_max_attempts: u32,

    /// Sliding window for email pre-validation, in minutes
    #[arg(long, env = "ADS_EMAIL_CHECK_WINDOW_MINUTES", default_value_t = 60)]
    pub email_check_window_minutes: u64,

    /// How often to prune idle identifiers from the limiter stores
    #[arg(long, env = "ADS_LIMITER_CLEANUP_INTERVAL_SECS", default_value_t = 300)]
    pub cleanup_interval_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct ValidationConfig {
    /// Minimum accepted message length in characters
    #[arg(long, env = "ADS_MESSAGE_MIN_LENGTH", default_value_t = 10)]
    pub message_min_length: usize,

    /// Maximum accepted message length in characters
    #[arg(long, env = "ADS_MESSAGE_MAX_LENGTH", default_value_t = 1000)]
    pub message_max_length: usize,

    /// Max attachment size in bytes (Default: 5 MiB)
    #[arg(long, env = "ADS_ATTACHMENT_MAX_SIZE_BYTES", default_value_t = 5_242_880)]
    pub attachment_max_size_bytes: u64,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// OTLP collector endpoint; telemetry export is disabled when unset
    #[arg(long, env = "ADS_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Log output format
    #[arg(long, env = "ADS_LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}
