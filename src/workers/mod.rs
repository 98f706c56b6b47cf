pub mod rate_limit_cleanup;

pub use rate_limit_cleanup::RateLimitCleanupWorker;
