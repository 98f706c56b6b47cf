pub mod contact_service;
pub mod email_verifier;
pub mod notification;
pub mod rate_limit_service;
pub mod sanitize;
pub mod validation;
