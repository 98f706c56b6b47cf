pub mod provider;
pub mod templates;

pub use provider::{EmailSender, LoggingEmailSender};
pub use templates::OutgoingEmail;
