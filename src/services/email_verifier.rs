use crate::services::validation::validate_email;

/// Common domain misspellings worth a correction hint. Kept deliberately
/// small; the goal is catching obvious slips, not exhaustive fuzzy matching.
const DOMAIN_TYPOS: &[(&str, &str)] = &[
    ("gmial.com", "gmail.com"),
    ("gmal.com", "gmail.com"),
    ("gamil.com", "gmail.com"),
    ("gmaill.com", "gmail.com"),
    ("gnail.com", "gmail.com"),
    ("hotmial.com", "hotmail.com"),
    ("hotmal.com", "hotmail.com"),
    ("yahooo.com", "yahoo.com"),
    ("yaho.com", "yahoo.com"),
    ("outlok.com", "outlook.com"),
    ("outloook.com", "outlook.com"),
];

/// Throwaway-address providers rejected outright.
const DISPOSABLE_DOMAINS: &[&str] = &[
    "mailinator.com",
    "guerrillamail.com",
    "10minutemail.com",
    "tempmail.com",
    "temp-mail.org",
    "throwaway.email",
    "yopmail.com",
    "getnada.com",
    "trashmail.com",
    "sharklasers.com",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailVerdict {
    Deliverable,
    Undeliverable { reason: String },
}

impl EmailVerdict {
    #[must_use]
    pub fn is_deliverable(&self) -> bool {
        matches!(self, Self::Deliverable)
    }

    #[must_use]
    pub fn into_reason(self) -> Option<String> {
        match self {
            Self::Deliverable => None,
            Self::Undeliverable { reason } => Some(reason),
        }
    }
}

/// Pre-validates an address before the form is even submitted: shape check,
/// then a typo-correction suggestion, then the disposable-domain
/// block-list.
#[must_use]
pub fn verify(email: &str) -> EmailVerdict {
    let email = email.trim();

    if !validate_email(email) {
        return EmailVerdict::Undeliverable { reason: "Invalid email address".to_string() };
    }

    // Shape check passed, so the split cannot fail.
    let Some((local, domain)) = email.split_once('@') else {
        return EmailVerdict::Undeliverable { reason: "Invalid email address".to_string() };
    };
    let domain_lower = domain.to_ascii_lowercase();

    if let Some((_, corrected)) = DOMAIN_TYPOS.iter().find(|(typo, _)| *typo == domain_lower) {
        return EmailVerdict::Undeliverable { reason: format!("Did you mean {local}@{corrected}?") };
    }

    if DISPOSABLE_DOMAINS.contains(&domain_lower.as_str()) {
        return EmailVerdict::Undeliverable {
            reason: "Disposable email addresses are not accepted".to_string(),
        };
    }

    EmailVerdict::Deliverable
}
