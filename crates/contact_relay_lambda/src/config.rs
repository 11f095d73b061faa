pub const DEFAULT_SENDER_EMAIL: &str = "janedoe@example.com";
pub const DEFAULT_RECIPIENT_EMAIL: &str = "johndoe@example.com";
pub const DEFAULT_SES_REGION: &str = "us-east-1";

pub const SENDER_EMAIL_VAR: &str = "SENDER_EMAIL";
pub const RECIPIENT_EMAIL_VAR: &str = "RECIPIENT_EMAIL";
pub const SES_REGION_VAR: &str = "SES_REGION";
pub const PROBE_VERIFIED_IDENTITIES_VAR: &str = "SES_PROBE_VERIFIED_IDENTITIES";

/// Process-wide relay settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Verified SES identity used as `Source`.
    pub sender: String,
    pub recipient: String,
    pub region: String,
    pub probe_verified_identities: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            sender: DEFAULT_SENDER_EMAIL.to_string(),
            recipient: DEFAULT_RECIPIENT_EMAIL.to_string(),
            region: DEFAULT_SES_REGION.to_string(),
            probe_verified_identities: true,
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str, fallback: String| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or(fallback)
        };

        Self {
            sender: text(SENDER_EMAIL_VAR, defaults.sender),
            recipient: text(RECIPIENT_EMAIL_VAR, defaults.recipient),
            region: text(SES_REGION_VAR, defaults.region),
            probe_verified_identities: lookup(PROBE_VERIFIED_IDENTITIES_VAR)
                .and_then(|value| parse_flag(&value))
                .unwrap_or(defaults.probe_verified_identities),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
