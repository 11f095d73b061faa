use thiserror::Error;

pub const INVALID_REQUEST_FORMAT: &str = "Invalid request format";
pub const MISSING_FIELDS: &str = "Missing name, email, or message";

/// Terminal failure of a single relay invocation.
///
/// The display text is exactly what ends up in the `error` field of the
/// response body, underlying error text included.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("Invalid request format")]
    InvalidRequestFormat,
    #[error("Missing name, email, or message")]
    MissingFields,
    #[error("{0}")]
    MalformedPayload(String),
    #[error("SES Error: {0}")]
    MailService(String),
}

impl RelayError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequestFormat | Self::MissingFields => 400,
            Self::MalformedPayload(_) | Self::MailService(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_bad_request() {
        assert_eq!(RelayError::InvalidRequestFormat.status_code(), 400);
        assert_eq!(RelayError::MissingFields.status_code(), 400);
        assert_eq!(
            RelayError::InvalidRequestFormat.to_string(),
            INVALID_REQUEST_FORMAT
        );
        assert_eq!(RelayError::MissingFields.to_string(), MISSING_FIELDS);
    }

    #[test]
    fn mail_service_errors_keep_underlying_text() {
        let error = RelayError::MailService("Email address is not verified.".to_string());
        assert_eq!(error.status_code(), 500);
        assert_eq!(
            error.to_string(),
            "SES Error: Email address is not verified."
        );
    }

    #[test]
    fn malformed_payload_exposes_raw_text() {
        let error = RelayError::MalformedPayload("expected value at line 1 column 1".to_string());
        assert_eq!(error.status_code(), 500);
        assert_eq!(error.to_string(), "expected value at line 1 column 1");
    }
}
