use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};

use crate::error::RelayError;

pub const PREFLIGHT_METHOD: &str = "OPTIONS";
pub const FIELD_NAMES: [&str; 3] = ["name", "email", "message"];

/// Field values as they arrived, before presence validation.
///
/// Only string values are carried; anything else counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

impl ContactFields {
    fn from_object(object: &Map<String, Value>) -> Self {
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            name: text("name"),
            email: text("email"),
            message: text("message"),
        }
    }
}

/// A validated contact form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// The invocation shapes the relay accepts, resolved once at the entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactEvent {
    Preflight,
    Gateway(ContactFields),
    Direct(ContactFields),
}

impl ContactEvent {
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Preflight => "preflight",
            Self::Gateway(_) => "gateway",
            Self::Direct(_) => "direct",
        }
    }

    pub fn into_fields(self) -> Option<ContactFields> {
        match self {
            Self::Preflight => None,
            Self::Gateway(fields) | Self::Direct(fields) => Some(fields),
        }
    }
}

/// HTTP method of a proxy event, for both REST (v1) and HTTP API (v2) payloads.
pub fn request_method(event: &Value) -> Option<&str> {
    event
        .get("httpMethod")
        .and_then(Value::as_str)
        .or_else(|| {
            event
                .pointer("/requestContext/http/method")
                .and_then(Value::as_str)
        })
}

pub fn normalize_event(event: &Value) -> Result<ContactEvent, RelayError> {
    let Some(object) = event.as_object() else {
        return Err(RelayError::InvalidRequestFormat);
    };

    if request_method(event) == Some(PREFLIGHT_METHOD) {
        return Ok(ContactEvent::Preflight);
    }

    match object.get("body") {
        Some(Value::String(text)) if !text.is_empty() => {
            let is_base64 = object.get("isBase64Encoded").is_some_and(is_truthy);
            let decoded = decode_gateway_body(text, is_base64)?;
            let payload: Value = serde_json::from_str(&decoded)
                .map_err(|error| RelayError::MalformedPayload(error.to_string()))?;
            let Some(payload) = payload.as_object() else {
                return Err(RelayError::MalformedPayload(
                    "request body must be a JSON object".to_string(),
                ));
            };
            return Ok(ContactEvent::Gateway(ContactFields::from_object(payload)));
        }
        // Only text bodies are parsed; any other non-empty body is unreadable.
        Some(body) if is_truthy(body) => {
            return Err(RelayError::MalformedPayload(
                "request body must be a string".to_string(),
            ));
        }
        _ => {}
    }

    if FIELD_NAMES.iter().all(|key| object.contains_key(*key)) {
        return Ok(ContactEvent::Direct(ContactFields::from_object(object)));
    }

    Err(RelayError::InvalidRequestFormat)
}

/// Loose truthiness used for proxy event flags and bodies: `null`, `false`,
/// zero, and empty strings, arrays or objects are all false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}

pub fn decode_gateway_body(body: &str, is_base64: bool) -> Result<String, RelayError> {
    if !is_base64 {
        return Ok(body.to_string());
    }

    let bytes = STANDARD
        .decode(body)
        .map_err(|error| RelayError::MalformedPayload(format!("invalid base64 body: {error}")))?;
    String::from_utf8(bytes)
        .map_err(|error| RelayError::MalformedPayload(format!("body is not valid UTF-8: {error}")))
}

pub fn validate_submission(fields: ContactFields) -> Result<Submission, RelayError> {
    match (fields.name, fields.email, fields.message) {
        (Some(name), Some(email), Some(message))
            if !name.is_empty() && !email.is_empty() && !message.is_empty() =>
        {
            Ok(Submission {
                name,
                email,
                message,
            })
        }
        _ => Err(RelayError::MissingFields),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(name: &str, email: &str, message: &str) -> ContactFields {
        ContactFields {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            message: Some(message.to_string()),
        }
    }

    #[test]
    fn detects_preflight_from_rest_and_http_api_events() {
        let rest = json!({"httpMethod": "OPTIONS"});
        let http_api = json!({"requestContext": {"http": {"method": "OPTIONS"}}});

        assert_eq!(normalize_event(&rest), Ok(ContactEvent::Preflight));
        assert_eq!(normalize_event(&http_api), Ok(ContactEvent::Preflight));
    }

    #[test]
    fn parses_gateway_text_body() {
        let event = json!({
            "httpMethod": "POST",
            "body": "{\"name\":\"Ann\",\"email\":\"ann@x.com\",\"message\":\"Hi\"}"
        });

        let normalized = normalize_event(&event).expect("gateway event should parse");
        assert_eq!(
            normalized,
            ContactEvent::Gateway(fields("Ann", "ann@x.com", "Hi"))
        );
    }

    #[test]
    fn decodes_base64_gateway_body() {
        let encoded = STANDARD.encode(r#"{"name":"Bo","email":"bo@x.com","message":"Hej"}"#);
        let event = json!({"body": encoded, "isBase64Encoded": true});

        let normalized = normalize_event(&event).expect("base64 body should decode");
        assert_eq!(
            normalized,
            ContactEvent::Gateway(fields("Bo", "bo@x.com", "Hej"))
        );
    }

    #[test]
    fn object_body_is_a_payload_error() {
        let event = json!({"body": {"name": "Cy", "email": "cy@x.com", "message": "Yo"}});

        let error = normalize_event(&event).expect_err("object body is not text");
        assert_eq!(error.status_code(), 500);
        assert_eq!(error.to_string(), "request body must be a string");
    }

    #[test]
    fn falsy_bodies_fall_through_to_direct_fields() {
        for body in [json!(false), json!(0), json!([]), json!({}), Value::Null] {
            let event = json!({
                "body": body,
                "name": "Ann",
                "email": "ann@x.com",
                "message": "Hi"
            });

            assert_eq!(
                normalize_event(&event),
                Ok(ContactEvent::Direct(fields("Ann", "ann@x.com", "Hi")))
            );
        }
    }

    #[test]
    fn truthy_base64_flag_decodes_body() {
        let encoded = STANDARD.encode(r#"{"name":"Bo","email":"bo@x.com","message":"Hej"}"#);
        for flag in [json!("true"), json!(1)] {
            let event = json!({"body": encoded, "isBase64Encoded": flag});

            let normalized = normalize_event(&event).expect("base64 body should decode");
            assert_eq!(
                normalized,
                ContactEvent::Gateway(fields("Bo", "bo@x.com", "Hej"))
            );
        }
    }

    #[test]
    fn falsy_base64_flag_parses_body_as_text() {
        let event = json!({
            "body": "{\"name\":\"Ann\",\"email\":\"ann@x.com\",\"message\":\"Hi\"}",
            "isBase64Encoded": 0
        });

        let normalized = normalize_event(&event).expect("plain body should parse");
        assert_eq!(normalized.shape(), "gateway");
    }

    #[test]
    fn falls_back_to_direct_fields_when_body_is_empty() {
        let event = json!({
            "body": "",
            "name": "Ann",
            "email": "ann@x.com",
            "message": "Hi"
        });

        let normalized = normalize_event(&event).expect("direct fields should be used");
        assert_eq!(
            normalized,
            ContactEvent::Direct(fields("Ann", "ann@x.com", "Hi"))
        );
    }

    #[test]
    fn direct_shape_requires_all_three_keys() {
        let event = json!({"name": "Ann", "message": "Hi"});
        assert_eq!(
            normalize_event(&event),
            Err(RelayError::InvalidRequestFormat)
        );
    }

    #[test]
    fn rejects_non_object_events() {
        assert_eq!(
            normalize_event(&json!(["Ann"])),
            Err(RelayError::InvalidRequestFormat)
        );
    }

    #[test]
    fn malformed_json_body_is_a_payload_error() {
        let event = json!({"body": "not json"});

        let error = normalize_event(&event).expect_err("malformed body should fail");
        assert_eq!(error.status_code(), 500);
        assert!(matches!(error, RelayError::MalformedPayload(_)));
    }

    #[test]
    fn invalid_base64_is_a_payload_error() {
        let event = json!({"body": "%%%", "isBase64Encoded": true});

        let error = normalize_event(&event).expect_err("invalid base64 should fail");
        assert!(error.to_string().starts_with("invalid base64 body"));
    }

    #[test]
    fn non_object_json_body_is_a_payload_error() {
        let event = json!({"body": "[1, 2]"});

        let error = normalize_event(&event).expect_err("array body should fail");
        assert_eq!(error.to_string(), "request body must be a JSON object");
    }

    #[test]
    fn non_string_values_count_as_missing() {
        let event = json!({"name": "Ann", "email": 42, "message": "Hi"});

        let fields = normalize_event(&event)
            .expect("direct shape should resolve")
            .into_fields()
            .expect("direct shape carries fields");
        assert_eq!(fields.email, None);
        assert_eq!(validate_submission(fields), Err(RelayError::MissingFields));
    }

    #[test]
    fn validation_rejects_empty_values() {
        let error = validate_submission(fields("Ann", "", "Hi")).expect_err("empty email");
        assert_eq!(error, RelayError::MissingFields);
    }

    #[test]
    fn validation_does_not_check_email_format() {
        let submission =
            validate_submission(fields("Ann", "not-an-address", "Hi")).expect("should pass");
        assert_eq!(submission.email, "not-an-address");
    }
}
