use std::collections::BTreeMap;
use std::io;

use serde::{Deserialize, Serialize};
use serde_json::ser::{Formatter, Serializer};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::adapters::mail::MailService;
use crate::config::RelayConfig;
use crate::runtime::compose::compose_email;
use crate::runtime::contract::{normalize_event, validate_submission, ContactEvent};
use crate::runtime::error::RelayError;

pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    (
        "Access-Control-Allow-Headers",
        "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token",
    ),
    ("Access-Control-Allow-Methods", "POST,OPTIONS"),
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn cors_headers() -> BTreeMap<String, String> {
    CORS_HEADERS
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

pub fn handle_contact_event(
    event: Value,
    config: &RelayConfig,
    mailer: &dyn MailService,
) -> ApiGatewayResponse {
    info!(event = %event, "event received");
    if let Some(object) = event.as_object() {
        debug!(keys = ?object.keys().collect::<Vec<_>>(), "event keys");
    }

    match relay(&event, config, mailer) {
        Ok(Some(message_id)) => success_response(json!({
            "message": format!("Email sent successfully. MessageId: {message_id}"),
        })),
        Ok(None) => preflight_response(),
        Err(error) => error_response(&error),
    }
}

/// Returns the message id, or `None` for a preflight request.
fn relay(
    event: &Value,
    config: &RelayConfig,
    mailer: &dyn MailService,
) -> Result<Option<String>, RelayError> {
    let normalized = normalize_event(event)?;
    info!(shape = normalized.shape(), "resolved event shape");

    let fields = match normalized {
        ContactEvent::Preflight => return Ok(None),
        ContactEvent::Gateway(fields) | ContactEvent::Direct(fields) => fields,
    };
    debug!(
        name = ?fields.name,
        email = ?fields.email,
        message = ?fields.message,
        "parsed submission fields"
    );

    let submission = validate_submission(fields)?;
    let email = compose_email(&submission, &config.sender, &config.recipient);

    if config.probe_verified_identities {
        probe_verified_identities(mailer);
    }

    info!(
        sender = %email.source,
        recipient = %email.destination,
        "sending email"
    );
    let message_id = mailer
        .send_email(&email)
        .map_err(RelayError::MailService)?;
    info!(message_id = %message_id, "email sent");

    Ok(Some(message_id))
}

/// Logs the verified sender identities. Failures are logged and dropped.
pub fn probe_verified_identities(mailer: &dyn MailService) {
    match mailer.list_verified_identities() {
        Ok(identities) => info!(identities = ?identities, "verified sender identities"),
        Err(error) => warn!(error = %error, "failed to list verified sender identities"),
    }
}

fn preflight_response() -> ApiGatewayResponse {
    info!("handling preflight request");
    ApiGatewayResponse {
        status_code: 200,
        headers: cors_headers(),
        body: String::new(),
    }
}

/// Compact JSON with `", "` between entries and `": "` before values.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

pub fn body_text(payload: &Value) -> String {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, SpacedFormatter);
    payload
        .serialize(&mut serializer)
        .expect("response payload should serialize");
    String::from_utf8(buffer).expect("serialized JSON is UTF-8")
}

fn success_response(payload: Value) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code: 200,
        headers: cors_headers(),
        body: body_text(&payload),
    }
}

fn error_response(error: &RelayError) -> ApiGatewayResponse {
    let status_code = error.status_code();
    if status_code >= 500 {
        error!(status_code, error = %error, "contact relay failed");
    } else {
        warn!(status_code, error = %error, "rejected contact request");
    }

    ApiGatewayResponse {
        status_code,
        headers: cors_headers(),
        body: body_text(&json!({ "error": error.to_string() })),
    }
}
