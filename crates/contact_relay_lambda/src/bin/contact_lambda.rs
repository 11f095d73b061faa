use std::sync::Arc;

use aws_sdk_ses::error::DisplayErrorContext;
use aws_sdk_ses::types::{Body, Content, Destination, Message};
use contact_relay_lambda::adapters::mail::MailService;
use contact_relay_lambda::config::RelayConfig;
use contact_relay_lambda::handlers::contact::{handle_contact_event, ApiGatewayResponse};
use contact_relay_lambda::logging;
use contact_relay_lambda::runtime::compose::OutgoingEmail;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::{debug, info};

struct SesMailService {
    ses_client: aws_sdk_ses::Client,
}

fn content(data: &str, charset: &str) -> Result<Content, String> {
    Content::builder()
        .data(data)
        .charset(charset)
        .build()
        .map_err(|error| format!("failed to build email content: {error}"))
}

impl MailService for SesMailService {
    fn send_email(&self, email: &OutgoingEmail) -> Result<String, String> {
        let message = Message::builder()
            .subject(content(&email.subject, &email.charset)?)
            .body(
                Body::builder()
                    .text(content(&email.text_body, &email.charset)?)
                    .html(content(&email.html_body, &email.charset)?)
                    .build(),
            )
            .build();
        let destination = Destination::builder()
            .to_addresses(email.destination.clone())
            .build();
        let source = email.source.clone();
        let client = self.ses_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .send_email()
                    .source(source)
                    .destination(destination)
                    .message(message)
                    .send()
                    .await
                    .map_err(|error| DisplayErrorContext(error).to_string())?;
                debug!(response = ?output, "ses send_email response");
                Ok(output.message_id().to_string())
            })
        })
    }

    fn list_verified_identities(&self) -> Result<Vec<String>, String> {
        let client = self.ses_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .list_verified_email_addresses()
                    .send()
                    .await
                    .map(|output| output.verified_email_addresses().to_vec())
                    .map_err(|error| {
                        format!(
                            "failed to list verified email addresses: {}",
                            DisplayErrorContext(error)
                        )
                    })
            })
        })
    }
}

struct RuntimeDependencies {
    config: RelayConfig,
    mailer: SesMailService,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<ApiGatewayResponse, Error> {
    debug!(request_id = %event.context.request_id, "invocation started");
    Ok(handle_contact_event(
        event.payload,
        &deps.config,
        &deps.mailer,
    ))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init();

    let config = RelayConfig::from_env();
    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()))
        .load()
        .await;
    info!(
        sender = %config.sender,
        recipient = %config.recipient,
        region = %config.region,
        "contact relay configured"
    );

    let deps = Arc::new(RuntimeDependencies {
        config,
        mailer: SesMailService {
            ses_client: aws_sdk_ses::Client::new(&aws_config),
        },
    });

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let deps = Arc::clone(&deps);
        async move { handle_request(event, &deps).await }
    }))
    .await
}
