use serde::{Deserialize, Serialize};

use crate::contract::Submission;

pub const EMAIL_CHARSET: &str = "UTF-8";

/// A fully composed email, ready for the mail service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingEmail {
    pub source: String,
    pub destination: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
    pub charset: String,
}

pub fn subject_line(submission: &Submission) -> String {
    format!("New contact form submission from {}", submission.name)
}

pub fn text_body(submission: &Submission) -> String {
    format!(
        "Name: {}\nEmail: {}\n\nMessage:\n{}",
        submission.name, submission.email, submission.message
    )
}

/// User content is interpolated verbatim; nothing is HTML-escaped.
pub fn html_body(submission: &Submission) -> String {
    format!(
        "<p><strong>Name:</strong> {}</p><p><strong>Email:</strong> {}</p>\
         <p><strong>Message:</strong></p><p>{}</p>",
        submission.name, submission.email, submission.message
    )
}

pub fn compose_email(submission: &Submission, source: &str, destination: &str) -> OutgoingEmail {
    OutgoingEmail {
        source: source.to_string(),
        destination: destination.to_string(),
        subject: subject_line(submission),
        text_body: text_body(submission),
        html_body: html_body(submission),
        charset: EMAIL_CHARSET.to_string(),
    }
}
