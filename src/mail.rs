//! Outbound email for account verification codes.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

use crate::config::MailConfig;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Delivery seam for verification codes. The SMTP implementation is the
/// production one; tests substitute a recording double.
pub trait VerificationMailer: Send + Sync {
    fn send_verification(&self, to: &str, otp: &str) -> Result<(), MailError>;
}

/// SMTP mailer configured from environment (relay host, credentials, sender).
pub struct SmtpMailer {
    transport: SmtpTransport,
    sender: String,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let mut builder = SmtpTransport::relay(&config.server)?.port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }
        Ok(Self {
            transport: builder.build(),
            sender: config.sender.clone(),
        })
    }
}

impl VerificationMailer for SmtpMailer {
    fn send_verification(&self, to: &str, otp: &str) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.sender.parse()?)
            .to(to.parse()?)
            .subject("MediCURE - Email Verification Code")
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "Your verification code is: {otp}\n\nThis code will expire in 10 minutes."
            ))?;

        self.transport.send(&message)?;
        tracing::info!(recipient = %to, "Verification email sent");
        Ok(())
    }
}
