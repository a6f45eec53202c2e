//! Mail transports.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use uuid::Uuid;

use super::compose::OutgoingEmail;
use crate::config::SmtpConfig;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid mail address '{address}': {reason}")]
    Address { address: String, reason: String },
    #[error("failed to build message: {0}")]
    Build(String),
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("SMTP server did not accept the connection")]
    Unreachable,
}

/// Hands composed mails to a mail server.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send `email` and return its message id.
    async fn send(&self, email: &OutgoingEmail) -> Result<String, TransportError>;

    /// Check that the server is reachable and accepts our credentials.
    async fn verify(&self) -> Result<(), TransportError>;
}

pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpMailTransport {
    pub fn new(config: &SmtpConfig) -> Result<Self, TransportError> {
        let builder = if config.implicit_tls() {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        };

        let mut builder = builder.port(config.port).timeout(Some(config.timeout));
        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        } else {
            log::warn!("SMTP_PASS not set, connecting to {} without authentication", config.host);
        }

        Ok(Self {
            transport: builder.build(),
            host: config.host.clone(),
        })
    }
}

fn parse_address(address: &str) -> Result<Address, TransportError> {
    address
        .trim()
        .parse::<Address>()
        .map_err(|e| TransportError::Address {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

/// `<uuid@domain>` using the sender's domain.
fn generate_message_id(from: &Address) -> String {
    format!("<{}@{}>", Uuid::new_v4(), from.domain())
}

/// Convert a composed email into a MIME message.
pub fn build_message(email: &OutgoingEmail, message_id: &str) -> Result<Message, TransportError> {
    let from = Mailbox::new(Some(email.from_name.clone()), parse_address(&email.from_address)?);

    let mut builder = Message::builder()
        .from(from)
        .to(Mailbox::new(None, parse_address(&email.to)?))
        .subject(email.subject.clone())
        .message_id(Some(message_id.to_string()));
    for cc in &email.cc {
        builder = builder.cc(Mailbox::new(None, parse_address(cc)?));
    }

    let body = MultiPart::alternative_plain_html(email.text_body.clone(), email.html_body.clone());
    let message = match &email.attachment {
        Some(attachment) => {
            let content_type = ContentType::parse(&attachment.content_type)
                .map_err(|e| TransportError::Build(e.to_string()))?;
            builder.multipart(
                MultiPart::mixed().multipart(body).singlepart(
                    Attachment::new(attachment.filename.clone())
                        .body(attachment.bytes.clone(), content_type),
                ),
            )
        }
        None => builder.multipart(body),
    };

    message.map_err(|e| TransportError::Build(e.to_string()))
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, TransportError> {
        let message_id = generate_message_id(&parse_address(&email.from_address)?);
        let message = build_message(email, &message_id)?;

        let response = self.transport.send(message).await?;
        log::debug!("SMTP server {} answered {}", self.host, response.code());
        Ok(message_id)
    }

    async fn verify(&self) -> Result<(), TransportError> {
        if self.transport.test_connection().await? {
            Ok(())
        } else {
            Err(TransportError::Unreachable)
        }
    }
}
