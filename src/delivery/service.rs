use std::sync::Arc;

use super::compose::compose;
use super::transport::{MailTransport, TransportError};
use super::DeliveryResult;
use crate::config::{Letterhead, MailRouting};
use crate::document::RenderedDocument;
use crate::metrics;
use crate::submission::model::Submission;

/// Sends each submission to the configured front-desk address.
#[derive(Clone)]
pub struct DeliveryService {
    transport: Arc<dyn MailTransport>,
    routing: MailRouting,
    letterhead: Letterhead,
}

impl DeliveryService {
    pub fn new(transport: Arc<dyn MailTransport>, routing: MailRouting, letterhead: Letterhead) -> Self {
        Self {
            transport,
            routing,
            letterhead,
        }
    }

    /// Deliver `submission`. Failures end up in the result, never as an error.
    pub async fn send(
        &self,
        submission: &Submission,
        document: Option<&RenderedDocument>,
    ) -> DeliveryResult {
        let email = compose(submission, document, &self.routing, &self.letterhead);
        let attachment_included = email.attachment.is_some();

        match self.transport.send(&email).await {
            Ok(message_id) => {
                log::info!(
                    "Delivered submission {} to {} ({})",
                    submission.id,
                    email.to,
                    if attachment_included {
                        "PDF attached"
                    } else {
                        "inline fallback"
                    }
                );
                DeliveryResult {
                    success: true,
                    recipient: email.to,
                    message_id: Some(message_id),
                    attachment_included,
                    error: None,
                }
            }
            Err(e) => {
                metrics::DELIVERY_FAILURES.inc();
                log::error!("Email for submission {} could not be sent: {}", submission.id, e);
                DeliveryResult {
                    success: false,
                    recipient: email.to,
                    message_id: None,
                    attachment_included,
                    error: Some(format!("E-Mail konnte nicht versendet werden: {}", e)),
                }
            }
        }
    }

    pub async fn verify(&self) -> Result<(), TransportError> {
        self.transport.verify().await
    }
}
