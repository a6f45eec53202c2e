//! Mail delivery of submissions to the front desk.

pub mod compose;
pub mod service;
pub mod transport;

pub use compose::{EmailAttachment, OutgoingEmail};
pub use service::DeliveryService;
pub use transport::{MailTransport, SmtpMailTransport, TransportError};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome of one delivery attempt.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResult {
    pub success: bool,
    pub recipient: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    pub attachment_included: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
