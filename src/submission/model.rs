use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A co-traveller, or the main guest's identity fields.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Traveller {
    #[schema(example = "Anna")]
    pub first_name: String,
    #[schema(example = "Mustermann")]
    pub last_name: String,
    #[schema(example = "02.02.1992")]
    pub date_of_birth: String,
    #[schema(example = "deutsch")]
    pub nationality: String,
}

/// Validated registration data as submitted by the guest.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuestRegistration {
    #[schema(example = "Max")]
    pub first_name: String,
    #[schema(example = "Mustermann")]
    pub last_name: String,
    #[schema(example = "01.01.1990")]
    pub date_of_birth: String,
    #[schema(example = "deutsch")]
    pub nationality: String,
    #[schema(example = "Teststr. 1, 21073 Hamburg")]
    pub address: String,
    #[schema(example = "01.08.2025")]
    pub check_in: String,
    #[schema(example = "05.08.2025")]
    pub check_out: String,
    #[schema(example = 2)]
    pub number_of_guests: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "business")]
    pub purpose: Option<String>,
    #[serde(default)]
    pub co_travellers: Vec<Traveller>,
    /// Signature canvas as a `data:image/png;base64,...` URI.
    #[serde(default)]
    pub signature: Option<String>,
    pub privacy_accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_id: Option<String>,
}

impl GuestRegistration {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
}

/// A stored Meldeschein. Created once, never modified.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[schema(example = "submission_1754006400000_k3j9x0a1b")]
    pub id: String,
    #[serde(flatten)]
    pub registration: GuestRegistration,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
}

impl Submission {
    /// Wrap a validated registration with a fresh id and timestamp.
    pub fn new(registration: GuestRegistration) -> Self {
        let submitted_at = Utc::now();
        Self {
            id: generate_submission_id(&submitted_at),
            registration,
            submitted_at,
            status: SubmissionStatus::Pending,
        }
    }

    /// The millisecond component of the id, used in attachment names.
    pub fn id_timestamp(&self) -> &str {
        self.id.split('_').nth(1).unwrap_or("new")
    }
}

fn generate_submission_id(at: &DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("submission_{}_{}", at.timestamp_millis(), suffix)
}

/// Body of the intake response.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub submission_id: String,
    #[schema(example = "/api/submissions/submission_1754006400000_k3j9x0a1b/pdf")]
    pub pdf_preview_url: String,
    pub email_sent: bool,
    pub pdf_attached: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: String,
    pub data: SubmissionReceipt,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct SubmissionListResponse {
    pub success: bool,
    pub data: Vec<Submission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
