//! The intake pipeline: validate, store, render, deliver.
//!
//! Validation and malformed-input errors return before anything is written.
//! Once a submission is stored the intake counts as successful; rendering and
//! delivery failures are logged and reported in the outcome instead.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::model::Submission;
use super::validation::{parse_payload, SubmissionValidator};
use crate::delivery::{DeliveryResult, DeliveryService, TransportError};
use crate::document::{DocumentError, DocumentRenderer, RenderedDocument};
use crate::error::SubmissionError;
use crate::hotel::directory::HotelDirectory;
use crate::hotel::model::HotelProfile;
use crate::metrics;
use crate::storage::SubmissionStore;

/// What happened to an accepted submission.
#[derive(Debug, Clone)]
pub struct IntakeOutcome {
    pub submission: Submission,
    pub delivery: DeliveryResult,
    /// Size of the rendered PDF, if rendering succeeded.
    pub document_size: Option<usize>,
}

pub struct SubmissionPipeline {
    store: Arc<dyn SubmissionStore>,
    hotels: Arc<HotelDirectory>,
    renderer: Arc<dyn DocumentRenderer>,
    delivery: DeliveryService,
    render_timeout: Duration,
}

impl SubmissionPipeline {
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        hotels: Arc<HotelDirectory>,
        renderer: Arc<dyn DocumentRenderer>,
        delivery: DeliveryService,
        render_timeout: Duration,
    ) -> Self {
        Self {
            store,
            hotels,
            renderer,
            delivery,
            render_timeout,
        }
    }

    pub fn is_durable(&self) -> bool {
        self.store.is_durable()
    }

    /// Run the full intake for a raw request body.
    pub async fn submit(&self, body: &[u8]) -> Result<IntakeOutcome, SubmissionError> {
        let raw = parse_payload(body).inspect_err(|e| {
            metrics::VALIDATION_REJECTIONS.inc();
            log::warn!("Rejected submission: {}", e);
        })?;

        let hotel = self.resolve_hotel(&raw).await?;
        let validator = match &hotel {
            Some(profile) => SubmissionValidator::with_fields(&profile.fields_config),
            None => SubmissionValidator::new(),
        };

        let registration = validator.validate(&raw).inspect_err(|e| {
            metrics::VALIDATION_REJECTIONS.inc();
            log::warn!("Submission failed validation:\n{}", e);
        })?;

        let submission = Submission::new(registration);
        log::info!(
            "Submission {} received for {} ({} co-travellers)",
            submission.id,
            submission.registration.full_name(),
            submission.registration.co_travellers.len()
        );

        self.store.append(&submission).await?;
        metrics::SUBMISSIONS_ACCEPTED.inc();
        log::info!("Submission {} stored", submission.id);

        let document = match self.render(&submission).await {
            Ok(document) => {
                log::info!(
                    "Rendered {} ({} KB)",
                    document.filename,
                    document.size_bytes() / 1024
                );
                Some(document)
            }
            Err(e) => {
                log::warn!(
                    "PDF for submission {} unavailable, falling back to inline email: {}",
                    submission.id,
                    e
                );
                None
            }
        };

        let delivery = self.delivery.send(&submission, document.as_ref()).await;

        Ok(IntakeOutcome {
            document_size: document.as_ref().map(RenderedDocument::size_bytes),
            submission,
            delivery,
        })
    }

    /// Profile named by `hotelId`, if the payload carries one.
    async fn resolve_hotel(&self, raw: &Value) -> Result<Option<HotelProfile>, SubmissionError> {
        let Some(key) = raw
            .get("hotelId")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|key| !key.is_empty())
        else {
            return Ok(None);
        };

        match self.hotels.find(key).await? {
            Some(profile) if profile.is_active != Some(false) => {
                log::debug!("Validating against field settings of hotel '{}'", profile.slug);
                Ok(Some(profile))
            }
            Some(_) => {
                log::warn!("Submission for inactive hotel '{}' rejected", key);
                Err(SubmissionError::HotelNotFound(key.to_string()))
            }
            None => Err(SubmissionError::HotelNotFound(key.to_string())),
        }
    }

    /// Render a document, giving up after the configured timeout.
    pub async fn render(&self, submission: &Submission) -> Result<RenderedDocument, DocumentError> {
        let result = match tokio::time::timeout(self.render_timeout, self.renderer.render(submission)).await {
            Ok(result) => result,
            Err(_) => Err(DocumentError::Timeout(self.render_timeout.as_secs())),
        };
        if result.is_err() {
            metrics::RENDER_FAILURES.inc();
        }
        result
    }

    pub async fn list(&self) -> Result<Vec<Submission>, SubmissionError> {
        Ok(self.store.list().await?)
    }

    /// Re-render the PDF of a stored submission.
    pub async fn document_for(&self, id: &str) -> Result<RenderedDocument, SubmissionError> {
        if !self.store.is_durable() {
            return Err(SubmissionError::Disabled(
                "PDF-Generierung nicht verfügbar - Submissions werden nicht lokal gespeichert"
                    .to_string(),
            ));
        }

        let submission = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| SubmissionError::NotFound(id.to_string()))?;
        Ok(self.render(&submission).await?)
    }

    pub async fn verify_mail(&self) -> Result<(), TransportError> {
        self.delivery.verify().await
    }
}
