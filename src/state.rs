use std::sync::Arc;
use thiserror::Error;

use crate::config::{AppConfig, BasicAuthCredentials, StorageMode};
use crate::delivery::{DeliveryService, MailTransport, SmtpMailTransport, TransportError};
use crate::document::{DocumentError, DocumentRenderer, MeldescheinRenderer, TypstRenderEngine};
use crate::hotel::directory::HotelDirectory;
use crate::storage::{EphemeralStore, JsonFileStore, SubmissionStore};
use crate::submission::service::SubmissionPipeline;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("renderer setup failed: {0}")]
    Renderer(#[from] DocumentError),
    #[error("mail transport setup failed: {0}")]
    Transport(#[from] TransportError),
}

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SubmissionPipeline>,
    pub hotels: Arc<HotelDirectory>,
    pub auth: BasicAuthCredentials,
    pub public_base_url: Option<String>,
}

impl AppState {
    /// Wire the production collaborators described by `config`.
    pub fn new(config: &AppConfig) -> Result<Self, StateError> {
        let store: Arc<dyn SubmissionStore> = match config.storage.mode {
            StorageMode::Local => {
                let store = JsonFileStore::in_dir(&config.storage.data_dir);
                log::info!("Storing submissions in {}", store.path().display());
                Arc::new(store)
            }
            StorageMode::Ephemeral => {
                log::info!("Local storage disabled, submissions are only delivered by email");
                Arc::new(EphemeralStore)
            }
        };

        let renderer = MeldescheinRenderer::new(
            config.letterhead.clone(),
            TypstRenderEngine::new(config.renderer.typst_bin.clone()),
        )?;
        let transport = SmtpMailTransport::new(&config.smtp)?;

        Ok(Self::with_components(
            config,
            store,
            Arc::new(renderer),
            Arc::new(transport),
        ))
    }

    /// Build the state around caller-supplied collaborators.
    pub fn with_components(
        config: &AppConfig,
        store: Arc<dyn SubmissionStore>,
        renderer: Arc<dyn DocumentRenderer>,
        transport: Arc<dyn MailTransport>,
    ) -> Self {
        let hotels = Arc::new(HotelDirectory::in_dir(&config.storage.data_dir));
        let delivery = DeliveryService::new(
            transport,
            config.mail.clone(),
            config.letterhead.clone(),
        );
        let pipeline = SubmissionPipeline::new(
            store,
            hotels.clone(),
            renderer,
            delivery,
            config.renderer.timeout,
        );

        Self {
            pipeline: Arc::new(pipeline),
            hotels,
            auth: config.auth.clone(),
            public_base_url: config.server.public_base_url.clone(),
        }
    }

    /// Link to the PDF of a submission, absolute when a public base URL is set.
    pub fn pdf_url(&self, submission_id: &str) -> String {
        format!(
            "{}/api/submissions/{}/pdf",
            self.public_base_url.as_deref().unwrap_or(""),
            submission_id
        )
    }
}
