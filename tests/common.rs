//! Shared fixtures and mock collaborators for the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use meldeschein_server::config::AppConfig;
use meldeschein_server::delivery::{MailTransport, OutgoingEmail, TransportError};
use meldeschein_server::document::common::attachment_filename;
use meldeschein_server::document::{DocumentError, DocumentRenderer, RenderedDocument};
use meldeschein_server::storage::{JsonFileStore, SubmissionStore};
use meldeschein_server::submission::model::Submission;
use meldeschein_server::AppState;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const AUTH_USER: &str = "hhhof";
pub const AUTH_PASS: &str = "geheim";

fn encode_png(canvas: RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(canvas)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// A 400x150 canvas with one signature stroke.
pub fn signature_png() -> Vec<u8> {
    let mut canvas = RgbaImage::new(400, 150);
    for x in 40..360 {
        let y = 60 + (x % 30);
        canvas.put_pixel(x, y, Rgba([20, 20, 60, 255]));
    }
    encode_png(canvas)
}

/// A freshly initialized 400x150 canvas: every pixel transparent.
pub fn blank_canvas_png() -> Vec<u8> {
    encode_png(RgbaImage::new(400, 150))
}

pub fn png_data_uri(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", BASE64.encode(bytes))
}

pub fn sample_signature_uri() -> String {
    png_data_uri(&signature_png())
}

pub fn basic_auth_header() -> String {
    format!("Basic {}", BASE64.encode(format!("{}:{}", AUTH_USER, AUTH_PASS)))
}

/// Max Mustermann travelling with Anna.
pub fn valid_payload() -> Value {
    json!({
        "firstName": "Max",
        "lastName": "Mustermann",
        "dateOfBirth": "01.01.1990",
        "nationality": "deutsch",
        "address": "Teststr. 1, 21073 Hamburg",
        "checkIn": "01.08.2025",
        "checkOut": "05.08.2025",
        "numberOfGuests": 2,
        "purpose": "business",
        "coTravellers": [
            {
                "firstName": "Anna",
                "lastName": "Mustermann",
                "dateOfBirth": "02.02.1992",
                "nationality": "deutsch"
            }
        ],
        "signature": sample_signature_uri(),
        "privacyAccepted": true
    })
}

pub fn traveller(first_name: &str, nationality: &str) -> Value {
    json!({
        "firstName": first_name,
        "lastName": "Mustermann",
        "dateOfBirth": "02.02.1992",
        "nationality": nationality
    })
}

pub fn test_config(data_dir: &Path, extra: &[(&str, &str)]) -> AppConfig {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("DATA_DIR".to_string(), data_dir.display().to_string());
    vars.insert("HOTEL_EMAIL".to_string(), "rezeption@example.com".to_string());
    vars.insert("MAIL_CC".to_string(), "info@example.com".to_string());
    vars.insert("SMTP_USER".to_string(), "meldeschein@example.com".to_string());
    vars.insert("RENDER_TIMEOUT_SECS".to_string(), "1".to_string());
    for (key, value) in extra {
        vars.insert(key.to_string(), value.to_string());
    }
    AppConfig::from_map(&vars).expect("test config is valid")
}

pub fn write_hotels(data_dir: &Path, hotels: Value) {
    std::fs::write(
        data_dir.join("hotels.json"),
        serde_json::to_vec_pretty(&hotels).unwrap(),
    )
    .unwrap();
}

pub fn sample_hotels() -> Value {
    json!([
        {
            "id": "hhhof",
            "slug": "harburger-hof",
            "name": "Hotel Harburger Hof",
            "fieldsConfig": {
                "purpose": { "required": true, "visible": true },
                "signature": { "required": false }
            },
            "isActive": true
        },
        {
            "id": "closed",
            "slug": "altes-haus",
            "name": "Altes Haus",
            "isActive": false
        }
    ])
}

/// Records every email instead of sending it.
#[derive(Default)]
pub struct MockTransport {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl MailTransport for MockTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, TransportError> {
        let mut sent = self.sent.lock().await;
        sent.push(email.clone());
        Ok(format!("<mock-{}@example.com>", sent.len()))
    }

    async fn verify(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Transport whose server never answers.
pub struct FailingTransport;

#[async_trait]
impl MailTransport for FailingTransport {
    async fn send(&self, _email: &OutgoingEmail) -> Result<String, TransportError> {
        Err(TransportError::Unreachable)
    }

    async fn verify(&self) -> Result<(), TransportError> {
        Err(TransportError::Unreachable)
    }
}

pub const FAKE_PDF: &[u8] = b"%PDF-1.7\n% fake document\n";

/// Renderer returning a fixed PDF body.
#[derive(Default)]
pub struct StaticRenderer {
    calls: AtomicUsize,
}

impl StaticRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentRenderer for StaticRenderer {
    async fn render(&self, submission: &Submission) -> Result<RenderedDocument, DocumentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RenderedDocument {
            filename: attachment_filename(submission),
            pdf: FAKE_PDF.to_vec(),
        })
    }
}

/// Renderer that always fails as if Typst were missing.
pub struct FailingRenderer;

#[async_trait]
impl DocumentRenderer for FailingRenderer {
    async fn render(&self, _submission: &Submission) -> Result<RenderedDocument, DocumentError> {
        Err(DocumentError::TypstMissing("typst".to_string()))
    }
}

/// Renderer that takes longer than any test timeout.
pub struct SlowRenderer(pub Duration);

#[async_trait]
impl DocumentRenderer for SlowRenderer {
    async fn render(&self, submission: &Submission) -> Result<RenderedDocument, DocumentError> {
        tokio::time::sleep(self.0).await;
        StaticRenderer::new().render(submission).await
    }
}

/// App state over a JSON store in `data_dir` with the given mocks.
pub fn test_state(
    data_dir: &Path,
    renderer: Arc<dyn DocumentRenderer>,
    transport: Arc<dyn MailTransport>,
) -> (AppState, Arc<JsonFileStore>) {
    let config = test_config(data_dir, &[]);
    let store = Arc::new(JsonFileStore::in_dir(data_dir));
    let state = AppState::with_components(
        &config,
        store.clone() as Arc<dyn SubmissionStore>,
        renderer,
        transport,
    );
    (state, store)
}
