//! Meldeschein documents: layout, Typst source generation and PDF compilation.
//!
//! - `layout` - pure arrangement of a submission into sections and fields
//! - `typst` - deterministic Typst source for a layout
//! - `engine` - runs the Typst CLI in a scratch directory
//! - `meldeschein` - the [`DocumentRenderer`] tying the three together

pub mod common;
pub mod engine;
pub mod layout;
pub mod meldeschein;
pub mod traits;
pub mod typst;

pub use engine::TypstRenderEngine;
pub use layout::DocumentLayout;
pub use meldeschein::MeldescheinRenderer;
pub use traits::DocumentRenderer;

use thiserror::Error;

use crate::signature::SignatureError;

/// Errors that can occur while producing a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to load Typst template: {0}")]
    TemplateIo(#[source] std::io::Error),
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to write Typst input: {0}")]
    WriteInput(#[source] std::io::Error),
    #[error("Typst binary '{0}' not found")]
    TypstMissing(String),
    #[error("Typst CLI execution failed: {0}")]
    TypstIo(#[source] std::io::Error),
    #[error("Typst CLI exited with status {code}: {stderr}")]
    TypstExit { code: i32, stderr: String },
    #[error("failed to read generated PDF: {0}")]
    ReadPdf(#[source] std::io::Error),
    #[error("Typst output is not a PDF")]
    NotPdf,
    #[error("signature cannot be embedded: {0}")]
    Signature(#[from] SignatureError),
    #[error("rendering did not finish within {0} seconds")]
    Timeout(u64),
}

/// A rendered PDF ready to be attached or served.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub filename: String,
    pub pdf: Vec<u8>,
}

impl RenderedDocument {
    pub fn size_bytes(&self) -> usize {
        self.pdf.len()
    }
}
