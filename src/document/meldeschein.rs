//! Renderer for the Meldeschein PDF.

use async_trait::async_trait;
use std::fs;
use std::path::Path;

use super::common::{attachment_filename, get_static_dir};
use super::engine::TypstRenderEngine;
use super::layout::DocumentLayout;
use super::traits::DocumentRenderer;
use super::typst::to_typst_source;
use super::{DocumentError, RenderedDocument};
use crate::config::Letterhead;
use crate::signature::SignatureImage;
use crate::submission::model::Submission;

pub const TEMPLATE_FILE: &str = "meldeschein.typ";

/// Everything the Typst compiler needs for one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSource {
    pub source: String,
    pub assets: Vec<(String, Vec<u8>)>,
}

pub struct MeldescheinRenderer {
    template: String,
    letterhead: Letterhead,
    engine: TypstRenderEngine,
}

impl MeldescheinRenderer {
    /// Create a renderer with the template from the static directory.
    pub fn new(letterhead: Letterhead, engine: TypstRenderEngine) -> Result<Self, DocumentError> {
        Self::with_template_path(&get_static_dir().join(TEMPLATE_FILE), letterhead, engine)
    }

    pub fn with_template_path(
        path: &Path,
        letterhead: Letterhead,
        engine: TypstRenderEngine,
    ) -> Result<Self, DocumentError> {
        let template = fs::read_to_string(path).map_err(DocumentError::TemplateIo)?;
        Ok(Self::with_template(template, letterhead, engine))
    }

    pub fn with_template(template: String, letterhead: Letterhead, engine: TypstRenderEngine) -> Self {
        Self {
            template,
            letterhead,
            engine,
        }
    }

    /// Typst source and assets for `submission`, without compiling.
    pub fn prepare(&self, submission: &Submission) -> Result<PreparedSource, DocumentError> {
        let layout = DocumentLayout::for_submission(submission, &self.letterhead);

        let signature = match submission.registration.signature.as_deref() {
            Some(uri) if layout.signature.present => Some(SignatureImage::from_data_uri(uri)?),
            _ => None,
        };
        let signature_file = signature.as_ref().map(SignatureImage::file_name);
        let source = to_typst_source(&self.template, &layout, signature_file.as_deref());

        let assets = match (signature_file, signature) {
            (Some(name), Some(image)) => vec![(name, image.bytes)],
            _ => Vec::new(),
        };
        Ok(PreparedSource { source, assets })
    }
}

#[async_trait]
impl DocumentRenderer for MeldescheinRenderer {
    async fn render(&self, submission: &Submission) -> Result<RenderedDocument, DocumentError> {
        let prepared = self.prepare(submission)?;
        let pdf = self.engine.compile(&prepared.source, &prepared.assets).await?;
        Ok(RenderedDocument {
            filename: attachment_filename(submission),
            pdf,
        })
    }
}
