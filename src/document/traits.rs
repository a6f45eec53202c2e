use async_trait::async_trait;

use super::{DocumentError, RenderedDocument};
use crate::submission::model::Submission;

/// Turns a stored submission into a printable document.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, submission: &Submission) -> Result<RenderedDocument, DocumentError>;
}
