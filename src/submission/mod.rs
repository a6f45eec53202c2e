//! Guest submissions: intake, validation, listing and PDF retrieval.

pub mod date_format;
pub mod handlers;
pub mod model;
pub mod service;
pub mod validation;

pub use service::{IntakeOutcome, SubmissionPipeline};
