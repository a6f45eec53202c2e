//! Shared helpers for document generation and mail composition.

use chrono::{DateTime, Local, Utc};
use std::path::Path;

use crate::submission::model::Submission;

/// Shown wherever a value is missing.
pub const MISSING_VALUE: &str = "-";

/// Escape special characters for Typst strings.
pub fn escape_typst_string(value: &str) -> String {
    value
        .replace('\\', r"\\")
        .replace('"', r#"\""#)
        .replace('\n', r"\n")
        .replace('\r', r"\r")
        .replace('\t', r"\t")
}

/// Display label for a travel purpose; unknown values pass through.
pub fn purpose_label(purpose: &str) -> &str {
    match purpose {
        "business" => "Geschäftsreisen",
        "private" => "Privat",
        "leisure" => "Urlaub",
        "family" => "Familienbesuch",
        "other" => "Sonstiges",
        other => other,
    }
}

/// `value`, or the missing-value marker when blank.
pub fn or_missing(value: &str) -> String {
    if value.trim().is_empty() {
        MISSING_VALUE.to_string()
    } else {
        value.to_string()
    }
}

/// Timestamp in German notation, local time (e.g. "01.08.2025, 14:30:00").
pub fn format_german_datetime(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%d.%m.%Y, %H:%M:%S")
        .to_string()
}

/// `Meldeschein_<first>_<last>_<millis>.pdf`, safe to use as a file name.
pub fn attachment_filename(submission: &Submission) -> String {
    let registration = &submission.registration;
    let raw = format!(
        "Meldeschein_{}_{}_{}.pdf",
        registration.first_name.trim(),
        registration.last_name.trim(),
        submission.id_timestamp()
    );
    sanitize_filename::sanitize(raw.replace(char::is_whitespace, "_"))
}

/// Get the static assets directory path.
pub fn get_static_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_typst_string() {
        assert_eq!(escape_typst_string(r#"a "b" \c"#), r#"a \"b\" \\c"#);
        assert_eq!(escape_typst_string("line\nbreak"), r"line\nbreak");
    }

    #[test]
    fn test_purpose_labels() {
        assert_eq!(purpose_label("business"), "Geschäftsreisen");
        assert_eq!(purpose_label("private"), "Privat");
        assert_eq!(purpose_label("family"), "Familienbesuch");
        assert_eq!(purpose_label("Messe"), "Messe");
    }

    #[test]
    fn test_or_missing() {
        assert_eq!(or_missing("  "), "-");
        assert_eq!(or_missing("Hamburg"), "Hamburg");
    }
}
