//! Mail composition.
//!
//! With a rendered PDF the mail is a short cover note and the document is
//! attached. Without one, every field of the Meldeschein is written into the
//! body instead, so staff still receive the complete registration.

use std::fmt::Write;

use crate::config::{Letterhead, MailRouting};
use crate::document::common::{format_german_datetime, purpose_label, MISSING_VALUE};
use crate::document::layout::DocumentLayout;
use crate::document::RenderedDocument;
use crate::submission::model::Submission;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, PartialEq)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A transport-independent email.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub from_name: String,
    pub from_address: String,
    pub to: String,
    pub cc: Vec<String>,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
    pub attachment: Option<EmailAttachment>,
}

/// Escape text for inclusion in HTML element content and attribute values.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub fn subject_for(submission: &Submission) -> String {
    format!("Neuer Meldeschein - {}", submission.registration.full_name())
}

/// Build the email for `submission`, attaching `document` when present.
pub fn compose(
    submission: &Submission,
    document: Option<&RenderedDocument>,
    routing: &MailRouting,
    letterhead: &Letterhead,
) -> OutgoingEmail {
    let (text_body, html_body) = match document {
        Some(_) => (
            attached_text(submission, letterhead),
            attached_html(submission, letterhead),
        ),
        None => {
            let layout = DocumentLayout::for_submission(submission, letterhead);
            (
                inline_text(submission, &layout, letterhead),
                inline_html(submission, &layout, letterhead),
            )
        }
    };

    OutgoingEmail {
        from_name: routing.from_name.clone(),
        from_address: routing.from_address.clone(),
        to: routing.to.clone(),
        cc: routing.cc.clone(),
        subject: subject_for(submission),
        text_body,
        html_body,
        attachment: document.map(|doc| EmailAttachment {
            filename: doc.filename.clone(),
            content_type: PDF_CONTENT_TYPE.to_string(),
            bytes: doc.pdf.clone(),
        }),
    }
}

fn purpose_of(submission: &Submission) -> &str {
    submission
        .registration
        .purpose
        .as_deref()
        .map(purpose_label)
        .unwrap_or(MISSING_VALUE)
}

fn summary_lines(submission: &Submission) -> Vec<(&'static str, String)> {
    let registration = &submission.registration;
    vec![
        ("Gast", registration.full_name()),
        ("Check-in", registration.check_in.clone()),
        ("Check-out", registration.check_out.clone()),
        ("Anzahl Gäste", registration.number_of_guests.to_string()),
        ("Zweck des Aufenthalts", purpose_of(submission).to_string()),
    ]
}

fn signoff_text(letterhead: &Letterhead) -> String {
    format!(
        "Mit freundlichen Grüßen,\nDigitales Meldeschein-System\n{}",
        letterhead.name
    )
}

fn attached_text(submission: &Submission, letterhead: &Letterhead) -> String {
    let mut body = String::from(
        "Sehr geehrte Damen und Herren,\n\nim Anhang finden Sie den digitalen Meldeschein für:\n\n",
    );
    for (label, value) in summary_lines(submission) {
        let _ = writeln!(body, "{}: {}", label, value);
    }
    body.push_str("\nDas PDF-Dokument enthält alle erforderlichen Angaben gemäß Meldegesetz.\n\n");
    body.push_str(&signoff_text(letterhead));
    body
}

fn inline_text(submission: &Submission, layout: &DocumentLayout, letterhead: &Letterhead) -> String {
    let mut body = String::from(
        "Sehr geehrte Damen und Herren,\n\nanbei die Daten des digitalen Meldescheins für:\n\n",
    );
    for (label, value) in summary_lines(submission) {
        let _ = writeln!(body, "{}: {}", label, value);
    }
    for section in &layout.sections {
        let _ = writeln!(body, "\n{}", section.heading);
        for field in &section.fields {
            let _ = writeln!(body, "  {}: {}", field.label, field.value);
        }
    }
    let _ = writeln!(
        body,
        "\n{}: {}",
        layout.signature.heading,
        if layout.signature.present {
            "siehe HTML-Ansicht"
        } else {
            layout.signature.placeholder
        }
    );
    body.push_str(
        "\nDas PDF-Dokument konnte nicht erstellt werden. Alle erforderlichen Angaben gemäß Meldegesetz sind oben aufgeführt.\n\n",
    );
    body.push_str(&signoff_text(letterhead));
    body
}

fn html_open(letterhead: &Letterhead, intro: &str) -> String {
    format!(
        concat!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;\">\n",
            "<h2 style=\"color: #2563eb; border-bottom: 2px solid #2563eb; padding-bottom: 10px;\">{} - Digitaler Meldeschein</h2>\n",
            "<p>Sehr geehrte Damen und Herren,</p>\n",
            "<p>{}</p>\n"
        ),
        escape_html(&letterhead.name),
        intro
    )
}

fn html_summary(submission: &Submission) -> String {
    let mut html = String::from(
        "<div style=\"background: #f8fafc; padding: 15px; border-radius: 8px; margin: 20px 0;\">\n",
    );
    for (label, value) in summary_lines(submission) {
        let _ = writeln!(html, "<strong>{}:</strong> {}<br>", label, escape_html(&value));
    }
    html.push_str("</div>\n");
    html
}

fn html_close(submission: &Submission, letterhead: &Letterhead, note: &str) -> String {
    format!(
        concat!(
            "<p style=\"margin-top: 30px;\">Mit freundlichen Grüßen<br>\n",
            "<strong>Digitales Meldeschein-System</strong><br>\n{}</p>\n",
            "<div style=\"border-top: 1px solid #e2e8f0; margin-top: 20px; padding-top: 15px; color: #64748b; font-size: 12px;\">\n",
            "Eingegangen am {}<br>\nSubmission ID: {}<br>\n{}\n</div>\n</div>\n"
        ),
        escape_html(&letterhead.name),
        format_german_datetime(&submission.submitted_at),
        escape_html(&submission.id),
        note
    )
}

fn attached_html(submission: &Submission, letterhead: &Letterhead) -> String {
    let mut html = html_open(letterhead, "im Anhang finden Sie den digitalen Meldeschein für:");
    html.push_str(&html_summary(submission));
    html.push_str("<p>Das PDF-Dokument enthält alle erforderlichen Angaben gemäß Meldegesetz.</p>\n");
    html.push_str(&html_close(submission, letterhead, "Mit PDF-Anhang"));
    html
}

fn inline_html(submission: &Submission, layout: &DocumentLayout, letterhead: &Letterhead) -> String {
    let mut html = html_open(letterhead, "anbei die Daten des digitalen Meldescheins für:");
    html.push_str(&html_summary(submission));

    for section in &layout.sections {
        let tag = if section.level == 1 { "h3" } else { "h4" };
        let _ = writeln!(
            html,
            "<{tag} style=\"color: #2563eb; margin-bottom: 6px;\">{}</{tag}>",
            escape_html(&section.heading),
            tag = tag
        );
        if section.fields.is_empty() {
            continue;
        }
        html.push_str("<table style=\"border-collapse: collapse; width: 100%;\">\n");
        for field in &section.fields {
            let _ = writeln!(
                html,
                "<tr><td style=\"padding: 3px 8px; color: #64748b;\">{}</td><td style=\"padding: 3px 8px;\">{}</td></tr>",
                escape_html(field.label),
                escape_html(&field.value)
            );
        }
        html.push_str("</table>\n");
    }

    let _ = writeln!(
        html,
        "<h3 style=\"color: #2563eb;\">{}</h3>",
        escape_html(layout.signature.heading)
    );
    match submission.registration.signature.as_deref() {
        Some(uri) if layout.signature.present => {
            let _ = writeln!(
                html,
                "<img src=\"{}\" alt=\"{}\" style=\"max-width: 250px; border: 1px solid #ddd;\" />",
                escape_html(uri),
                escape_html(layout.signature.heading)
            );
        }
        _ => {
            let _ = writeln!(html, "<p><em>{}</em></p>", escape_html(layout.signature.placeholder));
        }
    }

    html.push_str("<p>Alle erforderlichen Angaben gemäß Meldegesetz sind oben aufgeführt.</p>\n");
    html.push_str(&html_close(
        submission,
        letterhead,
        "Das PDF-Dokument konnte nicht erstellt werden - alle Daten sind in dieser E-Mail enthalten",
    ));
    html
}
