//! Fixed page structure of a Meldeschein.
//!
//! A [`DocumentLayout`] is plain data: the same submission always produces
//! the same layout, independent of how it is rendered afterwards.

use super::common::{format_german_datetime, or_missing, purpose_label, MISSING_VALUE};
use crate::config::Letterhead;
use crate::submission::model::{Submission, Traveller};

pub const TITLE: &str = "Digitaler Meldeschein";
pub const MAIN_GUEST_HEADING: &str = "Hauptreisende/r";
pub const SIGNATURE_HEADING: &str = "Digitale Unterschrift";
pub const SIGNATURE_PLACEHOLDER: &str = "Keine Unterschrift verfügbar";

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
}

impl Field {
    fn new(label: &'static str, value: &str) -> Self {
        Self {
            label,
            value: or_missing(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub heading: String,
    /// 1 for top-level headings, 2 for entries nested under one.
    pub level: u8,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignatureBlock {
    pub heading: &'static str,
    /// Whether the submission carries a signature image to embed.
    pub present: bool,
    pub placeholder: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub letterhead: Letterhead,
    pub title: &'static str,
    pub sections: Vec<Section>,
    pub signature: SignatureBlock,
    pub footer: Vec<String>,
}

impl DocumentLayout {
    pub fn for_submission(submission: &Submission, letterhead: &Letterhead) -> Self {
        let registration = &submission.registration;

        let mut sections = vec![Section {
            heading: MAIN_GUEST_HEADING.to_string(),
            level: 1,
            fields: vec![
                Field::new("Vorname", &registration.first_name),
                Field::new("Nachname", &registration.last_name),
                Field::new("Geburtsdatum", &registration.date_of_birth),
                Field::new("Staatsangehörigkeit", &registration.nationality),
                Field::new("Adresse", &registration.address),
                Field::new("Check-in", &registration.check_in),
                Field::new("Check-out", &registration.check_out),
                Field::new("Anzahl Gäste", &registration.number_of_guests.to_string()),
                Field::new(
                    "Zweck des Aufenthalts",
                    registration
                        .purpose
                        .as_deref()
                        .map(purpose_label)
                        .unwrap_or(MISSING_VALUE),
                ),
            ],
        }];

        if !registration.co_travellers.is_empty() {
            sections.push(Section {
                heading: format!("Mitreisende ({})", registration.co_travellers.len()),
                level: 1,
                fields: Vec::new(),
            });
            for (index, traveller) in registration.co_travellers.iter().enumerate() {
                sections.push(traveller_section(index + 1, traveller));
            }
        }

        let has_signature = registration
            .signature
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());

        Self {
            letterhead: letterhead.clone(),
            title: TITLE,
            sections,
            signature: SignatureBlock {
                heading: SIGNATURE_HEADING,
                present: has_signature,
                placeholder: SIGNATURE_PLACEHOLDER,
            },
            footer: vec![
                format!("Erstellt am: {}", format_german_datetime(&submission.submitted_at)),
                format!("Submission ID: {}", submission.id),
                format!("{} - {}", letterhead.name, TITLE),
            ],
        }
    }
}

fn traveller_section(number: usize, traveller: &Traveller) -> Section {
    Section {
        heading: format!("Mitreisende/r #{}", number),
        level: 2,
        fields: vec![
            Field::new("Vorname", &traveller.first_name),
            Field::new("Nachname", &traveller.last_name),
            Field::new("Geburtsdatum", &traveller.date_of_birth),
            Field::new("Staatsangehörigkeit", &traveller.nationality),
        ],
    }
}
