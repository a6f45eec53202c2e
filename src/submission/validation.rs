//! Validation boundary for raw guest submissions.
//!
//! Turns an untrusted JSON payload into a [`GuestRegistration`]. Every violated
//! field is reported at once, keyed by its path in the payload (for example
//! `coTravellers[2].nationality`), so the form can highlight all of them.

use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::fmt;

use super::date_format::{is_incomplete, is_valid_date};
use super::model::{GuestRegistration, Traveller};
use crate::error::SubmissionError;
use crate::hotel::model::FieldsConfig;
use crate::signature::{SignatureError, SignatureImage};

/// Fields the document cannot be produced without. Hotel settings cannot relax these.
pub const ALWAYS_REQUIRED: &[&str] = &[
    "firstName",
    "lastName",
    "dateOfBirth",
    "nationality",
    "address",
    "checkIn",
    "checkOut",
    "numberOfGuests",
    "signature",
    "privacyAccepted",
];

/// Validation error with a user-facing message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// Path of the field that failed validation
    pub field: String,
    /// Human-readable error message in German
    pub message: String,
    /// Suggestion for how to fix the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Create error for empty required field
    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} darf nicht leer sein", label))
            .with_suggestion(format!("Bitte {} angeben", label))
    }

    pub fn wrong_type(field: &str, label: &str, expected: &str) -> Self {
        Self::new(field, format!("{} muss {} sein", label, expected))
    }

    pub fn incomplete_date(field: &str) -> Self {
        Self::new(field, "Datum muss vollständig sein (TT.MM.JJJJ)")
            .with_suggestion("Beispiel: 01.01.1990")
    }

    pub fn invalid_date(field: &str) -> Self {
        Self::new(field, "Ungültiges Datum - bitte Format TT.MM.JJJJ verwenden")
            .with_suggestion("Das Datum muss im Kalender existieren, z.B. 28.02.1990")
    }

    pub fn invalid_guest_count(field: &str) -> Self {
        Self::new(field, "Anzahl Gäste muss eine ganze Zahl von mindestens 1 sein")
    }

    pub fn missing_signature(field: &str) -> Self {
        Self::new(field, "Digitale Unterschrift fehlt")
            .with_suggestion("Bitte im Unterschriftenfeld unterschreiben")
    }

    pub fn invalid_signature(field: &str, reason: &SignatureError) -> Self {
        Self::new(field, format!("Unterschrift ist ungültig ({})", reason))
            .with_suggestion("Bitte das Unterschriftenfeld leeren und erneut unterschreiben")
    }

    pub fn privacy_not_accepted(field: &str) -> Self {
        Self::new(field, "Die Datenschutzerklärung muss akzeptiert werden")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// Paths of all failing fields, in the order they were checked.
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Numbered, multi-line summary for logs.
    pub fn summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }

        let mut parts = vec![format!(
            "Validierung fehlgeschlagen: {} Fehler gefunden",
            self.errors.len()
        )];
        for (i, error) in self.errors.iter().enumerate() {
            parts.push(format!("{}. {}", i + 1, error));
        }
        parts.join("\n")
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Parse a request body into a JSON object.
pub fn parse_payload(body: &[u8]) -> Result<Value, SubmissionError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| SubmissionError::MalformedInput(e.to_string()))?;
    if !value.is_object() {
        return Err(SubmissionError::MalformedInput(
            "expected a JSON object".to_string(),
        ));
    }
    Ok(value)
}

/// Validates raw submissions, optionally against a hotel's field settings.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubmissionValidator<'a> {
    fields: Option<&'a FieldsConfig>,
}

impl<'a> SubmissionValidator<'a> {
    pub fn new() -> Self {
        Self { fields: None }
    }

    pub fn with_fields(fields: &'a FieldsConfig) -> Self {
        Self {
            fields: Some(fields),
        }
    }

    /// A hidden field is never required, since the guest cannot fill it in.
    fn hotel_requires(&self, field: &str) -> bool {
        self.fields
            .and_then(|config| config.get(field))
            .map(|setting| setting.is_required() && setting.is_visible())
            .unwrap_or(false)
    }

    /// Validate a raw payload and normalize it into a registration.
    pub fn validate(&self, raw: &Value) -> Result<GuestRegistration, SubmissionError> {
        let object = raw.as_object().ok_or_else(|| {
            SubmissionError::MalformedInput("expected a JSON object".to_string())
        })?;

        let mut errors = ValidationErrors::new();

        let first_name = required_text(object, "firstName", "Vorname", &mut errors);
        let last_name = required_text(object, "lastName", "Nachname", &mut errors);
        let date_of_birth = birth_date(object, "dateOfBirth", &mut errors);
        let nationality =
            required_text(object, "nationality", "Staatsangehörigkeit", &mut errors);
        let address = required_text(object, "address", "Adresse", &mut errors);
        let check_in = required_text(object, "checkIn", "Check-in", &mut errors);
        let check_out = required_text(object, "checkOut", "Check-out", &mut errors);
        let number_of_guests = guest_count(object, "numberOfGuests", &mut errors);

        let purpose = optional_text(object, "purpose", "Zweck des Aufenthalts", &mut errors);
        if purpose.is_none() && self.hotel_requires("purpose") && !errors.contains_field("purpose")
        {
            errors.add(ValidationError::empty_field(
                "purpose",
                "Zweck des Aufenthalts",
            ));
        }

        let co_travellers = co_travellers(object, &mut errors);
        let signature = signature(object, "signature", &mut errors);

        let privacy_accepted = matches!(object.get("privacyAccepted"), Some(Value::Bool(true)));
        if !privacy_accepted {
            errors.add(ValidationError::privacy_not_accepted("privacyAccepted"));
        }

        let hotel_id = optional_text(object, "hotelId", "Hotel-ID", &mut errors);

        if let Err(errors) = errors.into_result() {
            return Err(SubmissionError::Validation(errors));
        }

        Ok(GuestRegistration {
            first_name,
            last_name,
            date_of_birth,
            nationality,
            address,
            check_in,
            check_out,
            number_of_guests,
            purpose,
            co_travellers,
            signature: Some(signature),
            privacy_accepted,
            hotel_id,
        })
    }
}

// ============================================================================
// Field readers
// ============================================================================

enum TextValue {
    Absent,
    Present(String),
    WrongType,
}

fn read_text(object: &Map<String, Value>, key: &str) -> TextValue {
    match object.get(key) {
        None | Some(Value::Null) => TextValue::Absent,
        Some(Value::String(s)) => TextValue::Present(s.trim().to_string()),
        Some(_) => TextValue::WrongType,
    }
}

fn field_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn required_text_at(
    object: &Map<String, Value>,
    prefix: &str,
    key: &str,
    label: &str,
    errors: &mut ValidationErrors,
) -> String {
    let path = field_path(prefix, key);
    match read_text(object, key) {
        TextValue::Present(value) if !value.is_empty() => value,
        TextValue::Present(_) | TextValue::Absent => {
            errors.add(ValidationError::empty_field(&path, label));
            String::new()
        }
        TextValue::WrongType => {
            errors.add(ValidationError::wrong_type(&path, label, "ein Text"));
            String::new()
        }
    }
}

fn required_text(
    object: &Map<String, Value>,
    key: &str,
    label: &str,
    errors: &mut ValidationErrors,
) -> String {
    required_text_at(object, "", key, label, errors)
}

fn optional_text(
    object: &Map<String, Value>,
    key: &str,
    label: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match read_text(object, key) {
        TextValue::Present(value) if !value.is_empty() => Some(value),
        TextValue::Present(_) | TextValue::Absent => None,
        TextValue::WrongType => {
            errors.add(ValidationError::wrong_type(key, label, "ein Text"));
            None
        }
    }
}

fn birth_date_at(
    object: &Map<String, Value>,
    prefix: &str,
    key: &str,
    errors: &mut ValidationErrors,
) -> String {
    let path = field_path(prefix, key);
    let value = required_text_at(object, prefix, key, "Geburtsdatum", errors);
    if value.is_empty() {
        return value;
    }
    if is_incomplete(&value) {
        errors.add(ValidationError::incomplete_date(&path));
    } else if !is_valid_date(&value) {
        errors.add(ValidationError::invalid_date(&path));
    }
    value
}

fn birth_date(object: &Map<String, Value>, key: &str, errors: &mut ValidationErrors) -> String {
    birth_date_at(object, "", key, errors)
}

fn guest_count(object: &Map<String, Value>, key: &str, errors: &mut ValidationErrors) -> u32 {
    match object.get(key) {
        None | Some(Value::Null) => {
            errors.add(ValidationError::empty_field(key, "Anzahl Gäste"));
            0
        }
        Some(Value::Number(n)) => match whole_number(n) {
            Some(count) if count >= 1 => count,
            _ => {
                errors.add(ValidationError::invalid_guest_count(key));
                0
            }
        },
        Some(_) => {
            errors.add(ValidationError::wrong_type(key, "Anzahl Gäste", "eine Zahl"));
            0
        }
    }
}

/// Integral value of `n`, also for floats without a fractional part (`2.0`).
fn whole_number(n: &Number) -> Option<u32> {
    if let Some(value) = n.as_u64() {
        return u32::try_from(value).ok();
    }
    let value = n.as_f64()?;
    (value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value)).then_some(value as u32)
}

fn signature(object: &Map<String, Value>, key: &str, errors: &mut ValidationErrors) -> String {
    match read_text(object, key) {
        TextValue::Absent => {
            errors.add(ValidationError::missing_signature(key));
            String::new()
        }
        TextValue::WrongType => {
            errors.add(ValidationError::wrong_type(key, "Unterschrift", "ein Text"));
            String::new()
        }
        TextValue::Present(uri) => match SignatureImage::from_data_uri(&uri) {
            Ok(_) => uri,
            Err(SignatureError::Empty | SignatureError::Blank) => {
                errors.add(ValidationError::missing_signature(key));
                String::new()
            }
            Err(reason) => {
                errors.add(ValidationError::invalid_signature(key, &reason));
                String::new()
            }
        },
    }
}

fn co_travellers(object: &Map<String, Value>, errors: &mut ValidationErrors) -> Vec<Traveller> {
    let entries = match object.get("coTravellers") {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            errors.add(ValidationError::wrong_type(
                "coTravellers",
                "Mitreisende",
                "eine Liste",
            ));
            return Vec::new();
        }
    };

    let mut travellers = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let prefix = format!("coTravellers[{}]", index);
        let Some(traveller) = entry.as_object() else {
            errors.add(ValidationError::wrong_type(
                &prefix,
                &format!("Mitreisende/r #{}", index + 1),
                "ein Objekt",
            ));
            continue;
        };

        travellers.push(Traveller {
            first_name: required_text_at(traveller, &prefix, "firstName", "Vorname", errors),
            last_name: required_text_at(traveller, &prefix, "lastName", "Nachname", errors),
            date_of_birth: birth_date_at(traveller, &prefix, "dateOfBirth", errors),
            nationality: required_text_at(
                traveller,
                &prefix,
                "nationality",
                "Staatsangehörigkeit",
                errors,
            ),
        });
    }
    travellers
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_malformed_top_level() {
        let result = SubmissionValidator::new().validate(&json!(["not", "an", "object"]));
        assert!(matches!(result, Err(SubmissionError::MalformedInput(_))));
        assert!(matches!(
            parse_payload(b"{ malformed json "),
            Err(SubmissionError::MalformedInput(_))
        ));
        assert!(matches!(parse_payload(b"42"), Err(SubmissionError::MalformedInput(_))));
    }

    #[test]
    fn test_empty_object_reports_every_required_field() {
        let result = SubmissionValidator::new().validate(&json!({}));
        let Err(SubmissionError::Validation(errors)) = result else {
            panic!("expected validation errors");
        };
        for field in ALWAYS_REQUIRED {
            assert!(errors.contains_field(field), "missing error for {}", field);
        }
        assert_eq!(errors.len(), ALWAYS_REQUIRED.len());
    }

    #[test]
    fn test_error_summary_is_numbered() {
        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::empty_field("firstName", "Vorname"));
        errors.add(ValidationError::invalid_date("dateOfBirth"));
        let summary = errors.summary();
        assert!(summary.contains("2 Fehler"));
        assert!(summary.contains("1. [firstName]"));
        assert!(summary.contains("2. [dateOfBirth]"));
    }

    #[test]
    fn test_wrong_types_are_field_errors() {
        let result = SubmissionValidator::new().validate(&json!({
            "firstName": 12,
            "numberOfGuests": "zwei",
            "coTravellers": "Anna"
        }));
        let Err(SubmissionError::Validation(errors)) = result else {
            panic!("expected validation errors");
        };
        assert!(errors.contains_field("firstName"));
        assert!(errors.contains_field("numberOfGuests"));
        assert!(errors.contains_field("coTravellers"));
    }

    #[test]
    fn test_incomplete_and_impossible_dates_have_distinct_messages() {
        let incomplete = SubmissionValidator::new().validate(&json!({ "dateOfBirth": "01.01.19" }));
        let impossible = SubmissionValidator::new().validate(&json!({ "dateOfBirth": "31.02.1990" }));
        let (Err(SubmissionError::Validation(a)), Err(SubmissionError::Validation(b))) =
            (incomplete, impossible)
        else {
            panic!("expected validation errors");
        };
        let msg_a = &a.iter().find(|e| e.field == "dateOfBirth").unwrap().message;
        let msg_b = &b.iter().find(|e| e.field == "dateOfBirth").unwrap().message;
        assert!(msg_a.contains("vollständig"));
        assert!(msg_b.contains("Ungültiges Datum"));
    }

    #[test]
    fn test_whole_number_accepts_integral_floats() {
        let number = |v: Value| match v {
            Value::Number(n) => whole_number(&n),
            _ => unreachable!(),
        };
        assert_eq!(number(json!(2)), Some(2));
        assert_eq!(number(json!(2.0)), Some(2));
        assert_eq!(number(json!(2.5)), None);
        assert_eq!(number(json!(-1)), None);
        assert_eq!(number(json!(-1.0)), None);
        assert_eq!(number(json!(1e12)), None);
    }
}
