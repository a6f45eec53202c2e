//! Typst source generation.
//!
//! The template in `static/meldeschein.typ` defines a `meldeschein(doc)`
//! function; this module appends a call with the layout serialized as a Typst
//! dictionary literal. Output depends only on the layout and template.

use std::fmt::Write;

use super::common::escape_typst_string;
use super::layout::{DocumentLayout, Section};

fn quoted(value: &str) -> String {
    format!("\"{}\"", escape_typst_string(value))
}

fn section_literal(section: &Section) -> String {
    let mut fields = String::new();
    for field in &section.fields {
        let _ = write!(
            fields,
            "(label: {}, value: {}), ",
            quoted(field.label),
            quoted(&field.value)
        );
    }
    format!(
        "    (heading: {}, level: {}, fields: ({})),\n",
        quoted(&section.heading),
        section.level,
        fields.trim_end()
    )
}

/// Complete Typst source: template followed by the `meldeschein` call.
///
/// `signature_file` names the image written next to the source, if any.
pub fn to_typst_source(
    template: &str,
    layout: &DocumentLayout,
    signature_file: Option<&str>,
) -> String {
    let mut sections = String::new();
    for section in &layout.sections {
        sections.push_str(&section_literal(section));
    }

    let footer: Vec<String> = layout.footer.iter().map(|line| quoted(line)).collect();
    let image = match signature_file {
        Some(file) if layout.signature.present => quoted(file),
        _ => "none".to_string(),
    };

    format!(
        r#"{template}

#meldeschein((
  letterhead: (
    name: {name},
    address: {address},
    contact: {contact},
  ),
  title: {title},
  sections: (
{sections}  ),
  signature: (
    heading: {sig_heading},
    image: {image},
    placeholder: {placeholder},
  ),
  footer: ({footer},),
))
"#,
        template = template.trim_end(),
        name = quoted(&layout.letterhead.name),
        address = quoted(&layout.letterhead.address),
        contact = quoted(&layout.letterhead.contact),
        title = quoted(layout.title),
        sections = sections,
        sig_heading = quoted(layout.signature.heading),
        image = image,
        placeholder = quoted(layout.signature.placeholder),
        footer = footer.join(", "),
    )
}
