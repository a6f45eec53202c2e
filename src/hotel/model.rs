use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// Per-field form settings of a hotel.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, ToSchema)]
pub struct FieldSetting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

impl FieldSetting {
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    pub fn is_visible(&self) -> bool {
        self.visible.unwrap_or(true)
    }
}

pub type FieldsConfig = BTreeMap<String, FieldSetting>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HotelProfile {
    #[schema(example = "hhhof")]
    pub id: String,
    #[schema(example = "harburger-hof")]
    pub slug: String,
    #[schema(example = "Hotel Harburger Hof")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_selectable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "#2563eb")]
    pub theme_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_text: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub fields_config: FieldsConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl HotelProfile {
    pub fn matches(&self, key: &str) -> bool {
        self.slug == key || self.id == key
    }
}

/// Partial update of a hotel profile, matched by `slug` or `id`.
#[derive(Deserialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHotelRequest {
    pub id: Option<String>,
    pub slug: String,
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub logo_url: Option<String>,
    pub logo_selectable: Option<bool>,
    pub theme_color: Option<String>,
    pub legal_text: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub fields_config: Option<FieldsConfig>,
    pub is_active: Option<bool>,
}

impl UpdateHotelRequest {
    /// Field-level checks; returns the failing field paths with messages.
    pub fn validate(&self) -> Vec<(String, String)> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push(("name".to_string(), "name must not be empty".to_string()));
        }
        if self.slug.trim().is_empty() {
            problems.push(("slug".to_string(), "slug must not be empty".to_string()));
        }
        if let Some(email) = &self.email {
            if !EMAIL_PATTERN.is_match(email.trim()) {
                problems.push(("email".to_string(), "email is not a valid address".to_string()));
            }
        }
        problems
    }

    /// Apply the present fields to `profile`.
    pub fn apply_to(&self, profile: &mut HotelProfile) {
        profile.slug = self.slug.clone();
        profile.name = self.name.clone();
        if let Some(email) = &self.email {
            profile.email = Some(email.clone());
        }
        if let Some(address) = &self.address {
            profile.address = Some(address.clone());
        }
        if let Some(phone) = &self.phone {
            profile.phone = Some(phone.clone());
        }
        if let Some(logo_url) = &self.logo_url {
            profile.logo_url = Some(logo_url.clone());
        }
        if let Some(logo_selectable) = self.logo_selectable {
            profile.logo_selectable = Some(logo_selectable);
        }
        if let Some(theme_color) = &self.theme_color {
            profile.theme_color = Some(theme_color.clone());
        }
        if let Some(legal_text) = &self.legal_text {
            profile.legal_text = Some(legal_text.clone());
        }
        if let Some(fields_config) = &self.fields_config {
            profile.fields_config = fields_config.clone();
        }
        if let Some(is_active) = self.is_active {
            profile.is_active = Some(is_active);
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct HotelResponse {
    pub success: bool,
    pub data: HotelProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct HotelListResponse {
    pub success: bool,
    pub data: Vec<HotelProfile>,
}
