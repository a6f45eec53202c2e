//! Runtime configuration read from the environment.
//!
//! `.env` is loaded by [`AppConfig::from_env`]; tests go through
//! [`AppConfig::from_lookup`] with a map instead of touching process state.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    InvalidNumber {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("STORAGE_MODE must be 'local' or 'ephemeral', got '{0}'")]
    InvalidStorageMode(String),
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Submissions are appended to a JSON file under the data directory.
    Local,
    /// No durable disk (serverless deployments); submissions are only mailed.
    Ephemeral,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub smtp: SmtpConfig,
    pub mail: MailRouting,
    pub auth: BasicAuthCredentials,
    pub renderer: RendererConfig,
    pub letterhead: Letterhead,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Prefix for absolute links in responses; relative links when unset.
    pub public_base_url: Option<String>,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub mode: StorageMode,
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl SmtpConfig {
    /// Port 465 speaks TLS from the first byte; everything else upgrades via STARTTLS.
    pub fn implicit_tls(&self) -> bool {
        self.port == 465
    }
}

#[derive(Debug, Clone)]
pub struct MailRouting {
    pub from_name: String,
    pub from_address: String,
    pub to: String,
    pub cc: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct BasicAuthCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub typst_bin: String,
    pub timeout: Duration,
}

/// Hotel identity printed at the top of every document.
#[derive(Debug, Clone, PartialEq)]
pub struct Letterhead {
    pub name: String,
    pub address: String,
    pub contact: String,
}

impl Default for Letterhead {
    fn default() -> Self {
        Self {
            name: "Hotel Harburger Hof".to_string(),
            address: "Schloßmühlendamm 16, 21073 Hamburg".to_string(),
            contact: "Tel: +49(0)40 - 32 31 07 - 0 | Email: info@hhhof.de".to_string(),
        }
    }
}

const DEFAULT_SMTP_USER: &str = "meldeschein@hotel-harburger-hof.de";

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| vars.get(name).cloned())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let var_or = |name: &str, default: &str| var(name).unwrap_or_else(|| default.to_string());

        let server = ServerConfig {
            host: var_or("HOST", "0.0.0.0"),
            port: parse_number("PORT", var("PORT"), 8080u16, "port number")?,
            public_base_url: var("PUBLIC_BASE_URL").map(|url| url.trim_end_matches('/').to_string()),
            cors_origins: split_list(&var_or("CORS_ORIGINS", "http://localhost:3000")),
        };

        let mode = match var("STORAGE_MODE") {
            Some(mode) => match mode.to_ascii_lowercase().as_str() {
                "local" => StorageMode::Local,
                "ephemeral" => StorageMode::Ephemeral,
                _ => return Err(ConfigError::InvalidStorageMode(mode)),
            },
            None if var("VERCEL").as_deref() == Some("1") => StorageMode::Ephemeral,
            None => StorageMode::Local,
        };
        let storage = StorageConfig {
            mode,
            data_dir: PathBuf::from(var_or("DATA_DIR", "./data")),
        };

        let smtp = SmtpConfig {
            host: var_or("SMTP_HOST", "mail.hotel-harburger-hof.de"),
            port: parse_number("SMTP_PORT", var("SMTP_PORT"), 587u16, "port number")?,
            username: Some(var_or("SMTP_USER", DEFAULT_SMTP_USER)),
            password: var("SMTP_PASS"),
            timeout: Duration::from_secs(parse_number(
                "SMTP_TIMEOUT_SECS",
                var("SMTP_TIMEOUT_SECS"),
                30u64,
                "number of seconds",
            )?),
        };

        let defaults = Letterhead::default();
        let letterhead = Letterhead {
            name: var_or("HOTEL_NAME", &defaults.name),
            address: var_or("HOTEL_ADDRESS", &defaults.address),
            contact: var_or("HOTEL_CONTACT", &defaults.contact),
        };

        let to = var_or("HOTEL_EMAIL", "info@hhhof.de");
        let mail = MailRouting {
            from_name: var_or("MAIL_FROM_NAME", &letterhead.name),
            from_address: var_or("SMTP_USER", DEFAULT_SMTP_USER),
            cc: split_list(&var_or("MAIL_CC", "info@hhhof.de"))
                .into_iter()
                .filter(|cc| !cc.eq_ignore_ascii_case(&to))
                .collect(),
            to,
        };

        let auth = BasicAuthCredentials {
            username: var_or("BASIC_AUTH_USER", "hhhof"),
            password: var_or("BASIC_AUTH_PASS", "geheim"),
        };

        let renderer = RendererConfig {
            typst_bin: var_or("TYPST_BIN", "typst"),
            timeout: Duration::from_secs(parse_number(
                "RENDER_TIMEOUT_SECS",
                var("RENDER_TIMEOUT_SECS"),
                25u64,
                "number of seconds",
            )?),
        };
        if renderer.timeout.is_zero() {
            return Err(ConfigError::Empty("RENDER_TIMEOUT_SECS"));
        }

        Ok(Self {
            server,
            storage,
            smtp,
            mail,
            auth,
            renderer,
            letterhead,
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.parse::<T>().map_err(|_| ConfigError::InvalidNumber {
            name,
            expected,
            value,
        }),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
