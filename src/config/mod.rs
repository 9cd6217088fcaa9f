//! Application configuration.
//!
//! One `AppConfig` is loaded from TOML at start-up and passed by reference to
//! everything that needs it. Secrets may come from the environment (and a
//! `.env` file) instead of the config file.

pub mod validation;

use serde::Deserialize;
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::report::RenderOptions;
use validation::{validate_email, validate_required, ValidationError, ValidationErrors};

pub const DEFAULT_CONFIG_FILE: &str = "reports.toml";
pub const SMTP_PASSWORD_ENV: &str = "OUTAGE_REPORT_SMTP_PASSWORD";
pub const TELEGRAM_TOKEN_ENV: &str = "OUTAGE_REPORT_TELEGRAM_TOKEN";
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Implicit TLS, usually port 465.
    #[default]
    Ssl,
    StartTls,
}

fn default_smtp_port() -> u16 {
    465
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub server: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Display name in the `From` header.
    #[serde(default)]
    pub from_name: Option<String>,
    #[serde(default)]
    pub security: SmtpSecurity,
}

fn default_telegram_api() -> String {
    DEFAULT_TELEGRAM_API.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    pub chat_id: String,
    #[serde(default = "default_telegram_api")]
    pub api_base: String,
}

/// One camera group: where its CSV comes from and who receives the report.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    pub display_name: String,
    /// Shell command that produces `csv_file`.
    pub command: String,
    pub csv_file: PathBuf,
    pub pdf_prefix: String,
    #[serde(default)]
    pub emails: Vec<String>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("pdf")
}

fn default_csv_dir() -> PathBuf {
    PathBuf::from("csv")
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory relative paths resolve against; the config file's directory.
    #[serde(skip)]
    pub base_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_csv_dir")]
    pub csv_dir: PathBuf,
    #[serde(default)]
    pub render: RenderOptions,
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

impl AppConfig {
    /// Load, apply environment overrides, resolve paths and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut config = Self::from_toml_str(&raw, base_dir).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML and resolve relative paths against `base_dir`.
    pub fn from_toml_str(raw: &str, base_dir: PathBuf) -> Result<Self, toml::de::Error> {
        let mut config: AppConfig = toml::from_str(raw)?;
        config.base_dir = base_dir;
        config.output_dir = config.resolve(&config.output_dir);
        config.csv_dir = config.resolve(&config.csv_dir);
        config.render.font_dirs = config
            .render
            .font_dirs
            .iter()
            .map(|dir| config.resolve(dir))
            .collect();
        for i in 0..config.groups.len() {
            let resolved = config.resolve(&config.groups[i].csv_file);
            config.groups[i].csv_file = resolved;
        }
        Ok(config)
    }

    /// Join a relative path onto the base directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn apply_env_overrides(&mut self) {
        if let Some(password) = non_empty_env(SMTP_PASSWORD_ENV) {
            self.smtp.password = password;
        }
        if let Some(token) = non_empty_env(TELEGRAM_TOKEN_ENV) {
            if let Some(telegram) = self.telegram.as_mut() {
                telegram.bot_token = token;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        validate_required(&self.smtp.server, "smtp.server", &mut errors);
        validate_email(&self.smtp.username, "smtp.username", &mut errors);
        if self.smtp.password.trim().is_empty() {
            errors.add(
                ValidationError::empty_field("smtp.password")
                    .with_suggestion(format!("set it in the config or via {SMTP_PASSWORD_ENV}")),
            );
        }

        if let Some(telegram) = &self.telegram {
            if telegram.bot_token.trim().is_empty() {
                errors.add(
                    ValidationError::empty_field("telegram.bot_token")
                        .with_suggestion(format!("set it in the config or via {TELEGRAM_TOKEN_ENV}")),
                );
            }
            validate_required(&telegram.chat_id, "telegram.chat_id", &mut errors);
        }

        if self.groups.is_empty() {
            errors.add(
                ValidationError::new("groups", "at least one group is required")
                    .with_suggestion("add a [[groups]] table"),
            );
        }

        let mut names = HashSet::new();
        for (i, group) in self.groups.iter().enumerate() {
            let field = |key: &str| format!("groups[{i}].{key}");
            validate_required(&group.name, &field("name"), &mut errors);
            validate_required(&group.display_name, &field("display_name"), &mut errors);
            validate_required(&group.command, &field("command"), &mut errors);
            validate_required(&group.pdf_prefix, &field("pdf_prefix"), &mut errors);
            if !names.insert(group.name.as_str()) {
                errors.add(ValidationError::duplicate(&field("name"), &group.name));
            }
            if group.emails.is_empty() {
                errors.add(ValidationError::new(field("emails"), "at least one recipient is required"));
            }
            for (j, email) in group.emails.iter().enumerate() {
                validate_email(email, &field(&format!("emails[{j}]")), &mut errors);
            }
        }

        errors.into_result()
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
