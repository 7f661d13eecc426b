use anyhow::{bail, Context, Result};

use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

const DEFAULT_ACCEPTED_MIME_TYPES: &[&str] = &["application/pdf", "image/png", "image/jpeg"];
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Where lab records are read from.
#[derive(Debug, Clone, PartialEq)]
pub enum LabStoreConfig {
    /// Direct Postgres connection (the hosted row store is Postgres underneath).
    Postgres { database_url: String },
    /// The hosted row store's REST interface.
    Rest { base_url: String, api_key: String },
}

/// Output contract the completion model is asked to follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    /// `Major: ...` / `Lab ID: ...` labeled lines, parsed by regex.
    #[default]
    Labeled,
    /// Strict JSON validated with serde.
    Json,
}

impl std::str::FromStr for ResponseFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "labeled" => Ok(ResponseFormat::Labeled),
            "json" => Ok(ResponseFormat::Json),
            other => bail!("RESPONSE_FORMAT must be 'labeled' or 'json', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub llm_timeout_secs: u64,
    pub lab_store: LabStoreConfig,
    pub labs_table: String,
    pub redis_url: Option<String>,
    pub accepted_mime_types: Vec<String>,
    pub max_upload_bytes: usize,
    pub response_format: ResponseFormat,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let lab_store = match optional_env("DATABASE_URL") {
            Some(database_url) => LabStoreConfig::Postgres { database_url },
            None => LabStoreConfig::Rest {
                base_url: require_env("SUPABASE_URL")
                    .context("Set DATABASE_URL or SUPABASE_URL/SUPABASE_KEY")?,
                api_key: require_env("SUPABASE_KEY")?,
            },
        };

        let labs_table = optional_env("LABS_TABLE").unwrap_or_else(|| "labconnect".to_string());
        validate_table_name(&labs_table)?;

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: optional_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            openai_model: optional_env("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            lab_store,
            labs_table,
            redis_url: optional_env("REDIS_URL"),
            accepted_mime_types: optional_env("ACCEPTED_MIME_TYPES")
                .map(|raw| parse_mime_list(&raw))
                .unwrap_or_else(default_mime_types),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            response_format: optional_env("RESPONSE_FORMAT")
                .map(|s| s.parse::<ResponseFormat>())
                .transpose()?
                .unwrap_or_default(),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

pub fn default_mime_types() -> Vec<String> {
    DEFAULT_ACCEPTED_MIME_TYPES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn parse_mime_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// The table name is interpolated into SQL and URLs, so only plain identifiers pass.
fn validate_table_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        bail!("LABS_TABLE must be a plain identifier, got '{name}'");
    }
    Ok(())
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}
