//! Configuration model loaded from the process environment.

use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{AppEnv, TypeConstraintError};

/// Prefix shared by every recognized variable (`GOBLOG_PORT`, ...).
pub const ENV_PREFIX: &str = "GOBLOG";

/// Overlay file looked up in the working directory by [`ServerConfig::load`].
pub const OVERLAY_FILE: &str = ".env";

/// Every variable read by the loader.
pub const ENV_KEYS: [&str; 11] = [
    "GOBLOG_PORT",
    "GOBLOG_BASE_URL",
    "GOBLOG_BLOG_TITLE",
    "GOBLOG_BLOG_DESCRIPTION",
    "GOBLOG_AUTHOR_NAME",
    "GOBLOG_ADMIN_USERNAME",
    "GOBLOG_ADMIN_PASSWORD",
    "GOBLOG_DB_PATH",
    "GOBLOG_UPLOAD_DIR",
    "GOBLOG_SESSION_SECRET",
    "GOBLOG_ENV",
];

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid GOBLOG_ENV value {0:?}: must be \"development\" or \"production\"")]
    InvalidEnvironmentMode(String),
    #[error("GOBLOG_ADMIN_USERNAME and GOBLOG_ADMIN_PASSWORD are required in production")]
    MissingProductionCredentials,
    #[error("failed to read settings: {0}")]
    Source(#[from] ::config::ConfigError),
}

impl From<TypeConstraintError> for ConfigError {
    fn from(err: TypeConstraintError) -> Self {
        match err {
            TypeConstraintError::InvalidEnvironmentMode(value) => {
                Self::InvalidEnvironmentMode(value)
            }
        }
    }
}

/// Values as they come out of the environment, before validation.
#[derive(Deserialize)]
#[serde(default)]
struct RawServerConfig {
    port: String,
    base_url: String,
    blog_title: String,
    blog_description: String,
    author_name: String,
    admin_username: String,
    admin_password: String,
    db_path: String,
    upload_dir: String,
    session_secret: String,
    env: String,
}

impl Default for RawServerConfig {
    fn default() -> Self {
        Self {
            port: "8069".into(),
            base_url: "http://localhost:8069".into(),
            blog_title: "Manas's Blog".into(),
            blog_description: String::new(),
            author_name: "Manas".into(),
            admin_username: String::new(),
            admin_password: String::new(),
            db_path: "./goblog.db".into(),
            upload_dir: "./uploads".into(),
            session_secret: String::new(),
            env: AppEnv::Development.as_str().into(),
        }
    }
}

/// Validated settings shared with the rest of the application.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: String,
    pub base_url: String,
    pub blog_title: String,
    pub blog_description: String,
    pub author_name: String,
    pub admin_username: String,
    pub admin_password: String,
    pub db_path: PathBuf,
    pub upload_dir: PathBuf,
    pub session_secret: String,
    pub env: AppEnv,
}

impl ServerConfig {
    /// Overlay `.env` from the working directory, then read the process
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_overlay(OVERLAY_FILE)
    }

    /// Same as [`ServerConfig::load`] with an explicit overlay file.
    ///
    /// The file is parsed as a whole before anything is applied; a missing
    /// or malformed file contributes nothing. Process variables take
    /// precedence over the file, and the process environment is never
    /// modified.
    pub fn load_with_overlay(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut vars = read_overlay(path.as_ref());
        vars.extend(process_vars());
        Self::from_vars(vars)
    }

    /// Read the process environment only, no overlay.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(process_vars())
    }

    /// Resolve settings from the given variables instead of the process
    /// environment. Only the exact names in [`ENV_KEYS`] are read; later
    /// pairs win over earlier ones.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: ::config::Map<String, String> = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .filter(|(key, _)| ENV_KEYS.contains(&key.as_str()))
            .collect();
        Self::build(environment_source().source(Some(vars)))
    }

    pub fn is_production(&self) -> bool {
        self.env.is_production()
    }

    fn build(source: ::config::Environment) -> Result<Self, ConfigError> {
        let raw = ::config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize::<RawServerConfig>()?;
        Self::validate(raw)
    }

    fn validate(raw: RawServerConfig) -> Result<Self, ConfigError> {
        let env = AppEnv::try_from_str(&raw.env)?;

        if env.is_production() && (raw.admin_username.is_empty() || raw.admin_password.is_empty())
        {
            return Err(ConfigError::MissingProductionCredentials);
        }

        Ok(Self {
            port: raw.port,
            base_url: raw.base_url,
            blog_title: raw.blog_title,
            blog_description: raw.blog_description,
            author_name: raw.author_name,
            admin_username: raw.admin_username,
            admin_password: raw.admin_password,
            db_path: PathBuf::from(raw.db_path),
            upload_dir: PathBuf::from(raw.upload_dir),
            session_secret: raw.session_secret,
            env,
        })
    }
}

// Empty values fall back to the defaults, same as unset ones.
fn environment_source() -> ::config::Environment {
    ::config::Environment::with_prefix(ENV_PREFIX).ignore_empty(true)
}

fn process_vars() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .filter(|(key, _)| ENV_KEYS.contains(&key.as_str()))
        .collect()
}

fn read_overlay(path: &Path) -> Vec<(String, String)> {
    let parsed = dotenvy::from_path_iter(path)
        .and_then(|iter| iter.collect::<Result<Vec<(String, String)>, _>>());

    match parsed {
        Ok(vars) => {
            debug!("Loaded environment overlay from {}", path.display());
            vars
        }
        Err(err) => {
            debug!("Ignoring environment overlay {}: {err}", path.display());
            Vec::new()
        }
    }
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() { "" } else { "***" }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("blog_title", &self.blog_title)
            .field("blog_description", &self.blog_description)
            .field("author_name", &self.author_name)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &mask(&self.admin_password))
            .field("db_path", &self.db_path)
            .field("upload_dir", &self.upload_dir)
            .field("session_secret", &mask(&self.session_secret))
            .field("env", &self.env)
            .finish()
    }
}
