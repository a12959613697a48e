//! Configuration loading
//!
//! OAuth credentials are loaded from (in order of priority):
//! 1. Compile-time embedded credentials (for release builds)
//! 2. JSON file (Google Cloud Console format)
//! 3. Runtime environment variables
//!
//! Runtime settings come from `settings.json` in the config directory, with
//! defaults for anything missing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::sync::DEFAULT_MAX_RESULTS;

/// Credentials filename in the Sift config directory
const CREDENTIALS_FILE: &str = "google-credentials.json";

/// Settings filename in the Sift config directory
const SETTINGS_FILE: &str = "settings.json";

/// OAuth credentials for Gmail API access
#[derive(Debug, Clone)]
pub struct GmailCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Google Cloud Console credential file format
#[derive(Deserialize)]
struct GoogleCredentialFile {
    installed: Option<InstalledCredentials>,
    web: Option<InstalledCredentials>,
}

#[derive(Deserialize)]
struct InstalledCredentials {
    client_id: String,
    client_secret: String,
}

impl GmailCredentials {
    /// Load credentials from the first available source
    pub fn load() -> Result<Self> {
        if let Some(creds) = Self::from_compile_time() {
            return Ok(creds);
        }

        if config::config_exists(CREDENTIALS_FILE) {
            let creds: GoogleCredentialFile = config::load_json(CREDENTIALS_FILE)?;
            return Self::from_credential_file(creds);
        }

        Self::from_env()
    }

    /// Credentials embedded at compile time.
    /// Build with: GOOGLE_CLIENT_ID=xxx GOOGLE_CLIENT_SECRET=yyy cargo build --release
    pub fn from_compile_time() -> Option<Self> {
        let client_id = option_env!("GOOGLE_CLIENT_ID")?;
        let client_secret = option_env!("GOOGLE_CLIENT_SECRET")?;

        if client_id.is_empty() || client_secret.is_empty() {
            return None;
        }

        Some(Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }

    fn from_credential_file(creds: GoogleCredentialFile) -> Result<Self> {
        // Desktop ("installed") and web credential types share the fields we need
        let installed = creds
            .installed
            .or(creds.web)
            .context("Credentials file missing 'installed' or 'web' section")?;

        Ok(Self {
            client_id: installed.client_id,
            client_secret: installed.client_secret,
        })
    }

    /// Parse credentials from JSON string (Google Cloud Console format)
    pub fn from_json(json: &str) -> Result<Self> {
        let creds: GoogleCredentialFile =
            serde_json::from_str(json).context("Failed to parse credentials JSON")?;
        Self::from_credential_file(creds)
    }

    /// Load credentials from environment variables
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("GMAIL_CLIENT_ID")
            .context("GMAIL_CLIENT_ID environment variable not set")?;
        let client_secret = std::env::var("GMAIL_CLIENT_SECRET")
            .context("GMAIL_CLIENT_SECRET environment variable not set")?;

        Ok(Self {
            client_id,
            client_secret,
        })
    }

    /// Default credentials file path (~/.config/sift/google-credentials.json)
    pub fn default_credentials_path() -> Option<PathBuf> {
        config::config_path(CREDENTIALS_FILE)
    }
}

/// Runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rule file to apply
    pub rules_path: PathBuf,
    /// SQLite database holding the fetched inbox snapshot
    pub database_path: Option<PathBuf>,
    /// Inbox messages fetched per sync
    pub max_results: usize,
    /// Stop at the first failed mail-service call
    pub fail_fast: bool,
    /// Evaluate rules in parallel before dispatching
    pub parallel: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rules_path: PathBuf::from("rules.json"),
            database_path: None,
            max_results: DEFAULT_MAX_RESULTS,
            fail_fast: false,
            parallel: false,
        }
    }
}

impl Settings {
    /// Load `settings.json` from the config directory, or defaults
    pub fn load() -> Result<Self> {
        config::load_json_or_default(SETTINGS_FILE)
    }

    /// Write these settings to `settings.json` in the config directory
    pub fn save(&self) -> Result<()> {
        config::save_json(SETTINGS_FILE, self)
    }

    /// Whether `settings.json` exists
    pub fn exists() -> bool {
        config::config_exists(SETTINGS_FILE)
    }

    /// Database path, defaulting to ~/.config/sift/emails.sqlite
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => config::config_path("emails.sqlite")
                .context("Could not determine config directory"),
        }
    }
}
