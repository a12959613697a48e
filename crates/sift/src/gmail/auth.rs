//! Gmail OAuth2 authentication
//!
//! Installed-app authorization code flow. A short-lived local HTTP listener
//! receives the redirect; tokens are cached in the config directory and
//! refreshed when close to expiry.

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::PathBuf;

/// OAuth2 configuration and token management for Gmail
pub struct GmailAuth {
    client_id: String,
    client_secret: String,
    token_path: PathBuf,
}

/// Token data cached on disk
#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
}

/// Token response from Google
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

impl GmailAuth {
    const AUTH_URL: &'static str = "https://accounts.google.com/o/oauth2/v2/auth";
    const TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    /// Read access for listing, modify access for label changes
    const SCOPES: &'static str =
        "https://www.googleapis.com/auth/gmail.readonly https://www.googleapis.com/auth/gmail.modify";

    /// Seconds before expiry at which a cached token is treated as stale
    const EXPIRY_MARGIN_SECS: i64 = 300;

    const PORT_RANGE_START: u16 = 8080;
    const PORT_RANGE_END: u16 = 8090;

    /// Create a new GmailAuth caching tokens in the default location
    pub fn new(client_id: String, client_secret: String) -> Result<Self> {
        let token_path = Self::default_token_path()?;
        Ok(Self::with_token_path(client_id, client_secret, token_path))
    }

    /// Create a new GmailAuth caching tokens at `token_path`
    pub fn with_token_path(client_id: String, client_secret: String, token_path: PathBuf) -> Self {
        Self {
            client_id,
            client_secret,
            token_path,
        }
    }

    /// Default token cache (~/.config/sift/gmail-tokens.json)
    fn default_token_path() -> Result<PathBuf> {
        config::config_path("gmail-tokens.json").context("Could not determine config directory")
    }

    /// Get a valid access token, refreshing or re-authenticating as needed
    pub fn get_access_token(&self) -> Result<String> {
        if let Ok(token) = self.load_token() {
            if let Some(expires_at) = token.expires_at
                && expires_at > chrono::Utc::now().timestamp() + Self::EXPIRY_MARGIN_SECS
            {
                return Ok(token.access_token);
            }

            if let Some(refresh_token) = token.refresh_token {
                match self.refresh_access_token(&refresh_token) {
                    Ok(new_token) => {
                        debug!("Refreshed Gmail access token");
                        self.save_token_response(&new_token)?;
                        return Ok(new_token.access_token);
                    }
                    Err(e) => warn!("Token refresh failed, re-authenticating: {:#}", e),
                }
            }
        }

        let token = self.authorization_code_auth()?;
        self.save_token_response(&token)?;
        Ok(token.access_token)
    }

    /// Perform the interactive authorization code flow
    fn authorization_code_auth(&self) -> Result<TokenResponse> {
        let (listener, port) = self.start_local_server()?;
        let redirect_uri = format!("http://localhost:{}", port);

        let auth_url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            Self::AUTH_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&redirect_uri),
            urlencoding::encode(Self::SCOPES),
        );

        println!("\n=== Gmail Authentication Required ===");
        println!("Opening browser for authentication...");
        println!("If the browser doesn't open, visit: {}", auth_url);

        if let Err(e) = open::that(&auth_url) {
            eprintln!("Failed to open browser: {}. Please open the URL manually.", e);
        }

        println!("Waiting for authorization...");
        let code = self.wait_for_callback(listener)?;

        let mut response = ureq::post(Self::TOKEN_URL)
            .send_form([
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri.as_str()),
            ])
            .context("Failed to exchange authorization code")?;

        let token: TokenResponse = response
            .body_mut()
            .read_json()
            .context("Failed to parse token response")?;

        println!("Authentication successful!\n");
        Ok(token)
    }

    /// Bind the first free port in the callback range
    fn start_local_server(&self) -> Result<(TcpListener, u16)> {
        for port in Self::PORT_RANGE_START..=Self::PORT_RANGE_END {
            if let Ok(listener) = TcpListener::bind(format!("127.0.0.1:{}", port)) {
                return Ok((listener, port));
            }
        }
        anyhow::bail!(
            "Could not bind to any port in range {}-{}",
            Self::PORT_RANGE_START,
            Self::PORT_RANGE_END
        )
    }

    /// Wait for the OAuth redirect and extract the authorization code
    fn wait_for_callback(&self, listener: TcpListener) -> Result<String> {
        let (mut stream, _) = listener.accept().context("Failed to accept connection")?;

        let mut reader = BufReader::new(&stream);
        let mut request_line = String::new();
        reader
            .read_line(&mut request_line)
            .context("Failed to read request")?;

        let code = query_param(&request_line, "code");
        let error = query_param(&request_line, "error");

        let (status, body) = if code.is_some() {
            ("200 OK", "Authentication successful! You can close this window.")
        } else {
            ("400 Bad Request", "Authentication failed. Please try again.")
        };

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n<html><body><h1>{}</h1></body></html>",
            status, body
        );
        stream.write_all(response.as_bytes()).ok();

        if let Some(err) = error {
            anyhow::bail!("OAuth error: {}", err);
        }

        code.context("No authorization code received")
    }

    /// Exchange a refresh token for a new access token
    fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        let response = ureq::post(Self::TOKEN_URL)
            .send_form([
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .context("Failed to refresh access token")?;

        let mut token: TokenResponse = response
            .into_body()
            .read_json()
            .context("Failed to parse refresh token response")?;

        // Google omits the refresh token on refresh responses
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token.to_string());
        }

        Ok(token)
    }

    fn load_token(&self) -> Result<StoredToken> {
        let content = fs::read_to_string(&self.token_path)?;
        let token: StoredToken = serde_json::from_str(&content)?;
        Ok(token)
    }

    fn save_token_response(&self, token: &TokenResponse) -> Result<()> {
        if let Some(parent) = self.token_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let stored = StoredToken {
            access_token: token.access_token.clone(),
            refresh_token: token.refresh_token.clone(),
            expires_at: token
                .expires_in
                .map(|d| chrono::Utc::now().timestamp() + d as i64),
        };

        let content = serde_json::to_string_pretty(&stored)?;
        fs::write(&self.token_path, content)
            .with_context(|| format!("Failed to write token cache: {}", self.token_path.display()))?;
        Ok(())
    }

    /// Whether a usable token is cached (without starting a browser flow)
    pub fn is_authenticated(&self) -> bool {
        let Ok(token) = self.load_token() else {
            return false;
        };
        if let Some(expires_at) = token.expires_at
            && expires_at > chrono::Utc::now().timestamp() + Self::EXPIRY_MARGIN_SECS
        {
            return true;
        }
        token
            .refresh_token
            .is_some_and(|t| self.refresh_access_token(&t).is_ok())
    }

    /// Remove cached tokens
    pub fn logout(&self) -> Result<()> {
        if self.token_path.exists() {
            fs::remove_file(&self.token_path)?;
        }
        Ok(())
    }
}

/// Pull a query parameter out of an HTTP request line
/// (`GET /?code=...&scope=... HTTP/1.1`)
fn query_param(request_line: &str, name: &str) -> Option<String> {
    let path = request_line.split_whitespace().nth(1)?;
    let query = path.split_once('?')?.1;
    query.split('&').find_map(|param| {
        let (key, value) = param.split_once('=')?;
        (key == name).then(|| {
            urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string())
        })
    })
}
