//! Gmail API HTTP client
//!
//! Synchronous HTTP (ureq), so the engine stays executor-agnostic.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::time::Duration;

use super::GmailAuth;
use super::api::{GmailMessage, ListMessagesResponse, ModifyMessageRequest};
use crate::models::EmailId;

/// Gmail API client
pub struct GmailClient {
    auth: GmailAuth,
}

impl GmailClient {
    const BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1";

    /// Headers the metadata fetch asks for
    const METADATA_HEADERS: [&'static str; 2] = ["Subject", "From"];

    const FETCH_RETRIES: u32 = 3;

    const MAX_PAGE_SIZE: usize = 500;

    pub fn new(auth: GmailAuth) -> Self {
        Self { auth }
    }

    fn bearer(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.auth.get_access_token()?))
    }

    /// List message IDs carrying `label_id`, newest first
    ///
    /// # Arguments
    /// * `label_id` - Label to filter by (e.g., "INBOX")
    /// * `max_results` - Page size (1-500)
    /// * `page_token` - Optional page token for pagination
    pub fn list_messages(
        &self,
        label_id: &str,
        max_results: usize,
        page_token: Option<&str>,
    ) -> Result<ListMessagesResponse> {
        let page_size = max_results.clamp(1, Self::MAX_PAGE_SIZE);
        if page_size != max_results {
            warn!(
                "Requested {} messages; Gmail pages hold 1-{}, using {}",
                max_results,
                Self::MAX_PAGE_SIZE,
                page_size
            );
        }
        let mut url = format!(
            "{}/users/me/messages?labelIds={}&maxResults={}",
            Self::BASE_URL,
            urlencoding::encode(label_id),
            page_size
        );

        if let Some(token) = page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
        }

        let mut response = ureq::get(&url)
            .header("Authorization", &self.bearer()?)
            .call()
            .context("Failed to send list messages request")?;

        let list: ListMessagesResponse = response
            .body_mut()
            .read_json()
            .context("Failed to parse list messages response")?;

        Ok(list)
    }

    /// Get message metadata (Subject/From headers, labels, date, snippet)
    pub fn get_message(&self, id: &EmailId) -> Result<GmailMessage> {
        let headers: String = Self::METADATA_HEADERS
            .iter()
            .map(|h| format!("&metadataHeaders={}", h))
            .collect();
        let url = format!(
            "{}/users/me/messages/{}?format=metadata{}",
            Self::BASE_URL,
            urlencoding::encode(id.as_str()),
            headers
        );

        let mut response = ureq::get(&url)
            .header("Authorization", &self.bearer()?)
            .call()
            .with_context(|| format!("Failed to send get message request for {}", id))?;

        let message: GmailMessage = response
            .body_mut()
            .read_json()
            .context("Failed to parse message response")?;

        Ok(message)
    }

    /// Get several messages, retrying each fetch with backoff
    pub fn get_messages_batch(&self, ids: &[EmailId]) -> Vec<Result<GmailMessage>> {
        ids.iter()
            .map(|id| self.get_message_with_retry(id, Self::FETCH_RETRIES))
            .collect()
    }

    /// Get a message with exponential backoff retry
    fn get_message_with_retry(&self, id: &EmailId, max_retries: u32) -> Result<GmailMessage> {
        let mut delay = Duration::from_millis(100);
        let mut attempt = 1;

        loop {
            match self.get_message(id) {
                Ok(msg) => return Ok(msg),
                Err(e) if attempt >= max_retries => return Err(e),
                Err(e) => {
                    debug!("Fetch of {} failed (attempt {}): {:#}", id, attempt, e);
                    std::thread::sleep(delay + Duration::from_millis(rand_jitter()));
                    delay *= 2;
                    attempt += 1;
                }
            }
        }
    }

    /// Add and remove labels on a single message
    ///
    /// Not retried: a failure is reported to the caller as-is.
    pub fn modify_message(&self, id: &EmailId, add: &[&str], remove: &[&str]) -> Result<()> {
        let url = format!(
            "{}/users/me/messages/{}/modify",
            Self::BASE_URL,
            urlencoding::encode(id.as_str())
        );
        let body = ModifyMessageRequest {
            add_label_ids: add.iter().map(|s| s.to_string()).collect(),
            remove_label_ids: remove.iter().map(|s| s.to_string()).collect(),
        };

        ureq::post(&url)
            .header("Authorization", &self.bearer()?)
            .send_json(&body)
            .with_context(|| format!("Failed to modify labels on message {}", id))?;

        Ok(())
    }

    /// Trigger authentication flow
    pub fn authenticate(&self) -> Result<()> {
        self.auth.get_access_token()?;
        Ok(())
    }
}

/// Random jitter value (0-100ms)
fn rand_jitter() -> u64 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let hasher = RandomState::new().build_hasher();
    hasher.finish() % 100
}
