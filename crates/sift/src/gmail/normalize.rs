//! Gmail API response normalization
//!
//! Converts Gmail metadata responses to `Email` records.

use anyhow::Result;
use chrono::{TimeZone, Utc};

use super::api::{GmailMessage, MessagePayload};
use crate::actions::labels;
use crate::models::{Email, EmailId};

/// Normalize a Gmail API message to an Email
pub fn normalize_email(gmail_msg: GmailMessage) -> Result<Email> {
    let internal_date: i64 = gmail_msg
        .internal_date
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid internalDate '{}': {}", gmail_msg.internal_date, e))?;
    let received_at = Utc
        .timestamp_millis_opt(internal_date)
        .single()
        .ok_or_else(|| anyhow::anyhow!("internalDate {} out of range", internal_date))?;

    let payload = gmail_msg.payload.as_ref();
    let subject = payload
        .and_then(|p| extract_header(p, "Subject"))
        .unwrap_or_default();
    let sender = payload
        .and_then(|p| extract_header(p, "From"))
        .unwrap_or_default();

    let unread = gmail_msg
        .label_ids
        .as_ref()
        .is_some_and(|ids| ids.iter().any(|l| l == labels::UNREAD));

    Ok(Email::builder(EmailId::new(gmail_msg.id))
        .subject(subject)
        .sender(sender)
        .received_at(received_at)
        .snippet(decode_html_entities(&gmail_msg.snippet))
        .unread(unread)
        .build())
}

/// Extract a header value by name (case-insensitive)
fn extract_header(payload: &MessagePayload, name: &str) -> Option<String> {
    payload.headers.as_ref()?.iter().find_map(|h| {
        if h.name.eq_ignore_ascii_case(name) {
            Some(h.value.clone())
        } else {
            None
        }
    })
}

/// Decode the handful of HTML entities Gmail puts in snippets
fn decode_html_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gmail::api::Header;

    fn make_gmail_message(headers: Vec<(&str, &str)>, labels: Option<Vec<&str>>) -> GmailMessage {
        GmailMessage {
            id: "18c2f".to_string(),
            label_ids: labels.map(|l| l.into_iter().map(String::from).collect()),
            snippet: "Big sale &amp; more &#39;today&#39;".to_string(),
            internal_date: "1700000000000".to_string(),
            payload: Some(MessagePayload {
                headers: Some(
                    headers
                        .into_iter()
                        .map(|(n, v)| Header {
                            name: n.to_string(),
                            value: v.to_string(),
                        })
                        .collect(),
                ),
                mime_type: Some("text/plain".to_string()),
            }),
        }
    }

    #[test]
    fn test_normalize_maps_fields() {
        let msg = make_gmail_message(
            vec![("Subject", "Sale"), ("From", "Ads <ads@newsletter.com>")],
            Some(vec!["INBOX", "UNREAD"]),
        );
        let email = normalize_email(msg).unwrap();

        assert_eq!(email.id.as_str(), "18c2f");
        assert_eq!(email.subject, "Sale");
        assert_eq!(email.sender, "Ads <ads@newsletter.com>");
        assert_eq!(email.snippet, "Big sale & more 'today'");
        assert_eq!(email.received_at.timestamp_millis(), 1_700_000_000_000);
        assert!(email.unread);
    }

    #[test]
    fn test_normalize_read_message() {
        let msg = make_gmail_message(vec![("subject", "Hi")], Some(vec!["INBOX"]));
        let email = normalize_email(msg).unwrap();

        assert_eq!(email.subject, "Hi");
        assert!(email.sender.is_empty());
        assert!(!email.unread);
    }

    #[test]
    fn test_normalize_without_labels_or_payload() {
        let mut msg = make_gmail_message(vec![], None);
        msg.payload = None;
        let email = normalize_email(msg).unwrap();

        assert!(email.subject.is_empty());
        assert!(!email.unread);
    }

    #[test]
    fn test_normalize_rejects_bad_date() {
        let mut msg = make_gmail_message(vec![], None);
        msg.internal_date = "yesterday".to_string();
        assert!(normalize_email(msg).is_err());
    }

    #[test]
    fn test_decode_entities_does_not_double_decode() {
        assert_eq!(decode_html_entities("&amp;lt;"), "&lt;");
    }
}
