//! Gmail API v1 mail source.
//!
//! Lists recent messages, then fetches metadata headers (From, To,
//! Subject, Date) for each. Gmail lists newest first, which satisfies
//! the [`MailSource`] ordering precondition. Individual message fetch
//! failures are logged and skipped; they never fail the batch.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::MailError;
use crate::http::{send_with_retry, RetryPolicy};
use crate::mail::MailSource;
use crate::types::{MailMessage, MessageHeader};

const GMAIL_MESSAGES_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// OAuth2 refresh-token credentials for a single mailbox.
#[derive(Debug, Clone, Deserialize)]
pub struct GmailCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

// ============================================================================
// API response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageListResponse {
    #[serde(default)]
    messages: Vec<MessageStub>,
}

#[derive(Debug, Deserialize)]
struct MessageStub {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageDetail {
    #[serde(default)]
    id: String,
    #[serde(default)]
    payload: Option<MessagePayload>,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    #[serde(default)]
    headers: Vec<HeaderEntry>,
}

#[derive(Debug, Deserialize)]
struct HeaderEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
}

// ============================================================================
// Mail source
// ============================================================================

pub struct GmailMailSource {
    credentials: GmailCredentials,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl GmailMailSource {
    pub fn new(credentials: GmailCredentials) -> Self {
        Self {
            credentials,
            client: reqwest::Client::new(),
            retry: RetryPolicy::default(),
        }
    }

    /// Exchange the refresh token for a short-lived access token.
    async fn access_token(&self) -> Result<String, MailError> {
        let resp = send_with_retry(
            self.client.post(TOKEN_URL).form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", self.credentials.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ]),
            &self.retry,
        )
        .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::BAD_REQUEST
            || status == reqwest::StatusCode::UNAUTHORIZED
        {
            return Err(MailError::AuthExpired);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MailError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let token: TokenResponse = resp.json().await?;
        if token.access_token.is_empty() {
            return Err(MailError::AuthExpired);
        }
        Ok(token.access_token)
    }

    /// Fetch the four reconciliation headers for a single message.
    async fn fetch_metadata(
        &self,
        access_token: &str,
        message_id: &str,
    ) -> Result<MailMessage, MailError> {
        let url = format!("{GMAIL_MESSAGES_URL}/{message_id}");
        let resp = send_with_retry(
            self.client.get(&url).bearer_auth(access_token).query(&[
                ("format", "metadata"),
                ("metadataHeaders", "From"),
                ("metadataHeaders", "To"),
                ("metadataHeaders", "Subject"),
                ("metadataHeaders", "Date"),
            ]),
            &self.retry,
        )
        .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MailError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let detail: MessageDetail = resp.json().await?;
        Ok(detail_to_message(detail))
    }
}

fn detail_to_message(detail: MessageDetail) -> MailMessage {
    let headers = detail
        .payload
        .map(|p| p.headers)
        .unwrap_or_default()
        .into_iter()
        .map(|h| MessageHeader {
            name: h.name,
            value: h.value,
        })
        .collect();
    MailMessage {
        id: detail.id,
        headers,
    }
}

#[async_trait]
impl MailSource for GmailMailSource {
    async fn fetch_recent_messages(&self, limit: u32) -> Result<Vec<MailMessage>, MailError> {
        let access_token = self.access_token().await?;

        let resp = send_with_retry(
            self.client
                .get(GMAIL_MESSAGES_URL)
                .bearer_auth(&access_token)
                .query(&[("maxResults", limit.to_string())]),
            &self.retry,
        )
        .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(MailError::AuthExpired);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MailError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let list: MessageListResponse = resp.json().await?;
        let mut messages = Vec::with_capacity(list.messages.len());

        for stub in &list.messages {
            match self.fetch_metadata(&access_token, &stub.id).await {
                Ok(message) => messages.push(message),
                Err(e) => {
                    log::debug!("skipping message {}: {e}", stub.id);
                    continue;
                }
            }
        }

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_list_deserialization() {
        let json = r#"{
            "messages": [
                {"id": "msg1", "threadId": "t1"},
                {"id": "msg2", "threadId": "t2"}
            ],
            "resultSizeEstimate": 2
        }"#;
        let list: MessageListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(list.messages.len(), 2);
        assert_eq!(list.messages[0].id, "msg1");
    }

    #[test]
    fn test_message_list_empty() {
        let json = r#"{"resultSizeEstimate": 0}"#;
        let list: MessageListResponse = serde_json::from_str(json).unwrap();
        assert!(list.messages.is_empty());
    }

    #[test]
    fn test_message_detail_to_mail_message() {
        let json = r#"{
            "id": "msg123",
            "payload": {
                "headers": [
                    {"name": "From", "value": "Jane Doe <jane@customer.dk>"},
                    {"name": "To", "value": "me@mycrm.dk"},
                    {"name": "Subject", "value": "Re: tilbud"},
                    {"name": "Date", "value": "Sun, 1 Mar 2026 09:30:00 +0100"}
                ]
            }
        }"#;
        let detail: MessageDetail = serde_json::from_str(json).unwrap();
        let message = detail_to_message(detail);

        assert_eq!(message.id, "msg123");
        assert_eq!(message.header("From"), Some("Jane Doe <jane@customer.dk>"));
        assert_eq!(message.header("To"), Some("me@mycrm.dk"));
        assert_eq!(message.header("Subject"), Some("Re: tilbud"));
    }

    #[test]
    fn test_message_detail_without_payload() {
        let json = r#"{"id": "msg789"}"#;
        let detail: MessageDetail = serde_json::from_str(json).unwrap();
        let message = detail_to_message(detail);
        assert!(message.headers.is_empty());
        assert_eq!(message.header("From"), None);
    }

    #[test]
    fn test_token_response_deserialization() {
        let json = r#"{"access_token": "ya29.abc", "expires_in": 3599, "token_type": "Bearer"}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "ya29.abc");
    }
}
