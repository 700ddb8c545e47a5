//! Supabase PostgREST lead store.
//!
//! Talks to the `leads` table with the service key. PostgREST `eq.`
//! filters are exact and case-sensitive, which is precisely the dedup
//! key semantics the ingestion engine expects.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::error::StoreError;
use crate::http::{send_with_retry, RetryPolicy};
use crate::store::LeadStore;
use crate::types::{Lead, LeadKey, NewLead, PendingUpdate};

/// Project URL and service-role key.
#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseCredentials {
    pub url: String,
    pub service_key: String,
}

#[derive(Debug)]
pub struct SupabaseLeadStore {
    leads_url: Url,
    service_key: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

/// Build the PostgREST filter params for a dedup key lookup.
fn key_filters(key: &LeadKey) -> Vec<(&'static str, String)> {
    let mut filters = vec![
        ("select", "*".to_string()),
        ("company", format!("eq.{}", key.company)),
        ("limit", "1".to_string()),
    ];
    if let Some(name) = &key.name {
        filters.push(("name", format!("eq.{name}")));
    }
    if let Some(user_id) = &key.user_id {
        filters.push(("user_id", format!("eq.{user_id}")));
    }
    filters
}

impl SupabaseLeadStore {
    pub fn new(credentials: SupabaseCredentials) -> Result<Self, StoreError> {
        let base = Url::parse(&credentials.url)
            .map_err(|e| StoreError::Config(format!("invalid Supabase URL: {e}")))?;
        let leads_url = base
            .join("rest/v1/leads")
            .map_err(|e| StoreError::Config(format!("invalid Supabase URL: {e}")))?;
        Ok(Self {
            leads_url,
            service_key: credentials.service_key,
            client: reqwest::Client::new(),
            retry: RetryPolicy::default(),
        })
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.leads_url.clone())
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(StoreError::Api {
            status: status.as_u16(),
            message: body,
        })
    }
}

#[async_trait]
impl LeadStore for SupabaseLeadStore {
    async fn select_leads(&self) -> Result<Vec<Lead>, StoreError> {
        let resp = send_with_retry(
            self.request(reqwest::Method::GET).query(&[("select", "*")]),
            &self.retry,
        )
        .await?;
        let leads = Self::check(resp).await?.json().await?;
        Ok(leads)
    }

    async fn update_lead(&self, id: &str, update: &PendingUpdate) -> Result<(), StoreError> {
        let resp = send_with_retry(
            self.request(reqwest::Method::PATCH)
                .query(&[("id", format!("eq.{id}"))])
                .header("Prefer", "return=minimal")
                .json(update),
            &self.retry,
        )
        .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn insert_lead(&self, lead: &NewLead) -> Result<Lead, StoreError> {
        let resp = send_with_retry(
            self.request(reqwest::Method::POST)
                .header("Prefer", "return=representation")
                .json(lead),
            &self.retry,
        )
        .await?;
        let status = resp.status().as_u16();
        let mut rows: Vec<Lead> = Self::check(resp).await?.json().await?;
        rows.pop().ok_or(StoreError::Api {
            status,
            message: "insert returned no rows".to_string(),
        })
    }

    async fn find_lead_by_key(&self, key: &LeadKey) -> Result<Option<Lead>, StoreError> {
        let resp = send_with_retry(
            self.request(reqwest::Method::GET).query(&key_filters(key)),
            &self.retry,
        )
        .await?;
        let mut rows: Vec<Lead> = Self::check(resp).await?.json().await?;
        Ok(rows.pop())
    }
}
