//! Lead store collaborator trait and an in-memory fake.
//!
//! The store owns persistence and id minting; the engines only compute
//! write-sets and insert payloads. Updates target disjoint lead ids and
//! carry no cross-record transaction — partial application on failure
//! is tolerated, and a later pass reconciles again from current state.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::StoreError;
use crate::types::{Lead, LeadKey, NewLead, PendingUpdate};

#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Snapshot of all leads.
    async fn select_leads(&self) -> Result<Vec<Lead>, StoreError>;

    /// Apply one pending update to one lead.
    async fn update_lead(&self, id: &str, update: &PendingUpdate) -> Result<(), StoreError>;

    /// Insert a new lead; the store mints the id.
    async fn insert_lead(&self, lead: &NewLead) -> Result<Lead, StoreError>;

    /// Look up a lead by exact dedup key match.
    async fn find_lead_by_key(&self, key: &LeadKey) -> Result<Option<Lead>, StoreError>;
}

// ============================================================================
// In-memory fake
// ============================================================================

/// Deterministic in-memory store for tests and local runs.
#[derive(Default)]
pub struct MemoryLeadStore {
    leads: Mutex<Vec<Lead>>,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing snapshot.
    pub fn with_leads(leads: Vec<Lead>) -> Self {
        Self {
            leads: Mutex::new(leads),
        }
    }

    pub fn leads(&self) -> Vec<Lead> {
        self.leads.lock().clone()
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn select_leads(&self) -> Result<Vec<Lead>, StoreError> {
        Ok(self.leads.lock().clone())
    }

    async fn update_lead(&self, id: &str, update: &PendingUpdate) -> Result<(), StoreError> {
        let mut leads = self.leads.lock();
        let Some(lead) = leads.iter_mut().find(|l| l.id == id) else {
            return Err(StoreError::Api {
                status: 404,
                message: format!("no lead with id {id}"),
            });
        };
        lead.last_contact_date = Some(update.last_contact_date);
        lead.most_recent_subject = update.most_recent_subject.clone();
        lead.response_status = update.response_status;
        Ok(())
    }

    async fn insert_lead(&self, lead: &NewLead) -> Result<Lead, StoreError> {
        let inserted = Lead {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: lead.user_id.clone(),
            name: lead.name.clone(),
            company: lead.company.clone(),
            email: lead.email.clone(),
            phone: lead.phone.clone(),
            website: lead.website.clone(),
            status: lead.status,
            response_status: lead.response_status,
            last_contact_date: None,
            most_recent_subject: None,
        };
        self.leads.lock().push(inserted.clone());
        Ok(inserted)
    }

    async fn find_lead_by_key(&self, key: &LeadKey) -> Result<Option<Lead>, StoreError> {
        Ok(self.leads.lock().iter().find(|l| key.matches(l)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LeadStatus, ResponseStatus};
    use chrono::Utc;

    fn new_lead(name: &str, company: &str) -> NewLead {
        NewLead {
            user_id: None,
            name: name.to_string(),
            company: Some(company.to_string()),
            email: None,
            phone: None,
            website: None,
            status: LeadStatus::New,
            response_status: ResponseStatus::None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_select() {
        let store = MemoryLeadStore::new();
        let inserted = store.insert_lead(&new_lead("Mette", "Vestas")).await.unwrap();
        assert!(!inserted.id.is_empty());

        let leads = store.select_leads().await.unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].name, "Mette");
        assert_eq!(leads[0].status, LeadStatus::New);
    }

    #[tokio::test]
    async fn test_find_by_key() {
        let store = MemoryLeadStore::new();
        store.insert_lead(&new_lead("Mette", "Vestas")).await.unwrap();

        let key = LeadKey {
            company: "Vestas".to_string(),
            name: None,
            user_id: None,
        };
        assert!(store.find_lead_by_key(&key).await.unwrap().is_some());

        let key = LeadKey {
            company: "NewCo".to_string(),
            name: None,
            user_id: None,
        };
        assert!(store.find_lead_by_key(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_lead() {
        let store = MemoryLeadStore::new();
        let lead = store.insert_lead(&new_lead("Mette", "Vestas")).await.unwrap();

        let update = PendingUpdate {
            last_contact_date: Utc::now(),
            most_recent_subject: Some("Re: tilbud".to_string()),
            response_status: ResponseStatus::Responded,
        };
        store.update_lead(&lead.id, &update).await.unwrap();

        let leads = store.select_leads().await.unwrap();
        assert_eq!(leads[0].response_status, ResponseStatus::Responded);
        assert_eq!(leads[0].most_recent_subject.as_deref(), Some("Re: tilbud"));
    }

    #[tokio::test]
    async fn test_update_unknown_lead_errors() {
        let store = MemoryLeadStore::new();
        let update = PendingUpdate {
            last_contact_date: Utc::now(),
            most_recent_subject: None,
            response_status: ResponseStatus::Sent,
        };
        assert!(store.update_lead("missing", &update).await.is_err());
    }
}
