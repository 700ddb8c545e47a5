//! Core data model: leads, mail messages, pending updates, and
//! AI-generated candidate records.
//!
//! Lead field names match the store's column names (snake_case).
//! Candidate records accept the loose field naming the generation
//! service produces via serde aliases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Leads
// ============================================================================

/// Pipeline stage of a lead on the board. Ingestion always inserts `new`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Lost,
}

/// Tri-state label summarizing mail interaction direction with a lead.
///
/// `Responded` is sticky: once a lead has replied, an outbound message
/// must not downgrade the label back to `Sent`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    #[default]
    None,
    Sent,
    Responded,
}

/// A tracked sales contact/company record.
///
/// `id` is owned by the store and immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub status: LeadStatus,
    #[serde(default)]
    pub response_status: ResponseStatus,
    #[serde(default)]
    pub last_contact_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub most_recent_subject: Option<String>,
}

/// Insert payload for a lead that does not exist yet. The store mints the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLead {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    pub status: LeadStatus,
    pub response_status: ResponseStatus,
}

// ============================================================================
// Mail messages
// ============================================================================

/// One parsed header of a mail message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageHeader {
    pub name: String,
    pub value: String,
}

/// A parsed mail record. Only the From, To, Subject, and Date headers
/// are consumed by the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailMessage {
    pub id: String,
    #[serde(default)]
    pub headers: Vec<MessageHeader>,
}

impl MailMessage {
    /// First header value matching `name` (case-insensitive), if any.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}

/// Per-lead write-set entry computed by a reconciliation pass.
///
/// Ephemeral: created and overwritten during aggregation, discarded
/// after the batch write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingUpdate {
    pub last_contact_date: DateTime<Utc>,
    pub most_recent_subject: Option<String>,
    pub response_status: ResponseStatus,
}

// ============================================================================
// AI lead candidates
// ============================================================================

/// A candidate lead produced by the generation service.
///
/// Field names from the model are loose ("companyName" vs "company",
/// "name"/"contact" vs "contactPerson"); aliases absorb the variants.
/// All fields are optional at parse time; the ingestion deduplicator
/// rejects candidates missing required key fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadCandidate {
    #[serde(default, alias = "companyName")]
    pub company: Option<String>,
    #[serde(default, alias = "name", alias = "contact")]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

// ============================================================================
// Dedup match keys
// ============================================================================

/// Which fields identify "the same lead" during ingestion dedup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKey {
    /// Company name alone.
    #[default]
    Company,
    /// Contact name + company name.
    NameCompany,
    /// Owning user + company name.
    UserCompany,
}

/// Concrete key values extracted from a candidate under a [`MatchKey`].
///
/// Matching is exact and case-sensitive on the raw stored strings —
/// intentionally stricter than the reconciliation engine's normalized
/// address matching.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadKey {
    pub company: String,
    pub name: Option<String>,
    pub user_id: Option<String>,
}

impl LeadKey {
    /// Exact, case-sensitive equality against a stored lead.
    pub fn matches(&self, lead: &Lead) -> bool {
        lead.company.as_deref() == Some(self.company.as_str())
            && self
                .name
                .as_deref()
                .map_or(true, |name| lead.name == name)
            && self
                .user_id
                .as_deref()
                .map_or(true, |user| lead.user_id.as_deref() == Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(name: &str, company: Option<&str>) -> Lead {
        Lead {
            id: "l1".to_string(),
            user_id: None,
            name: name.to_string(),
            company: company.map(str::to_string),
            email: None,
            phone: None,
            website: None,
            status: LeadStatus::New,
            response_status: ResponseStatus::None,
            last_contact_date: None,
            most_recent_subject: None,
        }
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let msg = MailMessage {
            id: "m1".to_string(),
            headers: vec![
                MessageHeader {
                    name: "From".to_string(),
                    value: "jane@example.com".to_string(),
                },
                MessageHeader {
                    name: "Subject".to_string(),
                    value: "Hello".to_string(),
                },
            ],
        };
        assert_eq!(msg.header("from"), Some("jane@example.com"));
        assert_eq!(msg.header("SUBJECT"), Some("Hello"));
        assert_eq!(msg.header("To"), None);
    }

    #[test]
    fn test_candidate_aliases() {
        let json = r#"{"companyName": "Vestas", "name": "Mette Jensen", "email": "mj@vestas.dk"}"#;
        let candidate: LeadCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.company.as_deref(), Some("Vestas"));
        assert_eq!(candidate.contact_person.as_deref(), Some("Mette Jensen"));
        assert_eq!(candidate.email.as_deref(), Some("mj@vestas.dk"));
    }

    #[test]
    fn test_candidate_canonical_names() {
        let json = r#"{"company": "NewCo", "contactPerson": "Lars", "website": "https://newco.dk"}"#;
        let candidate: LeadCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.company.as_deref(), Some("NewCo"));
        assert_eq!(candidate.contact_person.as_deref(), Some("Lars"));
        assert_eq!(candidate.website.as_deref(), Some("https://newco.dk"));
    }

    #[test]
    fn test_lead_key_company_only() {
        let key = LeadKey {
            company: "Vestas".to_string(),
            name: None,
            user_id: None,
        };
        assert!(key.matches(&lead("Anyone", Some("Vestas"))));
        assert!(!key.matches(&lead("Anyone", Some("vestas"))));
        assert!(!key.matches(&lead("Anyone", None)));
    }

    #[test]
    fn test_lead_key_name_and_company() {
        let key = LeadKey {
            company: "Vestas".to_string(),
            name: Some("Mette".to_string()),
            user_id: None,
        };
        assert!(key.matches(&lead("Mette", Some("Vestas"))));
        assert!(!key.matches(&lead("Lars", Some("Vestas"))));
    }

    #[test]
    fn test_response_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ResponseStatus::Responded).unwrap(),
            "\"responded\""
        );
        assert_eq!(serde_json::to_string(&LeadStatus::New).unwrap(), "\"new\"");
    }

    #[test]
    fn test_lead_deserializes_with_missing_optionals() {
        let json = r#"{"id": "abc", "name": "Jane"}"#;
        let lead: Lead = serde_json::from_str(json).unwrap();
        assert_eq!(lead.status, LeadStatus::New);
        assert_eq!(lead.response_status, ResponseStatus::None);
        assert!(lead.email.is_none());
        assert!(lead.last_contact_date.is_none());
    }
}
