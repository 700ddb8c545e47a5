//! AI lead ingestion: decide per candidate whether it is a new lead or
//! an existing one, under a configurable match key.
//!
//! This is insert-only-if-absent dedup, not an upsert-and-merge: a
//! matched existing lead is left untouched. A failed existence check
//! must not silently drop a candidate — the engine falls back to
//! inserting, tolerating duplicates over lost leads.

use crate::error::StoreError;
use crate::store::LeadStore;
use crate::types::{LeadCandidate, LeadKey, LeadStatus, MatchKey, NewLead, ResponseStatus};

/// Display name used when a candidate carries no contact person.
const UNKNOWN_CONTACT: &str = "Unknown contact";

/// Outcome of one ingestion pass.
#[derive(Debug, Default, PartialEq)]
pub struct IngestReport {
    /// Candidates inserted as new leads.
    pub inserted: usize,
    /// Candidates skipped as duplicates of existing leads.
    pub skipped: Vec<LeadCandidate>,
    /// Candidates rejected for missing required key fields.
    pub rejected: usize,
}

/// Extract the dedup key for a candidate, or `None` if a required key
/// field is absent (`company` always; `contact_person` for
/// [`MatchKey::NameCompany`]; a configured user id for
/// [`MatchKey::UserCompany`]).
pub fn candidate_key(
    candidate: &LeadCandidate,
    match_key: MatchKey,
    user_id: Option<&str>,
) -> Option<LeadKey> {
    let company = candidate.company.clone()?;
    match match_key {
        MatchKey::Company => Some(LeadKey {
            company,
            name: None,
            user_id: None,
        }),
        MatchKey::NameCompany => candidate.contact_person.clone().map(|name| LeadKey {
            company,
            name: Some(name),
            user_id: None,
        }),
        MatchKey::UserCompany => user_id.map(|user| LeadKey {
            company,
            name: None,
            user_id: Some(user.to_string()),
        }),
    }
}

/// Map an accepted candidate onto an insert payload with status `new`.
fn new_lead_from(candidate: &LeadCandidate, user_id: Option<&str>) -> NewLead {
    NewLead {
        user_id: user_id.map(str::to_string),
        name: candidate
            .contact_person
            .clone()
            .unwrap_or_else(|| UNKNOWN_CONTACT.to_string()),
        company: candidate.company.clone(),
        email: candidate.email.clone(),
        phone: candidate.phone.clone(),
        website: candidate.website.clone(),
        status: LeadStatus::New,
        response_status: ResponseStatus::None,
    }
}

/// Merge a candidate batch into the store.
///
/// Per candidate: reject on missing key fields, skip when an existing
/// lead matches the key, otherwise insert. A transient lookup failure
/// logs a warning and proceeds to insert; an insert failure fails the
/// pass (the store is down, not the input malformed).
pub async fn ingest(
    store: &dyn LeadStore,
    candidates: &[LeadCandidate],
    match_key: MatchKey,
    user_id: Option<&str>,
) -> Result<IngestReport, StoreError> {
    let mut report = IngestReport::default();

    for candidate in candidates {
        let Some(key) = candidate_key(candidate, match_key, user_id) else {
            log::debug!("rejecting candidate without required key fields: {candidate:?}");
            report.rejected += 1;
            continue;
        };

        let existing = match store.find_lead_by_key(&key).await {
            Ok(found) => found,
            Err(e) => {
                log::warn!(
                    "lead lookup failed for company {:?} ({e}); inserting anyway",
                    key.company
                );
                None
            }
        };

        if let Some(lead) = existing {
            log::debug!(
                "skipping duplicate candidate for company {:?} (existing lead {})",
                key.company,
                lead.id
            );
            report.skipped.push(candidate.clone());
            continue;
        }

        store.insert_lead(&new_lead_from(candidate, user_id)).await?;
        report.inserted += 1;
    }

    Ok(report)
}
