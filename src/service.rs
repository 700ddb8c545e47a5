//! Pass orchestration: the inbox sync and lead generation entry points.
//!
//! Each pass is request-scoped and runs to completion on its own
//! snapshot; there is no shared state between passes. Collaborators are
//! injected so passes are deterministic under test fakes.

use chrono::Utc;
use serde::Serialize;

use crate::error::SyncError;
use crate::generate::LeadGenerator;
use crate::ingest::ingest;
use crate::mail::MailSource;
use crate::reconcile::reconcile;
use crate::store::LeadStore;
use crate::types::MatchKey;

/// Result of a reconciliation pass, in the trigger's response shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    pub updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Result of an ingestion pass, in the trigger's response shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub inserted: usize,
}

/// Reconcile recent mailbox messages against the lead snapshot and
/// apply the resulting write-set.
///
/// No leads short-circuits the pass before any per-message work.
/// Updates are applied as independent per-lead writes with no
/// cross-record transaction; a store failure mid-application fails the
/// pass with earlier writes retained, and the next pass reconciles
/// again from current state.
pub async fn sync_inbox(
    mail: &dyn MailSource,
    store: &dyn LeadStore,
    own_mailbox: &str,
    message_limit: u32,
) -> Result<SyncOutcome, SyncError> {
    let leads = store.select_leads().await?;
    if leads.is_empty() {
        log::info!("no leads to reconcile");
        return Ok(SyncOutcome {
            updated: false,
            count: None,
            reason: Some("No leads".to_string()),
        });
    }

    if own_mailbox.is_empty() {
        log::warn!("own mailbox address not configured; outbound messages won't mark leads as sent");
    }

    let messages = mail.fetch_recent_messages(message_limit).await?;
    let updates = reconcile(&messages, &leads, own_mailbox, Utc::now());
    let count = updates.len();

    for (lead_id, update) in &updates {
        store.update_lead(lead_id, update).await?;
    }

    log::info!(
        "reconciled {count} lead(s) from {} message(s)",
        messages.len()
    );
    Ok(SyncOutcome {
        updated: true,
        count: Some(count),
        reason: None,
    })
}

/// Build the generation prompt from existing customer companies.
fn build_prompt(companies: &[&str]) -> String {
    let shape = "Respond with a JSON array of objects with the fields \
                 company, contactPerson, email, phone and website.";
    if companies.is_empty() {
        format!(
            "Find small and medium-sized companies that could become customers. {shape}"
        )
    } else {
        format!(
            "My best customers are: {}. Find similar companies in the same industries. {shape}",
            companies.join(", ")
        )
    }
}

/// How many existing companies seed the generation prompt.
const PROMPT_COMPANY_LIMIT: usize = 20;

/// Generate candidate leads from the existing book of business and
/// merge them into the store without creating duplicates.
pub async fn generate_leads(
    generator: &dyn LeadGenerator,
    store: &dyn LeadStore,
    match_key: MatchKey,
    user_id: Option<&str>,
) -> Result<IngestSummary, SyncError> {
    let existing = store.select_leads().await?;
    let companies: Vec<&str> = existing
        .iter()
        .filter_map(|l| l.company.as_deref())
        .take(PROMPT_COMPANY_LIMIT)
        .collect();

    let prompt = build_prompt(&companies);
    let candidates = generator.generate_candidates(&prompt).await?;
    let report = ingest(store, &candidates, match_key, user_id).await?;

    log::info!(
        "ingested {} candidate(s) ({} duplicate(s) skipped, {} rejected)",
        report.inserted,
        report.skipped.len(),
        report.rejected
    );
    Ok(IngestSummary {
        inserted: report.inserted,
    })
}
