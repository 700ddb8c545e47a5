//! Inbox-to-lead reconciliation: lead index, message classifier, and
//! the aggregator that folds a message batch into one pending update
//! per affected lead.
//!
//! The engine is pure: it never touches the store. It computes the
//! write-set; applying it is the caller's job (see `service`).

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::address::normalize_address;
use crate::types::{Lead, MailMessage, PendingUpdate, ResponseStatus};

// ============================================================================
// Lead index
// ============================================================================

/// Lookup from normalized email address to lead, built once per pass
/// from a snapshot of leads with a present email.
///
/// Two leads sharing a normalized address is a precondition violation;
/// the index resolves it first-wins by snapshot order and logs the
/// ignored lead.
pub struct LeadIndex<'a> {
    by_address: HashMap<String, &'a Lead>,
}

impl<'a> LeadIndex<'a> {
    pub fn build(leads: &'a [Lead]) -> Self {
        let mut by_address: HashMap<String, &'a Lead> = HashMap::new();
        for lead in leads {
            let Some(address) = normalize_address(lead.email.as_deref()) else {
                continue;
            };
            match by_address.entry(address) {
                Entry::Occupied(existing) => {
                    log::warn!(
                        "duplicate lead address {}: keeping lead {}, ignoring lead {}",
                        existing.key(),
                        existing.get().id,
                        lead.id
                    );
                }
                Entry::Vacant(slot) => {
                    slot.insert(lead);
                }
            }
        }
        Self { by_address }
    }

    pub fn get(&self, address: &str) -> Option<&'a Lead> {
        self.by_address.get(address).copied()
    }

    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }
}

// ============================================================================
// Message classifier
// ============================================================================

/// Parse a mail `Date` header. Providers emit RFC 2822; some relays
/// emit RFC 3339. Anything else is unparseable.
fn parse_message_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Decide which lead (if any) a message pertains to and what update it
/// implies.
///
/// The status transition is computed against the lead's *stored* status,
/// never a pending value from earlier in the batch:
/// - lead is the sender → `responded`, regardless of prior status;
/// - lead is the recipient and the sender is the own-mailbox address →
///   `sent`, unless the stored status is already `responded` (sticky);
/// - otherwise the status is left unchanged, but the contact timestamp
///   and subject still update.
///
/// An unparseable or absent `Date` defaults to `now`. A message with no
/// resolvable address, or one matching no lead, classifies as `None`.
pub fn classify(
    message: &MailMessage,
    index: &LeadIndex,
    own_mailbox: &str,
    now: DateTime<Utc>,
) -> Option<(String, PendingUpdate)> {
    let from_addr = normalize_address(message.header("From"));
    let to_addr = normalize_address(message.header("To"));
    let subject = message.header("Subject").map(str::to_string);
    let date = message
        .header("Date")
        .and_then(parse_message_date)
        .unwrap_or(now);

    let lead = from_addr
        .as_deref()
        .and_then(|a| index.get(a))
        .or_else(|| to_addr.as_deref().and_then(|a| index.get(a)))?;

    // Present by construction of the index.
    let lead_addr = normalize_address(lead.email.as_deref())?;
    let own = normalize_address(Some(own_mailbox));

    let response_status = if from_addr.as_deref() == Some(lead_addr.as_str()) {
        ResponseStatus::Responded
    } else if to_addr.as_deref() == Some(lead_addr.as_str())
        && own.is_some()
        && from_addr == own
    {
        if lead.response_status == ResponseStatus::Responded {
            ResponseStatus::Responded
        } else {
            ResponseStatus::Sent
        }
    } else {
        lead.response_status
    };

    Some((
        lead.id.clone(),
        PendingUpdate {
            last_contact_date: date,
            most_recent_subject: subject,
            response_status,
        },
    ))
}

// ============================================================================
// Reconciliation aggregator
// ============================================================================

/// Fold a message batch into one pending update per affected lead.
///
/// Messages are processed in the order supplied by the mail source, and
/// a later-processed message for the same lead overwrites the earlier
/// pending update. The final `last_contact_date`/`most_recent_subject`
/// therefore depend on the source's ordering contract (see
/// [`crate::mail::MailSource`]) — the aggregator does not re-sort by
/// the parsed `Date`.
pub fn reconcile(
    messages: &[MailMessage],
    leads: &[Lead],
    own_mailbox: &str,
    now: DateTime<Utc>,
) -> HashMap<String, PendingUpdate> {
    let index = LeadIndex::build(leads);
    let mut updates: HashMap<String, PendingUpdate> = HashMap::new();

    for message in messages {
        if let Some((lead_id, update)) = classify(message, &index, own_mailbox, now) {
            // Most recently processed message wins.
            updates.insert(lead_id, update);
        }
    }

    updates
}
