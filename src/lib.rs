//! leadflow — a small CRM core.
//!
//! Two engines with real decision logic:
//! - [`reconcile`]: match recent mailbox messages to known leads by
//!   address and fold them into one pending update per lead, without
//!   double-processing or regressing lead state.
//! - [`ingest`]: merge AI-generated candidate leads into the store
//!   under a configurable dedup key, without creating duplicates.
//!
//! Collaborators (mail source, lead store, generation service) sit
//! behind traits and are injected into the [`service`] entry points;
//! `gmail`, `supabase`, and `openai` provide the production adapters.

pub mod address;
pub mod config;
pub mod error;
pub mod generate;
pub mod gmail;
pub mod http;
pub mod ingest;
pub mod mail;
pub mod openai;
pub mod reconcile;
pub mod service;
pub mod store;
pub mod supabase;
pub mod types;
