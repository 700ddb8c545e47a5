//! Lead generation collaborator trait.

use async_trait::async_trait;

use crate::error::GenerateError;
use crate::types::LeadCandidate;

/// Produces candidate leads from a prompt.
///
/// Adapters own the output-shape contract: non-array or unparsable
/// model output yields `Ok(vec![])`, not an error. Only transport and
/// API failures are `Err`.
#[async_trait]
pub trait LeadGenerator: Send + Sync {
    async fn generate_candidates(&self, prompt: &str)
        -> Result<Vec<LeadCandidate>, GenerateError>;
}
