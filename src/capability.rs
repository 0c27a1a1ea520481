//! Boundary to the language model that turns an instruction into structured output.
//!
//! The crate ships no provider. Hosts implement [`LanguageModel`] over whatever
//! transport they use; any timeout is the implementation's own.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Failure of the model call itself
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// The call did not complete in time.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The request could not be delivered or the response could not be read.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered with an error.
    #[error("Provider error: {0}")]
    Provider(String),
}

/// One structured-output request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityRequest {
    /// Name of the operation issuing the request
    pub operation: String,
    /// Fully rendered instruction document
    pub instruction: String,
    /// JSON Schema the response must conform to
    pub output_schema: Value,
}

/// A model able to answer an instruction with JSON shaped by a schema.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Produce output for `request`. The returned value is checked against
    /// `request.output_schema` by the caller.
    async fn generate(&self, request: &CapabilityRequest) -> Result<Value, CapabilityError>;
}
