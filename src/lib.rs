//! # fivem-script-crafter
//!
//! Generate and improve FiveM scripts with a language model.
//!
//! ## Features
//!
//! - **Script Generation**: Turn a natural-language description into a resource bundle or a
//!   standalone script
//! - **Script Improvement**: Revise an existing script from an instruction
//! - **Typed Contracts**: Inputs are validated before the model is called, outputs are checked
//!   against a schema before they are returned
//! - **Template Support**: Instruction documents rendered with Handlebars
//! - **Interaction Controller**: A per-session state machine for submit, result display and
//!   export
//! - **Pluggable Model**: Any backend implementing [`LanguageModel`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fivem_script_crafter::{LanguageModel, ScriptCrafter, SubmitEvent, ScriptGenerationRequest};
//! use std::sync::Arc;
//!
//! # async fn example(model: Arc<dyn LanguageModel>) -> Result<(), Box<dyn std::error::Error>> {
//! let crafter = ScriptCrafter::new(model)?;
//!
//! // Call an operation directly
//! let result = crafter.generate_script("Create a /heal command that restores health").await?;
//! println!("{}", result.code);
//!
//! // Or drive a UI session
//! let mut session = crafter.controller();
//! let event = SubmitEvent::Generate(ScriptGenerationRequest::new("Create a car spawner"));
//! crafter.submit(&mut session, event).await;
//! if let Some(artifact) = session.export() {
//!     artifact.write_to("out")?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod capability;
pub mod controller;
pub mod error;
pub mod export;
pub mod invoker;
pub mod operations;
pub mod schema;
pub mod template;

use crate::controller::{InteractionController, SubmitStatus};
use crate::error::{CrafterError, Result};
use crate::export::DEFAULT_EXPORT_FILE_NAME;
use crate::invoker::Invoker;
use crate::operations::Operations;
use crate::schema::InputRules;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration for script crafting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Limits applied to request inputs
    pub input_rules: InputRules,
    /// Check templates for syntax and unbound placeholders at startup
    pub validate_templates: bool,
    /// Author written into every generated fxmanifest.lua
    pub manifest_author: String,
    /// File name used when exporting a result
    pub export_file_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_rules: InputRules::default(),
            validate_templates: true,
            manifest_author: "Jay Mods".to_string(),
            export_file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
        }
    }
}

impl Config {
    /// Parse a JSON configuration; missing keys take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no request could ever satisfy
    pub fn validate(&self) -> Result<()> {
        let rules = &self.input_rules;
        if rules.min_prompt_length > rules.max_input_length {
            return Err(CrafterError::Config(format!(
                "min_prompt_length ({}) exceeds max_input_length ({})",
                rules.min_prompt_length, rules.max_input_length
            )));
        }
        Ok(())
    }
}

/// Main interface for script generation
pub struct ScriptCrafter {
    invoker: Invoker,
    operations: Arc<Operations>,
    config: Config,
}

impl ScriptCrafter {
    /// Create a crafter with default configuration
    pub fn new(model: Arc<dyn LanguageModel>) -> Result<Self> {
        Self::with_config(model, Config::default())
    }

    /// Create a crafter with custom configuration
    pub fn with_config(model: Arc<dyn LanguageModel>, config: Config) -> Result<Self> {
        let operations = Operations::new(&config)?;

        Ok(Self {
            invoker: Invoker::new(model),
            operations: Arc::new(operations),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    /// Shared handle to the compiled operations
    pub fn operations(&self) -> Arc<Operations> {
        Arc::clone(&self.operations)
    }

    /// Generate a script from a prompt
    pub async fn generate_script(
        &self,
        prompt: impl Into<String>,
    ) -> Result<ScriptGenerationResult> {
        self.invoker
            .invoke(&self.operations.generate, ScriptGenerationRequest::new(prompt))
            .await
    }

    /// Improve an existing script
    pub async fn improve_script(
        &self,
        existing_script: impl Into<String>,
        improvement_description: impl Into<String>,
    ) -> Result<ScriptImprovementResult> {
        let request = ScriptImprovementRequest::new(existing_script, improvement_description);
        self.invoker.invoke(&self.operations.improve, request).await
    }

    /// A fresh interaction session using the configured export name
    pub fn controller(&self) -> InteractionController {
        InteractionController::with_export_file_name(self.config.export_file_name.clone())
    }

    /// Run a submit event through a session
    pub async fn submit(
        &self,
        controller: &mut InteractionController,
        event: SubmitEvent,
    ) -> SubmitStatus {
        controller.submit(&self.invoker, &self.operations, event).await
    }
}

// Re-export important types
pub use crate::capability::{CapabilityError, CapabilityRequest, LanguageModel};
pub use crate::controller::{Notification, NotificationLevel, Phase, SubmitEvent};
pub use crate::export::ScriptArtifact;
pub use crate::operations::{
    ScriptGenerationRequest, ScriptGenerationResult, ScriptImprovementRequest,
    ScriptImprovementResult,
};
