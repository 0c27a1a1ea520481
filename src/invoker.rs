//! Runs one validated request/response cycle against a [`LanguageModel`].

use crate::capability::{CapabilityRequest, LanguageModel};
use crate::error::Result;
use crate::operations::{Operation, OperationDefinition};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Stateless executor for operations. Clones share the same model.
#[derive(Clone)]
pub struct Invoker {
    model: Arc<dyn LanguageModel>,
}

impl Invoker {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Validate `input`, render the instruction, call the model and check its output.
    ///
    /// Input that fails its contract never reaches the model. Output that
    /// fails the operation's schema is rejected whole. No retries.
    pub async fn invoke<O: Operation>(
        &self,
        operation: &OperationDefinition<O>,
        input: O::Input,
    ) -> Result<O::Output> {
        let input = operation.validate_input(input).inspect_err(|e| {
            warn!("Rejected '{}' request: {}", operation.name(), e);
        })?;

        let request = CapabilityRequest {
            operation: operation.name().to_string(),
            instruction: operation.render(&input)?,
            output_schema: operation.output_schema().descriptor(),
        };

        debug!(
            "Calling model for '{}' ({} byte instruction)",
            request.operation,
            request.instruction.len()
        );
        let raw = self.model.generate(&request).await.inspect_err(|e| {
            warn!("Model call for '{}' failed: {}", request.operation, e);
        })?;

        let output = operation
            .output_schema()
            .conform(operation.name(), raw)
            .inspect_err(|e| warn!("{}", e))?;

        info!("Operation '{}' completed", operation.name());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use crate::capability::{CapabilityError, MockLanguageModel};
    use crate::error::CrafterError;
    use crate::operations::{Operations, ScriptGenerationRequest, ScriptImprovementRequest};
    use serde_json::json;

    fn setup(model: MockLanguageModel) -> (Invoker, Operations) {
        let ops = Operations::new(&Config::default()).unwrap();
        (Invoker::new(Arc::new(model)), ops)
    }

    #[tokio::test]
    async fn test_short_prompt_never_calls_model() {
        let mut model = MockLanguageModel::new();
        model.expect_generate().times(0);
        let (invoker, ops) = setup(model);

        let err = invoker
            .invoke(&ops.generate, ScriptGenerationRequest::new("spawn"))
            .await
            .unwrap_err();
        assert!(matches!(err, CrafterError::Validation(_)));
    }

    #[tokio::test]
    async fn test_generate_returns_validated_output() {
        let code = "-- fxmanifest.lua --\n...-- end fxmanifest.lua --\n\
                    -- client.lua --\n...-- end client.lua --";
        let mut model = MockLanguageModel::new();
        model
            .expect_generate()
            .withf(|req| {
                req.operation == "generateFiveMScript"
                    && req.instruction.contains("/spawncar [carname]")
                    && req.output_schema["required"] == json!(["code"])
            })
            .times(1)
            .returning(move |_| Ok(json!({ "code": code })));
        let (invoker, ops) = setup(model);

        let result = invoker
            .invoke(
                &ops.generate,
                ScriptGenerationRequest::new(
                    "Create a script for a simple car spawner with a command /spawncar [carname]",
                ),
            )
            .await
            .unwrap();
        assert_eq!(result.code, code);
    }

    #[tokio::test]
    async fn test_missing_output_field_is_schema_mismatch() {
        let mut model = MockLanguageModel::new();
        model
            .expect_generate()
            .times(1)
            .returning(|_| Ok(json!({ "script": "print(1)" })));
        let (invoker, ops) = setup(model);

        let err = invoker
            .invoke(&ops.generate, ScriptGenerationRequest::new("Create a car spawner"))
            .await
            .unwrap_err();
        match err {
            CrafterError::SchemaMismatch(e) => {
                assert_eq!(e.operation, "generateFiveMScript");
                assert_eq!(e.violations[0].field, "code");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_capability_error_propagates_unchanged() {
        let mut model = MockLanguageModel::new();
        model
            .expect_generate()
            .times(1)
            .returning(|_| Err(CapabilityError::Transport("connection reset".to_string())));
        let (invoker, ops) = setup(model);

        let err = invoker
            .invoke(&ops.generate, ScriptGenerationRequest::new("Create a car spawner"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CrafterError::Capability(CapabilityError::Transport(ref msg))
                if msg == "connection reset"
        ));
    }

    #[tokio::test]
    async fn test_improve_returns_script_verbatim() {
        let mut model = MockLanguageModel::new();
        model
            .expect_generate()
            .withf(|req| {
                req.instruction.contains("print('hi')")
                    && req.instruction.contains("add error handling")
            })
            .times(1)
            .returning(|_| Ok(json!({ "improvedScript": "local ok, err = pcall(print, 'hi')" })));
        let (invoker, ops) = setup(model);

        let result = invoker
            .invoke(
                &ops.improve,
                ScriptImprovementRequest::new("print('hi')", "add error handling"),
            )
            .await
            .unwrap();
        assert_eq!(result.improved_script, "local ok, err = pcall(print, 'hi')");
    }

    #[tokio::test]
    async fn test_concurrent_invocations_share_definitions() {
        let mut model = MockLanguageModel::new();
        model
            .expect_generate()
            .times(8)
            .returning(|req| Ok(json!({ "code": format!("-- {}", req.instruction.len()) })));
        let (invoker, ops) = setup(model);
        let ops = Arc::new(ops);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let invoker = invoker.clone();
                let ops = Arc::clone(&ops);
                tokio::spawn(async move {
                    let request = ScriptGenerationRequest::new(format!("Create script number {i}"));
                    invoker.invoke(&ops.generate, request).await
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
    }
}
