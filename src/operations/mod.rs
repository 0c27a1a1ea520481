//! Operation definitions: a template, an input contract and an output schema
//! bound together and compiled once.

pub mod generate;
pub mod improve;

use crate::Config;
use crate::error::{CrafterError, Result};
use crate::schema::{Contract, InputRules, OutputSchema, ValidationError};
use crate::template::TemplateEngine;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;
use tracing::debug;

pub use generate::{GenerateScript, ScriptGenerationRequest, ScriptGenerationResult};
pub use improve::{ImproveScript, ScriptImprovementRequest, ScriptImprovementResult};

/// Static description of one request/response contract
pub trait Operation: Send + Sync + 'static {
    type Input: Contract + Serialize + Send + Sync;
    type Output: DeserializeOwned + Send;

    /// Operation name, also used as the template name
    const NAME: &'static str;
    /// Instruction template; placeholders name input fields or constants
    const TEMPLATE: &'static str;
    /// Serialized names of the input fields
    const INPUT_FIELDS: &'static [&'static str];
    /// Shape the model output must have
    const OUTPUT: OutputSchema;

    /// Fixed template bindings that never come from the request
    fn constants(_config: &Config) -> Map<String, Value> {
        Map::new()
    }
}

#[derive(Serialize)]
struct RenderContext<'a, I: Serialize> {
    #[serde(flatten)]
    constants: &'a Map<String, Value>,
    #[serde(flatten)]
    input: &'a I,
}

/// A compiled, immutable operation. Safe to share between concurrent invocations.
pub struct OperationDefinition<O: Operation> {
    engine: TemplateEngine,
    rules: InputRules,
    constants: Map<String, Value>,
    _operation: PhantomData<fn() -> O>,
}

impl<O: Operation> OperationDefinition<O> {
    /// Compile the operation's template and bind its constants
    pub fn new(config: &Config) -> Result<Self> {
        let mut engine = TemplateEngine::new();
        let constants = O::constants(config);

        if let Some(clash) = constants.keys().find(|k| O::INPUT_FIELDS.contains(&k.as_str())) {
            return Err(CrafterError::Config(format!(
                "Constant '{}' of '{}' shadows an input field",
                clash,
                O::NAME
            )));
        }

        if config.validate_templates {
            engine.validate_template(O::TEMPLATE)?;

            let bound: Vec<&str> = O::INPUT_FIELDS
                .iter()
                .copied()
                .chain(constants.keys().map(String::as_str))
                .collect();
            let unbound = engine.check_variables(O::TEMPLATE, &bound)?;
            if !unbound.is_empty() {
                return Err(CrafterError::TemplateValidation(format!(
                    "Template '{}' has unbound placeholders: {}",
                    O::NAME,
                    unbound.join(", ")
                )));
            }
        }

        engine.register(O::NAME, O::TEMPLATE)?;
        debug!("Compiled operation '{}'", O::NAME);

        Ok(Self {
            engine,
            rules: config.input_rules.clone(),
            constants,
            _operation: PhantomData,
        })
    }

    pub fn name(&self) -> &'static str {
        O::NAME
    }

    pub fn output_schema(&self) -> OutputSchema {
        O::OUTPUT
    }

    pub fn validate_input(
        &self,
        input: O::Input,
    ) -> std::result::Result<O::Input, ValidationError> {
        input.validate(&self.rules)
    }

    /// Render the instruction document for an already validated request
    pub fn render(&self, input: &O::Input) -> Result<String> {
        let context = RenderContext {
            constants: &self.constants,
            input,
        };
        self.engine.render(O::NAME, &context)
    }
}

impl<O: Operation> fmt::Debug for OperationDefinition<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationDefinition")
            .field("name", &O::NAME)
            .field("rules", &self.rules)
            .field("constants", &self.constants)
            .finish()
    }
}

/// Both script operations, built once at startup
#[derive(Debug)]
pub struct Operations {
    pub generate: OperationDefinition<GenerateScript>,
    pub improve: OperationDefinition<ImproveScript>,
}

impl Operations {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            generate: OperationDefinition::new(config)?,
            improve: OperationDefinition::new(config)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, FieldViolation};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Serialize)]
    struct Echo {
        text: String,
    }

    impl Contract for Echo {
        fn violations(&self, rules: &InputRules) -> Vec<FieldViolation> {
            rules.check_text("text", &self.text, 1)
        }
    }

    #[derive(Deserialize)]
    struct EchoOut {
        #[allow(dead_code)]
        echoed: String,
    }

    struct EchoOp;

    impl Operation for EchoOp {
        type Input = Echo;
        type Output = EchoOut;
        const NAME: &'static str = "echo";
        const TEMPLATE: &'static str = "[{{tag}}] {{text}}";
        const INPUT_FIELDS: &'static [&'static str] = &["text"];
        const OUTPUT: OutputSchema = OutputSchema::new(&[FieldSpec {
            name: "echoed",
            description: "echo",
        }]);

        fn constants(_config: &Config) -> Map<String, Value> {
            let mut constants = Map::new();
            constants.insert("tag".to_string(), json!("fixed"));
            constants
        }
    }

    struct UnboundOp;

    impl Operation for UnboundOp {
        type Input = Echo;
        type Output = EchoOut;
        const NAME: &'static str = "unbound";
        const TEMPLATE: &'static str = "{{text}} {{missing}}";
        const INPUT_FIELDS: &'static [&'static str] = &["text"];
        const OUTPUT: OutputSchema = EchoOp::OUTPUT;
    }

    #[test]
    fn test_render_merges_constants_and_input() {
        let op = OperationDefinition::<EchoOp>::new(&Config::default()).unwrap();
        let rendered = op
            .render(&Echo {
                text: "hello".to_string(),
            })
            .unwrap();
        assert_eq!(rendered, "[fixed] hello");
    }

    #[test]
    fn test_unbound_placeholder_rejected_at_construction() {
        let err = OperationDefinition::<UnboundOp>::new(&Config::default()).unwrap_err();
        assert!(matches!(err, CrafterError::TemplateValidation(msg) if msg.contains("missing")));
    }

    #[test]
    fn test_builtin_operations_compile() {
        let ops = Operations::new(&Config::default()).unwrap();
        assert_eq!(ops.generate.name(), "generateFiveMScript");
        assert_eq!(ops.improve.name(), "improveFiveMScript");
    }

    #[test]
    fn test_definitions_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Operations>();
    }
}
