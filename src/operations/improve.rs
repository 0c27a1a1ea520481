use super::Operation;
use crate::schema::{Contract, FieldSpec, FieldViolation, InputRules, OutputSchema};
use serde::{Deserialize, Serialize};

/// An existing script and a description of how to change it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptImprovementRequest {
    pub existing_script: String,
    pub improvement_description: String,
}

impl ScriptImprovementRequest {
    pub fn new(
        existing_script: impl Into<String>,
        improvement_description: impl Into<String>,
    ) -> Self {
        Self {
            existing_script: existing_script.into(),
            improvement_description: improvement_description.into(),
        }
    }
}

impl Contract for ScriptImprovementRequest {
    fn violations(&self, rules: &InputRules) -> Vec<FieldViolation> {
        let mut violations = rules.check_text("existingScript", &self.existing_script, 1);
        violations.extend(rules.check_text(
            "improvementDescription",
            &self.improvement_description,
            1,
        ));
        violations
    }
}

/// The complete revised script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptImprovementResult {
    pub improved_script: String,
}

/// Improve an existing FiveM script according to an instruction
pub struct ImproveScript;

impl Operation for ImproveScript {
    type Input = ScriptImprovementRequest;
    type Output = ScriptImprovementResult;

    const NAME: &'static str = "improveFiveMScript";
    const TEMPLATE: &'static str = IMPROVE_TEMPLATE;
    const INPUT_FIELDS: &'static [&'static str] = &["existingScript", "improvementDescription"];
    const OUTPUT: OutputSchema = OutputSchema::new(&[FieldSpec {
        name: "improvedScript",
        description: "The improved FiveM script.",
    }]);
}

const IMPROVE_TEMPLATE: &str = r#"You are an expert FiveM script developer. You will take an existing FiveM script and improve it based on a description of the desired improvements.

Existing Script:
{{{existingScript}}}

Improvement Description:
{{{improvementDescription}}}

Return the complete improved script, not a diff or a list of changes. Keep any section markers (such as -- client.lua -- and -- end client.lua --) that appear in the existing script.

Improved Script:"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use crate::operations::OperationDefinition;

    #[test]
    fn test_both_fields_presented_verbatim() {
        let op = OperationDefinition::<ImproveScript>::new(&Config::default()).unwrap();
        let request = ScriptImprovementRequest::new("print('hi') -- <b>", "add error handling");
        let rendered = op.render(&request).unwrap();

        assert!(rendered.contains("Existing Script:\nprint('hi') -- <b>\n"));
        assert!(rendered.contains("Improvement Description:\nadd error handling\n"));
        assert!(rendered.ends_with("Improved Script:"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let op = OperationDefinition::<ImproveScript>::new(&Config::default()).unwrap();
        let request = ScriptImprovementRequest::new(
            "RegisterCommand('heal', function(source) end)",
            "restore armor as well",
        );

        let first = op.render(&request).unwrap();
        let second = op.render(&request.clone()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_every_empty_field_is_reported() {
        let op = OperationDefinition::<ImproveScript>::new(&Config::default()).unwrap();
        let err = op
            .validate_input(ScriptImprovementRequest::new("", "  "))
            .unwrap_err();
        let fields: Vec<&str> = err.violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["existingScript", "improvementDescription"]);
    }

    #[test]
    fn test_short_inputs_are_accepted() {
        let op = OperationDefinition::<ImproveScript>::new(&Config::default()).unwrap();
        assert!(op.validate_input(ScriptImprovementRequest::new("x=1", "fix")).is_ok());
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let value = serde_json::to_value(ScriptImprovementRequest::new("a", "b")).unwrap();
        assert_eq!(value["existingScript"], "a");
        assert_eq!(value["improvementDescription"], "b");
    }
}
