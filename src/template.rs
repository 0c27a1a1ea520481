use crate::error::{CrafterError, Result};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

/// Template engine for instruction documents.
///
/// Strict mode is on so an unbound placeholder is an error, and escaping is
/// off so request text reaches the model byte for byte.
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    /// Create a new template engine
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        Self { handlebars }
    }

    /// Compile and register a named template
    pub fn register(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars.register_template_string(name, template)?;
        debug!("Registered template '{}'", name);
        Ok(())
    }

    /// Render a registered template against any serializable context
    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<String> {
        let rendered = self.handlebars.render(name, context)?;
        debug!("Rendered template '{}' ({} bytes)", name, rendered.len());
        Ok(rendered)
    }

    /// Validate a template for syntax errors
    pub fn validate_template(&self, template: &str) -> Result<()> {
        handlebars::Template::compile(template)
            .map(|_| ())
            .map_err(|e| {
                CrafterError::TemplateValidation(format!("Invalid template syntax: {}", e))
            })
    }

    /// Extract variable names from a template
    pub fn extract_variables(&self, template: &str) -> Result<Vec<String>> {
        let mut variables = Vec::new();

        // handlebars doesn't expose the AST, so scan for {{ ... }} pairs
        let mut in_variable = false;
        let mut current_var = String::new();
        let mut brace_count: i32 = 0;

        for ch in template.chars() {
            if ch == '{' {
                brace_count += 1;
                if brace_count == 2 {
                    in_variable = true;
                    current_var.clear();
                }
            } else if ch == '}' {
                if in_variable && brace_count >= 2 {
                    in_variable = false;
                    brace_count = 0;

                    let var_name = current_var.split_whitespace().next().unwrap_or("");
                    if !var_name.is_empty() && !var_name.starts_with(['#', '/', '!', '>']) {
                        variables.push(var_name.to_string());
                    }
                } else {
                    brace_count = 0;
                }
            } else if in_variable {
                current_var.push(ch);
            } else {
                brace_count = 0;
            }
        }

        variables.sort();
        variables.dedup();

        debug!("Extracted {} variables from template", variables.len());
        Ok(variables)
    }

    /// Placeholders in `template` with no entry in `provided`
    pub fn check_variables<S: AsRef<str>>(
        &self,
        template: &str,
        provided: &[S],
    ) -> Result<Vec<String>> {
        let required = self.extract_variables(template)?;
        let missing: Vec<String> = required
            .into_iter()
            .filter(|var| !provided.iter().any(|p| p.as_ref() == var))
            .collect();

        Ok(missing)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}
