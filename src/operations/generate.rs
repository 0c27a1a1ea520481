use super::Operation;
use crate::Config;
use crate::schema::{Contract, FieldSpec, FieldViolation, InputRules, OutputSchema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A natural-language description of the script to generate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptGenerationRequest {
    pub prompt: String,
}

impl ScriptGenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

impl Contract for ScriptGenerationRequest {
    fn violations(&self, rules: &InputRules) -> Vec<FieldViolation> {
        rules.check_text("prompt", &self.prompt, rules.min_prompt_length)
    }
}

/// Generated source: either a delimited resource bundle or a single script body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptGenerationResult {
    pub code: String,
}

/// Generate a FiveM script from a prompt
pub struct GenerateScript;

impl Operation for GenerateScript {
    type Input = ScriptGenerationRequest;
    type Output = ScriptGenerationResult;

    const NAME: &'static str = "generateFiveMScript";
    const TEMPLATE: &'static str = GENERATE_TEMPLATE;
    const INPUT_FIELDS: &'static [&'static str] = &["prompt"];
    const OUTPUT: OutputSchema = OutputSchema::new(&[FieldSpec {
        name: "code",
        description: "The generated FiveM script code. Either a resource bundle containing \
                      fxmanifest.lua and the Lua script file(s), each delimited by begin/end \
                      markers, or a single standalone Lua script.",
    }]);

    fn constants(config: &Config) -> Map<String, Value> {
        let mut constants = Map::new();
        constants.insert(
            "manifestAuthor".to_string(),
            Value::String(config.manifest_author.clone()),
        );
        constants
    }
}

const GENERATE_TEMPLATE: &str = r#"You are an expert FiveM script developer.

Generate a FiveM script based on the following prompt. Consider the specified framework if mentioned (e.g., ESX, Qbox, QBCore). If no framework is specified, assume it's a standalone script (no specific framework).

Prompt: {{{prompt}}}

First decide which kind of output the prompt asks for:

1. Standalone script. If the prompt asks for a standalone, injectable or executor script, or a single Lua snippet that is not a packaged resource, respond with only that Lua code. Do not include an fxmanifest.lua and do not add section markers.

2. Resource bundle. Otherwise, produce a complete resource: an fxmanifest.lua followed by every Lua file it references. Each file must be wrapped in a begin marker and a matching end marker naming the file, for example:

-- fxmanifest.lua --
fx_version 'cerulean'
game 'gta5'
author '{{manifestAuthor}}'
description 'Description of the script'
version '1.0.0'

client_scripts {
  'client.lua'
}

server_scripts {
  'server.lua'
}
-- end fxmanifest.lua --

-- client.lua --
-- Client-side Lua code here
-- end client.lua --

-- server.lua --
-- Server-side Lua code here
-- end server.lua --

The author field of fxmanifest.lua must always be '{{manifestAuthor}}', whatever the prompt says. Only list the script files you actually produce.

Ensure the script is well-structured, efficient, and includes necessary comments. The response must be a single string containing all sections, in order, with their markers. Make the code relevant to the user's prompt rather than repeating this example structure.
"#;
