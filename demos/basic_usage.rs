use async_trait::async_trait;
use fivem_script_crafter::{
    CapabilityError, CapabilityRequest, Config, LanguageModel, ScriptCrafter,
    ScriptGenerationRequest, SubmitEvent,
};
use serde_json::{Value, json};
use std::sync::Arc;

const SPAWNER_BUNDLE: &str = "-- fxmanifest.lua --
fx_version 'cerulean'
game 'gta5'
author 'Jay Mods'

client_scripts {
  'client.lua'
}
-- end fxmanifest.lua --

-- client.lua --
RegisterCommand('spawncar', function(_, args)
  print('spawning ' .. (args[1] or 'adder'))
end)
-- end client.lua --";

const GUARDED_SCRIPT: &str = "local ok, err = pcall(function() print('hi') end)
if not ok then print(err) end";

/// Stand-in model that answers every request with a fixed script
struct CannedModel;

#[async_trait]
impl LanguageModel for CannedModel {
    async fn generate(&self, request: &CapabilityRequest) -> Result<Value, CapabilityError> {
        match request.operation.as_str() {
            "generateFiveMScript" => Ok(json!({ "code": SPAWNER_BUNDLE })),
            "improveFiveMScript" => Ok(json!({ "improvedScript": GUARDED_SCRIPT })),
            other => Err(CapabilityError::Provider(format!("unknown operation {}", other))),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== FiveM Script Crafter Demo ===\n");

    let crafter = ScriptCrafter::with_config(Arc::new(CannedModel), Config::default())?;
    println!("✓ Created script crafter");

    // 1. Rendered instruction
    println!("\n--- Instruction Preview ---");
    let request = ScriptGenerationRequest::new(
        "Create a script for a simple car spawner with a command /spawncar [carname]",
    );
    let instruction = crafter.operations().generate.render(&request)?;
    println!("{}\n", instruction.lines().take(5).collect::<Vec<_>>().join("\n"));

    // 2. Session flow
    println!("--- Session ---");
    let mut session = crafter.controller();
    crafter.submit(&mut session, SubmitEvent::Generate(request)).await;
    for notification in session.take_notifications() {
        println!("[{:?}] {}: {}", notification.level, notification.title, notification.description);
    }
    println!("{}", session.display_text().unwrap_or("(no result)"));

    // 3. Too-short prompt
    println!("\n--- Validation ---");
    crafter
        .submit(&mut session, SubmitEvent::Generate(ScriptGenerationRequest::new("spawn")))
        .await;
    println!("{}", session.display_text().unwrap_or("(no result)"));
    match crafter.generate_script("spawn").await {
        Ok(_) => println!("Unexpectedly accepted short prompt"),
        Err(e) => println!("Expected error for short prompt: {}", e),
    }

    // 4. Improvement
    println!("\n--- Improvement ---");
    let improved = crafter.improve_script("print('hi')", "add error handling").await?;
    println!("{}", improved.improved_script);

    // 5. Export
    println!("\n--- Export ---");
    crafter
        .submit(
            &mut session,
            SubmitEvent::Generate(ScriptGenerationRequest::new("Create a /spawncar command")),
        )
        .await;
    if let Some(artifact) = session.export() {
        let dir = std::env::temp_dir().join("fivem-script-crafter");
        let path = artifact.write_to(&dir)?;
        println!("Wrote {} ({})", path.display(), artifact.content_type);
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
