use std::path::Path;

use acl_codec::{Compiler, CompilerConfig};
use acl_core::{Adventure, GameObject, IdAllocator, SupportedVersion, Version};

/// The built-in one-room adventure.
fn sample_adventure() -> Result<Adventure, String> {
    let mut adv = Adventure::new("test", SupportedVersion::or_higher(Version::new(0, 1, 0)))
        .with_starting_text("This is just a test game lol");
    let room = adv.register(GameObject::room_described("Test Room", "Test"));
    adv.set_starting_room(room).map_err(|e| e.to_string())?;
    Ok(adv)
}

pub fn run(output: &Path, compiler_version: Option<&str>) -> Result<(), String> {
    let mut config = CompilerConfig::default();
    if let Some(v) = compiler_version {
        config = config.with_version(Version::parse(v).map_err(|e| e.to_string())?);
    }

    let mut adv = sample_adventure()?;
    let bytes = Compiler::new(config)
        .compile(&mut adv, IdAllocator::global())
        .map_err(|e| e.to_string())?;

    std::fs::write(output, &bytes)
        .map_err(|e| format!("cannot write {}: {e}", output.display()))?;
    tracing::info!(path = %output.display(), bytes = bytes.len(), "wrote artifact");

    println!("  Compiled '{}' successfully.", adv.name);
    println!("  {} records, {} bytes -> {}", adv.object_count(), bytes.len(), output.display());
    Ok(())
}
