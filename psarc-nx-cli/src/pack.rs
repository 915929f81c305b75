use std::path::Path;

use anyhow::Context;
use psarc_nx_core::Archive;

/// Pack the files directly inside `input` into a sibling `.psarc`.
pub fn pack(input: &Path) -> anyhow::Result<()> {
    let mut archive = Archive::new();
    archive
        .fill(input)
        .with_context(|| format!("Failed to get files from directory at {}", input.display()))?;
    println!("Packing {} files from {}", archive.len(), input.display());

    let output_path = archive
        .save(input)
        .with_context(|| format!("Failed to save archive for {}", input.display()))?;
    println!("Output file: {}", output_path.display());

    Ok(())
}
