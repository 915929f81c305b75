use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use psarc_nx_core::Archive;
use psarc_nx_core::fs::{DumpEvent, DumpOptions};

/// Unpack `input` into the directory next to it named after its stem.
pub fn unpack(input: &Path) -> anyhow::Result<()> {
    let archive = Archive::open(input).with_context(|| format!("Failed to load archive at {}", input.display()))?;

    let bar = ProgressBar::new(archive.len() as u64);
    bar.set_style(ProgressStyle::default_bar().template("{pos}/{len} files written {wide_bar} elapsed: {elapsed}")?);
    bar.enable_steady_tick(Duration::from_millis(100));

    let bar1 = bar.clone();
    let options = DumpOptions::new().on_event(move |event| match event {
        DumpEvent::Start { total } => bar1.set_length(total as u64),
        DumpEvent::FileDone { .. } => bar1.inc(1),
        DumpEvent::Finish { .. } => {}
    });
    let result = archive.dump_with(None, &options);
    bar.finish_and_clear();

    let output_path = result.with_context(|| format!("Failed to dump contents of archive at {}", input.display()))?;
    println!("Output directory: {}", output_path.display());
    println!("Done.");

    Ok(())
}
