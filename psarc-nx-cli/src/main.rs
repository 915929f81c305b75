use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use psarc_nx_core::spec;
use tracing_subscriber::EnvFilter;

mod pack;
mod unpack;

const BANNER: &str = "\
PSARC-NX tool by Gamma/Sage of Mirrors.
Provides packing and unpacking utilities for GUST's Nintendo Switch resource archives.
(They have the .psarc extension, but they are not Sony PSARC archives.)

Unpack an archive into a directory:  psarc-nx path/to/archive.psarc
Pack a directory into an archive:    psarc-nx path/to/directory";

#[derive(Debug, Parser)]
#[command(version, about = BANNER, long_about = None, disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Archives to unpack or directories to pack
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "PATH")]
    paths: Vec<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    // exit status is always 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            println!("{e}");
            return;
        }
    };
    if cli.paths.is_empty() {
        let _ = Cli::command().print_help();
        return;
    }

    for path in &cli.paths {
        if !path.exists() {
            tracing::debug!("Skipping missing path {}", path.display());
            continue;
        }

        if path.is_file() {
            if !path.extension().is_some_and(|ext| ext == spec::EXTENSION) {
                continue;
            }
            if let Err(e) = unpack::unpack(path) {
                println!("{:#}", e);
            }
        } else if path.is_dir() {
            if let Err(e) = pack::pack(path) {
                println!("{:#}", e);
            }
        }
    }
}
