use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lkg_core::{collect_directory, generate};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lkg")]
#[command(about = "Merge CI pip-freeze snapshots into constrained requirements files", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory containing the per-job frozen requirements files
    requirements_directory: PathBuf,

    /// Directory to write lkg.txt and lkg-notebook.txt into
    output_directory: PathBuf,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let collector = collect_directory(&cli.requirements_directory).with_context(|| {
        format!(
            "failed to collect requirements from {}",
            cli.requirements_directory.display()
        )
    })?;

    info!(
        test_files = collector.tests.all_file_parts.len(),
        test_packages = collector.tests.reqs.len(),
        notebook_files = collector.notebooks.all_file_parts.len(),
        notebook_packages = collector.notebooks.reqs.len(),
        "collected pinned requirements"
    );

    let test_reqs = generate(&collector.tests)?;
    let notebook_reqs = generate(&collector.notebooks)?;

    for (name, contents) in [("lkg.txt", test_reqs), ("lkg-notebook.txt", notebook_reqs)] {
        let path = cli.output_directory.join(name);
        fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "wrote requirements file");
    }

    Ok(())
}
