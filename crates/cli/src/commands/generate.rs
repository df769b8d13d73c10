//! `generate` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use super::{build_generator, generate_unit, load_contracts};
use crate::cli::GenerateArgs;

/// Execute the `generate` command
pub async fn run_generate(args: &GenerateArgs) -> Result<()> {
    info!(contracts = %args.contracts.display(), "Generating adapters");

    let set = load_contracts(&args.contracts)?;
    let generator = build_generator(args.inspector, &args.runtime_crate);
    let unit = generate_unit(&set, &args.only, &generator)?;
    let source = unit.to_source();

    match &args.out {
        Some(path) => {
            tokio::fs::write(path, &source)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(
                out = %path.display(),
                contracts = unit.contracts().len(),
                bytes = source.len(),
                "Adapters written"
            );
        }
        None => print!("{source}"),
    }

    Ok(())
}
