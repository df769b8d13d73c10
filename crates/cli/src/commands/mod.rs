//! Command implementations.

mod generate;
mod info;
mod validate;

pub use generate::run_generate;
pub use info::run_info;
pub use validate::run_validate;

use std::path::Path;

use codegen::{GeneratedUnit, Generator, WireTypeInspector};
use contracts::ContractSet;
use tracing::debug;

use crate::cli::InspectorKind;
use crate::error::{CliError, Result};

/// Load and validate a descriptor file
fn load_contracts(path: &Path) -> Result<ContractSet> {
    if !path.exists() {
        return Err(CliError::contracts_not_found(path));
    }
    let set = config_loader::ConfigLoader::load_from_path(path)
        .map_err(|e| CliError::load(path, e))?;
    debug!(path = %path.display(), contracts = set.contracts.len(), "Contracts loaded");
    Ok(set)
}

/// Build a generator for the selected inspector and runtime crate
fn build_generator(inspector: InspectorKind, runtime_crate: &str) -> Generator {
    let generator = Generator::new().runtime_crate(runtime_crate);
    match inspector {
        InspectorKind::None => generator,
        InspectorKind::WireTypes => generator.with_inspector(WireTypeInspector),
    }
}

/// Generate adapters for `only`, or for every contract when empty
fn generate_unit(
    set: &ContractSet,
    only: &[String],
    generator: &Generator,
) -> Result<GeneratedUnit> {
    for name in only {
        if set.get(name).is_none() {
            return Err(CliError::unknown_contract(name));
        }
    }

    let unit = if only.is_empty() {
        generator.generate(&set.contracts)?
    } else {
        let selected: Vec<&str> = only.iter().map(String::as_str).collect();
        generator.generate_selected(&set.contracts, &selected)?
    };
    Ok(unit)
}
