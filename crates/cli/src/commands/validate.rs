//! `validate` command implementation.

use std::collections::HashMap;

use anyhow::{Context, Result};
use codegen::GeneratedUnit;
use serde::Serialize;
use tracing::info;

use super::{build_generator, generate_unit, load_contracts};
use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    contracts_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ContractsSummary>,
}

#[derive(Serialize)]
struct ContractsSummary {
    contract_count: usize,
    method_id_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(contracts = %args.contracts.display(), "Validating contracts");

    let result = validate_contracts(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Contract validation failed")
    }
}

/// Load, validate and dry-run generation
fn validate_contracts(args: &ValidateArgs) -> ValidationResult {
    let contracts_path = args.contracts.display().to_string();

    let unit = load_contracts(&args.contracts).and_then(|set| {
        let generator = build_generator(args.inspector, codegen::DEFAULT_RUNTIME_CRATE);
        generate_unit(&set, &[], &generator)
    });

    match unit {
        Ok(unit) => {
            let warnings = collect_warnings(&unit);
            ValidationResult {
                valid: true,
                contracts_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ContractsSummary {
                    contract_count: unit.contracts().len(),
                    method_id_count: unit.contracts().iter().map(|c| c.model.len()).sum(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            contracts_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect non-fatal issues
fn collect_warnings(unit: &GeneratedUnit) -> Vec<String> {
    let mut warnings = Vec::new();

    for contract in unit.contracts() {
        let model = &contract.model;
        if model.is_empty() {
            warnings.push(format!(
                "Contract '{}' has no methods; its dispatcher never delivers",
                model.name
            ));
        }

        // Methods reachable through more than one parent get several ids
        let mut ids: HashMap<(&str, &str), Vec<u32>> = HashMap::new();
        for method in &model.methods {
            ids.entry((method.declared_in.as_str(), method.name.as_str()))
                .or_default()
                .push(method.id);
        }
        let mut repeated: Vec<_> = ids.into_iter().filter(|(_, v)| v.len() > 1).collect();
        repeated.sort_by_key(|(_, v)| v[0]);
        for ((declared_in, name), ids) in repeated {
            warnings.push(format!(
                "{}: {}.{} is inherited more than once (ids {:?}), emitters use id {}",
                model.name, declared_in, name, ids, ids[0]
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Contracts are valid: {}", result.contracts_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Contracts: {}", summary.contract_count);
            println!("  Method ids: {}", summary.method_id_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Contracts are invalid: {}", result.contracts_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::cli::InspectorKind;

    const DIAMOND_TOML: &str = r#"
[[contracts]]
name = "demo.Base"
[[contracts.methods]]
name = "ping"

[[contracts]]
name = "demo.Left"
parents = ["demo.Base"]

[[contracts]]
name = "demo.Right"
parents = ["demo.Base"]

[[contracts]]
name = "demo.Diamond"
parents = ["demo.Left", "demo.Right"]
"#;

    fn args(path: &std::path::Path, inspector: InspectorKind) -> ValidateArgs {
        ValidateArgs {
            contracts: path.to_path_buf(),
            inspector,
            json: true,
        }
    }

    #[test]
    fn test_validate_valid_file() {
        let file = descriptor_file(BAR_TOML);
        let result = validate_contracts(&args(file.path(), InspectorKind::None));
        assert!(result.valid);
        let summary = result.summary.unwrap();
        assert_eq!(summary.contract_count, 3);
        // Foo 1 + Bar 3 + Duck 1
        assert_eq!(summary.method_id_count, 5);
        assert!(run_validate(&args(file.path(), InspectorKind::None)).is_ok());
    }

    #[test]
    fn test_validate_inspector_failure() {
        let file = descriptor_file(BAR_TOML);
        let result = validate_contracts(&args(file.path(), InspectorKind::WireTypes));
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("illegal parameters"));
        assert!(run_validate(&args(file.path(), InspectorKind::WireTypes)).is_err());
    }

    #[test]
    fn test_validate_cycle() {
        let file = descriptor_file(
            r#"
[[contracts]]
name = "A"
parents = ["B"]

[[contracts]]
name = "B"
parents = ["A"]
"#,
        );
        let result = validate_contracts(&args(file.path(), InspectorKind::None));
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("inheritance cycle"));
    }

    #[test]
    fn test_diamond_warnings() {
        let file = descriptor_file(DIAMOND_TOML);
        let result = validate_contracts(&args(file.path(), InspectorKind::None));
        assert!(result.valid);
        let warnings = result.warnings.unwrap();
        let expected = "demo.Diamond: demo.Base.ping is inherited more than once (ids [1, 2]), \
                        emitters use id 1";
        assert!(warnings.contains(&expected.to_string()));
        assert!(warnings
            .iter()
            .all(|w| !w.starts_with("Contract 'demo.Diamond'")));
    }
}
