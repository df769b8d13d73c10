//! `info` command implementation.

use anyhow::{Context, Result};
use codegen::{ContractMethod, GeneratedContract, Generator};
use contracts::{MarshalHint, MethodId};
use serde::Serialize;
use tracing::info;

use super::{generate_unit, load_contracts};
use crate::cli::InfoArgs;

/// Flattened contract for JSON output
#[derive(Debug, Serialize)]
struct ContractInfo {
    name: String,
    trait_name: String,
    emitter: String,
    dispatcher: String,
    ancestry: Vec<String>,
    methods: Vec<MethodInfo>,
}

#[derive(Debug, Serialize)]
struct MethodInfo {
    id: MethodId,
    declared_in: String,
    name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    params: Vec<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(contracts = %args.contracts.display(), "Loading contract info");

    let infos = collect_info(args)?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&infos).context("Failed to serialize contract info")?;
        println!("{}", json);
    } else {
        print_contract_info(&infos);
    }

    Ok(())
}

fn collect_info(args: &InfoArgs) -> Result<Vec<ContractInfo>> {
    let set = load_contracts(&args.contracts)?;
    let only: Vec<String> = args.contract.iter().cloned().collect();
    let unit = generate_unit(&set, &only, &Generator::new())?;
    Ok(unit.contracts().iter().map(contract_info).collect())
}

fn contract_info(contract: &GeneratedContract) -> ContractInfo {
    ContractInfo {
        name: contract.model.name.clone(),
        trait_name: contract.trait_name.clone(),
        emitter: contract.emitter_name.clone(),
        dispatcher: contract.dispatcher_name.clone(),
        ancestry: contract.model.ancestry.clone(),
        methods: contract.model.methods.iter().map(method_info).collect(),
    }
}

fn method_info(method: &ContractMethod) -> MethodInfo {
    MethodInfo {
        id: method.id,
        declared_in: method.declared_in.clone(),
        name: method.name.clone(),
        params: method
            .params
            .iter()
            .map(|p| {
                let mut rendered = format!("{}: {}", p.name, p.ty);
                if p.marshal == MarshalHint::ByOrdinal {
                    rendered.push_str(" (by ordinal)");
                }
                if p.optional {
                    rendered.push_str(" (optional)");
                }
                rendered
            })
            .collect(),
    }
}

fn print_contract_info(infos: &[ContractInfo]) {
    for info in infos {
        println!("📡 {}", info.name);
        println!(
            "   ├─ Adapters: {} / {} / {}",
            info.trait_name, info.emitter, info.dispatcher
        );
        println!("   ├─ Ancestry: {}", info.ancestry.join(" -> "));

        if info.methods.is_empty() {
            println!("   └─ No methods");
        } else {
            println!("   └─ Methods ({})", info.methods.len());
            for (i, method) in info.methods.iter().enumerate() {
                let prefix = if i == info.methods.len() - 1 {
                    "└─"
                } else {
                    "├─"
                };
                println!(
                    "      {} #{} {}({}) [{}]",
                    prefix,
                    method.id,
                    method.name,
                    method.params.join(", "),
                    method.declared_in
                );
            }
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;

    fn args(path: &std::path::Path, contract: Option<&str>) -> InfoArgs {
        InfoArgs {
            contracts: path.to_path_buf(),
            contract: contract.map(str::to_string),
            json: false,
        }
    }

    #[test]
    fn test_collect_flattened_table() {
        let file = descriptor_file(BAR_TOML);
        let infos = collect_info(&args(file.path(), Some("demo.Bar"))).unwrap();
        assert_eq!(infos.len(), 1);

        let bar = &infos[0];
        assert_eq!(bar.trait_name, "Bar");
        assert_eq!(bar.emitter, "BarEmitter");
        assert_eq!(bar.dispatcher, "BarDispatcher");
        assert_eq!(bar.ancestry, vec!["demo.Bar", "demo.Foo"]);

        let table: Vec<(MethodId, &str)> = bar
            .methods
            .iter()
            .map(|m| (m.id, m.name.as_str()))
            .collect();
        assert_eq!(
            table,
            vec![(1, "extendsTest"), (2, "noParam"), (3, "stringParam")]
        );
        assert_eq!(bar.methods[2].params, vec!["aString: string"]);
    }

    #[test]
    fn test_collect_all_contracts() {
        let file = descriptor_file(BAR_TOML);
        let infos = collect_info(&args(file.path(), None)).unwrap();
        let names: Vec<&str> = infos.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["demo.Foo", "demo.Bar", "demo.Duck"]);
    }

    #[test]
    fn test_unknown_contract() {
        let file = descriptor_file(BAR_TOML);
        let err = collect_info(&args(file.path(), Some("demo.Nope"))).unwrap_err();
        assert!(err.to_string().contains("'demo.Nope' is not declared"));
        assert!(run_info(&args(file.path(), Some("demo.Bar"))).is_ok());
    }
}
