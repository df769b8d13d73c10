//! 描述校验模块
//!
//! 校验规则：
//! - 合约名非空且唯一
//! - 父合约存在且不重复声明
//! - 方法名非空且在合约内唯一
//! - 参数名非空且在方法内唯一
//! - 引用类型 (enum / other) 的 path 非空
//!
//! Rust 标识符合法性与继承环由 codegen 在生成时检查。

use std::collections::HashSet;

use contracts::{ContractDescriptor, ContractSet, ParamType};

use crate::error::ConfigError;

/// 校验 ContractSet
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(set: &ContractSet) -> Result<(), ConfigError> {
    validate_contract_names(set)?;
    validate_parents(set)?;
    for contract in &set.contracts {
        validate_methods(contract)?;
    }
    Ok(())
}

/// 校验合约名非空且唯一
fn validate_contract_names(set: &ContractSet) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for (index, contract) in set.contracts.iter().enumerate() {
        if contract.name.trim().is_empty() {
            return Err(ConfigError::validation(
                format!("contracts[{index}].name"),
                "contract name is empty",
            ));
        }
        if !seen.insert(&contract.name) {
            return Err(ConfigError::validation(
                format!("contracts[name={}]", contract.name),
                "duplicate contract name",
            ));
        }
    }
    Ok(())
}

/// 校验父合约引用
fn validate_parents(set: &ContractSet) -> Result<(), ConfigError> {
    for contract in &set.contracts {
        let mut seen = HashSet::new();
        for parent in &contract.parents {
            if set.get(parent).is_none() {
                return Err(ConfigError::validation(
                    format!("contracts[{}].parents", contract.name),
                    format!("unknown parent contract '{parent}'"),
                ));
            }
            if !seen.insert(parent) {
                return Err(ConfigError::validation(
                    format!("contracts[{}].parents", contract.name),
                    format!("duplicate parent '{parent}'"),
                ));
            }
        }
    }
    Ok(())
}

/// 校验方法与参数
fn validate_methods(contract: &ContractDescriptor) -> Result<(), ConfigError> {
    let mut methods = HashSet::new();
    for method in &contract.methods {
        if method.name.trim().is_empty() {
            return Err(ConfigError::validation(
                format!("contracts[{}].methods", contract.name),
                "method name is empty",
            ));
        }
        if !methods.insert(&method.name) {
            return Err(ConfigError::validation(
                format!("contracts[{}].methods[name={}]", contract.name, method.name),
                "duplicate method name",
            ));
        }

        let mut params = HashSet::new();
        for param in &method.params {
            let field = format!(
                "contracts[{}].methods[{}].params[name={}]",
                contract.name, method.name, param.name
            );
            if param.name.trim().is_empty() {
                return Err(ConfigError::validation(field, "parameter name is empty"));
            }
            if !params.insert(&param.name) {
                return Err(ConfigError::validation(field, "duplicate parameter name"));
            }
            if let ParamType::Enum { path } | ParamType::Other { path } = &param.ty {
                if path.trim().is_empty() {
                    return Err(ConfigError::validation(field, "type path is empty"));
                }
            }
        }
    }
    Ok(())
}
