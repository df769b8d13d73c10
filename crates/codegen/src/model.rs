//! Contract model - flattened method table of one contract
//!
//! Parents are visited depth-first in declaration order, recursively;
//! parent methods come before own methods. Nothing is de-duplicated, so a
//! method reachable through two parents receives two ids. Ids run 1..=N.

use contracts::{ContractDescriptor, MarshalHint, MethodDescriptor, MethodId, ParamType};

use crate::error::GenerationError;
use crate::naming::to_snake_case;

/// One parameter of a flattened method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractParam {
    /// Wire key
    pub name: String,
    /// Rust identifier (snake_case of `name`)
    pub ident: String,
    pub ty: ParamType,
    pub marshal: MarshalHint,
    pub optional: bool,
}

/// One entry of the flattened method table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractMethod {
    pub id: MethodId,
    /// Qualified name of the contract declaring the method
    pub declared_in: String,
    pub name: String,
    /// Rust identifier (snake_case of `name`)
    pub ident: String,
    pub params: Vec<ContractParam>,
    pub doc: Option<String>,
}

/// Flattened view of one contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractModel {
    /// Qualified name
    pub name: String,
    /// Methods in id order
    pub methods: Vec<ContractMethod>,
    /// Distinct contracts reachable from this one, itself first, in
    /// first-visit order
    pub ancestry: Vec<String>,
}

impl ContractModel {
    /// Flatten contract `name` against `catalog`
    ///
    /// # Errors
    /// - `UnknownContract` for `name` or any ancestor missing from the catalog
    /// - `InheritanceCycle` when a contract is its own ancestor
    pub fn derive(name: &str, catalog: &[ContractDescriptor]) -> Result<Self, GenerationError> {
        let mut walk = Walk {
            catalog,
            stack: Vec::new(),
            methods: Vec::new(),
            ancestry: Vec::new(),
        };
        walk.visit(name)?;

        let methods = walk
            .methods
            .into_iter()
            .enumerate()
            .map(|(index, (declared_in, method))| ContractMethod {
                id: index as MethodId + 1,
                declared_in: declared_in.to_string(),
                name: method.name.clone(),
                ident: to_snake_case(&method.name),
                params: method
                    .params
                    .iter()
                    .map(|p| ContractParam {
                        name: p.name.clone(),
                        ident: to_snake_case(&p.name),
                        ty: p.ty.clone(),
                        marshal: p.marshal,
                        optional: p.optional,
                    })
                    .collect(),
                doc: method.doc.clone(),
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            methods,
            ancestry: walk.ancestry.into_iter().map(str::to_string).collect(),
        })
    }

    /// Number of method ids (N)
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Method with id `id`
    pub fn method(&self, id: MethodId) -> Option<&ContractMethod> {
        let index = usize::try_from(id.checked_sub(1)?).ok()?;
        self.methods.get(index)
    }

    /// Id of the first occurrence of `method` declared in `contract`
    pub fn first_id(&self, contract: &str, method: &str) -> Option<MethodId> {
        self.methods
            .iter()
            .find(|m| m.declared_in == contract && m.name == method)
            .map(|m| m.id)
    }
}

/// Find a contract by qualified name, first declaration wins
pub(crate) fn lookup<'a>(
    catalog: &'a [ContractDescriptor],
    name: &str,
) -> Option<&'a ContractDescriptor> {
    catalog.iter().find(|c| c.name == name)
}

struct Walk<'a> {
    catalog: &'a [ContractDescriptor],
    stack: Vec<&'a str>,
    methods: Vec<(&'a str, &'a MethodDescriptor)>,
    ancestry: Vec<&'a str>,
}

impl<'a> Walk<'a> {
    fn visit(&mut self, name: &str) -> Result<(), GenerationError> {
        let contract =
            lookup(self.catalog, name).ok_or_else(|| GenerationError::unknown_contract(name))?;
        let name = contract.name.as_str();

        if let Some(pos) = self.stack.iter().position(|c| *c == name) {
            let mut path: Vec<String> = self.stack[pos..].iter().map(|c| c.to_string()).collect();
            path.push(name.to_string());
            return Err(GenerationError::InheritanceCycle { path });
        }

        if !self.ancestry.contains(&name) {
            self.ancestry.push(name);
        }

        self.stack.push(name);
        for parent in &contract.parents {
            self.visit(parent)?;
        }
        self.stack.pop();

        self.methods
            .extend(contract.methods.iter().map(|m| (name, m)));
        Ok(())
    }
}
