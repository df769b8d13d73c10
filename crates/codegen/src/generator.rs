//! Generator - emits the adapter source for a set of contracts
//!
//! For each contract with qualified name `a.b.Bar` the output contains:
//! - `trait Bar`, extending the parent traits
//! - `BarEmitter`, implementing `Bar` and every ancestor trait
//! - decode-and-invoke functions and a static `DispatchTable<dyn Bar>`
//! - `type BarDispatcher = ContractDispatcher<dyn Bar>`
//! - `impl Contract for dyn Bar`
//!
//! plus one `register_adapters` function for the whole unit.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use contracts::{ContractDescriptor, MarshalHint, ParamType, RESERVED_PREFIX};
use proc_macro2::{Ident, Span, TokenStream};
use quote::{format_ident, quote};
use tracing::{debug, info};

use crate::error::GenerationError;
use crate::inspector::{IllegalParameter, InspectedParam, Inspector};
use crate::model::{lookup, ContractMethod, ContractModel, ContractParam};
use crate::naming;

/// Header of every generated file
pub const GENERATED_HEADER: &str =
    "// @generated by channel codegen. Do not edit; regenerate from the contract descriptors.\n";

/// Default crate generated code refers to
pub const DEFAULT_RUNTIME_CRATE: &str = "dispatcher";

/// Adapter generator
pub struct Generator {
    inspector: Option<Box<dyn Inspector>>,
    runtime_crate: String,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    pub fn new() -> Self {
        Self {
            inspector: None,
            runtime_crate: DEFAULT_RUNTIME_CRATE.to_string(),
        }
    }

    /// Vet every parameter with `inspector` before emitting
    pub fn with_inspector(mut self, inspector: impl Inspector + 'static) -> Self {
        self.inspector = Some(Box::new(inspector));
        self
    }

    /// Crate path generated code uses for runtime types (`crate` allowed)
    pub fn runtime_crate(mut self, name: impl Into<String>) -> Self {
        self.runtime_crate = name.into();
        self
    }

    /// Generate adapters for every contract in `contracts`
    ///
    /// # Errors
    /// Any [`GenerationError`]; nothing is emitted on failure
    pub fn generate(
        &self,
        contracts: &[ContractDescriptor],
    ) -> Result<GeneratedUnit, GenerationError> {
        let names: Vec<&str> = contracts.iter().map(|c| c.name.as_str()).collect();
        self.generate_selected(contracts, &names)
    }

    /// Generate adapters for the `selected` contracts only
    ///
    /// Ancestor traits of selected contracts are still declared.
    ///
    /// # Errors
    /// - `UnknownContract` for a selected name missing from `contracts`
    /// - Any other [`GenerationError`]
    pub fn generate_selected(
        &self,
        contracts: &[ContractDescriptor],
        selected: &[&str],
    ) -> Result<GeneratedUnit, GenerationError> {
        check_unique_names(contracts)?;

        let mut models = Vec::with_capacity(selected.len());
        for name in selected {
            if models.iter().any(|m: &ContractModel| m.name == *name) {
                continue;
            }
            models.push(ContractModel::derive(name, contracts)?);
        }

        // Every contract needing a trait, in catalog order
        let needed: HashSet<&str> = models
            .iter()
            .flat_map(|m| m.ancestry.iter().map(String::as_str))
            .collect();
        let declared: Vec<&ContractDescriptor> = contracts
            .iter()
            .filter(|c| needed.contains(c.name.as_str()))
            .collect();

        let names = ItemNames::assign(&declared, &models)?;
        for contract in &declared {
            validate_contract(contract)?;
        }
        self.inspect(&declared)?;

        let rt = runtime_path(&self.runtime_crate)?;
        let mut tokens = TokenStream::new();

        for contract in &declared {
            tokens.extend(emit_trait(contract, &names)?);
        }

        let mut generated = Vec::with_capacity(models.len());
        for model in models {
            tokens.extend(emit_adapters(&model, contracts, &names, &rt)?);

            let trait_name = names.trait_name(&model.name).to_string();
            debug!(contract = %model.name, methods = model.len(), "Generated adapters");
            generated.push(GeneratedContract {
                emitter_name: naming::emitter_name(&trait_name),
                dispatcher_name: naming::dispatcher_name(&trait_name),
                trait_name,
                model,
            });
        }

        tokens.extend(emit_register(&generated, &rt));

        info!(
            contracts = generated.len(),
            traits = declared.len(),
            "Generation complete"
        );

        Ok(GeneratedUnit {
            tokens,
            contracts: generated,
        })
    }

    /// Run the inspector over every parameter, collecting all violations
    fn inspect(&self, declared: &[&ContractDescriptor]) -> Result<(), GenerationError> {
        let Some(inspector) = &self.inspector else {
            return Ok(());
        };

        let mut illegal = Vec::new();
        for contract in declared {
            for method in &contract.methods {
                for param in &method.params {
                    let inspected = InspectedParam {
                        contract: &contract.name,
                        method: &method.name,
                        name: &param.name,
                        ty: &param.ty,
                        marshal: param.marshal,
                        optional: param.optional,
                    };
                    if inspector.is_illegal(&inspected) {
                        illegal.push(IllegalParameter::from_inspected(&inspected));
                    }
                }
            }
        }

        if illegal.is_empty() {
            Ok(())
        } else {
            Err(GenerationError::IllegalParameters(illegal))
        }
    }
}

/// Generated source for one unit
#[derive(Debug, Clone)]
pub struct GeneratedUnit {
    tokens: TokenStream,
    contracts: Vec<GeneratedContract>,
}

impl GeneratedUnit {
    pub fn tokens(&self) -> &TokenStream {
        &self.tokens
    }

    /// Contracts that received adapters
    pub fn contracts(&self) -> &[GeneratedContract] {
        &self.contracts
    }

    /// Source text, suitable for `include!`
    pub fn to_source(&self) -> String {
        format!("{GENERATED_HEADER}\n{}\n", self.tokens)
    }

    /// Write the source to `path`
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        fs::write(path, self.to_source())
    }
}

/// Names generated for one contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedContract {
    pub model: ContractModel,
    pub trait_name: String,
    pub emitter_name: String,
    pub dispatcher_name: String,
}

fn check_unique_names(contracts: &[ContractDescriptor]) -> Result<(), GenerationError> {
    let mut seen = HashSet::new();
    for contract in contracts {
        if !seen.insert(contract.name.as_str()) {
            return Err(GenerationError::DuplicateContract {
                name: contract.name.clone(),
            });
        }
    }
    Ok(())
}

/// Trait names of declared contracts, checked for collisions
struct ItemNames {
    traits: HashMap<String, String>,
}

impl ItemNames {
    fn assign(
        declared: &[&ContractDescriptor],
        models: &[ContractModel],
    ) -> Result<Self, GenerationError> {
        let mut traits = HashMap::new();
        // item name -> owning contract
        let mut items: HashMap<String, String> = HashMap::new();
        let mut claim = |ident: String, owner: &str| match items.get(&ident) {
            Some(first) => Err(GenerationError::DuplicateTypeName {
                ident,
                first: first.clone(),
                second: owner.to_string(),
            }),
            None => {
                items.insert(ident, owner.to_string());
                Ok(())
            }
        };

        for contract in declared {
            let trait_name = contract.simple_name();
            if !naming::is_type_ident(trait_name) {
                return Err(GenerationError::InvalidIdentifier {
                    contract: contract.name.clone(),
                    name: trait_name.to_string(),
                });
            }
            claim(trait_name.to_string(), &contract.name)?;
            traits.insert(contract.name.clone(), trait_name.to_string());
        }

        for model in models {
            let trait_name = descriptor_simple_name(&model.name);
            claim(naming::emitter_name(trait_name), &model.name)?;
            claim(naming::dispatcher_name(trait_name), &model.name)?;
            // Case folded, so distinct trait names can still meet here
            claim(naming::table_name(trait_name), &model.name)?;
            claim(naming::invoker_prefix(trait_name), &model.name)?;
        }

        Ok(Self { traits })
    }

    fn trait_name<'a>(&'a self, contract: &'a str) -> &'a str {
        self.traits
            .get(contract)
            .map(String::as_str)
            .unwrap_or_else(|| descriptor_simple_name(contract))
    }

    fn trait_ident(&self, contract: &str) -> Ident {
        Ident::new(self.trait_name(contract), Span::call_site())
    }
}

fn descriptor_simple_name(qualified: &str) -> &str {
    contracts::simple_name(qualified)
}

/// Per-contract checks on methods and parameters
fn validate_contract(contract: &ContractDescriptor) -> Result<(), GenerationError> {
    let mut methods = HashSet::new();

    for method in &contract.methods {
        if !methods.insert(method.name.as_str()) {
            return Err(GenerationError::DuplicateMethod {
                contract: contract.name.clone(),
                method: method.name.clone(),
            });
        }
        if naming::ident(&naming::to_snake_case(&method.name)).is_none() {
            return Err(GenerationError::InvalidIdentifier {
                contract: contract.name.clone(),
                name: method.name.clone(),
            });
        }

        let mut idents = HashSet::new();
        for param in &method.params {
            let err_fields = || {
                (
                    contract.name.clone(),
                    method.name.clone(),
                    param.name.clone(),
                )
            };

            if param.name.starts_with(RESERVED_PREFIX) {
                let (contract, method, param) = err_fields();
                return Err(GenerationError::ReservedParamName {
                    contract,
                    method,
                    param,
                });
            }

            let ident = naming::to_snake_case(&param.name);
            if naming::ident(&ident).is_none() {
                return Err(GenerationError::InvalidIdentifier {
                    contract: contract.name.clone(),
                    name: param.name.clone(),
                });
            }
            if !idents.insert(ident) {
                let (contract, method, param) = err_fields();
                return Err(GenerationError::DuplicateParam {
                    contract,
                    method,
                    param,
                });
            }

            if let Some(path) = param.ty.path() {
                let valid = match &param.ty {
                    ParamType::Enum { .. } => syn::parse_str::<syn::Path>(path).is_ok(),
                    _ => syn::parse_str::<syn::Type>(path).is_ok(),
                };
                if !valid {
                    let (contract, method, param) = err_fields();
                    return Err(GenerationError::InvalidTypePath {
                        contract,
                        method,
                        param,
                        path: path.to_string(),
                    });
                }
            }

            if param.marshal == MarshalHint::ByOrdinal {
                if !param.ty.is_enum() {
                    let (contract, method, name) = err_fields();
                    return Err(GenerationError::OrdinalOnNonEnum {
                        contract,
                        method,
                        param: name,
                        ty: param.ty.to_string(),
                    });
                }
                if param.optional {
                    let (contract, method, param) = err_fields();
                    return Err(GenerationError::OptionalOrdinal {
                        contract,
                        method,
                        param,
                    });
                }
            }
        }
    }
    Ok(())
}

/// `::dispatcher`, or `crate` when generating into the runtime crate itself
fn runtime_path(name: &str) -> Result<TokenStream, GenerationError> {
    if name == "crate" {
        return Ok(quote! { crate });
    }
    let normalized = name.replace('-', "_");
    let ident = syn::parse_str::<Ident>(&normalized).map_err(|_| {
        GenerationError::InvalidIdentifier {
            contract: String::new(),
            name: name.to_string(),
        }
    })?;
    Ok(quote! { ::#ident })
}

fn ident_of(name: &str) -> Ident {
    // Names are validated before emission
    naming::ident(name).unwrap_or_else(|| format_ident!("__invalid"))
}

fn doc_attr(doc: Option<&str>) -> TokenStream {
    match doc {
        Some(doc) => {
            let lines = doc.lines().map(|l| format!(" {}", l.trim_end()));
            quote! { #(#[doc = #lines])* }
        }
        None => TokenStream::new(),
    }
}

/// Rust type of a parameter
fn param_type(param: &ContractParam) -> TokenStream {
    let base = match &param.ty {
        ParamType::Byte => quote! { i8 },
        ParamType::Short => quote! { i16 },
        ParamType::Int => quote! { i32 },
        ParamType::Long => quote! { i64 },
        ParamType::Float => quote! { f32 },
        ParamType::Double => quote! { f64 },
        ParamType::Boolean => quote! { bool },
        ParamType::String => quote! { ::std::string::String },
        ParamType::Enum { path } | ParamType::Other { path } => {
            syn::parse_str::<syn::Type>(path)
                .map(|ty| quote! { #ty })
                .unwrap_or_default()
        }
    };
    if param.optional {
        quote! { ::std::option::Option<#base> }
    } else {
        base
    }
}

fn method_params(method: &ContractMethod) -> (Vec<Ident>, Vec<TokenStream>) {
    method
        .params
        .iter()
        .map(|p| (ident_of(&p.ident), param_type(p)))
        .unzip()
}

/// `pub trait Bar: Foo + Send + Sync { .. }`
fn emit_trait(
    contract: &ContractDescriptor,
    names: &ItemNames,
) -> Result<TokenStream, GenerationError> {
    let trait_ident = names.trait_ident(&contract.name);
    let parents = contract.parents.iter().map(|p| names.trait_ident(p));
    let doc = doc_attr(contract.doc.as_deref());

    // Own methods only, ids are irrelevant here
    let own = own_methods(contract);
    let methods = own.iter().map(|method| {
        let ident = ident_of(&method.ident);
        let (params, types) = method_params(method);
        let doc = doc_attr(method.doc.as_deref());
        quote! {
            #doc
            fn #ident(&self #(, #params: #types)*);
        }
    });

    Ok(quote! {
        #doc
        pub trait #trait_ident: #(#parents +)* ::std::marker::Send + ::std::marker::Sync {
            #(#methods)*
        }
    })
}

fn own_methods(contract: &ContractDescriptor) -> Vec<ContractMethod> {
    contract
        .methods
        .iter()
        .map(|m| ContractMethod {
            id: 0,
            declared_in: contract.name.clone(),
            name: m.name.clone(),
            ident: naming::to_snake_case(&m.name),
            params: m
                .params
                .iter()
                .map(|p| ContractParam {
                    name: p.name.clone(),
                    ident: naming::to_snake_case(&p.name),
                    ty: p.ty.clone(),
                    marshal: p.marshal,
                    optional: p.optional,
                })
                .collect(),
            doc: m.doc.clone(),
        })
        .collect()
}

/// Emitter, invokers, table, dispatcher alias and `Contract` impl
fn emit_adapters(
    model: &ContractModel,
    catalog: &[ContractDescriptor],
    names: &ItemNames,
    rt: &TokenStream,
) -> Result<TokenStream, GenerationError> {
    let qualified = model.name.as_str();
    let trait_name = names.trait_name(qualified);
    let trait_ident = names.trait_ident(qualified);
    let emitter_ident = format_ident!("{}", naming::emitter_name(trait_name));
    let dispatcher_ident = format_ident!("{}", naming::dispatcher_name(trait_name));
    let table_ident = format_ident!("{}", naming::table_name(trait_name));

    // Emitter: one impl per distinct contract in the ancestry
    let mut emitter_impls = Vec::with_capacity(model.ancestry.len());
    for contract_name in &model.ancestry {
        let contract = lookup(catalog, contract_name)
            .ok_or_else(|| GenerationError::unknown_contract(contract_name))?;
        let impl_trait = names.trait_ident(contract_name);

        let methods = own_methods(contract).into_iter().map(|method| {
            let id = model.first_id(contract_name, &method.name).unwrap_or_default();
            emit_emitter_method(&method, id, rt)
        });

        emitter_impls.push(quote! {
            impl #impl_trait for #emitter_ident {
                #(#methods)*
            }
        });
    }

    // Dispatcher: one invoker per method id
    let invokers = model.methods.iter().map(|method| {
        let declaring = names.trait_ident(&method.declared_in);
        let invoke_ident = format_ident!("{}", naming::invoker_name(trait_name, method.id));
        let method_ident = ident_of(&method.ident);
        let (params, types) = method_params(method);
        let decodes = method.params.iter().zip(params.iter()).zip(types.iter()).map(
            |((param, ident), ty)| {
                let key = &param.name;
                let call = match (param.marshal, param.optional) {
                    (MarshalHint::ByOrdinal, _) => quote! { decode_ordinal(#key) },
                    (MarshalHint::ByValue, true) => quote! { decode_optional(#key) },
                    (MarshalHint::ByValue, false) => quote! { decode(#key) },
                };
                quote! { let #ident: #ty = __payload.#call?; }
            },
        );

        quote! {
            #[allow(unused_variables)]
            fn #invoke_ident(
                __receiver: &(dyn #trait_ident + 'static),
                __payload: &#rt::Payload,
            ) -> ::std::result::Result<(), #rt::DecodeError> {
                #(#decodes)*
                <dyn #trait_ident as #declaring>::#method_ident(__receiver #(, #params)*);
                ::std::result::Result::Ok(())
            }
        }
    });

    let entries = model.methods.iter().map(|method| {
        let name = &method.name;
        let invoke_ident = format_ident!("{}", naming::invoker_name(trait_name, method.id));
        quote! { #rt::MethodEntry::new(#name, #invoke_ident) }
    });

    let emitter_doc =
        format!(" Emitter of `{qualified}`: encodes each call and sends it to a sink.");
    let dispatcher_doc =
        format!(" Dispatcher of `{qualified}`, holding its receiver weakly.");

    Ok(quote! {
        #[doc = #emitter_doc]
        pub struct #emitter_ident {
            emitter: #rt::PayloadEmitter,
        }

        impl #emitter_ident {
            pub fn new(sink: ::std::boxed::Box<dyn #rt::Sink>) -> Self {
                Self {
                    emitter: #rt::PayloadEmitter::new(#qualified, sink),
                }
            }
        }

        #(#emitter_impls)*

        #(#invokers)*

        static #table_ident: #rt::DispatchTable<dyn #trait_ident> =
            #rt::DispatchTable::new(#qualified, &[#(#entries),*]);

        #[doc = #dispatcher_doc]
        pub type #dispatcher_ident = #rt::ContractDispatcher<dyn #trait_ident>;

        impl #rt::Contract for dyn #trait_ident {
            const QUALIFIED_NAME: &'static str = #qualified;

            fn dispatch_table() -> &'static #rt::DispatchTable<Self> {
                &#table_ident
            }

            fn emitter(sink: ::std::boxed::Box<dyn #rt::Sink>) -> ::std::boxed::Box<Self> {
                ::std::boxed::Box::new(#emitter_ident::new(sink))
            }
        }
    })
}

fn emit_emitter_method(method: &ContractMethod, id: u32, rt: &TokenStream) -> TokenStream {
    let ident = ident_of(&method.ident);
    let (params, types) = method_params(method);
    let capacity = method.params.len() + 2;

    let encodes = method.params.iter().zip(params.iter()).map(|(param, ident)| {
        let key = &param.name;
        match param.marshal {
            MarshalHint::ByOrdinal => quote! { __payload.encode_ordinal(#key, #ident); },
            MarshalHint::ByValue => quote! { __payload.encode(#key, #ident); },
        }
    });

    let binding = if method.params.is_empty() {
        quote! { let __payload = #rt::Payload::with_capacity(#capacity); }
    } else {
        quote! { let mut __payload = #rt::Payload::with_capacity(#capacity); }
    };

    quote! {
        fn #ident(&self #(, #params: #types)*) {
            #binding
            #(#encodes)*
            self.emitter.emit(#id, __payload);
        }
    }
}

/// `pub fn register_adapters(registry) -> Result<(), LookupError>`
fn emit_register(generated: &[GeneratedContract], rt: &TokenStream) -> TokenStream {
    let registrations = generated.iter().map(|c| {
        let trait_ident = Ident::new(&c.trait_name, Span::call_site());
        quote! { registry.register::<dyn #trait_ident>()?; }
    });

    quote! {
        /// Register every generated contract of this unit
        pub fn register_adapters(
            registry: &mut #rt::AdapterRegistry,
        ) -> ::std::result::Result<(), #rt::LookupError> {
            #(#registrations)*
            ::std::result::Result::Ok(())
        }
    }
}
