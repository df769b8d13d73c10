//! Adapter lookup
//!
//! Generated code implements [`Contract`] for every `dyn Trait` it emits and
//! a `register_adapters` hook that fills an [`AdapterRegistry`]. Callers
//! then obtain adapters either statically (`new_emitter::<dyn Bar>`) or by
//! qualified name at runtime.

use std::any::{type_name, Any};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use contracts::{DispatchTarget, Sink};
use tracing::debug;

use crate::dispatcher::ContractDispatcher;
use crate::error::LookupError;
use crate::table::DispatchTable;

/// A generated contract, implemented for its trait object type
pub trait Contract: Send + Sync + 'static {
    /// Qualified name, also the `__class_name` discriminator
    const QUALIFIED_NAME: &'static str;

    /// Flattened routing table
    fn dispatch_table() -> &'static DispatchTable<Self>;

    /// Generated emitter bound to `sink`
    fn emitter(sink: Box<dyn Sink>) -> Box<Self>;
}

/// Emitter of contract `C` over `sink`
pub fn new_emitter<C: Contract + ?Sized>(sink: Box<dyn Sink>) -> Box<C> {
    C::emitter(sink)
}

/// Dispatcher of contract `C` holding `receiver` weakly
pub fn new_dispatcher<C: Contract + ?Sized>(receiver: &Arc<C>) -> ContractDispatcher<C> {
    ContractDispatcher::new(receiver)
}

struct Factories<C: ?Sized + 'static> {
    emitter: fn(Box<dyn Sink>) -> Box<C>,
    dispatcher: fn(&Arc<C>) -> ContractDispatcher<C>,
}

struct Registration {
    type_name: &'static str,
    factories: Box<dyn Any + Send + Sync>,
}

/// Adapters of generated contracts, keyed by qualified name
#[derive(Default)]
pub struct AdapterRegistry {
    entries: BTreeMap<&'static str, Registration>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the adapters of contract `C`
    ///
    /// # Errors
    /// - `DuplicateRegistration` when the qualified name is already taken
    pub fn register<C: Contract + ?Sized>(&mut self) -> Result<(), LookupError> {
        let name = C::QUALIFIED_NAME;
        if self.entries.contains_key(name) {
            return Err(LookupError::DuplicateRegistration {
                contract: name.to_string(),
            });
        }

        let factories: Factories<C> = Factories {
            emitter: C::emitter,
            dispatcher: ContractDispatcher::<C>::new,
        };
        self.entries.insert(
            name,
            Registration {
                type_name: type_name::<C>(),
                factories: Box::new(factories),
            },
        );

        debug!(contract = name, "Adapters registered");
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered qualified names, sorted
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Emitter for the contract registered as `name`
    ///
    /// # Errors
    /// - `NotRegistered` for unknown names
    /// - `ArgumentMismatch` when `name` was generated for another trait than `C`
    pub fn new_emitter<C: Contract + ?Sized>(
        &self,
        name: &str,
        sink: Box<dyn Sink>,
    ) -> Result<Box<C>, LookupError> {
        let factories = self.factories::<C>(name)?;
        Ok((factories.emitter)(sink))
    }

    /// Dispatcher for the contract registered as `name`, holding `receiver` weakly
    ///
    /// # Errors
    /// Same as [`AdapterRegistry::new_emitter`]
    pub fn new_dispatcher<C: Contract + ?Sized>(
        &self,
        name: &str,
        receiver: &Arc<C>,
    ) -> Result<Box<dyn DispatchTarget>, LookupError> {
        let factories = self.factories::<C>(name)?;
        Ok(Box::new((factories.dispatcher)(receiver)))
    }

    fn factories<C: Contract + ?Sized>(&self, name: &str) -> Result<&Factories<C>, LookupError> {
        let registration = self
            .entries
            .get(name)
            .ok_or_else(|| LookupError::not_registered(name))?;

        registration
            .factories
            .downcast_ref::<Factories<C>>()
            .ok_or_else(|| LookupError::ArgumentMismatch {
                contract: name.to_string(),
                requested: type_name::<C>(),
                registered: registration.type_name,
            })
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("contracts", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
