//! DispatchTable - per-contract routing table
//!
//! Built once per contract model (a `static` in generated code). Entry `i`
//! holds the decode-and-invoke function of method id `i + 1`.

use std::fmt;

use contracts::{DecodeError, MethodId, Payload};

/// Decodes the parameters of one method and invokes it on the receiver
pub type Invoker<R> = fn(&R, &Payload) -> Result<(), DecodeError>;

/// One routable method
pub struct MethodEntry<R: ?Sized> {
    name: &'static str,
    invoke: fn(&R, &Payload) -> Result<(), DecodeError>,
}

impl<R: ?Sized> MethodEntry<R> {
    pub const fn new(name: &'static str, invoke: Invoker<R>) -> Self {
        Self { name, invoke }
    }

    /// Declared method name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Decode the payload and call the method
    pub fn invoke(&self, receiver: &R, payload: &Payload) -> Result<(), DecodeError> {
        (self.invoke)(receiver, payload)
    }
}

/// Method routing table of one contract
pub struct DispatchTable<R: ?Sized + 'static> {
    contract: &'static str,
    methods: &'static [MethodEntry<R>],
}

impl<R: ?Sized + 'static> DispatchTable<R> {
    pub const fn new(contract: &'static str, methods: &'static [MethodEntry<R>]) -> Self {
        Self { contract, methods }
    }

    /// Qualified name of the bound contract
    pub fn contract(&self) -> &'static str {
        self.contract
    }

    /// Number of method ids (N)
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Entry for `id`, `None` outside 1..=N
    pub fn lookup(&self, id: MethodId) -> Option<&MethodEntry<R>> {
        let index = usize::try_from(id.checked_sub(1)?).ok()?;
        self.methods.get(index)
    }

    /// `(id, name)` pairs in id order
    pub fn methods(&self) -> impl Iterator<Item = (MethodId, &'static str)> + '_ {
        self.methods
            .iter()
            .enumerate()
            .map(|(i, m)| (i as MethodId + 1, m.name))
    }
}

impl<R: ?Sized + 'static> fmt::Debug for DispatchTable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("contract", &self.contract)
            .field("methods", &self.methods.iter().map(|m| m.name).collect::<Vec<_>>())
            .finish()
    }
}
