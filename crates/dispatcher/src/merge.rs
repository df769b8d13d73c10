//! Composition of dispatchers
//!
//! Several contracts share one payload stream; a composite tries each
//! member in order and stops at the first that consumes the payload.

use std::fmt;

use contracts::{DecodeError, DispatchTarget, Payload};
use tracing::trace;

/// Ordered group of dispatch targets acting as one
pub struct CompositeDispatcher {
    members: Vec<Box<dyn DispatchTarget>>,
}

/// Combine `primary` and `others` into one target
///
/// Members are tried in the given order, `primary` first.
pub fn merge(
    primary: Box<dyn DispatchTarget>,
    others: impl IntoIterator<Item = Box<dyn DispatchTarget>>,
) -> CompositeDispatcher {
    let mut members = vec![primary];
    members.extend(others);
    CompositeDispatcher { members }
}

impl CompositeDispatcher {
    /// Append a member, tried after the existing ones
    pub fn push(&mut self, member: Box<dyn DispatchTarget>) {
        self.members.push(member);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl DispatchTarget for CompositeDispatcher {
    fn matches(&self, payload: &Payload) -> bool {
        self.members.iter().any(|m| m.matches(payload))
    }

    fn dispatch(&self, payload: &Payload) -> Result<bool, DecodeError> {
        for (index, member) in self.members.iter().enumerate() {
            if member.dispatch(payload)? {
                trace!(member = index, "Payload consumed");
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl fmt::Debug for CompositeDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeDispatcher")
            .field("members", &self.members.len())
            .finish()
    }
}
