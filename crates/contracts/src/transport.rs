//! Transport capabilities
//!
//! The two minimal seams an external transport implements. The core never
//! depends on how a payload physically reaches the other side.

use std::sync::Arc;

use crate::{DecodeError, Payload};

/// Send-only transport capability
///
/// Fire-and-forget hand-off: no return value, no delivery guarantee.
pub trait Sink: Send + Sync {
    fn send(&self, payload: Payload);
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn send(&self, payload: Payload) {
        (**self).send(payload)
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn send(&self, payload: Payload) {
        (**self).send(payload)
    }
}

/// Sink backed by a closure
pub struct FnSink<F>(F);

impl<F> Sink for FnSink<F>
where
    F: Fn(Payload) + Send + Sync,
{
    fn send(&self, payload: Payload) {
        (self.0)(payload)
    }
}

/// Wrap a closure as a [`Sink`]
pub fn sink_fn<F>(f: F) -> FnSink<F>
where
    F: Fn(Payload) + Send + Sync,
{
    FnSink(f)
}

/// Receiving side capability
pub trait DispatchTarget: Send + Sync {
    /// Discriminator-only check, parameters are not decoded
    fn matches(&self, payload: &Payload) -> bool;

    /// Consume the payload
    ///
    /// Returns `Ok(false)` when the payload is not for this target or the
    /// receiver is gone.
    ///
    /// # Errors
    /// Malformed payload for a matching target
    fn dispatch(&self, payload: &Payload) -> Result<bool, DecodeError>;
}

impl<T: DispatchTarget + ?Sized> DispatchTarget for Arc<T> {
    fn matches(&self, payload: &Payload) -> bool {
        (**self).matches(payload)
    }

    fn dispatch(&self, payload: &Payload) -> Result<bool, DecodeError> {
        (**self).dispatch(payload)
    }
}

impl<T: DispatchTarget + ?Sized> DispatchTarget for Box<T> {
    fn matches(&self, payload: &Payload) -> bool {
        (**self).matches(payload)
    }

    fn dispatch(&self, payload: &Payload) -> Result<bool, DecodeError> {
        (**self).dispatch(payload)
    }
}
