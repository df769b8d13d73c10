//! ActionPipe - payloads carried inside named actions
//!
//! For hosts whose transport already routes by action name (custom actions,
//! session events): the payload travels as the `data` of an envelope, and
//! the receiving side ignores envelopes of other actions.

use std::fmt;

use contracts::{DecodeError, DispatchTarget, Payload, Sink};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Action name for controller -> session custom actions
pub const CUSTOM_ACTION: &str = "channel.pipe.CUSTOM_ACTION";

/// Action name for session -> controller events
pub const SESSION_EVENT: &str = "channel.pipe.SESSION_EVENT";

/// One routed action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEnvelope {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Payload>,
}

impl ActionEnvelope {
    pub fn new(action: impl Into<String>, data: Payload) -> Self {
        Self {
            action: action.into(),
            data: Some(data),
        }
    }
}

type Forward = Box<dyn Fn(ActionEnvelope) + Send + Sync>;

/// Sending side: wraps each payload in an envelope and forwards it
pub struct ActionSink {
    action: String,
    forward: Forward,
}

impl ActionSink {
    pub fn new<F>(action: impl Into<String>, forward: F) -> Self
    where
        F: Fn(ActionEnvelope) + Send + Sync + 'static,
    {
        Self {
            action: action.into(),
            forward: Box::new(forward),
        }
    }

    /// Sink for [`CUSTOM_ACTION`]
    pub fn custom_action<F>(forward: F) -> Self
    where
        F: Fn(ActionEnvelope) + Send + Sync + 'static,
    {
        Self::new(CUSTOM_ACTION, forward)
    }

    /// Sink for [`SESSION_EVENT`]
    pub fn session_event<F>(forward: F) -> Self
    where
        F: Fn(ActionEnvelope) + Send + Sync + 'static,
    {
        Self::new(SESSION_EVENT, forward)
    }

    pub fn action(&self) -> &str {
        &self.action
    }
}

impl Sink for ActionSink {
    fn send(&self, payload: Payload) {
        trace!(action = %self.action, "Forwarding action");
        (self.forward)(ActionEnvelope::new(self.action.clone(), payload));
    }
}

impl fmt::Debug for ActionSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionSink").field("action", &self.action).finish()
    }
}

/// Receiving side: unwraps envelopes of one action and dispatches them
pub struct ActionPipe {
    action: String,
    target: Box<dyn DispatchTarget>,
}

impl ActionPipe {
    pub fn new(action: impl Into<String>, target: Box<dyn DispatchTarget>) -> Self {
        Self {
            action: action.into(),
            target,
        }
    }

    /// Pipe for [`CUSTOM_ACTION`]
    pub fn custom_action(target: Box<dyn DispatchTarget>) -> Self {
        Self::new(CUSTOM_ACTION, target)
    }

    /// Pipe for [`SESSION_EVENT`]
    pub fn session_event(target: Box<dyn DispatchTarget>) -> Self {
        Self::new(SESSION_EVENT, target)
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// Dispatch an incoming action
    ///
    /// Returns `Ok(false)` for foreign actions and envelopes without data.
    pub fn dispatch(&self, action: &str, data: Option<&Payload>) -> Result<bool, DecodeError> {
        if action != self.action {
            return Ok(false);
        }
        let Some(payload) = data else {
            debug!(action, "Action without payload");
            return Ok(false);
        };
        self.target.dispatch(payload)
    }

    pub fn dispatch_envelope(&self, envelope: &ActionEnvelope) -> Result<bool, DecodeError> {
        self.dispatch(&envelope.action, envelope.data.as_ref())
    }
}

impl fmt::Debug for ActionPipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionPipe").field("action", &self.action).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Value, KEY_CLASS_NAME};
    use std::sync::{Arc, Mutex};

    struct AcceptAll(Arc<Mutex<usize>>);

    impl DispatchTarget for AcceptAll {
        fn matches(&self, _payload: &Payload) -> bool {
            true
        }

        fn dispatch(&self, _payload: &Payload) -> Result<bool, DecodeError> {
            *self.0.lock().unwrap() += 1;
            Ok(true)
        }
    }

    fn payload() -> Payload {
        let mut payload = Payload::new();
        payload.insert(KEY_CLASS_NAME, Value::String("demo.Bar".into()));
        payload
    }

    #[test]
    fn test_envelope_round_trip() {
        let outbox = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&outbox);
        let sink = ActionSink::custom_action(move |env| captured.lock().unwrap().push(env));
        sink.send(payload());

        let count = Arc::new(Mutex::new(0));
        let pipe = ActionPipe::custom_action(Box::new(AcceptAll(Arc::clone(&count))));

        let envelope = outbox.lock().unwrap().remove(0);
        assert_eq!(envelope.action, CUSTOM_ACTION);
        assert_eq!(pipe.dispatch_envelope(&envelope), Ok(true));
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_foreign_action_ignored() {
        let count = Arc::new(Mutex::new(0));
        let pipe = ActionPipe::session_event(Box::new(AcceptAll(Arc::clone(&count))));

        assert_eq!(pipe.dispatch(CUSTOM_ACTION, Some(&payload())), Ok(false));
        assert_eq!(pipe.dispatch(SESSION_EVENT, None), Ok(false));
        assert_eq!(*count.lock().unwrap(), 0);
    }

    #[test]
    fn test_envelope_json() {
        let envelope = ActionEnvelope::new(SESSION_EVENT, payload());
        let json = serde_json::to_string(&envelope).unwrap();
        let back: ActionEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, envelope);

        let empty: ActionEnvelope =
            serde_json::from_str(r#"{ "action": "channel.pipe.SESSION_EVENT" }"#).unwrap();
        assert_eq!(empty.data, None);
    }
}
