//! Script-execution channel into the browser page.
//!
//! The channel is the abstract seam between the plugin and whatever drives
//! the browser (CDP client, WebDriver session, ...). Guardar only ever runs
//! two fixed script expressions against it: one reading the in-page coverage
//! global and one writing it back. Results are passed through untouched.

use crate::result::{GuardarError, GuardarResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex, RwLock};

/// Script expression reading the in-page coverage global.
pub const READ_COVERAGE_SCRIPT: &str = "return __coverage__;";

/// Script expression assigning its sole argument to the in-page coverage global.
pub const WRITE_COVERAGE_SCRIPT: &str = "__coverage__ = arguments[0];";

/// Abstract channel for executing script snippets in the browser context.
///
/// Implementations wrap a live browser session. Guardar does not parse or
/// validate results beyond passing them through; cancellation and timeout
/// handling belong to the implementation.
#[async_trait]
pub trait ScriptChannel: Send + Sync {
    /// Execute a script expression with positional arguments and return its result.
    async fn execute_script(&self, script: &str, args: Vec<Value>) -> GuardarResult<Value>;
}

/// Late-binding holder for the script channel.
///
/// The host runner supplies the browser session after plugin construction,
/// so wrapped actions and the collector resolve the channel through this
/// slot at call time. Operations fail with
/// [`GuardarError::ChannelNotAttached`] until a channel is attached.
#[derive(Clone, Default)]
pub struct ChannelSlot {
    inner: Arc<RwLock<Option<Arc<dyn ScriptChannel>>>>,
}

impl ChannelSlot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach (or replace) the channel.
    pub fn attach(&self, channel: Arc<dyn ScriptChannel>) {
        *self.inner.write().expect("channel slot lock poisoned") = Some(channel);
    }

    /// Check whether a channel has been attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.inner
            .read()
            .expect("channel slot lock poisoned")
            .is_some()
    }

    /// Resolve the attached channel.
    pub fn get(&self) -> GuardarResult<Arc<dyn ScriptChannel>> {
        self.inner
            .read()
            .expect("channel slot lock poisoned")
            .clone()
            .ok_or(GuardarError::ChannelNotAttached)
    }
}

impl std::fmt::Debug for ChannelSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelSlot")
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// One recorded `execute_script` invocation on a [`MockChannel`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptCall {
    /// Script expression that was executed
    pub script: String,
    /// Positional arguments it was executed with
    pub args: Vec<Value>,
}

/// Mock channel for unit testing.
///
/// Records every call for verification and resolves reads with a
/// configurable value, in the style of a scripted browser session.
#[derive(Debug, Default)]
pub struct MockChannel {
    result: Mutex<Value>,
    failure: Mutex<Option<String>>,
    calls: Mutex<Vec<ScriptCall>>,
}

impl MockChannel {
    /// Create a new mock channel resolving all scripts with `Value::Null`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock channel resolving all scripts with `result`.
    #[must_use]
    pub fn with_result(result: Value) -> Self {
        let channel = Self::new();
        channel.set_result(result);
        channel
    }

    /// Set the value every subsequent script resolves with.
    pub fn set_result(&self, result: Value) {
        *self.result.lock().expect("mock channel lock poisoned") = result;
    }

    /// Make every subsequent script reject with a channel error.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock().expect("mock channel lock poisoned") = Some(message.into());
    }

    /// Get the recorded call history.
    #[must_use]
    pub fn calls(&self) -> Vec<ScriptCall> {
        self.calls.lock().expect("mock channel lock poisoned").clone()
    }

    /// Check if a script expression was executed.
    #[must_use]
    pub fn was_called_with(&self, script: &str) -> bool {
        self.calls().iter().any(|c| c.script == script)
    }
}

#[async_trait]
impl ScriptChannel for MockChannel {
    async fn execute_script(&self, script: &str, args: Vec<Value>) -> GuardarResult<Value> {
        self.calls
            .lock()
            .expect("mock channel lock poisoned")
            .push(ScriptCall {
                script: script.to_string(),
                args,
            });
        if let Some(message) = self.failure.lock().expect("mock channel lock poisoned").clone() {
            return Err(GuardarError::Channel { message });
        }
        Ok(self.result.lock().expect("mock channel lock poisoned").clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod slot_tests {
        use super::*;

        #[test]
        fn test_slot_starts_empty() {
            let slot = ChannelSlot::new();
            assert!(!slot.is_attached());
            assert!(matches!(
                slot.get(),
                Err(GuardarError::ChannelNotAttached)
            ));
        }

        #[test]
        fn test_slot_attach_then_get() {
            let slot = ChannelSlot::new();
            slot.attach(Arc::new(MockChannel::new()));
            assert!(slot.is_attached());
            assert!(slot.get().is_ok());
        }

        #[test]
        fn test_slot_clones_share_attachment() {
            let slot = ChannelSlot::new();
            let clone = slot.clone();
            slot.attach(Arc::new(MockChannel::new()));
            assert!(clone.is_attached());
        }
    }

    mod mock_channel_tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_records_calls() {
            let channel = MockChannel::new();
            channel
                .execute_script(READ_COVERAGE_SCRIPT, vec![])
                .await
                .unwrap();

            let calls = channel.calls();
            assert_eq!(calls.len(), 1);
            assert_eq!(calls[0].script, READ_COVERAGE_SCRIPT);
            assert!(calls[0].args.is_empty());
            assert!(channel.was_called_with(READ_COVERAGE_SCRIPT));
        }

        #[tokio::test]
        async fn test_mock_resolves_configured_result() {
            let channel = MockChannel::with_result(json!({"coverage": "object"}));
            let result = channel
                .execute_script(READ_COVERAGE_SCRIPT, vec![])
                .await
                .unwrap();
            assert_eq!(result, json!({"coverage": "object"}));
        }

        #[tokio::test]
        async fn test_mock_records_write_arguments() {
            let channel = MockChannel::new();
            channel
                .execute_script(WRITE_COVERAGE_SCRIPT, vec![json!({"coverage": "object"})])
                .await
                .unwrap();

            let calls = channel.calls();
            assert_eq!(calls[0].args, vec![json!({"coverage": "object"})]);
        }

        #[tokio::test]
        async fn test_mock_failure_propagates() {
            let channel = MockChannel::new();
            channel.fail_with("browser unreachable");
            let result = channel.execute_script(READ_COVERAGE_SCRIPT, vec![]).await;
            assert!(matches!(result, Err(GuardarError::Channel { .. })));
            // the rejected call is still recorded
            assert_eq!(channel.calls().len(), 1);
        }
    }
}
