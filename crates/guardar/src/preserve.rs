//! Coverage-preserving action wrapper.
//!
//! Page transitions reset the in-page coverage global, so any action that
//! navigates must have coverage saved before it runs and written back after.
//! [`Preserved`] wraps an action with exactly that save/invoke/restore
//! sequence while forwarding arguments and result untouched.

use crate::action::Action;
use crate::channel::{ChannelSlot, READ_COVERAGE_SCRIPT, WRITE_COVERAGE_SCRIPT};
use crate::result::GuardarResult;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// A wrapped action with identical call semantics plus coverage preservation.
///
/// Each invocation performs its own read/restore round trip and restores the
/// snapshot captured at its own entry, so concurrent invocations never write
/// back a sibling's snapshot.
pub struct Preserved {
    original: Arc<dyn Action>,
    channel: ChannelSlot,
}

impl Preserved {
    /// Wrap `original`, resolving the script channel through `channel` at call time.
    pub fn new(original: Arc<dyn Action>, channel: ChannelSlot) -> Self {
        Self { original, channel }
    }

    /// The wrapped original action, exposed for inspection and testing.
    #[must_use]
    pub fn original(&self) -> &Arc<dyn Action> {
        &self.original
    }
}

impl std::fmt::Debug for Preserved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preserved")
            .field("channel", &self.channel)
            .finish()
    }
}

#[async_trait]
impl Action for Preserved {
    /// Save coverage, invoke the original with the forwarded arguments, then
    /// restore the saved snapshot.
    ///
    /// Restoration is attempted on every exit path of the original. When the
    /// original succeeds, a restore failure propagates; when the original
    /// fails, its error wins and the restore failure is only logged.
    async fn invoke(&self, args: Vec<Value>) -> GuardarResult<Value> {
        let channel = self.channel.get()?;
        let snapshot = channel
            .execute_script(READ_COVERAGE_SCRIPT, Vec::new())
            .await?;

        let outcome = self.original.invoke(args).await;

        let restored = channel
            .execute_script(WRITE_COVERAGE_SCRIPT, vec![snapshot])
            .await;
        if let Err(restore_err) = restored {
            if outcome.is_ok() {
                return Err(restore_err);
            }
            tracing::warn!(error = %restore_err, "coverage restore failed after action error");
        }

        outcome
    }
}
