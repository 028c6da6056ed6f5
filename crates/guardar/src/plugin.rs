//! Plugin lifecycle surface for the host test runner.

use crate::action::ActionRegistry;
use crate::artifact::{ArtifactWriter, CoverageArtifact, IdSource, JsonFileWriter, UuidSource};
use crate::channel::{ChannelSlot, ScriptChannel, READ_COVERAGE_SCRIPT};
use crate::config::PluginConfig;
use crate::preserve::Preserved;
use crate::result::GuardarResult;
use std::sync::Arc;

/// Coverage preservation and collection plugin.
///
/// Constructed once per test session. Construction validates the
/// configuration eagerly and installs a coverage-preserving wrapper for
/// every configured target into the plugin's [`ActionRegistry`] — callers
/// resolve wrapped actions through [`registry`](Self::registry) afterwards.
///
/// The host supplies the browser session after construction via
/// [`attach_channel`](Self::attach_channel); operations before attachment
/// fail with [`GuardarError::ChannelNotAttached`](crate::GuardarError).
/// The host is expected to serialize lifecycle events; the plugin itself is
/// `Send + Sync` and each wrapped invocation restores only its own snapshot.
///
/// # Example
///
/// ```ignore
/// let plugin = CoveragePlugin::new(
///     PluginConfig::new("coverage/out")
///         .wrap(WrapTarget::new("browser", "get", navigate_action)),
/// )?;
/// plugin.attach_channel(session);
///
/// // after each test:
/// let artifact = plugin.post_test().await?;
/// println!("{}", artifact.message);
/// ```
pub struct CoveragePlugin {
    config: PluginConfig,
    channel: ChannelSlot,
    registry: Arc<ActionRegistry>,
    writer: Arc<dyn ArtifactWriter>,
    ids: Arc<dyn IdSource>,
}

impl CoveragePlugin {
    /// Create a plugin from a validated configuration.
    ///
    /// Wraps every configured target and installs the wrapper at the
    /// target's `(owner, key)` registry slot.
    ///
    /// # Errors
    ///
    /// Returns [`GuardarError::InvalidConfig`](crate::GuardarError) for an
    /// invalid configuration; no plugin instance is produced.
    pub fn new(config: PluginConfig) -> GuardarResult<Self> {
        config.validate()?;

        let channel = ChannelSlot::new();
        let registry = Arc::new(ActionRegistry::new());
        for target in config.targets() {
            let wrapped = Preserved::new(Arc::clone(&target.callable), channel.clone());
            registry.install(&target.owner, &target.key, Arc::new(wrapped));
        }

        Ok(Self {
            config,
            channel,
            registry,
            writer: Arc::new(JsonFileWriter),
            ids: Arc::new(UuidSource),
        })
    }

    /// Replace the artifact writer (defaults to [`JsonFileWriter`]).
    #[must_use]
    pub fn with_writer(mut self, writer: Arc<dyn ArtifactWriter>) -> Self {
        self.writer = writer;
        self
    }

    /// Replace the identifier source (defaults to [`UuidSource`]).
    #[must_use]
    pub fn with_id_source(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    /// Attach the script-execution channel into the browser.
    pub fn attach_channel(&self, channel: Arc<dyn ScriptChannel>) {
        self.channel.attach(channel);
    }

    /// Check whether a channel has been attached.
    #[must_use]
    pub fn is_channel_attached(&self) -> bool {
        self.channel.is_attached()
    }

    /// Registry holding the coverage-preserving wrappers.
    #[must_use]
    pub fn registry(&self) -> &Arc<ActionRegistry> {
        &self.registry
    }

    /// The plugin configuration.
    #[must_use]
    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Collect coverage after a completed test.
    ///
    /// Reads the in-page coverage snapshot, writes it verbatim to
    /// `<output_path>/<token>.json` and returns the artifact record.
    /// Callable once per test; each call produces a distinct artifact.
    ///
    /// # Errors
    ///
    /// Propagates channel rejections and artifact write failures to the
    /// host; nothing is retried or swallowed.
    pub async fn post_test(&self) -> GuardarResult<CoverageArtifact> {
        let channel = self.channel.get()?;
        let snapshot = channel
            .execute_script(READ_COVERAGE_SCRIPT, Vec::new())
            .await?;

        let file_name = format!("{}.json", self.ids.next_id());
        let path = self.config.output_path().join(&file_name);
        self.writer.write_json(&path, &snapshot)?;

        let message = format!("successfully gathered coverage object and stored it in {file_name}");
        tracing::info!(artifact = %path.display(), "{message}");

        Ok(CoverageArtifact {
            path,
            file_name,
            message,
        })
    }

    /// Teardown lifecycle hook.
    ///
    /// No coverage-specific work happens here; the hook exists for symmetry
    /// with the host runner's lifecycle contract.
    pub async fn teardown(&self) -> GuardarResult<()> {
        Ok(())
    }
}

impl std::fmt::Debug for CoveragePlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoveragePlugin")
            .field("config", &self.config)
            .field("channel", &self.channel)
            .field("registry", &self.registry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, FnAction, WrapTarget};
    use crate::artifact::{FixedIdSource, MockWriter};
    use crate::channel::{MockChannel, WRITE_COVERAGE_SCRIPT};
    use crate::result::GuardarError;
    use serde_json::json;
    use std::path::Path;

    fn constant_action(value: serde_json::Value) -> Arc<dyn Action> {
        Arc::new(FnAction::new(move |_args| Ok(value.clone())))
    }

    fn plugin_with_target() -> CoveragePlugin {
        CoveragePlugin::new(
            PluginConfig::new("some/path").wrap(WrapTarget::new(
                "browser",
                "get",
                constant_action(json!("expected-result")),
            )),
        )
        .unwrap()
    }

    mod construction_tests {
        use super::*;

        #[test]
        fn test_valid_config_constructs() {
            let plugin = plugin_with_target();
            assert_eq!(plugin.config().output_path(), Path::new("some/path"));
            assert!(!plugin.is_channel_attached());
        }

        #[test]
        fn test_wrapped_target_installed_in_registry() {
            let plugin = plugin_with_target();
            assert!(plugin.registry().contains("browser", "get"));
            assert_eq!(plugin.registry().len(), 1);
        }

        #[test]
        fn test_invalid_output_path_rejected() {
            let result = CoveragePlugin::new(PluginConfig::new(""));
            assert!(matches!(
                result,
                Err(GuardarError::InvalidConfig { .. })
            ));
        }

        #[test]
        fn test_invalid_target_rejected() {
            let result = CoveragePlugin::new(
                PluginConfig::new("some/path").wrap(WrapTarget::new(
                    "browser",
                    "",
                    constant_action(json!(null)),
                )),
            );
            assert!(matches!(
                result,
                Err(GuardarError::InvalidConfig { .. })
            ));
        }
    }

    mod wrapping_tests {
        use super::*;

        #[tokio::test]
        async fn test_registry_action_preserves_coverage() {
            let plugin = plugin_with_target();
            let channel = Arc::new(MockChannel::with_result(json!({"coverage": "object"})));
            plugin.attach_channel(Arc::clone(&channel) as Arc<dyn ScriptChannel>);

            let action = plugin.registry().resolve("browser", "get").unwrap();
            let result = action
                .invoke(vec![json!("first arg"), json!("second arg")])
                .await
                .unwrap();

            assert_eq!(result, json!("expected-result"));
            let calls = channel.calls();
            assert_eq!(calls[0].script, READ_COVERAGE_SCRIPT);
            assert_eq!(calls[1].script, WRITE_COVERAGE_SCRIPT);
            assert_eq!(calls[1].args, vec![json!({"coverage": "object"})]);
        }

        #[tokio::test]
        async fn test_channel_attached_after_wrapping_is_observed() {
            // wrappers resolve the channel at call time, so attaching after
            // construction still takes effect
            let plugin = plugin_with_target();
            let action = plugin.registry().resolve("browser", "get").unwrap();

            let unattached = action.invoke(vec![]).await;
            assert!(matches!(unattached, Err(GuardarError::ChannelNotAttached)));

            plugin.attach_channel(Arc::new(MockChannel::new()));
            assert!(action.invoke(vec![]).await.is_ok());
        }
    }

    mod post_test_tests {
        use super::*;

        fn collecting_plugin(writer: Arc<MockWriter>) -> CoveragePlugin {
            let plugin = plugin_with_target()
                .with_writer(writer as Arc<dyn ArtifactWriter>)
                .with_id_source(Arc::new(FixedIdSource::new("whonko")));
            plugin.attach_channel(Arc::new(MockChannel::with_result(
                json!({"coverage": "object"}),
            )));
            plugin
        }

        #[tokio::test]
        async fn test_post_test_writes_snapshot_to_uuid_named_file() {
            let writer = Arc::new(MockWriter::new());
            let plugin = collecting_plugin(Arc::clone(&writer));

            let artifact = plugin.post_test().await.unwrap();

            assert_eq!(artifact.file_name, "whonko.json");
            assert_eq!(artifact.path, Path::new("some/path").join("whonko.json"));

            let writes = writer.writes();
            assert_eq!(writes.len(), 1);
            assert_eq!(writes[0].0, artifact.path);
            assert_eq!(writes[0].1, json!({"coverage": "object"}));
        }

        #[tokio::test]
        async fn test_post_test_success_message_shape() {
            let writer = Arc::new(MockWriter::new());
            let plugin = collecting_plugin(writer);

            let artifact = plugin.post_test().await.unwrap();
            let message = artifact.message.to_lowercase();
            assert!(message.contains("successfully"));
            assert!(message.contains("gathered"));
            assert!(message.contains("coverage"));
            assert!(message.contains("whonko.json"));
        }

        #[tokio::test]
        async fn test_repeated_post_test_produces_distinct_artifacts() {
            let writer = Arc::new(MockWriter::new());
            let plugin = plugin_with_target().with_writer(Arc::clone(&writer) as Arc<dyn ArtifactWriter>);
            plugin.attach_channel(Arc::new(MockChannel::with_result(json!({}))));

            let first = plugin.post_test().await.unwrap();
            let second = plugin.post_test().await.unwrap();

            assert_ne!(first.file_name, second.file_name);
            assert_eq!(writer.writes().len(), 2);
        }

        #[tokio::test]
        async fn test_post_test_without_channel_fails_descriptively() {
            let plugin = plugin_with_target();
            let result = plugin.post_test().await;
            assert!(matches!(result, Err(GuardarError::ChannelNotAttached)));
        }

        #[tokio::test]
        async fn test_post_test_propagates_channel_failure() {
            let plugin = plugin_with_target();
            let channel = Arc::new(MockChannel::new());
            channel.fail_with("browser unreachable");
            plugin.attach_channel(channel);

            let result = plugin.post_test().await;
            assert!(matches!(result, Err(GuardarError::Channel { .. })));
        }

        #[tokio::test]
        async fn test_post_test_propagates_write_failure() {
            let writer = Arc::new(MockWriter::new());
            writer.fail_with("disk full");
            let plugin = collecting_plugin(writer);

            let result = plugin.post_test().await;
            assert!(matches!(result, Err(GuardarError::Write { .. })));
        }
    }

    mod teardown_tests {
        use super::*;

        #[tokio::test]
        async fn test_teardown_is_a_noop() {
            let plugin = plugin_with_target();
            assert!(plugin.teardown().await.is_ok());
        }
    }
}
