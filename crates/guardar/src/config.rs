//! Plugin configuration and eager validation.

use crate::action::WrapTarget;
use crate::result::{GuardarError, GuardarResult};
use std::path::{Path, PathBuf};

/// Configuration for [`CoveragePlugin`](crate::CoveragePlugin).
///
/// Validated eagerly at plugin construction; immutable afterwards. The type
/// system already guarantees a path and a sequence of targets; the remaining
/// dynamic invariants (non-empty output path, non-empty owner/key on every
/// target) are checked by [`validate`].
///
/// [`validate`]: PluginConfig::validate
#[derive(Debug, Clone)]
pub struct PluginConfig {
    output_path: PathBuf,
    targets: Vec<WrapTarget>,
}

impl PluginConfig {
    /// Create a config writing artifacts under `output_path`.
    #[must_use]
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            targets: Vec::new(),
        }
    }

    /// Add an action to wrap with coverage preservation.
    #[must_use]
    pub fn wrap(mut self, target: WrapTarget) -> Self {
        self.targets.push(target);
        self
    }

    /// Directory coverage artifacts are written into.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Actions configured for wrapping.
    #[must_use]
    pub fn targets(&self) -> &[WrapTarget] {
        &self.targets
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GuardarError::InvalidConfig`] when the output path is empty
    /// or any wrap target has an empty owner or key.
    pub fn validate(&self) -> GuardarResult<()> {
        if self.output_path.as_os_str().is_empty() {
            return Err(GuardarError::InvalidConfig {
                message: "output_path must be a non-empty path".to_string(),
            });
        }
        for (index, target) in self.targets.iter().enumerate() {
            if target.owner.is_empty() {
                return Err(GuardarError::InvalidConfig {
                    message: format!("wrap target {index} has an empty owner"),
                });
            }
            if target.key.is_empty() {
                return Err(GuardarError::InvalidConfig {
                    message: format!("wrap target {index} has an empty key"),
                });
            }
        }
        Ok(())
    }
}
