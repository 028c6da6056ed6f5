//! Guardar: Coverage Preservation Bridge for Browser E2E Test Runs
//!
//! Guardar (Spanish: "to save/keep") sits between a host test runner and a
//! browser session, keeping in-page code-coverage state alive across page
//! transitions and persisting one coverage snapshot artifact per completed
//! test for a downstream report generator.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    GUARDAR Architecture                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌──────────────┐    ┌────────────────┐      │
//! │   │ Host Test  │    │ Coverage     │    │ Script Channel │      │
//! │   │ Runner     │───►│ Plugin       │───►│ (browser page) │      │
//! │   │ lifecycle  │    │ wrap/collect │    │ __coverage__   │      │
//! │   └────────────┘    └──────┬───────┘    └────────────────┘      │
//! │                            │                                     │
//! │                            ▼                                     │
//! │                    <output>/<uuid>.json                          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Guardar never interprets coverage data: snapshots are opaque JSON values
//! read from the page, restored to the page, or written verbatim to disk.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod action;
mod artifact;
mod channel;
mod config;
mod plugin;
mod preserve;
mod result;

pub use action::{Action, ActionRegistry, FnAction, WrapTarget};
pub use artifact::{
    ArtifactWriter, CoverageArtifact, FixedIdSource, IdSource, JsonFileWriter, MockWriter,
    UuidSource,
};
pub use channel::{
    ChannelSlot, MockChannel, ScriptCall, ScriptChannel, READ_COVERAGE_SCRIPT,
    WRITE_COVERAGE_SCRIPT,
};
pub use config::PluginConfig;
pub use plugin::CoveragePlugin;
pub use preserve::Preserved;
pub use result::{GuardarError, GuardarResult};

/// Commonly used types for quick imports.
pub mod prelude {
    pub use crate::action::{Action, FnAction, WrapTarget};
    pub use crate::channel::ScriptChannel;
    pub use crate::config::PluginConfig;
    pub use crate::plugin::CoveragePlugin;
    pub use crate::result::{GuardarError, GuardarResult};
}
