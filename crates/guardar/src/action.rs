//! Wrappable actions and the registry they are installed in.
//!
//! An [`Action`] is an arbitrary caller-supplied callable taking positional
//! JSON arguments and resolving with a JSON value. A [`WrapTarget`] names
//! where an action lives: an owner, a key on that owner, and the callable
//! itself. The [`ActionRegistry`] is the owner surface — wrapping replaces
//! the registry entry at `(owner, key)` in place, so every later resolution
//! through the registry observes the replacement.

use crate::result::GuardarResult;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// An invocable action with arbitrary positional JSON arguments.
///
/// Implement this for anything the plugin should wrap (page-navigating
/// helpers, fixture steps, ...). [`FnAction`] adapts plain closures.
#[async_trait]
pub trait Action: Send + Sync {
    /// Invoke the action with the given positional arguments.
    async fn invoke(&self, args: Vec<Value>) -> GuardarResult<Value>;
}

/// Adapter turning a plain closure into an [`Action`].
pub struct FnAction<F> {
    inner: F,
}

impl<F> FnAction<F>
where
    F: Fn(Vec<Value>) -> GuardarResult<Value> + Send + Sync,
{
    /// Wrap a closure as an action.
    pub fn new(inner: F) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<F> Action for FnAction<F>
where
    F: Fn(Vec<Value>) -> GuardarResult<Value> + Send + Sync,
{
    async fn invoke(&self, args: Vec<Value>) -> GuardarResult<Value> {
        (self.inner)(args)
    }
}

/// A callable and the registry location it is installed at.
///
/// Explicit record replacing ad-hoc properties stashed on a function value:
/// `owner` and `key` identify the registry slot the wrapped replacement is
/// reinstalled into.
#[derive(Clone)]
pub struct WrapTarget {
    /// Owner the callable is installed on
    pub owner: String,
    /// Property key on the owner
    pub key: String,
    /// The callable itself
    pub callable: Arc<dyn Action>,
}

impl WrapTarget {
    /// Create a new wrap target.
    pub fn new(owner: impl Into<String>, key: impl Into<String>, callable: Arc<dyn Action>) -> Self {
        Self {
            owner: owner.into(),
            key: key.into(),
            callable,
        }
    }
}

impl std::fmt::Debug for WrapTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrapTarget")
            .field("owner", &self.owner)
            .field("key", &self.key)
            .finish()
    }
}

/// Keyed map of installed actions.
///
/// Plays the role of the owning objects whose properties get patched:
/// installing at an occupied `(owner, key)` replaces the previous entry in
/// place. The plugin mutates this registry as a documented side effect of
/// construction; callers resolve actions through it afterwards.
#[derive(Default)]
pub struct ActionRegistry {
    entries: RwLock<HashMap<(String, String), Arc<dyn Action>>>,
}

impl ActionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install an action at `(owner, key)`, replacing any previous entry.
    pub fn install(&self, owner: &str, key: &str, action: Arc<dyn Action>) {
        self.entries
            .write()
            .expect("action registry lock poisoned")
            .insert((owner.to_string(), key.to_string()), action);
    }

    /// Resolve the action currently installed at `(owner, key)`.
    #[must_use]
    pub fn resolve(&self, owner: &str, key: &str) -> Option<Arc<dyn Action>> {
        self.entries
            .read()
            .expect("action registry lock poisoned")
            .get(&(owner.to_string(), key.to_string()))
            .cloned()
    }

    /// Check whether a slot is occupied.
    #[must_use]
    pub fn contains(&self, owner: &str, key: &str) -> bool {
        self.resolve(owner, key).is_some()
    }

    /// Number of installed actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .expect("action registry lock poisoned")
            .len()
    }

    /// Check whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("entries", &self.len())
            .finish()
    }
}
