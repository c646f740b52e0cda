//! Render contexts - the merged state/props view.
//!
//! Render and lifecycle code addresses values by name; the context resolves
//! each name through an explicit fallthrough - local state first, then
//! props - instead of any implicit interception. Reads establish reactive
//! dependencies; writes go to local state only. Props are owned by the
//! parent: writing one through the context is rejected.
//!
//! Two access styles:
//!
//! - [`RenderContext::get`] / [`RenderContext::set`] - lenient: violations
//!   emit a `tracing` warning and execution continues (reads yield
//!   [`Value::Null`], writes are dropped). This is what render code uses.
//! - [`RenderContext::try_get`] / [`RenderContext::try_set`] - strict: the
//!   same violations come back as [`ContextError`] values.

use thiserror::Error;
use tracing::warn;

use ripple_signals::{untrack, Value};

use crate::component::instance::ComponentInstance;

/// A recoverable context-access violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The name is declared neither in state nor in props.
    #[error("`{0}` is not declared in state or props")]
    Undeclared(String),
    /// The name is a declared prop; props are owned by the parent.
    #[error("prop `{0}` is read-only (props are owned by the parent)")]
    ReadonlyProp(String),
}

/// Read/write view over one instance's state and props.
///
/// Cheap to clone; clones address the same instance.
#[derive(Clone)]
pub struct RenderContext {
    instance: ComponentInstance,
}

impl RenderContext {
    pub(crate) fn new(instance: ComponentInstance) -> Self {
        RenderContext { instance }
    }

    /// The instance behind this context.
    pub fn instance(&self) -> &ComponentInstance {
        &self.instance
    }

    /// Read `name`, warning and yielding [`Value::Null`] when undeclared.
    pub fn get(&self, name: &str) -> Value {
        match self.try_get(name) {
            Ok(value) => value,
            Err(error) => {
                warn!(component = self.instance.definition().name(), "{error}");
                Value::Null
            }
        }
    }

    /// Read `name` through the state→props fallthrough.
    ///
    /// Both probes track, so a later-added state key or prop re-runs the
    /// reading effect. A declared-but-unset prop reads as [`Value::Null`]
    /// without being an error.
    pub fn try_get(&self, name: &str) -> Result<Value, ContextError> {
        if let Some(value) = self.instance.state().get(name) {
            return Ok(value);
        }
        if let Some(value) = self.instance.props().get(name) {
            return Ok(value);
        }
        if self.instance.definition().declares_prop(name) {
            return Ok(Value::Null);
        }
        Err(ContextError::Undeclared(name.to_string()))
    }

    /// Write `name`, warning and dropping the write when it is rejected.
    pub fn set(&self, name: &str, value: Value) {
        if let Err(error) = self.try_set(name, value) {
            warn!(component = self.instance.definition().name(), "{error}");
        }
    }

    /// Write `name` into local state.
    ///
    /// Rejected for declared props ([`ContextError::ReadonlyProp`]) and for
    /// names that exist nowhere ([`ContextError::Undeclared`]). The
    /// existence probes are untracked - a write site must not subscribe the
    /// running effect.
    pub fn try_set(&self, name: &str, value: Value) -> Result<(), ContextError> {
        if untrack(|| self.instance.state().contains_key(name)) {
            self.instance.state().insert(name, value);
            return Ok(());
        }
        if self.instance.definition().declares_prop(name) {
            return Err(ContextError::ReadonlyProp(name.to_string()));
        }
        Err(ContextError::Undeclared(name.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================
