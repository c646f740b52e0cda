//! # ripple-render
//!
//! Host-agnostic declarative tree renderer for Rust.
//!
//! Built on ripple-signals for fine-grained reactivity.
//!
//! ## Architecture
//!
//! Callers describe the tree they want as [`VNode`] values; the renderer
//! diffs each description against the previous one and drives an abstract
//! host through the minimal mutations - it never inspects the live host
//! tree.
//!
//! ```text
//! render(tree, container) → patch → host ops
//!                             │
//!                             └─ components: render effect → scheduler → patch
//! ```
//!
//! Components own reactive state; a state write marks the component's
//! render effect pending with the update scheduler, and the batch flushes
//! as one re-render per component. Everything is single-threaded and
//! cooperatively scheduled.
//!
//! ## Modules
//!
//! - [`vnode`] - the node model (tagged kinds, props, children, keys)
//! - [`host`] - the host operations interface the embedder implements
//! - [`renderer`] - the patch engine and keyed children differ
//! - [`component`] - definitions, instances, render contexts
//! - [`scheduler`] - the deduplicating batched update queue

pub mod component;
pub mod host;
pub mod renderer;
pub mod scheduler;
pub mod vnode;

// Re-export commonly used items
pub use component::{ComponentDefinition, ComponentInstance, ContextError, RenderContext};

pub use host::{HostOps, NodeRef};

pub use renderer::{Container, Renderer};

pub use scheduler::{
    clear_flush_driver, flush_jobs, pending_job_count, queue_job, set_flush_driver,
};

pub use vnode::{comment, component, element, fragment, text, Children, Key, VNode, VNodeKind};

pub use ripple_signals::{
    effect, effect_with_scheduler, reactive, shallow_reactive, untrack, Effect, MapEntries,
    ReactiveMap, Value,
};
