//! # ripple-signals
//!
//! Fine-grained reactive primitives for the ripple renderer.
//!
//! Two pieces:
//!
//! - [`ReactiveMap`] - an observable string-keyed mapping with per-key and
//!   per-iteration dependency tracking, built via [`reactive`] (deep) or
//!   [`shallow_reactive`] (one level of observation).
//! - [`Effect`] - a dependency-tracked computation that re-runs when a value
//!   it read changes, optionally routing re-runs through a caller-supplied
//!   scheduler ([`effect_with_scheduler`]).
//!
//! Everything here is single-threaded: dependency state lives in
//! thread-locals and handles are `Rc`-based. Consumers drive batching and
//! scheduling themselves; this crate only decides *what* depends on *what*.

pub mod effect;
pub mod reactive;

pub use effect::{effect, effect_with_scheduler, untrack, Effect};
pub use reactive::{reactive, shallow_reactive, MapEntries, ReactiveMap, Value};
