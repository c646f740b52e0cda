//! Reactive maps - observable string-keyed mappings.
//!
//! A [`ReactiveMap`] tracks reads per key and per iteration, and notifies
//! only when a write actually changes something. Two conversion depths
//! exist:
//!
//! - [`reactive`] - deep: plain [`Value::Map`] entries are converted into
//!   nested reactive maps, at construction and on every later insert.
//! - [`shallow_reactive`] - one level of observation: values are stored as
//!   given, so mutations inside a nested plain map notify nobody.
//!
//! Insertion order is preserved; iteration-order-dependent consumers (prop
//! resolution, key sweeps) rely on it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::effect::Dep;

/// Ordered entries backing maps and state snapshots.
pub type MapEntries = IndexMap<String, Value>;

// =============================================================================
// Value
// =============================================================================

/// A dynamically-typed value stored in reactive maps and passed as props.
///
/// Scalars and lists compare structurally. The two map variants compare by
/// handle identity - "same object", which is what prop-change detection
/// wants.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    /// A plain, unobserved mapping.
    Map(Rc<RefCell<MapEntries>>),
    /// An observed mapping; see [`ReactiveMap`].
    Reactive(ReactiveMap),
}

impl Value {
    /// Wrap ordered entries as a plain (unobserved) map value.
    pub fn map(entries: MapEntries) -> Value {
        Value::Map(Rc::new(RefCell::new(entries)))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// String payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer payload, if this is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean payload, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            (Value::Reactive(a), Value::Reactive(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

// =============================================================================
// ReactiveMap
// =============================================================================

/// An observable string-keyed mapping.
///
/// Cloning clones the handle: all clones share storage and subscribers.
/// Reads track a per-key dependency; `keys`/`len` track an iteration
/// dependency that fires when the key set changes.
#[derive(Clone)]
pub struct ReactiveMap {
    inner: Rc<MapInner>,
}

struct MapInner {
    values: RefCell<MapEntries>,
    key_deps: RefCell<HashMap<String, Dep>>,
    iter_dep: Dep,
    shallow: bool,
}

/// Build a deeply-observed map: nested plain maps are converted to nested
/// reactive maps.
pub fn reactive(entries: MapEntries) -> ReactiveMap {
    ReactiveMap::new(entries, false)
}

/// Build a map with one level of observation: nested values are stored as
/// given.
pub fn shallow_reactive(entries: MapEntries) -> ReactiveMap {
    ReactiveMap::new(entries, true)
}

impl ReactiveMap {
    fn new(entries: MapEntries, shallow: bool) -> Self {
        let entries = if shallow {
            entries
        } else {
            entries
                .into_iter()
                .map(|(key, value)| (key, deep_convert(value)))
                .collect()
        };
        ReactiveMap {
            inner: Rc::new(MapInner {
                values: RefCell::new(entries),
                key_deps: RefCell::new(HashMap::new()),
                iter_dep: Dep::new(),
                shallow,
            }),
        }
    }

    /// Tracked read of one key. Absent keys still track, so an effect that
    /// probed a missing key re-runs once the key appears.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.key_dep(key).track();
        self.inner.values.borrow().get(key).cloned()
    }

    /// Tracked membership probe.
    pub fn contains_key(&self, key: &str) -> bool {
        self.key_dep(key).track();
        self.inner.values.borrow().contains_key(key)
    }

    /// Write one key. A write that stores an equal value notifies nobody;
    /// otherwise the key dependency fires, plus the iteration dependency
    /// when the key is new.
    pub fn insert(&self, key: &str, value: Value) {
        let value = if self.inner.shallow {
            value
        } else {
            deep_convert(value)
        };
        let prior = {
            let mut values = self.inner.values.borrow_mut();
            if values.get(key) == Some(&value) {
                return;
            }
            values.insert(key.to_string(), value)
        };
        self.trigger_key(key);
        if prior.is_none() {
            self.inner.iter_dep.trigger();
        }
    }

    /// Remove one key; fires its dependency and the iteration dependency.
    pub fn remove(&self, key: &str) -> Option<Value> {
        let removed = self.inner.values.borrow_mut().shift_remove(key);
        if removed.is_some() {
            self.trigger_key(key);
            self.inner.iter_dep.trigger();
        }
        removed
    }

    /// Tracked key listing in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.iter_dep.track();
        self.inner.values.borrow().keys().cloned().collect()
    }

    /// Tracked entry count.
    pub fn len(&self) -> usize {
        self.inner.iter_dep.track();
        self.inner.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Untracked copy of the entries, mainly for assertions and debugging.
    pub fn snapshot(&self) -> MapEntries {
        self.inner.values.borrow().clone()
    }

    /// Identity comparison: do two handles share storage?
    pub fn ptr_eq(&self, other: &ReactiveMap) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn key_dep(&self, key: &str) -> Dep {
        let mut deps = self.inner.key_deps.borrow_mut();
        deps.entry(key.to_string()).or_insert_with(Dep::new).clone()
    }

    fn trigger_key(&self, key: &str) {
        // Only keys somebody tracked have a dep to fire.
        let dep = self.inner.key_deps.borrow().get(key).cloned();
        if let Some(dep) = dep {
            dep.trigger();
        }
    }
}

impl fmt::Debug for ReactiveMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveMap")
            .field("shallow", &self.inner.shallow)
            .field("entries", &self.inner.values.borrow())
            .finish()
    }
}

fn deep_convert(value: Value) -> Value {
    match value {
        Value::Map(entries) => {
            let entries = entries.borrow().clone();
            Value::Reactive(reactive(entries))
        }
        Value::List(items) => Value::List(items.into_iter().map(deep_convert).collect()),
        other => other,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::effect;
    use indexmap::indexmap;
    use std::cell::Cell;

    #[test]
    fn test_insert_and_get() {
        let map = reactive(MapEntries::new());
        map.insert("name", Value::from("ripple"));
        assert_eq!(map.get("name"), Some(Value::Str("ripple".to_string())));
        assert_eq!(map.get("missing"), None);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let map = reactive(MapEntries::new());
        map.insert("b", Value::Int(1));
        map.insert("a", Value::Int(2));
        map.insert("c", Value::Int(3));
        assert_eq!(map.keys(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_iteration_dep_fires_on_key_set_change() {
        let map = reactive(indexmap! { "a".to_string() => Value::Int(1) });
        let map_clone = map.clone();

        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();

        let _effect = effect(move || {
            let _ = map_clone.keys();
            runs_clone.set(runs_clone.get() + 1);
        });

        assert_eq!(runs.get(), 1);

        // Value change on an existing key: key set unchanged.
        map.insert("a", Value::Int(2));
        assert_eq!(runs.get(), 1, "value-only write must not fire the iteration dep");

        map.insert("b", Value::Int(3));
        assert_eq!(runs.get(), 2, "new key must fire the iteration dep");

        map.remove("a");
        assert_eq!(runs.get(), 3, "removal must fire the iteration dep");
    }

    #[test]
    fn test_absent_key_read_tracks() {
        let map = reactive(MapEntries::new());
        let map_clone = map.clone();

        let seen = Rc::new(RefCell::new(None));
        let seen_clone = seen.clone();

        let _effect = effect(move || {
            *seen_clone.borrow_mut() = map_clone.get("late");
        });

        assert_eq!(*seen.borrow(), None);
        map.insert("late", Value::Int(42));
        assert_eq!(
            *seen.borrow(),
            Some(Value::Int(42)),
            "probing a missing key should subscribe to its arrival"
        );
    }

    #[test]
    fn test_deep_conversion() {
        let nested = Value::map(indexmap! { "inner".to_string() => Value::Int(1) });
        let map = reactive(indexmap! { "child".to_string() => nested });

        let Some(Value::Reactive(child)) = map.get("child") else {
            panic!("deep map should convert nested plain maps");
        };

        let child_clone = child.clone();
        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();
        let _effect = effect(move || {
            let _ = child_clone.get("inner");
            runs_clone.set(runs_clone.get() + 1);
        });

        child.insert("inner", Value::Int(2));
        assert_eq!(runs.get(), 2, "nested reactive map must notify its readers");
    }

    #[test]
    fn test_shallow_leaves_nested_plain() {
        let nested = Value::map(indexmap! { "inner".to_string() => Value::Int(1) });
        let map = shallow_reactive(indexmap! { "child".to_string() => nested });

        assert!(
            matches!(map.get("child"), Some(Value::Map(_))),
            "shallow map must store nested maps as given"
        );
    }

    #[test]
    fn test_map_equality_is_identity() {
        let a = Value::map(indexmap! { "x".to_string() => Value::Int(1) });
        let b = Value::map(indexmap! { "x".to_string() => Value::Int(1) });
        assert_ne!(a, b, "distinct map handles are unequal even with equal entries");
        assert_eq!(a, a.clone(), "a clone shares identity");
    }

    #[test]
    fn test_remove_returns_value() {
        let map = reactive(indexmap! { "a".to_string() => Value::Int(1) });
        assert_eq!(map.remove("a"), Some(Value::Int(1)));
        assert_eq!(map.remove("a"), None);
        assert!(map.is_empty());
    }
}
