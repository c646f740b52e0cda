//! Effects - dependency-tracked computations.
//!
//! An [`Effect`] wraps a closure and re-runs it whenever a reactive value it
//! read during its last run changes. Reads are tracked automatically: while
//! an effect is running it sits on a thread-local stack, and every
//! [`Dep::track`] call subscribes the innermost running effect.
//!
//! # Scheduler Routing
//!
//! By default a dependency change re-runs the effect inline. An effect
//! created with [`effect_with_scheduler`] instead hands its handle to the
//! scheduler closure and lets the caller decide when (or whether) to call
//! [`Effect::run`]. This is the seam a batching update queue plugs into.
//!
//! # Ownership
//!
//! Dependencies hold their subscribers weakly. The [`Effect`] handle is the
//! only thing keeping the computation alive; dropping every handle (or
//! calling [`Effect::stop`]) ends the subscription for good.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

thread_local! {
    /// Stack of currently-running effects (innermost last).
    static EFFECT_STACK: RefCell<Vec<Rc<EffectInner>>> = RefCell::new(Vec::new());

    /// Nesting depth of `untrack` scopes; tracking is paused while > 0.
    static PAUSE_DEPTH: Cell<usize> = const { Cell::new(0) };
}

type Scheduler = Box<dyn Fn(&Effect)>;

struct EffectInner {
    callback: RefCell<Box<dyn FnMut()>>,
    scheduler: Option<Scheduler>,
    active: Cell<bool>,
    running: Cell<bool>,
    deps: RefCell<Vec<Dep>>,
}

/// Handle to a dependency-tracked computation.
///
/// Cloning is cheap and clones share identity; see [`Effect::ptr_eq`].
#[derive(Clone)]
pub struct Effect {
    inner: Rc<EffectInner>,
}

impl Effect {
    fn new(callback: Box<dyn FnMut()>, scheduler: Option<Scheduler>) -> Self {
        Effect {
            inner: Rc::new(EffectInner {
                callback: RefCell::new(callback),
                scheduler,
                active: Cell::new(true),
                running: Cell::new(false),
                deps: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Execute the computation with fresh dependency tracking.
    ///
    /// Subscriptions from the previous run are dropped first, so a run only
    /// depends on what it actually read this time. Running a stopped effect
    /// is a no-op, as is re-entering an effect that is already running.
    pub fn run(&self) {
        if !self.inner.active.get() || self.inner.running.get() {
            return;
        }
        self.cleanup();
        self.inner.running.set(true);
        EFFECT_STACK.with(|stack| stack.borrow_mut().push(self.inner.clone()));
        // The guard restores the stack and the running flag even if the
        // callback unwinds, so a panicking job cannot corrupt tracking for
        // whatever runs next on this thread.
        let _guard = RunGuard {
            inner: self.inner.clone(),
        };
        (self.inner.callback.borrow_mut())();
    }

    /// Deactivate the effect and unsubscribe it from every dependency.
    ///
    /// After `stop`, [`Effect::run`] does nothing: a queued job that was
    /// scheduled before the stop becomes harmless.
    pub fn stop(&self) {
        if self.inner.active.replace(false) {
            self.cleanup();
        }
    }

    /// Whether the effect is still live.
    pub fn is_active(&self) -> bool {
        self.inner.active.get()
    }

    /// Identity comparison: do two handles refer to the same effect?
    pub fn ptr_eq(&self, other: &Effect) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn cleanup(&self) {
        let deps: Vec<Dep> = self.inner.deps.borrow_mut().drain(..).collect();
        for dep in deps {
            dep.remove_subscriber(&self.inner);
        }
    }
}

struct RunGuard {
    inner: Rc<EffectInner>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        EFFECT_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(top) = stack.last() {
                if Rc::ptr_eq(top, &self.inner) {
                    stack.pop();
                }
            }
        });
        self.inner.running.set(false);
    }
}

/// Create an effect: runs `callback` immediately, re-runs it inline whenever
/// a tracked dependency changes.
pub fn effect(callback: impl FnMut() + 'static) -> Effect {
    let created = Effect::new(Box::new(callback), None);
    created.run();
    created
}

/// Create an effect whose re-runs are routed through `scheduler` instead of
/// running inline. The first run still happens immediately.
pub fn effect_with_scheduler(
    callback: impl FnMut() + 'static,
    scheduler: impl Fn(&Effect) + 'static,
) -> Effect {
    let created = Effect::new(Box::new(callback), Some(Box::new(scheduler)));
    created.run();
    created
}

/// Run `f` with dependency tracking paused.
///
/// Reads inside the closure do not subscribe the current effect. Triggers
/// are unaffected: writes inside an untracked scope still notify.
pub fn untrack<R>(f: impl FnOnce() -> R) -> R {
    PAUSE_DEPTH.with(|depth| depth.set(depth.get() + 1));
    let _guard = PauseGuard;
    f()
}

struct PauseGuard;

impl Drop for PauseGuard {
    fn drop(&mut self) {
        PAUSE_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

// =============================================================================
// Dep - one observable location
// =============================================================================

/// A single observable location: a set of weakly-held subscriber effects.
#[derive(Clone, Default)]
pub(crate) struct Dep {
    inner: Rc<DepInner>,
}

#[derive(Default)]
struct DepInner {
    subscribers: RefCell<Vec<Weak<EffectInner>>>,
}

impl Dep {
    pub(crate) fn new() -> Self {
        Dep::default()
    }

    /// Subscribe the innermost running effect, if tracking is live.
    pub(crate) fn track(&self) {
        if PAUSE_DEPTH.with(Cell::get) > 0 {
            return;
        }
        let Some(current) = EFFECT_STACK.with(|stack| stack.borrow().last().cloned()) else {
            return;
        };
        {
            let mut subscribers = self.inner.subscribers.borrow_mut();
            let already = subscribers
                .iter()
                .any(|weak| weak.upgrade().is_some_and(|sub| Rc::ptr_eq(&sub, &current)));
            if !already {
                subscribers.push(Rc::downgrade(&current));
            }
        }
        let mut deps = current.deps.borrow_mut();
        if !deps.iter().any(|dep| Rc::ptr_eq(&dep.inner, &self.inner)) {
            deps.push(self.clone());
        }
    }

    /// Notify every live subscriber.
    ///
    /// An effect that is currently running is skipped - a computation that
    /// writes a value it also reads must not re-trigger itself. Subscribers
    /// with a scheduler receive their handle; the rest re-run inline.
    pub(crate) fn trigger(&self) {
        let subscribers: Vec<Rc<EffectInner>> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for inner in subscribers {
            if inner.running.get() {
                continue;
            }
            let subscriber = Effect { inner };
            match &subscriber.inner.scheduler {
                Some(scheduler) => scheduler(&subscriber),
                None => subscriber.run(),
            }
        }
    }

    fn remove_subscriber(&self, target: &Rc<EffectInner>) {
        // Dead weak references are swept here as a side effect.
        self.inner
            .subscribers
            .borrow_mut()
            .retain(|weak| weak.upgrade().is_some_and(|sub| !Rc::ptr_eq(&sub, target)));
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{reactive, Value};
    use indexmap::indexmap;
    use std::rc::Rc;

    #[test]
    fn test_effect_runs_immediately() {
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();

        let _effect = effect(move || {
            count_clone.set(count_clone.get() + 1);
        });

        assert_eq!(count.get(), 1, "effect should run once on creation");
    }

    #[test]
    fn test_effect_reruns_on_change() {
        let state = reactive(indexmap! { "count".to_string() => Value::Int(0) });
        let state_clone = state.clone();

        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();

        let _effect = effect(move || {
            let _ = state_clone.get("count");
            runs_clone.set(runs_clone.get() + 1);
        });

        assert_eq!(runs.get(), 1);
        state.insert("count", Value::Int(1));
        assert_eq!(runs.get(), 2, "write should re-run the effect");
    }

    #[test]
    fn test_equal_write_does_not_rerun() {
        let state = reactive(indexmap! { "count".to_string() => Value::Int(0) });
        let state_clone = state.clone();

        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();

        let _effect = effect(move || {
            let _ = state_clone.get("count");
            runs_clone.set(runs_clone.get() + 1);
        });

        state.insert("count", Value::Int(0));
        assert_eq!(runs.get(), 1, "writing an equal value should not notify");
    }

    #[test]
    fn test_stop_ends_subscription() {
        let state = reactive(indexmap! { "count".to_string() => Value::Int(0) });
        let state_clone = state.clone();

        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();

        let handle = effect(move || {
            let _ = state_clone.get("count");
            runs_clone.set(runs_clone.get() + 1);
        });

        handle.stop();
        state.insert("count", Value::Int(5));
        assert_eq!(runs.get(), 1, "stopped effect must not re-run");
        assert!(!handle.is_active());
    }

    #[test]
    fn test_run_after_stop_is_noop() {
        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();

        let handle = effect(move || {
            runs_clone.set(runs_clone.get() + 1);
        });

        handle.stop();
        handle.run();
        assert_eq!(runs.get(), 1, "run on a stopped effect should do nothing");
    }

    #[test]
    fn test_scheduler_receives_rerun() {
        let state = reactive(indexmap! { "count".to_string() => Value::Int(0) });
        let state_clone = state.clone();

        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();
        let scheduled: Rc<RefCell<Vec<Effect>>> = Rc::new(RefCell::new(Vec::new()));
        let scheduled_clone = scheduled.clone();

        let handle = effect_with_scheduler(
            move || {
                let _ = state_clone.get("count");
                runs_clone.set(runs_clone.get() + 1);
            },
            move |job| scheduled_clone.borrow_mut().push(job.clone()),
        );

        assert_eq!(runs.get(), 1, "first run is immediate");

        state.insert("count", Value::Int(1));
        assert_eq!(runs.get(), 1, "rerun should be deferred to the scheduler");
        assert_eq!(scheduled.borrow().len(), 1);
        assert!(scheduled.borrow()[0].ptr_eq(&handle));

        scheduled.borrow_mut().pop().into_iter().for_each(|j| j.run());
        assert_eq!(runs.get(), 2, "running the scheduled job re-executes");
    }

    #[test]
    fn test_self_write_does_not_recurse() {
        let state = reactive(indexmap! { "count".to_string() => Value::Int(0) });
        let state_clone = state.clone();

        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();

        let _effect = effect(move || {
            runs_clone.set(runs_clone.get() + 1);
            let current = state_clone.get("count").unwrap_or(Value::Int(0));
            if let Value::Int(n) = current {
                state_clone.insert("count", Value::Int(n + 1));
            }
        });

        // Without the running guard this would recurse unboundedly.
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_untrack_skips_subscription() {
        let state = reactive(indexmap! { "count".to_string() => Value::Int(0) });
        let state_clone = state.clone();

        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();

        let _effect = effect(move || {
            untrack(|| {
                let _ = state_clone.get("count");
            });
            runs_clone.set(runs_clone.get() + 1);
        });

        state.insert("count", Value::Int(9));
        assert_eq!(runs.get(), 1, "untracked read must not subscribe");
    }

    #[test]
    fn test_dependencies_refresh_each_run() {
        let state = reactive(indexmap! {
            "which".to_string() => Value::Str("a".to_string()),
            "a".to_string() => Value::Int(0),
            "b".to_string() => Value::Int(0),
        });
        let state_clone = state.clone();

        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();

        let _effect = effect(move || {
            runs_clone.set(runs_clone.get() + 1);
            let which = state_clone.get("which").unwrap_or(Value::Null);
            if which == Value::Str("a".to_string()) {
                let _ = state_clone.get("a");
            } else {
                let _ = state_clone.get("b");
            }
        });

        assert_eq!(runs.get(), 1);

        // Branch currently reads "a": a write to "b" is invisible.
        state.insert("b", Value::Int(1));
        assert_eq!(runs.get(), 1, "untouched branch dependency must not fire");

        state.insert("which", Value::Str("b".to_string()));
        assert_eq!(runs.get(), 2);

        // After the switch the stale "a" subscription must be gone.
        state.insert("a", Value::Int(7));
        assert_eq!(runs.get(), 2, "stale dependency from a prior run must not fire");
    }
}
