//! Update scheduler - deduplicated, batched render jobs.
//!
//! State writes do not re-render synchronously. Each write marks the owning
//! component's render effect pending here; the accumulated batch flushes
//! once, so several synchronous mutations collapse into a single re-render
//! per component.
//!
//! # Batching Model
//!
//! - The pending set deduplicates by effect identity: enqueueing a job that
//!   is already pending is a no-op.
//! - The first enqueue of a batch invokes the flush driver once; later
//!   enqueues in the same batch only add to the set.
//! - [`flush_jobs`] drains the set in first-enqueue order. Jobs enqueued
//!   while the flush runs join the same flush.
//!
//! # Driving The Flush
//!
//! Rust has no ambient microtask queue, so the deferred-callback primitive
//! is injected: the embedder registers whatever its environment offers
//! (an event-loop wakeup, a timer, a channel send) via [`set_flush_driver`]
//! and calls [`flush_jobs`] when that callback fires. With no driver
//! installed the embedder simply calls [`flush_jobs`] from its own loop.
//!
//! # Failure
//!
//! A panicking job must not starve its siblings: every job runs under panic
//! capture, the whole batch gets its best-effort pass, the pending set and
//! flags are cleared on every exit path, and the first captured panic is
//! resumed afterwards for the embedder to handle.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use ripple_signals::Effect;

thread_local! {
    /// Pending render jobs in first-enqueue order.
    static QUEUE: RefCell<VecDeque<Effect>> = RefCell::new(VecDeque::new());

    /// Has the current batch already asked the driver for a flush?
    static FLUSH_REQUESTED: Cell<bool> = const { Cell::new(false) };

    /// Is a flush currently draining the queue?
    static FLUSHING: Cell<bool> = const { Cell::new(false) };

    /// The embedder's deferred-callback primitive, if any.
    static FLUSH_DRIVER: RefCell<Option<Rc<dyn Fn()>>> = RefCell::new(None);
}

/// Enqueue a render job for the next flush.
///
/// Deduplicates by effect identity; the first enqueue of a batch invokes
/// the flush driver exactly once.
pub fn queue_job(job: Effect) {
    let added = QUEUE.with(|queue| {
        let mut queue = queue.borrow_mut();
        if queue.iter().any(|pending| pending.ptr_eq(&job)) {
            return false;
        }
        queue.push_back(job);
        true
    });
    if !added {
        return;
    }

    let first_of_batch = FLUSH_REQUESTED.with(|requested| !requested.replace(true));
    if first_of_batch && !FLUSHING.with(Cell::get) {
        let driver = FLUSH_DRIVER.with(|driver| driver.borrow().clone());
        if let Some(driver) = driver {
            driver();
        }
    }
}

/// Drain the pending set, running each job once in first-enqueue order.
///
/// Re-entrant calls are no-ops (the outer flush already covers the queue).
/// A job panic is caught, the remaining jobs still run, cleanup happens on
/// all exit paths, and the first panic is propagated after the pass.
pub fn flush_jobs() {
    if FLUSHING.with(|flushing| flushing.replace(true)) {
        return;
    }
    let _guard = FlushGuard;

    let mut first_panic = None;
    loop {
        let job = QUEUE.with(|queue| queue.borrow_mut().pop_front());
        let Some(job) = job else {
            break;
        };
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| job.run())) {
            if first_panic.is_none() {
                first_panic = Some(payload);
            }
        }
    }

    if let Some(payload) = first_panic {
        panic::resume_unwind(payload);
    }
}

/// Register the environment's deferred-callback primitive. It is invoked
/// once per batch, on the first enqueue; the embedder responds by arranging
/// a [`flush_jobs`] call.
pub fn set_flush_driver(driver: impl Fn() + 'static) {
    FLUSH_DRIVER.with(|slot| *slot.borrow_mut() = Some(Rc::new(driver)));
}

/// Remove the registered flush driver.
pub fn clear_flush_driver() {
    FLUSH_DRIVER.with(|slot| *slot.borrow_mut() = None);
}

/// Number of jobs waiting for the next flush.
pub fn pending_job_count() -> usize {
    QUEUE.with(|queue| queue.borrow().len())
}

/// Clears the flags (and, on the unwind path, any leftover jobs) no matter
/// how the flush exits.
struct FlushGuard;

impl Drop for FlushGuard {
    fn drop(&mut self) {
        QUEUE.with(|queue| queue.borrow_mut().clear());
        FLUSH_REQUESTED.with(|requested| requested.set(false));
        FLUSHING.with(|flushing| flushing.set(false));
    }
}

// =============================================================================
// Tests
// =============================================================================
