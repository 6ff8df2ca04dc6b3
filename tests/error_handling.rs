//! Misuse faults, unhandled errors, and panic translation.
//!
//! Faults are panics carrying a typed payload, so these tests catch the
//! unwind and inspect what came out: a `Fault` for protocol violations, an
//! `UnhandledError` for errors nobody acknowledged.

use parking_lot::Mutex;
use rivulet::{
    Completable, Consumer, Fault, Job, Maybe, MessageError, Observable, Scheduler, Single,
    UnhandledError,
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Runs each job on a fresh thread and keeps the handle, so tests can
/// observe whether the job's thread panicked.
struct SpawnScheduler {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl SpawnScheduler {
    fn new() -> Self {
        Self {
            handles: Mutex::new(Vec::new()),
        }
    }

    fn join_all(&self) -> Vec<std::thread::Result<()>> {
        self.handles
            .lock()
            .drain(..)
            .map(|handle| handle.join())
            .collect()
    }
}

impl Scheduler for SpawnScheduler {
    fn execute(&self, job: Job) {
        self.handles.lock().push(std::thread::spawn(job));
    }
}

// --- Misuse Faults ---

#[test]
fn test_double_complete_is_misuse_fault() {
    let completions = Arc::new(AtomicUsize::new(0));

    let completable = Completable::create(|emitter| {
        emitter.complete();
        emitter.complete();
        Ok(())
    });

    let slot = Arc::clone(&completions);
    let result = catch_unwind(AssertUnwindSafe(|| {
        completable.subscribe(Consumer::new().on_complete(move || {
            slot.fetch_add(1, Ordering::SeqCst);
        }))
    }));

    let payload = result.unwrap_err();
    assert!(matches!(
        payload.downcast_ref::<Fault>(),
        Some(Fault::AfterTerminal { event: "complete" })
    ));
    // The consumer observed exactly one completion, never two.
    assert_eq!(completions.load(Ordering::SeqCst), 1);
}

#[test]
fn test_error_after_complete_is_misuse_fault() {
    let completable = Completable::create(|emitter| {
        emitter.complete();
        emitter.error(MessageError::cause("too late"));
        Ok(())
    });

    let result = catch_unwind(AssertUnwindSafe(|| {
        completable.subscribe(Consumer::new().on_error(|_| {}))
    }));

    let payload = result.unwrap_err();
    assert!(matches!(
        payload.downcast_ref::<Fault>(),
        Some(Fault::AfterTerminal { event: "error" })
    ));
}

#[test]
fn test_double_error_is_misuse_fault() {
    let errors = Arc::new(AtomicUsize::new(0));

    let single = Single::<i32>::create(|emitter| {
        emitter.error(MessageError::cause("first"));
        emitter.error(MessageError::cause("second"));
        Ok(())
    });

    let slot = Arc::clone(&errors);
    let result = catch_unwind(AssertUnwindSafe(|| {
        single.subscribe(Consumer::new().on_error(move |_| {
            slot.fetch_add(1, Ordering::SeqCst);
        }))
    }));

    assert!(result.unwrap_err().is::<Fault>());
    assert_eq!(errors.load(Ordering::SeqCst), 1);
}

#[test]
fn test_maybe_success_then_complete_is_misuse_fault() {
    let maybe = Maybe::create(|emitter| {
        emitter.success(1);
        emitter.complete();
        Ok(())
    });

    let result = catch_unwind(AssertUnwindSafe(|| {
        maybe.subscribe(Consumer::new().on_success(|_: i32| {}).on_error(|_| {}))
    }));

    assert!(matches!(
        result.unwrap_err().downcast_ref::<Fault>(),
        Some(Fault::AfterTerminal { event: "complete" })
    ));
}

#[test]
fn test_next_after_complete_is_misuse_fault() {
    let items = Arc::new(AtomicUsize::new(0));

    let observable = Observable::create(|emitter| {
        emitter.next(1);
        emitter.complete();
        emitter.next(2);
        Ok(())
    });

    let slot = Arc::clone(&items);
    let result = catch_unwind(AssertUnwindSafe(|| {
        observable.subscribe(
            Consumer::new()
                .on_next(move |_: i32| {
                    slot.fetch_add(1, Ordering::SeqCst);
                })
                .on_error(|_| {}),
        )
    }));

    assert!(matches!(
        result.unwrap_err().downcast_ref::<Fault>(),
        Some(Fault::AfterTerminal { event: "next" })
    ));
    assert_eq!(items.load(Ordering::SeqCst), 1);
}

// --- Unhandled Errors ---

#[test]
fn test_error_without_error_callback_re_raises() {
    let single = Single::<i32>::error(MessageError::cause("nobody listening"));

    let result = catch_unwind(AssertUnwindSafe(|| {
        single.subscribe(Consumer::new().on_success(|_| {}))
    }));

    let payload = result.unwrap_err();
    let unhandled = payload
        .downcast_ref::<UnhandledError>()
        .expect("expected an UnhandledError payload");
    assert_eq!(unhandled.0.to_string(), "nobody listening");
}

// --- Panic and Err Translation ---

#[test]
fn test_action_panic_translates_to_error_delivery() {
    let seen = Arc::new(Mutex::new(None));

    let single = Single::<i32>::create(|_emitter| panic!("kaboom"));

    let slot = Arc::clone(&seen);
    single.subscribe(
        Consumer::new()
            .on_success(|_| {})
            .on_error(move |cause| *slot.lock() = Some(cause.to_string())),
    );

    assert_eq!(seen.lock().as_deref(), Some("action panicked: kaboom"));
}

#[test]
fn test_action_returned_err_delivers_error() {
    let seen = Arc::new(Mutex::new(None));

    let completable = Completable::create(|_emitter| Err(MessageError::cause("io failed")));

    let slot = Arc::clone(&seen);
    completable.subscribe(
        Consumer::new().on_error(move |cause| *slot.lock() = Some(cause.to_string())),
    );

    assert_eq!(seen.lock().as_deref(), Some("io failed"));
}

#[test]
fn test_panic_after_cancellation_is_fatal() {
    let scheduler = Arc::new(SpawnScheduler::new());
    let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(1);

    let completable = Completable::create(move |_emitter| {
        gate_rx.recv().unwrap();
        panic!("threw instead of observing cancellation")
    })
    .subscribe_on(scheduler.clone());

    let subscription = completable.subscribe(Consumer::new().on_error(|_| {}));
    subscription.unsubscribe();
    gate_tx.send(()).unwrap();

    // The panic must escape the engine and kill the action's thread.
    let results = scheduler.join_all();
    assert!(results.into_iter().any(|joined| joined.is_err()));
}

#[test]
fn test_returned_err_after_cancellation_is_silent() {
    let scheduler = Arc::new(SpawnScheduler::new());
    let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(1);
    let errors = Arc::new(AtomicUsize::new(0));

    let completable = Completable::create(move |_emitter| {
        gate_rx.recv().unwrap();
        Err(MessageError::cause("late failure"))
    })
    .subscribe_on(scheduler.clone());

    let slot = Arc::clone(&errors);
    let subscription = completable.subscribe(Consumer::new().on_error(move |_| {
        slot.fetch_add(1, Ordering::SeqCst);
    }));
    subscription.unsubscribe();
    gate_tx.send(()).unwrap();

    let results = scheduler.join_all();
    assert!(results.into_iter().all(|joined| joined.is_ok()));
    assert_eq!(errors.load(Ordering::SeqCst), 0);
}
