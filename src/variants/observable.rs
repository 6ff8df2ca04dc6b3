//! Multi-result variant.

use std::sync::Arc;

use crate::engine::{self, Arity, Consumer, Machine, Subscription};
use crate::error::Cause;
use crate::schedulers::{ImmediateScheduler, Scheduler};

type ObservableAction<T> = Arc<dyn Fn(ObservableEmitter<T>) -> Result<(), Cause> + Send + Sync>;

/// Emission handle passed to an [`Observable`] action: any number of `next`
/// values, strictly before a single `complete` or `error`.
pub struct ObservableEmitter<T> {
    machine: Machine<T>,
}

impl<T> Clone for ObservableEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            machine: self.machine.clone(),
        }
    }
}

impl<T: Send + 'static> ObservableEmitter<T> {
    /// Emit an intermediate value. After cancellation this is a silent
    /// no-op; after a terminal event it is a misuse fault.
    pub fn next(&self, value: T) {
        self.machine.next(value);
    }

    pub fn complete(&self) {
        self.machine.complete();
    }

    pub fn error(&self, cause: Cause) {
        self.machine.error(cause);
    }

    /// True once the consumer has walked away. Emissions after this point
    /// are dropped, so treat it as the signal to stop producing.
    pub fn is_unsubscribed(&self) -> bool {
        self.machine.is_cancelled()
    }
}

/// Work that produces a stream of values before completing or failing.
pub struct Observable<T> {
    action: ObservableAction<T>,
    subscribe_on: Arc<dyn Scheduler>,
    observe_on: Arc<dyn Scheduler>,
}

impl<T: Send + 'static> Observable<T> {
    /// Build from an action driving the emission handle.
    pub fn create(
        action: impl Fn(ObservableEmitter<T>) -> Result<(), Cause> + Send + Sync + 'static,
    ) -> Self {
        Self {
            action: Arc::new(action),
            subscribe_on: Arc::new(ImmediateScheduler),
            observe_on: Arc::new(ImmediateScheduler),
        }
    }

    /// An observable that completes without emitting.
    pub fn empty() -> Self {
        Self::create(|emitter| {
            emitter.complete();
            Ok(())
        })
    }

    /// An observable that emits a clone of `value` and completes.
    pub fn just(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::create(move |emitter| {
            emitter.next(value.clone());
            emitter.complete();
            Ok(())
        })
    }

    /// An observable that emits each item of `items` in order, then
    /// completes. The iterable is cloned for each subscription.
    pub fn from_iter<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
    {
        Self::create(move |emitter| {
            for item in items.clone() {
                if emitter.is_unsubscribed() {
                    return Ok(());
                }
                emitter.next(item);
            }
            emitter.complete();
            Ok(())
        })
    }

    /// An observable that fails every subscription with `cause`.
    pub fn error(cause: Cause) -> Self {
        Self::create(move |emitter| {
            emitter.error(Arc::clone(&cause));
            Ok(())
        })
    }

    /// Build the inner observable freshly at each subscribe and forward its
    /// events.
    pub fn defer(factory: impl Fn() -> Observable<T> + Send + Sync + 'static) -> Self {
        Self::create(move |emitter| {
            let inner = factory();
            let on_next = emitter.clone();
            let on_complete = emitter.clone();
            let on_error = emitter;
            inner.subscribe(
                Consumer::new()
                    .on_next(move |value| on_next.next(value))
                    .on_complete(move || on_complete.complete())
                    .on_error(move |cause| on_error.error(cause)),
            );
            Ok(())
        })
    }

    /// Transform each value. An ordinary consumer of the engine: the
    /// upstream is subscribed with immediate scheduling and its events are
    /// forwarded into the downstream emitter.
    pub fn map<U, F>(self, transform: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let transform = Arc::new(transform);
        let upstream = self.isolated();
        Observable::create(move |emitter: ObservableEmitter<U>| {
            let transform = Arc::clone(&transform);
            let on_next = emitter.clone();
            let on_complete = emitter.clone();
            let on_error = emitter;
            upstream.subscribe(
                Consumer::new()
                    .on_next(move |value| on_next.next(transform(value)))
                    .on_complete(move || on_complete.complete())
                    .on_error(move |cause| on_error.error(cause)),
            );
            Ok(())
        })
    }

    /// Drop values for which `predicate` does not hold.
    pub fn filter<P>(self, predicate: P) -> Observable<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        let upstream = self.isolated();
        Observable::create(move |emitter: ObservableEmitter<T>| {
            let predicate = Arc::clone(&predicate);
            let on_next = emitter.clone();
            let on_complete = emitter.clone();
            let on_error = emitter;
            upstream.subscribe(
                Consumer::new()
                    .on_next(move |value| {
                        if predicate(&value) {
                            on_next.next(value);
                        }
                    })
                    .on_complete(move || on_complete.complete())
                    .on_error(move |cause| on_error.error(cause)),
            );
            Ok(())
        })
    }

    /// Run the action on `scheduler` instead of the subscribing thread.
    pub fn subscribe_on(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.subscribe_on = scheduler;
        self
    }

    /// Deliver consumer callbacks on `scheduler`.
    pub fn observe_on(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.observe_on = scheduler;
        self
    }

    /// Invoke the action once, delivering events to `consumer`.
    pub fn subscribe(&self, consumer: Consumer<T>) -> Subscription {
        engine::launch(
            Arity::Many,
            consumer,
            &self.subscribe_on,
            &self.observe_on,
            |machine| ObservableEmitter { machine },
            Arc::clone(&self.action),
        )
    }

    /// Same action, immediate scheduling on both contexts.
    fn isolated(&self) -> Self {
        Self {
            action: Arc::clone(&self.action),
            subscribe_on: Arc::new(ImmediateScheduler),
            observe_on: Arc::new(ImmediateScheduler),
        }
    }
}
