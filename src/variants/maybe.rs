//! Optional-single-result variant.

use std::sync::Arc;

use crate::engine::{self, Arity, Consumer, Machine, Subscription};
use crate::error::Cause;
use crate::schedulers::{ImmediateScheduler, Scheduler};

type MaybeAction<T> = Arc<dyn Fn(MaybeEmitter<T>) -> Result<(), Cause> + Send + Sync>;

/// Emission handle passed to a [`Maybe`] action: one of `success`,
/// `complete` (empty), or `error` per subscription, mutually exclusive.
pub struct MaybeEmitter<T> {
    machine: Machine<T>,
}

impl<T> Clone for MaybeEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            machine: self.machine.clone(),
        }
    }
}

impl<T: Send + 'static> MaybeEmitter<T> {
    pub fn success(&self, value: T) {
        self.machine.success(value);
    }

    /// Terminate empty, without a value.
    pub fn complete(&self) {
        self.machine.complete();
    }

    pub fn error(&self, cause: Cause) {
        self.machine.error(cause);
    }

    pub fn is_unsubscribed(&self) -> bool {
        self.machine.is_cancelled()
    }
}

/// Work that produces zero or one value, or fails.
pub struct Maybe<T> {
    action: MaybeAction<T>,
    subscribe_on: Arc<dyn Scheduler>,
    observe_on: Arc<dyn Scheduler>,
}

impl<T: Send + 'static> Maybe<T> {
    /// Build from an action driving the emission handle.
    pub fn create(
        action: impl Fn(MaybeEmitter<T>) -> Result<(), Cause> + Send + Sync + 'static,
    ) -> Self {
        Self {
            action: Arc::new(action),
            subscribe_on: Arc::new(ImmediateScheduler),
            observe_on: Arc::new(ImmediateScheduler),
        }
    }

    /// A maybe that completes empty.
    pub fn empty() -> Self {
        Self::create(|emitter| {
            emitter.complete();
            Ok(())
        })
    }

    /// A maybe that succeeds with a clone of `value` for every
    /// subscription.
    pub fn just(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::create(move |emitter| {
            emitter.success(value.clone());
            Ok(())
        })
    }

    /// A maybe that fails every subscription with `cause`.
    pub fn error(cause: Cause) -> Self {
        Self::create(move |emitter| {
            emitter.error(Arc::clone(&cause));
            Ok(())
        })
    }

    /// Build the inner maybe freshly at each subscribe and forward its
    /// terminal event.
    pub fn defer(factory: impl Fn() -> Maybe<T> + Send + Sync + 'static) -> Self {
        Self::create(move |emitter| {
            let inner = factory();
            let on_success = emitter.clone();
            let on_complete = emitter.clone();
            let on_error = emitter;
            inner.subscribe(
                Consumer::new()
                    .on_success(move |value| on_success.success(value))
                    .on_complete(move || on_complete.complete())
                    .on_error(move |cause| on_error.error(cause)),
            );
            Ok(())
        })
    }

    /// Transform the result value, preserving empty completion and errors.
    pub fn map<U, F>(self, transform: F) -> Maybe<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let transform = Arc::new(transform);
        let upstream = self.isolated();
        Maybe::create(move |emitter: MaybeEmitter<U>| {
            let transform = Arc::clone(&transform);
            let on_success = emitter.clone();
            let on_complete = emitter.clone();
            let on_error = emitter;
            upstream.subscribe(
                Consumer::new()
                    .on_success(move |value| on_success.success(transform(value)))
                    .on_complete(move || on_complete.complete())
                    .on_error(move |cause| on_error.error(cause)),
            );
            Ok(())
        })
    }

    /// Keep the result only if `predicate` holds; a filtered-out success
    /// becomes an empty completion.
    pub fn filter<P>(self, predicate: P) -> Maybe<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        let upstream = self.isolated();
        Maybe::create(move |emitter: MaybeEmitter<T>| {
            let predicate = Arc::clone(&predicate);
            let on_success = emitter.clone();
            let on_complete = emitter.clone();
            let on_error = emitter;
            upstream.subscribe(
                Consumer::new()
                    .on_success(move |value| {
                        if predicate(&value) {
                            on_success.success(value);
                        } else {
                            on_success.complete();
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
            Arity::AtMostOne,
            consumer,
            &self.subscribe_on,
            &self.observe_on,
            |machine| MaybeEmitter { machine },
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
