//! Exactly-one-result variant.

use std::sync::Arc;

use crate::engine::{self, Arity, Consumer, Machine, Subscription};
use crate::error::Cause;
use crate::schedulers::{ImmediateScheduler, Scheduler};

type SingleAction<T> = Arc<dyn Fn(SingleEmitter<T>) -> Result<(), Cause> + Send + Sync>;

/// Emission handle passed to a [`Single`] action: exactly one `success` or
/// `error` per subscription.
pub struct SingleEmitter<T> {
    machine: Machine<T>,
}

impl<T> Clone for SingleEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            machine: self.machine.clone(),
        }
    }
}

impl<T: Send + 'static> SingleEmitter<T> {
    /// Deliver the result. The only success-path terminal for this arity.
    pub fn success(&self, value: T) {
        self.machine.success(value);
    }

    pub fn error(&self, cause: Cause) {
        self.machine.error(cause);
    }

    pub fn is_unsubscribed(&self) -> bool {
        self.machine.is_cancelled()
    }
}

/// Work that produces exactly one value or fails.
pub struct Single<T> {
    action: SingleAction<T>,
    subscribe_on: Arc<dyn Scheduler>,
    observe_on: Arc<dyn Scheduler>,
}

impl<T: Send + 'static> Single<T> {
    /// Build from an action driving the emission handle.
    pub fn create(
        action: impl Fn(SingleEmitter<T>) -> Result<(), Cause> + Send + Sync + 'static,
    ) -> Self {
        Self {
            action: Arc::new(action),
            subscribe_on: Arc::new(ImmediateScheduler),
            observe_on: Arc::new(ImmediateScheduler),
        }
    }

    /// A single that succeeds with a clone of `value` for every
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

    /// A single that fails every subscription with `cause`.
    pub fn error(cause: Cause) -> Self {
        Self::create(move |emitter| {
            emitter.error(Arc::clone(&cause));
            Ok(())
        })
    }

    /// Build the inner single freshly at each subscribe and forward its
    /// terminal event.
    pub fn defer(factory: impl Fn() -> Single<T> + Send + Sync + 'static) -> Self {
        Self::create(move |emitter| {
            let inner = factory();
            let on_success = emitter.clone();
            let on_error = emitter;
            inner.subscribe(
                Consumer::new()
                    .on_success(move |value| on_success.success(value))
                    .on_error(move |cause| on_error.error(cause)),
            );
            Ok(())
        })
    }

    /// Transform the result value. An ordinary consumer of the engine: the
    /// upstream is subscribed with immediate scheduling and its events are
    /// forwarded into the downstream emitter.
    pub fn map<U, F>(self, transform: F) -> Single<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let transform = Arc::new(transform);
        let upstream = self.isolated();
        Single::create(move |emitter: SingleEmitter<U>| {
            let transform = Arc::clone(&transform);
            let on_success = emitter.clone();
            let on_error = emitter;
            upstream.subscribe(
                Consumer::new()
                    .on_success(move |value| on_success.success(transform(value)))
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
            Arity::ExactlyOne,
            consumer,
            &self.subscribe_on,
            &self.observe_on,
            |machine| SingleEmitter { machine },
            Arc::clone(&self.action),
        )
    }

    /// Same action, immediate scheduling on both contexts. Combinators
    /// subscribe upstream through this so marshaling happens only at the
    /// outermost facade.
    fn isolated(&self) -> Self {
        Self {
            action: Arc::clone(&self.action),
            subscribe_on: Arc::new(ImmediateScheduler),
            observe_on: Arc::new(ImmediateScheduler),
        }
    }
}
