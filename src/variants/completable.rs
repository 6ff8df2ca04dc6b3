//! Zero-result variant: work that finishes or fails, emitting no values.

use std::sync::Arc;

use crate::engine::{self, Arity, Consumer, Machine, Subscription};
use crate::error::Cause;
use crate::schedulers::{ImmediateScheduler, Scheduler};

type CompletableAction = Arc<dyn Fn(CompletableEmitter) -> Result<(), Cause> + Send + Sync>;

/// Emission handle passed to a [`Completable`] action.
#[derive(Clone)]
pub struct CompletableEmitter {
    machine: Machine<()>,
}

impl CompletableEmitter {
    /// Signal successful completion. At most one terminal event per
    /// subscription; a repeat is a misuse fault.
    pub fn complete(&self) {
        self.machine.complete();
    }

    /// Signal failure with `cause`.
    pub fn error(&self, cause: Cause) {
        self.machine.error(cause);
    }

    /// True once the consumer has walked away. Emissions after this point
    /// are dropped, so treat it as the signal to stop working.
    pub fn is_unsubscribed(&self) -> bool {
        self.machine.is_cancelled()
    }
}

/// Work that terminates with completion or an error and emits no values.
///
/// The action runs once per [`subscribe`](Completable::subscribe) call, on
/// the subscription scheduler; consumer callbacks are delivered on the
/// observation scheduler. Both default to [`ImmediateScheduler`].
pub struct Completable {
    action: CompletableAction,
    subscribe_on: Arc<dyn Scheduler>,
    observe_on: Arc<dyn Scheduler>,
}

impl Completable {
    /// Build from an action driving the emission handle.
    pub fn create(
        action: impl Fn(CompletableEmitter) -> Result<(), Cause> + Send + Sync + 'static,
    ) -> Self {
        Self {
            action: Arc::new(action),
            subscribe_on: Arc::new(ImmediateScheduler),
            observe_on: Arc::new(ImmediateScheduler),
        }
    }

    /// A completable that completes as soon as it is subscribed.
    pub fn complete_now() -> Self {
        Self::create(|emitter| {
            emitter.complete();
            Ok(())
        })
    }

    /// A completable that fails every subscription with `cause`.
    pub fn error(cause: Cause) -> Self {
        Self::create(move |emitter| {
            emitter.error(Arc::clone(&cause));
            Ok(())
        })
    }

    /// Build the inner completable freshly at each subscribe and forward
    /// its terminal event.
    pub fn defer(factory: impl Fn() -> Completable + Send + Sync + 'static) -> Self {
        Self::create(move |emitter| {
            let inner = factory();
            let on_complete = emitter.clone();
            let on_error = emitter;
            inner.subscribe(
                Consumer::new()
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
    pub fn subscribe(&self, consumer: Consumer<()>) -> Subscription {
        engine::launch(
            Arity::Zero,
            consumer,
            &self.subscribe_on,
            &self.observe_on,
            |machine| CompletableEmitter { machine },
            Arc::clone(&self.action),
        )
    }
}
