//! The per-subscription emission state machine.
//!
//! One machine exists per `subscribe` call. It owns the consumer reference,
//! enforces the legal event sequence for its arity policy, and marshals
//! every delivery through the bound observation scheduler.
//!
//! Terminal transitions use compare-and-swap on a single atomic word so that
//! of two racing terminal calls exactly one wins; the loser deterministically
//! takes the misuse-fault path. Under an observation scheduler that does not
//! serialize, the guards degrade to advisory fast-fail checks: a documented
//! constraint on scheduler choice, not something the engine papers over.

use std::panic::panic_any;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::error::{Cause, Fault, UnhandledError};
use crate::schedulers::Scheduler;

use super::types::{Arity, Cancellable, Consumer, Subscription, Terminal};

/// Lifecycle states. `UNSUBSCRIBED` is absorbing from every other state.
const CREATED: u8 = 0;
const STARTED: u8 = 1;
const TERMINATED: u8 = 2;
const UNSUBSCRIBED: u8 = 3;

/// Misuse faults are loud and distinct from the business-error channel:
/// they signal a bug in the action, not a runtime condition the consumer
/// should handle.
fn raise(fault: Fault) -> ! {
    panic_any(fault)
}

/// Shared machine core: the lifecycle word and the consumer slot. Delivery
/// jobs hold a reference to this, not to the whole machine.
struct Core<T> {
    arity: Arity,
    state: AtomicU8,
    /// The downstream consumer. Taken out exactly once, at the first
    /// terminal delivery or at cancellation, whichever lands first.
    consumer: Mutex<Option<Consumer<T>>>,
}

/// The emission state machine for one subscription. Cheap to clone; all
/// clones share one core.
pub(crate) struct Machine<T> {
    core: Arc<Core<T>>,
    observe_on: Arc<dyn Scheduler>,
}

impl<T> Clone for Machine<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            observe_on: Arc::clone(&self.observe_on),
        }
    }
}

impl<T: Send + 'static> Machine<T> {
    pub(crate) fn new(arity: Arity, consumer: Consumer<T>, observe_on: Arc<dyn Scheduler>) -> Self {
        Self {
            core: Arc::new(Core {
                arity,
                state: AtomicU8::new(CREATED),
                consumer: Mutex::new(Some(consumer)),
            }),
            observe_on,
        }
    }

    /// The public cancellation facade over this machine.
    pub(crate) fn handle(&self) -> Subscription {
        Subscription::new(Arc::clone(&self.core) as Arc<dyn Cancellable>)
    }

    /// Engine-internal start signal. Legal exactly once, before any other
    /// event; actions never see this method.
    pub(crate) fn start(&self) {
        match self
            .core
            .state
            .compare_exchange(CREATED, STARTED, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => {}
            Err(UNSUBSCRIBED) => return,
            Err(_) => raise(Fault::StartedTwice),
        }

        let core = Arc::clone(&self.core);
        self.observe_on
            .execute(Box::new(move || core.deliver_start()));
    }

    /// Intermediate value, multi-result arity only.
    pub(crate) fn next(&self, value: T) {
        match self.core.state.load(Ordering::SeqCst) {
            UNSUBSCRIBED => {
                trace!(
                    arity = self.core.arity.label(),
                    "next after unsubscribe, dropped"
                );
            }
            TERMINATED => raise(Fault::AfterTerminal { event: "next" }),
            CREATED => raise(Fault::BeforeStart { event: "next" }),
            _ => {
                if !self.core.arity.allows_intermediate() {
                    raise(Fault::WrongArity {
                        event: "next",
                        arity: self.core.arity.label(),
                    });
                }
                let core = Arc::clone(&self.core);
                self.observe_on
                    .execute(Box::new(move || core.deliver_next(value)));
            }
        }
    }

    pub(crate) fn success(&self, value: T) {
        self.terminal(Terminal::Success(value));
    }

    pub(crate) fn complete(&self) {
        self.terminal(Terminal::Complete);
    }

    pub(crate) fn error(&self, cause: Cause) {
        self.terminal(Terminal::Error(cause));
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.core.is_cancelled()
    }

    #[cfg(test)]
    fn cancel(&self) {
        self.core.cancel();
    }

    fn terminal(&self, event: Terminal<T>) {
        if self.is_cancelled() {
            trace!(event = event.label(), "terminal after unsubscribe, dropped");
            return;
        }

        let allowed = match &event {
            Terminal::Success(_) => self.core.arity.allows_success(),
            Terminal::Complete => self.core.arity.allows_completion(),
            Terminal::Error(_) => true,
        };
        if !allowed {
            raise(Fault::WrongArity {
                event: event.label(),
                arity: self.core.arity.label(),
            });
        }

        match self
            .core
            .state
            .compare_exchange(STARTED, TERMINATED, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => {}
            // Cancellation won the race after the fast-path check above.
            Err(UNSUBSCRIBED) => {
                trace!(event = event.label(), "terminal after unsubscribe, dropped");
                return;
            }
            Err(TERMINATED) => raise(Fault::AfterTerminal {
                event: event.label(),
            }),
            Err(_) => raise(Fault::BeforeStart {
                event: event.label(),
            }),
        }

        let core = Arc::clone(&self.core);
        self.observe_on
            .execute(Box::new(move || core.deliver_terminal(event)));
    }
}

// --- Delivery (runs on the observation scheduler) ---
//
// The consumer slot is never locked while a callback runs: take, unlock,
// call, restore-if-still-live. Callbacks may therefore call `unsubscribe()`
// without deadlocking; a consumer held out of the slot during cancellation
// is dropped instead of restored.

impl<T: Send + 'static> Core<T> {
    fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::SeqCst) == UNSUBSCRIBED
    }

    fn deliver_start(&self) {
        let mut consumer = match self.consumer.lock().take() {
            Some(consumer) => consumer,
            None => return,
        };
        let start = consumer.start.take();
        self.restore(consumer);
        if let Some(f) = start {
            f();
        }
    }

    fn deliver_next(&self, value: T) {
        let mut consumer = match self.consumer.lock().take() {
            Some(consumer) => consumer,
            None => {
                trace!("next delivery dropped, consumer released");
                return;
            }
        };
        if let Some(f) = consumer.next.as_mut() {
            f(value);
        }
        self.restore(consumer);
    }

    fn deliver_terminal(&self, event: Terminal<T>) {
        let consumer = match self.consumer.lock().take() {
            Some(consumer) => consumer,
            None => {
                trace!(
                    event = event.label(),
                    "terminal delivery dropped, consumer released"
                );
                return;
            }
        };
        match event {
            Terminal::Success(value) => {
                if let Some(f) = consumer.success {
                    f(value);
                }
            }
            Terminal::Complete => {
                if let Some(f) = consumer.complete {
                    f();
                }
            }
            Terminal::Error(cause) => match consumer.error {
                Some(f) => f(cause),
                None => panic_any(UnhandledError(cause)),
            },
        }
        // `consumer` dropped here: the reference is released at the first
        // terminal event and never invoked again.
    }

    fn restore(&self, consumer: Consumer<T>) {
        if self.is_cancelled() {
            return;
        }
        let mut slot = self.consumer.lock();
        if slot.is_none() {
            *slot = Some(consumer);
        }
    }
}

impl<T: Send + 'static> Cancellable for Core<T> {
    fn cancel(&self) {
        let previous = self.state.swap(UNSUBSCRIBED, Ordering::SeqCst);
        let consumer = self.consumer.lock().take();
        drop(consumer);
        if previous != UNSUBSCRIBED {
            trace!(arity = self.arity.label(), "subscription cancelled");
        }
    }

    fn is_cancelled(&self) -> bool {
        Core::is_cancelled(self)
    }
}
