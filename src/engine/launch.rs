//! Subscription orchestration: wiring an action to a fresh state machine.

use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::{Cause, Fault, PanicError, UnhandledError};
use crate::schedulers::Scheduler;

use super::machine::Machine;
use super::types::{Arity, Consumer, Subscription};

/// Build a machine bound to `observe_on`, fire the start signal, submit the
/// action to `subscribe_on`, and return the machine as the subscription
/// handle.
///
/// The start signal is fired synchronously, before any producer work is
/// scheduled, so the consumer observes "subscription began" even when the
/// subscription scheduler delays the action.
pub(crate) fn launch<T, E>(
    arity: Arity,
    consumer: Consumer<T>,
    subscribe_on: &Arc<dyn Scheduler>,
    observe_on: &Arc<dyn Scheduler>,
    make_emitter: impl FnOnce(Machine<T>) -> E + Send + 'static,
    action: Arc<dyn Fn(E) -> Result<(), Cause> + Send + Sync>,
) -> Subscription
where
    T: Send + 'static,
    E: 'static,
{
    let machine = Machine::new(arity, consumer, Arc::clone(observe_on));
    machine.start();

    let worker = machine.clone();
    subscribe_on.execute(Box::new(move || {
        let emitter = make_emitter(worker.clone());
        run_action(&worker, move || action(emitter));
    }));

    machine.handle()
}

/// Invoke the action body and translate whatever escapes it.
///
/// A returned `Err` is a deliberate error event and is routed through the
/// machine's error transition (so it is a silent no-op after cancellation
/// and a misuse fault after a terminal). A panic is translated into the
/// error channel, with two exceptions: a payload that is already a
/// recognized fault is re-raised untouched, and a panic after cancellation
/// is fatal since there is no consumer left to deliver it to.
fn run_action<T: Send + 'static>(machine: &Machine<T>, body: impl FnOnce() -> Result<(), Cause>) {
    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => {}
        Ok(Err(cause)) => machine.error(cause),
        Err(payload) => {
            if payload.is::<Fault>() || payload.is::<UnhandledError>() {
                resume_unwind(payload);
            }
            if machine.is_cancelled() {
                // The action threw instead of observing cancellation and
                // stopping; this cannot be delivered anywhere.
                resume_unwind(payload);
            }
            let cause = Arc::new(PanicError::from_payload(payload.as_ref()));
            machine.error(cause);
        }
    }
}
