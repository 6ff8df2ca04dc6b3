//! Engine-facing types: arity policies, consumer callbacks, subscriptions.

use std::fmt;
use std::sync::Arc;

use crate::error::Cause;

/// How many value-carrying events a subscription may legally emit.
///
/// One generic state machine is parameterized by this value; the four
/// variant facades each pin one of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    /// No values; terminates with `complete` or `error`.
    Zero,
    /// Zero or one value; `success` and `complete` are mutually exclusive.
    AtMostOne,
    /// Exactly one value; terminates with `success` or `error`.
    ExactlyOne,
    /// Any number of `next` values, strictly before `complete` or `error`.
    Many,
}

impl Arity {
    pub(crate) fn allows_intermediate(self) -> bool {
        matches!(self, Arity::Many)
    }

    pub(crate) fn allows_success(self) -> bool {
        matches!(self, Arity::AtMostOne | Arity::ExactlyOne)
    }

    pub(crate) fn allows_completion(self) -> bool {
        !matches!(self, Arity::ExactlyOne)
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Arity::Zero => "zero-result",
            Arity::AtMostOne => "optional-single",
            Arity::ExactlyOne => "exactly-one",
            Arity::Many => "multi-result",
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A terminal event carried from the producer to its delivery job.
pub(crate) enum Terminal<T> {
    Success(T),
    Complete,
    Error(Cause),
}

impl<T> Terminal<T> {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Terminal::Success(_) => "success",
            Terminal::Complete => "complete",
            Terminal::Error(_) => "error",
        }
    }
}

type StartFn = Box<dyn FnOnce() + Send>;
type NextFn<T> = Box<dyn FnMut(T) + Send>;
type SuccessFn<T> = Box<dyn FnOnce(T) + Send>;
type CompleteFn = Box<dyn FnOnce() + Send>;
type ErrorFn = Box<dyn FnOnce(Cause) + Send>;

/// The callback set for one subscription.
///
/// Every slot is optional and defaults to a no-op, except the error slot: an
/// error delivered with no `on_error` installed re-raises as an
/// [`UnhandledError`](crate::error::UnhandledError) panic, forcing explicit
/// acknowledgment.
///
/// Which slots fire depends on the variant subscribed to: `on_next` only for
/// multi-result, `on_success` only for the single-valued arities.
pub struct Consumer<T> {
    pub(crate) start: Option<StartFn>,
    pub(crate) next: Option<NextFn<T>>,
    pub(crate) success: Option<SuccessFn<T>>,
    pub(crate) complete: Option<CompleteFn>,
    pub(crate) error: Option<ErrorFn>,
}

impl<T> Consumer<T> {
    /// All slots empty.
    pub fn new() -> Self {
        Self {
            start: None,
            next: None,
            success: None,
            complete: None,
            error: None,
        }
    }

    /// Called once when the subscription begins, before any other event.
    pub fn on_start(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.start = Some(Box::new(f));
        self
    }

    /// Called for each intermediate value (multi-result only).
    pub fn on_next(mut self, f: impl FnMut(T) + Send + 'static) -> Self {
        self.next = Some(Box::new(f));
        self
    }

    /// Called with the terminal value (single-valued arities only).
    pub fn on_success(mut self, f: impl FnOnce(T) + Send + 'static) -> Self {
        self.success = Some(Box::new(f));
        self
    }

    /// Called on empty completion.
    pub fn on_complete(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.complete = Some(Box::new(f));
        self
    }

    /// Called with the terminal error cause.
    pub fn on_error(mut self, f: impl FnOnce(Cause) + Send + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }
}

impl<T> Default for Consumer<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancellation surface of the state machine, object-safe so one handle type
/// serves every item type.
pub(crate) trait Cancellable: Send + Sync {
    fn cancel(&self);
    fn is_cancelled(&self) -> bool;
}

/// Handle returned by `subscribe`: the public cancellation facade over the
/// per-subscription state machine.
pub struct Subscription {
    machine: Arc<dyn Cancellable>,
}

impl Subscription {
    pub(crate) fn new(machine: Arc<dyn Cancellable>) -> Self {
        Self { machine }
    }

    /// Cancel the subscription, releasing the consumer immediately.
    ///
    /// Idempotent and safe from any thread at any time. Every event the
    /// action attempts afterwards is silently dropped.
    pub fn unsubscribe(&self) {
        self.machine.cancel();
    }

    /// Whether the subscription has been cancelled. Monotonic: once true,
    /// never reverts.
    pub fn is_unsubscribed(&self) -> bool {
        self.machine.is_cancelled()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("unsubscribed", &self.is_unsubscribed())
            .finish()
    }
}
