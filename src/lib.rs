//! # rivulet
//!
//! Minimal reactive primitives: four emission-arity variants sharing one
//! generic subscription/scheduling engine.
//!
//! ## Core Concepts
//!
//! - **Variants**: [`Completable`] (no values), [`Maybe`] (zero or one),
//!   [`Single`] (exactly one), [`Observable`] (a stream): thin facades
//!   pinning an arity policy on the shared engine
//! - **Actions**: the user closure driving emissions, created once at build
//!   time and invoked once per `subscribe` call
//! - **Schedulers**: where the action runs (`subscribe_on`) and where
//!   consumer callbacks are delivered (`observe_on`); both default to
//!   inline execution
//! - **Subscriptions**: cancellable handles; after `unsubscribe`, late
//!   emissions are dropped silently, never delivered and never faulted
//!
//! Protocol violations by an action (a second terminal event, an event
//! after a terminal) are *misuse faults*: loud panics distinct from the
//! business-error channel, which flows to the consumer's error callback.
//!
//! ## Example
//!
//! ```
//! use rivulet::{Consumer, Observable};
//!
//! let numbers = Observable::from_iter(vec![1, 2, 3]).map(|n| n * 10);
//!
//! let subscription = numbers.subscribe(
//!     Consumer::new()
//!         .on_next(|n| println!("got {n}"))
//!         .on_complete(|| println!("done"))
//!         .on_error(|cause| eprintln!("failed: {cause}")),
//! );
//!
//! // Immediate schedulers by default: everything already ran.
//! assert!(!subscription.is_unsubscribed());
//! ```

pub mod engine;
pub mod error;
pub mod schedulers;
pub mod variants;

// Re-exports
pub use engine::{Arity, Consumer, Subscription};
pub use error::{Cause, Fault, MessageError, PanicError, UnhandledError};
pub use schedulers::{ImmediateScheduler, Job, PoolScheduler, Scheduler, WorkerScheduler};
pub use variants::{
    Completable, CompletableEmitter, Maybe, MaybeEmitter, Observable, ObservableEmitter, Single,
    SingleEmitter,
};
