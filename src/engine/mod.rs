//! The generic subscription engine shared by all four variants.
//!
//! One state machine type, parameterized by an [`Arity`] policy, enforces
//! the legal event sequence for every subscription:
//!
//! - the start signal fires at most once, before any other event
//! - exactly one terminal event (success, completion, or error) occurs,
//!   unless cancellation precedes it
//! - after a terminal event or cancellation the consumer reference is
//!   released and never invoked again
//!
//! Every delivery to the consumer is marshaled through the subscription's
//! observation scheduler. Illegal event sequences are *misuse faults*,
//! loud panics distinct from the business-error channel, while emissions
//! arriving after cancellation are silently dropped: a cancellation racing
//! with in-flight producer work is expected and must not crash
//! otherwise-correct code.

mod launch;
mod machine;
mod types;

pub use types::{Arity, Consumer, Subscription};

pub(crate) use launch::launch;
pub(crate) use machine::Machine;
