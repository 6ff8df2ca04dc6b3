//! Error types for the subscription engine.
//!
//! Two channels are kept strictly apart: *business errors* travel to the
//! consumer's error callback as a [`Cause`], while *misuse faults* are raised
//! as panics carrying a [`Fault`] payload. A fault means the action broke the
//! emission protocol; it is never delivered as an error.

use std::any::Any;
use std::sync::Arc;
use thiserror::Error;

/// Opaque error cause carried on the business-error channel.
///
/// Shared so that builders like `Observable::error` can hand the same cause
/// to every subscription.
pub type Cause = Arc<dyn std::error::Error + Send + Sync>;

/// Protocol violations by an action. Raised via `panic_any`, loud and
/// immediate, so the bug is caught where it happens instead of surfacing as
/// a spurious business error downstream.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("start signalled twice")]
    StartedTwice,

    #[error("{event} signalled after a terminal event")]
    AfterTerminal { event: &'static str },

    #[error("{event} signalled before start")]
    BeforeStart { event: &'static str },

    #[error("{event} is not legal for a {arity} subscription")]
    WrongArity {
        event: &'static str,
        arity: &'static str,
    },
}

/// Panic payload used to re-raise an error that reached a consumer with no
/// error callback installed. Errors are acknowledged or they are loud; they
/// are never swallowed.
#[derive(Debug, Error)]
#[error("unhandled subscription error: {0}")]
pub struct UnhandledError(pub Cause);

/// A panic captured from an action body and translated into the error
/// channel.
#[derive(Debug, Error)]
#[error("action panicked: {message}")]
pub struct PanicError {
    pub message: String,
}

impl PanicError {
    /// Extract a printable message from a caught panic payload.
    pub(crate) fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        Self { message }
    }
}

/// Ad-hoc cause built from a plain message.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct MessageError(pub String);

impl MessageError {
    /// Wrap a message as a [`Cause`].
    pub fn cause(message: impl Into<String>) -> Cause {
        Arc::new(MessageError(message.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_payload_messages() {
        let payload: Box<dyn Any + Send> = Box::new("static str panic");
        assert_eq!(
            PanicError::from_payload(payload.as_ref()).message,
            "static str panic"
        );

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned panic"));
        assert_eq!(
            PanicError::from_payload(payload.as_ref()).message,
            "owned panic"
        );

        let payload: Box<dyn Any + Send> = Box::new(42u32);
        assert_eq!(
            PanicError::from_payload(payload.as_ref()).message,
            "unknown panic"
        );
    }

    #[test]
    fn test_fault_display() {
        let fault = Fault::AfterTerminal { event: "complete" };
        assert_eq!(
            fault.to_string(),
            "complete signalled after a terminal event"
        );
    }

    #[test]
    fn test_message_cause_displays_message() {
        let cause = MessageError::cause("boom");
        assert_eq!(cause.to_string(), "boom");
    }
}
