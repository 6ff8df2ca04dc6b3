//! The scheduler boundary.

/// A unit of work submitted to a scheduler.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// An execution context for units of work.
///
/// `execute` runs `job` on an implementation-defined context, synchronously
/// or asynchronously. There is no return value and no cancellation of the
/// job itself; the engine cancels at the delivery layer instead.
///
/// Submitting to a scheduler that has been shut down is a fatal
/// process-level condition: implementations panic rather than drop work
/// silently. The engine assumes `execute` does not fail.
pub trait Scheduler: Send + Sync {
    fn execute(&self, job: Job);
}
