//! Synchronous inline scheduler.

use super::types::{Job, Scheduler};

/// Runs every job inline on the calling thread.
///
/// This is the default for both the subscription and the observation
/// context: marshaling through it degenerates to a plain call, so consumers
/// see events on whichever thread produced them, synchronously.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
    fn execute(&self, job: Job) {
        job();
    }
}
