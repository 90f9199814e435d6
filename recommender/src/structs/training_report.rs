use serde::Serialize;

/// Summary of one sweep over all known users.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrainingReport {
    /// Users found in the activity log.
    pub users: usize,
    /// Users that produced a transition.
    pub transitions: usize,
    /// Replays that actually trained a minibatch.
    pub replays_trained: usize,
    /// Sweep stopped early on the stop signal.
    pub interrupted: bool,
    pub epsilon: f32,
    pub elapsed_ms: u64,
}
