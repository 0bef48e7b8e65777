use super::*;

/// What the session reports to its owner, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Subscribed {
        extranonce1: Extranonce,
        extranonce2_size: usize,
    },
    Connected,
    Job(Arc<Job>),
    Difficulty(f64),
    ShareAccepted {
        job_id: JobId,
    },
    ShareRejected {
        job_id: JobId,
        reason: String,
    },
    Disconnected,
}
