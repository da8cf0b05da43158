use std::time::Duration;

pub mod tcp_connect;

/// Classification of a single connect attempt. Exactly one per attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Too many open handles (EMFILE/ENFILE family).
    ResourceExhausted,
    Refused,
    HostUnreachable,
    Timeout,
    OtherConnectError,
    /// The socket itself could not be created; no connect was attempted.
    EndpointCreationFailed,
}

/// One create-connect-close cycle against the target. Produced by the
/// prober, consumed by the session stats, never retained.
#[derive(Debug, Clone, Copy)]
pub struct ProbeAttempt {
    /// 1-based sequence number assigned by the session loop.
    pub seq: u64,
    pub outcome: Outcome,
    /// Connect time, present only for `Outcome::Success`.
    pub latency: Option<Duration>,
}
