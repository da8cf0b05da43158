use crate::prober::{Outcome, ProbeAttempt};

/// Running aggregates over one probe session. Owned by the session loop and
/// updated from that single thread only. All four latency accumulators hold
/// whole microseconds; mixing resolutions would let min drift above avg.
#[derive(Debug)]
pub struct SessionStats {
    transmitted: u64,
    received: u64,
    min_us: u64,
    max_us: u64,
    sum_us: u64,
    sum_sq_us: u128,
}

/// Everything the end-of-session report needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    pub transmitted: u64,
    pub received: u64,
    /// Integer percentage in [0, 100], truncating division.
    pub loss_percent: u64,
    /// Present only when at least one attempt succeeded.
    pub latency: Option<LatencySummary>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySummary {
    pub min_ms: f64,
    pub avg_ms: f64,
    pub max_ms: f64,
    /// sqrt(mean of squares - square of mean), the ping-style jitter figure.
    pub mdev_ms: f64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            transmitted: 0,
            received: 0,
            min_us: u64::MAX,
            max_us: 0,
            sum_us: 0,
            sum_sq_us: 0,
        }
    }

    /// Counts the attempt; the latency accumulators move only on success.
    pub fn record(&mut self, attempt: &ProbeAttempt) {
        self.transmitted += 1;
        if attempt.outcome != Outcome::Success {
            return;
        }
        let Some(latency) = attempt.latency else {
            return;
        };
        self.received += 1;
        let us = latency.as_micros() as u64;
        self.min_us = self.min_us.min(us);
        self.max_us = self.max_us.max(us);
        self.sum_us += us;
        self.sum_sq_us += u128::from(us) * u128::from(us);
    }

    pub fn summarize(&self) -> SessionSummary {
        let loss_percent = if self.transmitted == 0 {
            100
        } else {
            100 - (100 * self.received) / self.transmitted
        };
        let latency = (self.received > 0).then(|| {
            let n = self.received as f64;
            let avg_us = self.sum_us as f64 / n;
            // population variance; truncation can push it mildly negative
            let variance = (self.sum_sq_us as f64 / n - avg_us * avg_us).max(0.0);
            LatencySummary {
                min_ms: self.min_us as f64 / 1e3,
                avg_ms: avg_us / 1e3,
                max_ms: self.max_us as f64 / 1e3,
                mdev_ms: variance.sqrt() / 1e3,
            }
        });
        SessionSummary {
            transmitted: self.transmitted,
            received: self.received,
            loss_percent,
            latency,
        }
    }
}
