use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::prober::{ProbeAttempt, tcp_connect};
use crate::stats::{SessionStats, SessionSummary};

/// Drives the probe loop against one resolved target. Cancellation is
/// cooperative: the flag is checked only between attempts, so an in-flight
/// probe (connect, backoff or pacing sleep included) always runs out.
pub struct Session {
    host: String,
    addr: SocketAddr,
    running: Arc<AtomicBool>,
    stats: SessionStats,
    seq: u64,
    started: Instant,
}

/// Final report, printed once after the loop exits.
#[derive(Debug)]
pub struct SessionReport {
    pub host: String,
    pub elapsed: Duration,
    pub summary: SessionSummary,
}

impl Session {
    pub fn new(host: String, addr: SocketAddr, running: Arc<AtomicBool>) -> Self {
        Self {
            host,
            addr,
            running,
            stats: SessionStats::new(),
            seq: 0,
            started: Instant::now(),
        }
    }

    pub fn run(self) -> SessionReport {
        self.run_with(|_| {})
    }

    /// `observe` sees every completed attempt, in order.
    fn run_with<F: FnMut(&ProbeAttempt)>(mut self, mut observe: F) -> SessionReport {
        while self.running.load(Ordering::SeqCst) {
            self.seq += 1;
            let attempt = tcp_connect::probe(self.addr, self.seq);
            observe(&attempt);
            self.stats.record(&attempt);
        }
        debug!("session loop stopped after {} attempts", self.seq);
        SessionReport {
            host: self.host,
            elapsed: self.started.elapsed(),
            summary: self.stats.summarize(),
        }
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {} tcping statistics ---", self.host)?;
        write!(
            f,
            "{} attempts transmitted, {} succeeded, {}% loss, time {} ms",
            self.summary.transmitted,
            self.summary.received,
            self.summary.loss_percent,
            self.elapsed.as_millis()
        )?;
        if let Some(latency) = &self.summary.latency {
            write!(
                f,
                "\nrtt min/avg/max/mdev = {:.3}/{:.3}/{:.3}/{:.3} ms",
                latency.min_ms, latency.avg_ms, latency.max_ms, latency.mdev_ms
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::thread;

    use super::*;

    #[test]
    fn cleared_flag_stops_before_the_first_attempt() {
        let addr = "127.0.0.1:1".parse().expect("addr");
        let running = Arc::new(AtomicBool::new(false));
        let report = Session::new("localhost".into(), addr, running).run();
        assert_eq!(report.summary.transmitted, 0);
        assert_eq!(report.summary.loss_percent, 100);
        assert!(report.summary.latency.is_none());
    }

    #[test]
    fn accepting_target_yields_a_lossless_session() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let addr = listener.local_addr().expect("local addr");

        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(2500));
            flag.store(false, Ordering::SeqCst);
        });

        let mut seqs = Vec::new();
        let report = Session::new("localhost".into(), addr, running)
            .run_with(|attempt| seqs.push(attempt.seq));
        stopper.join().expect("stopper thread");

        // ~1 Hz pacing: the 2.5 s window fits 2 or 3 whole attempts, and the
        // in-flight attempt at cancellation time still completes
        assert!(
            (2..=3).contains(&report.summary.transmitted),
            "transmitted {}",
            report.summary.transmitted
        );
        assert_eq!(report.summary.transmitted, report.summary.received);
        assert_eq!(report.summary.loss_percent, 0);
        assert!(report.summary.latency.is_some());
        assert!(report.elapsed >= Duration::from_millis(2500));
        let expected: Vec<u64> = (1..=seqs.len() as u64).collect();
        assert_eq!(seqs, expected);
    }

    #[test]
    fn sequence_numbers_stay_consecutive_across_failures() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(1500));
            flag.store(false, Ordering::SeqCst);
        });

        let mut seqs = Vec::new();
        let report = Session::new("localhost".into(), addr, running)
            .run_with(|attempt| seqs.push(attempt.seq));
        stopper.join().expect("stopper thread");

        // refused attempts bump the counter too: exactly 1, 2, 3, ...
        assert!(!seqs.is_empty());
        let expected: Vec<u64> = (1..=seqs.len() as u64).collect();
        assert_eq!(seqs, expected);
        assert_eq!(report.summary.transmitted, seqs.len() as u64);
        assert_eq!(report.summary.received, 0);
    }

    #[test]
    fn refusing_target_yields_total_loss() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(1500));
            flag.store(false, Ordering::SeqCst);
        });

        let report = Session::new("localhost".into(), addr, running).run();
        stopper.join().expect("stopper thread");

        assert!(report.summary.transmitted >= 1);
        assert_eq!(report.summary.received, 0);
        assert_eq!(report.summary.loss_percent, 100);
        assert!(report.summary.latency.is_none());
    }

    #[test]
    fn report_omits_rtt_line_when_nothing_succeeded() {
        let addr = "127.0.0.1:1".parse().expect("addr");
        let report = Session::new("nowhere".into(), addr, Arc::new(AtomicBool::new(false))).run();
        let text = report.to_string();
        assert!(text.contains("--- nowhere tcping statistics ---"));
        assert!(text.contains("0 attempts transmitted, 0 succeeded, 100% loss"));
        assert!(!text.contains("rtt min/avg/max/mdev"));
    }
}
