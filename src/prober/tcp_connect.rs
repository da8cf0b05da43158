use std::io;
use std::net::SocketAddr;
use std::thread;
use std::time::{Duration, Instant};

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{error, warn};

use super::{Outcome, ProbeAttempt};

/// Send/receive deadline applied to every probe socket before connecting.
const IO_DEADLINE: Duration = Duration::from_secs(1);

/// Fixed pause after any failed attempt, so failures tick at ~1 Hz too.
const FAILURE_BACKOFF: Duration = Duration::from_secs(1);

/// One probe: fresh socket, timed blocking connect, close, then either the
/// failure backoff or the pacing sleep up to the next whole-second boundary.
pub fn probe(addr: SocketAddr, seq: u64) -> ProbeAttempt {
    let socket = match new_probe_socket(addr) {
        Ok(socket) => socket,
        Err(e) => {
            error!("failed to create socket: {e}");
            // an immediate retry busy-loops when fds are exhausted; back
            // off like every other failure class
            thread::sleep(FAILURE_BACKOFF);
            return ProbeAttempt {
                seq,
                outcome: Outcome::EndpointCreationFailed,
                latency: None,
            };
        }
    };

    let begin = Instant::now();
    match socket.connect(&addr.into()) {
        Ok(()) => {
            let elapsed = begin.elapsed();
            drop(socket);
            println!(
                "  OK   Connected to {addr}, seq={seq}, time={:6.3} ms",
                elapsed.as_secs_f64() * 1e3
            );
            pace(elapsed);
            ProbeAttempt {
                seq,
                outcome: Outcome::Success,
                latency: Some(elapsed),
            }
        }
        Err(e) => {
            let outcome = classify(&e);
            match outcome {
                Outcome::ResourceExhausted => {
                    error!("too many open files while connecting {addr}, seq={seq}: {e}")
                }
                Outcome::Refused => warn!("connection refused by {addr}, seq={seq}"),
                Outcome::HostUnreachable => {
                    warn!("host unreachable while connecting {addr}, seq={seq}")
                }
                Outcome::Timeout => warn!("timeout while connecting {addr}, seq={seq}"),
                _ => warn!("connect error to {addr}, seq={seq}: {e}"),
            }
            drop(socket);
            thread::sleep(FAILURE_BACKOFF);
            ProbeAttempt {
                seq,
                outcome,
                latency: None,
            }
        }
    }
}

// fresh socket per attempt, never reused
fn new_probe_socket(addr: SocketAddr) -> io::Result<Socket> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    // deadline failures degrade to the platform default, they do not abort
    if let Err(e) = socket.set_read_timeout(Some(IO_DEADLINE)) {
        warn!("failed to set receive deadline: {e}");
    }
    if let Err(e) = socket.set_write_timeout(Some(IO_DEADLINE)) {
        warn!("failed to set send deadline: {e}");
    }
    Ok(socket)
}

fn classify(err: &io::Error) -> Outcome {
    match err.raw_os_error() {
        Some(libc::EMFILE) | Some(libc::ENFILE) => Outcome::ResourceExhausted,
        Some(libc::ECONNREFUSED) => Outcome::Refused,
        Some(libc::EHOSTUNREACH) => Outcome::HostUnreachable,
        // a blocking connect cut short by SO_SNDTIMEO surfaces as EINPROGRESS
        Some(libc::EINPROGRESS) | Some(libc::ETIMEDOUT) | Some(libc::EWOULDBLOCK) => {
            Outcome::Timeout
        }
        _ => Outcome::OtherConnectError,
    }
}

/// Sleeps so the attempt's total span (connect + sleep) lands on the next
/// whole-second boundary measured from the attempt's own start.
fn pace(elapsed: Duration) {
    let whole_secs = elapsed.as_micros() as u64 / 1_000_000;
    let target = Duration::from_secs(whole_secs + 1);
    if let Some(remaining) = target.checked_sub(elapsed) {
        thread::sleep(remaining);
    }
}
