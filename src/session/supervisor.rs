//! One task per inbound router connection.
//!
//! The supervisor owns the accept loop and nothing else: no cross
//! session state, no peer knowledge. Each task reads framed BMP
//! messages, drives its [`Session`](super::Session) and pushes the
//! resulting records at the shared publisher. A malformed frame kills
//! its own session and no other.

use log::{error, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::parser::bmp::messages::{parse_bmp_common_header, BMP_COMMON_HEADER_LEN};
use crate::publisher::KafkaPublisher;
use crate::session::Session;

/// How long session tasks get to wind down after a shutdown signal
/// before their transports are dropped.
pub const DRAIN_WINDOW: Duration = Duration::from_secs(5);

/// Counters shared across all sessions, for logging and tests.
#[derive(Debug, Default)]
pub struct SupervisorStats {
    pub sessions_opened: AtomicU64,
    pub sessions_failed: AtomicU64,
    pub decode_errors: AtomicU64,
}

/// Accept router connections until `shutdown` flips, spawning one
/// decoder task per connection.
pub async fn serve(
    listener: TcpListener,
    publisher: KafkaPublisher,
    mut shutdown: watch::Receiver<bool>,
    stats: Arc<SupervisorStats>,
) -> std::io::Result<()> {
    let mut tasks = JoinSet::new();
    info!("listening on {}", listener.local_addr()?);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, addr) = accepted?;
                stats.sessions_opened.fetch_add(1, Ordering::Relaxed);
                let publisher = publisher.clone();
                let shutdown = shutdown.clone();
                let stats = stats.clone();
                tasks.spawn(async move {
                    run_session(stream, addr.to_string(), publisher, shutdown, stats).await;
                });
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    // bounded drain: after the window, remaining tasks are aborted and
    // their transports dropped
    info!("draining {} session task(s)", tasks.len());
    if tokio::time::timeout(DRAIN_WINDOW, async {
        while tasks.join_next().await.is_some() {}
    })
    .await
    .is_err()
    {
        warn!("drain window expired, aborting remaining sessions");
        tasks.abort_all();
    }
    Ok(())
}

/// Read frames for one session until EOF, shutdown, or a fatal error.
async fn run_session(
    mut stream: TcpStream,
    router: String,
    publisher: KafkaPublisher,
    mut shutdown: watch::Receiver<bool>,
    stats: Arc<SupervisorStats>,
) {
    info!("session {}: opened", router);
    let mut session = Session::new(router.clone());

    let close_reason = loop {
        let mut header = [0u8; BMP_COMMON_HEADER_LEN];
        tokio::select! {
            read = stream.read_exact(&mut header) => {
                match read {
                    Ok(_) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break "eof",
                    Err(e) => {
                        warn!("session {}: read error: {}", router, e);
                        break "read error";
                    }
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break "shutdown";
                }
                continue;
            }
        }

        let common = match parse_bmp_common_header(&mut header.as_slice()) {
            Ok(common) => common,
            Err(e) => {
                error!("session {}: {}", router, e);
                stats.sessions_failed.fetch_add(1, Ordering::Relaxed);
                break "framing error";
            }
        };

        let mut body = vec![0u8; common.msg_len as usize - BMP_COMMON_HEADER_LEN];
        if let Err(e) = stream.read_exact(&mut body).await {
            warn!("session {}: truncated frame: {}", router, e);
            break "truncated frame";
        }

        match session.process_message(common.msg_type, &body) {
            Ok(records) => {
                for record in records {
                    publisher.publish(&record);
                }
                if session.state() == super::SessionState::Closed {
                    break "termination";
                }
            }
            Err(e) => {
                error!("session {}: fatal: {}", router, e);
                stats.sessions_failed.fetch_add(1, Ordering::Relaxed);
                break "protocol error";
            }
        }
    };

    stats
        .decode_errors
        .fetch_add(session.decode_errors(), Ordering::Relaxed);

    // every peer still on the table is reported down before the
    // session's resources go away
    for record in session.close() {
        publisher.publish(&record);
    }
    info!("session {}: closed ({})", router, close_reason);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_default_zeroed() {
        let stats = SupervisorStats::default();
        assert_eq!(stats.sessions_opened.load(Ordering::Relaxed), 0);
        assert_eq!(stats.decode_errors.load(Ordering::Relaxed), 0);
    }
}
