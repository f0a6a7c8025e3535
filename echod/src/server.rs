use crate::connection;
use anyhow::Context;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

pub struct Server {
    idle_timeout: Duration,
    limit: Option<Arc<Semaphore>>,
}

impl Server {
    pub fn new(idle_timeout: Duration, max_conns: Option<usize>) -> Self {
        Self {
            idle_timeout,
            limit: max_conns.map(|n| Arc::new(Semaphore::new(n))),
        }
    }

    /// Accepts connections until `cancel` fires or a fatal accept error
    /// occurs, running one handler task per connection. On shutdown, stops
    /// accepting and waits up to `grace_period` for handlers to drain.
    pub async fn serve(
        &self,
        listener: TcpListener,
        cancel: CancellationToken,
        grace_period: Duration,
    ) -> anyhow::Result<()> {
        let tracker = TaskTracker::new();
        loop {
            let permit = match &self.limit {
                Some(semaphore) => tokio::select! {
                    permit = semaphore.clone().acquire_owned() => {
                        Some(permit.context("connection limit semaphore closed")?)
                    }
                    () = cancel.cancelled() => break,
                },
                None => None,
            };
            let accepted = tokio::select! {
                accepted = listener.accept() => accepted,
                () = cancel.cancelled() => break,
            };
            match accepted {
                Ok((stream, addr)) => {
                    info!("Accepted connection from {addr}");
                    let idle_timeout = self.idle_timeout;
                    let cancel = cancel.clone();
                    tracker.spawn(async move {
                        let _permit = permit;
                        let termination =
                            connection::handle(stream, idle_timeout, &cancel).await;
                        info!("Connection from {addr} closed: {termination}");
                    });
                }
                Err(e) if is_transient(&e) => {
                    warn!("Transient accept error: {e}");
                }
                Err(e) => {
                    error!("Accept failed, shutting down: {e}");
                    cancel.cancel();
                    break;
                }
            }
        }
        tracker.close();
        if tokio::time::timeout(grace_period, tracker.wait())
            .await
            .is_err()
        {
            warn!("Grace period elapsed with connections still open");
        }
        Ok(())
    }
}

/// Accept errors worth retrying. A connection that dies between the kernel
/// queue and our accept, or a file-descriptor shortage, should not take the
/// listener down.
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
    )
}
