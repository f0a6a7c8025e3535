use bytes::BytesMut;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

const BUFFER_SIZE: usize = 16 * 1024;

/// Why a connection handler returned.
#[derive(Debug)]
pub enum Termination {
    Eof,
    IdleTimeout,
    Shutdown,
    Error(io::Error),
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Eof => write!(f, "clean EOF"),
            Termination::IdleTimeout => write!(f, "idle timeout"),
            Termination::Shutdown => write!(f, "shutdown"),
            Termination::Error(e) => write!(f, "I/O error: {e}"),
        }
    }
}

/// Echoes bytes back to the peer until EOF, an I/O error, the idle
/// timeout, or cancellation. The write side is shut down on every exit
/// path, so a half-closed peer receives everything echoed so far.
pub async fn handle<S>(
    mut stream: S,
    idle_timeout: Duration,
    cancel: &CancellationToken,
) -> Termination
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = BytesMut::with_capacity(BUFFER_SIZE);
    let termination = loop {
        buf.clear();
        let read = tokio::select! {
            read = timeout(idle_timeout, stream.read_buf(&mut buf)) => read,
            () = cancel.cancelled() => break Termination::Shutdown,
        };
        match read {
            Ok(Ok(0)) => break Termination::Eof,
            Ok(Ok(n)) => {
                if let Err(e) = stream.write_all(&buf[..n]).await {
                    break Termination::Error(e);
                }
            }
            Ok(Err(e)) => break Termination::Error(e),
            Err(_elapsed) => break Termination::IdleTimeout,
        }
    };
    let _ = stream.shutdown().await;
    termination
}
