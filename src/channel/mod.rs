//! Named datagram channels between the server and its clients.
//!
//! Requests arrive on a well-known query socket the server owns;
//! answers to DISPLAY go out over a response socket the requesting
//! client binds before asking. One datagram carries one encoded
//! record, so no framing is needed on top.

use crate::err::Result;
use crate::global_var::LOGGER;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::net::UnixDatagram;

/// One encoded record fits well inside this; both message fields are
/// capped at 255 bytes each.
const MAX_RECORD_BYTES: usize = 2048;

/// Server end of the request channel. Owns the socket file and
/// unlinks it on `unlink`.
pub struct QueryChannel {
    socket: UnixDatagram,
    path: PathBuf,
}

impl QueryChannel {
    /// Bind the request socket, replacing a stale file left behind by
    /// a previous run.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            fs::remove_file(&path)?;
        }
        let socket = UnixDatagram::bind(&path)?;
        Ok(Self { socket, path })
    }

    /// Receive one encoded request record.
    pub async fn recv_record(&self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; MAX_RECORD_BYTES];
        let n = self.socket.recv(&mut buf).await?;
        buf.truncate(n);
        Ok(buf)
    }

    pub fn unlink(&self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Sending end of the response channel. The client binds the path;
/// until it does, connecting is retried once a second.
pub struct ResponseChannel {
    socket: UnixDatagram,
}

impl ResponseChannel {
    pub async fn open_with_retry<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        loop {
            let socket = UnixDatagram::unbound()?;
            match socket.connect(path) {
                Ok(()) => return Ok(Self { socket }),
                Err(e) => {
                    LOGGER.warn(format!(
                        "Response channel {} is not ready yet: {}",
                        path.display(),
                        e
                    ));
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    pub async fn send_record(&self, record: &[u8]) -> Result<()> {
        self.socket.send(record).await?;
        Ok(())
    }
}
