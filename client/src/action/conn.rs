use crate::error::ClientError;
use api_model::protocol::message::query_message::QueryMessage;
use api_model::protocol::message::response_message::ResponseMessage;
use api_model::protocol::protocol::Protocol;
use std::os::unix::net::UnixDatagram;
use std::path::PathBuf;
use std::time::Duration;

/// Sending end of the request channel. The server must already own
/// the socket path for `open` to succeed.
pub struct Connection {
    socket: UnixDatagram,
}

impl Connection {
    pub fn open(path: &str) -> Result<Self, ClientError> {
        let socket = UnixDatagram::unbound().map_err(|e| {
            ClientError::ConnectionBindError(
                String::from("failed to create the request socket"),
                e.to_string(),
            )
        })?;
        socket.connect(path).map_err(|e| {
            ClientError::ConnectionBindError(
                format!("no server is listening on {}", path),
                e.to_string(),
            )
        })?;
        Ok(Self { socket })
    }

    /// Retry `open` once a second until the server comes up. Used by
    /// the forked client half while its sibling boots the server.
    pub fn open_with_retry(path: &str) -> Self {
        loop {
            std::thread::sleep(Duration::from_secs(1));
            if let Ok(conn) = Self::open(path) {
                return conn;
            }
        }
    }

    pub fn send(&self, query: &QueryMessage) -> Result<(), ClientError> {
        self.socket.send(&query.serialize()).map_err(|e| {
            ClientError::ConnectionSendError(
                String::from("failed to send the request"),
                e.to_string(),
            )
        })?;
        Ok(())
    }
}

/// Receiving end of the response channel. Bound by a `display` client
/// before it asks, unlinked once the list has been read.
pub struct ResponseReceiver {
    socket: UnixDatagram,
    path: PathBuf,
}

impl ResponseReceiver {
    pub fn bind(path: &str) -> Result<Self, ClientError> {
        let path = PathBuf::from(path);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| {
                ClientError::ConnectionBindError(
                    format!("failed to remove a stale socket at {}", path.display()),
                    e.to_string(),
                )
            })?;
        }
        let socket = UnixDatagram::bind(&path).map_err(|e| {
            ClientError::ConnectionBindError(
                format!("failed to bind the response socket at {}", path.display()),
                e.to_string(),
            )
        })?;
        Ok(Self { socket, path })
    }

    pub fn recv(&self) -> Result<ResponseMessage, ClientError> {
        let mut buf = vec![0u8; 2048];
        let n = self.socket.recv(&mut buf).map_err(|e| {
            ClientError::ConnectionReceiveError(
                String::from("failed to receive a response"),
                e.to_string(),
            )
        })?;
        ResponseMessage::deserialize(&buf[..n]).map_err(|e| {
            ClientError::ResponseParseError(
                String::from("failed to decode a response"),
                e.to_string(),
            )
        })
    }

    pub fn unlink(&self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
