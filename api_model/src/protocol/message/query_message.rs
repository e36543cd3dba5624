use crate::err::Result;
use crate::protocol::message::check_bound;
use crate::protocol::protocol::Protocol;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;

/// The four verbs a client may send over the request channel.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Add,
    Cancel,
    Display,
    Stop,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Command::Add => "add",
            Command::Cancel => "cancel",
            Command::Display => "display",
            Command::Stop => "stop",
        };
        write!(f, "{}", s)
    }
}

/// One request record on the query channel.
///
/// `time_spec` carries the human-readable schedule exactly as typed
/// (only meaningful for `Add`). `task` is the command line for `Add`
/// and the decimal task id for `Cancel`; empty otherwise. Both fields
/// are bounded by [`crate::protocol::MAX_FIELD_BYTES`].
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct QueryMessage {
    pub command: Command,
    pub time_spec: String,
    pub task: String,
}

impl QueryMessage {
    pub fn new(command: Command, time_spec: String, task: String) -> Result<Self> {
        check_bound("time_spec", &time_spec)?;
        check_bound("task", &task)?;
        Ok(Self {
            command,
            time_spec,
            task,
        })
    }
}

impl Protocol for QueryMessage {
    fn serialize(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap_or_else(|_e| Vec::new())
    }

    fn deserialize(bytes: &[u8]) -> Result<Self>
    where
        Self: Sized,
    {
        let msg: QueryMessage = bincode::deserialize(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        // Harden against oversized fields arriving from the wire.
        check_bound("time_spec", &msg.time_spec)?;
        check_bound("task", &msg.task)?;
        Ok(msg)
    }
}
