use crate::err::Result;
use crate::protocol::message::check_bound;
use crate::protocol::protocol::Protocol;
use serde::{Deserialize, Serialize};
use std::io;

/// One task entry sent back to a `display` client.
///
/// A record with `task_id == 0` and an empty `task` terminates the
/// list; the client stops reading when it sees one.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ResponseMessage {
    pub task_id: u64,
    pub time_spec: String,
    pub task: String,
}

impl ResponseMessage {
    pub fn new(task_id: u64, time_spec: String, task: String) -> Result<Self> {
        check_bound("time_spec", &time_spec)?;
        check_bound("task", &task)?;
        Ok(Self {
            task_id,
            time_spec,
            task,
        })
    }

    /// The end-of-list sentinel record.
    pub fn terminator() -> Self {
        Self {
            task_id: 0,
            time_spec: String::new(),
            task: String::new(),
        }
    }

    pub fn is_terminator(&self) -> bool {
        self.task.is_empty()
    }
}

impl Protocol for ResponseMessage {
    fn serialize(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap_or_else(|_e| Vec::new())
    }

    fn deserialize(bytes: &[u8]) -> Result<Self>
    where
        Self: Sized,
    {
        let msg: ResponseMessage = bincode::deserialize(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        check_bound("time_spec", &msg.time_spec)?;
        check_bound("task", &msg.task)?;
        Ok(msg)
    }
}
