//! Single consumer of the request channel.
//!
//! All four verbs are handled on one loop, so requests are applied in
//! arrival order and DISPLAY answers are never interleaved with other
//! mutations. The loop owns the query socket; it exits on STOP or
//! when the socket fails.

use crate::channel::{QueryChannel, ResponseChannel};
use crate::core::store::TaskStore;
use crate::core::timer;
use crate::err::Result;
use crate::global_var::LOGGER;
use api_model::protocol::message::query_message::{Command, QueryMessage};
use api_model::protocol::message::response_message::ResponseMessage;
use api_model::protocol::protocol::Protocol;
use api_model::timespec;
use std::sync::Arc;

pub struct Dispatcher {
    queries: QueryChannel,
    store: Arc<TaskStore>,
    response_path: String,
}

impl Dispatcher {
    pub fn new(queries: QueryChannel, store: Arc<TaskStore>, response_path: String) -> Self {
        Self {
            queries,
            store,
            response_path,
        }
    }

    /// Serve requests until STOP arrives. Malformed records are logged
    /// and dropped; the loop keeps going.
    pub async fn run(self) -> Result<()> {
        let result = loop {
            let record = match self.queries.recv_record().await {
                Ok(record) => record,
                Err(e) => {
                    LOGGER.error(format!("Request channel failed: {}", e));
                    break Err(e);
                }
            };
            let query = match QueryMessage::deserialize(&record) {
                Ok(q) => q,
                Err(e) => {
                    LOGGER.warn(format!("Dropping an undecodable request: {}", e));
                    continue;
                }
            };

            match query.command {
                Command::Add => self.handle_add(&query),
                Command::Cancel => self.handle_cancel(&query),
                Command::Display => {
                    if let Err(e) = self.handle_display().await {
                        LOGGER.error(format!("Failed to answer display: {}", e));
                    }
                }
                Command::Stop => {
                    println!("TASK: stop");
                    LOGGER.error("TASK: stop");
                    break Ok(());
                }
            }
        };

        self.store.clear();
        self.queries.unlink();
        result
    }

    fn handle_add(&self, query: &QueryMessage) {
        println!("TASK: add {} {}", query.time_spec, query.task);
        LOGGER.warn(format!("TASK: add {} {}", query.time_spec, query.task));

        let spec = match timespec::parse(&query.time_spec) {
            Ok(spec) => spec,
            Err(e) => {
                LOGGER.warn(format!(
                    "Rejected task with bad time spec '{}': {}",
                    query.time_spec, e
                ));
                return;
            }
        };
        let command: Vec<String> = query.task.split_whitespace().map(String::from).collect();
        if command.is_empty() {
            LOGGER.warn("Rejected a task with an empty command");
            return;
        }

        // The task must be visible in the store before the timer is
        // armed; a zero-delay timer fires right away and looks the
        // task up by id.
        let cyclic = spec.interval.is_some();
        let id = self
            .store
            .insert(query.time_spec.clone(), command, cyclic);
        let handle = timer::arm(self.store.clone(), id, &spec);
        self.store.attach_timer(id, handle);
    }

    fn handle_cancel(&self, query: &QueryMessage) {
        let id = match query.task.trim().parse::<u64>() {
            Ok(id) => id,
            Err(e) => {
                LOGGER.warn(format!("Rejected cancel with bad id '{}': {}", query.task, e));
                return;
            }
        };
        println!("TASK: cancel {}", id);
        LOGGER.error(format!("TASK: cancel {}", id));
        self.store.cancel(id);
    }

    async fn handle_display(&self) -> Result<()> {
        println!("TASK: display");
        LOGGER.info("TASK: display");

        // Open first; a task finishing while the client is slow to
        // bind must not show up in the answer.
        let channel = ResponseChannel::open_with_retry(&self.response_path).await?;
        let pending = self.store.pending();
        for entry in pending {
            match ResponseMessage::new(entry.id, entry.time_spec, entry.command) {
                Ok(msg) => channel.send_record(&msg.serialize()).await?,
                Err(e) => {
                    LOGGER.warn(format!("Skipping display entry {}: {}", entry.id, e));
                }
            }
        }
        channel
            .send_record(&ResponseMessage::terminator().serialize())
            .await?;
        Ok(())
    }
}
