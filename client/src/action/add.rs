use crate::action::conn::Connection;
use crate::cli;
use crate::error::ClientError;
use api_model::protocol::message::query_message::{Command, QueryMessage};
use api_model::timespec;

pub fn handle_add(conn: &Connection, tokens: &[String]) -> Result<(), ClientError> {
    let (time_spec, task) = cli::split_add_tokens(tokens)?;
    // Reject a malformed schedule here instead of shipping it to the
    // server only to be dropped there.
    timespec::parse(&time_spec)
        .map_err(|e| ClientError::UsageError(format!("bad time spec '{}'", time_spec), e.to_string()))?;
    let query = QueryMessage::new(Command::Add, time_spec.clone(), task.clone()).map_err(|e| {
        ClientError::QueryBuildError(
            String::from("the add request does not fit the wire format"),
            e.to_string(),
        )
    })?;
    conn.send(&query)?;
    println!("SENT: add {} {}", time_spec, task);
    Ok(())
}
