use crate::action::conn::Connection;
use crate::error::ClientError;
use api_model::protocol::message::query_message::{Command, QueryMessage};

pub fn handle_cancel(conn: &Connection, id: u64) -> Result<(), ClientError> {
    let query = QueryMessage::new(Command::Cancel, String::new(), id.to_string()).map_err(|e| {
        ClientError::QueryBuildError(
            String::from("the cancel request does not fit the wire format"),
            e.to_string(),
        )
    })?;
    conn.send(&query)?;
    println!("SENT: cancel {}", id);
    Ok(())
}
