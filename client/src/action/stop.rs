use crate::action::conn::Connection;
use crate::error::ClientError;
use api_model::protocol::message::query_message::{Command, QueryMessage};

pub fn handle_stop(conn: &Connection) -> Result<(), ClientError> {
    let query = QueryMessage::new(Command::Stop, String::new(), String::new()).map_err(|e| {
        ClientError::QueryBuildError(
            String::from("the stop request does not fit the wire format"),
            e.to_string(),
        )
    })?;
    conn.send(&query)?;
    println!("SENT: stop");
    Ok(())
}
