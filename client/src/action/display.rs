use crate::action::conn::{Connection, ResponseReceiver};
use crate::error::ClientError;
use api_model::protocol::message::query_message::{Command, QueryMessage};

pub fn handle_display(conn: &Connection, response_path: &str) -> Result<(), ClientError> {
    // Bind the response socket first so the server can connect to it
    // as soon as it picks up the request.
    let receiver = ResponseReceiver::bind(response_path)?;

    let result = request_and_print(conn, &receiver);
    // The socket file goes away whether or not the list arrived.
    receiver.unlink();

    if result? < 1 {
        println!("Task list is empty.");
    }
    Ok(())
}

fn request_and_print(conn: &Connection, receiver: &ResponseReceiver) -> Result<usize, ClientError> {
    let query = QueryMessage::new(Command::Display, String::new(), String::new()).map_err(|e| {
        ClientError::QueryBuildError(
            String::from("the display request does not fit the wire format"),
            e.to_string(),
        )
    })?;
    conn.send(&query)?;
    println!("SENT: display");

    let mut counter = 0;
    loop {
        let response = receiver.recv()?;
        if response.is_terminator() {
            break;
        }
        println!(
            "ID: {} {} {}",
            response.task_id, response.time_spec, response.task
        );
        counter += 1;
    }
    Ok(counter)
}
