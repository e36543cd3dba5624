use std::fmt::{Debug, Display};

pub enum ClientError {
    ConnectionBindError(String, String),
    ConnectionSendError(String, String),
    ConnectionReceiveError(String, String),

    ResponseParseError(String, String),
    QueryBuildError(String, String),

    UsageError(String, String),
}

impl Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::ConnectionBindError(msg, _) => write!(f, "Connection bind error: {}", msg),
            ClientError::ConnectionSendError(msg, _) => write!(f, "Connection send error: {}", msg),
            ClientError::ConnectionReceiveError(msg, _) => {
                write!(f, "Connection receive error: {}", msg)
            }
            ClientError::ResponseParseError(msg, _) => write!(f, "Response parse error: {}", msg),
            ClientError::QueryBuildError(msg, _) => write!(f, "Query build error: {}", msg),
            ClientError::UsageError(msg, _) => write!(f, "Usage error: {}", msg),
        }
    }
}

impl Debug for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::ConnectionBindError(msg, trace) => {
                write!(f, "Connection bind error: {}\nTrace: {}", msg, trace)
            }
            ClientError::ConnectionSendError(msg, trace) => {
                write!(f, "Connection send error: {}\nTrace: {}", msg, trace)
            }
            ClientError::ConnectionReceiveError(msg, trace) => {
                write!(f, "Connection receive error: {}\nTrace: {}", msg, trace)
            }
            ClientError::ResponseParseError(msg, trace) => {
                write!(f, "Response parse error: {}\nTrace: {}", msg, trace)
            }
            ClientError::QueryBuildError(msg, trace) => {
                write!(f, "Query build error: {}\nTrace: {}", msg, trace)
            }
            ClientError::UsageError(msg, trace) => {
                write!(f, "Usage error: {}\nTrace: {}", msg, trace)
            }
        }
    }
}
