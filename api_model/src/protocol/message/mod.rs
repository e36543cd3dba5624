pub mod query_message;
pub mod response_message;

use crate::err::Result;
use crate::protocol::MAX_FIELD_BYTES;
use std::io;

pub(crate) fn check_bound(name: &str, value: &str) -> Result<()> {
    if value.len() > MAX_FIELD_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "{} exceeds the {}-byte record field bound ({} bytes)",
                name,
                MAX_FIELD_BYTES,
                value.len()
            ),
        )
        .into());
    }
    Ok(())
}
