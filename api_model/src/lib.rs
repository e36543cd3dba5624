pub mod err;
pub mod protocol;
pub mod timespec;
