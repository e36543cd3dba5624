use crate::utilities::logger::Logger;
use std::sync::{LazyLock, OnceLock};

pub static LOGGER_CELL: OnceLock<Logger> = OnceLock::new();
pub(crate) static LOGGER: crate::utilities::logger::LoggerShim =
    crate::utilities::logger::LoggerShim;
pub static DEBUG_MODE: LazyLock<bool> = LazyLock::new(|| {
    let env_var = std::env::var("DEBUG_MODE").unwrap_or_default();
    let debug_mode = env_var == "1" || env_var == "true";
    debug_mode
});
