pub mod config;
pub mod opts;

pub use config::Config;
pub use opts::Opts;
