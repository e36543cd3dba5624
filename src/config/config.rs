use crate::err::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Socket paths for the two request/response channels.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Channels {
    pub query_path: String,
    pub response_path: String,
}

impl Default for Channels {
    fn default() -> Self {
        Channels {
            query_path: String::from("/tmp/mq_queries_queue"),
            response_path: String::from("/tmp/mq_response_queue"),
        }
    }
}

/// Logger settings. The two signal numbers are stored as offsets from
/// SIGRTMIN because the realtime range is libc-dependent.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LoggerSettings {
    pub log_file: String,
    pub dump_dir: String,
    pub dump_size: usize,
    pub dump_signal_offset: i32,
    pub level_signal_offset: i32,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        LoggerSettings {
            log_file: String::from("logger.log"),
            dump_dir: String::from("."),
            dump_size: 50,
            dump_signal_offset: 2,
            level_signal_offset: 3,
        }
    }
}

impl LoggerSettings {
    pub fn dump_signal(&self) -> i32 {
        libc::SIGRTMIN() + self.dump_signal_offset
    }

    pub fn level_signal(&self) -> i32 {
        libc::SIGRTMIN() + self.level_signal_offset
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub channels: Channels,
    pub logger: LoggerSettings,
}

impl Config {
    /// Load the config file, or fall back to the built-in defaults
    /// when no path was given. Missing keys take their defaults too.
    pub fn from_config(config_path: Option<&str>) -> Result<Self> {
        match config_path {
            Some(p) => {
                // Expand a leading '~/' so shell-style paths work.
                let path = if p.starts_with("~/") {
                    match std::env::var("HOME") {
                        Ok(home) => format!("{}/{}", home, &p[2..]),
                        Err(_) => p.to_string(),
                    }
                } else {
                    p.to_string()
                };
                let content = fs::read_to_string(&path)?;
                match toml::from_str(&content) {
                    Ok(config) => Ok(config),
                    Err(e) => Err(e.into()),
                }
            }
            None => Ok(Config::default()),
        }
    }

    pub fn dump(&self, config_path: &str) -> Result<()> {
        let path = Path::new(config_path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let p = fs::File::create(path)?;
        let mut f_writer = std::io::BufWriter::new(p);
        f_writer.write_all(toml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
