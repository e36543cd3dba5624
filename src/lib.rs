pub mod channel;
pub mod config;
pub mod core;
pub mod err;
pub mod global_var;
pub mod utilities;

pub use config::Config;

use crate::channel::QueryChannel;
use crate::core::dispatcher::Dispatcher;
use crate::core::store::TaskStore;
use crate::global_var::LOGGER;
use crate::utilities::logger::{self, DumpProvider, LoggerConfig};
use std::sync::Arc;

/// Entry point for the server process. The diagnostic signals must be
/// blocked before the runtime spawns its worker threads, so the mask
/// is applied here and every thread inherits it.
pub fn run_blocking(config: Config) -> err::Result<()> {
    logger::block_diagnostic_signals(config.logger.level_signal(), config.logger.dump_signal());
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(config))
}

/// Bring the server up, serve requests until STOP, tear down.
pub async fn run(config: Config) -> err::Result<()> {
    let store = Arc::new(TaskStore::new());

    let provider: DumpProvider = {
        let store = store.clone();
        Arc::new(move || snapshot_for_dump(&store))
    };
    logger::init_global(LoggerConfig {
        level_signal: config.logger.level_signal(),
        dump_signal: config.logger.dump_signal(),
        log_file: config.logger.log_file.clone().into(),
        dump_dir: config.logger.dump_dir.clone().into(),
        dump_size: config.logger.dump_size,
        provider,
    })?;
    LOGGER.info("Server has started.");

    println!("Server has started with PID:{}.", std::process::id());
    println!("Waiting for tasks...");

    let queries = QueryChannel::create(&config.channels.query_path)?;
    let dispatcher = Dispatcher::new(queries, store, config.channels.response_path.clone());
    let result = dispatcher.run().await;

    println!("Server has terminated.");
    LOGGER.info("Server has terminated.");
    LOGGER.destroy().await;
    result
}

/// Dump payload: the pending task list, one line per task. The logger
/// pads or truncates it to the configured dump size.
fn snapshot_for_dump(store: &TaskStore) -> Vec<u8> {
    let mut out = String::new();
    for t in store.pending() {
        out.push_str(&format!("ID: {} {} {}\n", t.id, t.time_spec, t.command));
    }
    out.into_bytes()
}
