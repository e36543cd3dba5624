//! Diagnostic logger with signal-driven verbosity and on-demand state
//! dumps.
//!
//! The logger owns an append-only log file; every record is written as
//! a single line under one mutex, so records never interleave. The
//! verbosity threshold is a process-wide atomic word changed
//! out-of-band by a realtime signal whose payload carries the new
//! level. A second signal requests an asynchronous dump: each delivery
//! releases one semaphore permit, and a background worker writes one
//! timestamped snapshot file per permit.
//!
//! Both signals are consumed by one dedicated receiver thread via
//! `sigtimedwait`; `block_diagnostic_signals` must run before the
//! runtime spawns its workers so the receiver is the only thread that
//! can observe them. Nothing signal-related runs outside that thread —
//! the level store and the semaphore post are its whole job.

use crate::err::Result;
use crate::global_var::{DEBUG_MODE, LOGGER_CELL};
use chrono::Local;
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Semaphore, oneshot};
use tokio::task::JoinHandle;

/// Log level for messages. Numeric values are the wire values carried
/// by the level-change signal: 1 is the quietest non-off level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error = 1,
    Warn = 2,
    Info = 3,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
        };
        write!(f, "{}", s)
    }
}

/// What happened to one `log` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogOutcome {
    /// The record was written; carries the record length in bytes.
    Written(usize),
    /// The record level is above the current threshold.
    Filtered,
    /// Logging is off (level 0) or the logger was destroyed.
    Disabled,
    /// The write failed; the record was dropped.
    Failed,
    /// No global logger has been installed yet.
    Uninitialized,
}

/// Produces the byte buffer written on each dump request.
pub type DumpProvider = Arc<dyn Fn() -> Vec<u8> + Send + Sync>;

pub struct LoggerConfig {
    /// Signal whose `sival_int` payload becomes the new level.
    pub level_signal: i32,
    /// Signal requesting one state dump per delivery.
    pub dump_signal: i32,
    pub log_file: PathBuf,
    /// Directory dump files are created in.
    pub dump_dir: PathBuf,
    /// Every dump file is exactly this many bytes.
    pub dump_size: usize,
    pub provider: DumpProvider,
}

pub struct Logger {
    file: Mutex<Option<File>>,
    current_level: Arc<AtomicI32>,
    dump_sem: Arc<Semaphore>,
    dump_worker: Mutex<Option<(oneshot::Sender<()>, JoinHandle<()>)>>,
    receiver_shutdown: Arc<AtomicBool>,
}

impl Logger {
    /// Build a logger: truncate the log file, start the dump worker
    /// and the signal-receiver thread. Must run inside a tokio
    /// runtime (the dump worker is a spawned task).
    pub fn init(cfg: LoggerConfig) -> Result<Self> {
        let file = File::create(&cfg.log_file)?;

        let current_level = Arc::new(AtomicI32::new(LogLevel::Info as i32));
        let dump_sem = Arc::new(Semaphore::new(0));
        let receiver_shutdown = Arc::new(AtomicBool::new(false));

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let worker = spawn_dump_worker(
            dump_sem.clone(),
            cfg.dump_dir.clone(),
            cfg.dump_size,
            cfg.provider.clone(),
            shutdown_rx,
        );

        if let Err(e) = spawn_signal_receiver(
            cfg.level_signal,
            cfg.dump_signal,
            current_level.clone(),
            dump_sem.clone(),
            receiver_shutdown.clone(),
        ) {
            worker.abort();
            return Err(e);
        }

        Ok(Self {
            file: Mutex::new(Some(file)),
            current_level,
            dump_sem,
            dump_worker: Mutex::new(Some((shutdown_tx, worker))),
            receiver_shutdown,
        })
    }

    /// Log a message at a specific level. Accepted when
    /// `0 < level <= current_level`.
    pub fn log(&self, level: LogLevel, msg: &str) -> LogOutcome {
        let current = self.current_level.load(Ordering::SeqCst);
        if current == 0 {
            return LogOutcome::Disabled;
        }
        if (level as i32) > current {
            return LogOutcome::Filtered;
        }

        let line = format_record(level, msg);
        if *DEBUG_MODE {
            print!("{}", line);
        }

        let mut guard = self.file.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_mut() {
            Some(file) => match file.write_all(line.as_bytes()) {
                Ok(()) => LogOutcome::Written(line.len()),
                Err(_e) => LogOutcome::Failed,
            },
            None => LogOutcome::Disabled,
        }
    }

    pub fn error<S: Into<String>>(&self, msg: S) {
        self.log(LogLevel::Error, &msg.into());
    }
    pub fn warn<S: Into<String>>(&self, msg: S) {
        self.log(LogLevel::Warn, &msg.into());
    }
    pub fn info<S: Into<String>>(&self, msg: S) {
        self.log(LogLevel::Info, &msg.into());
    }

    /// Set the verbosity threshold. Out-of-range values clamp into
    /// `[0, 3]`; 0 turns logging off entirely.
    pub fn set_level(&self, raw: i32) {
        self.current_level.store(raw.clamp(0, 3), Ordering::SeqCst);
    }

    pub fn current_level(&self) -> i32 {
        self.current_level.load(Ordering::SeqCst)
    }

    /// Queue one dump request, exactly as a dump-signal delivery would.
    pub fn request_dump(&self) {
        self.dump_sem.add_permits(1);
    }

    /// Stop the dump worker and the signal receiver, close the log
    /// file. Idempotent; later `log` calls return `Disabled`.
    pub async fn destroy(&self) {
        self.receiver_shutdown.store(true, Ordering::SeqCst);
        let worker = self
            .dump_worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some((shutdown_tx, handle)) = worker {
            let _ = shutdown_tx.send(());
            let _ = handle.await;
        }
        self.file.lock().unwrap_or_else(|e| e.into_inner()).take();
    }

    /// A logger with no file and level 0; unit tests that exercise
    /// code paths calling the global LOGGER get this fallback.
    #[cfg(test)]
    fn disabled() -> Self {
        Self {
            file: Mutex::new(None),
            current_level: Arc::new(AtomicI32::new(0)),
            dump_sem: Arc::new(Semaphore::new(0)),
            dump_worker: Mutex::new(None),
            receiver_shutdown: Arc::new(AtomicBool::new(true)),
        }
    }
}

fn format_record(level: LogLevel, msg: &str) -> String {
    format!(
        "({}) ({}) {}\n",
        level,
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        msg
    )
}

fn spawn_dump_worker(
    sem: Arc<Semaphore>,
    dump_dir: PathBuf,
    dump_size: usize,
    provider: DumpProvider,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown_rx => {
                    break;
                }
                permit = sem.acquire() => {
                    match permit {
                        Ok(p) => p.forget(),
                        Err(_closed) => break,
                    }
                    if let Err(e) = write_dump(&dump_dir, dump_size, &provider).await {
                        eprintln!("Failed to write dump file: {}", e);
                    }
                }
            }
        }
    })
}

/// Write one snapshot file of exactly `dump_size` bytes; the provider
/// output is truncated or zero-padded to fit.
async fn write_dump(dump_dir: &Path, dump_size: usize, provider: &DumpProvider) -> Result<()> {
    let ts = Local::now().format("%Y-%m-%d %H-%M-%S");
    let path = dump_dir.join(format!("dump {}.txt", ts));
    let mut data = provider();
    data.resize(dump_size, 0);
    tokio::fs::write(&path, &data).await?;
    Ok(())
}

/// Block the two diagnostic signals on the calling thread. Called from
/// `main` before the runtime starts so every spawned thread inherits
/// the mask and delivery lands only in the receiver thread.
pub fn block_diagnostic_signals(level_signal: i32, dump_signal: i32) {
    unsafe {
        let mut set: libc::sigset_t = std::mem::zeroed();
        libc::sigemptyset(&mut set);
        libc::sigaddset(&mut set, level_signal);
        libc::sigaddset(&mut set, dump_signal);
        libc::pthread_sigmask(libc::SIG_BLOCK, &set, std::ptr::null_mut());
    }
}

/// The dedicated signal-receiver thread: waits for the two diagnostic
/// signals with a short timeout so it can notice shutdown.
fn spawn_signal_receiver(
    level_signal: i32,
    dump_signal: i32,
    current_level: Arc<AtomicI32>,
    dump_sem: Arc<Semaphore>,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    std::thread::Builder::new()
        .name("diag-signal-receiver".into())
        .spawn(move || {
            unsafe {
                let mut set: libc::sigset_t = std::mem::zeroed();
                libc::sigemptyset(&mut set);
                libc::sigaddset(&mut set, level_signal);
                libc::sigaddset(&mut set, dump_signal);
                libc::pthread_sigmask(libc::SIG_BLOCK, &set, std::ptr::null_mut());

                let timeout = libc::timespec {
                    tv_sec: 0,
                    tv_nsec: 200_000_000,
                };
                loop {
                    if shutdown.load(Ordering::SeqCst) {
                        break;
                    }
                    let mut info: libc::siginfo_t = std::mem::zeroed();
                    let sig = libc::sigtimedwait(&set, &mut info, &timeout);
                    if sig == level_signal {
                        let raw = level_payload(info.si_value());
                        current_level.store(raw.clamp(0, 3), Ordering::SeqCst);
                    } else if sig == dump_signal {
                        dump_sem.add_permits(1);
                    }
                    // -1 is the wait timeout; loop and re-check shutdown.
                }
            }
        })
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::Other,
                format!("failed to start the signal-receiver thread: {}", e),
            )
        })?;
    Ok(())
}

/// Integer payload of a queued signal, as a sender's `sival_int`.
/// libc exposes `sigval` only through its pointer view, and the
/// `sival_int` word sits at the low address of the union: the low
/// pointer bits on little-endian, the high ones on 64-bit big-endian.
fn level_payload(value: libc::sigval) -> i32 {
    let bits = value.sival_ptr as usize as u64;
    let word = if cfg!(target_endian = "big") && std::mem::size_of::<usize>() == 8 {
        (bits >> 32) as u32
    } else {
        bits as u32
    };
    word as i32
}

/// Install the process-wide logger. Fails with `AlreadyExists` when a
/// logger is already installed.
pub fn init_global(cfg: LoggerConfig) -> Result<()> {
    if LOGGER_CELL.get().is_some() {
        return Err(already_initialized());
    }
    let logger = Logger::init(cfg)?;
    LOGGER_CELL.set(logger).map_err(|_| already_initialized())
}

fn already_initialized() -> crate::err::Error {
    io::Error::new(io::ErrorKind::AlreadyExists, "logger is already initialized").into()
}

/// Log through the global logger without panicking when none is
/// installed.
pub fn log(level: LogLevel, msg: &str) -> LogOutcome {
    match LOGGER_CELL.get() {
        Some(logger) => logger.log(level, msg),
        None => LogOutcome::Uninitialized,
    }
}

pub(crate) struct LoggerShim;

impl Deref for LoggerShim {
    type Target = Logger;
    fn deref(&self) -> &Self::Target {
        if let Some(l) = LOGGER_CELL.get() {
            return l;
        }
        #[cfg(test)]
        {
            // In test builds, lazily install a disabled fallback so unit
            // tests can exercise code paths that call LOGGER.*() without
            // initializing the real logger.
            let _ = LOGGER_CELL.set(Logger::disabled());
        }
        LOGGER_CELL.get().expect("LOGGER_CELL should be set")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    fn unique_temp_path(name: &str) -> PathBuf {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis();
        let mut p = std::env::temp_dir();
        p.push(format!("{}_{}_{}", name, std::process::id(), millis));
        p
    }

    fn test_config(name: &str, dump_size: usize, provider: DumpProvider) -> (LoggerConfig, PathBuf, PathBuf) {
        let log_file = unique_temp_path(&format!("{}_log", name));
        let dump_dir = unique_temp_path(&format!("{}_dumps", name));
        fs::create_dir_all(&dump_dir).expect("create dump dir");
        let cfg = LoggerConfig {
            // Unused in tests; nothing sends these.
            level_signal: libc::SIGRTMIN() + 4,
            dump_signal: libc::SIGRTMIN() + 5,
            log_file: log_file.clone(),
            dump_dir: dump_dir.clone(),
            dump_size,
            provider,
        };
        (cfg, log_file, dump_dir)
    }

    #[test]
    fn level_payload_recovers_the_integer_word() {
        // Lay the integer out where a sender's sival_int lands.
        let encode = |word: u32| -> libc::sigval {
            let bits: u64 = if cfg!(target_endian = "big") && std::mem::size_of::<usize>() == 8 {
                (word as u64) << 32
            } else {
                word as u64
            };
            libc::sigval {
                sival_ptr: bits as usize as *mut libc::c_void,
            }
        };
        assert_eq!(level_payload(encode(0)), 0);
        assert_eq!(level_payload(encode(2)), 2);
        assert_eq!(level_payload(encode(u32::MAX)), -1);
    }

    #[test]
    fn record_format_has_kind_timestamp_and_newline() {
        let line = format_record(LogLevel::Warn, "be careful");
        assert!(line.starts_with("(WARN) ("), "line={}", line);
        assert!(line.ends_with("be careful\n"), "line={}", line);
        // "(WARN) (" + "YYYY-MM-DD HH:MM:SS" + ") " + text + "\n"
        let ts = &line["(WARN) (".len().."(WARN) (".len() + 19];
        assert_eq!(ts.as_bytes()[4], b'-');
        assert_eq!(ts.as_bytes()[10], b' ');
        assert_eq!(ts.as_bytes()[13], b':');
    }

    #[tokio::test]
    async fn writes_records_and_reports_their_length() {
        let (cfg, log_file, _dumps) =
            test_config("logger_writes", 8, Arc::new(Vec::new));
        let logger = Logger::init(cfg).expect("init logger");

        let outcome = logger.log(LogLevel::Info, "hello info");
        let LogOutcome::Written(n) = outcome else {
            panic!("expected Written, got {:?}", outcome);
        };
        logger.error("something went wrong");

        let content = fs::read_to_string(&log_file).expect("read log file");
        assert!(content.contains("(INFO)"), "content=\n{}", content);
        assert!(content.contains("hello info"), "content=\n{}", content);
        assert!(content.contains("(ERROR)"), "content=\n{}", content);
        assert!(content.ends_with('\n'));
        assert_eq!(content.lines().next().unwrap().len() + 1, n);

        logger.destroy().await;
        let _ = fs::remove_file(&log_file);
    }

    #[tokio::test]
    async fn level_zero_disables_and_level_one_filters() {
        let (cfg, log_file, _dumps) =
            test_config("logger_levels", 8, Arc::new(Vec::new));
        let logger = Logger::init(cfg).expect("init logger");

        logger.set_level(0);
        assert_eq!(logger.log(LogLevel::Error, "dropped"), LogOutcome::Disabled);
        let len_off = fs::metadata(&log_file).expect("stat").len();
        assert_eq!(len_off, 0, "level 0 must suppress every record");

        logger.set_level(1);
        assert_eq!(logger.log(LogLevel::Info, "too chatty"), LogOutcome::Filtered);
        assert!(matches!(
            logger.log(LogLevel::Error, "kept"),
            LogOutcome::Written(_)
        ));

        let content = fs::read_to_string(&log_file).expect("read log file");
        assert!(!content.contains("too chatty"));
        assert!(content.contains("kept"));

        logger.destroy().await;
        let _ = fs::remove_file(&log_file);
    }

    #[tokio::test]
    async fn out_of_range_levels_clamp() {
        let (cfg, log_file, _dumps) =
            test_config("logger_clamp", 8, Arc::new(Vec::new));
        let logger = Logger::init(cfg).expect("init logger");

        logger.set_level(42);
        assert_eq!(logger.current_level(), 3);
        logger.set_level(-7);
        assert_eq!(logger.current_level(), 0);

        logger.destroy().await;
        let _ = fs::remove_file(&log_file);
    }

    #[tokio::test]
    async fn dump_files_have_the_configured_size() {
        let provider: DumpProvider = Arc::new(|| b"snapshot".to_vec());
        let (cfg, log_file, dump_dir) = test_config("logger_dump", 50, provider);
        let logger = Logger::init(cfg).expect("init logger");

        logger.request_dump();

        let mut dump = None;
        for _ in 0..40 {
            tokio::time::sleep(Duration::from_millis(50)).await;
            if let Some(entry) = fs::read_dir(&dump_dir)
                .expect("read dump dir")
                .filter_map(|e| e.ok())
                .find(|e| e.file_name().to_string_lossy().starts_with("dump "))
            {
                dump = Some(entry.path());
                break;
            }
        }
        let dump = dump.expect("a dump file should appear");
        let bytes = fs::read(&dump).expect("read dump");
        assert_eq!(bytes.len(), 50, "dump must be exactly dump_size bytes");
        assert!(bytes.starts_with(b"snapshot"));
        assert!(bytes[8..].iter().all(|&b| b == 0), "padding must be zeros");

        logger.destroy().await;
        let _ = fs::remove_file(&log_file);
        let _ = fs::remove_dir_all(&dump_dir);
    }

    #[tokio::test]
    async fn destroy_is_idempotent_and_disables_logging() {
        let (cfg, log_file, _dumps) =
            test_config("logger_destroy", 8, Arc::new(Vec::new));
        let logger = Logger::init(cfg).expect("init logger");

        logger.destroy().await;
        logger.destroy().await;
        assert_eq!(logger.log(LogLevel::Error, "late"), LogOutcome::Disabled);
        let _ = fs::remove_file(&log_file);
    }
}
