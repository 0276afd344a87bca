use std::collections::VecDeque;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use parking_lot::Mutex;

/// A single captured log entry.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: log::Level,
    pub target: String,
    pub message: String,
    pub timestamp: Instant,
}

impl LogEntry {
    fn from_record(record: &log::Record) -> Self {
        Self {
            level: record.level(),
            target: record.target().to_owned(),
            message: record.args().to_string(),
            timestamp: Instant::now(),
        }
    }
}

/// Ring buffer of captured log entries, oldest first.
#[derive(Debug)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    max_capacity: usize,
}

impl LogBuffer {
    pub fn new(max_capacity: usize) -> Self {
        let max_capacity = max_capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(max_capacity.min(1024)),
            max_capacity,
        }
    }

    pub fn entries(&self) -> &VecDeque<LogEntry> {
        &self.entries
    }

    /// Entries at `level` or more severe.
    pub fn at_least(&self, level: log::Level) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.level <= level)
    }

    pub fn push(&mut self, entry: LogEntry) {
        if self.entries.len() >= self.max_capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

static SESSION_LOG: OnceLock<Arc<Mutex<LogBuffer>>> = OnceLock::new();

/// The buffer filled by the logger from [`install`], if it was installed.
pub fn log_buffer() -> Option<Arc<Mutex<LogBuffer>>> {
    SESSION_LOG.get().cloned()
}

/// Writes records through `env_logger` and keeps the enabled ones for the
/// session log.
struct SessionLogger {
    stderr: env_logger::Logger,
    buffer: Arc<Mutex<LogBuffer>>,
}

impl log::Log for SessionLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.stderr.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.stderr.log(record);
        self.buffer.lock().push(LogEntry::from_record(record));
    }

    fn flush(&self) {
        self.stderr.flush();
    }
}

/// Install the session logger as the global logger.
///
/// `default_filter` applies when `RUST_LOG` is unset; at most `capacity`
/// entries are kept. Fails if a global logger is already set.
pub fn install(
    default_filter: &str,
    capacity: usize,
) -> Result<Arc<Mutex<LogBuffer>>, log::SetLoggerError> {
    let stderr = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter),
    )
    .build();
    let max_level = stderr.filter();
    let buffer = Arc::new(Mutex::new(LogBuffer::new(capacity)));

    log::set_boxed_logger(Box::new(SessionLogger {
        stderr,
        buffer: Arc::clone(&buffer),
    }))?;
    log::set_max_level(max_level);
    Ok(Arc::clone(SESSION_LOG.get_or_init(|| buffer)))
}
