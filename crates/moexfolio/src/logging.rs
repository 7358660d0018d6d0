//! Logging for analysis runs.
//!
//! Everything goes to `{data_dir}/moexfolio.log`. The terminal UI owns the
//! screen, so console output is only added for `--no-tui` runs, and only at
//! `warn` and above (skipped tickers, failed requests).

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE_NAME: &str = "moexfolio.log";

const ROTATION_MARKER: &[u8] = b"--- older runs removed ---\n";

/// Size-capped log file inside the data directory
#[derive(Debug, Clone, PartialEq)]
pub struct LogFile {
    path: PathBuf,
    /// Size that triggers a rotation at startup
    max_bytes: u64,
    /// Most recent bytes kept by a rotation
    keep_bytes: u64,
}

impl LogFile {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(LOG_FILE_NAME),
            max_bytes: 5 * 1024 * 1024,
            keep_bytes: 1024 * 1024,
        }
    }

    #[must_use]
    pub fn with_limits(mut self, max_bytes: u64, keep_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self.keep_bytes = keep_bytes.min(max_bytes);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cut the file down to its newest whole lines once it outgrows `max_bytes`.
    ///
    /// Returns whether anything was removed. A missing file is not an error.
    pub fn rotate(&self) -> std::io::Result<bool> {
        let len = match fs::metadata(&self.path) {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        };
        if len <= self.max_bytes {
            return Ok(false);
        }

        let mut recent = Vec::new();
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(len.saturating_sub(self.keep_bytes)))?;
        file.read_to_end(&mut recent)?;

        let first_whole_line = recent
            .iter()
            .position(|&b| b == b'\n')
            .map_or(recent.len(), |i| i + 1);

        let mut file = File::create(&self.path)?;
        file.write_all(ROTATION_MARKER)?;
        file.write_all(&recent[first_whole_line..])?;
        Ok(true)
    }

    /// Rotate if needed, then open for appending behind a shared handle.
    fn open(&self) -> std::io::Result<SharedLog> {
        if let Err(e) = self.rotate() {
            eprintln!("Warning: failed to rotate {}: {}", self.path.display(), e);
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        Ok(SharedLog(Arc::new(Mutex::new(file))))
    }
}

/// One file handle shared by every event writer
#[derive(Clone)]
struct SharedLog(Arc<Mutex<File>>);

impl SharedLog {
    fn lock(&self) -> std::io::Result<MutexGuard<'_, File>> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log file mutex poisoned"))
    }
}

impl Write for SharedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.lock()?.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.lock()?.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedLog {
    type Writer = SharedLog;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Default directives: `level` for the frontend, `warn` for the core crate
fn default_directives(level: &str) -> String {
    format!("moexfolio={level},moexfolio_core=warn")
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `level` when set. With `console` on, warnings are
/// echoed to stderr as well.
pub fn init_logging(data_dir: &Path, level: &str, console: bool) -> color_eyre::Result<()> {
    fs::create_dir_all(data_dir)?;
    let log = LogFile::new(data_dir);
    let writer = log.open()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let console_layer = console.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .with_filter(LevelFilter::WARN)
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_filter(env_filter),
        )
        .with(console_layer)
        .init();

    tracing::info!(log_path = %log.path().display(), console, "Logging initialized");
    Ok(())
}
