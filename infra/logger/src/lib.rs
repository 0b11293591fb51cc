//! # Logger
//!
//! Installs the process-wide `tracing` subscriber for the tracking service.
//!
//! * a compact ANSI console layer,
//! * an optional rolling file layer (plain or JSON) written through a non-blocking worker,
//! * an [`EnvFilter`] seeded from the configured level and overridable with `RUST_LOG`.
//!
//! ```rust
//! # use tport_logger::{Logger, LevelFilter};
//! let _logger = Logger::builder()
//!     .name("tport-server")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

const DEFAULT_MAX_FILES: usize = 10;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Builder state: no name set yet.
#[derive(Debug)]
pub struct Unnamed;
/// Builder state: name set, ready to [`LoggerBuilder::init`].
#[derive(Debug)]
pub struct Named(String);

#[derive(Debug)]
struct FileOutput {
    dir: PathBuf,
    rotation: Rotation,
    max_files: usize,
    json: bool,
}

/// Configures the global subscriber. The name is mandatory and is also the log file prefix.
#[derive(Debug)]
pub struct LoggerBuilder<S = Unnamed> {
    state: S,
    console: bool,
    level: LevelFilter,
    directives: Option<String>,
    file: Option<FileOutput>,
}

impl LoggerBuilder<Unnamed> {
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<Named> {
        LoggerBuilder {
            state: Named(name.into()),
            console: self.console,
            level: self.level,
            directives: self.directives,
            file: self.file,
        }
    }
}

impl<S> LoggerBuilder<S> {
    #[must_use]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Default filter directives such as `tport_shipments=debug,tower_http=info`.
    /// `RUST_LOG` is only consulted when no directives are set.
    #[must_use]
    pub fn env_filter(mut self, directives: impl Into<String>) -> Self {
        self.directives = Some(directives.into());
        self
    }

    /// Enables the rolling file layer, writing into `dir`.
    #[must_use]
    pub fn path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.file = Some(FileOutput {
            dir: dir.into(),
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
        });
        self
    }

    /// Rotation for the file layer. No effect without [`LoggerBuilder::path`].
    #[must_use]
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        if let Some(file) = self.file.as_mut() {
            file.rotation = rotation;
        }
        self
    }

    #[must_use]
    pub fn max_files(mut self, max: usize) -> Self {
        if let Some(file) = self.file.as_mut() {
            file.max_files = max;
        }
        self
    }

    /// Writes file entries as JSON lines.
    #[must_use]
    pub fn json(mut self) -> Self {
        if let Some(file) = self.file.as_mut() {
            file.json = true;
        }
        self
    }
}

impl LoggerBuilder<Named> {
    /// Installs the subscriber.
    ///
    /// The returned [`Logger`] owns the file worker guard; keep it alive until shutdown.
    ///
    /// # Errors
    ///
    /// [`LoggerError::Subscriber`] when a global subscriber already exists,
    /// [`LoggerError::InvalidConfiguration`] for an empty name, zero `max_files`, bad directives
    /// or when neither console nor file output is enabled.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let name = self.state.0.trim();
        if name.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "logger name cannot be empty".into(),
                context: None,
            });
        }

        let filter = self.filter()?;
        let mut layers: Vec<BoxedLayer> = Vec::new();

        if self.console {
            layers.push(fmt::layer().compact().with_ansi(true).boxed());
        }

        let guard = match &self.file {
            Some(file) => {
                let (layer, guard) = file_layer(name, file)?;
                layers.push(layer);
                Some(guard)
            }
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "enable console or file output".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(layers).with(filter).try_init()?;

        Ok(Logger { guard })
    }

    fn filter(&self) -> Result<EnvFilter, LoggerError> {
        let builder = EnvFilter::builder().with_default_directive(self.level.into());
        match &self.directives {
            None => Ok(builder.from_env_lossy()),
            Some(directives) => builder.parse(directives).map_err(|e| {
                LoggerError::InvalidConfiguration {
                    message: format!("invalid filter '{directives}': {e}").into(),
                    context: None,
                }
            }),
        }
    }
}

fn file_layer(name: &str, file: &FileOutput) -> Result<(BoxedLayer, WorkerGuard), LoggerError> {
    if file.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }

    std::fs::create_dir_all(&file.dir)
        .context(format!("Creating log directory {}", file.dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(file.rotation.clone())
        .filename_prefix(name)
        .filename_suffix("log")
        .max_log_files(file.max_files)
        .build(&file.dir)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = fmt::layer().with_writer(writer).with_ansi(false);
    let layer = if file.json { layer.json().boxed() } else { layer.boxed() };
    Ok((layer, guard))
}

/// Handle to the installed subscriber. Dropping it flushes and stops the file worker.
#[must_use = "dropping the logger stops the background file writer"]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    pub fn builder() -> LoggerBuilder<Unnamed> {
        LoggerBuilder {
            state: Unnamed,
            console: true,
            level: LevelFilter::INFO,
            directives: None,
            file: None,
        }
    }

    /// Whether a file worker is attached.
    #[must_use]
    pub const fn writes_files(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Flushing log files");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn builder_defaults() {
        let builder = Logger::builder().name("tport-test");
        assert!(builder.console);
        assert_eq!(builder.level, LevelFilter::INFO);
        assert!(builder.file.is_none());
        assert!(builder.directives.is_none());
    }

    #[test]
    fn file_options_require_path() {
        let builder = Logger::builder().name("tport-test").max_files(3).json();
        assert!(builder.file.is_none());

        let builder = Logger::builder().name("tport-test").path("logs").max_files(3).json();
        let file = builder.file.unwrap();
        assert_eq!(file.max_files, 3);
        assert!(file.json);
        assert_eq!(file.dir, PathBuf::from("logs"));
    }

    #[test]
    #[serial]
    fn empty_name_is_rejected() {
        let err = Logger::builder().name("   ").init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    #[serial]
    fn disabled_outputs_are_rejected() {
        let err = Logger::builder().name("tport-test").console(false).init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    #[serial]
    fn bad_directives_are_rejected() {
        let err = Logger::builder().name("tport-test").env_filter("tport=[[").init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    #[serial]
    fn zero_max_files_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = Logger::builder()
            .name("tport-test")
            .path(dir.path())
            .max_files(0)
            .init()
            .unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }
}
