//! # Runtime
//!
//! Tokio runtime profiles for the tracking service binaries.
//!
//! * **High performance**: the HTTP server profile, larger stacks and long keep-alive.
//! * **Memory efficient**: half the workers, used by tooling and small deployments.
//! * **Default**: auto-detected workers with a 3 `MiB` stack.
//!
//! ```rust,ignore
//! #[tport_runtime::main(high_performance)]
//! async fn main() -> anyhow::Result<()> {
//!     Ok(())
//! }
//! ```

pub use anyhow::Result;
pub use tport_derive::main;

use anyhow::Context;
use std::{num::NonZero, sync::OnceLock, thread::available_parallelism, time::Duration};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

const FALLBACK_WORKERS: usize = 4;
const MAX_WORKERS: usize = 1024;
const MIB: usize = 1024 * 1024;
const STACK_BOUNDS: (usize, usize) = (MIB, 16 * MIB);
const DEFAULT_THREAD_NAME: &str = "tport-worker";

static DETECTED_WORKERS: OnceLock<usize> = OnceLock::new();

/// Worker count from `TOKIO_WORKER_THREADS`, otherwise the available parallelism.
fn detected_workers() -> usize {
    *DETECTED_WORKERS.get_or_init(|| {
        std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|raw| raw.parse::<usize>().ok())
            .filter(|n| (1..=MAX_WORKERS).contains(n))
            .unwrap_or_else(|| {
                available_parallelism().map_or(FALLBACK_WORKERS, NonZero::get)
            })
    })
}

/// Settings applied to the multi-threaded Tokio builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub worker_threads: usize,
    pub stack_size: usize,
    pub thread_name: String,
    pub thread_keep_alive: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: detected_workers(),
            stack_size: 3 * MIB,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            thread_keep_alive: Duration::from_secs(60),
        }
    }
}

impl RuntimeConfig {
    /// Profile used by the API server.
    #[must_use]
    pub fn high_performance() -> Self {
        Self {
            stack_size: 4 * MIB,
            thread_name: "tport-hp".to_owned(),
            thread_keep_alive: Duration::from_secs(300),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn memory_efficient() -> Self {
        Self {
            worker_threads: (detected_workers() / 2).max(1),
            stack_size: 2 * MIB,
            thread_name: "tport-mem".to_owned(),
            thread_keep_alive: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.clamp(1, MAX_WORKERS);
        self
    }

    #[must_use]
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = bytes.clamp(STACK_BOUNDS.0, STACK_BOUNDS.1);
        self
    }

    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.thread_name = name;
        }
        self
    }

    #[must_use]
    pub const fn with_thread_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.thread_keep_alive = keep_alive;
        self
    }

    /// Re-applies the builder bounds to values set directly on the public fields.
    fn normalized(&self) -> Self {
        self.clone()
            .with_worker_threads(self.worker_threads)
            .with_stack_size(self.stack_size)
            .with_thread_name(if self.thread_name.trim().is_empty() {
                DEFAULT_THREAD_NAME.to_owned()
            } else {
                self.thread_name.clone()
            })
    }
}

/// Builds a multi-threaded runtime with I/O and timers enabled.
///
/// # Errors
///
/// Fails when the OS refuses to spawn the worker threads.
pub fn build_runtime_with_config(config: &RuntimeConfig) -> Result<Runtime> {
    let config = config.normalized();
    debug!(?config, "Building tokio runtime");

    Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .thread_name(&config.thread_name)
        .thread_stack_size(config.stack_size)
        .thread_keep_alive(config.thread_keep_alive)
        .enable_all()
        .build()
        .context("Failed to initialize the tokio runtime")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_threads_are_clamped() {
        assert_eq!(RuntimeConfig::default().with_worker_threads(0).worker_threads, 1);
        assert_eq!(RuntimeConfig::default().with_worker_threads(4096).worker_threads, MAX_WORKERS);
    }

    #[test]
    fn stack_size_is_clamped() {
        assert_eq!(RuntimeConfig::default().with_stack_size(1).stack_size, MIB);
        assert_eq!(RuntimeConfig::default().with_stack_size(64 * MIB).stack_size, 16 * MIB);
    }

    #[test]
    fn blank_thread_name_keeps_previous() {
        let config = RuntimeConfig::default().with_thread_name("  ");
        assert_eq!(config.thread_name, DEFAULT_THREAD_NAME);
    }

    #[test]
    fn memory_profile_uses_fewer_workers() {
        let efficient = RuntimeConfig::memory_efficient();
        assert!(efficient.worker_threads >= 1);
        assert!(efficient.worker_threads <= RuntimeConfig::high_performance().worker_threads);
    }

    #[test]
    fn built_runtime_executes_futures() {
        let mut config = RuntimeConfig::memory_efficient().with_worker_threads(1);
        config.thread_name = String::new();
        let runtime = build_runtime_with_config(&config).unwrap();
        assert_eq!(runtime.block_on(async { 40 + 2 }), 42);
    }
}
