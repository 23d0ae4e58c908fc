use std::time::{Duration, Instant};

use log::{debug, info};
use tokio::{runtime::Handle as TokioHandle, task::JoinHandle};

use crate::{error::AssetError, memory::MemorySource};

/// Reads and parses level descriptions off the calling thread.
#[derive(Clone)]
pub struct LevelLoader {
    // The "ticket" into the async runtime
    io_handle: TokioHandle,
}

/// A level whose load is still running in the background.
pub struct PendingLevel {
    path: String,
    task: JoinHandle<Result<MemorySource, AssetError>>,
    io_handle: TokioHandle,
}

impl LevelLoader {
    pub fn new(io_handle: TokioHandle) -> Self {
        Self { io_handle }
    }

    pub fn load(&self, path: &str) -> PendingLevel {
        let file = path.to_owned();
        self.spawn(path, move || {
            debug!("Loading level description {file}");
            let text = std::fs::read_to_string(&file).map_err(|source| AssetError::Io {
                path: file.clone(),
                source,
            })?;
            MemorySource::from_json(&file, &text)
        })
    }

    /// Runs `job` on the blocking pool and hands back a ticket for it.
    pub fn spawn<F>(&self, path: &str, job: F) -> PendingLevel
    where
        F: FnOnce() -> Result<MemorySource, AssetError> + Send + 'static,
    {
        let _guard = self.io_handle.enter();
        PendingLevel {
            path: path.to_owned(),
            task: tokio::task::spawn_blocking(job),
            io_handle: self.io_handle.clone(),
        }
    }
}

impl PendingLevel {
    /// Blocks until the load finishes, checking every `poll_interval`.
    /// Gives up with [`AssetError::LoadTimeout`] once `max_wait` has passed.
    pub fn wait(
        self,
        poll_interval: Duration,
        max_wait: Duration,
    ) -> Result<MemorySource, AssetError> {
        let started = Instant::now();
        while !self.task.is_finished() {
            let waited = started.elapsed();
            if waited >= max_wait {
                self.task.abort();
                return Err(AssetError::LoadTimeout {
                    path: self.path,
                    waited,
                });
            }
            info!("Waiting for {} to load ({:.0?} so far)", self.path, waited);
            std::thread::sleep(poll_interval.min(max_wait - waited));
        }

        match self.io_handle.block_on(self.task) {
            Ok(result) => result,
            Err(e) => Err(AssetError::LoadAborted {
                path: self.path,
                reason: e.to_string(),
            }),
        }
    }
}
