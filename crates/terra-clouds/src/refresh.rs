//! Staleness policy and the background refresh job.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime};

use crossbeam_channel::{Receiver, TryRecvError, bounded};

use crate::error::FetchError;

/// Returns `true` when the cached file is missing or older than `max_age`.
///
/// A file with an unreadable or future modification time counts as fresh;
/// the next successful write will restore a sane timestamp.
pub fn is_stale(path: &Path, max_age: Duration) -> bool {
    let modified = match std::fs::metadata(path).and_then(|meta| meta.modified()) {
        Ok(modified) => modified,
        Err(_) => return true,
    };

    match SystemTime::now().duration_since(modified) {
        Ok(age) => age > max_age,
        Err(_) => false,
    }
}

/// Downloads the raw cloud image to a local path.
#[derive(Clone, Debug)]
pub struct CloudFetcher {
    url: String,
    dest: PathBuf,
}

impl CloudFetcher {
    pub fn new(url: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            dest: dest.into(),
        }
    }

    /// Stream the remote image to disk, returning the byte count.
    ///
    /// The destination file is opened lazily on the first received chunk, so
    /// a transfer that fails before any data arrives leaves no file behind
    /// (and callers must tolerate a zero-byte file if it fails mid-stream).
    pub fn fetch_to_disk(&self) -> Result<u64, FetchError> {
        let response = ureq::get(self.url.as_str()).call().map_err(Box::new)?;
        let mut reader = response.into_body().into_reader();

        let mut file: Option<File> = None;
        let mut buffer = [0u8; 8192];
        let mut total: u64 = 0;

        loop {
            let read = reader.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            let out = match file.as_mut() {
                Some(out) => out,
                None => file.insert(File::create(&self.dest)?),
            };
            out.write_all(&buffer[..read])?;
            total += read as u64;
        }

        log::info!("Fetched {total} cloud bytes to {}", self.dest.display());
        Ok(total)
    }
}

/// A launched worker: its join handle plus the completion channel.
struct InFlight {
    handle: JoinHandle<()>,
    done: Receiver<Result<u64, FetchError>>,
}

/// Render-thread view of the background refresh job.
///
/// At most one worker runs at a time per refresher; the launch guard and the
/// completion handoff are both owned by the render thread, and the worker
/// only communicates through a bounded(1) channel.
pub struct CloudRefresher {
    fetcher: CloudFetcher,
    job: Option<InFlight>,
}

impl CloudRefresher {
    pub fn new(url: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        Self {
            fetcher: CloudFetcher::new(url, dest),
            job: None,
        }
    }

    /// Point future fetches at a different URL. An in-flight worker keeps
    /// its original URL.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.fetcher.url = url.into();
    }

    /// Path of the raw download this refresher maintains.
    pub fn raw_path(&self) -> &Path {
        &self.fetcher.dest
    }

    /// Whether a worker is currently running.
    pub fn is_running(&self) -> bool {
        self.job.is_some()
    }

    /// Evaluate the per-frame trigger: launch a fetch iff no job is running,
    /// the feature is enabled, and the cached file is absent or stale.
    ///
    /// Returns `true` when a worker was launched this call.
    pub fn maybe_launch(&mut self, enabled: bool, max_age: Duration) -> bool {
        if self.job.is_some() || !enabled || !is_stale(&self.fetcher.dest, max_age) {
            return false;
        }

        let fetcher = self.fetcher.clone();
        self.launch_with(move || fetcher.fetch_to_disk())
    }

    /// Launch a worker running `work`. Used directly by tests; production
    /// code goes through [`CloudRefresher::maybe_launch`].
    pub fn launch_with(
        &mut self,
        work: impl FnOnce() -> Result<u64, FetchError> + Send + 'static,
    ) -> bool {
        if self.job.is_some() {
            return false;
        }

        let (sender, done) = bounded(1);
        let spawned = std::thread::Builder::new()
            .name("cloud-fetch".into())
            .spawn(move || {
                let _ = sender.send(work());
            });

        match spawned {
            Ok(handle) => {
                self.job = Some(InFlight { handle, done });
                true
            }
            Err(e) => {
                log::warn!("Could not spawn cloud-fetch worker: {e}");
                false
            }
        }
    }

    /// Poll the completion channel. Returns the worker's result exactly once,
    /// on the frame it finished; the worker is joined before returning, which
    /// is non-blocking in practice because it has already sent its result.
    pub fn poll_finished(&mut self) -> Option<Result<u64, FetchError>> {
        let outcome = match &self.job {
            Some(job) => match job.done.try_recv() {
                Ok(outcome) => outcome,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => Err(FetchError::WorkerLost),
            },
            None => return None,
        };

        if let Some(job) = self.job.take() {
            let _ = job.handle.join();
        }
        Some(outcome)
    }
}
