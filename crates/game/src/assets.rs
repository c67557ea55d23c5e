//! Background model loading.
//!
//! glTF parsing runs on its own thread so the first frames render immediately; the
//! frame loop polls for the result once per frame.

use crossbeam_channel::{Receiver, TryRecvError};
use renderer::{load_model, ModelData, ModelError};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// One in-flight model load.
pub struct AssetLoader {
    path: PathBuf,
    rx: Option<Receiver<Result<ModelData, ModelError>>>,
}

impl AssetLoader {
    /// Start loading `path` on a background thread.
    pub fn spawn(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let (tx, rx) = crossbeam_channel::bounded(1);

        let thread_path = path.clone();
        let spawned = std::thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || {
                let started = Instant::now();
                let result = load_model(&thread_path);
                log::debug!("Parsed {:?} in {:.2?}", thread_path, started.elapsed());
                // The receiver is gone if the app exited first.
                let _ = tx.send(result);
            });

        let rx = match spawned {
            Ok(_) => Some(rx),
            Err(e) => {
                log::error!("Could not start asset loader for {:?}: {}", path, e);
                None
            }
        };
        log::info!("Loading centerpiece from {:?}", path);
        Self { path, rx }
    }

    /// True until the result has been handed out (or the worker vanished).
    pub fn is_pending(&self) -> bool {
        self.rx.is_some()
    }

    /// Non-blocking check. Yields the result exactly once.
    pub fn poll(&mut self) -> Option<Result<ModelData, ModelError>> {
        let rx = self.rx.as_ref()?;
        match rx.try_recv() {
            Ok(result) => {
                self.rx = None;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::error!("Asset loader for {:?} stopped without a result", self.path);
                self.rx = None;
                None
            }
        }
    }
}
