use anyhow::Result;
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::time::Duration;
use tracing::{error, info, warn};

/// Events closer together than this are folded into one reload
const DEBOUNCE: Duration = Duration::from_millis(200);

/// Watches the configuration file and calls back once per burst of changes.
///
/// The watch stops when this value is dropped.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl ConfigWatcher {
    pub fn new<F>(path: impl AsRef<Path>, on_change: F) -> Result<Self>
    where
        F: Fn() + Send + 'static,
    {
        let path = path.as_ref().to_path_buf();
        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(tx, Config::default())?;

        if path.exists() {
            watcher.watch(&path, RecursiveMode::NonRecursive)?;
            info!("Watching configuration file: {}", path.display());
        } else {
            warn!(
                "Configuration file {} does not exist, live reload disabled",
                path.display()
            );
        }

        std::thread::spawn(move || loop {
            match rx.recv() {
                Ok(Ok(_event)) => {
                    // Drain the rest of the burst (editors write in several steps)
                    loop {
                        match rx.recv_timeout(DEBOUNCE) {
                            Ok(_) => continue,
                            Err(RecvTimeoutError::Timeout) => break,
                            Err(RecvTimeoutError::Disconnected) => return,
                        }
                    }
                    info!("Configuration change detected, reloading...");
                    on_change();
                }
                Ok(Err(e)) => error!("Watch error: {:?}", e),
                Err(_) => break,
            }
        });

        Ok(Self {
            _watcher: watcher,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
