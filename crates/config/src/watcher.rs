use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Watches the config file for changes and sends a notification on every write.
///
/// The parent directory is watched rather than the file itself so the watch
/// survives editors that replace the file on save, and so a config created
/// after startup is still picked up.  Dropping the handle stops the watch.
///
/// # Example
/// ```no_run
/// # async fn demo() {
/// use rivalbat_config::ConfigWatcher;
/// let (_watcher, mut rx) = ConfigWatcher::spawn("/home/user/.config/rivalbat/config.toml");
/// while rx.recv().await.is_some() {
///     println!("config changed, reloading");
/// }
/// # }
/// ```
pub struct ConfigWatcher {
    task: JoinHandle<()>,
}

impl ConfigWatcher {
    /// Spawn a filesystem watcher for `path`.
    /// Returns the watcher handle and a receiver that fires on every detected change.
    pub fn spawn(path: impl AsRef<Path>) -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(watch_loop(path.as_ref().to_path_buf(), tx));

        (Self { task }, rx)
    }
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn watch_loop(path: PathBuf, tx: mpsc::Sender<()>) {
    use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
    use std::time::Duration;

    let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) else {
        warn!("Config path '{}' has no parent directory; not watching.", path.display());
        return;
    };
    let Some(file_name) = path.file_name().map(|n| n.to_os_string()) else {
        warn!("Config path '{}' has no file name; not watching.", path.display());
        return;
    };

    let (sync_tx, mut sync_rx) = mpsc::channel::<notify::Result<Event>>(16);

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = sync_tx.blocking_send(res);
        },
        Config::default().with_poll_interval(Duration::from_secs(2)),
    ) {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to create filesystem watcher: {e}");
            return;
        }
    };

    if let Err(e) = watcher.watch(dir, RecursiveMode::NonRecursive) {
        warn!("Cannot watch '{}': {e}; config changes need a restart.", dir.display());
        return;
    }

    info!("Watching config file: {}", path.display());

    while let Some(event) = sync_rx.recv().await {
        match event {
            Ok(e) => {
                if is_relevant(&e, &file_name) {
                    // A full channel already holds a pending reload; coalesce.
                    match tx.try_send(()) {
                        Ok(()) | Err(mpsc::error::TrySendError::Full(())) => {}
                        Err(mpsc::error::TrySendError::Closed(())) => break,
                    }
                }
            }
            Err(e) => warn!("Watcher error: {e}"),
        }
    }
}

/// `true` for create/modify/remove events that touch the watched file.
fn is_relevant(event: &notify::Event, file_name: &OsString) -> bool {
    use notify::EventKind::*;

    matches!(event.kind, Modify(_) | Create(_) | Remove(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}
