//! Status publisher: streams aggregate state to subscribers.
//!
//! Binds a Unix stream socket; every connected subscriber receives one
//! JSON line per republished [`AggregateState`]. Subscribers that stop
//! reading are dropped silently — the overlay surface reconnects on its
//! own schedule, and the wall never waits for it.

use crate::wall::AggregateState;
use log::{debug, error, info};
use std::io::Write;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

/// Publishes aggregate-state lines to every connected subscriber.
pub struct StatusPublisher {
    path: PathBuf,
}

/// Errors produced by the status publisher.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StatusPublisher {
    /// Create a publisher bound to `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The filesystem path of the socket.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bind the socket and publish every update from `updates` until the
    /// channel closes.
    ///
    /// Accepting connections happens on an internal thread; this method
    /// blocks on the update channel.  Run it on a dedicated thread.
    pub fn run(&mut self, updates: mpsc::Receiver<AggregateState>) -> Result<(), StatusError> {
        // Remove stale socket if present.
        let _ = std::fs::remove_file(&self.path);

        let listener = UnixListener::bind(&self.path)?;
        info!("status socket on {}", self.path.display());

        let subscribers: Arc<Mutex<Vec<UnixStream>>> = Arc::new(Mutex::new(Vec::new()));
        let accepting = Arc::clone(&subscribers);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                match stream {
                    Ok(stream) => {
                        debug!("status subscriber connected");
                        accepting.lock().unwrap().push(stream);
                    }
                    Err(e) => error!("status accept error: {}", e),
                }
            }
        });

        for state in updates {
            let line = match serde_json::to_string(&state) {
                Ok(line) => line,
                Err(e) => {
                    error!("status serialize error: {}", e);
                    continue;
                }
            };
            let mut subs = subscribers.lock().unwrap();
            subs.retain_mut(|stream| writeln!(stream, "{}", line).is_ok());
        }

        info!("status channel closed, shutting down");
        Ok(())
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{SlotPhase, SlotSnapshot};
    use std::io::{BufRead, BufReader};
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    fn tmp_socket_path() -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!(
            "gridwall-status-test-{}-{}.sock",
            std::process::id(),
            id
        ))
    }

    fn sample_state() -> AggregateState {
        AggregateState {
            slots: vec![SlotSnapshot {
                slot: 0,
                phase: SlotPhase::Displaying,
                url: Some("https://a".into()),
                rect: None,
                muted: false,
                title: Some("A".into()),
            }],
        }
    }

    #[test]
    fn subscriber_receives_published_state() {
        let path = tmp_socket_path();
        let path2 = path.clone();
        let (tx, rx) = mpsc::channel();

        let _handle = std::thread::spawn(move || {
            let mut publisher = StatusPublisher::new(&path2);
            let _ = publisher.run(rx);
        });

        // Give the publisher a moment to bind.
        std::thread::sleep(std::time::Duration::from_millis(150));

        let stream = UnixStream::connect(&path).expect("connect");
        // Give the accept thread a moment to register the subscriber.
        std::thread::sleep(std::time::Duration::from_millis(150));

        tx.send(sample_state()).unwrap();

        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        reader.read_line(&mut line).expect("read status line");
        let state: AggregateState = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(state, sample_state());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn publishing_with_no_subscribers_is_fine() {
        let path = tmp_socket_path();
        let path2 = path.clone();
        let (tx, rx) = mpsc::channel();

        let handle = std::thread::spawn(move || {
            let mut publisher = StatusPublisher::new(&path2);
            publisher.run(rx)
        });

        std::thread::sleep(std::time::Duration::from_millis(150));
        tx.send(sample_state()).unwrap();
        drop(tx);

        // The publisher must drain the channel and exit cleanly.
        assert!(handle.join().unwrap().is_ok());
        let _ = std::fs::remove_file(&path);
    }
}
