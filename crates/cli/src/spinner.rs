//! Terminal spinner shown while pods are sampled

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ktop_lib::{Console, Progress};
use tokio::task::JoinHandle;
use tracing::debug;

const FRAMES: [&str; 4] = ["|", "/", "-", "\\"];
const TICK: Duration = Duration::from_millis(100);

#[derive(Default)]
struct Counters {
    done: AtomicU64,
    total: AtomicU64,
}

/// Spinner with a pod counter, drawn on the console's status line
///
/// Drawing happens on a background task; the progress callbacks only touch
/// atomics, so sampling never waits on the terminal.
pub struct Spinner<W> {
    counters: Arc<Counters>,
    console: Console<W>,
    handle: Option<JoinHandle<()>>,
}

impl<W: Write + Send + 'static> Spinner<W> {
    /// Start drawing; does nothing on a non-interactive console
    pub fn spawn(console: Console<W>) -> Self {
        let counters = Arc::new(Counters::default());
        let handle = console.is_interactive().then(|| {
            let counters = Arc::clone(&counters);
            let console = console.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(TICK);
                for frame in FRAMES.iter().cycle() {
                    ticker.tick().await;
                    let total = counters.total.load(Ordering::Relaxed);
                    let text = if total > 0 {
                        let done = counters.done.load(Ordering::Relaxed);
                        format!("{} {}/{}", frame, done, total)
                    } else {
                        format!("{} ", frame)
                    };
                    if console.status(&text).await.is_err() {
                        break;
                    }
                }
            })
        });

        Self {
            counters,
            console,
            handle,
        }
    }

    /// Stop drawing and erase the status line
    pub async fn stop(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
            if let Err(error) = self.console.clear_status().await {
                debug!(%error, "Failed to clear spinner line");
            }
        }
    }
}

impl<W: Send> Progress for Spinner<W> {
    fn start(&self, total: u64) {
        self.counters.done.store(0, Ordering::Relaxed);
        self.counters.total.store(total, Ordering::Relaxed);
    }

    fn advance(&self) {
        self.counters.done.fetch_add(1, Ordering::Relaxed);
    }

    fn finish(&self) {
        self.counters.total.store(0, Ordering::Relaxed);
    }
}
