//! Terminal spinner shown while the completion request is in flight.
//!
//! The owner starts it, and later calls [`ProgressIndicator::stop`], which
//! cancels the ticker and waits for it to clear its line. Nothing is written
//! by the ticker once `stop` has returned.

use std::io::{self, Write};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

pub const FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const LABEL: &str = "Generating";
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

pub struct ProgressIndicator {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl ProgressIndicator {
    /// Starts the spinner on stderr.
    pub fn start() -> Self {
        Self::start_with(Box::new(io::stderr()))
    }

    pub fn start_with(out: Box<dyn Write + Send>) -> Self {
        let token = CancellationToken::new();
        let handle = tokio::spawn(tick(token.clone(), out));
        Self { token, handle }
    }

    /// Cancels the spinner and waits until its line has been cleared.
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(e) = self.handle.await {
            warn!("Spinner task ended abnormally: {}", e);
        }
    }
}

async fn tick(token: CancellationToken, mut out: Box<dyn Write + Send>) {
    for frame in FRAMES.iter().cycle() {
        if token.is_cancelled() {
            break;
        }
        let _ = write!(out, "\r{} {}", frame, LABEL);
        let _ = out.flush();

        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(TICK_INTERVAL) => {}
        }
    }
    let _ = out.write_all(clear_sequence().as_bytes());
    let _ = out.flush();
}

/// Carriage return, blanks over the spinner text, carriage return.
pub fn clear_sequence() -> String {
    format!("\r{}\r", " ".repeat(LABEL.chars().count() + 2))
}
