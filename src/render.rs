//! Prints the cleaned answer and hands it to the clipboard.

use crate::providers::Clipboard;
use std::io::{self, Write};
use std::time::Duration;
use tracing::debug;

pub const TYPE_DELAY: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Whole text in a single write.
    Instant,
    /// One character at a time, "typed" out.
    Paced(Duration),
}

impl RenderMode {
    /// `--type` only takes effect when not silent.
    pub fn from_flags(silent: bool, typewriter: bool) -> Self {
        if typewriter && !silent {
            Self::Paced(TYPE_DELAY)
        } else {
            Self::Instant
        }
    }
}

pub struct OutputRenderer {
    mode: RenderMode,
}

impl OutputRenderer {
    pub fn new(mode: RenderMode) -> Self {
        Self { mode }
    }

    /// Writes `text` and a trailing newline to `out`.
    pub async fn render_to<W: Write>(&self, text: &str, out: &mut W) -> io::Result<()> {
        match self.mode {
            RenderMode::Instant => {
                out.write_all(format!("{}\n", text).as_bytes())?;
            }
            RenderMode::Paced(delay) => {
                let mut buf = [0u8; 4];
                for c in text.chars() {
                    out.write_all(c.encode_utf8(&mut buf).as_bytes())?;
                    out.flush()?;
                    tokio::time::sleep(delay).await;
                }
                out.write_all(b"\n")?;
            }
        }
        out.flush()
    }
}

/// Copies `text` to the clipboard. Failure is expected on headless hosts and
/// is only logged.
pub fn copy_best_effort(clipboard: &dyn Clipboard, text: &str) {
    if let Err(e) = clipboard.copy(text) {
        debug!("Clipboard copy skipped: {:#}", e);
    }
}
