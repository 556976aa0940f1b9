//! Shared provider traits for dependency injection.
//!
//! Side effects that tests must not trigger for real (reading the wall
//! clock, touching the system clipboard) are reached through these traits.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};
use std::time::Duration;

/// Trait for providing timestamps.
///
/// # Example
///
/// ```
/// use how_cli::providers::{Clock, SystemClock};
///
/// let now = SystemClock.now();
/// assert!(now.timestamp() > 0);
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current local time.
    fn now(&self) -> DateTime<Local>;
}

/// Default clock backed by the system time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Destination for the rendered command.
pub trait Clipboard: Send + Sync {
    fn copy(&self, text: &str) -> Result<()>;
}

/// Upper bound on how long a Linux copy keeps serving the selection.
///
/// X11 and Wayland selections live in the owning process. The copy is held
/// until a clipboard manager takes it over or this much time has passed.
pub const CLIPBOARD_HOLD: Duration = Duration::from_millis(500);

/// Clipboard backed by the desktop session through `arboard`.
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn copy(&self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| anyhow!("clipboard unavailable: {}", e))?;
        let set = clipboard.set();
        #[cfg(target_os = "linux")]
        let set = {
            use arboard::SetExtLinux;
            set.wait_until(std::time::Instant::now() + CLIPBOARD_HOLD)
        };
        set.text(text.to_string())
            .map_err(|e| anyhow!("clipboard write failed: {}", e))
    }
}

/// Clipboard that discards the text.
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn copy(&self, _text: &str) -> Result<()> {
        Ok(())
    }
}
