//! Clipboard auto-clear behaviour, run on a paused tokio clock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fishvault::clipboard::{Clipboard, ClipboardGuard, MemoryClipboard, DEFAULT_CLEAR_AFTER};
use fishvault::errors::{Result, VaultError};

fn guard() -> (Arc<MemoryClipboard>, ClipboardGuard) {
    let backend = Arc::new(MemoryClipboard::new());
    let guard = ClipboardGuard::new(backend.clone(), DEFAULT_CLEAR_AFTER);
    (backend, guard)
}

/// A clipboard whose writes can be switched off, like a display server
/// that went away mid-session.
#[derive(Default)]
struct FlakyClipboard {
    inner: MemoryClipboard,
    refuse_writes: AtomicBool,
}

impl Clipboard for FlakyClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        if self.refuse_writes.load(Ordering::SeqCst) {
            return Err(VaultError::Clipboard("clipboard unavailable".into()));
        }
        self.inner.set_text(text)
    }

    fn get_text(&self) -> Result<Option<String>> {
        self.inner.get_text()
    }

    fn clear(&self) -> Result<()> {
        self.inner.clear()
    }
}

#[tokio::test(start_paused = true)]
async fn secret_is_cleared_after_thirty_seconds() {
    let (backend, guard) = guard();
    guard.copy("s3cr3t-value").unwrap();

    tokio::time::sleep(Duration::from_secs(29)).await;
    assert_eq!(backend.get_text().unwrap().as_deref(), Some("s3cr3t-value"));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(backend.get_text().unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn newer_clipboard_content_is_left_alone() {
    let (backend, guard) = guard();
    guard.copy("s3cr3t-value").unwrap();

    backend.set_text("other").unwrap();
    tokio::time::sleep(Duration::from_secs(31)).await;

    assert_eq!(backend.get_text().unwrap().as_deref(), Some("other"));
}

#[tokio::test(start_paused = true)]
async fn second_copy_restarts_the_timer() {
    let (backend, guard) = guard();
    guard.copy("first").unwrap();

    tokio::time::sleep(Duration::from_secs(20)).await;
    guard.copy("second").unwrap();

    // The first timer would have fired at 30s; it was cancelled.
    tokio::time::sleep(Duration::from_secs(15)).await;
    assert_eq!(backend.get_text().unwrap().as_deref(), Some("second"));

    tokio::time::sleep(Duration::from_secs(16)).await;
    assert_eq!(backend.get_text().unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn failed_copy_keeps_the_earlier_clear_armed() {
    let backend = Arc::new(FlakyClipboard::default());
    let guard = ClipboardGuard::new(backend.clone(), DEFAULT_CLEAR_AFTER);
    guard.copy("first-secret").unwrap();

    backend.refuse_writes.store(true, Ordering::SeqCst);
    assert!(matches!(
        guard.copy("second"),
        Err(VaultError::Clipboard(_))
    ));
    assert_eq!(backend.get_text().unwrap().as_deref(), Some("first-secret"));

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(backend.get_text().unwrap(), None);
}
