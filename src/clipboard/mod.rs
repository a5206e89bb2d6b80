//! Copy a secret to the clipboard and clear it again after a delay.
//!
//! The clear only happens if the clipboard still holds exactly what was
//! copied, so anything the user copied in the meantime is left alone.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use subtle::ConstantTimeEq;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};

/// Default delay before a copied secret is cleared.
pub const DEFAULT_CLEAR_AFTER: Duration = Duration::from_secs(30);

/// A text clipboard.
pub trait Clipboard: Send + Sync {
    fn set_text(&self, text: &str) -> Result<()>;

    /// Current text contents, `None` if empty or not text.
    fn get_text(&self) -> Result<Option<String>>;

    fn clear(&self) -> Result<()>;
}

/// The OS clipboard via `arboard`.
pub struct SystemClipboard {
    inner: Mutex<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let inner = arboard::Clipboard::new()
            .map_err(|e| VaultError::Clipboard(format!("clipboard unavailable: {e}")))?;
        Ok(Self {
            inner: Mutex::new(inner),
        })
    }

    fn with<T>(&self, f: impl FnOnce(&mut arboard::Clipboard) -> Result<T>) -> Result<T> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| VaultError::Clipboard("clipboard lock poisoned".into()))?;
        f(&mut inner)
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        self.with(|cb| {
            cb.set_text(text)
                .map_err(|e| VaultError::Clipboard(e.to_string()))
        })
    }

    fn get_text(&self) -> Result<Option<String>> {
        self.with(|cb| match cb.get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(VaultError::Clipboard(e.to_string())),
        })
    }

    fn clear(&self) -> Result<()> {
        self.with(|cb| cb.clear().map_err(|e| VaultError::Clipboard(e.to_string())))
    }
}

/// In-process clipboard for tests and headless use.
#[derive(Default)]
pub struct MemoryClipboard {
    text: Mutex<Option<Zeroizing<String>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<Zeroizing<String>>>> {
        self.text
            .lock()
            .map_err(|_| VaultError::Clipboard("clipboard lock poisoned".into()))
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        *self.slot()? = Some(Zeroizing::new(text.to_string()));
        Ok(())
    }

    fn get_text(&self) -> Result<Option<String>> {
        Ok(self.slot()?.as_ref().map(|t| t.to_string()))
    }

    fn clear(&self) -> Result<()> {
        *self.slot()? = None;
        Ok(())
    }
}

/// Writes secrets to a clipboard and schedules their removal.
pub struct ClipboardGuard {
    backend: Arc<dyn Clipboard>,
    clear_after: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl ClipboardGuard {
    pub fn new(backend: Arc<dyn Clipboard>, clear_after: Duration) -> Self {
        Self {
            backend,
            clear_after,
            pending: Mutex::new(None),
        }
    }

    pub fn clear_after(&self) -> Duration {
        self.clear_after
    }

    /// Put `secret` on the clipboard and arm the clear timer.
    ///
    /// A previous pending clear is replaced only once the new secret is on
    /// the clipboard; if writing fails, the earlier timer keeps running.
    /// Must be called from within a tokio runtime.
    pub fn copy(&self, secret: &str) -> Result<()> {
        let mut pending = self.pending()?;
        self.backend.set_text(secret)?;

        let backend = Arc::clone(&self.backend);
        let expected = Zeroizing::new(secret.to_string());
        let delay = self.clear_after;

        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            clear_if_unchanged(backend.as_ref(), &expected);
        });
        if let Some(previous) = pending.replace(timer) {
            previous.abort();
        }

        debug!(clear_after_secs = delay.as_secs(), "secret copied to clipboard");
        Ok(())
    }

    /// Cancel a pending clear, leaving the clipboard as it is.
    pub fn cancel(&self) -> Result<()> {
        if let Some(handle) = self.pending()?.take() {
            handle.abort();
        }
        Ok(())
    }

    /// Wait for the pending clear (if any) to run.
    pub async fn wait(&self) -> Result<()> {
        let handle = self.pending()?.take();
        if let Some(handle) = handle {
            // An aborted task is not an error here.
            let _ = handle.await;
        }
        Ok(())
    }

    fn pending(&self) -> Result<std::sync::MutexGuard<'_, Option<JoinHandle<()>>>> {
        self.pending
            .lock()
            .map_err(|_| VaultError::Clipboard("clipboard timer lock poisoned".into()))
    }
}

fn clear_if_unchanged(backend: &dyn Clipboard, expected: &str) {
    let current = match backend.get_text() {
        Ok(Some(text)) => Zeroizing::new(text),
        Ok(None) => return,
        Err(e) => {
            warn!(error = %e, "could not read clipboard, leaving it as is");
            return;
        }
    };

    if !bool::from(current.as_bytes().ct_eq(expected.as_bytes())) {
        debug!("clipboard changed since copy, not clearing");
        return;
    }

    match backend.clear() {
        Ok(()) => info!("clipboard cleared"),
        Err(e) => warn!(error = %e, "failed to clear clipboard"),
    }
}
