use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use clipboard_rs::{Clipboard, ClipboardContext, ContentFormat};
use cs_core::ports::SystemClipboardPort;

/// Text view of the system clipboard, backed by `clipboard-rs`.
pub struct LocalClipboard {
    inner: Arc<Mutex<ClipboardContext>>,
}

impl LocalClipboard {
    pub fn new() -> Result<Self> {
        let context = ClipboardContext::new()
            .map_err(|e| anyhow!("Failed to create clipboard context: {}", e))?;
        Ok(Self {
            inner: Arc::new(Mutex::new(context)),
        })
    }

    fn context(&self) -> Result<MutexGuard<'_, ClipboardContext>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("clipboard context lock poisoned"))
    }
}

impl SystemClipboardPort for LocalClipboard {
    fn read_text(&self) -> Result<Option<String>> {
        let ctx = self.context()?;
        if !ctx.has(ContentFormat::Text) {
            return Ok(None);
        }
        ctx.get_text()
            .map(Some)
            .map_err(|e| anyhow!("Failed to read clipboard text: {}", e))
    }

    fn write_text(&self, text: &str) -> Result<()> {
        let ctx = self.context()?;
        ctx.set_text(text.to_string())
            .map_err(|e| anyhow!("Failed to write clipboard text: {}", e))
    }
}
