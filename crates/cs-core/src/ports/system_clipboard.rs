use anyhow::Result;

/// Text access to the clipboard of the machine the client runs on.
pub trait SystemClipboardPort: Send + Sync {
    /// Current clipboard text, `None` when the clipboard holds no text.
    fn read_text(&self) -> Result<Option<String>>;

    fn write_text(&self, text: &str) -> Result<()>;
}
