//! Clipboard access: the system clipboard when one is reachable, an OSC 52
//! terminal escape otherwise.

use std::io::Write;

use anyhow::{Context, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use tracing::{debug, warn};

pub trait ClipboardBackend {
    fn name(&self) -> &'static str;
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// Preferred backend first, fallback second. The fallback also covers the
/// preferred backend failing.
pub struct Clipboard {
    preferred: Option<Box<dyn ClipboardBackend>>,
    fallback: Box<dyn ClipboardBackend>,
}

impl Clipboard {
    pub fn new(
        preferred: Option<Box<dyn ClipboardBackend>>,
        fallback: Box<dyn ClipboardBackend>,
    ) -> Self {
        Self {
            preferred,
            fallback,
        }
    }

    /// System clipboard if reachable, OSC 52 on stdout otherwise.
    pub fn detect() -> Self {
        let preferred = SystemClipboard::detect()
            .map(|backend| Box::new(backend) as Box<dyn ClipboardBackend>);
        Self::new(preferred, Box::new(Osc52::new(std::io::stdout())))
    }

    pub fn copy(&mut self, text: &str) -> Result<()> {
        if let Some(preferred) = self.preferred.as_mut() {
            match preferred.write_text(text) {
                Ok(()) => {
                    debug!(backend = preferred.name(), "copied to clipboard");
                    return Ok(());
                }
                Err(err) => warn!(backend = preferred.name(), error = %err, "clipboard write failed"),
            }
        }
        self.fallback
            .write_text(text)
            .with_context(|| format!("{} clipboard failed", self.fallback.name()))
    }
}

/// The desktop clipboard through `arboard`.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    /// None when no clipboard is reachable, e.g. a headless session.
    pub fn detect() -> Option<Self> {
        match arboard::Clipboard::new() {
            Ok(inner) => Some(Self { inner }),
            Err(err) => {
                debug!(error = %err, "system clipboard unavailable");
                None
            }
        }
    }
}

impl ClipboardBackend for SystemClipboard {
    fn name(&self) -> &'static str {
        "system"
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.inner
            .set_text(text.to_owned())
            .context("failed to set clipboard text")
    }
}

/// Asks the terminal to set the clipboard via the OSC 52 escape sequence.
pub struct Osc52<W: Write> {
    out: W,
}

impl<W: Write> Osc52<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ClipboardBackend for Osc52<W> {
    fn name(&self) -> &'static str {
        "osc52"
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        write!(self.out, "\x1b]52;c;{}\x07", STANDARD.encode(text))?;
        self.out.flush()?;
        Ok(())
    }
}
