//! Code view: the artifact as literal text, plus copy-to-clipboard with a
//! short-lived confirmation.

use std::io::Write;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

pub const COPY_CONFIRMATION: Duration = Duration::from_secs(2);
pub const EMPTY_CODE_HINT: &str = "// Generated code will appear here...";
pub const CODE_FILE_NAME: &str = "index.html";

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// Clipboard programs to try, in order, with their arguments
#[cfg(target_os = "macos")]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[("pbcopy", &[])];
#[cfg(target_os = "windows")]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[("clip", &[])];
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

/// Pipes text into the platform clipboard command
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        for &(program, args) in CLIPBOARD_COMMANDS {
            let Ok(mut child) = Command::new(program)
                .args(args)
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
            else {
                continue;
            };
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(text.as_bytes())?;
            }
            let status = child.wait()?;
            if status.success() {
                tracing::debug!(program, bytes = text.len(), "Copied to clipboard");
                return Ok(());
            }
        }
        Err(Error::clipboard("no clipboard command available"))
    }
}

/// Display state of the code view. The text itself is never transformed.
#[derive(Debug, Default)]
pub struct CodeView {
    copied_at: Option<Instant>,
    pub scroll: u16,
}

impl CodeView {
    pub fn new() -> Self {
        Self::default()
    }

    /// What to display for an artifact: the artifact itself, or a hint when
    /// there is nothing yet.
    pub fn display_text(code: &str) -> &str {
        if code.is_empty() {
            EMPTY_CODE_HINT
        } else {
            code
        }
    }

    pub fn copy(&mut self, code: &str, clipboard: &mut impl Clipboard) -> Result<()> {
        self.copy_at(code, clipboard, Instant::now())
    }

    pub fn copy_at(
        &mut self,
        code: &str,
        clipboard: &mut impl Clipboard,
        now: Instant,
    ) -> Result<()> {
        clipboard.set_text(code)?;
        self.copied_at = Some(now);
        Ok(())
    }

    /// Whether the "Copied" confirmation is showing at `now`
    pub fn is_confirming(&self, now: Instant) -> bool {
        self.copied_at
            .is_some_and(|at| now.saturating_duration_since(at) < COPY_CONFIRMATION)
    }

    /// Drop a confirmation that has run its course. Returns `true` if one
    /// was dropped, so the caller knows the label changed.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.copied_at.is_some() && !self.is_confirming(now) {
            self.copied_at = None;
            return true;
        }
        false
    }

    pub fn copy_label(&self, now: Instant) -> &'static str {
        if self.is_confirming(now) {
            "Copied"
        } else {
            "Copy"
        }
    }

    pub fn scroll_down(&mut self, lines: u16, total_lines: u16) {
        self.scroll = self.scroll.saturating_add(lines).min(total_lines.saturating_sub(1));
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }
}
