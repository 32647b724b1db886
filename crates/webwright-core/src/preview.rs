//! Preview rendering contract.
//!
//! A [`PreviewFrame`] is one immutable rendering of the artifact at a device
//! width. Any change of HTML or device produces a new frame with a new
//! revision; the host page reloads on a revision change, which tears the old
//! iframe (and every script running in it) down before the new one is built.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Privileges granted to generated content: scripts, same-origin and forms,
/// nothing else (no top-level navigation, no popups).
pub const SANDBOX_POLICY: &str = "allow-scripts allow-same-origin allow-forms";

/// How often the host page asks for the current revision
pub const REVISION_POLL_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceView {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl DeviceView {
    pub fn all() -> [DeviceView; 3] {
        [DeviceView::Desktop, DeviceView::Tablet, DeviceView::Mobile]
    }

    /// Fixed width in CSS pixels, `None` for full width
    pub fn width_px(&self) -> Option<u32> {
        match self {
            DeviceView::Desktop => None,
            DeviceView::Tablet => Some(768),
            DeviceView::Mobile => Some(375),
        }
    }

    pub fn css_width(&self) -> String {
        match self.width_px() {
            Some(px) => format!("{px}px"),
            None => "100%".to_string(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeviceView::Desktop => "Desktop",
            DeviceView::Tablet => "Tablet",
            DeviceView::Mobile => "Mobile",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewFrame {
    pub revision: u64,
    pub device: DeviceView,
    pub html: Arc<str>,
}

impl PreviewFrame {
    /// Full host page embedding this frame in a sandboxed iframe
    pub fn host_document(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Webwright Preview</title>
<style>
html,body{{margin:0;height:100%;background:#0e0e0e}}
#stage{{height:100%;display:flex;justify-content:center}}
#stage iframe{{border:none;height:100%;background:#fff;max-width:100%}}
</style>
</head>
<body data-revision="{revision}" data-device="{device}">
<div id="stage">
<iframe id="preview" title="Website Preview" sandbox="{sandbox}" style="width:{width}" srcdoc="{srcdoc}"></iframe>
</div>
<script>
const revision = {revision};
async function poll() {{
  try {{
    const res = await fetch('/revision', {{ cache: 'no-store' }});
    const body = await res.json();
    if (body.revision !== revision) {{ location.reload(); return; }}
  }} catch (_) {{}}
  setTimeout(poll, {poll_ms});
}}
setTimeout(poll, {poll_ms});
</script>
</body>
</html>"#,
            revision = self.revision,
            device = self.device.label().to_lowercase(),
            sandbox = SANDBOX_POLICY,
            width = self.device.css_width(),
            srcdoc = escape_attribute(&self.html),
            poll_ms = REVISION_POLL_MS,
        )
    }
}

/// Escape text for use inside a double-quoted HTML attribute
pub fn escape_attribute(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Owns the current frame and publishes every rebuild to subscribers
pub struct PreviewRenderer {
    tx: watch::Sender<PreviewFrame>,
}

impl PreviewRenderer {
    pub fn new(html: &str, device: DeviceView) -> Self {
        let frame = PreviewFrame {
            revision: 1,
            device,
            html: Arc::from(html),
        };
        let (tx, _rx) = watch::channel(frame);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<PreviewFrame> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> PreviewFrame {
        self.tx.borrow().clone()
    }

    pub fn revision(&self) -> u64 {
        self.tx.borrow().revision
    }

    /// Rebuild the frame if the HTML or the device differs from the current
    /// one. Returns `true` when a new frame was built.
    pub fn render(&mut self, html: &str, device: DeviceView) -> bool {
        let rebuilt = self.tx.send_if_modified(|frame| {
            if frame.device == device && *frame.html == *html {
                return false;
            }
            *frame = PreviewFrame {
                revision: frame.revision + 1,
                device,
                html: Arc::from(html),
            };
            true
        });
        if rebuilt {
            tracing::debug!(
                revision = self.revision(),
                device = device.label(),
                bytes = html.len(),
                "Rebuilt preview frame"
            );
        }
        rebuilt
    }
}
