use std::time::Instant;

use tokio::task::JoinHandle;
use webwright_core::preview_server::open_in_browser;
use webwright_core::{
    CodeView, CompletedTurn, DeviceView, GeminiClient, PreviewRenderer, Resolution,
    SubmitRejected, SystemClipboard, Transcript, ViewTab, Workbench,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,

    pub workbench: Workbench<GeminiClient>,
    pub generation_task: Option<JoinHandle<CompletedTurn>>,

    // Chat input
    pub input: String,
    pub cursor: usize, // in chars, not bytes

    // Chat sidebar
    pub chat_scroll: u16,
    pub chat_height: u16, // inner size of the transcript area, set on draw
    pub chat_width: u16,
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Workspace
    pub renderer: PreviewRenderer,
    pub preview_url: Option<String>,
    pub code_view: CodeView,
    clipboard: SystemClipboard,

    pub show_reset_confirm: bool,
    pub status_message: Option<String>,

    pub model: String,
    pub has_api_key: bool,
}

impl App {
    pub fn new(
        workbench: Workbench<GeminiClient>,
        renderer: PreviewRenderer,
        preview_url: Option<String>,
        has_api_key: bool,
    ) -> Self {
        let model = workbench.client().sessions().settings().model.clone();
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            workbench,
            generation_task: None,
            input: String::new(),
            cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            renderer,
            preview_url,
            code_view: CodeView::new(),
            clipboard: SystemClipboard,
            show_reset_confirm: false,
            status_message: None,
            model,
            has_api_key,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        self.workbench.transcript()
    }

    pub fn is_generating(&self) -> bool {
        self.workbench.is_generating()
    }

    /// The chat input is disabled while a generation runs or the reset
    /// modal is up.
    pub fn input_enabled(&self) -> bool {
        !self.is_generating() && !self.show_reset_confirm
    }

    // Input editing

    pub fn insert_char(&mut self, c: char) {
        let idx = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(idx, c);
        self.cursor += 1;
    }

    pub fn delete_char_before_cursor(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let idx = char_to_byte_index(&self.input, self.cursor);
        self.input.remove(idx);
    }

    pub fn delete_char_at_cursor(&mut self) {
        if self.cursor < self.input.chars().count() {
            let idx = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(idx);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    /// Send the chat input. Blank input, and anything while the input is
    /// disabled, is silently left where it is.
    pub fn submit_input(&mut self) {
        if !self.input_enabled() {
            return;
        }
        match self.workbench.submit(&self.input) {
            Ok(pending) => {
                self.input.clear();
                self.cursor = 0;
                self.status_message = None;
                self.generation_task = Some(tokio::spawn(pending.run()));
                self.scroll_chat_to_bottom();
            }
            Err(SubmitRejected::Empty | SubmitRejected::Busy) => {}
        }
    }

    /// Hand a finished generation back to the workbench
    pub async fn poll_generation(&mut self) {
        let finished = self
            .generation_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }
        let Some(task) = self.generation_task.take() else {
            return;
        };

        match task.await {
            Ok(turn) => {
                if self.workbench.resolve(turn) == Resolution::Applied {
                    self.code_view.scroll = 0;
                    self.sync_preview();
                }
            }
            Err(e) => {
                tracing::error!("Generation task failed: {}", e);
                self.workbench.abandon();
            }
        }
        self.scroll_chat_to_bottom();
    }

    // Reset flow

    pub fn request_reset(&mut self) {
        self.show_reset_confirm = true;
    }

    pub fn answer_reset(&mut self, confirmed: bool) {
        self.show_reset_confirm = false;
        if !self.workbench.reset(|_| confirmed) {
            return;
        }

        if let Some(task) = self.generation_task.take() {
            task.abort();
        }
        self.input.clear();
        self.cursor = 0;
        self.chat_scroll = 0;
        self.code_view.scroll = 0;
        self.status_message = None;
        self.sync_preview();
    }

    // Workspace

    pub fn set_device(&mut self, device: DeviceView) {
        self.workbench.set_device(device);
        self.sync_preview();
    }

    pub fn set_view(&mut self, view: ViewTab) {
        self.workbench.set_view(view);
    }

    /// Push the current artifact and device to the preview. A no-op when
    /// neither changed.
    pub fn sync_preview(&mut self) {
        let changed = self
            .renderer
            .render(self.workbench.current_html(), self.workbench.device());
        if changed {
            tracing::debug!(revision = self.renderer.revision(), "Preview updated");
        }
    }

    pub fn open_preview(&mut self) {
        match &self.preview_url {
            Some(url) => open_in_browser(url),
            None => {
                self.status_message = Some("Preview server is disabled".to_string());
            }
        }
    }

    pub fn copy_code(&mut self) {
        let code = self.workbench.current_html().to_string();
        if let Err(e) = self.code_view.copy(&code, &mut self.clipboard) {
            tracing::warn!("Copy failed: {}", e);
            self.status_message = Some(e.to_string());
        }
    }

    pub fn copy_label(&self) -> &'static str {
        self.code_view.copy_label(Instant::now())
    }

    pub fn code_line_count(&self) -> u16 {
        let text = CodeView::display_text(self.workbench.current_html());
        text.lines().count().try_into().unwrap_or(u16::MAX)
    }

    pub fn scroll_down(&mut self) {
        match self.workbench.view() {
            ViewTab::Code => {
                let total = self.code_line_count();
                self.code_view.scroll_down(1, total);
            }
            ViewTab::Preview => self.scroll_chat_down(1),
        }
    }

    pub fn scroll_up(&mut self) {
        match self.workbench.view() {
            ViewTab::Code => self.code_view.scroll_up(1),
            ViewTab::Preview => self.scroll_chat_up(1),
        }
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        let max = self.chat_line_count().saturating_sub(self.visible_chat_height());
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    /// Periodic housekeeping: advance the "Thinking..." ellipsis, pick up a
    /// finished generation and let the "Copied" label lapse.
    pub async fn on_tick(&mut self, now: Instant) {
        if self.is_generating() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        self.poll_generation().await;
        self.code_view.expire(now);
    }

    /// Scroll chat to bottom so the newest message (or "Thinking...") is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        let total_lines = self.chat_line_count();
        let visible_height = self.visible_chat_height();
        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }

    fn visible_chat_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    fn chat_line_count(&self) -> u16 {
        // Fall back to a sane width before the first draw
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            40
        };

        let mut total_lines: usize = self
            .transcript()
            .messages()
            .iter()
            .map(|msg| 2 + wrapped_line_count(&msg.text, wrap_width))
            .sum();
        if self.is_generating() {
            total_lines += 2; // "Webwright:" + "Thinking..."
        }
        total_lines.try_into().unwrap_or(u16::MAX)
    }

    /// Title of the current page, for the preview frame
    pub fn page_title(&self) -> Option<&str> {
        page_title(self.workbench.current_html())
    }

    /// Stop the background generation before exit
    pub fn shutdown(&mut self) {
        if let Some(task) = self.generation_task.take() {
            task.abort();
        }
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Rows a block of text takes when wrapped at `width` columns
fn wrapped_line_count(text: &str, width: usize) -> usize {
    let width = width.max(1);
    text.lines()
        .map(|line| {
            let char_count = line.chars().count();
            if char_count == 0 {
                1
            } else {
                char_count.div_ceil(width)
            }
        })
        .sum::<usize>()
        .max(1)
}

fn page_title(html: &str) -> Option<&str> {
    let lower = html.to_ascii_lowercase();
    let open = lower.find("<title")?;
    let start = open + lower[open..].find('>')? + 1;
    let end = start + lower[start..].find("</title>")?;
    let title = html[start..end].trim();
    (!title.is_empty()).then_some(title)
}
