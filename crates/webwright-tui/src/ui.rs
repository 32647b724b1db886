use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use webwright_core::code_view::{CodeView, CODE_FILE_NAME};
use webwright_core::preview::SANDBOX_POLICY;
use webwright_core::prompt::{EMPTY_TRANSCRIPT_HINT, INPUT_PLACEHOLDER, RESET_CONFIRM_PROMPT};
use webwright_core::{ChatRole, DeviceView, ViewTab};

use crate::app::{App, InputMode};

/// Approximate CSS pixels per terminal column, for scaling the preview frame
const PX_PER_COLUMN: u32 = 8;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let [sidebar_area, workspace_area] = Layout::horizontal([
        Constraint::Percentage(35),
        Constraint::Percentage(65),
    ])
    .areas(body_area);

    render_header(app, frame, header_area);
    render_sidebar(app, frame, sidebar_area);
    render_workspace(app, frame, workspace_area);
    render_footer(app, frame, footer_area);

    if app.show_reset_confirm {
        render_reset_confirm(frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled(" Webwright ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(" "),
    ];

    for tab in ViewTab::all() {
        let style = if tab == app.workbench.view() {
            Style::default().bg(Color::Cyan).fg(Color::Black).bold()
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!(" {} ", tab.label()), style));
        spans.push(Span::raw(" "));
    }

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_sidebar(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area, powered_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    render_transcript(app, frame, chat_area);
    render_input(app, frame, input_area);

    let key_status = if app.has_api_key {
        Span::styled(" key ok ", Style::default().fg(Color::Green))
    } else {
        Span::styled(" no API key ", Style::default().fg(Color::Red).bold())
    };
    let powered = Line::from(vec![
        Span::styled(
            format!(" Powered by {} ", app.model),
            Style::default().fg(Color::DarkGray),
        ),
        key_status,
    ]);
    frame.render_widget(Paragraph::new(powered), powered_area);
}

fn render_transcript(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Chat ");

    let transcript = app.transcript();
    let text = if transcript.is_empty() && !app.is_generating() {
        Text::from(Span::styled(
            EMPTY_TRANSCRIPT_HINT,
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in transcript.messages() {
            let time = msg.timestamp.format("%H:%M").to_string();
            let (label, color) = match msg.role {
                ChatRole::User => ("You", Color::Cyan),
                ChatRole::Model => ("Webwright", Color::Yellow),
            };
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{label}:"),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" {time}"), Style::default().fg(Color::DarkGray)),
            ]));
            for line in msg.text.lines() {
                lines.push(Line::from(line.to_string()));
            }
            lines.push(Line::default());
        }

        if app.is_generating() {
            lines.push(Line::from(Span::styled(
                "Webwright:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{dots}"),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let enabled = app.input_enabled();
    let editing = app.input_mode == InputMode::Editing;
    let (title, border_style) = if app.is_generating() {
        (
            " Generating... ",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM),
        )
    } else if editing {
        (" Describe (Enter to send) ", Style::default().fg(Color::Yellow))
    } else {
        (" Describe (Enter to send) ", Style::default().fg(Color::DarkGray))
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);

    // Horizontal scrolling keeps the cursor inside the box
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 {
        0
    } else {
        app.cursor.saturating_sub(inner_width.saturating_sub(1))
    };

    let input = if app.input.is_empty() {
        Paragraph::new(INPUT_PLACEHOLDER).style(Style::default().fg(Color::DarkGray))
    } else {
        let visible: String = app
            .input
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        let style = if enabled {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
        };
        Paragraph::new(visible).style(style)
    };

    frame.render_widget(input.block(block), area);

    if editing && enabled {
        let cursor_x = (app.cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_workspace(app: &App, frame: &mut Frame, area: Rect) {
    let [toolbar_area, canvas_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);

    render_toolbar(app, frame, toolbar_area);

    match app.workbench.view() {
        ViewTab::Preview => render_preview(app, frame, canvas_area),
        ViewTab::Code => render_code(app, frame, canvas_area),
    }
}

fn render_toolbar(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let mut spans = vec![Span::raw(" ")];

    for (idx, device) in DeviceView::all().into_iter().enumerate() {
        let style = if device == app.workbench.device() {
            Style::default().bg(Color::Magenta).fg(Color::White).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", idx + 1), key_style));
        spans.push(Span::styled(format!(" {} ", device.label()), style));
        spans.push(Span::raw(" "));
    }

    if let Some(url) = &app.preview_url {
        spans.push(Span::styled(
            format!(" {url} "),
            Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// The browser does the real rendering; the terminal shows a scaled frame
/// describing what is on screen there.
fn render_preview(app: &App, frame: &mut Frame, area: Rect) {
    let device = app.workbench.device();
    let width = match device.width_px() {
        Some(px) => ((px / PX_PER_COLUMN) as u16).min(area.width),
        None => area.width,
    };
    let [frame_area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(format!(" {} ", device.label()))
        .title_bottom(Line::from(format!(" {} ", device.css_width())).right_aligned());

    let label = Style::default().fg(Color::DarkGray);
    let html = app.workbench.current_html();
    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled(
            app.page_title().unwrap_or("(untitled page)").to_string(),
            Style::default().fg(Color::White).bold(),
        ))
        .alignment(Alignment::Center),
        Line::default(),
        Line::from(vec![
            Span::styled("revision ", label),
            Span::raw(app.renderer.revision().to_string()),
            Span::styled("  size ", label),
            Span::raw(format!("{} bytes", html.len())),
        ])
        .alignment(Alignment::Center),
        Line::from(vec![
            Span::styled("sandbox ", label),
            Span::raw(SANDBOX_POLICY),
        ])
        .alignment(Alignment::Center),
        Line::default(),
    ];

    match &app.preview_url {
        Some(url) => {
            lines.push(
                Line::from(Span::styled(
                    url.clone(),
                    Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
                ))
                .alignment(Alignment::Center),
            );
            lines.push(
                Line::from(Span::styled("press o to open in a browser", label))
                    .alignment(Alignment::Center),
            );
        }
        None => lines.push(
            Line::from(Span::styled("preview server disabled (--no-serve)", label))
                .alignment(Alignment::Center),
        ),
    }

    let preview = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(preview, frame_area);
}

fn render_code(app: &App, frame: &mut Frame, area: Rect) {
    let copy_label = app.copy_label();
    let copy_style = if copy_label == "Copied" {
        Style::default().fg(Color::Green).bold()
    } else {
        Style::default().fg(Color::Gray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {CODE_FILE_NAME} "))
        .title_top(
            Line::from(vec![
                Span::styled(" y ", Style::default().bg(Color::DarkGray).fg(Color::White)),
                Span::styled(format!(" {copy_label} "), copy_style),
            ])
            .right_aligned(),
        );

    let html = app.workbench.current_html();
    let text = if html.is_empty() {
        Text::from(Span::styled(
            CodeView::display_text(html).to_string(),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let gutter = html.lines().count().to_string().len();
        Text::from(
            html.lines()
                .enumerate()
                .map(|(idx, line)| {
                    Line::from(vec![
                        Span::styled(
                            format!("{:>gutter$} ", idx + 1),
                            Style::default().fg(Color::DarkGray),
                        ),
                        Span::raw(line.to_string()),
                    ])
                })
                .collect::<Vec<_>>(),
        )
    };

    let code = Paragraph::new(text)
        .block(block)
        .scroll((app.code_view.scroll, 0));
    frame.render_widget(code, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" EDIT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let keys: &[(&str, &str)] = if app.show_reset_confirm {
        &[("y", "confirm"), ("n", "cancel")]
    } else {
        match app.input_mode {
            InputMode::Editing => &[("Enter", "send"), ("Esc", "normal")],
            InputMode::Normal => &[
                ("i", "edit"),
                ("p/c", "tabs"),
                ("1-3", "device"),
                ("y", "copy"),
                ("o", "open"),
                ("j/k", "scroll"),
                ("R", "reset"),
                ("q", "quit"),
            ],
        }
    };

    let mut spans = vec![
        Span::styled(mode_text, mode_style),
        Span::styled(" ", label_style),
    ];
    for (key, label) in keys {
        spans.push(Span::styled(format!(" {key} "), key_style));
        spans.push(Span::styled(format!(" {label} "), label_style));
    }
    if let Some(status) = &app.status_message {
        spans.push(Span::styled(
            format!("  {status}"),
            Style::default().bg(Color::Black).fg(Color::Red),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_reset_confirm(frame: &mut Frame, area: Rect) {
    let popup_width = 56.min(area.width.saturating_sub(4));
    let popup_height = 6;

    let [popup_area] = Layout::horizontal([Constraint::Length(popup_width)])
        .flex(Flex::Center)
        .areas(area);
    let [popup_area] = Layout::vertical([Constraint::Length(popup_height)])
        .flex(Flex::Center)
        .areas(popup_area);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Start over ");

    let text = vec![
        Line::from(RESET_CONFIRM_PROMPT),
        Line::default(),
        Line::from(vec![
            Span::styled(" y ", Style::default().bg(Color::DarkGray).fg(Color::White)),
            Span::raw(" confirm   "),
            Span::styled(" n ", Style::default().bg(Color::DarkGray).fg(Color::White)),
            Span::raw(" cancel"),
        ]),
    ];

    let popup = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(popup, popup_area);
}
