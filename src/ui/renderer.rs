use crate::core::chat_page::{ChatPage, NoticeVariant};
use crate::utils::line_editor::MaskMode;
use crate::utils::time::format_relative;
use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

const SIDEBAR_WIDTH: u16 = 28;
const DIALOG_WIDTH: u16 = 50;
const DIALOG_HEIGHT: u16 = 8;

pub const EMPTY_ROOM_TEXT: &str = "No messages yet. Start the conversation!";
pub const NO_ROOM_TEXT: &str = "Select a room to start chatting";
const COMPOSER_PLACEHOLDER: &str = "Type a message...";
const DIALOG_PLACEHOLDER: &str = "Enter room name...";

pub fn ui(f: &mut Frame, page: &ChatPage, now: DateTime<Utc>) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(f.area());

    render_sidebar(f, page, columns[0]);

    let composer_height = if page.selected_room_id.is_some() { 3 } else { 0 };
    let notice_height = if page.latest_notice().is_some() { 1 } else { 0 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(composer_height),
            Constraint::Length(notice_height),
        ])
        .split(columns[1]);

    render_header(f, page, rows[0]);
    render_messages(f, page, rows[1], now);
    if composer_height > 0 {
        render_composer(f, page, rows[2]);
    }
    if notice_height > 0 {
        render_notice(f, page, rows[3]);
    }
    if page.dialog.open {
        render_dialog(f, page);
    }
}

fn render_sidebar(f: &mut Frame, page: &ChatPage, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            "RoomChat",
            Style::default().add_modifier(Modifier::BOLD),
        ));

    if page.is_loading_rooms {
        let loading = Paragraph::new("Loading rooms...")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(loading, area);
        return;
    }

    if page.rooms.is_empty() {
        let empty = Paragraph::new("No rooms yet.\nPress Ctrl+N to create one.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = page
        .rooms
        .iter()
        .map(|room| ListItem::new(format!("# {}", room.name)))
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    let mut state = ListState::default();
    state.select(page.selected_index());
    f.render_stateful_widget(list, area, &mut state);
}

fn render_header(f: &mut Frame, page: &ChatPage, area: Rect) {
    let user = page.username.as_deref().unwrap_or("guest");
    let hints = format!("{user} • Ctrl+N new room • Ctrl+R reload • Ctrl+L logout • Ctrl+C quit");
    let header = Paragraph::new(Line::from(vec![Span::styled(
        hints,
        Style::default().fg(Color::DarkGray),
    )]))
    .alignment(Alignment::Right)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                page.header_title().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(header, area);
}

fn render_messages(f: &mut Frame, page: &ChatPage, area: Rect, now: DateTime<Utc>) {
    let lines = message_lines(page, area.width.saturating_sub(2) as usize, now);
    let inner_height = area.height.saturating_sub(1) as usize;
    let centered = page.visible_messages().next().is_none();

    // keep the newest message in view
    let scroll = lines.len().saturating_sub(inner_height) as u16;
    let mut paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::LEFT | Borders::RIGHT | Borders::TOP))
        .scroll((scroll, 0));
    if centered {
        paragraph = paragraph
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
    }
    f.render_widget(paragraph, area);
}

/// Lines for the message pane: one header line (sender and relative time)
/// followed by the wrapped content, with a blank line between messages.
/// Own messages are right-aligned.
pub fn message_lines(page: &ChatPage, width: usize, now: DateTime<Utc>) -> Vec<Line<'static>> {
    if page.selected_room_id.is_none() {
        return vec![Line::from(NO_ROOM_TEXT)];
    }

    let mut lines = Vec::new();
    for message in page.visible_messages() {
        let own = page.is_own(message);
        let alignment = if own { Alignment::Right } else { Alignment::Left };
        let sender_style = if own {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        };

        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(
            Line::from(vec![
                Span::styled(message.sender.clone(), sender_style),
                Span::styled(
                    format!(" · {}", format_relative(&message.timestamp, now)),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
            .alignment(alignment),
        );
        for chunk in wrap_text(&message.content, width) {
            lines.push(Line::from(chunk).alignment(alignment));
        }
    }

    if lines.is_empty() {
        lines.push(Line::from(EMPTY_ROOM_TEXT));
    }
    lines
}

/// Break text into rows no wider than `width` display columns.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    for source_line in text.split('\n') {
        let mut row = String::new();
        let mut row_width = 0;
        for c in source_line.chars() {
            let char_width = c.width().unwrap_or(0);
            if row_width + char_width > width && !row.is_empty() {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }
            row.push(c);
            row_width += char_width;
        }
        rows.push(row);
    }
    rows
}

fn render_composer(f: &mut Frame, page: &ChatPage, area: Rect) {
    let active = !page.dialog.open;
    let (text, style) = if page.composer.text().is_empty() {
        (
            COMPOSER_PLACEHOLDER.to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (page.composer.display_text(MaskMode::None), Style::default())
    };

    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor = page.composer.cursor_column(MaskMode::None);
    let scroll = cursor.saturating_sub(inner_width.saturating_sub(1)) as u16;

    let border_style = if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let composer = Paragraph::new(text)
        .style(style)
        .scroll((0, scroll))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title("Message (Enter to send)"),
        );
    f.render_widget(composer, area);

    if active {
        let x = area.x + 1 + (cursor as u16).saturating_sub(scroll);
        f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn render_notice(f: &mut Frame, page: &ChatPage, area: Rect) {
    let Some(notice) = page.latest_notice() else {
        return;
    };
    let style = match notice.variant {
        NoticeVariant::Default => Style::default().fg(Color::Green),
        NoticeVariant::Destructive => Style::default().fg(Color::Red),
    };
    let line = Line::from(vec![
        Span::styled(
            format!("{}: ", notice.title),
            style.add_modifier(Modifier::BOLD),
        ),
        Span::styled(notice.description.clone(), style),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_dialog(f: &mut Frame, page: &ChatPage) {
    let area = centered_rect(DIALOG_WIDTH, DIALOG_HEIGHT, f.area());
    f.render_widget(Clear, area);

    let dialog = &page.dialog;
    let name_line = if dialog.name.text().is_empty() {
        Line::from(Span::styled(
            DIALOG_PLACEHOLDER,
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(dialog.name.display_text(MaskMode::None))
    };
    let error_line = match &dialog.error {
        Some(error) => Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))),
        None => Line::from(""),
    };
    let footer = if dialog.is_loading {
        "Creating..."
    } else {
        "Enter create room • Esc cancel"
    };

    let body = Paragraph::new(vec![
        Line::from("Room Name"),
        name_line,
        error_line,
        Line::from(""),
        Line::from(Span::styled(footer, Style::default().fg(Color::DarkGray))),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title("Create New Chat Room"),
    );
    f.render_widget(body, area);

    let cursor = dialog.name.cursor_column(MaskMode::None) as u16;
    let x = (area.x + 1 + cursor).min(area.right().saturating_sub(2));
    f.set_cursor_position((x, area.y + 2));
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
