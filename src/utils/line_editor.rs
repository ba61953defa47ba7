//! Single-line text editing.
//!
//! [`LineEditorState`] is the editing model behind the chat composer and the
//! room-name dialog in the TUI, and [`prompt_line`] drives the same model in
//! raw mode for the login prompt (with the password masked).

use crate::utils::input::sanitize_text_input;
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::fmt;
use std::io::{self, Write};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEditorState {
    text: String,
    /// Cursor position in chars, not bytes.
    cursor: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MaskMode {
    #[default]
    None,
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEditorOptions {
    pub initial_text: String,
    pub allow_cancel: bool,
    pub mask_mode: MaskMode,
}

impl Default for LineEditorOptions {
    fn default() -> Self {
        Self {
            initial_text: String::new(),
            allow_cancel: true,
            mask_mode: MaskMode::None,
        }
    }
}

impl LineEditorOptions {
    pub fn masked() -> Self {
        Self {
            mask_mode: MaskMode::Hidden,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEditAction {
    Insert(char),
    Backspace,
    Delete,
    MoveLeft,
    MoveRight,
    MoveStart,
    MoveEnd,
    DeleteWord,
    ClearAll,
    Paste(String),
    Submit,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEditOutcome {
    Continue { redraw: bool },
    Submit(String),
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct LineEditorError {
    message: String,
}

impl LineEditorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.message == CANCELLED_MESSAGE
    }
}

impl fmt::Display for LineEditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LineEditorError {}

const CANCELLED_MESSAGE: &str = "Cancelled by user";

impl LineEditorState {
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Text as it should be shown on screen.
    pub fn display_text(&self, mask_mode: MaskMode) -> String {
        match mask_mode {
            MaskMode::None => self.text.clone(),
            MaskMode::Hidden => "*".repeat(self.text.chars().count()),
        }
    }

    /// Display width of everything left of the cursor.
    pub fn cursor_column(&self, mask_mode: MaskMode) -> usize {
        let shown: String = self.display_text(mask_mode).chars().take(self.cursor).collect();
        UnicodeWidthStr::width(shown.as_str())
    }

    pub fn apply(&mut self, action: LineEditAction) -> LineEditOutcome {
        let changed = match action {
            LineEditAction::Insert(c) => {
                let idx = self.byte_index(self.cursor);
                self.text.insert(idx, c);
                self.cursor += 1;
                true
            }
            LineEditAction::Backspace => {
                if self.cursor == 0 {
                    false
                } else {
                    let end = self.byte_index(self.cursor);
                    let start = self.byte_index(self.cursor - 1);
                    self.text.replace_range(start..end, "");
                    self.cursor -= 1;
                    true
                }
            }
            LineEditAction::Delete => {
                let start = self.byte_index(self.cursor);
                if start >= self.text.len() {
                    false
                } else {
                    let end = self.byte_index(self.cursor + 1);
                    self.text.replace_range(start..end, "");
                    true
                }
            }
            LineEditAction::MoveLeft => self.move_to(self.cursor.saturating_sub(1)),
            LineEditAction::MoveRight => {
                let len = self.text.chars().count();
                self.move_to((self.cursor + 1).min(len))
            }
            LineEditAction::MoveStart => self.move_to(0),
            LineEditAction::MoveEnd => self.move_to(self.text.chars().count()),
            LineEditAction::DeleteWord => self.delete_word_before_cursor(),
            LineEditAction::ClearAll => {
                let had_text = !self.text.is_empty();
                self.clear();
                had_text
            }
            LineEditAction::Paste(text) => {
                let sanitized = sanitize_text_input(&text);
                let first_line = sanitized.split('\n').next().unwrap_or_default();
                if !first_line.is_empty() {
                    let idx = self.byte_index(self.cursor);
                    self.text.insert_str(idx, first_line);
                    self.cursor += first_line.chars().count();
                }
                if sanitized.contains('\n') {
                    return LineEditOutcome::Submit(self.text.clone());
                }
                !first_line.is_empty()
            }
            LineEditAction::Submit => return LineEditOutcome::Submit(self.text.clone()),
            LineEditAction::Cancel => return LineEditOutcome::Cancelled,
        };
        LineEditOutcome::Continue { redraw: changed }
    }

    fn move_to(&mut self, cursor: usize) -> bool {
        if cursor == self.cursor {
            return false;
        }
        self.cursor = cursor;
        true
    }

    fn delete_word_before_cursor(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let chars: Vec<char> = self.text.chars().collect();
        let end = self.cursor.min(chars.len());
        let mut start = end;
        while start > 0 && chars[start - 1] == ' ' {
            start -= 1;
        }
        while start > 0 && chars[start - 1] != ' ' {
            start -= 1;
        }
        let byte_start = self.byte_index(start);
        let byte_end = self.byte_index(end);
        self.text.replace_range(byte_start..byte_end, "");
        self.cursor = start;
        true
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len())
    }
}

/// Translate a key press into an editing action. Keys the editor does not
/// own (arrows up/down, Ctrl+N, ...) return `None` so the caller can use them.
pub fn map_key_event_to_action(
    key: &KeyEvent,
    options: &LineEditorOptions,
) -> Option<LineEditAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => Some(LineEditAction::Submit),
        KeyCode::Esc if options.allow_cancel => Some(LineEditAction::Cancel),
        KeyCode::Backspace => Some(LineEditAction::Backspace),
        KeyCode::Delete => Some(LineEditAction::Delete),
        KeyCode::Left => Some(LineEditAction::MoveLeft),
        KeyCode::Right => Some(LineEditAction::MoveRight),
        KeyCode::Home => Some(LineEditAction::MoveStart),
        KeyCode::End => Some(LineEditAction::MoveEnd),
        KeyCode::Char('a') if ctrl => Some(LineEditAction::MoveStart),
        KeyCode::Char('e') if ctrl => Some(LineEditAction::MoveEnd),
        KeyCode::Char('w') if ctrl => Some(LineEditAction::DeleteWord),
        KeyCode::Char('u') if ctrl => Some(LineEditAction::ClearAll),
        KeyCode::Char('c') if ctrl && options.allow_cancel => Some(LineEditAction::Cancel),
        KeyCode::Char(c) if !ctrl => {
            if c == '\n' || c == '\r' {
                Some(LineEditAction::Submit)
            } else {
                Some(LineEditAction::Insert(c))
            }
        }
        _ => None,
    }
}

/// Read one line from the terminal in raw mode.
///
/// Returns an error whose [`LineEditorError::is_cancelled`] is true when the
/// user pressed Esc or Ctrl+C.
pub fn prompt_line(prompt: &str, options: &LineEditorOptions) -> Result<String, LineEditorError> {
    enable_raw_mode().map_err(|err| LineEditorError::new(err.to_string()))?;
    let mut stdout = io::stdout();
    execute!(stdout, event::EnableBracketedPaste)
        .map_err(|err| LineEditorError::new(err.to_string()))?;

    let result = run_prompt(prompt, options);

    let disable_raw_result =
        disable_raw_mode().map_err(|err| LineEditorError::new(err.to_string()));
    let disable_paste_result = execute!(stdout, event::DisableBracketedPaste)
        .map_err(|err| LineEditorError::new(err.to_string()));
    println!();

    let value = result?;
    disable_raw_result?;
    disable_paste_result?;
    Ok(value)
}

fn run_prompt(prompt: &str, options: &LineEditorOptions) -> Result<String, LineEditorError> {
    let io_err = |err: io::Error| LineEditorError::new(err.to_string());
    let mut state = LineEditorState::with_text(options.initial_text.clone());
    let mut needs_redraw = true;

    loop {
        if needs_redraw {
            redraw_prompt(prompt, &state, options.mask_mode).map_err(io_err)?;
            needs_redraw = false;
        }

        if !event::poll(Duration::from_millis(100)).map_err(io_err)? {
            continue;
        }
        let action = match event::read().map_err(io_err)? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                map_key_event_to_action(&key, options)
            }
            Event::Paste(text) => Some(LineEditAction::Paste(text)),
            _ => None,
        };
        let Some(action) = action else {
            continue;
        };
        match state.apply(action) {
            LineEditOutcome::Continue { redraw } => needs_redraw = redraw,
            LineEditOutcome::Submit(value) => return Ok(value),
            LineEditOutcome::Cancelled => return Err(LineEditorError::new(CANCELLED_MESSAGE)),
        }
    }
}

fn redraw_prompt(prompt: &str, state: &LineEditorState, mask_mode: MaskMode) -> io::Result<()> {
    print!("\r\x1b[K{}{}", prompt, state.display_text(mask_mode));
    let columns = UnicodeWidthStr::width(prompt) + state.cursor_column(mask_mode);
    if columns > 0 {
        print!("\r\x1b[{columns}C");
    } else {
        print!("\r");
    }
    io::stdout().flush()
}
