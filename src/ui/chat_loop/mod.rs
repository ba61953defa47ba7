//! The interactive chat screen.
//!
//! [`run_chat`] owns the terminal for as long as the user stays on the chat
//! page. Each key press issues at most one request, awaited inline before
//! the next frame is drawn.

pub mod keybindings;
pub mod lifecycle;

use std::error::Error;
use std::time::Duration;

use chrono::Utc;
use ratatui::crossterm::event::{self, Event, KeyEventKind};
use tracing::{debug, warn};

use crate::api::ChatBackend;
use crate::core::chat_page::{ChatPage, Notice, Route};
use crate::ui::renderer::ui;
use crate::utils::logging::TranscriptLog;

use keybindings::{handle_key, handle_paste, PageAction};
use lifecycle::{restore_terminal, setup_terminal, ChatTerminal};

/// Relative timestamps are refreshed at least this often.
const TICK: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatExit {
    Quit,
    /// The page routed to login, after a logout or an expired session.
    Login { notice: Option<Notice> },
}

pub async fn run_chat<B: ChatBackend + ?Sized>(
    backend: &mut B,
    transcript: &TranscriptLog,
) -> Result<ChatExit, Box<dyn Error>> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, backend, transcript).await;
    restore_terminal(&mut terminal)?;
    result
}

async fn event_loop<B: ChatBackend + ?Sized>(
    terminal: &mut ChatTerminal,
    backend: &mut B,
    transcript: &TranscriptLog,
) -> Result<ChatExit, Box<dyn Error>> {
    let mut page = ChatPage::new();
    terminal.draw(|f| ui(f, &page, Utc::now()))?;
    page.mount(backend).await;

    loop {
        if page.route == Route::Login {
            debug!("Chat page routed to login");
            return Ok(ChatExit::Login {
                notice: page.latest_notice().cloned(),
            });
        }

        terminal.draw(|f| ui(f, &page, Utc::now()))?;

        if !event::poll(TICK)? {
            continue;
        }
        let action = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(&mut page, &key),
            Event::Paste(text) => handle_paste(&mut page, text),
            Event::Resize(_, _) => PageAction::Redraw,
            _ => PageAction::None,
        };

        match action {
            PageAction::None | PageAction::Redraw => {}
            PageAction::Quit => return Ok(ChatExit::Quit),
            PageAction::Send => send_and_record(&mut page, transcript),
            PageAction::Reload => page.load_rooms(backend).await,
            PageAction::Logout => page.logout(backend).await,
            PageAction::SubmitDialog => {
                // show "Creating..." while the request is in flight
                page.dialog.is_loading = true;
                terminal.draw(|f| ui(f, &page, Utc::now()))?;
                page.dialog.is_loading = false;
                page.submit_dialog(backend).await;
            }
        }
    }
}

fn send_and_record(page: &mut ChatPage, transcript: &TranscriptLog) {
    let Some(message) = page.send_message() else {
        return;
    };
    let room_name = page
        .rooms
        .iter()
        .find(|room| room.id == message.room_id)
        .map(|room| room.name.clone())
        .unwrap_or_else(|| message.room_id.to_string());
    if let Err(err) = transcript.record(&room_name, &message) {
        warn!(error = %err, "Failed to write transcript");
        page.push_notice(Notice::destructive(
            "Error",
            format!("Failed to write transcript: {err}"),
        ));
    }
}
