//! Key handling for the chat screen.
//!
//! Keys that only change local state (selection, editing, opening the
//! dialog) are applied directly to the page. Keys that need the server or
//! end the loop come back as a [`PageAction`] for the event loop to run.

use crate::core::chat_page::ChatPage;
use crate::utils::line_editor::{
    map_key_event_to_action, LineEditAction, LineEditOutcome, LineEditorOptions,
};
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    None,
    Redraw,
    Send,
    SubmitDialog,
    Reload,
    Logout,
    Quit,
}

pub fn handle_key(page: &mut ChatPage, key: &KeyEvent) -> PageAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return PageAction::Quit;
    }

    if page.dialog.open {
        return handle_dialog_key(page, key);
    }

    match key.code {
        KeyCode::Char('n') if ctrl => {
            page.open_dialog();
            PageAction::Redraw
        }
        KeyCode::Char('r') if ctrl => PageAction::Reload,
        KeyCode::Char('l') if ctrl => PageAction::Logout,
        KeyCode::Up => {
            page.select_previous_room();
            PageAction::Redraw
        }
        KeyCode::Down => {
            page.select_next_room();
            PageAction::Redraw
        }
        KeyCode::Esc => {
            page.dismiss_notices();
            PageAction::Redraw
        }
        _ => {
            // the composer only exists while a room is selected
            if page.selected_room_id.is_none() {
                return PageAction::None;
            }
            let options = LineEditorOptions {
                allow_cancel: false,
                ..LineEditorOptions::default()
            };
            match map_key_event_to_action(key, &options) {
                Some(action) => composer_outcome(page, action),
                None => PageAction::None,
            }
        }
    }
}

/// Route bracketed paste into whichever field has focus.
pub fn handle_paste(page: &mut ChatPage, text: String) -> PageAction {
    if page.dialog.open {
        if page.dialog.is_loading {
            return PageAction::None;
        }
        return dialog_outcome(page, LineEditAction::Paste(text));
    }
    if page.selected_room_id.is_none() {
        return PageAction::None;
    }
    composer_outcome(page, LineEditAction::Paste(text))
}

fn handle_dialog_key(page: &mut ChatPage, key: &KeyEvent) -> PageAction {
    if page.dialog.is_loading {
        return PageAction::None;
    }
    match map_key_event_to_action(key, &LineEditorOptions::default()) {
        Some(action) => dialog_outcome(page, action),
        None => PageAction::None,
    }
}

fn dialog_outcome(page: &mut ChatPage, action: LineEditAction) -> PageAction {
    match page.dialog.name.apply(action) {
        LineEditOutcome::Submit(_) => PageAction::SubmitDialog,
        LineEditOutcome::Cancelled => {
            page.close_dialog();
            PageAction::Redraw
        }
        LineEditOutcome::Continue { redraw } => {
            page.dialog.error = None;
            redraw_if(redraw)
        }
    }
}

fn composer_outcome(page: &mut ChatPage, action: LineEditAction) -> PageAction {
    match page.composer.apply(action) {
        LineEditOutcome::Submit(_) => PageAction::Send,
        LineEditOutcome::Cancelled => PageAction::None,
        LineEditOutcome::Continue { redraw } => redraw_if(redraw),
    }
}

fn redraw_if(redraw: bool) -> PageAction {
    if redraw {
        PageAction::Redraw
    } else {
        PageAction::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::ChatRoom;
    use crate::utils::line_editor::LineEditorState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn page_with_room() -> ChatPage {
        let mut page = ChatPage::new();
        page.rooms = vec![
            ChatRoom {
                id: 1,
                name: "Random".to_string(),
                created_at: None,
            },
            ChatRoom {
                id: 3,
                name: "General".to_string(),
                created_at: None,
            },
        ];
        page.select_room(1);
        page
    }

    #[test]
    fn typing_edits_composer_and_enter_sends() {
        let mut page = page_with_room();
        assert_eq!(handle_key(&mut page, &key(KeyCode::Char('h'))), PageAction::Redraw);
        assert_eq!(handle_key(&mut page, &key(KeyCode::Char('i'))), PageAction::Redraw);
        assert_eq!(page.composer.text(), "hi");
        assert_eq!(handle_key(&mut page, &key(KeyCode::Enter)), PageAction::Send);
    }

    #[test]
    fn typing_without_room_is_ignored() {
        let mut page = ChatPage::new();
        assert_eq!(handle_key(&mut page, &key(KeyCode::Char('h'))), PageAction::None);
        assert!(page.composer.text().is_empty());
    }

    #[test]
    fn arrows_move_selection() {
        let mut page = page_with_room();
        handle_key(&mut page, &key(KeyCode::Down));
        assert_eq!(page.selected_room_id, Some(3));
        handle_key(&mut page, &key(KeyCode::Up));
        assert_eq!(page.selected_room_id, Some(1));
    }

    #[test]
    fn control_keys_map_to_actions() {
        let mut page = page_with_room();
        assert_eq!(handle_key(&mut page, &ctrl('r')), PageAction::Reload);
        assert_eq!(handle_key(&mut page, &ctrl('l')), PageAction::Logout);
        assert_eq!(handle_key(&mut page, &ctrl('c')), PageAction::Quit);
    }

    #[test]
    fn dialog_captures_input_until_closed() {
        let mut page = page_with_room();
        handle_key(&mut page, &ctrl('n'));
        assert!(page.dialog.open);

        handle_key(&mut page, &key(KeyCode::Char('x')));
        assert_eq!(page.dialog.name.text(), "x");
        assert!(page.composer.text().is_empty());
        assert_eq!(handle_key(&mut page, &key(KeyCode::Enter)), PageAction::SubmitDialog);

        handle_key(&mut page, &key(KeyCode::Esc));
        assert!(!page.dialog.open);
        assert_eq!(page.dialog.name, LineEditorState::default());
    }

    #[test]
    fn dialog_ignores_keys_while_creating() {
        let mut page = page_with_room();
        page.open_dialog();
        page.dialog.is_loading = true;
        assert_eq!(handle_key(&mut page, &key(KeyCode::Esc)), PageAction::None);
        assert!(page.dialog.open);
    }

    #[test]
    fn multi_line_paste_sends() {
        let mut page = page_with_room();
        assert_eq!(handle_paste(&mut page, "hello\nworld".to_string()), PageAction::Send);
        assert_eq!(page.composer.text(), "hello");
    }
}
