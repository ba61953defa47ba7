//! State and actions of the chat screen.
//!
//! [`ChatPage`] owns everything the chat screen shows: the room list, the
//! selection, the locally composed messages, the composer, the create-room
//! dialog and the notices. Actions that talk to the server take a
//! [`ChatBackend`], so the page never holds a client of its own.

use chrono::{SecondsFormat, Utc};
use tracing::debug;

use crate::api::models::{ChatRoom, Message};
use crate::api::{ApiError, ChatBackend};
use crate::core::constants::FALLBACK_SENDER;
use crate::utils::input::has_visible_text;
use crate::utils::line_editor::LineEditorState;

pub const NO_ROOM_TITLE: &str = "Select a room";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Chat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoticeVariant {
    #[default]
    Default,
    Destructive,
}

/// A transient message for the user, shown in the notice bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Default,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Destructive,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateRoomDialog {
    pub open: bool,
    pub name: LineEditorState,
    pub is_loading: bool,
    /// Inline validation message.
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChatPage {
    pub rooms: Vec<ChatRoom>,
    pub selected_room_id: Option<i64>,
    pub messages: Vec<Message>,
    pub composer: LineEditorState,
    pub is_loading_rooms: bool,
    pub dialog: CreateRoomDialog,
    pub route: Route,
    pub notices: Vec<Notice>,
    pub username: Option<String>,
    last_message_id: i64,
}

impl Default for ChatPage {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatPage {
    pub fn new() -> Self {
        Self {
            rooms: Vec::new(),
            selected_room_id: None,
            messages: Vec::new(),
            composer: LineEditorState::default(),
            // rooms are considered loading until the first fetch finishes
            is_loading_rooms: true,
            dialog: CreateRoomDialog::default(),
            route: Route::Chat,
            notices: Vec::new(),
            username: None,
            last_message_id: 0,
        }
    }

    /// Enter the page: logged-out users are sent to login, everyone else
    /// gets their rooms loaded.
    pub async fn mount<B: ChatBackend + ?Sized>(&mut self, backend: &mut B) {
        self.username = backend.username().map(str::to_string);
        if !backend.is_authenticated() {
            debug!("Not authenticated; routing to login");
            self.route = Route::Login;
            return;
        }
        self.route = Route::Chat;
        self.load_rooms(backend).await;
    }

    pub async fn load_rooms<B: ChatBackend + ?Sized>(&mut self, backend: &mut B) {
        self.is_loading_rooms = true;
        match backend.get_chat_rooms().await {
            Ok(rooms) => {
                debug!(count = rooms.len(), "Loaded rooms");
                self.rooms = rooms;
                if self.selected_room_id.is_none() {
                    self.selected_room_id = self.rooms.first().map(|room| room.id);
                }
            }
            Err(err) if err.is_unauthorized() => self.session_expired(),
            Err(err) => {
                self.rooms.clear();
                self.push_notice(Notice::destructive("Error", err.to_string()));
            }
        }
        self.is_loading_rooms = false;
    }

    /// Select a room by id. Purely local; unknown ids leave nothing matched.
    pub fn select_room(&mut self, id: i64) {
        self.selected_room_id = Some(id);
    }

    pub fn select_next_room(&mut self) {
        self.step_selection(1);
    }

    pub fn select_previous_room(&mut self) {
        self.step_selection(-1);
    }

    fn step_selection(&mut self, delta: isize) {
        if self.rooms.is_empty() {
            return;
        }
        let len = self.rooms.len() as isize;
        let next = match self.selected_index() {
            Some(index) => (index as isize + delta).rem_euclid(len),
            None => 0,
        };
        self.selected_room_id = Some(self.rooms[next as usize].id);
    }

    pub fn selected_index(&self) -> Option<usize> {
        let id = self.selected_room_id?;
        self.rooms.iter().position(|room| room.id == id)
    }

    pub fn selected_room(&self) -> Option<&ChatRoom> {
        let id = self.selected_room_id?;
        self.rooms.iter().find(|room| room.id == id)
    }

    pub fn header_title(&self) -> &str {
        self.selected_room()
            .map(|room| room.name.as_str())
            .unwrap_or(NO_ROOM_TITLE)
    }

    /// Append the composer's text as a message in the selected room.
    ///
    /// Returns the new message, or `None` when the composer is blank or no
    /// room is selected (in which case nothing changes).
    pub fn send_message(&mut self) -> Option<Message> {
        if !has_visible_text(self.composer.text()) {
            return None;
        }
        let room_id = self.selected_room_id?;

        let now = Utc::now();
        let id = now.timestamp_millis().max(self.last_message_id + 1);
        self.last_message_id = id;

        let message = Message {
            id,
            room_id,
            sender: self
                .username
                .clone()
                .unwrap_or_else(|| FALLBACK_SENDER.to_string()),
            content: self.composer.text().to_string(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        self.messages.push(message.clone());
        self.composer.clear();
        Some(message)
    }

    pub fn is_own(&self, message: &Message) -> bool {
        self.username.as_deref() == Some(message.sender.as_str())
    }

    /// Messages belonging to the selected room, oldest first.
    pub fn visible_messages(&self) -> impl Iterator<Item = &Message> {
        let selected = self.selected_room_id;
        self.messages
            .iter()
            .filter(move |message| Some(message.room_id) == selected)
    }

    pub fn open_dialog(&mut self) {
        self.dialog = CreateRoomDialog {
            open: true,
            ..CreateRoomDialog::default()
        };
    }

    pub fn close_dialog(&mut self) {
        if self.dialog.is_loading {
            return;
        }
        self.dialog = CreateRoomDialog::default();
    }

    /// Create a room from the dialog's current text.
    pub async fn submit_dialog<B: ChatBackend + ?Sized>(&mut self, backend: &mut B) {
        let name = self.dialog.name.text().to_string();
        self.create_room(backend, &name).await;
    }

    /// Blank names are ignored. On success the room is appended, selected
    /// and the dialog closed; on other failures the dialog stays open.
    pub async fn create_room<B: ChatBackend + ?Sized>(&mut self, backend: &mut B, name: &str) {
        if !has_visible_text(name) {
            return;
        }

        self.dialog.is_loading = true;
        self.dialog.error = None;
        let result = backend.create_chat_room(name).await;
        self.dialog.is_loading = false;

        match result {
            Ok(room) => {
                debug!(id = room.id, "Created room");
                self.selected_room_id = Some(room.id);
                self.rooms.push(room);
                self.push_notice(Notice::info(
                    "Room created",
                    format!("Successfully created \"{name}\""),
                ));
                self.dialog = CreateRoomDialog::default();
            }
            Err(err @ ApiError::Validation(_)) => {
                self.dialog.error = Some(err.to_string());
            }
            Err(err) if err.is_unauthorized() => {
                self.dialog = CreateRoomDialog::default();
                self.session_expired();
            }
            Err(err) => {
                debug!(error = %err, "Room creation failed");
                self.dialog.error = Some(err.to_string());
                self.push_notice(Notice::destructive("Error", "Failed to create room"));
            }
        }
    }

    /// Log out and leave the page. Everything shown on the page is dropped.
    pub async fn logout<B: ChatBackend + ?Sized>(&mut self, backend: &mut B) {
        backend.logout().await;
        let notices = std::mem::take(&mut self.notices);
        *self = Self::new();
        self.notices = notices;
        self.route = Route::Login;
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn latest_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }

    pub fn dismiss_notices(&mut self) {
        self.notices.clear();
    }

    fn session_expired(&mut self) {
        self.route = Route::Login;
        self.push_notice(Notice::destructive("Session expired", "Please login again."));
    }
}
