//! Terminal UI for the chat screen.
//!
//! - [`chat_loop`]: terminal setup, key handling and the event loop that
//!   drives a [`crate::core::chat_page::ChatPage`].
//! - [`renderer`]: draws the sidebar, header, messages, composer, dialog and
//!   notice bar from page state.
//!
//! This layer only presents and captures interaction; [`crate::core`] owns
//! the page state and [`crate::api`] the server calls.

pub mod chat_loop;
pub mod renderer;
