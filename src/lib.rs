//! RoomChat is a terminal client for a chat-room REST backend.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`api`] is the only code that talks to the server: request
//!   construction, input validation, and the error contract callers see.
//! - [`core`] owns the session (token and username in durable storage),
//!   configuration, and the state of the chat page.
//! - [`ui`] renders the chat page and runs the interactive event loop.
//! - [`utils`] holds small shared helpers (URL joining, line editing,
//!   logging, relative time).
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which dispatches into the subcommands and
//! [`ui::chat_loop`] for interactive sessions.

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
