//! Terminal login prompt.

use std::error::Error;

use tracing::debug;

use crate::api::models::LoginCredentials;
use crate::api::ChatBackend;
use crate::utils::line_editor::{prompt_line, LineEditorError, LineEditorOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedIn,
    Cancelled,
}

/// Ask for credentials until a login succeeds or the user presses Esc.
///
/// Failed attempts print the server's (or validator's) message and prompt
/// again; the username typed last time is offered as the default.
pub async fn login_interactive<B: ChatBackend + ?Sized>(
    backend: &mut B,
    default_username: Option<&str>,
) -> Result<LoginOutcome, Box<dyn Error>> {
    let mut username = default_username.unwrap_or_default().to_string();
    println!("Sign in to continue (Esc to cancel).");

    loop {
        let Some(credentials) = prompt_credentials(&username)? else {
            return Ok(LoginOutcome::Cancelled);
        };
        username = credentials.username.clone();

        match backend.login(&credentials).await {
            Ok(auth) => {
                debug!(user_id = ?auth.user.id, "Interactive login succeeded");
                println!("✅ Logged in as {}", auth.user.username);
                return Ok(LoginOutcome::LoggedIn);
            }
            Err(err) => eprintln!("❌ {err}"),
        }
    }
}

/// `None` when the user cancels either prompt.
fn prompt_credentials(default_username: &str) -> Result<Option<LoginCredentials>, Box<dyn Error>> {
    let username_options = LineEditorOptions {
        initial_text: default_username.to_string(),
        ..LineEditorOptions::default()
    };
    let Some(username) = cancellable(prompt_line("Username: ", &username_options))? else {
        return Ok(None);
    };
    let Some(password) = cancellable(prompt_line("Password: ", &LineEditorOptions::masked()))?
    else {
        return Ok(None);
    };
    Ok(Some(LoginCredentials::new(username, password)))
}

fn cancellable(result: Result<String, LineEditorError>) -> Result<Option<String>, LineEditorError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_cancelled() => Ok(None),
        Err(err) => Err(err),
    }
}
