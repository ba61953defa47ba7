//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod login;
pub mod rooms;
pub mod settings;


use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::api::{ApiClient, ApiError};
use crate::cli::login::{login_interactive, LoginOutcome};
use crate::core::config::data::{resolve_base_url, Config};
use crate::core::constants::BASE_URL_ENV;
use crate::core::session::SessionStore;
use crate::ui::chat_loop::{run_chat, ChatExit};
use crate::utils::logging::{init_tracing, TraceTarget, TranscriptLog};

pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("VERGEN_GIT_DESCRIBE"),
    "\nbuilt: ",
    env!("VERGEN_BUILD_TIMESTAMP"),
    "\nrustc: ",
    env!("VERGEN_RUSTC_SEMVER"),
);

#[derive(Parser, Debug)]
#[command(name = "roomchat")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "A terminal client for chat rooms")]
#[command(
    long_about = "RoomChat is a full-screen terminal client for a chat-room backend. \
Log in, pick a room from the sidebar and start typing.\n\n\
Configuration:\n\
  roomchat set base-url URL           Backend API root\n\
  roomchat set session-store keyring  Keep the login token in the system keyring\n\
  roomchat set default-username NAME  Prefill the login prompt\n\n\
Environment Variables:\n\
  ROOMCHAT_BASE_URL   Backend API root (overrides the config file)\n\
  ROOMCHAT_LOG        Log filter for --trace-file and stderr output\n\n\
Controls:\n\
  Up/Down           Select a room\n\
  Enter             Send the message\n\
  Ctrl+N            Create a room\n\
  Ctrl+R            Reload rooms\n\
  Ctrl+L            Log out\n\
  Esc               Close the dialog\n\
  Ctrl+C            Quit the application"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backend API root, e.g. https://host/api
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Append sent messages to a transcript file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Write diagnostic traces to a file
    #[arg(long, global = true, value_name = "FILE")]
    pub trace_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Log in and store the session
    Login {
        /// Username to prefill at the prompt
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Log out and forget the stored session
    Logout,
    /// Manage chat rooms
    Rooms {
        #[command(subcommand)]
        command: RoomsCommand,
    },
    /// Set configuration values
    Set {
        /// Configuration key to set (base-url, session-store, default-username)
        key: String,
        /// Value to set for the key (multiple words are joined)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Print the current configuration
    Config,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum RoomsCommand {
    /// List chat rooms
    List,
    /// Show one chat room
    Show { id: i64 },
    /// Create a chat room
    Create {
        #[arg(required = true, trailing_var_arg = true)]
        name: Vec<String>,
    },
    /// Rename a chat room
    Rename {
        id: i64,
        #[arg(required = true, trailing_var_arg = true)]
        name: Vec<String>,
    },
    /// Delete a chat room
    Delete { id: i64 },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let mut args = Args::parse();
    let command = args.command.take().unwrap_or(Commands::Chat);

    init_tracing(trace_target(args.trace_file.clone(), &command))?;

    match command {
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            match settings::set_value(&mut config, &key, &value) {
                Ok(message) => {
                    config.save()?;
                    println!("{message}");
                }
                Err(message) => {
                    eprintln!("❌ {message}");
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            match settings::unset_value(&mut config, &key) {
                Ok(message) => {
                    config.save()?;
                    println!("{message}");
                }
                Err(message) => {
                    eprintln!("❌ {message}");
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Commands::Config => {
            Config::load()?.print_all();
            Ok(())
        }
        Commands::Login { username } => {
            let config = Config::load()?;
            let mut client = open_client(&args, &config)?;
            let default_username = username
                .as_deref()
                .or(config.default_username.as_deref())
                .or(client.username());
            let default_username = default_username.map(str::to_string);
            login_interactive(&mut client, default_username.as_deref()).await?;
            Ok(())
        }
        Commands::Logout => {
            let config = Config::load()?;
            let mut client = open_client(&args, &config)?;
            if !client.is_authenticated() {
                println!("Not logged in.");
                return Ok(());
            }
            client.logout().await;
            println!("✅ Logged out");
            Ok(())
        }
        Commands::Rooms { command } => {
            let config = Config::load()?;
            let mut client = open_client(&args, &config)?;
            if !client.is_authenticated() {
                eprintln!("❌ Not logged in. Run `roomchat login` first.");
                std::process::exit(1);
            }
            let result = match command {
                RoomsCommand::List => rooms::list_rooms(&mut client).await,
                RoomsCommand::Show { id } => rooms::show_room(&mut client, id).await,
                RoomsCommand::Create { name } => {
                    rooms::create_room(&mut client, &name.join(" ")).await
                }
                RoomsCommand::Rename { id, name } => {
                    rooms::rename_room(&mut client, id, &name.join(" ")).await
                }
                RoomsCommand::Delete { id } => rooms::delete_room(&mut client, id).await,
            };
            exit_on_command_error(result);
            Ok(())
        }
        Commands::Chat => {
            let config = Config::load()?;
            let mut client = open_client(&args, &config)?;
            let transcript = TranscriptLog::new(args.log.clone())?;
            chat(&mut client, &config, &transcript).await
        }
    }
}

/// Alternate between the login prompt and the chat screen until the user
/// quits from either.
async fn chat(
    client: &mut ApiClient,
    config: &Config,
    transcript: &TranscriptLog,
) -> Result<(), Box<dyn Error>> {
    loop {
        if !client.is_authenticated() {
            let default_username = config
                .default_username
                .clone()
                .or_else(|| client.username().map(str::to_string));
            match login_interactive(client, default_username.as_deref()).await? {
                LoginOutcome::LoggedIn => {}
                LoginOutcome::Cancelled => return Ok(()),
            }
        }

        match run_chat(client, transcript).await? {
            ChatExit::Quit => return Ok(()),
            ChatExit::Login { notice } => {
                debug!("Returning to login prompt");
                if let Some(notice) = notice {
                    eprintln!("{}: {}", notice.title, notice.description);
                }
            }
        }
    }
}

fn open_client(args: &Args, config: &Config) -> Result<ApiClient, Box<dyn Error>> {
    let env_base_url = std::env::var(BASE_URL_ENV).ok();
    let base_url = resolve_base_url(args.base_url.as_deref(), env_base_url.as_deref(), config);
    let storage = config.session_backend().open()?;
    let session = SessionStore::load(storage);
    debug!(base_url = %base_url, "Opening client");
    Ok(ApiClient::new(&base_url, session))
}

fn trace_target(trace_file: Option<PathBuf>, command: &Commands) -> TraceTarget {
    match (trace_file, command) {
        (Some(path), _) => TraceTarget::File(path),
        (None, Commands::Chat) => TraceTarget::Disabled,
        (None, _) => TraceTarget::Stderr,
    }
}

fn exit_on_command_error(result: Result<(), Box<dyn Error>>) {
    if let Err(err) = result {
        eprintln!("❌ {}", command_error_message(err.as_ref()));
        std::process::exit(1);
    }
}

fn command_error_message(err: &(dyn Error + 'static)) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(api_err) if api_err.is_unauthorized() => SESSION_EXPIRED_MESSAGE.to_string(),
        _ => err.to_string(),
    }
}
