//! Shared constants used across the application

/// Backend used when neither the command line, the environment, nor the
/// config file names one.
pub const DEFAULT_BASE_URL: &str = "https://message-app-backend-t3-2025-v2.vercel.app/api";

/// Environment variable that overrides the configured base URL.
pub const BASE_URL_ENV: &str = "ROOMCHAT_BASE_URL";

/// Sender shown for messages composed before a username is known.
pub const FALLBACK_SENDER: &str = "User";
