//! URL helpers for building backend endpoints.
//!
//! The chat backend is a Django REST Framework service, so every resource path
//! ends in a slash (`/chat_rooms/`, `/chat_rooms/7/`). These helpers keep the
//! base URL and the resource paths joined without doubled or missing slashes.

/// Remove trailing slashes from a base URL.
///
/// # Examples
///
/// ```
/// use roomchat::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://chat.example.com/api/"), "https://chat.example.com/api");
/// assert_eq!(normalize_base_url("https://chat.example.com/api"), "https://chat.example.com/api");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Join a base URL and a resource path, keeping the resource's trailing slash.
///
/// # Examples
///
/// ```
/// use roomchat::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://chat.example.com/api/", "/chat_rooms/"),
///     "https://chat.example.com/api/chat_rooms/"
/// );
/// ```
pub fn construct_api_url(base_url: &str, resource: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let resource = resource.trim_start_matches('/');
    format!("{normalized_base}/{resource}")
}

/// Path of a single room resource, e.g. `chat_rooms/3/`.
pub fn room_path(id: i64) -> String {
    format!("chat_rooms/{id}/")
}
