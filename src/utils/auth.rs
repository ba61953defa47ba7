//! Header helpers for requests to the chat backend.
//!
//! The backend uses Django REST Framework token authentication, which expects
//! `Authorization: Token <key>` rather than the `Bearer` scheme.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};

/// Attach the JSON content negotiation headers every request carries.
pub fn add_json_headers(request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    request
        .header(CONTENT_TYPE, "application/json")
        .header(ACCEPT, "application/json")
}

/// Attach the token header when a token is present. Requests without a token
/// are still sent; the server answers them with 401.
pub fn add_auth_header(
    request: reqwest::RequestBuilder,
    token: Option<&str>,
) -> reqwest::RequestBuilder {
    match token {
        Some(token) => request.header(AUTHORIZATION, format!("Token {token}")),
        None => request,
    }
}
