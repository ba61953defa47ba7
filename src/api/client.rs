use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::error::ApiError;
use crate::api::models::{
    AuthResponse, ChatRoom, LoginCredentials, LoginResponseBody, RoomNamePayload, User,
};
use crate::api::validation::{validate_credentials, validate_room_name};
use crate::core::session::SessionStore;
use crate::utils::auth::{add_auth_header, add_json_headers};
use crate::utils::url::{construct_api_url, normalize_base_url, room_path};

const LOGIN_PATH: &str = "login/";
const LOGOUT_PATH: &str = "logout/";
const ROOMS_PATH: &str = "chat_rooms/";

const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
const FETCH_ROOMS_FAILED: &str = "Failed to fetch chat rooms";
const CREATE_ROOM_FAILED: &str = "Failed to create chat room";
const UPDATE_ROOM_FAILED: &str = "Failed to update chat room";
const DELETE_ROOM_FAILED: &str = "Failed to delete chat room";
const ROOM_DETAIL_FAILED: &str = "Failed to fetch chat room detail";

/// The only code that talks to the backend.
///
/// The client owns the [`SessionStore`]: login starts it, logout clears it,
/// and any 401/403 from an authorized call clears it too, so callers never
/// hold a token the server has already rejected.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(base_url: &str, session: SessionStore) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url, session)
    }

    pub fn with_http_client(http: reqwest::Client, base_url: &str, session: SessionStore) -> Self {
        Self {
            http,
            base_url: normalize_base_url(base_url),
            session,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn username(&self) -> Option<&str> {
        self.session.username()
    }

    pub async fn login(&mut self, credentials: &LoginCredentials) -> Result<AuthResponse, ApiError> {
        let validated = validate_credentials(credentials)?;

        let request = add_json_headers(self.request_builder(Method::POST, LOGIN_PATH)).json(&validated);
        let response = send(request).await?;
        let status = response.status();
        let body = read_body(response).await?;
        if !status.is_success() {
            debug!(status = %status, "Login rejected");
            return Err(ApiError::from_status(status, &body, LOGIN_FAILED));
        }

        let (token, user, user_id) = LoginResponseBody::parse(&body).into_parts();
        let Some(token) = token else {
            warn!(body = %body, "Login response carried no token");
            return Err(ApiError::MissingToken);
        };

        let user = user.unwrap_or_else(|| User {
            id: user_id,
            username: validated.username.clone(),
        });

        if let Err(err) = self.session.start(&token, &validated.username) {
            // the in-memory session is valid for this run regardless
            warn!(error = %err, "Failed to persist session");
        }
        debug!(username = %validated.username, "Logged in");

        Ok(AuthResponse { token, user })
    }

    /// Tell the server the token is done with, then forget it locally.
    /// The local session is cleared whatever the server says.
    pub async fn logout(&mut self) {
        let request = self.authorized(Method::POST, LOGOUT_PATH);
        match request.send().await {
            Ok(response) if response.status().is_success() => debug!("Logged out"),
            Ok(response) => warn!(status = %response.status(), "Logout rejected by server"),
            Err(err) => warn!(error = %err, "Logout request failed"),
        }
        if let Err(err) = self.session.clear() {
            warn!(error = %err, "Failed to remove stored session");
        }
    }

    /// List rooms. A successful response always yields a list: bodies that
    /// are not arrays become empty, entries that are not rooms are skipped.
    pub async fn get_chat_rooms(&mut self) -> Result<Vec<ChatRoom>, ApiError> {
        let request = self.authorized(Method::GET, ROOMS_PATH);
        let response = self.checked(request, FETCH_ROOMS_FAILED).await?;
        let body = read_body(response).await?;
        Ok(parse_room_list(&body))
    }

    pub async fn create_chat_room(&mut self, name: &str) -> Result<ChatRoom, ApiError> {
        let name = validate_room_name(name)?;
        let request = self
            .authorized(Method::POST, ROOMS_PATH)
            .json(&RoomNamePayload { name: &name });
        let response = self.checked(request, CREATE_ROOM_FAILED).await?;
        decode(response).await
    }

    pub async fn update_chat_room(&mut self, id: i64, name: &str) -> Result<ChatRoom, ApiError> {
        let name = validate_room_name(name)?;
        let request = self
            .authorized(Method::PUT, &room_path(id))
            .json(&RoomNamePayload { name: &name });
        let response = self.checked(request, UPDATE_ROOM_FAILED).await?;
        decode(response).await
    }

    pub async fn delete_chat_room(&mut self, id: i64) -> Result<(), ApiError> {
        let request = self.authorized(Method::DELETE, &room_path(id));
        self.checked(request, DELETE_ROOM_FAILED).await?;
        Ok(())
    }

    pub async fn get_chat_room_detail(&mut self, id: i64) -> Result<ChatRoom, ApiError> {
        let request = self.authorized(Method::GET, &room_path(id));
        let response = self.checked(request, ROOM_DETAIL_FAILED).await?;
        decode(response).await
    }

    fn request_builder(&self, method: Method, resource: &str) -> RequestBuilder {
        let url = construct_api_url(&self.base_url, resource);
        debug!(method = %method, url = %url, "Building request");
        self.http.request(method, url)
    }

    fn authorized(&self, method: Method, resource: &str) -> RequestBuilder {
        let request = add_json_headers(self.request_builder(method, resource));
        add_auth_header(request, self.session.token())
    }

    /// Send an authorized request and map failure statuses.
    async fn checked(&mut self, request: RequestBuilder, fallback: &str) -> Result<Response, ApiError> {
        let response = send(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            self.expire_session(status);
            return Err(ApiError::Unauthorized);
        }
        let body = response.text().await.unwrap_or_default();
        debug!(status = %status, body = %body, "Request failed");
        Err(ApiError::from_status(status, &body, fallback))
    }

    fn expire_session(&mut self, status: StatusCode) {
        warn!(status = %status, "Server rejected the session token");
        if let Err(err) = self.session.clear() {
            warn!(error = %err, "Failed to remove stored session");
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish()
    }
}

async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
    request.send().await.map_err(|err| {
        debug!(error = %err, "Transport failure");
        ApiError::Connection(err)
    })
}

async fn read_body(response: Response) -> Result<String, ApiError> {
    response.text().await.map_err(ApiError::Connection)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = read_body(response).await?;
    serde_json::from_str(&body).map_err(|err| ApiError::MalformedResponse(err.to_string()))
}

fn parse_room_list(body: &str) -> Vec<ChatRoom> {
    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(body) else {
        debug!("Room list response was not an array");
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<ChatRoom>(item) {
            Ok(room) => Some(room),
            Err(err) => {
                debug!(error = %err, "Skipping malformed room entry");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_list_coerces_non_arrays() {
        assert!(parse_room_list(r#"{"results": []}"#).is_empty());
        assert!(parse_room_list("not json").is_empty());
        assert!(parse_room_list("").is_empty());
    }

    #[test]
    fn room_list_skips_bad_entries() {
        let rooms = parse_room_list(r#"[{"id": 1, "name": "General"}, {"name": "no id"}, 7]"#);
        assert_eq!(
            rooms,
            vec![ChatRoom {
                id: 1,
                name: "General".to_string(),
                created_at: None
            }]
        );
    }
}
