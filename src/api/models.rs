use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<i64>,
    pub username: String,
}

/// Normalized result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRoom {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// A message composed in this client. Messages only live in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub room_id: i64,
    pub sender: String,
    pub content: String,
    pub timestamp: String,
}

#[derive(Serialize)]
pub(crate) struct RoomNamePayload<'a> {
    pub name: &'a str,
}

/// Login response as sent by the backend. Token field names vary between
/// DRF auth packages (`token`, `key`, `auth_token`), and the other fields are
/// read loosely so an unexpected `user_id` type cannot hide the token.
#[derive(Debug, Default)]
pub(crate) struct LoginResponseBody(serde_json::Value);

impl LoginResponseBody {
    /// A body that is not JSON yields no token.
    pub fn parse(body: &str) -> Self {
        Self(serde_json::from_str(body).unwrap_or_default())
    }

    pub fn into_parts(self) -> (Option<String>, Option<User>, Option<i64>) {
        let token = ["token", "key", "auth_token"]
            .into_iter()
            .filter_map(|field| self.0.get(field).and_then(serde_json::Value::as_str))
            .find(|token| !token.is_empty())
            .map(str::to_string);
        let user = self
            .0
            .get("user")
            .and_then(|value| serde_json::from_value::<User>(value.clone()).ok());
        let user_id = self.0.get("user_id").and_then(serde_json::Value::as_i64);
        (token, user, user_id)
    }
}
