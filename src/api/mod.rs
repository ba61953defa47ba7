//! HTTP access to the chat backend.
//!
//! [`client::ApiClient`] is the concrete client; [`ChatBackend`] is the slice
//! of it the chat page drives, so the page can run against a fake in tests.

pub mod client;
pub mod error;
pub mod models;
pub mod validation;


pub use client::ApiClient;
pub use error::{ApiError, ErrorKind};

use models::{AuthResponse, ChatRoom, LoginCredentials};

#[async_trait::async_trait]
pub trait ChatBackend: Send {
    fn is_authenticated(&self) -> bool;

    fn username(&self) -> Option<&str>;

    async fn login(&mut self, credentials: &LoginCredentials) -> Result<AuthResponse, ApiError>;

    async fn logout(&mut self);

    async fn get_chat_rooms(&mut self) -> Result<Vec<ChatRoom>, ApiError>;

    async fn create_chat_room(&mut self, name: &str) -> Result<ChatRoom, ApiError>;
}

#[async_trait::async_trait]
impl ChatBackend for ApiClient {
    fn is_authenticated(&self) -> bool {
        ApiClient::is_authenticated(self)
    }

    fn username(&self) -> Option<&str> {
        ApiClient::username(self)
    }

    async fn login(&mut self, credentials: &LoginCredentials) -> Result<AuthResponse, ApiError> {
        ApiClient::login(self, credentials).await
    }

    async fn logout(&mut self) {
        ApiClient::logout(self).await
    }

    async fn get_chat_rooms(&mut self) -> Result<Vec<ChatRoom>, ApiError> {
        ApiClient::get_chat_rooms(self).await
    }

    async fn create_chat_room(&mut self, name: &str) -> Result<ChatRoom, ApiError> {
        ApiClient::create_chat_room(self, name).await
    }
}
