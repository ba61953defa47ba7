pub mod chat_page;
pub mod config;
pub mod constants;
pub mod keyring;
pub mod session;
pub mod storage;
