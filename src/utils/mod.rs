pub mod auth;
pub mod input;
pub mod line_editor;
pub mod logging;
#[cfg(test)]
pub mod test_utils;
pub mod time;
pub mod url;
