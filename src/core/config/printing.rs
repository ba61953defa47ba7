use crate::core::config::data::Config;

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.base_url {
            Some(url) => println!("  base-url: {url}"),
            None => println!("  base-url: (unset)"),
        }
        println!("  session-store: {}", self.session_backend().as_str());
        match &self.default_username {
            Some(username) => println!("  default-username: {username}"),
            None => println!("  default-username: (unset)"),
        }
    }
}
