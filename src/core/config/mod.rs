pub mod data;
pub mod io;
pub mod printing;

#[cfg(test)]
pub mod tests;
