fn main() {
    if let Err(err) = roomchat::cli::main() {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
}
