fn main() {
    if let Err(err) = famlay::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
