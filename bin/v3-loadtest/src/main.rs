fn main() {
    if let Err(err) = v3_loadtest::run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}
