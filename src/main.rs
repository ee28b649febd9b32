fn main() {
    if let Err(err) = csv_tidy::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
