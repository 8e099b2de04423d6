fn main() {
    if let Err(err) = hheatmap::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
