fn main() {
    if let Err(err) = sheet_dash::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
