fn main() {
    if let Err(err) = handy_helper_lib::run() {
        eprintln!("handy-helper: {err:#}");
        std::process::exit(1);
    }
}
