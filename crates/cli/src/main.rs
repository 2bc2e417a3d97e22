fn main() {
    if let Err(error) = jtl_cli::run() {
        tracing::debug!(error = ?error, "jtl failed");
        eprintln!("{}", jtl_cli::error_report(&error));
        std::process::exit(1);
    }
}
