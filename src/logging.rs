// Logger initialisation. The library only uses the `log` facade; the binary
// installs env_logger.
use env_logger::Env;

/// Initialise logging from `RUST_LOG`, defaulting to `info`.
pub fn init() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();
}

/// Verbose logging for tests. Safe to call more than once.
pub fn init_test() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("debug"))
        .is_test(true)
        .try_init();
}
