use env_logger::Env;

/// Install the process-wide logger. `RUST_LOG` overrides the `info` default.
pub fn init() {
    // A second init (tests, re-exec) is harmless.
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();
}
