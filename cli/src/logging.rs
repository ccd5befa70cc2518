use std::io::IsTerminal;

/// Initialize `env_logger`; `RUST_LOG` wins over the configured level.
///
/// Core crates log through `tracing`, whose `log` feature forwards here.
pub fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Spinners only make sense when a person is watching stderr
pub fn stderr_is_terminal() -> bool {
    std::io::stderr().is_terminal()
}
